//! Destinations for per-row pipeline events.
//!
//! Workflows call [`LogSink::emit`] once per event, in the order events happen,
//! and never read anything back from the sink.

use indicatif::{ProgressBar, ProgressStyle};

use crate::common::truncate_for_log;

pub trait LogSink {
    fn emit(&mut self, message: &str);

    /// Called once the number of rows to process is known.
    fn start(&mut self, _total: usize) {}

    /// Called after each row, success or failure.
    fn row_done(&mut self) {}

    fn finish(&mut self) {}
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn emit(&mut self, message: &str) {
        (**self).emit(message);
    }

    fn start(&mut self, total: usize) {
        (**self).start(total);
    }

    fn row_done(&mut self) {
        (**self).row_done();
    }

    fn finish(&mut self) {
        (**self).finish();
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn emit(&mut self, message: &str) {
        (**self).emit(message);
    }

    fn start(&mut self, total: usize) {
        (**self).start(total);
    }

    fn row_done(&mut self) {
        (**self).row_done();
    }

    fn finish(&mut self) {
        (**self).finish();
    }
}

/// Forwards every event to `tracing` at info level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&mut self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Logs through `tracing` while ticking a progress bar once per row.
pub struct ProgressSink {
    progress: ProgressBar,
}

impl ProgressSink {
    pub fn new(label: &str) -> Self {
        let progress = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{prefix} {elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        ) {
            progress.set_style(style.progress_chars("=> "));
        }
        progress.set_prefix(label.to_string());
        Self { progress }
    }
}

impl LogSink for ProgressSink {
    fn emit(&mut self, message: &str) {
        self.progress.suspend(|| tracing::info!("{message}"));
        self.progress.set_message(truncate_for_log(message));
    }

    fn start(&mut self, total: usize) {
        self.progress.set_length(total as u64);
        self.progress.set_message("starting");
    }

    fn row_done(&mut self) {
        self.progress.inc(1);
    }

    fn finish(&mut self) {
        self.progress.finish_and_clear();
    }
}

/// Collects messages in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub messages: Vec<String>,
    pub rows_done: usize,
}

impl LogSink for MemorySink {
    fn emit(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn row_done(&mut self) {
        self.rows_done += 1;
    }
}
