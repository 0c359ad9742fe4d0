mod args;

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;

use args::{Args, Command, HttpArgs};
use snomed_tools::{
    deconstruct::{DeconstructConfig, deconstruct_file},
    sink::{LogSink, ProgressSink, TracingSink},
    strip::{StripConfig, strip_file},
    transport::{ReqwestTransport, TransportOptions},
    validate::{ValidateConfig, lookup_code, validate_file},
};

fn transport_options(http: &HttpArgs, accept_invalid_certs: bool) -> TransportOptions {
    TransportOptions {
        user_agent: http.user_agent.clone(),
        timeout: http.timeout_secs.map(Duration::from_secs),
        accept_invalid_certs,
    }
}

fn make_sink(no_progress: bool, label: &str) -> Box<dyn LogSink> {
    if no_progress {
        Box::new(TracingSink)
    } else {
        Box::new(ProgressSink::new(label))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    match args.cmd {
        Command::Deconstruct(cmd) => {
            let transport =
                ReqwestTransport::new(&transport_options(&cmd.http, !cmd.verify_authoring_tls))
                    .context("Failed creating authoring-form HTTP client")?;
            let config = DeconstructConfig {
                authoring_base_url: cmd.authoring_base_url,
                target_column: cmd.target_column,
                output_path: cmd.output,
            };
            let mut sink = make_sink(args.no_progress, "deconstruct");
            let summary = deconstruct_file(&cmd.input, &transport, &config, &mut sink)
                .await
                .with_context(|| format!("Deconstruct failed for {}", cmd.input.display()))?;
            println!(
                "Wrote {} ({} rows: {} flattened, {} failed, {} input lines skipped)",
                summary.output_path.display(),
                summary.rows,
                summary.flattened,
                summary.failed,
                summary.skipped_lines
            );
        }
        Command::Strip(cmd) => {
            let config = StripConfig {
                mode: cmd.mode,
                output_path: cmd.output,
            };
            let mut sink = TracingSink;
            let summary = strip_file(&cmd.input, &config, &mut sink)
                .with_context(|| format!("Strip failed for {}", cmd.input.display()))?;
            println!(
                "Wrote {} ({} rows, {} input lines skipped)",
                summary.output_path.display(),
                summary.rows,
                summary.skipped_lines
            );
        }
        Command::Validate(cmd) => {
            let transport = ReqwestTransport::new(&transport_options(&cmd.http, false))
                .context("Failed creating validation HTTP client")?;
            let config = ValidateConfig {
                validate_url: cmd.endpoint.validate_url,
                code_system: cmd.endpoint.code_system,
                source_column: cmd.column,
                output_path: cmd.output,
            };
            let mut sink = make_sink(args.no_progress, "validate");
            let report = validate_file(&cmd.input, &transport, &config, &mut sink)
                .await
                .with_context(|| format!("Validate failed for {}", cmd.input.display()))?;
            println!("Validation summary ({}):", report.source_column);
            println!("{}", report.summary);
            println!("Wrote {}", report.output_path.display());
        }
        Command::Lookup(cmd) => {
            let transport = ReqwestTransport::new(&transport_options(&cmd.http, false))
                .context("Failed creating validation HTTP client")?;
            let config = ValidateConfig {
                validate_url: cmd.endpoint.validate_url,
                code_system: cmd.endpoint.code_system,
                ..ValidateConfig::default()
            };
            let report = lookup_code(&transport, &config, &cmd.code)
                .await
                .with_context(|| format!("Lookup failed for {}", cmd.code))?;
            println!("HTTP {}", report.status);
            println!("{}", report.body);
        }
    }

    Ok(())
}
