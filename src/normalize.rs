//! Post-coordinated expression normalizer.
//!
//! Turns `264476002 |surgical action| : { 405813007 |procedure site| = 181216001 }`
//! into `264476002:{405813007=181216001}` by running a fixed sequence of
//! small rewrite passes. Each pass is public so it can be checked on its own.
//!
//! This is a best-effort rewriter, not an expression parser: with unbalanced
//! `|` delimiters the first complete span is removed and the stray pipe is
//! dropped later as a non-structural character.

use regex::Regex;
use std::sync::LazyLock;

static TERM_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|[^|]*\|").expect("Invalid term span regex"));

static LEGACY_TERM_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\s*[^|]+\s*\|").expect("Invalid legacy term span regex"));

static NON_STRUCTURAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9{}=:,\s]").expect("Invalid structural filter regex"));

static PADDED_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([{}=:,])\s*").expect("Invalid symbol padding regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

// One or more `,=` left in front of a closing brace once term text is gone.
static DANGLING_REFINEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:,=)+\}").expect("Invalid dangling refinement regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum NormalizeMode {
    /// Keep only digits and `{ } = : ,`, bound tightly.
    #[default]
    Strict,
    /// Drop term text and all whitespace, keep every other character.
    Legacy,
}

pub fn normalize(raw: &str, mode: NormalizeMode) -> String {
    match mode {
        NormalizeMode::Strict => normalize_strict(raw),
        NormalizeMode::Legacy => normalize_legacy(raw),
    }
}

pub fn normalize_strict(raw: &str) -> String {
    let text = strip_term_spans(raw);
    let text = keep_structural_chars(&text);
    let text = tighten_symbols(&text);
    drop_dangling_refinements(&text)
}

/// Single pass over the input. Unlike [`normalize_strict`] this is not
/// idempotent: a pipe left behind by an unbalanced span can pair up with a
/// later one on a second run.
pub fn normalize_legacy(raw: &str) -> String {
    let text = LEGACY_TERM_SPAN.replace_all(raw, "");
    remove_whitespace(&text)
}

/// Removes every `|term|` span, delimiters included.
pub fn strip_term_spans(text: &str) -> String {
    TERM_SPAN.replace_all(text, "").into_owned()
}

/// Drops everything except digits, structural symbols and whitespace.
pub fn keep_structural_chars(text: &str) -> String {
    NON_STRUCTURAL.replace_all(text, "").into_owned()
}

/// Binds symbols to their neighbours and collapses any remaining whitespace
/// run to a single space.
pub fn tighten_symbols(text: &str) -> String {
    let text = PADDED_SYMBOL.replace_all(text, "$1");
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// `,=}` becomes `}`.
pub fn drop_dangling_refinements(text: &str) -> String {
    DANGLING_REFINEMENT.replace_all(text, "}").into_owned()
}

pub fn remove_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, "").into_owned()
}
