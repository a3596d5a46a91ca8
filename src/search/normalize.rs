//! Markdown-to-plain-text normalization for the search corpus.
//!
//! Search matches human-readable words, not markup tokens. Code is dropped
//! entirely: identifiers in code produce noisy hits, and verbatim blocks would
//! skew the proportional line estimate in [`super::matcher`].

use regex::Regex;
use std::sync::LazyLock;

static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```[\s\S]*?```").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`]+`").unwrap());
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]+\)").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*_~`]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strips Markdown and HTML syntax, producing a single-line search corpus.
///
/// The passes are order-sensitive: later patterns assume earlier ones already
/// collapsed their syntax. Links are rewritten before images, so
/// `![alt](url)` ends up as `!alt`.
pub fn normalize(raw: &str) -> String {
    let text = FENCED_CODE.replace_all(raw, "");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = IMAGE.replace_all(&text, "$1");
    let text = HEADING.replace_all(&text, "");
    let text = TAG.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}
