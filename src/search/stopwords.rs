//! Stop-word filtering for query terms.

use ahash::AHashSet;
use std::sync::LazyLock;

/// Terms at most this many characters long are dropped when they are stop words.
/// Longer terms survive even if listed, so short acronyms and meaningful words
/// that collide with function words stay searchable.
const MAX_STOP_WORD_LENGTH: usize = 2;

/// Common Portuguese function words.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "ao", "aos", "as", "até", "com", "da", "das", "de", "do", "dos", "e", "em", "na", "nas",
    "no", "nos", "o", "os", "ou", "para", "por", "que", "se", "um", "uma", "uns", "umas", "à",
    "às", "é", "são", "foi", "ser", "ter", "tem", "seu", "sua", "seus", "suas", "me", "te", "lhe",
    "vos", "lhes", "meu", "minha", "meus", "minhas", "teu", "tua", "teus", "tuas", "nosso",
    "nossa", "nossos", "nossas", "este", "esta", "estes", "estas", "esse", "essa", "esses",
    "essas", "aquele", "aquela", "aqueles", "aquelas", "isto", "isso", "aquilo", "mas", "mais",
    "muito", "muita", "muitos", "muitas", "bem", "só", "já", "ainda", "apenas", "quando", "onde",
    "como", "porque", "porquê", "então", "também", "nem", "seja", "pelos", "pelas", "pela",
    "pelo", "entre", "sobre", "sob", "após", "antes", "durante", "desde", "contra", "sem",
    "dentro", "fora", "acima", "abaixo",
];

static STOP_WORD_SET: LazyLock<AHashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Returns true if the term would be removed from a query.
pub fn is_stop_word(term: &str) -> bool {
    term.chars().count() <= MAX_STOP_WORD_LENGTH
        && STOP_WORD_SET.contains(term.to_lowercase().as_str())
}

/// Removes short stop words, preserving the order of the remaining terms.
///
/// The result may be empty; callers treat that as "nothing to search for"
/// rather than falling back to the unfiltered terms.
pub fn filter_stop_words<S: AsRef<str>>(terms: &[S]) -> Vec<String> {
    let kept: Vec<String> = terms
        .iter()
        .map(|term| term.as_ref())
        .filter(|term| !is_stop_word(term))
        .map(str::to_string)
        .collect();

    if kept.len() != terms.len() {
        tracing::debug!(
            "Removed {} stop word(s), kept {:?}",
            terms.len() - kept.len(),
            kept
        );
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case(&["e"], &[])]
    #[case(&["casa", "de", "papel"], &["casa", "papel"])]
    #[case(&["De", "Papel"], &["Papel"])]
    #[case(&["para", "sempre"], &["para", "sempre"])] // "para" is a stop word but longer than 2
    #[case(&["é", "à"], &[])] // length counts characters, not bytes
    #[case(&["xy", "fox"], &["xy", "fox"])]
    fn test_filter(#[case] input: &[&str], #[case] expected: &[&str]) {
        check!(filter_stop_words(input) == expected);
    }

    #[test]
    fn test_order_preserved() {
        let terms = ["zeta", "o", "alpha", "em", "mid"];
        check!(filter_stop_words(&terms) == ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_list_size() {
        check!(STOP_WORD_SET.len() >= 90);
    }
}
