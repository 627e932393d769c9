//! Text normalization for matching spreadsheet text against configuration.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercases, strips accents and collapses whitespace.
///
/// Punctuation is preserved so that numbers like `$7.510` survive folding.
pub fn fold_text(raw: &str) -> String {
    let stripped: String = raw
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Folds text and treats common separators as whitespace.
///
/// Used for header labels where `G-Zero`, `g_zero` and `G  zero` must compare equal.
pub fn normalize_label(raw: &str) -> String {
    fold_text(raw)
        .replace(['_', '-', '.', '/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds an identifier-safe slug: folded alphanumerics joined by `_`.
pub fn slugify(raw: &str) -> String {
    words(raw).join("_")
}

/// Splits folded text into alphanumeric words.
pub fn words(raw: &str) -> Vec<String> {
    fold_text(raw)
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns true when the words of `phrase` appear contiguously in `haystack`.
///
/// The last word only has to start a haystack word, so `retiro` matches
/// `retiros` and `transferencia` matches `transferencias`. Earlier words must
/// match exactly.
pub fn contains_phrase(haystack: &[String], phrase: &str) -> bool {
    let needle = words(phrase);
    let Some((last, leading)) = needle.split_last() else {
        return false;
    };
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| {
        window[..leading.len()] == *leading && window[leading.len()].starts_with(last.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_accents_and_case() {
        assert_eq!(fold_text("  DESCRIPCIÓN  "), "descripcion");
        assert_eq!(fold_text("Plan Premier para cuenta Móvil"), "plan premier para cuenta movil");
        assert_eq!(fold_text("$7.510\tadicional"), "$7.510 adicional");
    }

    #[test]
    fn label_treats_separators_as_spaces() {
        assert_eq!(normalize_label("G-Zero"), "g zero");
        assert_eq!(normalize_label("g_zero"), "g zero");
        assert_eq!(normalize_label("PLAN G - ZERO"), "plan g zero");
    }

    #[test]
    fn slug_joins_words() {
        assert_eq!(slugify("Valor (Sin IVA)"), "valor_sin_iva");
        assert_eq!(slugify("Retiro en cajero / oficina"), "retiro_en_cajero_oficina");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn phrase_matches_whole_words_only() {
        let haystack = words("Transferencia ACH a otros bancos");
        assert!(contains_phrase(&haystack, "ach"));
        assert!(contains_phrase(&haystack, "otros bancos"));
        assert!(!contains_phrase(&words("Despachos"), "ach"));
        assert!(!contains_phrase(&haystack, ""));
        assert!(contains_phrase(&words("Retiros en oficina"), "retiro"));
        assert!(!contains_phrase(&words("Debito digital"), "debito fisico"));
        assert!(contains_phrase(&words("Tarjeta débito digital"), "debito digital"));
    }
}
