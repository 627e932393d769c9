//! Locale-driven amount parsing and formatting.
//!
//! Parsing is strict: the thousands separator must be followed by groups of
//! exactly three digits, so `8.5` is rejected under a `.`-thousands locale
//! instead of silently becoming 85.

use ratecat_common::fold_text;
use ratecat_config::LocaleProfile;

/// Parses a single amount such as `$7.510`, `1.234.567,89` or `8,50 COP`.
pub fn parse_amount(text: &str, locale: &LocaleProfile) -> Option<f64> {
    let folded = fold_text(text);
    let mut rest = folded.as_str().trim();
    let negative = rest.starts_with('-');
    if negative {
        rest = rest[1..].trim_start();
    }
    rest = strip_decorations(rest, locale);

    let (integer, fraction) = match rest.split_once(locale.decimal_separator) {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rest, None),
    };
    let mut digits = grouped_digits(integer, locale.thousands_separator)?;
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.chars().all(|ch| ch.is_ascii_digit()) {
            return None;
        }
        digits.push('.');
        digits.push_str(fraction);
    }
    let value: f64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Renders `value` the way the locale writes it, e.g. `$7.510` or `$8,5`.
///
/// The fraction is the shortest one that reads back as the same `f64`, so
/// `parse_amount(format_amount(v))` is exact for every finite `v`.
pub fn format_amount(value: f64, locale: &LocaleProfile) -> String {
    let plain = value.abs().to_string();
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), ""));

    let mut grouped = String::with_capacity(plain.len() * 2);
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(locale.thousands_separator);
        }
        grouped.push(ch);
    }
    if !fraction.is_empty() {
        grouped.push(locale.decimal_separator);
        grouped.push_str(fraction);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let symbol = locale.currency_symbols.first().map_or("", String::as_str);
    format!("{sign}{symbol}{grouped}")
}

/// Removes currency symbols on either side and unit suffixes such as `%`.
fn strip_decorations<'a>(mut text: &'a str, locale: &LocaleProfile) -> &'a str {
    let folded = |symbols: &[String]| {
        let mut folded: Vec<String> = symbols
            .iter()
            .map(|symbol| fold_text(symbol))
            .filter(|symbol| !symbol.is_empty())
            .collect();
        folded.sort_by_key(|symbol| std::cmp::Reverse(symbol.len()));
        folded
    };
    let currencies = folded(locale.currency_symbols.as_slice());
    let units = folded(locale.unit_suffixes.as_slice());

    loop {
        let before = text;
        for symbol in &currencies {
            if let Some(stripped) = text.strip_prefix(symbol.as_str()) {
                text = stripped.trim_start();
            }
            if let Some(stripped) = text.strip_suffix(symbol.as_str()) {
                text = stripped.trim_end();
            }
        }
        for unit in &units {
            if let Some(stripped) = text.strip_suffix(unit.as_str()) {
                text = stripped.trim_end();
            }
        }
        if text == before {
            return text;
        }
    }
}

/// Digits of an integer part with optional thousands grouping, separators removed.
fn grouped_digits(integer: &str, separator: char) -> Option<String> {
    if integer.is_empty() {
        return None;
    }
    let groups: Vec<&str> = integer.split(separator).collect();
    let all_digits = |group: &str| !group.is_empty() && group.chars().all(|ch| ch.is_ascii_digit());
    if !groups.iter().all(|group| all_digits(group)) {
        return None;
    }
    if groups.len() > 1 && (groups[0].len() > 3 || groups[1..].iter().any(|g| g.len() != 3)) {
        return None;
    }
    Some(groups.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colombian() -> LocaleProfile {
        LocaleProfile {
            thousands_separator: '.',
            decimal_separator: ',',
            currency_symbols: vec!["$".to_string(), "COP".to_string()],
            unit_suffixes: Vec::new(),
        }
    }

    #[test]
    fn parses_grouped_thousands_and_decimal_comma() {
        let locale = colombian();
        assert_eq!(parse_amount("$8.990", &locale), Some(8990.0));
        assert_eq!(parse_amount("7.510", &locale), Some(7510.0));
        assert_eq!(parse_amount("1.234.567,89", &locale), Some(1_234_567.89));
        assert_eq!(parse_amount("8,50", &locale), Some(8.5));
        assert_eq!(parse_amount("$ 12.000 COP", &locale), Some(12000.0));
        assert_eq!(parse_amount("0", &locale), Some(0.0));
    }

    #[test]
    fn rejects_malformed_grouping_and_text() {
        let locale = colombian();
        assert_eq!(parse_amount("8.5", &locale), None);
        assert_eq!(parse_amount("12.34.567", &locale), None);
        assert_eq!(parse_amount("1234.567", &locale), None);
        assert_eq!(parse_amount("8,", &locale), None);
        assert_eq!(parse_amount("$", &locale), None);
        assert_eq!(parse_amount("Gratis", &locale), None);
        assert_eq!(parse_amount("3 incluidas", &locale), None);
    }

    #[test]
    fn us_locale_is_the_mirror_image() {
        let locale = LocaleProfile::default();
        assert_eq!(parse_amount("$1,234.50", &locale), Some(1234.5));
        assert_eq!(parse_amount("1.234,50", &locale), None);
    }

    #[test]
    fn formats_with_locale_separators() {
        let locale = colombian();
        assert_eq!(format_amount(7510.0, &locale), "$7.510");
        assert_eq!(format_amount(1_234_567.89, &locale), "$1.234.567,89");
        assert_eq!(format_amount(8.5, &locale), "$8,5");
        assert_eq!(format_amount(0.0, &locale), "$0");
        assert_eq!(format_amount(-2100.0, &locale), "-$2.100");
    }

    #[test]
    fn sub_cent_fractions_survive_formatting() {
        let locale = colombian();
        let value = parse_amount("1,234", &locale).expect("amount");
        assert_eq!(value, 1.234);
        assert_eq!(format_amount(value, &locale), "$1,234");
        assert_eq!(parse_amount(&format_amount(value, &locale), &locale), Some(value));
    }

    #[test]
    fn unit_suffixes_are_stripped_after_the_number() {
        let locale = LocaleProfile {
            unit_suffixes: vec!["%".to_string(), "E.A.".to_string()],
            ..colombian()
        };
        assert_eq!(parse_amount("24,5% E.A.", &locale), Some(24.5));
        assert_eq!(parse_amount("1,84 %", &locale), Some(1.84));
        assert_eq!(parse_amount("% 12", &locale), None);
    }
}
