//! Inline highlighting of context snippets.
//!
//! Two independent passes, applied in this order:
//!
//! 1. Comma-grouped numbers (`1,234` / `1,234.56`) are wrapped in red bold.
//! 2. Domain keywords (species, value names, dose units) are wrapped in a
//!    yellow-background span. Matching is case-sensitive and whole-word.
//!
//! The output is HTML meant to be rendered unescaped. Running
//! [`highlight`] on its own output wraps the keywords a second time; callers
//! highlight each plain snippet exactly once.

use once_cell::sync::Lazy;
use regex::Regex;

/// Words and units emphasised in step 2.
pub const HIGHLIGHT_WORDS: [&str; 9] = [
    "rat",
    "NOAEL",
    "LD50",
    "rats",
    "rabbits",
    "ld50",
    "g/kg",
    "mg/kg/day",
    "mg/kg",
];

/// Markup around comma-grouped numbers.
pub const NUMBER_OPEN: &str = r#"<b style="color:red;">"#;
pub const NUMBER_CLOSE: &str = "</b>";
/// Markup around keywords.
pub const KEYWORD_OPEN: &str = r#"<span style="background-color:yellow; color:black;">"#;
pub const KEYWORD_CLOSE: &str = "</span>";

static RE_GROUPED_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+,\d+\.?\d*)").unwrap());

static RE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    let alternation = HIGHLIGHT_WORDS
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b({alternation})\b")).unwrap()
});

/// Apply both highlighting passes. Total and deterministic.
pub fn highlight(text: &str) -> String {
    let s = highlight_numbers(text);
    highlight_keywords(&s)
}

fn highlight_numbers(text: &str) -> String {
    RE_GROUPED_NUMBER
        .replace_all(text, format!("{NUMBER_OPEN}${{1}}{NUMBER_CLOSE}"))
        .into_owned()
}

fn highlight_keywords(text: &str) -> String {
    RE_KEYWORD
        .replace_all(text, format!("{KEYWORD_OPEN}${{1}}{KEYWORD_CLOSE}"))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(w: &str) -> String {
        format!("{KEYWORD_OPEN}{w}{KEYWORD_CLOSE}")
    }

    fn num(n: &str) -> String {
        format!("{NUMBER_OPEN}{n}{NUMBER_CLOSE}")
    }

    #[test]
    fn highlights_numbers_and_keywords() {
        let out = highlight("NOAEL 1,234.56 mg/kg in rats");
        let expected = format!(
            "{} {} {} in {}",
            kw("NOAEL"),
            num("1,234.56"),
            kw("mg/kg"),
            kw("rats")
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(highlight("no values on this line"), "no values on this line");
        assert_eq!(highlight(""), "");
    }

    #[test]
    fn number_without_comma_is_not_bold() {
        let out = highlight_numbers("dose of 500 and 2.5 units");
        assert_eq!(out, "dose of 500 and 2.5 units");
    }

    #[test]
    fn number_with_comma_and_no_decimals() {
        assert_eq!(highlight_numbers("2,000 mg"), format!("{} mg", num("2,000")));
    }

    #[test]
    fn keywords_are_whole_word_only() {
        // "rattle" and "pirate" contain "rat" but not at a word boundary.
        assert_eq!(highlight_keywords("rattle pirate"), "rattle pirate");
        assert_eq!(highlight_keywords("a rat bit"), format!("a {} bit", kw("rat")));
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(highlight_keywords("Rats and Noael"), "Rats and Noael");
        assert_eq!(highlight_keywords("ld50 LD50"), format!("{} {}", kw("ld50"), kw("LD50")));
    }

    #[test]
    fn longest_unit_wins() {
        assert_eq!(
            highlight_keywords("5 mg/kg/day orally"),
            format!("5 {} orally", kw("mg/kg/day"))
        );
        assert_eq!(highlight_keywords("2 g/kg"), format!("2 {}", kw("g/kg")));
    }

    #[test]
    fn applying_twice_double_wraps() {
        let once = highlight("NOAEL");
        let twice = highlight(&once);
        assert_ne!(once, twice);
        assert_eq!(twice.matches(KEYWORD_OPEN).count(), 2);
    }

    #[test]
    fn preserves_line_breaks() {
        let out = highlight("previous line\nLD50 was 2,500 mg/kg");
        assert!(out.starts_with("previous line\n"));
        assert!(out.contains(&num("2,500")));
    }
}
