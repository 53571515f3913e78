//! Toxicology value scanner: find NOAEL / LD50 statements in page text.
//!
//! A line matches when it contains the value name followed, somewhere later
//! on the same line, by a number and a unit made of letters and `/`
//! (`NOAEL of 50 mg/kg bw/day`, `oral LD50 in rats was 2,000 mg/kg`).
//! Report text is hard-wrapped, so the line before a match usually holds the
//! start of the sentence; each match is reported together with that line.

use crate::output::{Match, MatchSet, PageText, ValueKind};
use crate::pipeline::highlight::highlight;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_NOAEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(.*?NOAEL.*?\d+\.?\d*\s*[a-zA-Z/]+.*?(\.|$))").unwrap());

static RE_LD50: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(.*?LD50.*?\d+\.?\d*\s*[a-zA-Z/]+.*?(\.|$))").unwrap());

fn pattern(kind: ValueKind) -> &'static Regex {
    match kind {
        ValueKind::Noael => &RE_NOAEL,
        ValueKind::Ld50 => &RE_LD50,
    }
}

/// True when `line` states a value of the given kind.
pub fn line_matches(kind: ValueKind, line: &str) -> bool {
    pattern(kind).is_match(line)
}

/// Scan every page and collect matches of both kinds.
///
/// Order follows page order, then line order within a page. A line that
/// matches both patterns is reported in both lists. Zero pages, or pages
/// with no matching line, give an empty [`MatchSet`].
pub fn scan_pages(pages: &[PageText]) -> MatchSet {
    let mut matches = MatchSet::default();
    for page in pages {
        scan_page(page, &mut matches);
    }
    matches
}

fn scan_page(page: &PageText, matches: &mut MatchSet) {
    let lines: Vec<&str> = page.text.split('\n').collect();

    for (index, line) in lines.iter().enumerate() {
        // Highlight lazily and at most once per line, even when both kinds match.
        let mut highlighted: Option<String> = None;

        for kind in ValueKind::ALL {
            if !line_matches(kind, line) {
                continue;
            }
            let snippet = highlighted
                .get_or_insert_with(|| highlight(&context_snippet(&lines, index)))
                .clone();
            matches.push(
                kind,
                Match {
                    snippet,
                    page_num: page.page_num,
                },
            );
        }
    }
}

/// The line at `index` prefixed by the line before it on the same page.
///
/// The first line of a page gets an empty prefix, so the snippet starts
/// with `\n`; no context is borrowed from the previous page.
pub fn context_snippet(lines: &[&str], index: usize) -> String {
    let previous = if index > 0 { lines[index - 1] } else { "" };
    format!("{previous}\n{}", lines[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str, page_num: usize) -> PageText {
        PageText::new(text, page_num)
    }

    #[test]
    fn noael_line_with_grouped_number() {
        let pages = vec![page(
            "Subchronic oral toxicity study\nNOAEL was 1,234.5 mg/kg in rats.",
            4,
        )];
        let m = scan_pages(&pages);
        assert_eq!(m.noael.len(), 1);
        assert!(m.ld50.is_empty());
        assert_eq!(m.noael[0].page_num, 4);
        assert!(m.noael[0]
            .snippet
            .starts_with("Subchronic oral toxicity study\n"));
        assert!(m.noael[0].snippet.contains(r#"<b style="color:red;">1,234.5</b>"#));
    }

    #[test]
    fn separate_noael_and_ld50_lines() {
        let pages = vec![page(
            "The NOAEL was 5 mg/kg\nThe oral LD50 was 10 mg/kg\n",
            2,
        )];
        let m = scan_pages(&pages);
        assert_eq!(m.noael.len(), 1);
        assert_eq!(m.ld50.len(), 1);
        assert_eq!(m.noael[0].page_num, 2);
        assert_eq!(m.ld50[0].page_num, 2);
        // The LD50 snippet carries the NOAEL line as its context.
        assert!(m.ld50[0].snippet.contains("The "));
        assert!(m.ld50[0].snippet.contains("was 5"));
    }

    #[test]
    fn line_matching_both_kinds_is_reported_twice() {
        let pages = vec![page("NOAEL 50 mg/kg and LD50 2000 mg/kg", 1)];
        let m = scan_pages(&pages);
        assert_eq!(m.noael.len(), 1);
        assert_eq!(m.ld50.len(), 1);
        assert_eq!(m.noael[0].snippet, m.ld50[0].snippet);
    }

    #[test]
    fn first_line_gets_empty_context() {
        let lines = ["LD50 > 5 g/kg", "second"];
        assert_eq!(context_snippet(&lines, 0), "\nLD50 > 5 g/kg");
        assert_eq!(context_snippet(&lines, 1), "LD50 > 5 g/kg\nsecond");
    }

    #[test]
    fn context_never_crosses_pages() {
        let pages = vec![
            page("end of page one text", 1),
            page("NOAEL = 100 mg/kg/day", 2),
        ];
        let m = scan_pages(&pages);
        assert_eq!(m.noael.len(), 1);
        assert!(m.noael[0].snippet.starts_with('\n'));
        assert!(!m.noael[0].snippet.contains("page one"));
    }

    #[test]
    fn case_insensitive_value_names() {
        assert!(line_matches(ValueKind::Noael, "the noael was 3 mg/kg"));
        assert!(line_matches(ValueKind::Ld50, "an ld50 of 300 mg/kg"));
    }

    #[test]
    fn name_without_number_and_unit_does_not_match() {
        assert!(!line_matches(ValueKind::Noael, "NOAEL values are discussed below"));
        assert!(!line_matches(ValueKind::Ld50, "LD50"));
        assert!(!line_matches(ValueKind::Ld50, "LD50 2000"));
    }

    #[test]
    fn order_follows_pages_then_lines() {
        let pages = vec![
            page("NOAEL 1 mg/kg\nfiller\nNOAEL 2 mg/kg", 1),
            page("NOAEL 3 mg/kg", 3),
        ];
        let m = scan_pages(&pages);
        let pages_seen: Vec<usize> = m.noael.iter().map(|x| x.page_num).collect();
        assert_eq!(pages_seen, vec![1, 1, 3]);
        assert!(m.noael[1].snippet.starts_with("filler\n"));
    }

    #[test]
    fn no_pages_gives_empty_set() {
        let m = scan_pages(&[]);
        assert!(m.is_empty());
    }

    #[test]
    fn no_matching_lines_gives_empty_set() {
        let m = scan_pages(&[page("Nothing toxicological here.\nJust prose.", 1)]);
        assert!(m.is_empty());
    }

    #[test]
    fn matches_are_not_deduplicated() {
        let m = scan_pages(&[page("NOAEL 5 mg/kg\nNOAEL 5 mg/kg", 1)]);
        assert_eq!(m.noael.len(), 2);
    }
}
