//! Result types produced by the extraction and scan pipeline.
//!
//! Everything here is plain data plus `Serialize`, so the CLI can dump it as
//! JSON, and the two HTML helpers so a presentation layer can drop the match
//! tables straight into a page.

use crate::catalog::Ingredient;
use crate::error::PageError;
use serde::Serialize;
use std::fmt;

/// Text of one PDF page that produced non-empty output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageText {
    /// Extracted text, line breaks preserved.
    pub text: String,
    /// 1-indexed page number.
    pub page_num: usize,
}

impl PageText {
    pub fn new(text: impl Into<String>, page_num: usize) -> Self {
        Self {
            text: text.into(),
            page_num,
        }
    }
}

/// Result of running the text extractor over a whole document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractedDocument {
    /// Pages with text, in page order.
    pub pages: Vec<PageText>,
    /// One entry per empty or failed page, in page order.
    pub warnings: Vec<PageError>,
    /// Page count reported by the document.
    pub total_pages: usize,
}

/// The two toxicology reference values the scanner looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    /// No-Observed-Adverse-Effect-Level.
    Noael,
    /// Median lethal dose.
    Ld50,
}

impl ValueKind {
    pub const ALL: [ValueKind; 2] = [ValueKind::Noael, ValueKind::Ld50];

    pub fn label(self) -> &'static str {
        match self {
            ValueKind::Noael => "NOAEL",
            ValueKind::Ld50 => "LD50",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One matching line with its context, already highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Previous line + `\n` + matching line, with inline markup.
    pub snippet: String,
    /// 1-indexed page the line was found on.
    pub page_num: usize,
}

/// Matches grouped by value kind, in page order then line order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSet {
    pub noael: Vec<Match>,
    pub ld50: Vec<Match>,
}

impl MatchSet {
    pub fn get(&self, kind: ValueKind) -> &[Match] {
        match kind {
            ValueKind::Noael => &self.noael,
            ValueKind::Ld50 => &self.ld50,
        }
    }

    pub(crate) fn push(&mut self, kind: ValueKind, m: Match) {
        match kind {
            ValueKind::Noael => self.noael.push(m),
            ValueKind::Ld50 => self.ld50.push(m),
        }
    }

    /// Total matches across both kinds.
    pub fn len(&self) -> usize {
        self.noael.len() + self.ld50.len()
    }

    /// True when no line matched either pattern.
    pub fn is_empty(&self) -> bool {
        self.noael.is_empty() && self.ld50.is_empty()
    }

    /// Render the matches of one kind as an HTML table.
    ///
    /// Snippet markup is inserted as-is (it *is* the highlighting); only the
    /// line break is converted to `<br>`. Columns: `"<KIND> value"`, `"Page"`.
    pub fn to_html_table(&self, kind: ValueKind) -> String {
        let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n");
        html.push_str(&format!(
            "  <thead>\n    <tr>\n      <th>{} value</th>\n      <th>Page</th>\n    </tr>\n  </thead>\n",
            kind.label()
        ));
        html.push_str("  <tbody>\n");
        for m in self.get(kind) {
            html.push_str(&format!(
                "    <tr>\n      <td>{}</td>\n      <td>{}</td>\n    </tr>\n",
                m.snippet.replace('\n', "<br>"),
                m.page_num
            ));
        }
        html.push_str("  </tbody>\n</table>\n");
        html
    }

    /// Render both tables with headings, skipping a kind with no matches.
    pub fn to_html(&self) -> String {
        if self.is_empty() {
            return format!("<p>{NO_MATCHES_MESSAGE}</p>\n");
        }
        let mut html = String::new();
        for kind in ValueKind::ALL {
            if self.get(kind).is_empty() {
                continue;
            }
            html.push_str(&format!("<h3>{} values found:</h3>\n", kind.label()));
            html.push_str(&self.to_html_table(kind));
        }
        html
    }
}

/// Informational message for a scan that found nothing.
pub const NO_MATCHES_MESSAGE: &str = "No NOAEL or LD50 values found.";

/// Counters for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Pages in the document.
    pub total_pages: usize,
    /// Pages that produced text.
    pub text_pages: usize,
    /// Pages that produced no text.
    pub empty_pages: usize,
    /// Pages whose extraction errored.
    pub failed_pages: usize,
    pub noael_matches: usize,
    pub ld50_matches: usize,
    /// Wall-clock time for extraction + scan.
    pub duration_ms: u64,
}

/// Output of scanning one PDF.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanOutput {
    pub matches: MatchSet,
    /// Per-page warnings, in page order.
    pub warnings: Vec<PageError>,
    pub stats: ScanStats,
}

impl ScanOutput {
    /// A standalone HTML page: title, page warnings, then the match tables.
    ///
    /// The title and warnings are escaped; the match snippets are not.
    pub fn to_html_document(&self, title: &str) -> String {
        let title = escape_html(title);
        let mut html = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n"
        );
        if !self.warnings.is_empty() {
            html.push_str("<ul class=\"warnings\">\n");
            for w in &self.warnings {
                html.push_str(&format!("  <li>{}</li>\n", escape_html(&w.to_string())));
            }
            html.push_str("</ul>\n");
        }
        html.push_str(&self.matches.to_html());
        html.push_str("</body>\n</html>\n");
        html
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Output of the full ingredient → report → scan flow.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientReport {
    pub ingredient: Ingredient,
    /// Absolute URL of the report PDF that was scanned.
    pub pdf_url: String,
    pub output: ScanOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchSet {
        MatchSet {
            noael: vec![Match {
                snippet: "oral study\n<span>NOAEL</span> 5 mg/kg".into(),
                page_num: 3,
            }],
            ld50: vec![],
        }
    }

    #[test]
    fn len_and_empty() {
        assert!(MatchSet::default().is_empty());
        let s = sample();
        assert_eq!(s.len(), 1);
        assert!(!s.is_empty());
        assert_eq!(s.get(ValueKind::Noael).len(), 1);
        assert!(s.get(ValueKind::Ld50).is_empty());
    }

    #[test]
    fn html_table_keeps_markup_raw() {
        let html = sample().to_html_table(ValueKind::Noael);
        assert!(html.contains("<th>NOAEL value</th>"));
        assert!(html.contains("<th>Page</th>"));
        assert!(html.contains("oral study<br><span>NOAEL</span> 5 mg/kg"));
        assert!(html.contains("<td>3</td>"));
        assert!(!html.contains("&lt;span"));
    }

    #[test]
    fn html_skips_empty_kind() {
        let html = sample().to_html();
        assert!(html.contains("NOAEL values found"));
        assert!(!html.contains("LD50 values found"));
    }

    #[test]
    fn html_no_matches_message() {
        assert!(MatchSet::default().to_html().contains(NO_MATCHES_MESSAGE));
    }

    #[test]
    fn html_document_escapes_title_and_warnings_only() {
        let out = ScanOutput {
            matches: sample(),
            warnings: vec![PageError::ExtractionFailed {
                page: 2,
                detail: "bad <stream>".into(),
            }],
            stats: ScanStats::default(),
        };
        let html = out.to_html_document("Sodium <Lauryl> & Co");
        assert!(html.contains("<h1>Sodium &lt;Lauryl&gt; &amp; Co</h1>"));
        assert!(html.contains("bad &lt;stream&gt;"));
        assert!(html.contains("<span>NOAEL</span>"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn value_kind_labels() {
        assert_eq!(ValueKind::Noael.to_string(), "NOAEL");
        assert_eq!(ValueKind::Ld50.label(), "LD50");
    }
}
