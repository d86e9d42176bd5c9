use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermCategory {
    /// "Section 16", "Section 16(2)(b)"
    Section,
    /// "Rule 36", "Rule 36(4)"
    Rule,
    /// "Article 246A"
    Article,
    /// "Chapter V"
    Chapter,
    /// "Schedule III"
    Schedule,
    /// Return and form codes such as "GSTR-3B"
    Form,
    /// Controlled domain vocabulary such as "ITC"
    Abbreviation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTerm {
    /// As written in the query, internal whitespace collapsed
    pub text: String,
    pub category: TermCategory,
}

/// A query as the pipeline sees it. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub raw_text: String,
    pub extracted_terms: Vec<String>,
}

impl Query {
    pub fn parse(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let extracted_terms = QueryAnalyzer::extract_terms(&raw_text);
        Self {
            raw_text,
            extracted_terms,
        }
    }
}

const SUB_CLAUSE: &str = r"(?:\s*\(\s*[0-9A-Za-z]{1,4}\s*\))*";

const ABBREVIATIONS: &[&str] = &[
    "ITC", "GSTIN", "CGST", "SGST", "IGST", "UTGST", "GST", "HSN", "SAC", "RCM", "TDS", "TCS",
    "ISD", "LUT", "MRP", "E-way bill", "Composition scheme",
];

/// Ordered rule table. Earlier rules win when two matches start at the same offset.
static RULES: Lazy<Vec<(Regex, TermCategory)>> = Lazy::new(|| {
    let vocabulary = ABBREVIATIONS
        .iter()
        .map(|term| regex::escape(term).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");

    [
        (format!(r"(?i)\bsection\s+\d+[A-Z]{{0,2}}{SUB_CLAUSE}"), TermCategory::Section),
        (format!(r"(?i)\brule\s+\d+[A-Z]{{0,2}}{SUB_CLAUSE}"), TermCategory::Rule),
        (format!(r"(?i)\barticle\s+\d+[A-Z]{{0,2}}{SUB_CLAUSE}"), TermCategory::Article),
        (r"(?i)\bchapter\s+(?:(?-i:[IVXLC]+)|\d+)\b".to_string(), TermCategory::Chapter),
        (r"(?i)\bschedule\s+(?:(?-i:[IVXLC]+)|\d+)\b".to_string(), TermCategory::Schedule),
        (r"(?i)\b(?:GSTR|GST\s+REG|CMP|ITC)-\d{1,2}[A-Z]?\b".to_string(), TermCategory::Form),
        (format!(r"(?i)\b(?:{vocabulary})\b"), TermCategory::Abbreviation),
    ]
    .into_iter()
    .filter_map(|(pattern, category)| match Regex::new(&pattern) {
        Ok(regex) => Some((regex, category)),
        Err(err) => {
            log::error!("Invalid term pattern {pattern}: {err}");
            None
        }
    })
    .collect()
});

/// Pattern-based salient term extraction
pub struct QueryAnalyzer;

impl QueryAnalyzer {
    /// Salient terms in order of first appearance, deduplicated case-insensitively.
    /// Unmatched input yields an empty list.
    #[must_use]
    pub fn extract_terms(query: &str) -> Vec<String> {
        Self::analyze(query).into_iter().map(|t| t.text).collect()
    }

    #[must_use]
    pub fn analyze(query: &str) -> Vec<ExtractedTerm> {
        let mut matches: Vec<(usize, usize, usize, TermCategory)> = Vec::new();
        for (priority, (regex, category)) in RULES.iter().enumerate() {
            for m in regex.find_iter(query) {
                matches.push((m.start(), m.end(), priority, *category));
            }
        }

        // Leftmost first, then longest, then rule order
        matches.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| (b.1 - b.0).cmp(&(a.1 - a.0)))
                .then_with(|| a.2.cmp(&b.2))
        });

        let mut terms = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut covered_until = 0usize;
        for (start, end, _, category) in matches {
            if start < covered_until {
                continue;
            }
            covered_until = end;

            let text = collapse_whitespace(&query[start..end]);
            if seen.insert(text.to_lowercase()) {
                terms.push(ExtractedTerm { text, category });
            }
        }
        terms
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
