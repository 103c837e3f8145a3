//! Number parsing and label normalization — the two lexical primitives every
//! parser and the resolver build on top of.

use once_cell::sync::Lazy;
use regex::Regex;

const SENTINELS: &[&str] = &["-", "—", "–", "n/a", "#n/a"];

const FILLER_WORDS: &[&str] = &[
    "total", "net", "less", "gross", "of", "the", "and", "in", "from", "for", "to", "at", "on",
];

static PAREN_CONTENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^()]*\)").unwrap());
static NON_LABEL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9& ]").unwrap());
static SEPARATOR_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_\-./\\]").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Coerces a scalar cell value into an `f64`, silently treating anything it
/// cannot parse as `0.0` — callers must not abort ingestion on one bad cell.
pub fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if SENTINELS.contains(&trimmed.to_lowercase().as_str()) {
        return 0.0;
    }

    let stripped: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | '€' | '£' | '¥'))
        .collect();
    let mut s = stripped.trim().to_string();

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') {
        negative = true;
        s = s[1..s.len() - 1].to_string();
    }
    let cleaned = s.trim();

    match cleaned.parse::<f64>() {
        Ok(v) => {
            if negative {
                -v
            } else {
                v
            }
        }
        Err(_) => 0.0,
    }
}

/// Canonical normalization: lowercase, balanced-parenthetical content
/// stripped, separators turned to spaces, non `[a-z0-9& ]` characters
/// dropped, runs of whitespace collapsed.
pub fn normalize(s: &str) -> String {
    let lower = s.trim().to_lowercase();
    let no_parens = PAREN_CONTENT.replace_all(&lower, "");
    let spaced = SEPARATOR_CHARS.replace_all(&no_parens, " ");
    let stripped = NON_LABEL_CHARS.replace_all(&spaced, "");
    MULTI_SPACE
        .replace_all(stripped.trim(), " ")
        .trim()
        .to_string()
}

/// `normalize` plus dropping filler tokens (`total`, `net`, `of`, ...).
pub fn normalize_aggressive(s: &str) -> String {
    let base = normalize(s);
    base.split(' ')
        .filter(|tok| !tok.is_empty() && !FILLER_WORDS.contains(tok))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_numbers() {
        assert_eq!(parse_number("1234"), 1234.0);
        assert_eq!(parse_number("1234.5"), 1234.5);
    }

    #[test]
    fn parses_currency_and_thousands() {
        assert_eq!(parse_number("$1,234.50"), 1234.50);
    }

    #[test]
    fn parses_parenthesized_negatives() {
        assert_eq!(parse_number("(1,234.50)"), -1234.50);
        assert_eq!(parse_number("$(500)"), -500.0);
    }

    #[test]
    fn parses_percent() {
        assert_eq!(parse_number("45%"), 45.0);
    }

    #[test]
    fn sentinel_values_are_zero() {
        for s in ["-", "—", "–", "N/A", "n/a", "#N/A", "", "   "] {
            assert_eq!(parse_number(s), 0.0, "sentinel {s:?} should parse to 0.0");
        }
    }

    #[test]
    fn unparseable_non_sentinel_is_zero() {
        assert_eq!(parse_number("garbage"), 0.0);
    }

    #[test]
    fn normalize_strips_parens_and_punctuation() {
        assert_eq!(normalize("Total Revenue (Net)"), "total revenue");
        assert_eq!(normalize("R&D Expense"), "rd expense");
        assert_eq!(normalize("Accounts_Receivable/Trade"), "accounts receivable trade");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  Cash   and   Equivalents  "), "cash and equivalents");
    }

    #[test]
    fn normalize_aggressive_drops_filler_words() {
        assert_eq!(normalize_aggressive("Total Net Revenue"), "revenue");
        assert_eq!(normalize_aggressive("Gross Profit"), "profit");
        assert_eq!(normalize_aggressive("Cost of Goods Sold"), "cost goods sold");
    }
}
