//! The field resolver: a deterministic multi-stage matcher from arbitrary
//! input labels to canonical field identifiers.

use crate::mapping::MappingConfig;
use crate::normalize::{normalize, normalize_aggressive};
use crate::schema::{MappingDiagnostics, MappingResult, MatchType, StatementType};

/// Longest-common-substring-based similarity ratio in `[0, 1]`, equivalent
/// to Python's `difflib.SequenceMatcher.ratio()` / Ratcliff-Obershelp: twice
/// the total length of recursively-found matching blocks over the combined
/// length of both strings.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total_len = a_chars.len() + b_chars.len();
    if total_len == 0 {
        return 1.0;
    }
    let matched = matching_block_length(&a_chars, &b_chars);
    (2.0 * matched as f64) / (total_len as f64)
}

fn matching_block_length(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    accumulate_matches(a, b, 0, a.len(), 0, b.len(), &mut total);
    total
}

fn accumulate_matches(
    a: &[char],
    b: &[char],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
    total: &mut usize,
) {
    if a_lo >= a_hi || b_lo >= b_hi {
        return;
    }
    let (i, j, size) = longest_match(a, b, a_lo, a_hi, b_lo, b_hi);
    if size == 0 {
        return;
    }
    *total += size;
    accumulate_matches(a, b, a_lo, i, b_lo, j, total);
    accumulate_matches(a, b, i + size, a_hi, j + size, b_hi, total);
}

/// Longest contiguous matching run between `a[a_lo..a_hi]` and
/// `b[b_lo..b_hi]`, returned as `(start_in_a, start_in_b, length)`.
fn longest_match(
    a: &[char],
    b: &[char],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let width = b_hi - b_lo;
    let mut prev_run = vec![0usize; width];
    let mut best = (a_lo, b_lo, 0usize);

    for i in a_lo..a_hi {
        let mut cur_run = vec![0usize; width];
        for j in b_lo..b_hi {
            if a[i] == b[j] {
                let prior = if j > b_lo { prev_run[j - b_lo - 1] } else { 0 };
                let run = prior + 1;
                cur_run[j - b_lo] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        prev_run = cur_run;
    }
    best
}

/// Cheap pre-filter ahead of the O(len_a * len_b) ratio computation: the
/// Ratcliff/Obershelp ratio can never exceed `1 - lev/total_len`, since the
/// matched length `M` it's built from satisfies `lev <= total_len - 2*M`.
/// Skips the full ratio for aliases that can't possibly clear the threshold.
fn could_reach_threshold(normalized: &str, alias: &str, threshold: f64) -> bool {
    let total_len = normalized.chars().count() + alias.chars().count();
    if total_len == 0 {
        return true;
    }
    let lev = strsim::levenshtein(normalized, alias);
    let max_possible_ratio = 100.0 * (1.0 - lev as f64 / total_len as f64);
    max_possible_ratio >= threshold
}

/// Two top fuzzy candidates count as ambiguous when they name different
/// canonical fields and their ratios sit within this many points of each
/// other.
const AMBIGUITY_MARGIN: f64 = 5.0;

pub struct FieldResolver<'a> {
    config: &'a MappingConfig,
}

impl<'a> FieldResolver<'a> {
    pub fn new(config: &'a MappingConfig) -> Self {
        Self { config }
    }

    /// Resolves a single label against a statement type's alias catalog,
    /// stopping at the first stage that produces a hit.
    pub fn resolve(&self, label: &str, stmt: StatementType) -> MappingResult {
        let normalized = normalize(label);

        if let Some(field) = self.config.exact_lookup(stmt, &normalized) {
            return MappingResult {
                input_name: label.to_string(),
                normalized_name: normalized,
                internal_field: Some(field.to_string()),
                match_type: MatchType::Exact,
                confidence: 1.0,
                fuzzy_candidates: vec![],
            };
        }

        let aggressive = normalize_aggressive(label);
        if let Some(field) = self.config.exact_lookup(stmt, &aggressive) {
            return MappingResult {
                input_name: label.to_string(),
                normalized_name: normalized,
                internal_field: Some(field.to_string()),
                match_type: MatchType::Alias,
                confidence: 0.95,
                fuzzy_candidates: vec![],
            };
        }

        for (alias, canonical) in self.config.sorted_aliases(stmt) {
            if alias.len() > 3 && (alias.contains(&normalized) || normalized.contains(alias.as_str()))
            {
                return MappingResult {
                    input_name: label.to_string(),
                    normalized_name: normalized,
                    internal_field: Some(canonical.clone()),
                    match_type: MatchType::Alias,
                    confidence: 0.85,
                    fuzzy_candidates: vec![],
                };
            }
        }

        let threshold = self.config.settings.fuzzy_threshold() as f64;
        let mut candidates: Vec<(String, String, f64)> = self
            .config
            .sorted_aliases(stmt)
            .iter()
            .filter(|(alias, _)| could_reach_threshold(&normalized, alias, threshold))
            .map(|(alias, canonical)| (alias.clone(), canonical.clone(), similarity_ratio(&normalized, alias) * 100.0))
            .filter(|(_, _, ratio)| *ratio >= threshold)
            .collect();
        candidates.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap().then(a.0.cmp(&b.0)));

        if candidates.is_empty() {
            return MappingResult {
                input_name: label.to_string(),
                normalized_name: normalized,
                internal_field: None,
                match_type: MatchType::Unmapped,
                confidence: 0.0,
                fuzzy_candidates: vec![],
            };
        }

        let top = candidates[0].clone();
        let runner_up_different_field = candidates
            .iter()
            .skip(1)
            .find(|(_, field, _)| field != &top.1);

        let top3: Vec<(String, f64)> = candidates
            .iter()
            .take(3)
            .map(|(alias, _, ratio)| (alias.clone(), *ratio))
            .collect();

        if let Some((_, _, ratio2)) = runner_up_different_field {
            if (top.2 - ratio2).abs() < AMBIGUITY_MARGIN {
                return MappingResult {
                    input_name: label.to_string(),
                    normalized_name: normalized,
                    internal_field: None,
                    match_type: MatchType::Unmapped,
                    confidence: 0.0,
                    fuzzy_candidates: top3,
                };
            }
        }

        MappingResult {
            input_name: label.to_string(),
            normalized_name: normalized,
            internal_field: Some(top.1.clone()),
            match_type: MatchType::Fuzzy,
            confidence: top.2 / 100.0,
            fuzzy_candidates: top3,
        }
    }

    /// Resolves every input label in order, skipping blanks and rejecting
    /// repeats that target a canonical field already claimed by an earlier
    /// label.
    pub fn map_fields(
        &self,
        labels: &[String],
        stmt: StatementType,
    ) -> (std::collections::BTreeMap<String, String>, MappingDiagnostics) {
        let mut mapping = std::collections::BTreeMap::new();
        let mut diagnostics = MappingDiagnostics::new(stmt);
        let mut consumed = std::collections::BTreeSet::new();

        for label in labels {
            if label.trim().is_empty() {
                continue;
            }
            diagnostics.total_input_fields += 1;
            let mut result = self.resolve(label, stmt);

            if let Some(field) = result.internal_field.clone() {
                if consumed.contains(&field) {
                    diagnostics
                        .warnings
                        .push(format!("duplicate target '{field}'; skipping label '{label}'"));
                    result.internal_field = None;
                    result.match_type = MatchType::Unmapped;
                    diagnostics.unmapped_count += 1;
                    diagnostics.unmapped_fields.push(label.clone());
                } else {
                    consumed.insert(field.clone());
                    mapping.insert(label.clone(), field);
                    diagnostics.mapped_count += 1;
                    match result.match_type {
                        MatchType::Exact => diagnostics.exact_matches += 1,
                        MatchType::Alias => diagnostics.alias_matches += 1,
                        MatchType::Fuzzy => diagnostics.fuzzy_matches += 1,
                        MatchType::Unmapped => {}
                    }
                }
            } else {
                diagnostics.unmapped_count += 1;
                diagnostics.unmapped_fields.push(label.clone());
            }

            diagnostics.results.push(result);
        }

        (mapping, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingConfig;

    fn config(yaml: &str) -> MappingConfig {
        MappingConfig::from_yaml(yaml).unwrap()
    }

    #[test]
    fn exact_match_dominates() {
        let cfg = config(
            r#"
income_statement:
  revenue:
    aliases: ["sales"]
"#,
        );
        let resolver = FieldResolver::new(&cfg);
        let result = resolver.resolve("Sales", StatementType::IncomeStatement);
        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.internal_field.as_deref(), Some("revenue"));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn aggressive_exact_strips_filler_words() {
        let cfg = config(
            r#"
income_statement:
  revenue:
    aliases: ["revenue"]
"#,
        );
        let resolver = FieldResolver::new(&cfg);
        let result = resolver.resolve("Total Net Revenue", StatementType::IncomeStatement);
        assert_eq!(result.match_type, MatchType::Alias);
        assert_eq!(result.internal_field.as_deref(), Some("revenue"));
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn substring_containment_matches() {
        let cfg = config(
            r#"
balance_sheet:
  accounts_receivable:
    aliases: ["accounts receivable trade"]
"#,
        );
        let resolver = FieldResolver::new(&cfg);
        // Superset of the declared alias, not equal to it or to the
        // canonical name, so this only resolves via the substring stage.
        let result = resolver.resolve("Accounts Receivable Trade Balance", StatementType::BalanceSheet);
        assert_eq!(result.match_type, MatchType::Alias);
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn fuzzy_match_above_threshold() {
        let cfg = config(
            r#"
settings:
  fuzzy_threshold: 70
income_statement:
  revenue:
    aliases: ["revenues"]
"#,
        );
        let resolver = FieldResolver::new(&cfg);
        let result = resolver.resolve("Revenuez", StatementType::IncomeStatement);
        assert_eq!(result.match_type, MatchType::Fuzzy);
        assert_eq!(result.internal_field.as_deref(), Some("revenue"));
    }

    #[test]
    fn ambiguous_fuzzy_candidates_are_unmapped() {
        let cfg = config(
            r#"
settings:
  fuzzy_threshold: 50
income_statement:
  field_a:
    aliases: ["alpha"]
  field_b:
    aliases: ["alphb"]
"#,
        );
        let resolver = FieldResolver::new(&cfg);
        let result = resolver.resolve("alphx", StatementType::IncomeStatement);
        assert_eq!(result.match_type, MatchType::Unmapped);
        assert_eq!(result.internal_field, None);
        assert_eq!(result.fuzzy_candidates.len(), 2);
    }

    #[test]
    fn below_threshold_is_unmapped() {
        let cfg = config(
            r#"
income_statement:
  revenue:
    aliases: ["sales"]
"#,
        );
        let resolver = FieldResolver::new(&cfg);
        let result = resolver.resolve("zzzzzzzz", StatementType::IncomeStatement);
        assert_eq!(result.match_type, MatchType::Unmapped);
    }

    #[test]
    fn map_fields_skips_duplicate_targets() {
        let cfg = config(
            r#"
income_statement:
  revenue:
    aliases: ["sales", "net revenue"]
"#,
        );
        let resolver = FieldResolver::new(&cfg);
        let labels = vec!["Sales".to_string(), "Net Revenue".to_string()];
        let (mapping, diagnostics) = resolver.map_fields(&labels, StatementType::IncomeStatement);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("Sales"), Some(&"revenue".to_string()));
        assert!(diagnostics.warnings.iter().any(|w| w.contains("duplicate target")));
        assert_eq!(diagnostics.unmapped_count, 1);
    }

    #[test]
    fn map_fields_skips_blank_labels() {
        let cfg = config("income_statement: {}");
        let resolver = FieldResolver::new(&cfg);
        let labels = vec!["  ".to_string(), "".to_string()];
        let (mapping, diagnostics) = resolver.map_fields(&labels, StatementType::IncomeStatement);
        assert!(mapping.is_empty());
        assert_eq!(diagnostics.total_input_fields, 0);
    }

    #[test]
    fn similarity_ratio_identical_strings_is_one() {
        assert_eq!(similarity_ratio("revenue", "revenue"), 1.0);
    }

    #[test]
    fn similarity_ratio_disjoint_strings_is_zero() {
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
    }
}
