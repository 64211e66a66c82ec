//! Free-text catalog search: exact → substring → fuzzy, in strict tier order.
//!
//! The first tier that yields any rows wins. The fuzzy tier scores distinct
//! candidate values with a deterministic token-based similarity on a 0–100
//! scale and keeps every value at or above the caller's threshold.
//!
//! Dimension filters (region, mitra, period, …) are applied upstream by the
//! store's `list_*` queries; this module only sees the resulting working set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Default minimum fuzzy score for a candidate to be kept.
pub const DEFAULT_THRESHOLD: u8 = 85;

/// Default maximum number of distinct candidates considered during fuzzy
/// scoring. Not a cap on the number of rows returned.
pub const DEFAULT_LIMIT: usize = 20;

// ─── Normalization ───────────────────────────────────────────────────────────

/// Canonical form used by the fuzzy tier: lowercase, every character that is
/// neither alphanumeric nor whitespace replaced with a space, whitespace runs
/// collapsed, ends trimmed.
pub fn normalize(text: &str) -> String {
  let mut mapped = String::with_capacity(text.len());
  for c in text.chars() {
    if c.is_alphanumeric() {
      mapped.extend(c.to_lowercase());
    } else {
      mapped.push(' ');
    }
  }
  mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ─── Similarity scoring ──────────────────────────────────────────────────────

/// Edit distance over characters, two-row DP.
fn levenshtein(a: &str, b: &str) -> usize {
  let a: Vec<char> = a.chars().collect();
  let b: Vec<char> = b.chars().collect();
  if a.is_empty() {
    return b.len();
  }
  if b.is_empty() {
    return a.len();
  }

  let mut prev: Vec<usize> = (0..=b.len()).collect();
  let mut curr: Vec<usize> = vec![0; b.len() + 1];

  for (i, &ca) in a.iter().enumerate() {
    curr[0] = i + 1;
    for (j, &cb) in b.iter().enumerate() {
      let cost = usize::from(ca != cb);
      curr[j + 1] = (prev[j + 1] + 1)
        .min(curr[j] + 1)
        .min(prev[j] + cost);
    }
    std::mem::swap(&mut prev, &mut curr);
  }
  prev[b.len()]
}

/// Edit-distance similarity on a 0–100 scale. Two empty strings are a
/// perfect match.
fn ratio(a: &str, b: &str) -> u8 {
  let longest = a.chars().count().max(b.chars().count());
  if longest == 0 {
    return 100;
  }
  (((longest - levenshtein(a, b)) * 100) / longest) as u8
}

fn sort_tokens(s: &str) -> String {
  let mut tokens: Vec<&str> = s.split_whitespace().collect();
  tokens.sort_unstable();
  tokens.join(" ")
}

/// [`ratio`] over alphabetically sorted tokens, so word order is ignored.
fn token_sort_ratio(a: &str, b: &str) -> u8 {
  ratio(&sort_tokens(a), &sort_tokens(b))
}

/// Best [`ratio`] of the shorter string against every same-length character
/// window of the longer one. Lets a short query score well against a long
/// candidate that contains a near-match of it.
fn partial_ratio(a: &str, b: &str) -> u8 {
  let (short, long) = if a.chars().count() <= b.chars().count() {
    (a, b)
  } else {
    (b, a)
  };
  let short_chars: Vec<char> = short.chars().collect();
  let long_chars: Vec<char> = long.chars().collect();

  if short_chars.is_empty() {
    return if long_chars.is_empty() { 100 } else { 0 };
  }
  if short_chars.len() == long_chars.len() {
    return ratio(short, long);
  }

  let width = short_chars.len();
  let mut best = 0u8;
  for start in 0..=(long_chars.len() - width) {
    let window: String = long_chars[start..start + width].iter().collect();
    best = best.max(ratio(short, &window));
    if best == 100 {
      break;
    }
  }
  best
}

/// Deterministic token-based similarity between two raw strings, 0–100.
///
/// Both inputs pass through [`normalize`] first. The score is the better of
/// a token-sort ratio and a partial ratio, so both reordered words and a
/// misspelled fragment of a longer name score high.
pub fn similarity(a: &str, b: &str) -> u8 {
  let a = normalize(a);
  let b = normalize(b);
  token_sort_ratio(&a, &b).max(partial_ratio(&a, &b))
}

// ─── Tiered search ───────────────────────────────────────────────────────────

/// Which tier produced a non-empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
  Exact,
  Substring,
  Fuzzy,
}

/// Caller-facing matching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
  /// Case-insensitive full-string equality only.
  Exact,
  /// The tiered engine, fuzzy fallback included.
  Fuzzy,
  /// Exact first, fall back to the tiered engine.
  #[default]
  Auto,
}

/// The matching rows plus the tier that produced them. `tier` is `None` when
/// the query was empty (input returned unchanged) or nothing matched.
#[derive(Debug)]
pub struct SearchResult<T> {
  pub rows: Vec<T>,
  pub tier: Option<MatchTier>,
}

/// Three-tier search of `rows` by the text attribute selected with `field`.
///
/// Rows whose field value is missing never match and are excluded from the
/// fuzzy candidate set. `limit` bounds how many distinct candidates the
/// fuzzy tier scores (best-scoring first, ties broken by value), not how
/// many rows come back.
pub fn search_by<T, F>(
  rows:      Vec<T>,
  query:     &str,
  field:     F,
  threshold: u8,
  limit:     usize,
) -> SearchResult<T>
where
  F: Fn(&T) -> Option<&str>,
{
  if query.is_empty() || rows.is_empty() {
    return SearchResult { rows, tier: None };
  }

  let query_lower = query.to_lowercase();

  // Each tier splits the working set in one pass, so a field value is
  // lowercased once per tier. An empty match hands the full set on to the
  // next tier.

  // Tier 1: exact.
  let (exact, rest): (Vec<T>, Vec<T>) = rows
    .into_iter()
    .partition(|r| field(r).is_some_and(|v| v.to_lowercase() == query_lower));
  if !exact.is_empty() {
    return SearchResult { rows: exact, tier: Some(MatchTier::Exact) };
  }

  // Tier 2: substring.
  let (contains, rest): (Vec<T>, Vec<T>) = rest.into_iter().partition(|r| {
    field(r).is_some_and(|v| v.to_lowercase().contains(&query_lower))
  });
  if !contains.is_empty() {
    return SearchResult { rows: contains, tier: Some(MatchTier::Substring) };
  }
  let rows = rest;

  // Tier 3: fuzzy over distinct field values.
  let mut choices: Vec<String> = rows
    .iter()
    .filter_map(|r| field(r))
    .map(str::to_owned)
    .collect();
  choices.sort_unstable();
  choices.dedup();

  let mut scored: Vec<(u8, String)> = choices
    .into_iter()
    .map(|c| (similarity(query, &c), c))
    .collect();
  scored.sort_by(|x, y| y.0.cmp(&x.0).then_with(|| x.1.cmp(&y.1)));
  scored.truncate(limit);

  let retained: BTreeSet<String> = scored
    .into_iter()
    .filter(|(score, _)| *score >= threshold)
    .map(|(_, value)| value)
    .collect();

  if retained.is_empty() {
    return SearchResult { rows: Vec::new(), tier: None };
  }

  let rows = rows
    .into_iter()
    .filter(|r| field(r).is_some_and(|v| retained.contains(v)))
    .collect();
  SearchResult { rows, tier: Some(MatchTier::Fuzzy) }
}

/// Apply `mode` on top of [`search_by`].
///
/// Auto needs no separate exact pass — exact is already the engine's first
/// tier, so auto and fuzzy-only share the same call.
pub fn search_with_mode<T, F>(
  rows:      Vec<T>,
  query:     &str,
  field:     F,
  mode:      SearchMode,
  threshold: u8,
  limit:     usize,
) -> SearchResult<T>
where
  F: Fn(&T) -> Option<&str>,
{
  if query.is_empty() || rows.is_empty() {
    return SearchResult { rows, tier: None };
  }

  match mode {
    SearchMode::Exact => {
      let query_lower = query.to_lowercase();
      let rows: Vec<T> = rows
        .into_iter()
        .filter(|r| field(r).is_some_and(|v| v.to_lowercase() == query_lower))
        .collect();
      let tier = (!rows.is_empty()).then_some(MatchTier::Exact);
      SearchResult { rows, tier }
    }
    SearchMode::Fuzzy | SearchMode::Auto => {
      search_by(rows, query, field, threshold, limit)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Item {
    name: Option<&'static str>,
  }

  fn items(names: &[Option<&'static str>]) -> Vec<Item> {
    names.iter().map(|n| Item { name: *n }).collect()
  }

  fn names(result: &SearchResult<Item>) -> Vec<&'static str> {
    result.rows.iter().filter_map(|i| i.name).collect()
  }

  // ── Normalization ─────────────────────────────────────────────────────────

  #[test]
  fn normalize_lowercases_and_strips_punctuation() {
    assert_eq!(normalize("  VERBAN 8x4, PER-CM  "), "verban 8x4 per cm");
    assert_eq!(normalize("A   B\t C"), "a b c");
    assert_eq!(normalize("!!!"), "");
  }

  // ── Similarity ────────────────────────────────────────────────────────────

  #[test]
  fn similarity_is_100_for_equal_text_modulo_normalization() {
    assert_eq!(similarity("Paracetamol", "paracetamol"), 100);
    assert_eq!(similarity("X-RAY THORAX", "x ray thorax"), 100);
  }

  #[test]
  fn similarity_ignores_token_order() {
    assert_eq!(similarity("thorax x-ray", "X-RAY THORAX"), 100);
  }

  #[test]
  fn similarity_is_deterministic() {
    let a = "parasetamol";
    let b = "Paracetamol 500mg";
    assert_eq!(similarity(a, b), similarity(a, b));
  }

  #[test]
  fn similarity_of_unrelated_names_is_low() {
    assert!(similarity("amoxicillin", "X-RAY THORAX") < 50);
  }

  // ── Tier order ────────────────────────────────────────────────────────────

  #[test]
  fn exact_tier_wins_over_substring() {
    let rows = items(&[Some("Paracetamol 500mg"), Some("Paracetamol")]);
    let result = search_by(rows, "Paracetamol", |i| i.name, 85, 20);
    assert_eq!(result.tier, Some(MatchTier::Exact));
    assert_eq!(names(&result), ["Paracetamol"]);
  }

  #[test]
  fn exact_tier_ignores_threshold_and_limit() {
    let rows = items(&[Some("Paracetamol"), Some("Ibuprofen")]);
    let result = search_by(rows, "PARACETAMOL", |i| i.name, 100, 0);
    assert_eq!(result.tier, Some(MatchTier::Exact));
    assert_eq!(names(&result), ["Paracetamol"]);
  }

  #[test]
  fn substring_tier_engages_without_exact_match() {
    let rows = items(&[Some("Paracetamol 500mg"), Some("Paracetamol Syrup")]);
    let result = search_by(rows, "paracetamol", |i| i.name, 85, 20);
    assert_eq!(result.tier, Some(MatchTier::Substring));
    assert_eq!(names(&result).len(), 2);
  }

  #[test]
  fn fuzzy_tier_matches_misspelled_query_at_threshold_60() {
    let rows = items(&[Some("Paracetamol 500mg")]);
    let result = search_by(rows, "parasetamol", |i| i.name, 60, 20);
    assert_eq!(result.tier, Some(MatchTier::Fuzzy));
    assert_eq!(names(&result), ["Paracetamol 500mg"]);
  }

  #[test]
  fn fuzzy_tier_rejects_misspelled_query_at_threshold_99() {
    let rows = items(&[Some("Paracetamol 500mg")]);
    let result = search_by(rows, "parasetamol", |i| i.name, 99, 20);
    assert_eq!(result.tier, None);
    assert!(result.rows.is_empty());
  }

  #[test]
  fn fuzzy_tier_returns_every_row_with_a_retained_value() {
    // Two rows share the matching value; both come back.
    let rows = items(&[
      Some("Paracetamol 500mg"),
      Some("Paracetamol 500mg"),
      Some("Amoxicillin"),
    ]);
    let result = search_by(rows, "parasetamol 500mg", |i| i.name, 60, 20);
    assert_eq!(result.tier, Some(MatchTier::Fuzzy));
    assert_eq!(names(&result).len(), 2);
  }

  #[test]
  fn fuzzy_candidate_limit_keeps_best_scores() {
    let rows = items(&[Some("parasetamol x"), Some("paracetamol")]);
    // Both values clear a threshold of 1, but with room for one candidate
    // only the closer value survives.
    let result = search_by(rows, "paracetamoll", |i| i.name, 1, 1);
    assert_eq!(result.tier, Some(MatchTier::Fuzzy));
    assert_eq!(names(&result), ["paracetamol"]);
  }

  // ── Degenerate inputs ─────────────────────────────────────────────────────

  #[test]
  fn empty_query_returns_input_unchanged() {
    let rows = items(&[Some("Paracetamol"), None]);
    let result = search_by(rows, "", |i| i.name, 85, 20);
    assert_eq!(result.tier, None);
    assert_eq!(result.rows.len(), 2);
  }

  #[test]
  fn empty_input_returns_empty() {
    let result = search_by(items(&[]), "anything", |i| i.name, 85, 20);
    assert_eq!(result.tier, None);
    assert!(result.rows.is_empty());
  }

  #[test]
  fn rows_with_missing_field_never_match() {
    let rows = items(&[Some("Paracetamol"), None]);
    let result = search_by(rows, "parasetamol", |i| i.name, 60, 20);
    assert_eq!(names(&result), ["Paracetamol"]);
  }

  // ── Modes ─────────────────────────────────────────────────────────────────

  #[test]
  fn exact_mode_does_not_fall_back() {
    let rows = items(&[Some("Paracetamol 500mg")]);
    let result =
      search_with_mode(rows, "parasetamol", |i| i.name, SearchMode::Exact, 60, 20);
    assert_eq!(result.tier, None);
    assert!(result.rows.is_empty());
  }

  #[test]
  fn auto_mode_surfaces_the_producing_tier() {
    let rows = items(&[Some("Paracetamol")]);
    let result =
      search_with_mode(rows, "paracetamol", |i| i.name, SearchMode::Auto, 60, 20);
    assert_eq!(result.tier, Some(MatchTier::Exact));

    let rows = items(&[Some("Paracetamol 500mg")]);
    let result =
      search_with_mode(rows, "parasetamol", |i| i.name, SearchMode::Auto, 60, 20);
    assert_eq!(result.tier, Some(MatchTier::Fuzzy));
  }
}
