// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discussion theme extraction.
//!
//! Scores discussion text against a fixed vocabulary of leadership topics.
//! Pure and deterministic: the same inputs always yield the same themes.

/// Leadership topic vocabulary, in declaration order.
///
/// Declaration order is the tie-break for equal occurrence counts, so the
/// ordering here is a ranking of default salience, not alphabetical.
const VOCABULARY: &[&str] = &[
    "delegation",
    "boundaries",
    "accountability",
    "feedback",
    "burnout",
    "time management",
    "conflict",
    "trust",
    "decision making",
    "motivation",
];

/// Returned when no vocabulary term occurs in the input at all.
///
/// Downstream generation prompts require at least one theme, so the result
/// set is never empty.
const FALLBACK_THEME: &str = "personal leadership challenges";

/// Maximum number of themes returned.
const MAX_THEMES: usize = 3;

/// Extract up to three discussion themes from the given texts.
///
/// All texts are concatenated and case-folded, then each vocabulary term is
/// counted with whitespace-tolerant matching (runs of whitespace in both the
/// text and the term collapse to a single space). Terms are ranked by count
/// descending; ties keep vocabulary declaration order.
pub fn extract_themes(texts: &[String]) -> Vec<String> {
    let haystack = normalize(&texts.join(" "));

    let mut scored: Vec<(usize, &str, usize)> = VOCABULARY
        .iter()
        .enumerate()
        .map(|(index, term)| (index, *term, haystack.matches(term).count()))
        .filter(|(_, _, count)| *count > 0)
        .collect();

    if scored.is_empty() {
        return vec![FALLBACK_THEME.to_string()];
    }

    // Stable sort: equal counts keep declaration order.
    scored.sort_by(|a, b| b.2.cmp(&a.2));

    scored
        .into_iter()
        .take(MAX_THEMES)
        .map(|(_, term, _)| term.to_string())
        .collect()
}

/// Case-fold and collapse all whitespace runs to single spaces.
fn normalize(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}
