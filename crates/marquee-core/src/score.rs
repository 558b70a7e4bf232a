//! Title similarity and year-aware candidate scoring.

/// Normalized edit similarity in [0, 1], ignoring case.
///
/// `(max_len - levenshtein) / max_len`, measured in characters; two empty
/// strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(&a, &b);
    (max_len - distance) as f64 / max_len as f64
}

/// Score a candidate title/year against the queried title/year.
///
/// | title | year | score |
/// |---|---|---|
/// | identical | equal | 1.0 |
/// | identical | differs by d | 0.9 - 0.05·d |
/// | similar (s) | equal | 0.8·s |
/// | similar (s) | differs by d | s·(1 - 0.1·d) |
///
/// Large year gaps can push the score below zero; callers treat that as no match.
pub fn compute_score(
    candidate_title: &str,
    candidate_year: u16,
    query_title: &str,
    query_year: u16,
) -> f64 {
    let sim = similarity(candidate_title, query_title);
    let year_diff = f64::from(candidate_year.abs_diff(query_year));

    if sim == 1.0 && year_diff == 0.0 {
        1.0
    } else if sim == 1.0 {
        0.9 - 0.05 * year_diff
    } else if year_diff == 0.0 {
        0.8 * sim
    } else {
        sim * (1.0 - 0.1 * year_diff)
    }
}
