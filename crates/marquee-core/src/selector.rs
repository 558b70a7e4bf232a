use marquee_api::SearchCandidate;
use serde::{Deserialize, Serialize};

use crate::models::ScoredCandidate;
use crate::score;

/// Scores above this are exact matches.
pub const EXACT_THRESHOLD: f64 = 0.9;

/// Scores above this (and at most [`EXACT_THRESHOLD`]) are close matches.
pub const CLOSE_THRESHOLD: f64 = 0.5;

/// Which candidate wins when more than one lands in the exact tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExactTierPick {
    /// Lowest exact-tier score wins. Matches long-standing behaviour.
    #[default]
    Lowest,
    /// Highest exact-tier score wins.
    Highest,
}

impl std::str::FromStr for ExactTierPick {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lowest" => Ok(Self::Lowest),
            "highest" => Ok(Self::Highest),
            other => Err(format!("unknown exact-tier policy: {other}")),
        }
    }
}

/// Confidence band of the winning candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Exact,
    Close,
}

/// The chosen candidate for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub scored: ScoredCandidate,
    pub tier: Tier,
}

/// Score every candidate that has a derivable year.
///
/// A query without a year is scored as if it matched each candidate's year.
pub fn score_candidates(
    candidates: Vec<SearchCandidate>,
    query: &str,
    query_year: Option<u16>,
) -> Vec<ScoredCandidate> {
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let Some(year) = candidate.year() else {
                tracing::trace!(title = %candidate.title, "Excluding candidate without year");
                return None;
            };
            let score =
                score::compute_score(&candidate.title, year, query, query_year.unwrap_or(year));
            tracing::trace!(title = %candidate.title, year, score, "Scored candidate");
            Some(ScoredCandidate {
                candidate,
                year,
                score,
            })
        })
        .collect()
}

/// Pick a winner: from the exact tier by `pick`, otherwise the best close
/// match, otherwise nothing.
pub fn select(scored: Vec<ScoredCandidate>, pick: ExactTierPick) -> Option<Selection> {
    let (exact, rest): (Vec<_>, Vec<_>) = scored
        .into_iter()
        .partition(|s| s.score > EXACT_THRESHOLD);

    let by_score = |a: &ScoredCandidate, b: &ScoredCandidate| a.score.total_cmp(&b.score);

    let exact_winner = match pick {
        ExactTierPick::Lowest => exact.into_iter().min_by(by_score),
        ExactTierPick::Highest => exact.into_iter().max_by(by_score),
    };
    if let Some(scored) = exact_winner {
        return Some(Selection {
            scored,
            tier: Tier::Exact,
        });
    }

    rest.into_iter()
        .filter(|s| s.score > CLOSE_THRESHOLD)
        .max_by(by_score)
        .map(|scored| Selection {
            scored,
            tier: Tier::Close,
        })
}

#[cfg(test)]
mod tests {
    use marquee_api::MediaKind;

    use super::*;

    fn candidate(title: &str, date: Option<&str>) -> SearchCandidate {
        SearchCandidate {
            title: title.into(),
            media_kind: MediaKind::Movie,
            release_date: date.map(Into::into),
            first_air_date: None,
            poster_path: None,
        }
    }

    fn scored(title: &str, score: f64) -> ScoredCandidate {
        ScoredCandidate {
            candidate: candidate(title, Some("2000-01-01")),
            year: 2000,
            score,
        }
    }

    #[test]
    fn test_candidates_without_year_dropped() {
        let scored = score_candidates(
            vec![candidate("Heat", Some("1995-12-15")), candidate("Heat", None)],
            "Heat",
            Some(1995),
        );
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].year, 1995);
        assert_eq!(scored[0].score, 1.0);
    }

    #[test]
    fn test_missing_query_year_scores_as_equal() {
        let scored = score_candidates(vec![candidate("Heat", Some("1995-12-15"))], "Heat", None);
        assert_eq!(scored[0].score, 1.0);
    }

    #[test]
    fn test_exact_match_selected() {
        let scored = score_candidates(
            vec![candidate("The Matrix", Some("1999-03-31"))],
            "The Matrix",
            Some(1999),
        );
        let selection = select(scored, ExactTierPick::Lowest).unwrap();
        assert_eq!(selection.tier, Tier::Exact);
        assert_eq!(selection.scored.year, 1999);
    }

    #[test]
    fn test_year_off_by_two_is_close_tier() {
        let scored = score_candidates(
            vec![candidate("The Matrix", Some("2001-01-01"))],
            "The Matrix",
            Some(1999),
        );
        assert!((scored[0].score - 0.8).abs() < 1e-9);
        let selection = select(scored, ExactTierPick::Lowest).unwrap();
        assert_eq!(selection.tier, Tier::Close);
    }

    #[test]
    fn test_lowest_exact_wins_by_default() {
        let picked = select(
            vec![scored("a", 1.0), scored("b", 0.95), scored("c", 0.7)],
            ExactTierPick::default(),
        )
        .unwrap();
        assert_eq!(picked.scored.candidate.title, "b");
        assert_eq!(picked.tier, Tier::Exact);
    }

    #[test]
    fn test_highest_exact_policy() {
        let picked = select(
            vec![scored("a", 0.95), scored("b", 1.0)],
            ExactTierPick::Highest,
        )
        .unwrap();
        assert_eq!(picked.scored.candidate.title, "b");
    }

    #[test]
    fn test_best_close_match() {
        let picked = select(
            vec![scored("a", 0.6), scored("b", 0.9), scored("c", 0.3)],
            ExactTierPick::Lowest,
        )
        .unwrap();
        assert_eq!(picked.scored.candidate.title, "b");
        assert_eq!(picked.tier, Tier::Close);
    }

    #[test]
    fn test_nothing_above_threshold() {
        assert!(select(vec![scored("a", 0.5), scored("b", -0.2)], ExactTierPick::Lowest).is_none());
        assert!(select(vec![], ExactTierPick::Lowest).is_none());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Highest".parse::<ExactTierPick>().unwrap(), ExactTierPick::Highest);
        assert_eq!("lowest".parse::<ExactTierPick>().unwrap(), ExactTierPick::Lowest);
        assert!("median".parse::<ExactTierPick>().is_err());
    }
}
