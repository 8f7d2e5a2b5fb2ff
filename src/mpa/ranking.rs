use super::{
    detectors::{Impact, ImpactVerdict, Rank},
    predictors::{AdjustedScore, MAX_SCORE},
};
use itertools::Itertools;

/// Rank assigned when no detector has an opinion.
pub const DEFAULT_RANK: Rank = 10;
pub const NULL_IMPACT_LABEL: &str = "NULL";

#[derive(Debug, Clone, PartialEq)]
pub struct RankingOutcome {
    pub rank: Rank,
    /// Detectors that reported an opinion, in evaluation order.
    pub impacts: Vec<Impact>,
    pub final_score: f64,
    pub score: AdjustedScore,
}

impl RankingOutcome {
    pub fn labels(&self) -> Vec<&'static str> {
        if self.impacts.is_empty() {
            vec![NULL_IMPACT_LABEL]
        } else {
            self.impacts.iter().map(Impact::label).collect()
        }
    }

    pub fn labels_joined(&self) -> String {
        self.labels().iter().join(",")
    }
}

pub fn rank_variant(verdict: &ImpactVerdict, score: AdjustedScore) -> RankingOutcome {
    let mut winning_rank: Option<Rank> = None;
    let mut impacts = Vec::new();
    let mut final_score = score.adjusted;

    for (impact, rank) in verdict.iter() {
        let Some(rank) = rank else { continue };
        impacts.push(impact);
        // Strictly lower only: on ties the earlier detector keeps the win
        if winning_rank.map_or(true, |winner| rank < winner) {
            winning_rank = Some(rank);
            final_score = final_score_of(impact, rank, &score);
        }
    }

    RankingOutcome {
        rank: winning_rank.unwrap_or(DEFAULT_RANK),
        impacts,
        final_score,
        score,
    }
}

fn final_score_of(impact: Impact, rank: Rank, score: &AdjustedScore) -> f64 {
    match (impact, rank) {
        (Impact::Unknown | Impact::Missense, _) => score.adjusted,
        (Impact::Splice, 6) => 6.0,
        (Impact::Splice, 8) => 2.0,
        (Impact::Indel, 8) => 8.0,
        (Impact::Frameshift, 2) => 2.0,
        _ => MAX_SCORE,
    }
}
