//! MoBiDiC Prioritization Algorithm: fuses clinical, splicing, coding
//! consequence and missense predictor evidence into a rank from 1 (most
//! severe) to 10 and a 0-10 final score.

pub mod detectors;
pub mod predictors;
pub mod ranking;
pub mod splice;

pub use detectors::{Impact, ImpactVerdict, Rank};
pub use predictors::{AdjustedScore, Predictor, PredictorCall, PredictorPanel};
pub use ranking::RankingOutcome;
pub use splice::{DeltaScores, SpliceEvidence};

/// Evidence extracted from one biallelic variant record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariantEvidence {
    pub chrom: String,
    /// 1-based position.
    pub pos: i64,
    pub reference: String,
    pub alternate: Option<String>,
    pub is_snv: bool,
    /// Functional region, e.g. `exonic`, `splicing`, `intronic`.
    pub func: Option<String>,
    /// Exonic consequence, e.g. `stopgain`, `nonsynonymous_SNV`.
    pub exonic_func: Option<String>,
    /// ClinVar clinical significance.
    pub clinsig: Option<String>,
    pub predictors: PredictorPanel,
    pub splice: SpliceEvidence,
}

impl VariantEvidence {
    pub fn locus(&self) -> String {
        format!("{}:{}", self.chrom, self.pos)
    }
}

pub fn prioritize(evidence: &VariantEvidence) -> RankingOutcome {
    let score = AdjustedScore::from_panel(&evidence.predictors);
    let verdict = detectors::evaluate(evidence, &score);
    ranking::rank_variant(&verdict, score)
}
