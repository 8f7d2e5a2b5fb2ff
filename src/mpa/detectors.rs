//! Independent impact detectors. Each one maps the evidence of a variant to a
//! severity rank (1 is the most severe) or to no opinion.

use super::{predictors::AdjustedScore, VariantEvidence};
use crate::utils::contains_ignore_case;
use std::fmt;

pub type Rank = u8;

pub const DETECTOR_COUNT: usize = 8;

const CLINVAR_RANK: Rank = 1;
const TRUNCATING_RANK: Rank = 2;
const SPLICE_PREDICTOR_RANK: Rank = 3;
const SPLICEAI_HIGH_RANK: Rank = 4;
const MISSENSE_HIGH_RANK: Rank = 5;
const SPLICEAI_MODERATE_RANK: Rank = 6;
const MISSENSE_MODERATE_RANK: Rank = 7;
const SPLICEAI_LOW_RANK: Rank = 8;
const INDEL_SPLICING_RANK: Rank = 8;
const NONFRAMESHIFT_RANK: Rank = 8;
const MISSENSE_LOW_RANK: Rank = 9;
const UNKNOWN_RANK: Rank = 10;

/// dbscSNV ADA/RF cutoff, inclusive.
const SPLICE_PREDICTOR_CUTOFF: f64 = 0.6;
const SPLICEAI_HIGH_CUTOFF: f64 = 0.8;
const SPLICEAI_MODERATE_CUTOFF: f64 = 0.5;
const SPLICEAI_LOW_CUTOFF: f64 = 0.2;
const MISSENSE_HIGH_CUTOFF: f64 = 6.0;
const MISSENSE_MODERATE_CUTOFF: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Impact {
    ClinvarPathogenicity,
    Splice,
    Stop,
    Start,
    Frameshift,
    Indel,
    Missense,
    Unknown,
}

impl Impact {
    pub fn label(&self) -> &'static str {
        match self {
            Impact::ClinvarPathogenicity => "clinvar_pathogenicity",
            Impact::Splice => "splice_impact",
            Impact::Stop => "stop_impact",
            Impact::Start => "start_impact",
            Impact::Frameshift => "frameshift_impact",
            Impact::Indel => "indel_impact",
            Impact::Missense => "missense_impact",
            Impact::Unknown => "unknown_impact",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

enum Rule {
    /// Evaluated for every variant.
    Always(fn(&VariantEvidence) -> Option<Rank>),
    /// Evaluated on the exonic consequence, only for exonic variants.
    Exonic(fn(&str, &AdjustedScore) -> Option<Rank>),
}

/// Detectors in evaluation order. Earlier entries win rank ties.
const DETECTORS: [(Impact, Rule); DETECTOR_COUNT] = [
    (Impact::ClinvarPathogenicity, Rule::Always(clinvar_pathogenicity)),
    (Impact::Splice, Rule::Always(splice_impact)),
    (Impact::Stop, Rule::Exonic(stop_impact)),
    (Impact::Start, Rule::Exonic(start_impact)),
    (Impact::Frameshift, Rule::Exonic(frameshift_impact)),
    (Impact::Indel, Rule::Exonic(indel_impact)),
    (Impact::Missense, Rule::Exonic(missense_impact)),
    (Impact::Unknown, Rule::Exonic(unknown_impact)),
];

/// Per-detector outcome for one variant, in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactVerdict {
    entries: [(Impact, Option<Rank>); DETECTOR_COUNT],
}

impl ImpactVerdict {
    pub fn iter(&self) -> impl Iterator<Item = (Impact, Option<Rank>)> + '_ {
        self.entries.iter().copied()
    }

    pub fn get(&self, impact: Impact) -> Option<Rank> {
        self.entries
            .iter()
            .find(|(i, _)| *i == impact)
            .and_then(|(_, rank)| *rank)
    }

    #[cfg(test)]
    pub fn from_entries(entries: [(Impact, Option<Rank>); DETECTOR_COUNT]) -> Self {
        Self { entries }
    }
}

pub fn evaluate(evidence: &VariantEvidence, score: &AdjustedScore) -> ImpactVerdict {
    let exonic_consequence = exonic_consequence(evidence);
    let entries = DETECTORS.map(|(impact, rule)| {
        let rank = match rule {
            Rule::Always(detect) => detect(evidence),
            Rule::Exonic(detect) => exonic_consequence.and_then(|c| detect(c, score)),
        };
        (impact, rank)
    });
    ImpactVerdict { entries }
}

/// The exonic consequence, if the variant lies in an exonic region and the
/// consequence is annotated.
fn exonic_consequence(evidence: &VariantEvidence) -> Option<&str> {
    let region = evidence.func.as_deref()?;
    if contains_ignore_case(region, "exonic") {
        evidence.exonic_func.as_deref()
    } else {
        None
    }
}

fn clinvar_pathogenicity(evidence: &VariantEvidence) -> Option<Rank> {
    let clinsig = evidence.clinsig.as_deref()?;
    let is_pathogenic = contains_ignore_case(clinsig, "pathogenic")
        && !contains_ignore_case(clinsig, "benign")
        && !contains_ignore_case(clinsig, "conflicting");
    is_pathogenic.then_some(CLINVAR_RANK)
}

fn splice_impact(evidence: &VariantEvidence) -> Option<Rank> {
    let splice = &evidence.splice;
    let above_predictor_cutoff =
        |score: Option<f64>| score.is_some_and(|s| s >= SPLICE_PREDICTOR_CUTOFF);
    let spliceai_above = |cutoff: f64| splice.spliceai.is_some_and(|d| d.any_above(cutoff));

    if above_predictor_cutoff(splice.ada) || above_predictor_cutoff(splice.rf) {
        Some(SPLICE_PREDICTOR_RANK)
    } else if spliceai_above(SPLICEAI_HIGH_CUTOFF) {
        Some(SPLICEAI_HIGH_RANK)
    } else if spliceai_above(SPLICEAI_MODERATE_CUTOFF) {
        Some(SPLICEAI_MODERATE_RANK)
    } else if spliceai_above(SPLICEAI_LOW_CUTOFF) {
        Some(SPLICEAI_LOW_RANK)
    } else if !evidence.is_snv
        && evidence
            .func
            .as_deref()
            .is_some_and(|region| contains_ignore_case(region, "splicing"))
    {
        Some(INDEL_SPLICING_RANK)
    } else {
        None
    }
}

fn stop_impact(consequence: &str, _: &AdjustedScore) -> Option<Rank> {
    (contains_ignore_case(consequence, "stopgain") || contains_ignore_case(consequence, "stoploss"))
        .then_some(TRUNCATING_RANK)
}

fn start_impact(consequence: &str, _: &AdjustedScore) -> Option<Rank> {
    contains_ignore_case(consequence, "startloss").then_some(TRUNCATING_RANK)
}

fn frameshift_impact(consequence: &str, _: &AdjustedScore) -> Option<Rank> {
    (contains_ignore_case(consequence, "frameshift")
        && !contains_ignore_case(consequence, "nonframeshift"))
    .then_some(TRUNCATING_RANK)
}

fn indel_impact(consequence: &str, _: &AdjustedScore) -> Option<Rank> {
    contains_ignore_case(consequence, "nonframeshift").then_some(NONFRAMESHIFT_RANK)
}

fn missense_impact(consequence: &str, score: &AdjustedScore) -> Option<Rank> {
    if !contains_ignore_case(consequence, "nonsynonymous") {
        return None;
    }
    let rank = if score.adjusted > MISSENSE_HIGH_CUTOFF {
        MISSENSE_HIGH_RANK
    } else if score.adjusted > MISSENSE_MODERATE_CUTOFF {
        MISSENSE_MODERATE_RANK
    } else {
        MISSENSE_LOW_RANK
    };
    Some(rank)
}

fn unknown_impact(consequence: &str, _: &AdjustedScore) -> Option<Rank> {
    contains_ignore_case(consequence, "unknown").then_some(UNKNOWN_RANK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpa::splice::SpliceEvidence;

    fn exonic(consequence: &str) -> VariantEvidence {
        VariantEvidence {
            func: Some("exonic".to_string()),
            exonic_func: Some(consequence.to_string()),
            ..VariantEvidence::default()
        }
    }

    fn score(adjusted: f64) -> AdjustedScore {
        AdjustedScore {
            adjusted,
            available: 10,
            deleterious: (adjusted as u32).min(10),
        }
    }

    #[test]
    fn test_evaluation_order_is_fixed() {
        let verdict = evaluate(&VariantEvidence::default(), &AdjustedScore::default());
        let order: Vec<Impact> = verdict.iter().map(|(i, _)| i).collect();
        assert_eq!(
            order,
            vec![
                Impact::ClinvarPathogenicity,
                Impact::Splice,
                Impact::Stop,
                Impact::Start,
                Impact::Frameshift,
                Impact::Indel,
                Impact::Missense,
                Impact::Unknown,
            ]
        );
        assert!(verdict.iter().all(|(_, rank)| rank.is_none()));
    }

    #[test]
    fn test_clinvar_pathogenicity() {
        let with_clinsig = |clinsig: &str| VariantEvidence {
            clinsig: Some(clinsig.to_string()),
            ..VariantEvidence::default()
        };
        assert_eq!(clinvar_pathogenicity(&with_clinsig("Pathogenic")), Some(1));
        assert_eq!(
            clinvar_pathogenicity(&with_clinsig("Likely_pathogenic")),
            Some(1)
        );
        assert_eq!(
            clinvar_pathogenicity(&with_clinsig("Pathogenic/Likely_benign")),
            None
        );
        assert_eq!(
            clinvar_pathogenicity(&with_clinsig(
                "Conflicting_interpretations_of_pathogenicity"
            )),
            None
        );
        assert_eq!(clinvar_pathogenicity(&with_clinsig("Benign")), None);
        assert_eq!(clinvar_pathogenicity(&VariantEvidence::default()), None);
    }

    #[test]
    fn test_splice_predictor_tier() {
        let mut evidence = VariantEvidence {
            is_snv: true,
            ..VariantEvidence::default()
        };
        evidence.splice = SpliceEvidence::new(Some(0.6), None, None);
        assert_eq!(splice_impact(&evidence), Some(3));
        evidence.splice = SpliceEvidence::new(Some(0.1), Some(0.95), None);
        assert_eq!(splice_impact(&evidence), Some(3));
        evidence.splice = SpliceEvidence::new(Some(0.59), Some(0.59), None);
        assert_eq!(splice_impact(&evidence), None);
    }

    #[test]
    fn test_spliceai_tiers() {
        let with_max = |delta: &str| {
            let packed = format!(
                r"DS_AG\x3d0.00\x3bDS_AL\x3d{}\x3bDS_DG\x3d0.00\x3bDS_DL\x3d0.00",
                delta
            );
            VariantEvidence {
                is_snv: true,
                splice: SpliceEvidence::new(None, None, Some(packed.as_str())),
                ..VariantEvidence::default()
            }
        };
        assert_eq!(splice_impact(&with_max("0.81")), Some(4));
        assert_eq!(splice_impact(&with_max("0.80")), Some(6));
        assert_eq!(splice_impact(&with_max("0.51")), Some(6));
        assert_eq!(splice_impact(&with_max("0.50")), Some(8));
        assert_eq!(splice_impact(&with_max("0.21")), Some(8));
        assert_eq!(splice_impact(&with_max("0.20")), None);
    }

    #[test]
    fn test_spliceai_missing_direction_skips_tiers() {
        let evidence = VariantEvidence {
            is_snv: true,
            splice: SpliceEvidence::new(None, None, Some(r"DS_AG\x3d0.99\x3bDS_AL\x3d0.00")),
            ..VariantEvidence::default()
        };
        assert_eq!(splice_impact(&evidence), None);
    }

    #[test]
    fn test_indel_in_splicing_region_fallback() {
        let mut evidence = VariantEvidence {
            func: Some("splicing".to_string()),
            is_snv: false,
            ..VariantEvidence::default()
        };
        assert_eq!(splice_impact(&evidence), Some(8));

        evidence.is_snv = true;
        assert_eq!(splice_impact(&evidence), None);
    }

    #[test]
    fn test_predictor_tier_beats_spliceai() {
        let evidence = VariantEvidence {
            is_snv: true,
            splice: SpliceEvidence::new(
                None,
                Some(0.7),
                Some(r"DS_AG\x3d0.9\x3bDS_AL\x3d0\x3bDS_DG\x3d0\x3bDS_DL\x3d0"),
            ),
            ..VariantEvidence::default()
        };
        assert_eq!(splice_impact(&evidence), Some(3));
    }

    #[test]
    fn test_exonic_consequences() {
        let rank_of = |consequence: &str, impact: Impact| {
            evaluate(&exonic(consequence), &score(0.0)).get(impact)
        };
        assert_eq!(rank_of("stopgain", Impact::Stop), Some(2));
        assert_eq!(rank_of("stoploss", Impact::Stop), Some(2));
        assert_eq!(rank_of("startloss", Impact::Start), Some(2));
        assert_eq!(rank_of("frameshift_deletion", Impact::Frameshift), Some(2));
        assert_eq!(rank_of("frameshift_insertion", Impact::Indel), None);
        assert_eq!(rank_of("nonframeshift_deletion", Impact::Indel), Some(8));
        assert_eq!(rank_of("nonframeshift_deletion", Impact::Frameshift), None);
        assert_eq!(rank_of("unknown", Impact::Unknown), Some(10));
        assert_eq!(rank_of("synonymous_SNV", Impact::Missense), None);
    }

    #[test]
    fn test_missense_ranks_follow_adjusted_score() {
        let rank_of = |adjusted: f64| missense_impact("nonsynonymous_SNV", &score(adjusted));
        assert_eq!(rank_of(10.0), Some(5));
        assert_eq!(rank_of(6.1), Some(5));
        assert_eq!(rank_of(6.0), Some(7));
        assert_eq!(rank_of(2.1), Some(7));
        assert_eq!(rank_of(2.0), Some(9));
        assert_eq!(rank_of(0.0), Some(9));
    }

    #[test]
    fn test_exonic_gate() {
        let mut evidence = exonic("stopgain");
        evidence.func = Some("intronic".to_string());
        let verdict = evaluate(&evidence, &score(10.0));
        assert!(verdict.iter().all(|(_, rank)| rank.is_none()));

        let mut evidence = exonic("stopgain");
        evidence.exonic_func = None;
        let verdict = evaluate(&evidence, &score(10.0));
        assert!(verdict.iter().all(|(_, rank)| rank.is_none()));

        let mut evidence = exonic("stopgain");
        evidence.func = Some("exonic\\x3bsplicing".to_string());
        assert_eq!(evaluate(&evidence, &score(0.0)).get(Impact::Stop), Some(2));
    }
}
