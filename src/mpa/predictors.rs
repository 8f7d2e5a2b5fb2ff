//! Aggregation of the categorical missense deleteriousness predictors into a
//! single 0-10 adjusted score.

pub const PREDICTOR_COUNT: usize = 10;

/// Upper bound of the adjusted score.
pub const MAX_SCORE: f64 = 10.0;

/// In-silico tools whose categorical calls make up the predictor panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predictor {
    Sift,
    Polyphen2Hdiv,
    Polyphen2Hvar,
    Lrt,
    MutationTaster,
    Fathmm,
    Provean,
    FathmmMkl,
    MetaSvm,
    MetaLr,
}

impl Predictor {
    pub const ALL: [Predictor; PREDICTOR_COUNT] = [
        Predictor::Sift,
        Predictor::Polyphen2Hdiv,
        Predictor::Polyphen2Hvar,
        Predictor::Lrt,
        Predictor::MutationTaster,
        Predictor::Fathmm,
        Predictor::Provean,
        Predictor::FathmmMkl,
        Predictor::MetaSvm,
        Predictor::MetaLr,
    ];

    /// INFO field carrying the call of this predictor.
    pub fn info_key(&self) -> &'static str {
        match self {
            Predictor::Sift => "SIFT_pred",
            Predictor::Polyphen2Hdiv => "Polyphen2_HDIV_pred",
            Predictor::Polyphen2Hvar => "Polyphen2_HVAR_pred",
            Predictor::Lrt => "LRT_pred",
            Predictor::MutationTaster => "MutationTaster_pred",
            Predictor::Fathmm => "FATHMM_pred",
            Predictor::Provean => "PROVEAN_pred",
            Predictor::FathmmMkl => "fathmm-MKL_coding_pred",
            Predictor::MetaSvm => "MetaSVM_pred",
            Predictor::MetaLr => "MetaLR_pred",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorCall {
    Deleterious,
    Other,
}

impl PredictorCall {
    /// `D` is the damaging/deleterious call shared by all tools, `A` is the
    /// MutationTaster "disease causing automatic" call.
    pub fn from_annotation(value: &str) -> Self {
        match value.trim() {
            "D" | "A" => PredictorCall::Deleterious,
            _ => PredictorCall::Other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictorPanel {
    calls: [Option<PredictorCall>; PREDICTOR_COUNT],
}

impl PredictorPanel {
    pub fn new(calls: [Option<PredictorCall>; PREDICTOR_COUNT]) -> Self {
        Self { calls }
    }

    pub fn from_fn<F>(call_of: F) -> Self
    where
        F: FnMut(Predictor) -> Option<PredictorCall>,
    {
        Self {
            calls: Predictor::ALL.map(call_of),
        }
    }

    pub fn get(&self, predictor: Predictor) -> Option<PredictorCall> {
        Predictor::ALL
            .iter()
            .position(|&p| p == predictor)
            .and_then(|i| self.calls[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Predictor, Option<PredictorCall>)> + '_ {
        Predictor::ALL.iter().copied().zip(self.calls.iter().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdjustedScore {
    pub adjusted: f64,
    pub available: u32,
    pub deleterious: u32,
}

impl AdjustedScore {
    pub fn from_panel(panel: &PredictorPanel) -> Self {
        let mut available = 0;
        let mut deleterious = 0;
        for (_, call) in panel.iter() {
            match call {
                Some(PredictorCall::Deleterious) => {
                    deleterious += 1;
                    available += 1;
                }
                Some(PredictorCall::Other) => available += 1,
                None => {}
            }
        }

        let adjusted = if available > 0 {
            deleterious as f64 / available as f64 * MAX_SCORE
        } else {
            0.0
        };

        AdjustedScore {
            adjusted,
            available,
            deleterious,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_of(values: [Option<&str>; PREDICTOR_COUNT]) -> PredictorPanel {
        PredictorPanel::new(values.map(|v| v.map(PredictorCall::from_annotation)))
    }

    #[test]
    fn test_empty_panel_scores_zero() {
        let score = AdjustedScore::from_panel(&PredictorPanel::default());
        assert_eq!(score.available, 0);
        assert_eq!(score.deleterious, 0);
        assert_eq!(score.adjusted, 0.0);
    }

    #[test]
    fn test_all_other_calls() {
        let score = AdjustedScore::from_panel(&panel_of([Some("T"); PREDICTOR_COUNT]));
        assert_eq!(score.available, 10);
        assert_eq!(score.deleterious, 0);
        assert_eq!(score.adjusted, 0.0);
    }

    #[test]
    fn test_all_deleterious_calls() {
        let score = AdjustedScore::from_panel(&panel_of([Some("D"); PREDICTOR_COUNT]));
        assert_eq!(score.available, 10);
        assert_eq!(score.deleterious, 10);
        assert_eq!(score.adjusted, 10.0);
    }

    #[test]
    fn test_partial_panel() {
        let score = AdjustedScore::from_panel(&panel_of([
            Some("D"),
            Some("P"),
            Some("B"),
            None,
            Some("A"),
            None,
            Some("N"),
            None,
            Some("T"),
            None,
        ]));
        assert_eq!(score.available, 6);
        assert_eq!(score.deleterious, 2);
        assert!((score.adjusted - 10.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_bounds_hold_for_every_panel_shape() {
        // Every assignment of {absent, other, deleterious} to the first five
        // predictors, with the rest alternating, stays within bounds.
        for mask in 0..3u32.pow(5) {
            let mut values = [None; PREDICTOR_COUNT];
            let mut m = mask;
            for value in values.iter_mut().take(5) {
                *value = match m % 3 {
                    0 => None,
                    1 => Some("T"),
                    _ => Some("D"),
                };
                m /= 3;
            }
            for (i, value) in values.iter_mut().enumerate().skip(5) {
                *value = if i % 2 == 0 { Some("D") } else { None };
            }
            let score = AdjustedScore::from_panel(&panel_of(values));
            assert!(score.deleterious <= score.available);
            assert!(score.available as usize <= PREDICTOR_COUNT);
            assert!((0.0..=MAX_SCORE).contains(&score.adjusted));
            if score.available == 0 {
                assert_eq!(score.adjusted, 0.0);
            }
        }
    }

    #[test]
    fn test_panel_lookup_by_predictor() {
        let panel = PredictorPanel::from_fn(|p| match p {
            Predictor::MutationTaster => Some(PredictorCall::Deleterious),
            Predictor::MetaLr => Some(PredictorCall::Other),
            _ => None,
        });
        assert_eq!(
            panel.get(Predictor::MutationTaster),
            Some(PredictorCall::Deleterious)
        );
        assert_eq!(panel.get(Predictor::MetaLr), Some(PredictorCall::Other));
        assert_eq!(panel.get(Predictor::Sift), None);
    }
}
