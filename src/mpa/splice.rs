//! Splicing evidence: dbscSNV ADA/RF scores and the packed SpliceAI
//! annotation.
//!
//! The SpliceAI annotation reaches us as a single INFO value whose inner `;`
//! and `=` have been escaped by the annotator, e.g.
//! `ALLELE\x3dT\x3bSYMBOL\x3dBRCA2\x3bDS_AG\x3d0.91\x3bDS_AL\x3d0.00...`.

use std::collections::HashMap;

pub const ESCAPED_FIELD_SEPARATOR: &str = r"\x3b";
pub const ESCAPED_PAIR_SEPARATOR: &str = r"\x3d";
const FIELD_SEPARATOR: char = ';';
const PAIR_SEPARATOR: char = '=';

pub const ACCEPTOR_GAIN_KEY: &str = "DS_AG";
pub const ACCEPTOR_LOSS_KEY: &str = "DS_AL";
pub const DONOR_GAIN_KEY: &str = "DS_DG";
pub const DONOR_LOSS_KEY: &str = "DS_DL";

/// Directional SpliceAI delta scores.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeltaScores {
    pub acceptor_gain: Option<f64>,
    pub acceptor_loss: Option<f64>,
    pub donor_gain: Option<f64>,
    pub donor_loss: Option<f64>,
}

impl DeltaScores {
    pub fn decode(packed: &str) -> Self {
        let fields = decode_fields(packed);
        let delta = |key: &str| fields.get(key).and_then(|value| parse_score(value));
        DeltaScores {
            acceptor_gain: delta(ACCEPTOR_GAIN_KEY),
            acceptor_loss: delta(ACCEPTOR_LOSS_KEY),
            donor_gain: delta(DONOR_GAIN_KEY),
            donor_loss: delta(DONOR_LOSS_KEY),
        }
    }

    /// Highest delta over the four directions. Defined only when every
    /// direction decoded.
    pub fn max(&self) -> Option<f64> {
        [
            self.acceptor_gain,
            self.acceptor_loss,
            self.donor_gain,
            self.donor_loss,
        ]
        .into_iter()
        .try_fold(f64::NEG_INFINITY, |acc, delta| delta.map(|d| acc.max(d)))
    }

    /// True when all four deltas are known and at least one exceeds `cutoff`.
    pub fn any_above(&self, cutoff: f64) -> bool {
        self.max().is_some_and(|max| max > cutoff)
    }
}

/// Splits a packed annotation into `key -> value` pairs. Both the escaped and
/// the raw separators are accepted; tokens without exactly one pair separator
/// are dropped.
pub fn decode_fields(packed: &str) -> HashMap<String, String> {
    let normalized = packed
        .replace(ESCAPED_FIELD_SEPARATOR, &FIELD_SEPARATOR.to_string())
        .replace(ESCAPED_PAIR_SEPARATOR, &PAIR_SEPARATOR.to_string());

    let mut fields = HashMap::new();
    for token in normalized.split(FIELD_SEPARATOR) {
        let mut parts = token.split(PAIR_SEPARATOR);
        if let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) {
            let (key, value) = (key.trim(), value.trim());
            if !key.is_empty() && !value.is_empty() {
                fields.insert(key.to_string(), value.to_string());
            }
        }
    }
    fields
}

fn parse_score(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpliceEvidence {
    /// dbscSNV AdaBoost score.
    pub ada: Option<f64>,
    /// dbscSNV random forest score.
    pub rf: Option<f64>,
    /// `None` when the packed SpliceAI annotation is absent.
    pub spliceai: Option<DeltaScores>,
}

impl SpliceEvidence {
    pub fn new(ada: Option<f64>, rf: Option<f64>, spliceai: Option<&str>) -> Self {
        SpliceEvidence {
            ada,
            rf,
            spliceai: spliceai.map(DeltaScores::decode),
        }
    }
}
