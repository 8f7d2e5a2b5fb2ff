//! Reads the annotation INFO fields of a VCF record into `VariantEvidence`.

use crate::mpa::{Predictor, PredictorCall, PredictorPanel, SpliceEvidence, VariantEvidence};
use crate::utils::{Result, TranscriptSet};
use itertools::Itertools;
use rust_htslib::bcf::{
    header::{HeaderView, TagType},
    record::Numeric,
    Record,
};
use std::fmt;

pub const ADA_SCORE_KEY: &str = "dbscSNV_ADA_SCORE";
pub const RF_SCORE_KEY: &str = "dbscSNV_RF_SCORE";
pub const SPLICEAI_KEY: &str = "spliceai_filtered";
pub const CLINSIG_KEY: &str = "CLNSIG";

/// All INFO fields the annotation relies on, for the given transcript set.
pub fn required_info_fields(transcripts: TranscriptSet) -> Vec<String> {
    let mut fields = vec![
        transcripts.func_key(),
        transcripts.exonic_func_key(),
        ADA_SCORE_KEY.to_string(),
        RF_SCORE_KEY.to_string(),
        SPLICEAI_KEY.to_string(),
    ];
    fields.extend(Predictor::ALL.iter().map(|p| p.info_key().to_string()));
    fields.push(CLINSIG_KEY.to_string());
    fields
}

/// Fails when the header does not define every required INFO field.
pub fn check_required_fields(header: &HeaderView, transcripts: TranscriptSet) -> Result<()> {
    let missing = required_info_fields(transcripts)
        .into_iter()
        .filter(|key| header.info_type(key.as_bytes()).is_err())
        .collect_vec();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "VCF is not correctly annotated, missing INFO fields: {}. Annotate the VCF with ANNOVAR (refGene, dbnsfp, dbscsnv, spliceai, clinvar) first",
            missing.join(", ")
        ))
    }
}

/// Why a record cannot be scored.
///
/// htslib parses REF and ALT into a single comma-separated allele list, so a
/// REF listing several alleles shows up as extra alleles and is reported as
/// multi-allelic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MultiAllelic,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MultiAllelic => write!(
                f,
                "Multi-allelic variant, split multi-allelic records before annotation"
            ),
        }
    }
}

/// Records must carry one reference and at most one alternate allele.
pub fn check_split_variant(record: &Record) -> std::result::Result<(), Rejection> {
    if record.alleles().len() > 2 {
        return Err(Rejection::MultiAllelic);
    }
    Ok(())
}

pub fn record_locus(record: &Record) -> String {
    let chrom = record
        .rid()
        .and_then(|rid| record.header().rid2name(rid).ok())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .unwrap_or_else(|| ".".to_string());
    format!("{}:{}", chrom, record.pos() + 1)
}

/// Extracts evidence fields using the INFO names of one transcript set.
#[derive(Debug, Clone)]
pub struct EvidenceReader {
    func_key: String,
    exonic_func_key: String,
}

impl EvidenceReader {
    pub fn new(transcripts: TranscriptSet) -> Self {
        EvidenceReader {
            func_key: transcripts.func_key(),
            exonic_func_key: transcripts.exonic_func_key(),
        }
    }

    pub fn read(&self, record: &Record) -> Result<VariantEvidence> {
        let chrom = match record.rid() {
            Some(rid) => record
                .header()
                .rid2name(rid)
                .map(|name| String::from_utf8_lossy(name).into_owned())
                .map_err(|e| format!("Invalid contig for record: {}", e))?,
            None => return Err("Record without a contig".to_string()),
        };

        let alleles = record.alleles();
        let reference = alleles
            .first()
            .map(|a| String::from_utf8_lossy(a).into_owned())
            .unwrap_or_default();
        let alternate = alleles
            .get(1)
            .map(|a| String::from_utf8_lossy(a).into_owned());
        let is_snv = alternate
            .as_deref()
            .is_some_and(|alt| is_single_base(&reference) && is_single_base(alt));

        let predictors = PredictorPanel::from_fn(|predictor| {
            info_text(record, predictor.info_key().as_bytes())
                .map(|call| PredictorCall::from_annotation(&call))
        });

        let spliceai = info_text(record, SPLICEAI_KEY.as_bytes());
        let splice = SpliceEvidence::new(
            info_number(record, ADA_SCORE_KEY.as_bytes()),
            info_number(record, RF_SCORE_KEY.as_bytes()),
            spliceai.as_deref(),
        );

        Ok(VariantEvidence {
            chrom,
            pos: record.pos() + 1,
            reference,
            alternate,
            is_snv,
            func: info_text(record, self.func_key.as_bytes()),
            exonic_func: info_text(record, self.exonic_func_key.as_bytes()),
            clinsig: info_text(record, CLINSIG_KEY.as_bytes()),
            predictors,
            splice,
        })
    }
}

fn is_single_base(allele: &str) -> bool {
    matches!(
        allele.as_bytes(),
        [b'A' | b'C' | b'G' | b'T' | b'N' | b'a' | b'c' | b'g' | b't' | b'n']
    )
}

fn is_missing_text(value: &[u8]) -> bool {
    value.is_empty() || value == b"."
}

/// First value of a String INFO field, `None` when absent or `.`.
fn info_text(record: &Record, key: &[u8]) -> Option<String> {
    let values = record.info(key).string().ok()??;
    let first = values.first()?;
    if is_missing_text(first) {
        None
    } else {
        Some(String::from_utf8_lossy(first).into_owned())
    }
}

/// First value of a numeric INFO field. Annotators declare these either as
/// Float or as String, so both are accepted.
fn info_number(record: &Record, key: &[u8]) -> Option<f64> {
    match record.header().info_type(key) {
        Ok((TagType::Float, _)) => {
            let values = record.info(key).float().ok()??;
            values
                .first()
                .filter(|v| !v.is_missing() && v.is_finite())
                .map(|&v| f64::from(v))
        }
        Ok((TagType::Integer, _)) => {
            let values = record.info(key).integer().ok()??;
            values
                .first()
                .filter(|v| !v.is_missing())
                .map(|&v| f64::from(v))
        }
        Ok((TagType::String, _)) => info_text(record, key)?.trim().parse::<f64>().ok(),
        _ => None,
    }
}
