use crate::cli::ValidateArgs;
use crate::mpa::VariantEvidence;
use crate::utils::{contains_ignore_case, format_number_with_commas, Result, TranscriptSet};
use crate::vcf::evidence::{
    check_required_fields, check_split_variant, record_locus, EvidenceReader,
};
use rust_htslib::bcf::{self, Read};
use std::path::Path;

pub fn validate(args: ValidateArgs) -> Result<()> {
    let report = scan_vcf(&args.input, args.transcript_set)?;

    let total = report.total();
    let pass_percentage = percentage(report.rankable, total);
    let fail_percentage = percentage(report.rejected(), total);

    log::info!(
        "Evidence gaps - No region: {}, No exonic consequence: {}, No missense predictor: {}, No splice score: {}, No ClinVar: {}",
        format_number_with_commas(report.no_region),
        format_number_with_commas(report.no_exonic_consequence),
        format_number_with_commas(report.no_predictor),
        format_number_with_commas(report.no_splice_score),
        format_number_with_commas(report.no_clinsig)
    );

    match report.rejected() {
        0 => log::info!(
            "Validation successful. Variants pass={}",
            format_number_with_commas(report.rankable)
        ),
        _ => log::info!(
            "Validation failed. Variants pass={} ({:.2}%), fail={} ({:.2}%): multi-allelic={}, unreadable={}",
            format_number_with_commas(report.rankable),
            pass_percentage,
            format_number_with_commas(report.rejected()),
            fail_percentage,
            format_number_with_commas(report.multi_allelic),
            format_number_with_commas(report.unreadable)
        ),
    }

    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub rankable: usize,
    pub multi_allelic: usize,
    pub unreadable: usize,
    pub no_region: usize,
    pub no_exonic_consequence: usize,
    pub no_predictor: usize,
    pub no_splice_score: usize,
    pub no_clinsig: usize,
}

impl ValidationReport {
    fn rejected(&self) -> usize {
        self.multi_allelic + self.unreadable
    }

    fn total(&self) -> usize {
        self.rankable + self.rejected()
    }

    fn add_gaps(&mut self, evidence: &VariantEvidence) {
        let is_exonic = evidence
            .func
            .as_deref()
            .is_some_and(|region| contains_ignore_case(region, "exonic"));
        if evidence.func.is_none() {
            self.no_region += 1;
        }
        if is_exonic && evidence.exonic_func.is_none() {
            self.no_exonic_consequence += 1;
        }
        if evidence.predictors.iter().all(|(_, call)| call.is_none()) {
            self.no_predictor += 1;
        }
        let splice = &evidence.splice;
        if splice.ada.is_none() && splice.rf.is_none() && splice.spliceai.is_none() {
            self.no_splice_score += 1;
        }
        if evidence.clinsig.is_none() {
            self.no_clinsig += 1;
        }
    }
}

/// Checks the header and counts, without writing anything, what an
/// annotation run would reject and which evidence is missing.
pub fn scan_vcf(path: &Path, transcripts: TranscriptSet) -> Result<ValidationReport> {
    let mut reader = bcf::Reader::from_path(path)
        .map_err(|e| format!("Failed to open VCF {}: {}", path.display(), e))?;
    check_required_fields(reader.header(), transcripts)?;
    let evidence_reader = EvidenceReader::new(transcripts);

    let mut report = ValidationReport::default();
    for record in reader.records() {
        let record = record.map_err(|e| format!("Failed to read VCF record: {}", e))?;
        if let Err(rejection) = check_split_variant(&record) {
            log::error!("{} at {}", rejection, record_locus(&record));
            report.multi_allelic += 1;
            continue;
        }
        match evidence_reader.read(&record) {
            Ok(evidence) => {
                report.add_gaps(&evidence);
                report.rankable += 1;
            }
            Err(e) => {
                log::error!("{} at {}", e, record_locus(&record));
                report.unreadable += 1;
            }
        }
    }
    Ok(report)
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}
