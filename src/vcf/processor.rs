use super::{
    evidence::{check_required_fields, check_split_variant, record_locus, EvidenceReader},
    writer::VcfWriter,
};
use crate::{
    cli::AnnotateArgs,
    mpa::{self, ranking::DEFAULT_RANK, RankingOutcome, VariantEvidence},
    utils::{format_number_with_commas, Result},
};
use itertools::Itertools;
use rayon::{
    iter::{IntoParallelRefIterator, ParallelIterator},
    ThreadPool, ThreadPoolBuilder,
};
use rust_htslib::bcf::{self, Read, Record};

const BATCH_SIZE: usize = 10_000;
const PROGRESS_INTERVAL: usize = 100_000;

/// Counters for one annotation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationStats {
    pub processed: usize,
    pub annotated: usize,
    pub rejected: usize,
    /// Number of variants per rank, index 0 holds rank 1.
    pub rank_counts: [usize; DEFAULT_RANK as usize],
}

impl AnnotationStats {
    fn record(&mut self, outcome: &RankingOutcome) {
        self.annotated += 1;
        let slot = (outcome.rank as usize).checked_sub(1);
        if let Some(count) = slot.and_then(|i| self.rank_counts.get_mut(i)) {
            *count += 1;
        }
    }

    pub fn log_summary(&self) {
        let mut log_message = format!(
            "Successfully annotated {} variants.",
            format_number_with_commas(self.annotated)
        );
        if self.rejected > 0 {
            log_message.push_str(&format!(
                " Rejected {} variants!",
                format_number_with_commas(self.rejected)
            ));
        }
        log::info!("{}", log_message);

        let distribution = self
            .rank_counts
            .iter()
            .enumerate()
            .map(|(i, count)| format!("{}={}", i + 1, format_number_with_commas(*count)))
            .join(", ");
        log::info!("Rank distribution: {}", distribution);
    }
}

pub struct VcfAnnotator {
    reader: bcf::Reader,
    writer: VcfWriter,
    evidence_reader: EvidenceReader,
    pool: ThreadPool,
    quit_on_error: bool,
    stats: AnnotationStats,
}

impl VcfAnnotator {
    pub fn new(args: &AnnotateArgs) -> Result<Self> {
        let reader = bcf::Reader::from_path(&args.input)
            .map_err(|e| format!("Failed to open VCF {}: {}", args.input.display(), e))?;
        check_required_fields(reader.header(), args.transcript_set)?;

        let writer = VcfWriter::new(
            reader.header(),
            &args.output_type,
            args.output.as_ref(),
            args.no_version,
        )?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(args.num_threads)
            .thread_name(|i| format!("mpa-{}", i))
            .build()
            .map_err(|e| format!("Failed to initialize thread pool: {}", e))?;

        Ok(VcfAnnotator {
            reader,
            writer,
            evidence_reader: EvidenceReader::new(args.transcript_set),
            pool,
            quit_on_error: args.quit_on_error,
            stats: AnnotationStats::default(),
        })
    }

    pub fn annotate_variants(&mut self) -> Result<AnnotationStats> {
        let mut records = Vec::with_capacity(BATCH_SIZE);
        let mut evidences = Vec::with_capacity(BATCH_SIZE);

        loop {
            let mut record = self.reader.empty_record();
            match self.reader.read(&mut record) {
                None => break,
                Some(Err(e)) => return Err(format!("Failed to read VCF record: {}", e)),
                Some(Ok(())) => {}
            }
            self.stats.processed += 1;
            if self.stats.processed % PROGRESS_INTERVAL == 0 {
                log::debug!(
                    "Processed {} records",
                    format_number_with_commas(self.stats.processed)
                );
            }

            match self.extract_evidence(&record) {
                Ok(evidence) => {
                    records.push(record);
                    evidences.push(evidence);
                }
                Err(e) => {
                    if self.quit_on_error {
                        return Err(e);
                    }
                    self.stats.rejected += 1;
                    log::warn!("{} Skipping...", e);
                }
            }

            if records.len() >= BATCH_SIZE {
                self.flush_batch(&mut records, &mut evidences)?;
            }
        }
        self.flush_batch(&mut records, &mut evidences)?;

        self.stats.log_summary();
        Ok(self.stats.clone())
    }

    fn extract_evidence(&self, record: &Record) -> Result<VariantEvidence> {
        check_split_variant(record)
            .map_err(|rejection| format!("{} at {}.", rejection, record_locus(record)))?;
        self.evidence_reader
            .read(record)
            .map_err(|e| format!("{} at {}.", e, record_locus(record)))
    }

    /// Scores the batch on the pool and writes it back in input order.
    fn flush_batch(
        &mut self,
        records: &mut Vec<Record>,
        evidences: &mut Vec<VariantEvidence>,
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let outcomes: Vec<RankingOutcome> = self
            .pool
            .install(|| evidences.par_iter().map(mpa::prioritize).collect());

        let batch = records.drain(..).zip(evidences.drain(..)).zip(outcomes);
        for ((mut record, evidence), outcome) in batch {
            log::trace!(
                "{}: rank={} final_score={:.2} impacts={}",
                evidence.locus(),
                outcome.rank,
                outcome.final_score,
                outcome.labels_joined()
            );
            self.writer.write(&mut record, &outcome)?;
            self.stats.record(&outcome);
        }
        Ok(())
    }
}
