use crate::mpa::RankingOutcome;
use crate::utils::Result;
use rust_htslib::bcf::{
    self,
    header::{HeaderView, TagType},
};
use std::{env, path::PathBuf, str::FromStr};

pub const ADJUSTED_TAG: &str = "MPA_adjusted";
pub const AVAILABLE_TAG: &str = "MPA_available";
pub const DELETERIOUS_TAG: &str = "MPA_deleterious";
pub const FINAL_SCORE_TAG: &str = "MPA_final_score";
pub const IMPACT_TAG: &str = "MPA_impact";
pub const RANKING_TAG: &str = "MPA_ranking";

pub const MPA_TAGS: [&str; 6] = [
    ADJUSTED_TAG,
    AVAILABLE_TAG,
    DELETERIOUS_TAG,
    FINAL_SCORE_TAG,
    IMPACT_TAG,
    RANKING_TAG,
];

const MPA_INFO_LINES: [&str; 6] = [
    "##INFO=<ID=MPA_adjusted,Number=1,Type=Float,Description=\"MPA adjusted missense score: deleterious predictors over available predictors, scaled to 10\">",
    "##INFO=<ID=MPA_available,Number=1,Type=Integer,Description=\"MPA number of missense predictors with a call\">",
    "##INFO=<ID=MPA_deleterious,Number=1,Type=Integer,Description=\"MPA number of missense predictors calling deleterious\">",
    "##INFO=<ID=MPA_final_score,Number=1,Type=Float,Description=\"MPA final score from 0 to 10\">",
    "##INFO=<ID=MPA_impact,Number=.,Type=String,Description=\"MPA impacts detected for the variant\">",
    "##INFO=<ID=MPA_ranking,Number=1,Type=Integer,Description=\"MPA ranking from 1 (most severe) to 10\">",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputType {
    Vcf { is_uncompressed: bool },
    Bcf { is_uncompressed: bool },
}

impl OutputType {
    fn writer_params(&self) -> (bool, bcf::Format) {
        match *self {
            OutputType::Vcf { is_uncompressed } => (is_uncompressed, bcf::Format::Vcf),
            OutputType::Bcf { is_uncompressed } => (is_uncompressed, bcf::Format::Bcf),
        }
    }

    pub fn infer_from_extension(path: &str) -> OutputType {
        let path_lower = path.to_lowercase();
        match path_lower.as_str() {
            s if s.ends_with(".bcf.gz") => OutputType::Bcf {
                is_uncompressed: false,
            },
            s if s.ends_with(".vcf.gz") || s.ends_with(".vcf.bgz") => OutputType::Vcf {
                is_uncompressed: false,
            },
            s if s.ends_with(".bcf") => OutputType::Bcf {
                is_uncompressed: true,
            },
            _ => OutputType::Vcf {
                is_uncompressed: true,
            },
        }
    }
}

impl FromStr for OutputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "v" => Ok(OutputType::Vcf {
                is_uncompressed: true,
            }),
            "z" => Ok(OutputType::Vcf {
                is_uncompressed: false,
            }),
            "u" => Ok(OutputType::Bcf {
                is_uncompressed: true,
            }),
            "b" => Ok(OutputType::Bcf {
                is_uncompressed: false,
            }),
            _ => Err(format!(
                "Invalid output type: {}. Must be one of v, z, u, b",
                s
            )),
        }
    }
}

/// Output header: the input header with MPA definitions replaced by ours.
pub fn build_output_header(template: &HeaderView, no_version: bool) -> bcf::Header {
    let mut out_header = bcf::Header::from_template(template);
    for tag in MPA_TAGS {
        out_header.remove_info(tag.as_bytes());
    }
    for line in MPA_INFO_LINES {
        out_header.push_record(line.as_bytes());
    }
    if !no_version {
        add_version_info(&mut out_header);
    }
    out_header
}

fn add_version_info(out_header: &mut bcf::Header) {
    let version_key = format!("{}Version", env!("CARGO_PKG_NAME"));
    let command_key = format!("{}Command", env!("CARGO_PKG_NAME"));
    // Provenance of an earlier run is replaced, not accumulated
    out_header.remove_generic(version_key.as_bytes());
    out_header.remove_generic(command_key.as_bytes());

    let version_line = format!(
        "##{}Version={}",
        env!("CARGO_PKG_NAME"),
        *crate::cli::FULL_VERSION
    );
    out_header.push_record(version_line.as_bytes());

    let command_line = format!(
        "##{}Command={}",
        env!("CARGO_PKG_NAME"),
        env::args().collect::<Vec<String>>().join(" ")
    );
    out_header.push_record(command_line.as_bytes());
}

pub struct VcfWriter {
    writer: bcf::Writer,
    // MPA tags already present in the input, stripped before re-annotation
    stale_tags: Vec<(&'static str, TagType)>,
}

impl VcfWriter {
    pub fn new(
        input_header: &HeaderView,
        output_type: &Option<OutputType>,
        output: Option<&PathBuf>,
        no_version: bool,
    ) -> Result<Self> {
        let output_type = match (output_type, output) {
            (Some(output_type), _) => output_type.clone(),
            (None, Some(path)) => OutputType::infer_from_extension(&path.to_string_lossy()),
            (None, None) => OutputType::Vcf {
                is_uncompressed: true,
            },
        };
        log::debug!("{:?}", &output_type);

        let header = build_output_header(input_header, no_version);
        let (is_uncompressed, format) = output_type.writer_params();
        let writer = match output {
            Some(path) => bcf::Writer::from_path(path, &header, is_uncompressed, format)
                .map_err(|e| format!("Failed to create writer for {}: {}", path.display(), e))?,
            None => bcf::Writer::from_stdout(&header, is_uncompressed, format)
                .map_err(|e| format!("Failed to create writer: {}", e))?,
        };

        let stale_tags = MPA_TAGS
            .into_iter()
            .filter_map(|tag| {
                input_header
                    .info_type(tag.as_bytes())
                    .ok()
                    .map(|(tag_type, _)| (tag, tag_type))
            })
            .collect::<Vec<_>>();
        if !stale_tags.is_empty() {
            log::warn!("Input is already MPA-annotated, existing MPA fields will be replaced");
        }

        Ok(VcfWriter { writer, stale_tags })
    }

    pub fn write(&mut self, record: &mut bcf::Record, outcome: &RankingOutcome) -> Result<()> {
        self.strip_stale_tags(record)?;
        self.writer.translate(record);
        annotate_record(record, outcome)?;
        self.writer
            .write(record)
            .map_err(|e| format!("Failed to write record: {}", e))
    }

    fn strip_stale_tags(&self, record: &mut bcf::Record) -> Result<()> {
        for (tag, tag_type) in &self.stale_tags {
            let tag = tag.as_bytes();
            match tag_type {
                TagType::Integer => record.clear_info_integer(tag),
                TagType::Float => record.clear_info_float(tag),
                TagType::String => record.clear_info_string(tag),
                TagType::Flag => record.clear_info_flag(tag),
            }
            .map_err(|e| format!("Failed to clear INFO/{}: {}", String::from_utf8_lossy(tag), e))?;
        }
        Ok(())
    }
}

/// Sets the six MPA INFO fields. The record must use a header that defines them.
pub fn annotate_record(record: &mut bcf::Record, outcome: &RankingOutcome) -> Result<()> {
    let labels = outcome.labels();
    let labels: Vec<&[u8]> = labels.iter().map(|l| l.as_bytes()).collect();
    let to_message = |e: rust_htslib::errors::Error| format!("Failed to annotate record: {}", e);

    record
        .push_info_float(ADJUSTED_TAG.as_bytes(), &[outcome.score.adjusted as f32])
        .map_err(to_message)?;
    record
        .push_info_integer(AVAILABLE_TAG.as_bytes(), &[outcome.score.available as i32])
        .map_err(to_message)?;
    record
        .push_info_integer(DELETERIOUS_TAG.as_bytes(), &[outcome.score.deleterious as i32])
        .map_err(to_message)?;
    record
        .push_info_float(FINAL_SCORE_TAG.as_bytes(), &[outcome.final_score as f32])
        .map_err(to_message)?;
    record
        .push_info_string(IMPACT_TAG.as_bytes(), &labels)
        .map_err(to_message)?;
    record
        .push_info_integer(RANKING_TAG.as_bytes(), &[outcome.rank as i32])
        .map_err(to_message)?;
    Ok(())
}
