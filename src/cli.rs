use crate::utils::{Result, TranscriptSet};
use crate::vcf::writer::OutputType;
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="mpa",
          version=&**FULL_VERSION,
          about="MoBiDiC Prioritization Algorithm for ANNOVAR-annotated VCF files",
          long_about = None,
          disable_help_subcommand = true,
          after_help = format!("Copyright (C) 2020-{}     MoBiDiC
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Rank and score the variants of an annotated VCF")]
    Annotate(AnnotateArgs),
    #[clap(about = "Check that a VCF carries the annotations needed for ranking")]
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("annotate")))]
#[command(arg_required_else_help(true))]
pub struct AnnotateArgs {
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(help = "VCF annotated with ANNOVAR (refGene, dbnsfp, dbscsnv, spliceai, clinvar)")]
    #[clap(value_name = "VCF")]
    #[arg(value_parser = check_file_exists)]
    pub input: PathBuf,

    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Write output to a file [standard output]")]
    #[clap(value_name = "FILE")]
    #[arg(value_parser = check_output_path)]
    pub output: Option<PathBuf>,

    #[clap(short = 'O')]
    #[clap(long = "output-type")]
    #[clap(value_name = "OUTPUT_TYPE")]
    #[clap(help = "Output type: u|b|v|z, u/b: un/compressed BCF, v/z: un/compressed VCF")]
    #[arg(value_parser = output_type_from_string)]
    pub output_type: Option<OutputType>,

    #[clap(long = "transcript-set")]
    #[clap(value_name = "TRANSCRIPTS")]
    #[clap(help = "Transcript set used for gene-based annotation (refgene or refgene-with-ver)")]
    #[clap(default_value = "refgene")]
    pub transcript_set: TranscriptSet,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "quit-on-error")]
    #[clap(help = "Stop at the first variant that cannot be ranked")]
    pub quit_on_error: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "no-version")]
    #[clap(help = "Do not append version and command line to the header")]
    pub no_version: bool,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("validate")))]
#[command(arg_required_else_help(true))]
pub struct ValidateArgs {
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(help = "VCF annotated with ANNOVAR")]
    #[clap(value_name = "VCF")]
    #[arg(value_parser = check_file_exists)]
    pub input: PathBuf,

    #[clap(long = "transcript-set")]
    #[clap(value_name = "TRANSCRIPTS")]
    #[clap(help = "Transcript set used for gene-based annotation (refgene or refgene-with-ver)")]
    #[clap(default_value = "refgene")]
    pub transcript_set: TranscriptSet,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_output_path(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(path.to_path_buf())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn output_type_from_string(s: &str) -> Result<OutputType> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threads_in_range() {
        assert_eq!(threads_in_range("4"), Ok(4));
        assert!(threads_in_range("0").is_err());
        assert!(threads_in_range("four").is_err());
    }

    #[test]
    fn test_check_output_path() {
        assert!(check_output_path("annotated.vcf").is_ok());
        assert!(check_output_path("/this/does/not/exist/annotated.vcf").is_err());
    }

    #[test]
    fn test_parse_annotate_args() {
        let input = tempfile::NamedTempFile::new().unwrap();
        let input_path = input.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "mpa",
            "-vv",
            "annotate",
            "-i",
            &input_path,
            "-O",
            "z",
            "--transcript-set",
            "refgene-with-ver",
            "-t",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Command::Annotate(args) => {
                assert_eq!(args.output, None);
                assert_eq!(
                    args.output_type,
                    Some(OutputType::Vcf {
                        is_uncompressed: false
                    })
                );
                assert_eq!(args.transcript_set, TranscriptSet::RefGeneWithVer);
                assert_eq!(args.num_threads, 3);
                assert!(!args.quit_on_error);
                assert!(!args.no_version);
            }
            Command::Validate(_) => panic!("expected annotate"),
        }
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let result = Cli::try_parse_from(["mpa", "annotate", "-i", "/no/such/input.vcf"]);
        assert!(result.is_err());
    }
}
