pub mod cli;
pub mod commands;
pub mod mpa;
pub mod utils;
pub mod vcf;
