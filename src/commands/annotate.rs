use crate::cli::AnnotateArgs;
use crate::utils::Result;
use crate::vcf::processor::VcfAnnotator;
use std::time;

pub fn annotate(args: AnnotateArgs) -> Result<()> {
    let start_timer = time::Instant::now();

    let mut annotator = VcfAnnotator::new(&args)?;
    annotator.annotate_variants()?;

    log::info!("Total execution time: {:.2?}", start_timer.elapsed());
    Ok(())
}
