mod transcript;
mod util;

pub use transcript::TranscriptSet;
pub use util::{contains_ignore_case, format_number_with_commas, handle_error_and_exit, Result};
