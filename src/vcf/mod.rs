pub mod evidence;
pub mod processor;
pub mod writer;
