pub mod annotate;
pub mod validate;
