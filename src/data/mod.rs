// mod.rs - Data structures module

pub mod hits;
pub mod msa;
pub mod sequence;

// Re-export main types for convenience
pub use hits::{parse_hits, read_hits, TemplateHit};
pub use msa::{Msa, MsaMutation, MsaRecord};
pub use sequence::{clean_sequence, define_job_name, QuerySequence};
