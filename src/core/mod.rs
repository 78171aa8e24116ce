// mod.rs - Core pipeline module

pub mod job;
pub mod prediction;
pub mod runner;
pub mod selection;

// Re-export main types for convenience
pub use job::{JobWorkspace, A3M_FILES};
pub use prediction::{CommandPredictor, ManifestOnly, PredictionParams, PredictionRequest, Predictor};
pub use runner::{JobOutput, Runner};
pub use selection::{read_template_list, select_templates, write_template_list, SelectedTemplate};
