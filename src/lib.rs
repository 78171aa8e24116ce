// lib.rs - af2state library root

//! # af2state - State-biased AlphaFold2 input preparation for GPCRs and kinases
//!
//! This library prepares the inputs of an AlphaFold2 prediction so that the
//! predicted structure is biased toward a chosen conformational state. The
//! network itself is external; af2state fetches the MSA and template hits
//! from an MMseqs2 server, keeps only templates whose GPCRdb or KLIFS
//! annotation matches the requested state, optionally perturbs the MSA, and
//! writes everything in the layout the predictor expects.
//!
//! ## Features
//!
//! - **GPCR states**: Active, Inactive, Intermediate, G protein or Arrestin bound (GPCRdb)
//! - **Kinase conformations**: DFG, αC helix and K17-E24 salt bridge filters (KLIFS)
//! - **MSA perturbation**: seeded subsampling and in-silico column mutagenesis
//! - **Annotation cache**: LZ4-compressed lookups reused across runs
//! - **Template shuffling**: re-draw the template subset from a previous selection
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use af2state::prelude::*;
//!
//! let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(std::time::Duration::from_secs(300))?);
//! let query = QuerySequence::from_fasta(std::path::Path::new("adrb2.fasta"), Some("adrb2"))?;
//! let workspace = JobWorkspace::new(std::path::Path::new("runs"), &query.job, "env");
//!
//! let mut runner = Runner::new(
//!     query,
//!     workspace,
//!     MmseqsClient::new(transport.clone(), "https://a3m.mmseqs.com", PollSettings::default()),
//!     TemplateFetcher::new(transport.clone(), "https://a3m-templates.mmseqs.com/template"),
//!     Box::new(RemoteAnnotations::new(transport, "http://gpcrdb.org/services/structure", "https://klifs.net/api_v2")),
//!     vec!["2RH1".to_string()],  // exclusions
//!     20,     // n_templates
//!     false,  // shuffle
//! );
//! let output = runner.run_job(&StateSelector::Gpcr(GpcrState::Active))?;
//! println!("{} templates", output.selected.len());
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod annotation;
pub mod cli;
pub mod core;
pub mod data;
pub mod output;
pub mod remote;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::annotation::{AnnotationSource, CachedAnnotations, RemoteAnnotations};
    pub use crate::annotation::{GpcrState, KinaseConformation, StateSelector};
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{JobOutput, JobWorkspace, Runner};
    pub use crate::core::{CommandPredictor, ManifestOnly, PredictionParams, PredictionRequest, Predictor};
    pub use crate::data::{Msa, MsaMutation, QuerySequence, TemplateHit};
    pub use crate::output::{write_msa, write_selection_report};
    pub use crate::remote::{HttpTransport, MmseqsClient, PollSettings, ReqwestTransport, TemplateFetcher};
}

// Re-export main types at the root level for convenience
pub use annotation::{GpcrState, KinaseConformation, StateSelector};
pub use cli::{Args, ValidationResult};
pub use core::{PredictionRequest, Runner};
pub use data::{Msa, MsaMutation, QuerySequence};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "af2state v{} - State-biased AlphaFold2 input preparation",
        VERSION
    )
}
