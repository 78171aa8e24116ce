// traits.rs - Structure annotation records and the lookup seam

use serde::{Deserialize, Serialize};
use crate::annotation::state::SALT_BRIDGE_CUTOFF;

/// GPCRdb structure record, reduced to what the state filter reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpcrAnnotation {
    pub state: Option<String>,
    /// `signalling_protein.type`, e.g. "G protein" or "Arrestin"
    pub signalling_protein: Option<String>,
}

/// KLIFS structure conformation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinaseAnnotation {
    pub structure_id: i64,
    pub dfg: String,
    pub ac_helix: String,
    /// K17-E24 distance in Å, 0 when KLIFS could not measure it
    pub salt_bridge_distance: f64,
}

impl KinaseAnnotation {
    pub fn salt_bridge_formed(&self) -> bool {
        self.salt_bridge_distance > 0.0 && self.salt_bridge_distance <= SALT_BRIDGE_CUTOFF
    }
}

/// Source of per-PDB annotations. `Ok(None)` means the service knows nothing about the entry.
pub trait AnnotationSource {
    fn name(&self) -> &'static str;

    fn lookup_gpcr(&mut self, pdb_id: &str) -> Result<Option<GpcrAnnotation>, String>;

    fn lookup_kinase(&mut self, pdb_id: &str) -> Result<Option<KinaseAnnotation>, String>;

    /// Persist anything worth keeping between runs
    fn flush(&mut self) -> Result<(), String> {
        Ok(())
    }
}
