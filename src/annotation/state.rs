// state.rs - User-selected conformational states for GPCRs and kinases

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::annotation::traits::{GpcrAnnotation, KinaseAnnotation};

/// Upper bound (Å) of the K17-E24 distance counted as a formed salt bridge
pub const SALT_BRIDGE_CUTOFF: f64 = 4.5;

/// GPCRdb activation state or bound signalling protein
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpcrState {
    Active,
    Inactive,
    Intermediate,
    GProtein,
    Arrestin,
}

impl GpcrState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Active" => Some(GpcrState::Active),
            "Inactive" => Some(GpcrState::Inactive),
            "Intermediate" => Some(GpcrState::Intermediate),
            "G protein" => Some(GpcrState::GProtein),
            "Arrestin" => Some(GpcrState::Arrestin),
            _ => None,
        }
    }

    /// Label as GPCRdb spells it
    pub fn label(&self) -> &'static str {
        match self {
            GpcrState::Active => "Active",
            GpcrState::Inactive => "Inactive",
            GpcrState::Intermediate => "Intermediate",
            GpcrState::GProtein => "G protein",
            GpcrState::Arrestin => "Arrestin",
        }
    }

    pub fn all() -> [GpcrState; 5] {
        [
            GpcrState::Active,
            GpcrState::Inactive,
            GpcrState::Intermediate,
            GpcrState::GProtein,
            GpcrState::Arrestin,
        ]
    }

    /// Either the structure state or the bound signalling protein type must equal the label
    pub fn matches(&self, annotation: &GpcrAnnotation) -> bool {
        let label = self.label();
        annotation.state.as_deref() == Some(label)
            || annotation.signalling_protein.as_deref() == Some(label)
    }
}

impl fmt::Display for GpcrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DfgFilter {
    In,
    Out,
    OutLike,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcHelixFilter {
    In,
    Out,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaltBridgeFilter {
    Yes,
    No,
    All,
}

impl DfgFilter {
    fn label(&self) -> &'static str {
        match self {
            DfgFilter::In => "in",
            DfgFilter::Out => "out",
            DfgFilter::OutLike => "out-like",
            DfgFilter::All => "all",
        }
    }
}

impl AcHelixFilter {
    fn label(&self) -> &'static str {
        match self {
            AcHelixFilter::In => "in",
            AcHelixFilter::Out => "out",
            AcHelixFilter::All => "all",
        }
    }
}

impl SaltBridgeFilter {
    fn label(&self) -> &'static str {
        match self {
            SaltBridgeFilter::Yes => "yes",
            SaltBridgeFilter::No => "no",
            SaltBridgeFilter::All => "all",
        }
    }
}

/// KLIFS conformation filter: DFG motif, αC helix and K17-E24 salt bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KinaseConformation {
    pub dfg: DfgFilter,
    pub ac_helix: AcHelixFilter,
    pub salt_bridge: SaltBridgeFilter,
}

impl KinaseConformation {
    pub fn parse(dfg: &str, ac_helix: &str, salt_bridge: &str) -> Result<Self, String> {
        let dfg = match dfg {
            "in" => DfgFilter::In,
            "out" => DfgFilter::Out,
            "out-like" => DfgFilter::OutLike,
            "all" => DfgFilter::All,
            _ => return Err("DFG value invalid".to_string()),
        };
        let ac_helix = match ac_helix {
            "in" => AcHelixFilter::In,
            "out" => AcHelixFilter::Out,
            "all" => AcHelixFilter::All,
            _ => return Err("ac_helix value invalid".to_string()),
        };
        let salt_bridge = match salt_bridge {
            "yes" => SaltBridgeFilter::Yes,
            "no" => SaltBridgeFilter::No,
            "all" => SaltBridgeFilter::All,
            _ => return Err("salt_bridge value invalid".to_string()),
        };
        Ok(Self { dfg, ac_helix, salt_bridge })
    }

    /// Filters set to `all` are not checked
    pub fn matches(&self, annotation: &KinaseAnnotation) -> bool {
        let dfg_ok = self.dfg == DfgFilter::All || annotation.dfg == self.dfg.label();
        let helix_ok = self.ac_helix == AcHelixFilter::All || annotation.ac_helix == self.ac_helix.label();
        let bridge_ok = match self.salt_bridge {
            SaltBridgeFilter::All => true,
            SaltBridgeFilter::Yes => annotation.salt_bridge_formed(),
            SaltBridgeFilter::No => !annotation.salt_bridge_formed(),
        };
        dfg_ok && helix_ok && bridge_ok
    }
}

impl fmt::Display for KinaseConformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DFG {}, αC helix {}, salt bridge {}",
            self.dfg.label(),
            self.ac_helix.label(),
            self.salt_bridge.label()
        )
    }
}

/// How templates are chosen from the pdb70 hits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateSelector {
    /// Keep only the listed `<pdb>_<chain>` targets
    Explicit(Vec<String>),
    Gpcr(GpcrState),
    Kinase(KinaseConformation),
}

impl StateSelector {
    /// One GPCR state label, three kinase filter values, or a list of templates
    pub fn from_values(values: &[String]) -> Result<Self, String> {
        if let [single] = values {
            if let Some(state) = GpcrState::parse(single) {
                return Ok(StateSelector::Gpcr(state));
            }
        }
        if let [dfg, ac_helix, salt_bridge] = values {
            if looks_like_kinase_filter(dfg) {
                return Ok(StateSelector::Kinase(KinaseConformation::parse(dfg, ac_helix, salt_bridge)?));
            }
        }
        Ok(StateSelector::Explicit(values.to_vec()))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, StateSelector::Explicit(list) if list.is_empty())
    }

    pub fn describe(&self) -> String {
        match self {
            StateSelector::Explicit(list) if list.is_empty() => "no templates".to_string(),
            StateSelector::Explicit(list) => format!("explicit list ({} templates)", list.len()),
            StateSelector::Gpcr(state) => format!("GPCR state '{}'", state),
            StateSelector::Kinase(conf) => format!("kinase conformation ({})", conf),
        }
    }
}

/// Template ids always contain an underscore; kinase filter values never do
fn looks_like_kinase_filter(value: &str) -> bool {
    !value.contains('_')
}
