// prediction.rs - Argument surface handed to the external structure predictor

use std::path::{Path, PathBuf};
use std::process::Command;
use serde::{Deserialize, Serialize};
use crate::data::MsaMutation;

/// Network settings chosen by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionParams {
    /// AlphaFold2 model 1-5
    pub model_index: u8,
    pub max_msa_clusters: Option<usize>,
    pub max_extra_msa: Option<usize>,
    pub num_recycles: usize,
    /// Iterations of the structure module (AlphaFold2 uses 8)
    pub structure_module_repeats: usize,
    pub use_ptm: bool,
}

impl Default for PredictionParams {
    fn default() -> Self {
        Self {
            model_index: 1,
            max_msa_clusters: None,
            max_extra_msa: None,
            num_recycles: 3,
            structure_module_repeats: 8,
            use_ptm: true,
        }
    }
}

impl PredictionParams {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=5).contains(&self.model_index) {
            return Err(format!("Model index must be between 1 and 5, got {}", self.model_index));
        }
        if self.max_msa_clusters == Some(0) {
            return Err("--max-msa-clusters must be greater than 0".to_string());
        }
        if self.max_extra_msa == Some(0) {
            return Err("--max-extra-msa must be greater than 0".to_string());
        }
        if self.structure_module_repeats == 0 {
            return Err("--structure-module-repeats must be at least 1".to_string());
        }
        Ok(())
    }

    /// Parameter file name inside the AlphaFold2 weights directory
    pub fn model_name(&self) -> String {
        if self.use_ptm {
            format!("model_{}_ptm", self.model_index)
        } else {
            format!("model_{}", self.model_index)
        }
    }
}

/// Everything the predictor needs for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub job_name: String,
    pub sequence: String,
    pub msa_path: PathBuf,
    pub msa_depth: usize,
    pub template_dir: Option<PathBuf>,
    pub templates: Vec<String>,
    pub msa_mutations: Vec<MsaMutation>,
    pub model_name: String,
    #[serde(flatten)]
    pub params: PredictionParams,
    pub created: String,
}

impl PredictionRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_name: &str,
        sequence: &str,
        msa_path: &Path,
        msa_depth: usize,
        template_dir: Option<PathBuf>,
        templates: Vec<String>,
        msa_mutations: Vec<MsaMutation>,
        params: PredictionParams,
    ) -> Result<Self, String> {
        params.validate()?;
        if sequence.is_empty() {
            return Err("Prediction request has an empty sequence".to_string());
        }
        Ok(Self {
            job_name: job_name.to_string(),
            sequence: sequence.to_string(),
            msa_path: msa_path.to_path_buf(),
            msa_depth,
            template_dir,
            templates,
            msa_mutations,
            model_name: params.model_name(),
            params,
            created: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        })
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize prediction request: {}", e))?;
        std::fs::write(path, json)
            .map_err(|e| format!("Failed to write prediction request '{}': {}", path.display(), e))?;
        println!("📝 Prediction request written to: {}", path.display());
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read prediction request '{}': {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse prediction request '{}': {}", path.display(), e))
    }
}

/// Hands a written request to the structure predictor
pub trait Predictor {
    fn name(&self) -> &'static str;

    fn predict(&self, request: &PredictionRequest, manifest: &Path) -> Result<(), String>;
}

/// Leaves the manifest for the user to run by hand
pub struct ManifestOnly;

impl Predictor for ManifestOnly {
    fn name(&self) -> &'static str {
        "manifest-only"
    }

    fn predict(&self, request: &PredictionRequest, manifest: &Path) -> Result<(), String> {
        println!("💡 No predictor command configured; run {} with {}", request.model_name, manifest.display());
        Ok(())
    }
}

/// Runs an external command with the manifest path appended as the last argument
pub struct CommandPredictor {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandPredictor {
    /// Split a command line on whitespace
    pub fn from_command_line(command: &str) -> Result<Self, String> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or("Predictor command is empty")?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Predictor for CommandPredictor {
    fn name(&self) -> &'static str {
        "command"
    }

    fn predict(&self, request: &PredictionRequest, manifest: &Path) -> Result<(), String> {
        println!("🚀 Running predictor '{}' for {} ({})", self.program, request.job_name, request.model_name);
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(manifest)
            .status()
            .map_err(|e| format!("Failed to start predictor '{}': {}", self.program, e))?;

        if !status.success() {
            return Err(format!("Predictor '{}' exited with {}", self.program, status));
        }
        println!("✅ Predictor finished");
        Ok(())
    }
}
