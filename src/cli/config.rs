// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub sequence: Option<String>,
    pub fasta: Option<String>,
    pub job: Option<String>,
    pub output_dir: Option<String>,

    // Template selection
    pub state: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub n_templates: Option<usize>,
    pub shuffle_templates: Option<bool>,

    // Services
    pub host_url: Option<String>,
    pub template_url: Option<String>,
    pub gpcrdb_url: Option<String>,
    pub klifs_url: Option<String>,
    pub poll_interval: Option<u64>,
    pub poll_jitter: Option<u64>,
    pub max_polls: Option<usize>,
    pub timeout: Option<u64>,

    // Annotation cache
    pub annotation_cache: Option<String>,
    pub cache_note: Option<String>,

    // MSA perturbation
    pub msa_max_seqs: Option<usize>,
    pub msa_seed: Option<u64>,
    pub mutate: Option<Vec<String>>,

    // Predictor
    pub model: Option<u8>,
    pub max_msa_clusters: Option<usize>,
    pub max_extra_msa: Option<usize>,
    pub num_recycles: Option<usize>,
    pub structure_module_repeats: Option<usize>,
    pub no_ptm: Option<bool>,
    pub predictor_cmd: Option<String>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        println!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# af2state.toml - Configuration file for af2state
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# FASTA file with the query (or use `sequence = "MGQPGN..."`)
fasta = "/path/to/adrb2.fasta"

# Job label (a 5-character sequence hash is appended)
job = "adrb2"

# Directory in which <job>_env is created
output_dir = "runs"

# =============================================================================
# TEMPLATE SELECTION
# =============================================================================

# One GPCR state: Active, Inactive, Intermediate, "G protein", Arrestin
state = ["Active"]

# Kinase conformation instead: [DFG, αC helix, salt bridge]
#   DFG: in, out, out-like, all   αC helix: in, out, all   salt bridge: yes, no, all
# state = ["in", "out", "all"]

# Or an explicit template list
# state = ["3sn6_R", "4ldo_A"]

# PDB codes left out of state-based selection (e.g. the target itself)
exclude = ["2RH1"]

# Maximum number of templates used
n_templates = 20

# Shuffle templates before truncating to n_templates
shuffle_templates = false

# =============================================================================
# SERVICES
# =============================================================================

# host_url = "https://a3m.mmseqs.com"
# template_url = "https://a3m-templates.mmseqs.com/template"
# gpcrdb_url = "http://gpcrdb.org/services/structure"
# klifs_url = "https://klifs.net/api_v2"

# Delay between MMseqs2 requests: poll_interval + random(0..poll_jitter) seconds
poll_interval = 5
poll_jitter = 5

# Give up after this many MMseqs2 requests (omit to wait forever)
# max_polls = 200

# HTTP timeout in seconds
timeout = 300

# =============================================================================
# ANNOTATION CACHE
# =============================================================================

# Reuse GPCRdb/KLIFS lookups across runs
annotation_cache = "annotations.lz4"
cache_note = "GPCR state screening"

# =============================================================================
# MSA PERTURBATION
# =============================================================================

# Randomly keep at most this many sequences (query always kept)
# msa_max_seqs = 256
# msa_seed = 0

# Column substitutions applied to every aligned sequence
# mutate = ["D130A", "R131A"]

# =============================================================================
# PREDICTOR
# =============================================================================

model = 1
# max_msa_clusters = 32
# max_extra_msa = 64
num_recycles = 3
structure_module_repeats = 8
no_ptm = false

# Command run with the request manifest appended as last argument
# predictor_cmd = "python run_af2.py"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::generate_sample()).unwrap();
        assert_eq!(config.state, Some(vec!["Active".to_string()]));
        assert_eq!(config.n_templates, Some(20));
        assert_eq!(config.annotation_cache.as_deref(), Some("annotations.lz4"));
        assert_eq!(config.mutate, None);
    }

    #[test]
    fn test_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("af2state.toml");
        let config = Config {
            job: Some("adrb2".to_string()),
            state: Some(vec!["in".to_string(), "out".to_string(), "all".to_string()]),
            model: Some(2),
            ..Config::new()
        };
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.job.as_deref(), Some("adrb2"));
        assert_eq!(loaded.state.map(|s| s.len()), Some(3));
        assert_eq!(loaded.model, Some(2));
    }
}
