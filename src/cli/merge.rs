// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};
use crate::remote::templates::DEFAULT_N_TEMPLATES;

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output (the query source is taken as a pair so CLI input replaces both)
        if self.sequence.is_none() && self.fasta.is_none() {
            self.sequence = config.sequence;
            self.fasta = config.fasta;
        }
        if self.job.is_none() {
            self.job = config.job;
        }
        if self.output_dir.is_none() {
            self.output_dir = config.output_dir;
        }

        // Template selection (repeatable options only filled when absent on the CLI)
        if self.state.is_empty() {
            self.state = config.state.unwrap_or_default();
        }
        if self.exclude.is_empty() {
            self.exclude = config.exclude.unwrap_or_default();
        }
        if self.n_templates == DEFAULT_N_TEMPLATES {
            if let Some(n) = config.n_templates {
                self.n_templates = n;
            }
        }
        if !self.shuffle_templates && config.shuffle_templates.unwrap_or(false) {
            self.shuffle_templates = true;
        }

        // Services
        if self.host_url.is_none() {
            self.host_url = config.host_url;
        }
        if self.template_url.is_none() {
            self.template_url = config.template_url;
        }
        if self.gpcrdb_url.is_none() {
            self.gpcrdb_url = config.gpcrdb_url;
        }
        if self.klifs_url.is_none() {
            self.klifs_url = config.klifs_url;
        }
        if self.poll_interval == 5 {
            if let Some(secs) = config.poll_interval {
                self.poll_interval = secs;
            }
        }
        if self.poll_jitter == 5 {
            if let Some(secs) = config.poll_jitter {
                self.poll_jitter = secs;
            }
        }
        if self.max_polls.is_none() {
            self.max_polls = config.max_polls;
        }
        if self.timeout == 300 {
            if let Some(secs) = config.timeout {
                self.timeout = secs;
            }
        }

        // Annotation cache
        if self.annotation_cache.is_none() {
            self.annotation_cache = config.annotation_cache;
        }
        if self.cache_note.is_none() {
            self.cache_note = config.cache_note;
        }

        // MSA perturbation
        if self.msa_max_seqs.is_none() {
            self.msa_max_seqs = config.msa_max_seqs;
        }
        if self.msa_seed == 0 {
            if let Some(seed) = config.msa_seed {
                self.msa_seed = seed;
            }
        }
        if self.mutate.is_empty() {
            self.mutate = config.mutate.unwrap_or_default();
        }

        // Predictor (only override defaults, not explicit CLI values)
        if self.model == 1 {
            if let Some(model) = config.model {
                self.model = model;
            }
        }
        if self.max_msa_clusters.is_none() {
            self.max_msa_clusters = config.max_msa_clusters;
        }
        if self.max_extra_msa.is_none() {
            self.max_extra_msa = config.max_extra_msa;
        }
        if self.num_recycles == 3 {
            if let Some(n) = config.num_recycles {
                self.num_recycles = n;
            }
        }
        if self.structure_module_repeats == 8 {
            if let Some(n) = config.structure_module_repeats {
                self.structure_module_repeats = n;
            }
        }
        if !self.no_ptm && config.no_ptm.unwrap_or(false) {
            self.no_ptm = true;
        }
        if self.predictor_cmd.is_none() {
            self.predictor_cmd = config.predictor_cmd;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}
