// job.rs - On-disk layout of a single prediction job

use std::path::{Path, PathBuf};

/// MSA files shipped in the MMseqs2 env-mode archive, in concatenation order
pub const A3M_FILES: [&str; 2] = ["uniref.a3m", "bfd.mgnify30.metaeuk30.smag30.a3m"];

/// Directory the predictor reads templates from
pub const TEMPLATE_DIR_NAME: &str = "templates_101";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobWorkspace {
    pub job: String,
    pub root: PathBuf,
}

impl JobWorkspace {
    /// `<base>/<job>_<suffix>`
    pub fn new(base_dir: &Path, job: &str, suffix: &str) -> Self {
        Self {
            job: job.to_string(),
            root: base_dir.join(format!("{}_{}", job, suffix)),
        }
    }

    pub fn create(&self) -> Result<(), String> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| format!("Failed to create job directory '{}': {}", self.root.display(), e))
    }

    pub fn tarfile(&self) -> PathBuf {
        self.root.join("out.tar.gz")
    }

    pub fn hits_file(&self) -> PathBuf {
        self.root.join("pdb70.m8")
    }

    pub fn template_list(&self) -> PathBuf {
        self.root.join("template_pdbs.txt")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join(TEMPLATE_DIR_NAME)
    }

    pub fn selection_report(&self) -> PathBuf {
        self.root.join("template_selection.tsv")
    }

    pub fn msa_output(&self) -> PathBuf {
        self.root.join(format!("{}.a3m", self.job))
    }

    pub fn request_manifest(&self) -> PathBuf {
        self.root.join("prediction_request.json")
    }

    /// The archive has already been unpacked when the first alignment file exists
    pub fn is_extracted(&self) -> bool {
        self.root.join(A3M_FILES[0]).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let ws = JobWorkspace::new(Path::new("/runs"), "b2ar_1a2b3", "env");
        assert_eq!(ws.root, PathBuf::from("/runs/b2ar_1a2b3_env"));
        assert_eq!(ws.tarfile(), PathBuf::from("/runs/b2ar_1a2b3_env/out.tar.gz"));
        assert_eq!(ws.templates_dir(), PathBuf::from("/runs/b2ar_1a2b3_env/templates_101"));
        assert_eq!(ws.msa_output(), PathBuf::from("/runs/b2ar_1a2b3_env/b2ar_1a2b3.a3m"));
        assert!(!ws.is_extracted());
    }
}
