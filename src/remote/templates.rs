// templates.rs - Template structure download into the pdb70 layout the predictor reads

use std::path::{Path, PathBuf};
use std::sync::Arc;
use rand::seq::SliceRandom;
use crate::remote::http::HttpTransport;
use crate::remote::mmseqs::unpack_tar_gz;

pub const DEFAULT_TEMPLATE_URL: &str = "https://a3m-templates.mmseqs.com/template";
pub const DEFAULT_N_TEMPLATES: usize = 20;

/// Templates placed on disk, in the order passed to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedTemplates {
    pub dir: PathBuf,
    pub pdbs: Vec<String>,
}

pub struct TemplateFetcher {
    transport: Arc<dyn HttpTransport>,
    template_url: String,
}

impl TemplateFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, template_url: &str) -> Self {
        Self {
            transport,
            template_url: template_url.trim_end_matches('/').to_string(),
        }
    }

    /// Replace `dir` with the first `n_templates` of `pdbs` (optionally shuffled).
    /// Returns `None` when there is nothing to download.
    pub fn download_templates(
        &self,
        pdbs: &[String],
        dir: &Path,
        shuffle: bool,
        n_templates: usize,
    ) -> Result<Option<DownloadedTemplates>, String> {
        if dir.is_dir() {
            std::fs::remove_dir_all(dir)
                .map_err(|e| format!("Failed to remove '{}': {}", dir.display(), e))?;
        }

        if pdbs.is_empty() || n_templates == 0 {
            eprintln!("⚠️  No templates found.");
            return Ok(None);
        }

        let mut selected = pdbs.to_vec();
        if shuffle && selected.len() > 1 {
            selected.shuffle(&mut rand::thread_rng());
        }
        selected.truncate(n_templates);

        let joined = selected.join(",");
        println!("🧩 TEMPLATE PDBS USED: {}", joined);

        self.fetch_into(&joined, dir)?;
        Ok(Some(DownloadedTemplates {
            dir: dir.to_path_buf(),
            pdbs: selected,
        }))
    }

    fn fetch_into(&self, joined: &str, dir: &Path) -> Result<(), String> {
        let url = format!("{}/{}", self.template_url, joined);
        let archive = self.transport.get(&url)?.into_success(&url)?;
        unpack_tar_gz(archive.as_slice(), dir)?;

        // the predictor opens the cs219 index even though only a3m data is shipped
        let a3m_index = dir.join("pdb70_a3m.ffindex");
        let cs219_index = dir.join("pdb70_cs219.ffindex");
        std::fs::copy(&a3m_index, &cs219_index).map_err(|e| {
            format!("Failed to copy '{}' to '{}': {}", a3m_index.display(), cs219_index.display(), e)
        })?;

        let cs219_data = dir.join("pdb70_cs219.ffdata");
        std::fs::File::create(&cs219_data)
            .map_err(|e| format!("Failed to create '{}': {}", cs219_data.display(), e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::http::mock::MockTransport;
    use crate::remote::mmseqs::fixtures::tar_gz;
    use std::collections::HashSet;

    fn archive() -> Vec<u8> {
        tar_gz(&[
            ("pdb70_a3m.ffindex", &b"3sn6_R\t0\t10\n"[..]),
            ("pdb70_a3m.ffdata", &b">3sn6_R\nMKT\n"[..]),
        ])
    }

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_download_layout() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("http://tpl.test/template/3sn6_R,2rh1_A", 200, archive());

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("templates_101");
        let fetcher = TemplateFetcher::new(transport, "http://tpl.test/template/");
        let result = fetcher
            .download_templates(&strings(&["3sn6_R", "2rh1_A"]), &dir, false, 20)
            .unwrap();

        assert_eq!(
            result,
            Some(DownloadedTemplates {
                dir: dir.clone(),
                pdbs: strings(&["3sn6_R", "2rh1_A"]),
            })
        );
        assert_eq!(
            std::fs::read(dir.join("pdb70_cs219.ffindex")).unwrap(),
            std::fs::read(dir.join("pdb70_a3m.ffindex")).unwrap()
        );
        assert_eq!(std::fs::metadata(dir.join("pdb70_cs219.ffdata")).unwrap().len(), 0);
    }

    #[test]
    fn test_empty_list_clears_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("templates_101");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stale"), b"x").unwrap();

        let fetcher = TemplateFetcher::new(Arc::new(MockTransport::new()), "http://tpl.test/template");
        assert_eq!(fetcher.download_templates(&[], &dir, false, 20).unwrap(), None);
        assert!(!dir.exists());
    }

    #[test]
    fn test_cap_and_shuffle() {
        let transport = Arc::new(MockTransport::new());
        let ids = strings(&["a_A", "b_B", "c_C"]);
        // any two-element ordering the shuffle can produce
        for first in &ids {
            for second in &ids {
                if first != second {
                    transport.respond(&format!("http://tpl.test/template/{},{}", first, second), 200, archive());
                }
            }
        }

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("templates_101");
        let fetcher = TemplateFetcher::new(transport.clone(), "http://tpl.test/template");
        let downloaded = fetcher.download_templates(&ids, &dir, true, 2).unwrap().unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let used: HashSet<&str> = requests[0]
            .trim_start_matches("http://tpl.test/template/")
            .split(',')
            .collect();
        assert_eq!(used.len(), 2);
        assert!(used.iter().all(|id| ids.iter().any(|x| x == id)));
        assert_eq!(requests[0], format!("http://tpl.test/template/{}", downloaded.pdbs.join(",")));
    }

    #[test]
    fn test_http_failure_is_reported() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("http://tpl.test/template/x_A", 500, Vec::new());

        let tmp = tempfile::tempdir().unwrap();
        let fetcher = TemplateFetcher::new(transport, "http://tpl.test/template");
        let err = fetcher
            .download_templates(&strings(&["x_A"]), &tmp.path().join("t"), false, 20)
            .unwrap_err();
        assert!(err.contains("HTTP 500"));
    }
}
