// runner.rs - End-to-end job: MSA search, template selection and template download

use crate::annotation::{AnnotationSource, StateSelector};
use crate::core::job::{JobWorkspace, A3M_FILES};
use crate::core::selection::{read_template_list, select_templates, write_template_list, SelectedTemplate};
use crate::data::{read_hits, Msa, QuerySequence};
use crate::output::write_selection_report;
use crate::remote::{extract_archive, DownloadedTemplates, MmseqsClient, TemplateFetcher};

/// Result of `Runner::run_job`
#[derive(Debug, Clone)]
pub struct JobOutput {
    pub msa: String,
    pub selected: Vec<SelectedTemplate>,
    pub templates: Option<DownloadedTemplates>,
}

impl JobOutput {
    /// Every accepted hit, before the template cap is applied
    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().map(|s| s.hit.target.clone()).collect()
    }
}

pub struct Runner {
    pub query: QuerySequence,
    pub workspace: JobWorkspace,
    mmseqs: MmseqsClient,
    templates: TemplateFetcher,
    annotations: Box<dyn AnnotationSource>,
    exclusions: Vec<String>,
    pub n_templates: usize,
    pub shuffle_templates: bool,
    command_line: String,
}

impl Runner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        query: QuerySequence,
        workspace: JobWorkspace,
        mmseqs: MmseqsClient,
        templates: TemplateFetcher,
        annotations: Box<dyn AnnotationSource>,
        exclusions: Vec<String>,
        n_templates: usize,
        shuffle_templates: bool,
    ) -> Self {
        Self {
            query,
            workspace,
            mmseqs,
            templates,
            annotations,
            exclusions,
            n_templates,
            shuffle_templates,
            command_line: String::new(),
        }
    }

    /// Recorded in report headers
    pub fn with_command_line(mut self, command_line: &str) -> Self {
        self.command_line = command_line.to_string();
        self
    }

    /// Search, unpack, concatenate the alignment and prepare templates
    pub fn run_job(&mut self, selector: &StateSelector) -> Result<JobOutput, String> {
        self.workspace.create()?;
        self.mmseqs.search(&self.query.sequence, &self.workspace.tarfile())?;

        if !self.workspace.is_extracted() {
            println!("📂 Extracting {}", self.workspace.tarfile().display());
            extract_archive(&self.workspace.tarfile(), &self.workspace.root)?;
        }

        let msa = self.load_msa()?;
        let (selected, templates) = self.process_templates(selector)?;
        Ok(JobOutput { msa, selected, templates })
    }

    /// Concatenated A3M text from an already extracted job
    pub fn load_msa(&self) -> Result<String, String> {
        Msa::concat_a3m(&self.workspace.root, &A3M_FILES)
    }

    /// Select templates from the pdb70 hits, record them, then download
    pub fn process_templates(
        &mut self,
        selector: &StateSelector,
    ) -> Result<(Vec<SelectedTemplate>, Option<DownloadedTemplates>), String> {
        let selected = if selector.is_empty() {
            Vec::new()
        } else {
            let hits = read_hits(&self.workspace.hits_file())?;
            let selected = select_templates(&hits, selector, self.annotations.as_mut(), &self.exclusions);
            self.annotations.flush()?;
            selected
        };

        let pdbs: Vec<String> = selected.iter().map(|s| s.hit.target.clone()).collect();
        write_template_list(&self.workspace.template_list(), &pdbs)?;
        write_selection_report(
            &self.workspace.selection_report(),
            &selected,
            &selector.describe(),
            &self.command_line,
        )?;

        let templates = self.download_templates(&pdbs)?;
        Ok((selected, templates))
    }

    pub fn download_templates(&self, pdbs: &[String]) -> Result<Option<DownloadedTemplates>, String> {
        self.templates.download_templates(
            pdbs,
            &self.workspace.templates_dir(),
            self.shuffle_templates,
            self.n_templates,
        )
    }

    /// Re-download the recorded template list in a new random order
    pub fn shuffle_templates(&mut self) -> Result<Option<DownloadedTemplates>, String> {
        let pdbs = read_template_list(&self.workspace.template_list())?;
        println!("📋 Recorded templates: {}", pdbs.join(", "));

        if pdbs.len() > 1 {
            self.shuffle_templates = true;
        } else {
            eprintln!("⚠️  Impossible to shuffle with 1 template only.");
        }

        self.download_templates(&pdbs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{GpcrAnnotation, GpcrState, KinaseAnnotation};
    use crate::remote::http::mock::MockTransport;
    use crate::remote::mmseqs::fixtures::tar_gz;
    use crate::remote::PollSettings;
    use std::sync::Arc;
    use std::time::Duration;

    struct ActiveOnly;

    impl AnnotationSource for ActiveOnly {
        fn name(&self) -> &'static str {
            "active-only"
        }

        fn lookup_gpcr(&mut self, pdb_id: &str) -> Result<Option<GpcrAnnotation>, String> {
            let state = if pdb_id == "2RH1" { "Inactive" } else { "Active" };
            Ok(Some(GpcrAnnotation {
                state: Some(state.to_string()),
                signalling_protein: None,
            }))
        }

        fn lookup_kinase(&mut self, _pdb_id: &str) -> Result<Option<KinaseAnnotation>, String> {
            Ok(None)
        }
    }

    const M8: &[u8] = b"101\t3sn6_R\t0.98\t282\t5\t0\t29\t310\t1\t282\t1e-95\t330\n\
101\t2rh1_A\t0.97\t280\t7\t0\t29\t308\t3\t282\t4e-94\t325\n\
101\t4ldo_A\t0.95\t270\t9\t0\t30\t300\t3\t272\t1e-90\t300\n";

    fn setup(dir: &std::path::Path) -> (Arc<MockTransport>, Runner) {
        let transport = Arc::new(MockTransport::new());
        transport
            .json("http://mmseqs.test/ticket/msa", r#"{"status":"COMPLETE","id":"t1"}"#)
            .respond(
                "http://mmseqs.test/result/download/t1",
                200,
                tar_gz(&[
                    ("uniref.a3m", &b">101\nMKTAY\n>u1\nMKSAY\n\0"[..]),
                    ("bfd.mgnify30.metaeuk30.smag30.a3m", &b">101\nMKTAY\n>b1\nLKTAY\n"[..]),
                    ("pdb70.m8", M8),
                ]),
            );
        let template_archive = tar_gz(&[("pdb70_a3m.ffindex", &b"idx\n"[..])]);
        for list in ["3sn6_R,4ldo_A", "4ldo_A,3sn6_R", "3sn6_R", "2rh1_A"] {
            transport.respond(&format!("http://tpl.test/template/{}", list), 200, template_archive.clone());
        }

        let poll = PollSettings {
            base: Duration::ZERO,
            jitter: Duration::ZERO,
            max_attempts: Some(10),
        };
        let query = QuerySequence::new("b2ar", "MKTAY").unwrap();
        let workspace = JobWorkspace::new(dir, &query.job, "env");
        let runner = Runner::new(
            query,
            workspace,
            MmseqsClient::new(transport.clone(), "http://mmseqs.test", poll),
            TemplateFetcher::new(transport.clone(), "http://tpl.test/template"),
            Box::new(ActiveOnly),
            Vec::new(),
            20,
            false,
        );
        (transport, runner)
    }

    #[test]
    fn test_run_job_gpcr_state() {
        let dir = tempfile::tempdir().unwrap();
        let (transport, mut runner) = setup(dir.path());

        let output = runner.run_job(&StateSelector::Gpcr(GpcrState::Active)).unwrap();
        assert_eq!(output.selected_ids(), vec!["3sn6_R", "4ldo_A"]);
        let templates = output.templates.unwrap();
        assert_eq!(templates.dir, runner.workspace.templates_dir());
        assert_eq!(templates.pdbs, vec!["3sn6_R", "4ldo_A"]);
        assert_eq!(Msa::parse(&output.msa).unwrap().depth(), 4);
        assert!(!output.msa.contains('\0'));

        assert_eq!(
            std::fs::read_to_string(runner.workspace.template_list()).unwrap(),
            "3sn6_R,4ldo_A,"
        );
        assert!(runner.workspace.selection_report().is_file());
        assert!(runner.workspace.templates_dir().join("pdb70_cs219.ffdata").is_file());
        assert_eq!(transport.count("http://tpl.test/template/3sn6_R,4ldo_A"), 1);

        // a second run reuses the downloaded archive
        runner.run_job(&StateSelector::Gpcr(GpcrState::Active)).unwrap();
        assert_eq!(transport.count("http://mmseqs.test/ticket/msa"), 1);
    }

    #[test]
    fn test_run_job_without_templates() {
        let dir = tempfile::tempdir().unwrap();
        let (_transport, mut runner) = setup(dir.path());

        let output = runner.run_job(&StateSelector::Explicit(Vec::new())).unwrap();
        assert!(output.selected.is_empty());
        assert_eq!(output.templates, None);
        assert!(!runner.workspace.templates_dir().exists());
    }

    #[test]
    fn test_shuffle_templates() {
        let dir = tempfile::tempdir().unwrap();
        let (transport, mut runner) = setup(dir.path());
        runner.run_job(&StateSelector::Gpcr(GpcrState::Active)).unwrap();

        let templates = runner.shuffle_templates().unwrap().unwrap();
        let mut pdbs = templates.pdbs.clone();
        pdbs.sort();
        assert_eq!(pdbs, vec!["3sn6_R", "4ldo_A"]);
        assert!(runner.shuffle_templates);
        let downloads = transport.count("http://tpl.test/template/3sn6_R,4ldo_A")
            + transport.count("http://tpl.test/template/4ldo_A,3sn6_R");
        assert_eq!(downloads, 2);
    }

    #[test]
    fn test_shuffle_single_template_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let (_transport, mut runner) = setup(dir.path());
        runner
            .run_job(&StateSelector::Explicit(vec!["2rh1_A".to_string()]))
            .unwrap();

        let templates = runner.shuffle_templates().unwrap().unwrap();
        assert_eq!(templates.pdbs, vec!["2rh1_A"]);
        assert!(!runner.shuffle_templates);
    }
}
