// selection.rs - State-driven template selection from pdb70 hits

use std::collections::HashSet;
use std::path::Path;
use indicatif::{ProgressBar, ProgressStyle};
use crate::annotation::{AnnotationSource, GpcrState, KinaseConformation, StateSelector};
use crate::data::TemplateHit;

/// Hit accepted as a template, with the annotation that qualified it
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedTemplate {
    pub hit: TemplateHit,
    pub annotation: String,
}

/// Filter hits in file order. Annotation-driven modes keep at most one chain per PDB entry
/// and skip `exclusions` (PDB codes, case-insensitive).
pub fn select_templates(
    hits: &[TemplateHit],
    selector: &StateSelector,
    source: &mut dyn AnnotationSource,
    exclusions: &[String],
) -> Vec<SelectedTemplate> {
    println!("🔎 Selecting templates: {}", selector.describe());
    println!("seq\tpdb\tcid\tevalue");

    let selected = match selector {
        StateSelector::Explicit(targets) => select_explicit(hits, targets),
        StateSelector::Gpcr(state) => select_annotated(hits, exclusions, source, |src, pdb_id| {
            gpcr_match(src, pdb_id, *state)
        }),
        StateSelector::Kinase(conformation) => select_annotated(hits, exclusions, source, |src, pdb_id| {
            kinase_match(src, pdb_id, conformation)
        }),
    };

    for template in &selected {
        println!(
            "{}\t{}\t{}\t{:e}",
            template.hit.query, template.hit.target, template.hit.identity, template.hit.evalue
        );
    }
    println!("✅ Selected {} of {} hits", selected.len(), hits.len());
    selected
}

fn select_explicit(hits: &[TemplateHit], targets: &[String]) -> Vec<SelectedTemplate> {
    hits.iter()
        .filter(|hit| targets.iter().any(|t| t == &hit.target))
        .map(|hit| SelectedTemplate {
            hit: hit.clone(),
            annotation: "requested".to_string(),
        })
        .collect()
}

fn select_annotated<F>(
    hits: &[TemplateHit],
    exclusions: &[String],
    source: &mut dyn AnnotationSource,
    mut check: F,
) -> Vec<SelectedTemplate>
where
    F: FnMut(&mut dyn AnnotationSource, &str) -> Result<Option<String>, String>,
{
    let excluded: HashSet<String> = exclusions.iter().map(|e| e.trim().to_uppercase()).collect();
    let mut accepted: HashSet<String> = HashSet::new();
    let mut selected = Vec::new();

    let pb = ProgressBar::new(hits.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}") {
        pb.set_style(style);
    }

    for hit in hits {
        pb.inc(1);
        let pdb_id = hit.pdb_id();
        if accepted.contains(&pdb_id) || excluded.contains(&pdb_id) {
            continue;
        }
        pb.set_message(format!("{} via {}", pdb_id, source.name()));

        match check(&mut *source, &pdb_id) {
            Ok(Some(annotation)) => {
                accepted.insert(pdb_id);
                selected.push(SelectedTemplate {
                    hit: hit.clone(),
                    annotation,
                });
            }
            Ok(None) => {}
            Err(e) => pb.println(format!("⚠️  Skipping {}: {}", hit.target, e)),
        }
    }

    pb.finish_and_clear();
    selected
}

fn gpcr_match(source: &mut dyn AnnotationSource, pdb_id: &str, state: GpcrState) -> Result<Option<String>, String> {
    let annotation = match source.lookup_gpcr(pdb_id)? {
        Some(annotation) => annotation,
        None => return Ok(None),
    };
    if !state.matches(&annotation) {
        return Ok(None);
    }
    Ok(Some(format!(
        "state={};signalling_protein={}",
        annotation.state.as_deref().unwrap_or("NA"),
        annotation.signalling_protein.as_deref().unwrap_or("NA")
    )))
}

fn kinase_match(
    source: &mut dyn AnnotationSource,
    pdb_id: &str,
    conformation: &KinaseConformation,
) -> Result<Option<String>, String> {
    let annotation = match source.lookup_kinase(pdb_id)? {
        Some(annotation) => annotation,
        None => return Ok(None),
    };
    if !conformation.matches(&annotation) {
        return Ok(None);
    }
    Ok(Some(format!(
        "DFG={};ac_helix={};salt_bridge_17_24={:.2}",
        annotation.dfg, annotation.ac_helix, annotation.salt_bridge_distance
    )))
}

/// Comma-separated with a trailing comma, as read back by `read_template_list`
pub fn write_template_list(path: &Path, pdbs: &[String]) -> Result<(), String> {
    let content: String = pdbs.iter().map(|p| format!("{},", p)).collect();
    std::fs::write(path, content)
        .map_err(|e| format!("Failed to write template list '{}': {}", path.display(), e))
}

pub fn read_template_list(path: &Path) -> Result<Vec<String>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read template list '{}': {}", path.display(), e))?;
    let mut pdbs: Vec<String> = content.trim_end().split(',').map(|s| s.to_string()).collect();
    if pdbs.last().map(|s| s.is_empty()).unwrap_or(false) {
        pdbs.pop();
    }
    Ok(pdbs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{GpcrAnnotation, KinaseAnnotation};
    use crate::data::parse_hits;
    use std::collections::HashMap;

    /// Fixed annotations; unknown ids are misses, "ERR" ids fail
    #[derive(Default)]
    struct TableSource {
        gpcr: HashMap<String, GpcrAnnotation>,
        kinase: HashMap<String, KinaseAnnotation>,
        lookups: Vec<String>,
    }

    impl AnnotationSource for TableSource {
        fn name(&self) -> &'static str {
            "table"
        }

        fn lookup_gpcr(&mut self, pdb_id: &str) -> Result<Option<GpcrAnnotation>, String> {
            self.lookups.push(pdb_id.to_string());
            if pdb_id.starts_with("ERR") {
                return Err("service unavailable".to_string());
            }
            Ok(self.gpcr.get(pdb_id).cloned())
        }

        fn lookup_kinase(&mut self, pdb_id: &str) -> Result<Option<KinaseAnnotation>, String> {
            self.lookups.push(pdb_id.to_string());
            Ok(self.kinase.get(pdb_id).cloned())
        }
    }

    fn hits(targets: &[&str]) -> Vec<TemplateHit> {
        let m8: String = targets
            .iter()
            .map(|t| format!("101\t{}\t0.9\t100\t5\t0\t1\t100\t1\t100\t1e-30\t200\n", t))
            .collect();
        parse_hits(&m8).unwrap()
    }

    fn gpcr(state: &str, protein: Option<&str>) -> GpcrAnnotation {
        GpcrAnnotation {
            state: Some(state.to_string()),
            signalling_protein: protein.map(|p| p.to_string()),
        }
    }

    fn targets(selected: &[SelectedTemplate]) -> Vec<&str> {
        selected.iter().map(|s| s.hit.target.as_str()).collect()
    }

    #[test]
    fn test_explicit_selection() {
        let mut source = TableSource::default();
        let selector = StateSelector::Explicit(vec!["2rh1_A".to_string(), "3sn6_R".to_string()]);
        let selected = select_templates(&hits(&["3sn6_R", "3sn6_A", "2rh1_A"]), &selector, &mut source, &[]);

        assert_eq!(targets(&selected), vec!["3sn6_R", "2rh1_A"]);
        assert!(source.lookups.is_empty());
    }

    #[test]
    fn test_gpcr_selection_dedup_and_exclusions() {
        let mut source = TableSource::default();
        source.gpcr.insert("3SN6".to_string(), gpcr("Active", Some("G protein")));
        source.gpcr.insert("2RH1".to_string(), gpcr("Inactive", None));
        source.gpcr.insert("4LDO".to_string(), gpcr("Active", None));
        source.gpcr.insert("6NI2".to_string(), gpcr("Intermediate", Some("Arrestin")));

        let all = hits(&["3sn6_R", "3sn6_A", "2rh1_A", "4ldo_A", "6ni2_R", "1atp_E"]);

        let active = StateSelector::Gpcr(GpcrState::Active);
        let selected = select_templates(&all, &active, &mut source, &[]);
        assert_eq!(targets(&selected), vec!["3sn6_R", "4ldo_A"]);
        assert!(selected[0].annotation.contains("state=Active"));

        let selected = select_templates(&all, &active, &mut source, &["4ldo".to_string()]);
        assert_eq!(targets(&selected), vec!["3sn6_R"]);

        let arrestin = StateSelector::Gpcr(GpcrState::Arrestin);
        let selected = select_templates(&all, &arrestin, &mut source, &[]);
        assert_eq!(targets(&selected), vec!["6ni2_R"]);
    }

    #[test]
    fn test_lookup_errors_skip_hit() {
        let mut source = TableSource::default();
        source.gpcr.insert("2RH1".to_string(), gpcr("Inactive", None));

        let selector = StateSelector::Gpcr(GpcrState::Inactive);
        let selected = select_templates(&hits(&["err1_A", "2rh1_A"]), &selector, &mut source, &[]);
        assert_eq!(targets(&selected), vec!["2rh1_A"]);
    }

    #[test]
    fn test_kinase_selection() {
        let mut source = TableSource::default();
        let conformation = |dfg: &str, helix: &str, d: f64| KinaseAnnotation {
            structure_id: 1,
            dfg: dfg.to_string(),
            ac_helix: helix.to_string(),
            salt_bridge_distance: d,
        };
        source.kinase.insert("1ATP".to_string(), conformation("in", "in", 3.0));
        source.kinase.insert("3LCK".to_string(), conformation("in", "out", 12.0));
        source.kinase.insert("1IEP".to_string(), conformation("out", "in", 3.5));

        let all = hits(&["1atp_E", "3lck_A", "1iep_A"]);
        let selector = StateSelector::Kinase(KinaseConformation::parse("in", "all", "all").unwrap());
        assert_eq!(targets(&select_templates(&all, &selector, &mut source, &[])), vec!["1atp_E", "3lck_A"]);

        let selector = StateSelector::Kinase(KinaseConformation::parse("all", "in", "yes").unwrap());
        assert_eq!(targets(&select_templates(&all, &selector, &mut source, &[])), vec!["1atp_E", "1iep_A"]);
    }

    #[test]
    fn test_template_list_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template_pdbs.txt");
        let pdbs = vec!["3sn6_R".to_string(), "4ldo_A".to_string()];

        write_template_list(&path, &pdbs).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "3sn6_R,4ldo_A,");
        assert_eq!(read_template_list(&path).unwrap(), pdbs);

        write_template_list(&path, &[]).unwrap();
        assert!(read_template_list(&path).unwrap().is_empty());
    }
}
