// validation.rs - Input validation utilities

use std::path::PathBuf;
use std::time::Duration;
use regex::Regex;
use crate::annotation::gpcrdb::DEFAULT_GPCRDB_URL;
use crate::annotation::klifs::DEFAULT_KLIFS_URL;
use crate::annotation::StateSelector;
use crate::cli::args::Args;
use crate::core::PredictionParams;
use crate::data::MsaMutation;
use crate::remote::mmseqs::DEFAULT_HOST_URL;
use crate::remote::templates::DEFAULT_TEMPLATE_URL;
use crate::remote::PollSettings;

pub struct ValidationResult {
    pub selector: StateSelector,
    /// Uppercase PDB codes
    pub exclusions: Vec<String>,
    pub mutations: Vec<MsaMutation>,
    pub poll: PollSettings,
    pub prediction: PredictionParams,
    pub output_dir: PathBuf,
    pub host_url: String,
    pub template_url: String,
    pub gpcrdb_url: String,
    pub klifs_url: String,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    // Exactly one query source
    match (&args.sequence, &args.fasta) {
        (Some(_), Some(_)) => return Err("--sequence and --fasta are mutually exclusive".to_string()),
        (None, None) => return Err("Either --sequence or --fasta is required".to_string()),
        _ => {}
    }

    let selector = StateSelector::from_values(&args.state)?;
    if let StateSelector::Explicit(targets) = &selector {
        let template_id = Regex::new(r"^[0-9][A-Za-z0-9]{3}_[A-Za-z0-9]+$")
            .map_err(|e| format!("Invalid regex: {}", e))?;
        if let Some(bad) = targets.iter().find(|t| !template_id.is_match(t)) {
            return Err(format!(
                "Invalid --state value '{}'. Expected a GPCR state, three kinase values or <pdb>_<chain> ids",
                bad
            ));
        }
    }

    let pdb_code = Regex::new(r"^[0-9][A-Za-z0-9]{3}$").map_err(|e| format!("Invalid regex: {}", e))?;
    let mut exclusions = Vec::with_capacity(args.exclude.len());
    for code in &args.exclude {
        let code = code.trim();
        if !pdb_code.is_match(code) {
            return Err(format!("Invalid --exclude PDB code '{}'", code));
        }
        exclusions.push(code.to_uppercase());
    }
    if !exclusions.is_empty() && matches!(selector, StateSelector::Explicit(_)) {
        eprintln!("⚠️  --exclude only applies to GPCR state or kinase conformation selection");
    }

    if args.n_templates == 0 {
        return Err("--n-templates must be at least 1".to_string());
    }

    let mutations = args
        .mutate
        .iter()
        .map(|m| MsaMutation::parse(m))
        .collect::<Result<Vec<_>, String>>()?;

    if args.msa_max_seqs == Some(0) {
        return Err("--msa-max-seqs must be at least 1".to_string());
    }

    if args.timeout == 0 {
        return Err("--timeout must be greater than 0".to_string());
    }
    if args.max_polls == Some(0) {
        return Err("--max-polls must be at least 1".to_string());
    }
    let poll = PollSettings {
        base: Duration::from_secs(args.poll_interval),
        jitter: Duration::from_secs(args.poll_jitter),
        max_attempts: args.max_polls,
    };

    let prediction = PredictionParams {
        model_index: args.model,
        max_msa_clusters: args.max_msa_clusters,
        max_extra_msa: args.max_extra_msa,
        num_recycles: args.num_recycles,
        structure_module_repeats: args.structure_module_repeats,
        use_ptm: !args.no_ptm,
    };
    prediction.validate()?;

    let url = |value: &Option<String>, default: &str| -> Result<String, String> {
        let url = value.clone().unwrap_or_else(|| default.to_string());
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(url)
        } else {
            Err(format!("Invalid URL '{}': expected http:// or https://", url))
        }
    };

    Ok(ValidationResult {
        selector,
        exclusions,
        mutations,
        poll,
        prediction,
        output_dir: PathBuf::from(args.output_dir.clone().unwrap_or_else(|| ".".to_string())),
        host_url: url(&args.host_url, DEFAULT_HOST_URL)?,
        template_url: url(&args.template_url, DEFAULT_TEMPLATE_URL)?,
        gpcrdb_url: url(&args.gpcrdb_url, DEFAULT_GPCRDB_URL)?,
        klifs_url: url(&args.klifs_url, DEFAULT_KLIFS_URL)?,
    })
}
