// main.rs - CLI entry point

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use af2state::cli::Config;
use af2state::prelude::*;
use af2state::remote::DownloadedTemplates;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    let validation = validate_args(&args)?;

    let query = match (&args.fasta, &args.sequence) {
        (Some(fasta), _) => QuerySequence::from_fasta(Path::new(fasta), args.job.as_deref())?,
        (None, Some(sequence)) => QuerySequence::new(args.job.as_deref().unwrap_or("job"), sequence)?,
        (None, None) => return Err("Either --sequence or --fasta is required".to_string()),
    };

    println!("🚀 af2state v{}", env!("CARGO_PKG_VERSION"));
    println!("🧬 Query: {} ({} residues)", query.job, query.len());
    println!("🎯 Templates: {}", validation.selector.describe());
    if !validation.exclusions.is_empty() {
        println!("🚫 Excluded PDB codes: {}", validation.exclusions.join(", "));
    }
    println!(
        "🧠 Model: {} | recycles {} | structure module x{}",
        validation.prediction.model_name(),
        validation.prediction.num_recycles,
        validation.prediction.structure_module_repeats
    );

    let workspace = JobWorkspace::new(&validation.output_dir, &query.job, "env");

    if args.dry_run {
        println!("📁 Job directory: {}", workspace.root.display());
        if !validation.mutations.is_empty() {
            let listed: Vec<String> = validation.mutations.iter().map(|m| m.to_string()).collect();
            println!("🧪 MSA mutations: {}", listed.join(", "));
        }
        println!("✅ Dry run completed successfully");
        return Ok(());
    }

    let total_start = Instant::now();

    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(Duration::from_secs(args.timeout))?);

    let remote = RemoteAnnotations::new(transport.clone(), &validation.gpcrdb_url, &validation.klifs_url);
    let annotations: Box<dyn AnnotationSource> = match &args.annotation_cache {
        Some(cache_path) => Box::new(CachedAnnotations::open(
            Box::new(remote),
            Path::new(cache_path),
            args.cache_note.clone(),
            args.refresh_annotations,
        )?),
        None => Box::new(remote),
    };

    let mut runner = Runner::new(
        query,
        workspace,
        MmseqsClient::new(transport.clone(), &validation.host_url, validation.poll.clone()),
        TemplateFetcher::new(transport, &validation.template_url),
        annotations,
        validation.exclusions.clone(),
        args.n_templates,
        args.shuffle_templates,
    )
    .with_command_line(&command_line);

    let (msa_text, templates) = if args.shuffle_only {
        println!("🔀 Reshuffling templates recorded in {}", runner.workspace.template_list().display());
        let templates = runner.shuffle_templates()?;
        (runner.load_msa()?, templates)
    } else {
        let output = runner.run_job(&validation.selector)?;
        (output.msa, output.templates)
    };

    // MSA perturbation
    let mut msa = Msa::parse(&msa_text)?;
    println!("📊 MSA depth: {} sequences", msa.depth());
    if let Some(max_seqs) = args.msa_max_seqs {
        msa = msa.subsample(max_seqs, args.msa_seed)?;
        println!("✂️  Subsampled MSA to {} sequences (seed {})", msa.depth(), args.msa_seed);
    }
    msa.apply_mutations(&validation.mutations)?;

    let msa_path = runner.workspace.msa_output();
    write_msa(&msa_path, &msa.to_a3m())?;

    let (template_dir, template_ids) = match templates {
        Some(DownloadedTemplates { dir, pdbs }) => (Some(dir), pdbs),
        None => (None, Vec::new()),
    };

    // The manifest carries the query as it appears in the (possibly mutated) MSA
    let sequence = msa.query_residues().unwrap_or_else(|| runner.query.sequence.clone());
    let request = PredictionRequest::new(
        &runner.query.job,
        &sequence,
        &msa_path,
        msa.depth(),
        template_dir,
        template_ids,
        validation.mutations.clone(),
        validation.prediction.clone(),
    )?;
    let manifest = runner.workspace.request_manifest();
    request.write(&manifest)?;

    let predictor: Box<dyn Predictor> = match &args.predictor_cmd {
        Some(command) => Box::new(CommandPredictor::from_command_line(command)?),
        None => Box::new(ManifestOnly),
    };
    println!("🔮 Predictor: {}", predictor.name());
    predictor.predict(&request, &manifest)?;

    println!("\n✅ Finished in {:.1}s", total_start.elapsed().as_secs_f64());
    Ok(())
}
