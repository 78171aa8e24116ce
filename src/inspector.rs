// inspector.rs - Annotation cache inspector
// Features: metadata overview, state histograms, per-entry lookup, integrity checks, TSV export

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use argh::FromArgs;
use af2state::annotation::cache::{AnnotationCache, CACHE_FORMAT_VERSION};
use af2state::annotation::{GpcrAnnotation, KinaseAnnotation};

// ============================================================================
// CLI ARGUMENTS
// ============================================================================

#[derive(FromArgs)]
/// Inspect af2state annotation cache files
struct Args {
    /// path to the annotation cache file (.lz4)
    #[argh(option)]
    cache: String,

    /// show cached GPCRdb and KLIFS entries for one PDB code
    #[argh(option)]
    show: Option<String>,

    /// export one row per cached entry to a TSV file
    #[argh(option)]
    export_summary: Option<String>,

    /// validate cache integrity
    #[argh(switch)]
    validate: bool,

    /// quiet mode - minimal output
    #[argh(switch)]
    quiet: bool,
}

// ============================================================================
// CACHE LOADING
// ============================================================================

fn load_cache(cache_path: &Path, quiet: bool) -> Result<AnnotationCache, String> {
    if !cache_path.exists() {
        return Err(format!("Cache file does not exist: {}", cache_path.display()));
    }

    if !quiet {
        println!("Loading cache: {}", cache_path.display());
    }

    let cache = AnnotationCache::load(cache_path)?;

    if !quiet {
        println!("✅ Cache loaded successfully");
    }
    Ok(cache)
}

// ============================================================================
// ANALYSIS FUNCTIONS
// ============================================================================

fn gpcr_label(annotation: &Option<GpcrAnnotation>) -> String {
    match annotation {
        Some(a) => format!(
            "state={} signalling_protein={}",
            a.state.as_deref().unwrap_or("-"),
            a.signalling_protein.as_deref().unwrap_or("-")
        ),
        None => "not in GPCRdb".to_string(),
    }
}

fn kinase_label(annotation: &Option<KinaseAnnotation>) -> String {
    match annotation {
        Some(a) => format!(
            "structure_ID={} DFG={} aC_helix={} salt_bridge_17_24={:.2} ({})",
            a.structure_id,
            a.dfg,
            a.ac_helix,
            a.salt_bridge_distance,
            if a.salt_bridge_formed() { "formed" } else { "broken" }
        ),
        None => "not in KLIFS".to_string(),
    }
}

fn analyze_cache_overview(cache: &AnnotationCache) {
    let meta = &cache.metadata;
    println!("\n=== CACHE SUMMARY ===");
    println!("Written by: af2state v{}", meta.version);
    println!("Format version: {}", meta.format_version);
    println!("Created: {}", meta.created);
    println!("Last modified: {}", meta.last_modified);
    if let Some(note) = &meta.user_note {
        println!("Note: {}", note);
    }
    println!("GPCR entries: {}", cache.gpcr.len());
    println!("Kinase entries: {}", cache.kinase.len());
}

fn analyze_gpcr_states(cache: &AnnotationCache) {
    if cache.gpcr.is_empty() {
        return;
    }

    let mut states: BTreeMap<String, usize> = BTreeMap::new();
    let mut signalling: BTreeMap<String, usize> = BTreeMap::new();
    let mut misses = 0;
    for annotation in cache.gpcr.values() {
        match annotation {
            Some(a) => {
                let state = a.state.clone().unwrap_or_else(|| "unknown".to_string());
                *states.entry(state).or_insert(0) += 1;
                if let Some(protein) = &a.signalling_protein {
                    *signalling.entry(protein.clone()).or_insert(0) += 1;
                }
            }
            None => misses += 1,
        }
    }

    println!("\n=== GPCR STATES ===");
    println!("{:<25} {:>8}", "State", "Entries");
    println!("{}", "=".repeat(34));
    for (state, count) in &states {
        println!("{:<25} {:>8}", state, count);
    }
    if !signalling.is_empty() {
        println!("\nSignalling proteins:");
        for (protein, count) in &signalling {
            println!("  {:<23} {:>8}", protein, count);
        }
    }
    println!("Not found in GPCRdb: {}", misses);
}

fn analyze_kinase_conformations(cache: &AnnotationCache) {
    if cache.kinase.is_empty() {
        return;
    }

    let mut dfg: BTreeMap<String, usize> = BTreeMap::new();
    let mut ac_helix: BTreeMap<String, usize> = BTreeMap::new();
    let mut formed = 0;
    let mut misses = 0;
    for annotation in cache.kinase.values() {
        match annotation {
            Some(a) => {
                *dfg.entry(a.dfg.clone()).or_insert(0) += 1;
                *ac_helix.entry(a.ac_helix.clone()).or_insert(0) += 1;
                if a.salt_bridge_formed() {
                    formed += 1;
                }
            }
            None => misses += 1,
        }
    }

    println!("\n=== KINASE CONFORMATIONS ===");
    println!("{:<10} {:>8}", "DFG", "Entries");
    println!("{}", "=".repeat(19));
    for (value, count) in &dfg {
        println!("{:<10} {:>8}", value, count);
    }
    println!("\n{:<10} {:>8}", "aC-helix", "Entries");
    println!("{}", "=".repeat(19));
    for (value, count) in &ac_helix {
        println!("{:<10} {:>8}", value, count);
    }
    println!("\nSalt bridge formed: {}", formed);
    println!("Not found in KLIFS: {}", misses);
}

fn show_entry(cache: &AnnotationCache, pdb: &str) {
    let key = pdb.to_uppercase();
    println!("\n=== ENTRY {} ===", key);

    let mut found = false;
    if let Some(annotation) = cache.gpcr.get(&key) {
        println!("GPCRdb: {}", gpcr_label(annotation));
        found = true;
    }
    if let Some(annotation) = cache.kinase.get(&key) {
        println!("KLIFS:  {}", kinase_label(annotation));
        found = true;
    }
    if !found {
        println!("⚠️  {} has never been looked up", key);
    }
}

fn validate_cache_integrity(cache: &AnnotationCache) -> bool {
    println!("\n=== CACHE VALIDATION ===");

    let mut errors = 0;
    let mut warnings = 0;

    if cache.metadata.format_version != CACHE_FORMAT_VERSION {
        println!(
            "❌ ERROR: Format version {} does not match expected {}",
            cache.metadata.format_version, CACHE_FORMAT_VERSION
        );
        errors += 1;
    }

    if cache.metadata.gpcr_entries != cache.gpcr.len()
        || cache.metadata.kinase_entries != cache.kinase.len()
    {
        println!(
            "⚠️  WARNING: Metadata counts ({} GPCR, {} kinase) differ from stored entries ({}, {})",
            cache.metadata.gpcr_entries,
            cache.metadata.kinase_entries,
            cache.gpcr.len(),
            cache.kinase.len()
        );
        warnings += 1;
    }

    // Keys are always stored uppercase
    let bad_keys: Vec<&String> = cache
        .gpcr
        .keys()
        .chain(cache.kinase.keys())
        .filter(|k| k.len() != 4 || k.chars().any(|c| c.is_ascii_lowercase()))
        .collect();
    for key in bad_keys.iter().take(5) {
        println!("❌ ERROR: Malformed PDB key '{}'", key);
    }
    if !bad_keys.is_empty() {
        errors += 1;
    }

    let negative = cache
        .kinase
        .values()
        .flatten()
        .filter(|a| a.salt_bridge_distance < 0.0)
        .count();
    if negative > 0 {
        println!("⚠️  WARNING: {} kinase entries with a negative salt bridge distance", negative);
        warnings += 1;
    }

    // Summary
    if errors == 0 && warnings == 0 {
        println!("✅ Cache validation passed - no issues found");
        true
    } else {
        println!("⚠️  Cache validation completed: {} errors, {} warnings", errors, warnings);
        if errors > 0 {
            println!("❌ Cache has integrity issues that should be addressed");
            false
        } else {
            println!("✅ Cache is valid but has minor warnings");
            true
        }
    }
}

fn export_summary_to_tsv(cache: &AnnotationCache, output_path: &str) -> Result<(), String> {
    let write_err = |e: std::io::Error| format!("Failed to write '{}': {}", output_path, e);
    let mut file = File::create(output_path)
        .map_err(|e| format!("Failed to create '{}': {}", output_path, e))?;

    writeln!(file, "# af2state annotation cache summary").map_err(write_err)?;
    writeln!(file, "# Version: {}", cache.metadata.version).map_err(write_err)?;
    writeln!(file, "# Created: {}", cache.metadata.created).map_err(write_err)?;
    writeln!(file, "pdb\tsource\tfound\tstate\tsignalling_protein\tdfg\tac_helix\tsalt_bridge_17_24")
        .map_err(write_err)?;

    for (pdb, annotation) in &cache.gpcr {
        let row = match annotation {
            Some(a) => format!(
                "{}\tgpcrdb\tyes\t{}\t{}\t\t\t",
                pdb,
                a.state.as_deref().unwrap_or(""),
                a.signalling_protein.as_deref().unwrap_or("")
            ),
            None => format!("{}\tgpcrdb\tno\t\t\t\t\t", pdb),
        };
        writeln!(file, "{}", row).map_err(write_err)?;
    }
    for (pdb, annotation) in &cache.kinase {
        let row = match annotation {
            Some(a) => format!(
                "{}\tklifs\tyes\t\t\t{}\t{}\t{:.3}",
                pdb, a.dfg, a.ac_helix, a.salt_bridge_distance
            ),
            None => format!("{}\tklifs\tno\t\t\t\t\t", pdb),
        };
        writeln!(file, "{}", row).map_err(write_err)?;
    }

    println!("✅ Summary exported to: {}", output_path);
    Ok(())
}

// ============================================================================
// MAIN FUNCTION
// ============================================================================

fn main() {
    let args: Args = argh::from_env();

    if !args.quiet {
        println!("🔍 af2state Annotation Cache Inspector");
        println!("======================================");
    }

    let cache = match load_cache(Path::new(&args.cache), args.quiet) {
        Ok(cache) => cache,
        Err(e) => {
            eprintln!("❌ ERROR loading cache: {}", e);
            std::process::exit(1);
        }
    };

    if !args.quiet {
        analyze_cache_overview(&cache);
        analyze_gpcr_states(&cache);
        analyze_kinase_conformations(&cache);
    }

    if let Some(pdb) = &args.show {
        show_entry(&cache, pdb);
    }

    if args.validate && !validate_cache_integrity(&cache) {
        std::process::exit(1);
    }

    if let Some(export_path) = &args.export_summary {
        if let Err(e) = export_summary_to_tsv(&cache, export_path) {
            eprintln!("❌ ERROR exporting summary: {}", e);
            std::process::exit(1);
        }
    }

    if !args.quiet {
        println!("\n✅ Cache inspection completed successfully");
        println!("\nUsage examples:");
        println!("  --show 7F1R                          Show cached annotations for one PDB code");
        println!("  --validate                           Validate cache integrity");
        println!("  --export-summary out.tsv             Export entries to TSV");
        println!("  --quiet                              Minimal output mode");
    }
}
