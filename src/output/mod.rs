// mod.rs - Output writers for selection reports and alignments

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use crate::core::selection::SelectedTemplate;

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &Path) -> Result<(), String> {
    if let Some(parent) = file_path.parent() {
        create_dir_all(parent)
            .map_err(|e| format!("Failed to create parent directory '{}': {}", parent.display(), e))?;
    }
    Ok(())
}

/// Write the accepted templates as TSV with a commented provenance header
pub fn write_selection_report(
    file_path: &Path,
    selected: &[SelectedTemplate],
    selector: &str,
    command_line: &str,
) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create report '{}': {}", file_path.display(), e))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# Command: {}", command_line).map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# Generated: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))
        .map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# Selection: {}", selector).map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# af2state v{}", env!("CARGO_PKG_VERSION")).map_err(|e| format!("Write error: {}", e))?;

    let mut tsv = csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer);
    tsv.write_record(["pdb", "target", "identity", "evalue", "bitscore", "annotation"])
        .map_err(|e| format!("Write error: {}", e))?;
    for template in selected {
        tsv.write_record([
            template.hit.pdb_id(),
            template.hit.target.clone(),
            format!("{:.3}", template.hit.identity),
            format!("{:e}", template.hit.evalue),
            format!("{}", template.hit.bitscore),
            template.annotation.clone(),
        ])
        .map_err(|e| format!("Write error: {}", e))?;
    }
    tsv.flush().map_err(|e| format!("Flush error: {}", e))?;

    println!("✅ Template selection written to: {}", file_path.display());
    Ok(())
}

/// Write the final A3M handed to the predictor
pub fn write_msa(file_path: &Path, a3m: &str) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    std::fs::write(file_path, a3m)
        .map_err(|e| format!("Failed to write alignment '{}': {}", file_path.display(), e))?;
    println!("✅ Alignment written to: {}", file_path.display());
    Ok(())
}
