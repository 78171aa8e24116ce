// hits.rs - Loader for pdb70.m8 template hit tables

use std::path::Path;
use csv::StringRecord;

/// Number of columns in a BLAST-tabular (m8) row
const M8_COLUMNS: usize = 12;

/// One template hit from the MMseqs2 pdb70 search
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateHit {
    pub query: String,
    /// `<pdb>_<chain>` as returned by the server
    pub target: String,
    pub identity: f64,
    pub alignment_length: usize,
    pub mismatches: usize,
    pub gap_opens: usize,
    pub query_start: usize,
    pub query_end: usize,
    pub target_start: usize,
    pub target_end: usize,
    pub evalue: f64,
    pub bitscore: f64,
}

impl TemplateHit {
    /// Uppercase PDB code without the chain suffix
    pub fn pdb_id(&self) -> String {
        self.target
            .split('_')
            .next()
            .unwrap_or(&self.target)
            .to_uppercase()
    }

    fn from_record(record: &StringRecord, line: u64) -> Result<Self, String> {
        if record.len() < M8_COLUMNS {
            return Err(format!(
                "Line {}: expected {} columns in m8 row, found {}",
                line,
                M8_COLUMNS,
                record.len()
            ));
        }

        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let float = |idx: usize, name: &str| -> Result<f64, String> {
            field(idx)
                .parse::<f64>()
                .map_err(|_| format!("Line {}: invalid {} '{}'", line, name, field(idx)))
        };
        let int = |idx: usize, name: &str| -> Result<usize, String> {
            field(idx)
                .parse::<usize>()
                .map_err(|_| format!("Line {}: invalid {} '{}'", line, name, field(idx)))
        };

        Ok(Self {
            query: field(0).to_string(),
            target: field(1).to_string(),
            identity: float(2, "identity")?,
            alignment_length: int(3, "alignment length")?,
            mismatches: int(4, "mismatches")?,
            gap_opens: int(5, "gap opens")?,
            query_start: int(6, "query start")?,
            query_end: int(7, "query end")?,
            target_start: int(8, "target start")?,
            target_end: int(9, "target end")?,
            evalue: float(10, "evalue")?,
            bitscore: float(11, "bitscore")?,
        })
    }
}

/// Parse m8 text into hits, preserving file order. Columns are split on any run of
/// whitespace, so both tab- and space-separated tables are accepted.
pub fn parse_hits(content: &str) -> Result<Vec<TemplateHit>, String> {
    let mut hits = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let record = StringRecord::from(fields);
        hits.push(TemplateHit::from_record(&record, idx as u64 + 1)?);
    }
    Ok(hits)
}

/// Load hits from a pdb70.m8 file
pub fn read_hits(path: &Path) -> Result<Vec<TemplateHit>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hit table '{}': {}", path.display(), e))?;
    parse_hits(&content)
}
