// sequence.rs - Query sequence cleaning and job naming

use std::path::Path;
use bio::io::fasta;
use regex::Regex;
use sha1::{Digest, Sha1};

/// Letters that are valid in the alphabet but not canonical amino acids
const NONCANONICAL: &str = "BJOUXZ";

/// Cleaned query sequence together with the job it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySequence {
    pub job: String,
    pub sequence: String,
}

impl QuerySequence {
    /// Build a query from a user-supplied job label and raw sequence text
    pub fn new(job: &str, raw: &str) -> Result<Self, String> {
        let sequence = clean_sequence(raw)?;
        if sequence.is_empty() {
            return Err("Query sequence is empty after cleaning".to_string());
        }
        let job = define_job_name(job, &sequence)?;
        Ok(Self { job, sequence })
    }

    /// Read the first record of a FASTA file; the record id is used when no job label is given
    pub fn from_fasta(path: &Path, job: Option<&str>) -> Result<Self, String> {
        let reader = fasta::Reader::from_file(path)
            .map_err(|e| format!("Failed to open FASTA file '{}': {}", path.display(), e))?;

        let record = reader
            .records()
            .next()
            .ok_or_else(|| format!("No records found in FASTA file '{}'", path.display()))?
            .map_err(|e| format!("Failed to read FASTA record from '{}': {}", path.display(), e))?;

        let raw = String::from_utf8_lossy(record.seq()).into_owned();
        let label = job.unwrap_or_else(|| record.id());
        Self::new(label, &raw)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Uppercase, drop non-canonical residues, whitespace and anything outside A-Z
pub fn clean_sequence(raw: &str) -> Result<String, String> {
    let mut seq = raw.to_uppercase();

    if seq.chars().any(|c| NONCANONICAL.contains(c)) {
        eprintln!("⚠️  Sequence contains non-canonical amino acids!");
        eprintln!("⚠️  Removing B, J, O, U, X, and Z from sequence");
        let noncanonical = Regex::new(r"[BJOUXZ]").map_err(|e| format!("Invalid regex: {}", e))?;
        seq = noncanonical.replace_all(&seq, "").into_owned();
    }

    let joined: String = seq.split_whitespace().collect();
    let outside = Regex::new(r"[^A-Z]").map_err(|e| format!("Invalid regex: {}", e))?;
    Ok(outside.replace_all(&joined, "").into_owned())
}

/// Job label stripped of non-word characters plus the first 5 hex digits of SHA-1(sequence)
pub fn define_job_name(job: &str, sequence: &str) -> Result<String, String> {
    let joined: String = job.split_whitespace().collect();
    let non_word = Regex::new(r"\W+").map_err(|e| format!("Invalid regex: {}", e))?;
    let label = non_word.replace_all(&joined, "");

    let mut hasher = Sha1::new();
    hasher.update(sequence.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    Ok(format!("{}_{}", label, &digest[..5]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_clean_sequence() {
        assert_eq!(clean_sequence("mkt ayi\nakqr").unwrap(), "MKTAYIAKQR");
        assert_eq!(clean_sequence("MKXTBZ").unwrap(), "MKT");
        assert_eq!(clean_sequence("M-K*1T").unwrap(), "MKT");
    }

    #[test]
    fn test_define_job_name() {
        let name = define_job_name("my job!", "MKT").unwrap();
        assert!(name.starts_with("myjob_"));
        assert_eq!(name.len(), "myjob_".len() + 5);

        let same = define_job_name("my job!", "MKT").unwrap();
        let other = define_job_name("my job!", "MKA").unwrap();
        assert_eq!(name, same);
        assert_ne!(name, other);
    }

    #[test]
    fn test_empty_sequence_rejected() {
        assert!(QuerySequence::new("job", "123 ---").is_err());
    }

    #[test]
    fn test_from_fasta() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ">ADRB2 beta-2 adrenergic receptor").unwrap();
        writeln!(file, "MGQPGNGSAF").unwrap();
        writeln!(file, "LLAPNRSHAP").unwrap();
        file.flush().unwrap();

        let query = QuerySequence::from_fasta(file.path(), None).unwrap();
        assert_eq!(query.sequence, "MGQPGNGSAFLLAPNRSHAP");
        assert!(query.job.starts_with("ADRB2_"));

        let labelled = QuerySequence::from_fasta(file.path(), Some("b2ar")).unwrap();
        assert!(labelled.job.starts_with("b2ar_"));
        assert_eq!(labelled.len(), 20);
    }
}
