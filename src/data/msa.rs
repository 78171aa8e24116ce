// msa.rs - A3M alignment handling: concatenation, subsampling and in-silico mutagenesis

use std::fmt;
use std::path::Path;
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One A3M entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsaRecord {
    pub header: String,
    pub sequence: String,
}

impl MsaRecord {
    /// Number of match-state columns (uppercase residues and gaps)
    pub fn match_columns(&self) -> usize {
        self.sequence.chars().filter(|c| is_match_state(*c)).count()
    }
}

/// Match states in A3M are uppercase letters and '-'; lowercase letters and '.' are insertions
fn is_match_state(c: char) -> bool {
    c.is_ascii_uppercase() || c == '-'
}

/// Multiple sequence alignment in A3M form; record 0 is the query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Msa {
    pub records: Vec<MsaRecord>,
}

impl Msa {
    /// Concatenate A3M files from `dir` in order, stripping the NUL separators the server emits
    pub fn concat_a3m(dir: &Path, files: &[&str]) -> Result<String, String> {
        let mut a3m = String::new();
        for name in files {
            let path = dir.join(name);
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read alignment '{}': {}", path.display(), e))?;
            a3m.push_str(&content.replace('\0', ""));
        }
        Ok(a3m)
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let mut records: Vec<MsaRecord> = Vec::new();

        for (line_num, line) in text.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(header) = line.strip_prefix('>') {
                records.push(MsaRecord {
                    header: header.to_string(),
                    sequence: String::new(),
                });
            } else {
                let record = records
                    .last_mut()
                    .ok_or_else(|| format!("Line {}: sequence data before first header", line_num + 1))?;
                record.sequence.push_str(line);
            }
        }

        if records.is_empty() {
            return Err("Alignment contains no records".to_string());
        }
        Ok(Self { records })
    }

    pub fn to_a3m(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push('>');
            out.push_str(&record.header);
            out.push('\n');
            out.push_str(&record.sequence);
            out.push('\n');
        }
        out
    }

    pub fn depth(&self) -> usize {
        self.records.len()
    }

    pub fn query(&self) -> Option<&MsaRecord> {
        self.records.first()
    }

    /// Ungapped query residues; after `apply_mutations` this is the mutated query
    pub fn query_residues(&self) -> Option<String> {
        self.query()
            .map(|q| q.sequence.chars().filter(|c| c.is_ascii_uppercase()).collect())
    }

    /// Keep the query plus a seeded random subset of the remaining records, in original order
    pub fn subsample(&self, max_seqs: usize, seed: u64) -> Result<Self, String> {
        if max_seqs == 0 {
            return Err("MSA subsample size must be at least 1".to_string());
        }
        if self.records.len() <= max_seqs {
            return Ok(self.clone());
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let others = self.records.len() - 1;
        let mut picked = rand::seq::index::sample(&mut rng, others, max_seqs - 1).into_vec();
        picked.sort_unstable();

        let mut records = Vec::with_capacity(max_seqs);
        records.push(self.records[0].clone());
        records.extend(picked.into_iter().map(|i| self.records[i + 1].clone()));
        Ok(Self { records })
    }

    /// Substitute residues at query positions in every aligned sequence, the query row
    /// (record 0) included, so the alignment stays consistent with the mutated query
    pub fn apply_mutations(&mut self, mutations: &[MsaMutation]) -> Result<(), String> {
        if mutations.is_empty() {
            return Ok(());
        }

        let query = self.query().ok_or("Cannot mutate an empty alignment")?;
        let query_len = query.match_columns();
        let query_residues: Vec<char> = query.sequence.chars().filter(|c| is_match_state(*c)).collect();

        for mutation in mutations {
            if mutation.position == 0 || mutation.position > query_len {
                return Err(format!(
                    "Mutation {} is outside the query (length {})",
                    mutation, query_len
                ));
            }
            if let Some(wt) = mutation.wild_type {
                let found = query_residues[mutation.position - 1];
                if found != wt {
                    return Err(format!(
                        "Mutation {} expects {} at position {}, query has {}",
                        mutation, wt, mutation.position, found
                    ));
                }
            }
        }

        for record in &mut self.records {
            let mut column = 0;
            let mutated: String = record
                .sequence
                .chars()
                .map(|c| {
                    if !is_match_state(c) {
                        return c;
                    }
                    column += 1;
                    if c == '-' {
                        return c;
                    }
                    mutations
                        .iter()
                        .rev()
                        .find(|m| m.position == column)
                        .map(|m| m.residue)
                        .unwrap_or(c)
                })
                .collect();
            record.sequence = mutated;
        }

        println!("🧪 Applied {} MSA mutation(s) across {} sequences", mutations.len(), self.depth());
        Ok(())
    }
}

/// Column substitution applied to the whole alignment, e.g. `A123W` or `123W`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsaMutation {
    pub wild_type: Option<char>,
    /// 1-based position in the query
    pub position: usize,
    pub residue: char,
}

impl MsaMutation {
    pub fn parse(s: &str) -> Result<Self, String> {
        let pattern = Regex::new(r"^([A-Z])?([0-9]+)([A-Z])$").map_err(|e| format!("Invalid regex: {}", e))?;
        let cleaned = s.trim().to_uppercase();
        let caps = pattern
            .captures(&cleaned)
            .ok_or_else(|| format!("Invalid mutation '{}'. Expected e.g. A123W or 123W", s))?;

        let wild_type = caps.get(1).and_then(|m| m.as_str().chars().next());
        let position = caps[2]
            .parse::<usize>()
            .map_err(|e| format!("Invalid mutation position in '{}': {}", s, e))?;
        let residue = caps[3]
            .chars()
            .next()
            .ok_or_else(|| format!("Missing target residue in '{}'", s))?;

        if position == 0 {
            return Err(format!("Mutation positions are 1-based: '{}'", s));
        }
        Ok(Self { wild_type, position, residue })
    }
}

impl fmt::Display for MsaMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wild_type {
            Some(wt) => write!(f, "{}{}{}", wt, self.position, self.residue),
            None => write!(f, "{}{}", self.position, self.residue),
        }
    }
}
