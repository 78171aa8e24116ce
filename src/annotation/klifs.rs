// klifs.rs - KLIFS kinase structure and conformation client

use std::sync::Arc;
use serde_json::Value;
use crate::annotation::traits::KinaseAnnotation;
use crate::remote::http::{parse_json, HttpTransport};

pub const DEFAULT_KLIFS_URL: &str = "https://klifs.net/api_v2";

pub struct KlifsClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl KlifsClient {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// First KLIFS entry of the list, or `None` for the `[400, "..."]` error shape
    fn fetch_first(&self, url: &str) -> Result<Option<Value>, String> {
        let response = self.transport.get(url)?;
        if response.status == 400 || response.status == 404 {
            return Ok(None);
        }
        let body = response.into_success(url)?;
        let value: Value = parse_json(&body, url)?;
        match value.as_array().and_then(|entries| entries.first()) {
            Some(first) if first.is_object() => Ok(Some(first.clone())),
            _ => Ok(None),
        }
    }

    /// Resolve the PDB code to a KLIFS structure and fetch its conformation
    pub fn lookup(&self, pdb_id: &str) -> Result<Option<KinaseAnnotation>, String> {
        let list_url = format!("{}/structures_pdb_list?pdb-codes={}", self.base_url, pdb_id.to_uppercase());
        let structure = match self.fetch_first(&list_url)? {
            Some(structure) => structure,
            None => return Ok(None),
        };
        let structure_id = structure
            .get("structure_ID")
            .and_then(Value::as_i64)
            .ok_or_else(|| format!("KLIFS entry for {} has no structure_ID", pdb_id))?;

        let conf_url = format!("{}/structure_conformation?structure_ID={}", self.base_url, structure_id);
        let conformation = match self.fetch_first(&conf_url)? {
            Some(conformation) => conformation,
            None => return Ok(None),
        };

        let text = |key: &str| -> String {
            conformation.get(key).and_then(Value::as_str).unwrap_or("").to_string()
        };
        let salt_bridge_distance = number(conformation.get("salt_bridge_17_24"))
            .ok_or_else(|| format!("KLIFS conformation for {} has no salt_bridge_17_24", pdb_id))?;

        Ok(Some(KinaseAnnotation {
            structure_id,
            dfg: text("DFG"),
            ac_helix: text("ac_helix"),
            salt_bridge_distance,
        }))
    }
}

/// KLIFS reports distances either as numbers or as numeric strings
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
