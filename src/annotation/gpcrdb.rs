// gpcrdb.rs - GPCRdb structure service client

use std::sync::Arc;
use serde_json::Value;
use crate::annotation::traits::GpcrAnnotation;
use crate::remote::http::{parse_json, HttpTransport};

pub const DEFAULT_GPCRDB_URL: &str = "http://gpcrdb.org/services/structure";

pub struct GpcrdbClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl GpcrdbClient {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GPCRdb only answers for uppercase codes; anything but a JSON object means "not a GPCR entry"
    pub fn lookup(&self, pdb_id: &str) -> Result<Option<GpcrAnnotation>, String> {
        let url = format!("{}/{}", self.base_url, pdb_id.to_uppercase());
        let response = self.transport.get(&url)?;
        if response.status == 404 {
            return Ok(None);
        }
        let body = response.into_success(&url)?;
        let value: Value = parse_json(&body, &url)?;
        Ok(Self::from_value(&value))
    }

    fn from_value(value: &Value) -> Option<GpcrAnnotation> {
        let record = value.as_object()?;
        let state = record.get("state").and_then(Value::as_str).map(str::to_string);
        let signalling_protein = record
            .get("signalling_protein")
            .and_then(|sp| sp.get("type"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(GpcrAnnotation { state, signalling_protein })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::http::mock::MockTransport;

    #[test]
    fn test_lookup_record() {
        let transport = Arc::new(MockTransport::new());
        transport.json(
            "http://gpcrdb.test/3SN6",
            r#"{"pdb_code":"3SN6","state":"Active","signalling_protein":{"type":"G protein","data":{}}}"#,
        );
        let client = GpcrdbClient::new(transport, "http://gpcrdb.test/");

        let annotation = client.lookup("3sn6").unwrap().unwrap();
        assert_eq!(annotation.state.as_deref(), Some("Active"));
        assert_eq!(annotation.signalling_protein.as_deref(), Some("G protein"));
    }

    #[test]
    fn test_lookup_non_gpcr() {
        let transport = Arc::new(MockTransport::new());
        transport
            .json("http://gpcrdb.test/1ATP", "[]")
            .respond("http://gpcrdb.test/9XYZ", 404, b"{}".to_vec());
        let client = GpcrdbClient::new(transport, "http://gpcrdb.test");

        assert_eq!(client.lookup("1ATP").unwrap(), None);
        assert_eq!(client.lookup("9xyz").unwrap(), None);
    }

    #[test]
    fn test_null_signalling_protein() {
        let transport = Arc::new(MockTransport::new());
        transport.json("http://gpcrdb.test/2RH1", r#"{"state":"Inactive","signalling_protein":null}"#);
        let client = GpcrdbClient::new(transport, "http://gpcrdb.test");

        let annotation = client.lookup("2RH1").unwrap().unwrap();
        assert_eq!(annotation.state.as_deref(), Some("Inactive"));
        assert_eq!(annotation.signalling_protein, None);
    }
}
