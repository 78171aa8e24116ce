// services.rs - Live annotation source backed by GPCRdb and KLIFS

use std::sync::Arc;
use crate::annotation::gpcrdb::GpcrdbClient;
use crate::annotation::klifs::KlifsClient;
use crate::annotation::traits::{AnnotationSource, GpcrAnnotation, KinaseAnnotation};
use crate::remote::http::HttpTransport;

pub struct RemoteAnnotations {
    gpcrdb: GpcrdbClient,
    klifs: KlifsClient,
}

impl RemoteAnnotations {
    pub fn new(transport: Arc<dyn HttpTransport>, gpcrdb_url: &str, klifs_url: &str) -> Self {
        Self {
            gpcrdb: GpcrdbClient::new(transport.clone(), gpcrdb_url),
            klifs: KlifsClient::new(transport, klifs_url),
        }
    }
}

impl AnnotationSource for RemoteAnnotations {
    fn name(&self) -> &'static str {
        "GPCRdb/KLIFS"
    }

    fn lookup_gpcr(&mut self, pdb_id: &str) -> Result<Option<GpcrAnnotation>, String> {
        self.gpcrdb.lookup(pdb_id)
    }

    fn lookup_kinase(&mut self, pdb_id: &str) -> Result<Option<KinaseAnnotation>, String> {
        self.klifs.lookup(pdb_id)
    }
}
