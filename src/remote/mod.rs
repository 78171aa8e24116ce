// mod.rs - Remote services module

pub mod http;
pub mod mmseqs;
pub mod templates;

// Re-export main types for convenience
pub use http::{parse_json, HttpResponse, HttpTransport, ReqwestTransport};
pub use mmseqs::{extract_archive, MmseqsClient, PollSettings, Ticket, TicketStatus};
pub use templates::{DownloadedTemplates, TemplateFetcher};
