// mmseqs.rs - MMseqs2 MSA server client: ticket submission, polling and result download

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use serde::Deserialize;
use crate::remote::http::HttpTransport;

pub const DEFAULT_HOST_URL: &str = "https://a3m.mmseqs.com";

/// Reported when the server marks a ticket as ERROR, at submission or while polling
pub const API_ERROR_MESSAGE: &str = "MMseqs2 API is giving errors. \
Please confirm your input is a valid protein sequence. \
If error persists, please try again in an hour.";

/// Ticket state reported by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketStatus {
    Unknown,
    RateLimit,
    Pending,
    Running,
    Complete,
    Error,
    Other(String),
}

impl TicketStatus {
    fn parse(status: &str) -> Self {
        match status {
            "UNKNOWN" => TicketStatus::Unknown,
            "RATELIMIT" => TicketStatus::RateLimit,
            "PENDING" => TicketStatus::Pending,
            "RUNNING" => TicketStatus::Running,
            "COMPLETE" => TicketStatus::Complete,
            "ERROR" => TicketStatus::Error,
            other => TicketStatus::Other(other.to_string()),
        }
    }

    /// The submission was not accepted and must be sent again
    fn needs_resubmit(&self) -> bool {
        matches!(self, TicketStatus::Unknown | TicketStatus::RateLimit)
    }

    /// The job exists but has not finished yet
    fn in_progress(&self) -> bool {
        matches!(self, TicketStatus::Unknown | TicketStatus::Running | TicketStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub status: TicketStatus,
    pub id: Option<String>,
}

impl Ticket {
    fn unknown() -> Self {
        Self { status: TicketStatus::Unknown, id: None }
    }
}

#[derive(Deserialize)]
struct TicketBody {
    status: String,
    id: Option<String>,
}

/// Delay between requests: `base` plus a random amount below `jitter`
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub base: Duration,
    pub jitter: Duration,
    /// Total submit/status requests allowed before giving up; `None` waits forever
    pub max_attempts: Option<usize>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(5),
            jitter: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

impl PollSettings {
    fn delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..jitter_ms)
        };
        self.base + Duration::from_millis(extra)
    }
}

pub struct MmseqsClient {
    transport: Arc<dyn HttpTransport>,
    host_url: String,
    poll: PollSettings,
}

impl MmseqsClient {
    pub fn new(transport: Arc<dyn HttpTransport>, host_url: &str, poll: PollSettings) -> Self {
        Self {
            transport,
            host_url: host_url.trim_end_matches('/').to_string(),
            poll,
        }
    }

    fn decode(body: &[u8]) -> Ticket {
        match serde_json::from_slice::<TicketBody>(body) {
            Ok(ticket) => Ticket {
                status: TicketStatus::parse(&ticket.status),
                id: ticket.id,
            },
            Err(_) => Ticket::unknown(),
        }
    }

    /// POST the query in env mode; unparseable replies count as UNKNOWN
    pub fn submit(&self, sequence: &str) -> Result<Ticket, String> {
        let url = format!("{}/ticket/msa", self.host_url);
        let query = format!(">101\n{}", sequence);
        let response = self
            .transport
            .post_form(&url, &[("q", query.as_str()), ("mode", "env")])?;
        Ok(Self::decode(&response.body))
    }

    pub fn status(&self, id: &str) -> Result<Ticket, String> {
        let url = format!("{}/ticket/{}", self.host_url, id);
        let response = self.transport.get(&url)?;
        Ok(Self::decode(&response.body))
    }

    pub fn download(&self, id: &str, path: &Path) -> Result<(), String> {
        let url = format!("{}/result/download/{}", self.host_url, id);
        let body = self.transport.get(&url)?.into_success(&url)?;
        std::fs::write(path, body)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
    }

    fn check_attempts(&self, attempts: usize) -> Result<(), String> {
        match self.poll.max_attempts {
            Some(max) if attempts >= max => Err(format!(
                "MMseqs2 server did not finish after {} requests",
                attempts
            )),
            _ => Ok(()),
        }
    }

    /// Run the search and store the result archive at `tarfile`; an existing archive is reused
    pub fn search(&self, sequence: &str, tarfile: &Path) -> Result<(), String> {
        if tarfile.is_file() {
            println!("♻️  Reusing MMseqs2 results: {}", tarfile.display());
            return Ok(());
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] MMseqs2 {msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(200));

        let mut attempts = 1;
        let mut ticket = self.submit(sequence)?;
        spinner.set_message("submitted");

        std::thread::sleep(self.poll.delay());
        while ticket.status.needs_resubmit() {
            self.check_attempts(attempts)?;
            spinner.set_message(format!("resubmitting ({:?})", ticket.status));
            std::thread::sleep(self.poll.delay());
            ticket = self.submit(sequence)?;
            attempts += 1;
        }

        if ticket.status == TicketStatus::Error {
            spinner.abandon_with_message("error");
            return Err(API_ERROR_MESSAGE.to_string());
        }

        let id = ticket
            .id
            .clone()
            .ok_or("MMseqs2 server accepted the job without returning a ticket id")?;
        spinner.println(format!("🎫 MMseqs2 ticket: {}", id));

        while ticket.status.in_progress() {
            self.check_attempts(attempts)?;
            spinner.set_message(format!("{:?}", ticket.status).to_lowercase());
            std::thread::sleep(self.poll.delay());
            ticket = self.status(&id)?;
            attempts += 1;
        }

        match ticket.status {
            TicketStatus::Complete => {
                spinner.finish_with_message("complete");
                self.download(&id, tarfile)?;
                println!("📦 Downloaded MMseqs2 results to {}", tarfile.display());
                Ok(())
            }
            TicketStatus::Error => {
                spinner.abandon_with_message("error");
                Err(API_ERROR_MESSAGE.to_string())
            }
            other => {
                spinner.abandon_with_message("unexpected status");
                Err(format!("Unexpected MMseqs2 ticket status: {:?}", other))
            }
        }
    }
}

/// Unpack a .tar.gz archive into `dir`
pub fn extract_archive(archive: &Path, dir: &Path) -> Result<(), String> {
    let file = File::open(archive)
        .map_err(|e| format!("Failed to open archive '{}': {}", archive.display(), e))?;
    unpack_tar_gz(file, dir)
        .map_err(|e| format!("Failed to extract '{}': {}", archive.display(), e))
}

/// Unpack a gzip-compressed tar stream into `dir`
pub fn unpack_tar_gz<R: std::io::Read>(reader: R, dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create directory '{}': {}", dir.display(), e))?;
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive
        .unpack(dir)
        .map_err(|e| format!("Failed to unpack into '{}': {}", dir.display(), e))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::http::mock::MockTransport;

    const HOST: &str = "http://mmseqs.test";

    fn fast_poll(max_attempts: Option<usize>) -> PollSettings {
        PollSettings {
            base: Duration::ZERO,
            jitter: Duration::ZERO,
            max_attempts,
        }
    }

    #[test]
    fn test_search_resubmits_then_polls() {
        let transport = Arc::new(MockTransport::new());
        transport
            .json("http://mmseqs.test/ticket/msa", r#"{"status":"RATELIMIT"}"#)
            .json("http://mmseqs.test/ticket/msa", r#"{"status":"PENDING","id":"abc"}"#)
            .json("http://mmseqs.test/ticket/abc", r#"{"status":"RUNNING","id":"abc"}"#)
            .json("http://mmseqs.test/ticket/abc", r#"{"status":"COMPLETE","id":"abc"}"#)
            .respond("http://mmseqs.test/result/download/abc", 200, b"archive".to_vec());

        let dir = tempfile::tempdir().unwrap();
        let tarfile = dir.path().join("out.tar.gz");
        let client = MmseqsClient::new(transport.clone(), HOST, fast_poll(None));
        client.search("MKTAY", &tarfile).unwrap();

        assert_eq!(std::fs::read(&tarfile).unwrap(), b"archive".to_vec());
        assert_eq!(transport.count("http://mmseqs.test/ticket/msa"), 2);
        assert_eq!(transport.count("http://mmseqs.test/ticket/abc"), 2);
    }

    #[test]
    fn test_search_skips_existing_archive() {
        let transport = Arc::new(MockTransport::new());
        let dir = tempfile::tempdir().unwrap();
        let tarfile = dir.path().join("out.tar.gz");
        std::fs::write(&tarfile, b"cached").unwrap();

        let client = MmseqsClient::new(transport.clone(), HOST, fast_poll(None));
        client.search("MKTAY", &tarfile).unwrap();
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_search_error_status() {
        let transport = Arc::new(MockTransport::new());
        transport
            .json("http://mmseqs.test/ticket/msa", r#"{"status":"PENDING","id":"e1"}"#)
            .json("http://mmseqs.test/ticket/e1", r#"{"status":"ERROR","id":"e1"}"#);

        let dir = tempfile::tempdir().unwrap();
        let client = MmseqsClient::new(transport, HOST, fast_poll(None));
        let err = client.search("MKTAY", &dir.path().join("out.tar.gz")).unwrap_err();
        assert!(err.starts_with("MMseqs2 API is giving errors."));
    }

    #[test]
    fn test_search_error_on_submit() {
        let transport = Arc::new(MockTransport::new());
        transport.json("http://mmseqs.test/ticket/msa", r#"{"status":"ERROR"}"#);

        let dir = tempfile::tempdir().unwrap();
        let tarfile = dir.path().join("out.tar.gz");
        let client = MmseqsClient::new(transport.clone(), HOST, fast_poll(None));
        let err = client.search("MKTAYXX", &tarfile).unwrap_err();

        assert_eq!(err, API_ERROR_MESSAGE);
        assert!(err.ends_with("please try again in an hour."));
        assert_eq!(transport.count("http://mmseqs.test/ticket/msa"), 1);
        assert!(!tarfile.exists());
    }

    #[test]
    fn test_invalid_json_is_unknown_and_attempts_are_bounded() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("http://mmseqs.test/ticket/msa", 502, b"<html>bad gateway</html>".to_vec());

        let dir = tempfile::tempdir().unwrap();
        let client = MmseqsClient::new(transport.clone(), HOST, fast_poll(Some(3)));
        let err = client.search("MKTAY", &dir.path().join("out.tar.gz")).unwrap_err();
        assert!(err.contains("did not finish"));
        assert_eq!(transport.count("http://mmseqs.test/ticket/msa"), 3);
    }

    #[test]
    fn test_extract_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("out.tar.gz");
        std::fs::write(
            &archive,
            fixtures::tar_gz(&[("uniref.a3m", &b">101\nMKT\n"[..]), ("pdb70.m8", &b""[..])]),
        )
        .unwrap();

        let target = dir.path().join("env");
        extract_archive(&archive, &target).unwrap();
        assert_eq!(std::fs::read_to_string(target.join("uniref.a3m")).unwrap(), ">101\nMKT\n");
        assert!(target.join("pdb70.m8").is_file());
    }
}
