use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::{AccountStatus, AgentId, AgentRecord, ApplicationStatus, Gender, SupportId, SupportMember};

/// Minimal record with a name and status.
pub fn record(id: i64, name: &str, status: ApplicationStatus) -> AgentRecord {
    let mut rec = AgentRecord::new(AgentId(id));
    rec.full_name = Some(name.to_string());
    rec.application_status = status;
    rec
}

/// Support roster matching [`roster_records`].
pub fn support_roster() -> Vec<SupportMember> {
    vec![
        SupportMember {
            id: SupportId(10),
            name: "Farid".to_string(),
        },
        SupportMember {
            id: SupportId(11),
            name: "Siti Nurhaliza".to_string(),
        },
    ]
}

/// Four fully populated records covering every status and assignment case.
pub fn roster_records() -> Vec<AgentRecord> {
    let mut alice = record(1, "Alice Tan", ApplicationStatus::Pending);
    alice.gender = Some(Gender::Female);
    alice.email = Some("alice@example.com".to_string());
    alice.phone = Some("012-111 2222".to_string());
    alice.national_id = Some("880101-14-5678".to_string());
    alice.agent_code = Some("AG-001".to_string());
    alice.user_type = Some("agent".to_string());
    alice.created_at = Some("2024-06-28T09:00:00Z".to_string());

    let mut siti = record(2, "Siti Aminah", ApplicationStatus::Approved);
    siti.gender = Some(Gender::Female);
    siti.email = Some("siti@example.org".to_string());
    siti.phone = Some("013-222 3333".to_string());
    siti.national_id = Some("900202-10-1234".to_string());
    siti.agent_code = Some("AG-002".to_string());
    siti.user_type = Some("broker".to_string());
    siti.account_status = Some(AccountStatus::Active);
    siti.sales_support_id = Some(SupportId(10));
    siti.sales_support_name = Some("Farid".to_string());
    siti.agreement_sent = true;
    siti.created_at = Some("2024-05-01T09:00:00Z".to_string());

    let mut bob = record(3, "Bob Lee", ApplicationStatus::Rejected);
    bob.gender = Some(Gender::Male);
    bob.email = Some("bob@example.com".to_string());
    bob.phone = Some("014-333 4444".to_string());
    bob.national_id = Some("850303-08-4321".to_string());
    bob.agent_code = Some("AG-003".to_string());
    bob.user_type = Some("agent".to_string());
    bob.rejection_reason = Some("Duplicate application".to_string());
    bob.created_at = Some("2024-03-15T09:00:00Z".to_string());

    let mut chen = record(4, "Chen Wei", ApplicationStatus::Pending);
    chen.gender = Some(Gender::Male);
    chen.email = Some("chen@example.com".to_string());
    chen.phone = Some("012-555 0199".to_string());
    chen.national_id = Some("920404-07-8765".to_string());
    chen.agent_code = Some("AG-004".to_string());
    chen.user_type = Some("agent".to_string());
    chen.sales_support_id = Some(SupportId(11));
    chen.sales_support_name = Some("Siti Nurhaliza".to_string());
    chen.created_at = Some("2024-06-25T09:00:00Z".to_string());

    vec![alice, siti, bob, chen]
}

// ─── Fake HTTP backend ───────────────────────────────────────────────────────

/// One request as seen by [`FakeServer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    /// Request line, e.g. `POST /admin/agents/reject HTTP/1.1`.
    pub line: String,
    /// Raw header block, request line excluded.
    pub headers: String,
    pub body: String,
}

impl SeenRequest {
    pub fn method(&self) -> &str {
        self.line.split(' ').next().unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.line.split(' ').nth(1).unwrap_or_default()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }
}

/// Minimal HTTP/1.1 server on a background thread. Every connection gets one
/// response computed by the responder; every request is recorded before it is
/// answered.
pub struct FakeServer {
    base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FakeServer {
    pub fn start(
        respond: impl Fn(&SeenRequest) -> (u16, String) + Send + 'static,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let seen: Arc<Mutex<Vec<SeenRequest>>> = Arc::default();
        let log = Arc::clone(&seen);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let Ok(request) = read_request(&mut stream) else { continue };
                let (status, body) = respond(&request);
                log.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(request);
                let response = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        Ok(Self { base_url, seen })
    }

    /// Answer every request with the same status and body.
    pub fn reply(status: u16, body: impl Into<String>) -> std::io::Result<Self> {
        let body = body.into();
        Self::start(move |_| (status, body.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn read_request(stream: &mut TcpStream) -> std::io::Result<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if request_complete(&buf) {
            break;
        }
    }
    let text = String::from_utf8_lossy(&buf).into_owned();
    let (head, body) = text.split_once("\r\n\r\n").unwrap_or((&text, ""));
    let (line, headers) = head.split_once("\r\n").unwrap_or((head, ""));
    Ok(SeenRequest {
        line: line.to_string(),
        headers: headers.to_string(),
        body: body.to_string(),
    })
}

fn request_complete(buf: &[u8]) -> bool {
    let text = String::from_utf8_lossy(buf);
    let Some(end) = text.find("\r\n\r\n") else {
        return false;
    };
    let length = text[..end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    buf.len() >= end + 4 + length
}
