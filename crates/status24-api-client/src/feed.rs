//! Live status feed over server-sent events.
//!
//! [`ApiClient::watch_status`] opens `/status/{org_id}/stream` and returns a
//! [`StatusFeed`] handle. A background task decodes frames into
//! [`FeedEvent`]s; dropping or cancelling the handle stops the task and closes
//! the connection, which releases the server-side subscription.

use futures::{Stream, StreamExt};
use status24_core::{PublicLookup, StatusPage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{check, ApiClient, Result};

pub const STATUS_EVENT: &str = "status";
pub const NOT_FOUND_EVENT: &str = "not_found";

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A fresh projection of the organization's document.
    Status(Box<StatusPage>),
    /// The organization has no document (yet).
    NotFound,
}

impl FeedEvent {
    pub fn lookup(&self) -> PublicLookup {
        match self {
            FeedEvent::Status(_) => PublicLookup::Found,
            FeedEvent::NotFound => PublicLookup::Missing,
        }
    }
}

/// One decoded SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Incremental SSE decoder. Frames may be split across chunks at any byte.
#[derive(Debug, Default)]
pub(crate) struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        normalize_line_endings(&mut self.buffer);

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let raw: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(frame) = parse_frame(&String::from_utf8_lossy(&raw)) {
                frames.push(frame);
            }
        }
        frames
    }
}

/// Rewrites CRLF to LF in place. A trailing `\r` waits for the next chunk.
fn normalize_line_endings(buffer: &mut Vec<u8>) {
    if !buffer.contains(&b'\r') {
        return;
    }
    let mut out = Vec::with_capacity(buffer.len());
    let mut bytes = buffer.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        if byte == b'\r' && bytes.peek() == Some(&b'\n') {
            continue;
        }
        out.push(byte);
    }
    *buffer = out;
}

fn parse_frame(raw: &str) -> Option<SseFrame> {
    let mut event = String::new();
    let mut data: Vec<&str> = Vec::new();

    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        // comment lines carry keep-alives
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => event = value.to_string(),
            "data" => data.push(value),
            _ => {}
        }
    }

    if event.is_empty() && data.is_empty() {
        return None;
    }
    Some(SseFrame {
        event: if event.is_empty() { "message".to_string() } else { event },
        data: data.join("\n"),
    })
}

fn decode_event(org_id: &str, frame: SseFrame) -> Option<FeedEvent> {
    match frame.event.as_str() {
        STATUS_EVENT => match serde_json::from_str::<StatusPage>(&frame.data) {
            Ok(page) => Some(FeedEvent::Status(Box::new(page))),
            Err(e) => {
                tracing::warn!(org_id, error = %e, "Skipping undecodable status frame");
                None
            }
        },
        NOT_FOUND_EVENT => Some(FeedEvent::NotFound),
        other => {
            tracing::debug!(org_id, event = other, "Ignoring unknown feed event");
            None
        }
    }
}

async fn pump<S, B>(org_id: String, stream: S, events: mpsc::Sender<FeedEvent>)
where
    S: Stream<Item = reqwest::Result<B>>,
    B: AsRef<[u8]>,
{
    let mut stream = Box::pin(stream);
    let mut parser = SseParser::default();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(org_id = %org_id, error = %e, "Status feed interrupted");
                break;
            }
        };
        for frame in parser.push(chunk.as_ref()) {
            if let Some(event) = decode_event(&org_id, frame) {
                if events.send(event).await.is_err() {
                    return;
                }
            }
        }
    }
    tracing::debug!(org_id = %org_id, "Status feed closed");
}

/// Handle on a live status feed. Keeps the last known snapshot.
pub struct StatusFeed {
    org_id: String,
    events: mpsc::Receiver<FeedEvent>,
    lookup: PublicLookup,
    latest: Option<StatusPage>,
    task: JoinHandle<()>,
}

impl StatusFeed {
    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// `Pending` until the first event arrives.
    pub fn lookup(&self) -> PublicLookup {
        self.lookup
    }

    pub fn latest(&self) -> Option<&StatusPage> {
        self.latest.as_ref()
    }

    /// Next event; `None` once the server closed the stream.
    pub async fn next(&mut self) -> Option<FeedEvent> {
        let event = self.events.recv().await?;
        self.lookup = event.lookup();
        match &event {
            FeedEvent::Status(page) => self.latest = Some((**page).clone()),
            FeedEvent::NotFound => self.latest = None,
        }
        Some(event)
    }

    pub fn cancel(self) {}
}

impl Drop for StatusFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl ApiClient {
    /// Subscribes to the public status page of `org_id`.
    pub async fn watch_status(&self, org_id: &str) -> Result<StatusFeed> {
        let response = self
            .stream_request(&format!("/status/{}/stream", org_id))
            .send()
            .await?;
        let response = check(response).await?;

        let (sender, receiver) = mpsc::channel(16);
        let task = tokio::spawn(pump(org_id.to_string(), response.bytes_stream(), sender));
        tracing::debug!(org_id, "Status feed opened");

        Ok(StatusFeed {
            org_id: org_id.to_string(),
            events: receiver,
            lookup: PublicLookup::Pending,
            latest: None,
            task,
        })
    }
}
