//! Shared test utilities for integration tests
//!
//! A scripted generation backend that counts calls and records every request,
//! a one-shot HTTP server for exercising the real provider clients, and an
//! environment guard for tests that touch process-wide variables.

use async_trait::async_trait;
use bloodlink::error::BackendError;
use bloodlink::provider::{GenerationBackend, GenerationRequest, RawResponse};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Backend that replays scripted replies in order.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<RawResponse, BackendError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(reply: RawResponse) -> Self {
        Self::new().then_reply(reply)
    }

    pub fn structured(value: Value) -> Self {
        Self::replying(RawResponse::Structured(value))
    }

    pub fn failing(error: BackendError) -> Self {
        Self::new().then_fail(error)
    }

    pub fn then_reply(self, reply: RawResponse) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply));
        self
    }

    pub fn then_fail(self, error: BackendError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|request| request.prompt.clone())
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn submit(&self, request: GenerationRequest) -> Result<RawResponse, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::RequestFailed("script exhausted".to_string())))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// A request captured by [`serve_once`].
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Serve exactly one HTTP response on a random local port.
/// Returns the base address (`http://127.0.0.1:port`) and a handle yielding the request.
pub async fn serve_once(status: u16, body: String) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let read = socket.read(&mut chunk).await.unwrap();
            assert!(read > 0, "connection closed before headers were complete");
            buffer.extend_from_slice(&chunk[..read]);
            if let Some(position) = find(&buffer, b"\r\n\r\n") {
                break position + 4;
            }
        };

        let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim()
                    .eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        while buffer.len() < header_end + content_length {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);
        }
        let request_body = String::from_utf8_lossy(&buffer[header_end..]).to_string();

        let response = format!(
            "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        CapturedRequest {
            head,
            body: request_body,
        }
    });

    (address, handle)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Run `f` with the given environment variables set, restoring them afterwards.
/// Serialized across tests in this binary.
pub fn with_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(name, _)| (name.to_string(), std::env::var(name).ok()))
        .collect();

    for (name, value) in vars {
        match value {
            Some(value) => std::env::set_var(name, value),
            None => std::env::remove_var(name),
        }
    }

    let result = f();

    for (name, value) in saved {
        match value {
            Some(value) => std::env::set_var(&name, value),
            None => std::env::remove_var(&name),
        }
    }
    result
}
