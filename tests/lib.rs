//! Shared helpers for the tradetalk behavior tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tradetalk_core::http_client::HttpFuture;
use tradetalk_core::{HttpClient, HttpError, HttpRequest, HttpResponse, Symbol};

/// Replies with one fixed outcome and records every request it sees.
pub struct CannedHttpClient {
    reply: Result<HttpResponse, HttpError>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl CannedHttpClient {
    pub fn responding(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(HttpResponse::new(status, body)),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: HttpError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().expect("lock").clone()
    }
}

impl HttpClient for CannedHttpClient {
    fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
        self.seen.lock().expect("lock").push(request);
        let reply = self.reply.clone();
        Box::pin(async move { reply })
    }
}

pub fn sym(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

/// Path of a committed file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}
