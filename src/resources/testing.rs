//! Recording fake of the management API for handler tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use reqwest::header::HeaderMap;
use reqwest::Method;

use crate::client::ApigeeApi;
use crate::error::Result;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

impl RecordedCall {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.body.as_deref().unwrap_or("null")).unwrap()
    }
}

/// Answers requests from a queue; an empty queue answers with an empty body.
pub(crate) struct RecordingClient {
    public: bool,
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<Result<String>>>,
}

impl RecordingClient {
    pub fn new(public: bool) -> Self {
        Self {
            public,
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn respond(&self, response: Result<String>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<Method> {
        self.calls().into_iter().map(|c| c.method).collect()
    }
}

impl ApigeeApi for RecordingClient {
    fn organization(&self) -> &str {
        "acme"
    }

    fn is_public(&self) -> bool {
        self.public
    }

    async fn http_request(
        &self,
        method: Method,
        path: &str,
        _query: &[(&str, &str)],
        _headers: HeaderMap,
        body: Option<String>,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}
