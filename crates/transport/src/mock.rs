//! Scripted in-memory transport for tests.
//!
//! Responses are replayed in the order they were scripted, one per `issue`
//! call. Every request is recorded so tests can assert on the exact URL,
//! headers and body the SDK produced.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;

use crate::{HttpRequest, HttpResponse, Result, Transport, TransportError};

enum Step {
    Respond {
        response: HttpResponse,
        delay: Option<Duration>,
    },
    Fail(TransportError),
    /// Never completes; only cancellation or a timeout ends the call.
    Hang,
}

/// Transport that answers from a script instead of the network.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and raw body.
    pub fn respond(self, status: u16, body: impl Into<Bytes>) -> Self {
        self.push(Step::Respond {
            response: HttpResponse::new(status_code(status), body),
            delay: None,
        })
    }

    /// Queue a response with a JSON body.
    pub fn respond_json(self, status: u16, body: &serde_json::Value) -> Self {
        self.respond(status, body.to_string())
    }

    /// Queue a response that is delivered only after `delay`.
    pub fn respond_after(self, delay: Duration, status: u16, body: impl Into<Bytes>) -> Self {
        self.push(Step::Respond {
            response: HttpResponse::new(status_code(status), body),
            delay: Some(delay),
        })
    }

    /// Queue a transport-level failure.
    pub fn fail(self, error: TransportError) -> Self {
        self.push(Step::Fail(error))
    }

    /// Queue a request that never completes.
    pub fn hang(self) -> Self {
        self.push(Step::Hang)
    }

    /// Requests seen so far, in issue order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("mock transport lock poisoned").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("mock transport lock poisoned").len()
    }

    fn push(self, step: Step) -> Self {
        self.script
            .lock()
            .expect("mock transport lock poisoned")
            .push_back(step);
        self
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).expect("scripted status must be a valid HTTP status")
}

impl Transport for MockTransport {
    fn id(&self) -> &str {
        "mock"
    }

    fn issue(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>> {
        self.requests
            .lock()
            .expect("mock transport lock poisoned")
            .push(request);
        let step = self
            .script
            .lock()
            .expect("mock transport lock poisoned")
            .pop_front();

        Box::pin(async move {
            match step {
                Some(Step::Respond { response, delay }) => {
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    Ok(response)
                }
                Some(Step::Fail(error)) => Err(error),
                Some(Step::Hang) => std::future::pending().await,
                None => Err(TransportError::Request(
                    "mock transport has no scripted response left".into(),
                )),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeaderMap, Method};

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn replays_in_order_and_records_requests() {
        let mock = MockTransport::new()
            .respond(200, "first")
            .respond(404, "second");

        let a = mock.issue(get("http://h/a")).await.unwrap();
        let b = mock.issue(get("http://h/b")).await.unwrap();
        assert_eq!(a.status, StatusCode::OK);
        assert_eq!(&b.body[..], b"second");
        assert_eq!(b.status, StatusCode::NOT_FOUND);

        let urls: Vec<_> = mock.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["http://h/a", "http://h/b"]);
    }

    #[tokio::test]
    async fn exhausted_script_fails() {
        let mock = MockTransport::new();
        let err = mock.issue(get("http://h/")).await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_response_waits() {
        let mock = MockTransport::new().respond_after(Duration::from_secs(5), 200, "late");
        let start = tokio::time::Instant::now();
        mock.issue(get("http://h/")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn scripted_failure_is_returned() {
        let mock = MockTransport::new().fail(TransportError::Connect("refused".into()));
        let err = mock.issue(get("http://h/")).await.unwrap_err();
        assert_eq!(err, TransportError::Connect("refused".into()));
    }
}
