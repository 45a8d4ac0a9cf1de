//! In-memory transport used by the lookup tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;
use stitch_api::ApiError;

use super::LookupTransport;

/// Transport answering from a table keyed by `(endpoint, with_auth)`.
///
/// Unscripted calls fail as transport errors. Each call can be delayed to
/// make concurrency observable; in-flight calls and their peak are counted.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<HashMap<(String, bool), Result<Value, ApiError>>>,
    delays: Mutex<HashMap<String, Duration>>,
    default_delay: Duration,
    calls: Mutex<Vec<(String, bool)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            default_delay: delay,
            ..Self::default()
        }
    }

    pub(crate) fn respond(self, endpoint: &str, with_auth: bool, payload: Value) -> Self {
        self.set_response(endpoint, with_auth, Ok(payload));
        self
    }

    pub(crate) fn fail(self, endpoint: &str, with_auth: bool, message: &str) -> Self {
        self.set_response(endpoint, with_auth, Err(ApiError::http(500, message)));
        self
    }

    pub(crate) fn delay(self, endpoint: &str, delay: Duration) -> Self {
        self.delays.lock().expect("delays lock").insert(endpoint.to_string(), delay);
        self
    }

    pub(crate) fn set_response(&self, endpoint: &str, with_auth: bool, response: Result<Value, ApiError>) {
        self.responses
            .lock()
            .expect("responses lock")
            .insert((endpoint.to_string(), with_auth), response);
    }

    pub(crate) fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LookupTransport for ScriptedTransport {
    async fn fetch(&self, endpoint: &str, with_auth: bool) -> Result<Value, ApiError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((endpoint.to_string(), with_auth));
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = self
            .delays
            .lock()
            .expect("delays lock")
            .get(endpoint)
            .copied()
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.responses
            .lock()
            .expect("responses lock")
            .get(&(endpoint.to_string(), with_auth))
            .cloned()
            .unwrap_or_else(|| Err(ApiError::transport()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_api::NETWORK_ERROR_MESSAGE;

    #[test]
    fn unscripted_calls_fail_as_network_errors() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        let transport = ScriptedTransport::new();
        let error = runtime
            .block_on(transport.fetch("customers", true))
            .expect_err("unscripted");
        assert_eq!(error.message(), NETWORK_ERROR_MESSAGE);
        assert_eq!(transport.calls(), vec![("customers".to_string(), true)]);
    }
}
