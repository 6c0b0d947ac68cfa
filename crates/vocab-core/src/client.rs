//! Invocation client: the single chokepoint for backend calls.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::FileConfig;
use crate::envelope::Envelope;
use crate::error::summarize_error;
use crate::transport::{
    Args, BridgeSource, HttpTransport, Transport, UnavailableTransport, detect_bridge_from_env,
};

/// Wraps a [`Transport`] and normalizes every outcome into an [`Envelope`].
///
/// Calls never panic and never return `Err`: transport failures, decode failures and missing
/// bridges all become `Envelope::Failure`.
#[derive(Clone)]
pub struct InvocationClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for InvocationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationClient")
            .field("available", &self.transport.is_available())
            .finish()
    }
}

impl InvocationClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self {
        Self::new(Arc::new(transport))
    }

    /// Build a client from configuration and the shell's environment markers.
    ///
    /// Falls back to [`UnavailableTransport`] when no bridge is advertised or the HTTP client
    /// cannot be constructed.
    pub fn from_config(config: &FileConfig) -> Self {
        let Some(endpoint) = detect_bridge_from_env(config.bridge.endpoint.as_deref()) else {
            debug!("No host bridge advertised; running disconnected");
            return Self::with_transport(UnavailableTransport);
        };

        let source = match endpoint.source {
            BridgeSource::Marker(marker) => marker,
            BridgeSource::Config => "config",
        };
        let timeout = Duration::from_secs(config.bridge.request_timeout_secs);
        match HttpTransport::new(endpoint.url.clone(), timeout) {
            Ok(transport) => {
                debug!(url = %endpoint.url, source, "Using host bridge");
                Self::with_transport(transport)
            }
            Err(err) => {
                warn!(error = %err, "Failed to build bridge HTTP client");
                Self::with_transport(UnavailableTransport)
            }
        }
    }

    /// Whether a host bridge is present at all.
    pub fn is_environment_available(&self) -> bool {
        self.transport.is_available()
    }

    /// Invoke `command` and hand back the raw JSON result.
    pub async fn invoke_raw(&self, command: &str, args: Args) -> Envelope<Value> {
        let started = Instant::now();
        debug!(command, "Invoking backend command");

        match self.transport.call(command, args).await {
            Ok(data) => {
                debug!(
                    command,
                    elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                    "Backend command succeeded"
                );
                Envelope::Success(data)
            }
            Err(raw) => {
                let summary = summarize_error(&raw);
                warn!(
                    command,
                    shape = ?summary.shape,
                    elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                    error = %summary.message,
                    "Backend command failed"
                );
                Envelope::Failure(summary.message)
            }
        }
    }

    /// Invoke `command` and decode the result into `T`.
    pub async fn invoke<T: DeserializeOwned>(&self, command: &str, args: Args) -> Envelope<T> {
        match self.invoke_raw(command, args).await {
            Envelope::Success(data) => match serde_json::from_value::<T>(data) {
                Ok(decoded) => Envelope::Success(decoded),
                Err(err) => {
                    warn!(command, error = %err, "Failed to decode backend response");
                    Envelope::Failure(format!(
                        "Failed to decode response for '{command}': {err}"
                    ))
                }
            },
            Envelope::Failure(message) => Envelope::Failure(message),
        }
    }
}
