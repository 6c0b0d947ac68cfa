//! Host bridge transports.
//!
//! A transport performs exactly one underlying call per invocation and hands back either the raw
//! success value or the raw failure value, untouched. Normalization happens in the client.

mod http;
mod memory;

pub use http::HttpTransport;
pub use memory::{CallRecord, MemoryTransport};

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Arguments passed to a backend command.
pub type Args = Map<String, Value>;

/// Environment markers the desktop shell uses to advertise its bridge endpoint.
///
/// Checked in order; later entries cover older shell releases.
pub const BRIDGE_MARKERS: &[&str] = &["VOCAB_BRIDGE_URL", "VOCAB_IPC_URL", "TAURI_IPC_URL"];

/// Message returned by [`UnavailableTransport`] for every call.
pub const BRIDGE_UNAVAILABLE: &str = "Host bridge is not available";

/// Single RPC entry point exposed by the host.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one backend call. `Err` carries the host's raw failure value.
    async fn call(&self, command: &str, args: Args) -> Result<Value, Value>;

    /// Side-effect-free presence probe.
    fn is_available(&self) -> bool {
        true
    }
}

/// Where a bridge endpoint was discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeSource {
    Marker(&'static str),
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeEndpoint {
    pub url: String,
    pub source: BridgeSource,
}

/// Locate the bridge endpoint from the environment markers, falling back to configuration.
///
/// `lookup` resolves a marker name to its value (normally `std::env::var`).
pub fn detect_bridge<F>(lookup: F, configured: Option<&str>) -> Option<BridgeEndpoint>
where
    F: Fn(&str) -> Option<String>,
{
    for marker in BRIDGE_MARKERS {
        if let Some(url) = lookup(marker).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            return Some(BridgeEndpoint {
                url,
                source: BridgeSource::Marker(marker),
            });
        }
    }

    configured
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|url| BridgeEndpoint {
            url: url.to_string(),
            source: BridgeSource::Config,
        })
}

/// Convenience wrapper over [`detect_bridge`] reading the process environment.
pub fn detect_bridge_from_env(configured: Option<&str>) -> Option<BridgeEndpoint> {
    detect_bridge(|name| std::env::var(name).ok(), configured)
}

/// Stand-in used outside the native shell. Never reaches the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableTransport;

#[async_trait]
impl Transport for UnavailableTransport {
    async fn call(&self, _command: &str, _args: Args) -> Result<Value, Value> {
        Err(Value::String(BRIDGE_UNAVAILABLE.to_string()))
    }

    fn is_available(&self) -> bool {
        false
    }
}
