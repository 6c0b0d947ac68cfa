use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Args, Transport};

type Handler = Arc<dyn Fn(&Args) -> Result<Value, Value> + Send + Sync>;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub command: String,
    pub args: Args,
}

/// In-process transport backed by per-command handlers.
///
/// Serves disconnected previews and scripted backends in tests. Commands without a handler fail
/// the way an unknown backend command would.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    handlers: Arc<Mutex<HashMap<String, Handler>>>,
    calls: Arc<Mutex<Vec<CallRecord>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for `command`.
    pub fn on<F>(&self, command: &str, handler: F) -> &Self
    where
        F: Fn(&Args) -> Result<Value, Value> + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(command.to_string(), Arc::new(handler));
        self
    }

    /// Always answer `command` with `value`.
    pub fn respond(&self, command: &str, value: Value) -> &Self {
        self.on(command, move |_| Ok(value.clone()))
    }

    /// Always reject `command` with the raw failure `error`.
    pub fn reject(&self, command: &str, error: Value) -> &Self {
        self.on(command, move |_| Err(error.clone()))
    }

    /// Snapshot of every call received so far.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls received for `command`.
    pub fn call_count(&self, command: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|record| record.command == command)
            .count()
    }
}

impl std::fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("calls", &self.calls().len())
            .finish()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn call(&self, command: &str, args: Args) -> Result<Value, Value> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CallRecord {
                command: command.to_string(),
                args: args.clone(),
            });

        let handler = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(command)
            .cloned();

        match handler {
            Some(handler) => handler(&args),
            None => Err(json!({
                "message": format!("Unknown command '{command}'"),
                "code": "UNKNOWN_COMMAND",
            })),
        }
    }
}
