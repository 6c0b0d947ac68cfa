//! Core library crate for the vocabulary app's backend integration layer.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod models;
pub mod poller;
pub mod progress;
pub mod services;
pub mod transport;

pub use client::InvocationClient;
pub use config::{
    AnalysisConfig, BridgeConfig, ConfigError, ConfigLoadResult, ConfigSource, FileConfig,
    config_directory, config_path, load_config, load_config_from, save_config, save_config_to,
};
pub use envelope::Envelope;
pub use error::{ErrorKind, ErrorShape, ErrorSummary, ServiceError, error_message, summarize_error};
pub use logging::{LoggingDestination, LoggingError, current_log_path, init_logging};
pub use poller::{
    BatchProgressPoller, DEFAULT_POLL_INTERVAL, PollEvent, PollFailure, ProgressStream,
};
pub use progress::{
    AnalysisProgress, BatchAnalysisProgress, BatchStatus, ExtractionProgress, format_remaining,
};
pub use services::{
    LoadingObserver, LoadingState, Services, execute_with_loading, validate_required,
};
pub use transport::{
    Args, BRIDGE_MARKERS, BridgeEndpoint, BridgeSource, HttpTransport, MemoryTransport,
    Transport, UnavailableTransport, detect_bridge, detect_bridge_from_env,
};
