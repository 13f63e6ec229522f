//! # Voice Clone Server
//!
//! HTTP front end for a voice-cloning text-to-speech model.
//!
//! The binary wires these pieces together: [`config::Config`] is parsed,
//! a [`model::SpeechModel`] is loaded once, and [`routes::router`] serves it
//! through a shared [`service::AppState`].

pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod service;

pub use config::Config;
pub use error::ApiError;
pub use model::{CoquiCliModel, SpeechModel};
pub use routes::router;
pub use service::{AppState, ReferenceSource};

/// Default `RUST_LOG` directives when the variable is unset.
pub const DEFAULT_LOG_FILTER: &str = "voice_clone_server=info,voice_clone_audio=info,tower_http=info";

/// Install the global `tracing` subscriber. Later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
