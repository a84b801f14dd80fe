//! # autoreflect-logging
//!
//! Logging for the autoreflect session reflection system.
//!
//! ## Key Types
//!
//! - [`Logger`] - Console reporting of reflection events
//! - [`ReflectEvent`] - Event types emitted while finalizing a session
//! - [`LogFormat`] - Output formats (Pretty, JSON, Compact)
//!
//! Diagnostic output from the library crates goes through `tracing`;
//! [`init_tracing`] installs the subscriber for it.

mod events;

pub use events::{LogFormat, Logger, ReflectEvent};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the application
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }
}
