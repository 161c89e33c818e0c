//! Process-wide logging setup
//!
//! The subscriber is installed once at process start by [`init`], which hands
//! back a [`Telemetry`] handle. Components receive the handle in their
//! constructors and log under a child span of its root span instead of
//! configuring logging themselves.

use tracing::{info, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Handle to the process-wide observability setup
#[derive(Debug, Clone)]
pub struct Telemetry {
    root: Span,
}

/// Install the global subscriber and return the handle.
///
/// Priority for the filter: RUST_LOG env var > `verbose` flag > default (info).
/// Fails if a global subscriber has already been installed.
pub fn init(verbose: bool) -> Result<Telemetry> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .try_init()
        .map_err(|e| Error::Config(format!("Logging already initialized: {}", e)))?;

    let root = tracing::info_span!("tally");
    info!("Logging initialized");
    Ok(Telemetry { root })
}

/// Install a test-writer subscriber if none exists (tests only)
#[cfg(any(test, feature = "test-utils"))]
pub fn init_test() -> Telemetry {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Telemetry::disabled()
}

impl Telemetry {
    /// A handle that attaches no span (library use without a subscriber)
    pub fn disabled() -> Self {
        Self { root: Span::none() }
    }

    /// Span for a named component, parented to the process root span
    pub fn component(&self, name: &'static str) -> Span {
        tracing::info_span!(parent: &self.root, "component", name)
    }

    /// Flush and log shutdown. Consumes the handle.
    pub fn shutdown(self) {
        let _enter = self.root.enter();
        info!("Shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_handle_produces_spans() {
        let telemetry = Telemetry::disabled();
        let span = telemetry.component("db");
        // No subscriber for the disabled root, so the child span is inert
        let _enter = span.enter();
        telemetry.shutdown();
    }

    #[test]
    fn test_init_test_is_repeatable() {
        let _a = init_test();
        let _b = init_test();
    }
}
