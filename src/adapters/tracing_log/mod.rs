// Tracing log adapter - Structured logging using tracing crate

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::ports::*;

/// Log adapter forwarding interactor messages to the tracing subscriber
///
/// Level filtering is left to the subscriber installed by `utils::logging`,
/// which honours `log.level` and `RUST_LOG`.
#[derive(Debug, Default)]
pub struct TracingLogAdapter;

impl TracingLogAdapter {
    /// Create new tracing log adapter
    pub fn new() -> Result<Self, DomainError> {
        Ok(Self)
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        info!(target: "ripcas", "{}", message);
    }

    async fn warn(&self, message: &str) {
        warn!(target: "ripcas", "{}", message);
    }

    async fn debug(&self, message: &str) {
        debug!(target: "ripcas", "{}", message);
    }
}
