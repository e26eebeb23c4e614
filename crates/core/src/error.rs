use thiserror::Error;

/// Errors raised while building a coordinator from host-supplied data.
///
/// Runtime operations never fail: unknown targets, busy navigation and
/// missing optional page parts degrade to no-ops.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("config: {0}")]
    Config(#[source] serde_json::Error),
    #[error("page snapshot: {0}")]
    Page(#[source] serde_json::Error),
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}
