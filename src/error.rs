//! Error types for the record-processing pipeline.
//!
//! The library core uses [`PipelineError`] via `thiserror`; the CLI and the
//! collectors wrap it with `anyhow` for context-rich reporting.

/// Errors the pipeline core can produce. The core performs no I/O, so the
/// taxonomy is narrow: bad single records and bad caller-supplied parameters.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A raw record missing a required field or carrying an unusable value.
    /// Only the offending record is rejected; the caller decides whether to
    /// log-and-skip or abort the batch.
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: String },

    /// A parameter that would silently produce nonsensical output. Checked
    /// before any processing begins.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl PipelineError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PipelineError::malformed("record has no url");
        assert_eq!(err.to_string(), "malformed record: record has no url");

        let err = PipelineError::invalid_config("similarity threshold must be within [0, 1]; got 1.5");
        assert!(err.to_string().contains("[0, 1]"));
    }
}
