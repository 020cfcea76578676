use thiserror::Error;

/// Failure classes for the protocol codec and telemetry engine.
///
/// Transport-level failures (connect/send/receive) stay as `anyhow` errors at
/// the orchestration layer; everything the core itself can detect is one of
/// these variants so callers can tell a skippable condition from a fatal one.
#[derive(Debug, Error)]
pub enum Error {
    /// Range start is greater than range end.
    #[error("invalid register range: start {start:#06x} > end {end:#06x}")]
    InvalidRange { start: u16, end: u16 },

    /// Register count does not fit the protocol's 16-bit count field.
    #[error("register count {count} for range {start:#06x}..={end:#06x} exceeds protocol limit")]
    RegisterCountOutOfRange { start: u16, end: u16, count: u32 },

    /// Response buffer does not reach past the fixed header offset.
    #[error("malformed response: {len} bytes, expected more than {min}")]
    MalformedResponse { len: usize, min: usize },

    /// Mapping table references a field the output schema does not have.
    /// Fatal: the map file and the output schema have drifted out of sync.
    #[error("register mapping '{title}' does not match any telemetry field")]
    InvalidMapping { title: String },
}
