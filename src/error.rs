use crate::session::UserId;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `chatgate`.
///
/// Each subsystem defines its own error enum. The router matches on these to
/// pick the user-visible reply; adapters keep using `anyhow::Result` for
/// context chains and are folded in through [`GateError::Other`].
#[derive(Debug, Error)]
pub enum GateError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Access control ──────────────────────────────────────────────────
    #[error("access: {0}")]
    Access(#[from] AccessError),

    // ── Commands ────────────────────────────────────────────────────────
    #[error("command: {0}")]
    Command(#[from] CommandError),

    // ── Completion / image services ─────────────────────────────────────
    #[error("upstream: {0}")]
    Upstream(#[from] UpstreamError),

    // ── Transport / Channel ─────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("required secret {0} is not set")]
    MissingSecret(&'static str),
}

// ─── Access errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("user {0} is not allowed to use this bot")]
    Unauthorized(UserId),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("user {0} not found in allow-list")]
    NotFound(UserId),
}

// ─── Command errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("allow-list could not be saved: {0}")]
    Persistence(String),
}

// ─── Upstream (completion / image) errors ───────────────────────────────────

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {message}")]
    Request {
        service: &'static str,
        message: String,
    },

    #[error("{service} request timed out after {secs}s")]
    Timeout { service: &'static str, secs: u64 },

    #[error("{service} returned no usable result")]
    EmptyResponse { service: &'static str },
}

// ─── Transport errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel {channel} connection failed: {message}")]
    Connection { channel: String, message: String },

    #[error("channel {channel} send failed: {message}")]
    Send { channel: String, message: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, GateError>;
