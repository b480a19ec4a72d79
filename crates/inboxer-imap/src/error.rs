//! Error types for the IMAP client seam.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during IMAP operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake or encryption error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// Error reported by the underlying IMAP protocol client.
    #[error("IMAP error: {0}")]
    Imap(#[from] async_imap::error::Error),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// A command was issued without an open connection.
    #[error("Not connected")]
    NotConnected,

    /// Security mode not supported by this client.
    #[error("Security mode not supported: only implicit TLS and plaintext are supported")]
    UnsupportedSecurity,

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A command argument cannot be sent safely, e.g. it contains CR/LF.
    #[error("Invalid command argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
