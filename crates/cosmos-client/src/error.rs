//! Error types for the Cosmos client.
//!
//! This module provides a unified error type [`ClientError`] that covers every
//! stage of the broadcast pipeline: transport failures, ledger rejections,
//! funding failures and result decoding.

use crate::keyring::KeyringError;
use thiserror::Error;

/// A specialized Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// The main error type for the Cosmos client.
///
/// Transport-level failures (`Http`, `Status`, `Rpc`, `Connection`) are kept
/// apart from chain-level rejections so callers can tell "the node never saw
/// it" from "the ledger said no". See [`ClientError::is_connection_error`].
#[derive(Error, Debug)]
pub enum ClientError {
    /// Error occurred during HTTP communication
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A service answered with a non-success HTTP status
    #[error("HTTP status {status_code}: {message}")]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The node returned a JSON-RPC error object
    #[error("RPC error ({code}): {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
        /// Optional additional data attached by the node
        data: Option<String>,
    },

    /// Malformed or unexpected transport response
    #[error("connection error: {0}")]
    Connection(String),

    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error occurred during URL parsing
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The signer account is unknown to the ledger
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// The account never reached the required balance
    #[error(
        "insufficient balance for {address}: need at least {min_amount}{denom} (waited {waited_secs}s)"
    )]
    InsufficientBalance {
        /// The account address
        address: String,
        /// The denom that was checked
        denom: String,
        /// The minimum amount that was required
        min_amount: u128,
        /// How long the balance was polled before giving up
        waited_secs: u64,
    },

    /// The faucet rejected the request or one of its transfers
    #[error("cannot retrieve tokens from faucet: {0}")]
    FaucetRequest(String),

    /// The broadcast reached the node but failed with a "not found" cause
    #[error("make sure that your account has enough balance: {0}")]
    AccountUnfunded(String),

    /// The ledger rejected the transaction with a non-zero code
    #[error("transaction rejected with code {code}: {raw_log}")]
    BroadcastRejected {
        /// Result code returned by the ledger
        code: u32,
        /// Module namespace of the code, if any
        codespace: String,
        /// Raw execution log, verbatim
        raw_log: String,
        /// Hash of the rejected transaction
        tx_hash: String,
    },

    /// Transaction simulation failed
    #[error("simulation failed with code {code}: {log}")]
    Simulation {
        /// Result code returned by the simulation query
        code: u32,
        /// Log returned by the simulation query
        log: String,
    },

    /// Malformed or absent result payload
    #[error("decode error: {0}")]
    Decode(String),

    /// Transaction building error
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Key storage error
    #[error("keyring error: {0}")]
    Keyring(#[from] KeyringError),

    /// The operation was cancelled by the caller
    #[error("operation cancelled")]
    Cancelled,

    /// The operation did not finish before its deadline
    #[error("{operation} timed out after {timeout_secs} seconds")]
    Timeout {
        /// What was being waited on
        operation: String,
        /// How long we waited
        timeout_secs: u64,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Maximum length for error messages to prevent excessive memory usage in logs.
const MAX_ERROR_MESSAGE_LENGTH: usize = 1000;

/// Patterns that might indicate sensitive information in error messages.
const SENSITIVE_PATTERNS: &[&str] = &[
    "private_key",
    "privkey",
    "secret",
    "password",
    "mnemonic",
    "seed",
];

impl ClientError {
    /// Creates a new transaction error
    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a new decode error
    pub fn decode<E: std::fmt::Display>(err: E) -> Self {
        Self::Decode(err.to_string())
    }

    /// Creates a new connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    /// Returns true if the node or faucet could not be reached, or answered
    /// with something that is not a well-formed response.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::Rpc { .. } | Self::Connection(_)
        )
    }

    /// Returns true if the ledger itself rejected the transaction.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::BroadcastRejected { .. })
    }

    /// Returns the ledger result code for rejections.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::BroadcastRejected { code, .. } | Self::Simulation { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if this is a transient error that might succeed on retry
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status_code, .. } => {
                matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Returns a sanitized version of the error message safe for logging.
    ///
    /// Control characters are stripped, very long messages are truncated and
    /// messages that look like they carry key material are redacted.
    pub fn sanitized_message(&self) -> String {
        sanitize_string(&self.to_string())
    }

    /// Returns the error message suitable for display to end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Http(_) | Self::Connection(_) => "Network error occurred",
            Self::Status {
                status_code: 429, ..
            } => "Rate limit exceeded",
            Self::Status { status_code, .. } if *status_code >= 500 => "Server error",
            Self::Status { .. } => "Request failed",
            Self::Rpc { .. } => "Node returned an error",
            Self::Json(_) => "Failed to process response",
            Self::Url(_) => "Invalid URL",
            Self::AccountNotFound(_) => "Account not found",
            Self::InsufficientBalance { .. } => "Insufficient balance",
            Self::FaucetRequest(_) => "Faucet request failed",
            Self::AccountUnfunded(_) => "Account has no funds",
            Self::BroadcastRejected { .. } => "Transaction rejected",
            Self::Simulation { .. } => "Transaction simulation failed",
            Self::Decode(_) => "Failed to decode result",
            Self::Transaction(_) => "Transaction error",
            Self::Keyring(_) => "Key storage error",
            Self::Cancelled => "Operation cancelled",
            Self::Timeout { .. } => "Operation timed out",
            Self::Config(_) => "Configuration error",
        }
    }
}

fn sanitize_string(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let lower = cleaned.to_lowercase();
    for pattern in SENSITIVE_PATTERNS {
        if lower.contains(pattern) {
            return format!("[REDACTED: message contained sensitive pattern '{pattern}']");
        }
    }

    if cleaned.len() > MAX_ERROR_MESSAGE_LENGTH {
        let mut end = MAX_ERROR_MESSAGE_LENGTH;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... [truncated, total length: {}]",
            &cleaned[..end],
            cleaned.len()
        )
    } else {
        cleaned
    }
}
