use thiserror::Error;

/// Failures reported by a [`crate::wallets::WalletProvider`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet is installed. Silent during discovery, alerted on connect.
    #[error("no wallet detected")]
    Unavailable,
    /// The user declined to authorize an account, or the wallet failed.
    #[error("connection rejected: {0}")]
    Rejected(String),
}

impl WalletError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

/// A character lookup against the game contract failed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("character read failed: {message}")]
pub struct ReadError {
    message: String,
}

impl ReadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AccountParseError {
    #[error("address is empty")]
    Empty,
    #[error("address must be {expected} hex digits, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("address is not valid hex: {0}")]
    NotHex(String),
}
