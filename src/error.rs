// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("malformed public key: {0}")]
    KeyFormat(#[from] KeyFormatError),
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("queue store failure: {0}")]
    Store(String),
    #[error("arithmetic precondition violated: {0}")]
    Precondition(&'static str),
}

/// Key material that cannot be used for encryption. Fatal to the caller,
/// never retried.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum KeyFormatError {
    #[error("`{field}` is not a decimal integer")]
    NotAnInteger { field: &'static str },
    #[error("modulus must be greater than one")]
    ModulusOutOfRange,
}

/// Failures on the wire. Only `Connectivity` is eligible for the
/// queue-and-drain retry loop; a `Rejected` payload is surfaced and never
/// retried automatically.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum TransportError {
    #[error("connectivity failure: {0}")]
    Connectivity(String),
    #[error("server rejected the payload ({status}): {detail}")]
    Rejected { status: u16, detail: String },
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Connectivity(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
