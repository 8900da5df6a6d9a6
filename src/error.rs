//! Crate-local error type.
//!
//! The core never panics on a malformed peer response or a dead peer; both
//! are modelled as variants of [`Error`] and handled by the caller according
//! to the policy of each component (routing propagates, maintenance absorbs,
//! `join_ring` is fatal).
//!
//! [`Error`]: enum.Error.html

use std::fmt;
use std::io;
use std::net::AddrParseError;

/// Errors produced by the ring membership and routing engine.
#[derive(Debug)]
pub enum Error {
    /// A peer could not be reached, or the connection failed mid-call.
    /// Carries the address that was attempted.
    PeerUnreachable(String, io::Error),
    /// A peer replied, but with a message type we did not expect for the
    /// request we sent, or with a payload that failed to parse.
    Malformed(&'static str),
    /// The configuration file was missing a required value or contained one
    /// that could not be parsed.
    Config(String),
    /// A socket address string could not be parsed.
    AddrParse(AddrParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::PeerUnreachable(addr, cause) => {
                write!(f, "peer {} unreachable: {}", addr, cause)
            }
            Error::Malformed(reason) => write!(f, "malformed peer response: {}", reason),
            Error::Config(reason) => write!(f, "configuration error: {}", reason),
            Error::AddrParse(cause) => write!(f, "invalid socket address: {}", cause),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::PeerUnreachable(_, cause) => Some(cause),
            Error::AddrParse(cause) => Some(cause),
            Error::Malformed(_) | Error::Config(_) => None,
        }
    }
}

impl From<AddrParseError> for Error {
    fn from(cause: AddrParseError) -> Self {
        Error::AddrParse(cause)
    }
}

impl Error {
    /// True for a hard refusal (connection refused / not found), as opposed
    /// to a timeout or reset mid-call. Check-predecessor is specified to
    /// strictly clear the predecessor only on a hard refusal; callers that
    /// want the more lenient "any failure means dead" behaviour can ignore
    /// this and treat every `PeerUnreachable` as death.
    pub fn is_hard_refusal(&self) -> bool {
        match self {
            Error::PeerUnreachable(_, cause) => matches!(
                cause.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
            ),
            _ => false,
        }
    }
}
