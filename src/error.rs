//! Errors surfaced to the user by the upload and chat pipelines.
//!
//! Plumbing (storage, config files) uses `anyhow`; these variants are the
//! ones that end up in a notification or an error transcript entry, so their
//! `Display` text is written for the user.

use std::fmt;

/// Which endpoint setting is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Query,
    Presign,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Query => f.write_str("query endpoint"),
            Endpoint::Presign => f.write_str("presign endpoint"),
        }
    }
}

#[derive(Debug)]
pub enum AskError {
    /// The endpoint needed by a pipeline has not been configured.
    NotConfigured(Endpoint),
    /// A selection contained no PDF files.
    NoPdfFiles,
    /// The remote side answered with a non-success status.
    Status {
        context: &'static str,
        status: u16,
        body: String,
    },
    /// The request never got a response.
    Transport(reqwest::Error),
    /// A response arrived but could not be understood.
    Decode(String),
    Io(std::io::Error),
    /// Local state could not be read or written.
    Storage(anyhow::Error),
}

impl fmt::Display for AskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AskError::NotConfigured(endpoint) => {
                write!(f, "Please configure the {} in settings", endpoint)
            }
            AskError::NoPdfFiles => f.write_str("Only PDF files are supported"),
            AskError::Status {
                context,
                status,
                body,
            } => {
                if body.is_empty() {
                    write!(f, "{} failed ({})", context, status)
                } else {
                    write!(f, "{} failed ({}): {}", context, status, body)
                }
            }
            AskError::Transport(e) => write!(f, "{}", e),
            AskError::Decode(msg) => f.write_str(msg),
            AskError::Io(e) => write!(f, "{}", e),
            AskError::Storage(e) => write!(f, "{:#}", e),
        }
    }
}

impl std::error::Error for AskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AskError::Transport(e) => Some(e),
            AskError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AskError {
    fn from(e: reqwest::Error) -> Self {
        AskError::Transport(e)
    }
}

impl From<std::io::Error> for AskError {
    fn from(e: std::io::Error) -> Self {
        AskError::Io(e)
    }
}

impl From<anyhow::Error> for AskError {
    fn from(e: anyhow::Error) -> Self {
        AskError::Storage(e)
    }
}
