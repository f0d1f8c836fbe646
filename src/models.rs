//! Core data models used throughout the client.
//!
//! Document records are persisted; transcript entries and citations only
//! live for the duration of a session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upload/indexing state of a document as tracked by this client.
///
/// Moves forward only: `uploading → processing → indexed`, or to `error`
/// from either non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    Uploading,
    Processing,
    Indexed,
    Error,
}

impl DocStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocStatus::Uploading => "uploading",
            DocStatus::Processing => "processing",
            DocStatus::Indexed => "indexed",
            DocStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DocStatus::Indexed | DocStatus::Error)
    }

    /// Whether a record in this state may move to `next`.
    pub fn can_transition_to(&self, next: DocStatus) -> bool {
        matches!(
            (self, next),
            (DocStatus::Uploading, DocStatus::Processing)
                | (DocStatus::Uploading, DocStatus::Error)
                | (DocStatus::Processing, DocStatus::Indexed)
                | (DocStatus::Processing, DocStatus::Error)
        )
    }
}

impl fmt::Display for DocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document the user has uploaded (or tried to).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub name: String,
    pub status: DocStatus,
}

/// Pointer from an answer back to its source material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub source_file: String,
    /// Present whenever the service sent one, including page `0`.
    pub page_number: Option<String>,
    pub section_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Error,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Error => "error",
        }
    }
}

/// One turn-half in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub body: String,
    pub citations: Vec<Citation>,
}

impl TranscriptEntry {
    pub fn user(body: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            body: body.into(),
            citations: Vec::new(),
        }
    }

    pub fn assistant(body: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            role: Role::Assistant,
            body: body.into(),
            citations,
        }
    }

    pub fn error(body: impl Into<String>) -> Self {
        Self {
            role: Role::Error,
            body: body.into(),
            citations: Vec::new(),
        }
    }
}
