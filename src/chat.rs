//! Chat pipeline: one question, one request, one transcript turn.
//!
//! A turn appends the user's (trimmed) question, shows a thinking
//! placeholder while the query service works, then appends either an
//! assistant entry with citations or an error entry. Turns are serialized by
//! the app's busy flag; a submission while busy is dropped, not queued.

use crate::answer::decode_answer;
use crate::app::App;
use crate::client::QueryRequest;
use crate::error::{AskError, Endpoint};
use crate::models::TranscriptEntry;

/// Shown in an error entry when the failure has no message of its own.
pub const FALLBACK_ERROR: &str = "Something went wrong";

/// Live chat transcript. Not persisted.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    thinking: bool,
}

impl Transcript {
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Whether the thinking placeholder is showing.
    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    pub fn show_thinking(&mut self) {
        self.thinking = true;
    }

    pub fn hide_thinking(&mut self) {
        self.thinking = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// Input was empty or whitespace.
    Empty,
    /// A turn is already in flight.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored(Ignored),
    /// No query endpoint; the settings view was opened.
    NeedsConfiguration,
    Answered(TranscriptEntry),
    Failed(TranscriptEntry),
}

/// Run one chat turn for `input`.
pub async fn submit_query(app: &App, input: &str) -> SubmitOutcome {
    let query = input.trim();
    if query.is_empty() {
        return SubmitOutcome::Ignored(Ignored::Empty);
    }
    if !app.can_submit() {
        tracing::debug!("submission ignored while a turn is in flight");
        return SubmitOutcome::Ignored(Ignored::Busy);
    }

    let settings = app.settings();
    if settings.query_url.is_empty() {
        app.notifier()
            .error(AskError::NotConfigured(Endpoint::Query).to_string());
        app.open_settings();
        return SubmitOutcome::NeedsConfiguration;
    }

    let Some(_busy) = app.begin_turn() else {
        return SubmitOutcome::Ignored(Ignored::Busy);
    };

    {
        let mut transcript = app.transcript();
        transcript.push(TranscriptEntry::user(query));
        transcript.show_thinking();
    }

    let request = QueryRequest::new(query, settings.model);
    let result = app.client().query(&settings.query_url, &request).await;
    app.transcript().hide_thinking();

    let outcome = match result {
        Ok(body) => {
            let answer = decode_answer(&body);
            tracing::info!(citations = answer.citations.len(), "query answered");
            SubmitOutcome::Answered(TranscriptEntry::assistant(answer.text, answer.citations))
        }
        Err(e) => {
            tracing::error!(error = %e, "query failed");
            SubmitOutcome::Failed(error_entry(&e))
        }
    };

    if let SubmitOutcome::Answered(entry) | SubmitOutcome::Failed(entry) = &outcome {
        app.transcript().push(entry.clone());
    }
    outcome
}

fn error_entry(error: &AskError) -> TranscriptEntry {
    let message = error.to_string();
    if message.trim().is_empty() {
        TranscriptEntry::error(FALLBACK_ERROR)
    } else {
        TranscriptEntry::error(message)
    }
}
