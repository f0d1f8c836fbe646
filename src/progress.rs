//! Upload progress indicator and feedback output modes.
//!
//! The indicator is advisory: it moves through fixed percentages at each
//! step boundary of an upload, not real byte counts. Updates are emitted on
//! **stderr** so stdout stays parseable for scripts.

use clap::ValueEnum;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Percent shown once the record exists and the presign request is going out.
pub const PERCENT_STARTED: u8 = 10;
/// Percent shown once the signed URL is in hand and bytes are being sent.
pub const PERCENT_TRANSFERRING: u8 = 40;
pub const PERCENT_DONE: u8 = 100;

/// A single progress event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadProgressEvent {
    /// The indicator shows `percent` for `file`.
    Step { file: String, percent: u8 },
    /// The indicator was hidden and reset.
    Hidden,
}

/// Receives progress events. Implementations write to stderr (human or JSON).
pub trait UploadProgressReporter: Send + Sync {
    fn report(&self, event: &UploadProgressEvent);
}

/// Human-friendly progress on stderr: "upload report.pdf  40%".
pub struct StderrProgress;

impl UploadProgressReporter for StderrProgress {
    fn report(&self, event: &UploadProgressEvent) {
        let line = match event {
            UploadProgressEvent::Step { file, percent } => {
                format!("upload {}  {:>3}%\n", file, percent)
            }
            UploadProgressEvent::Hidden => return,
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl UploadProgressReporter for JsonProgress {
    fn report(&self, event: &UploadProgressEvent) {
        let obj = match event {
            UploadProgressEvent::Step { file, percent } => serde_json::json!({
                "event": "progress",
                "file": file,
                "percent": percent,
            }),
            UploadProgressEvent::Hidden => serde_json::json!({
                "event": "progress",
                "hidden": true,
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when feedback is disabled.
pub struct NoProgress;

impl UploadProgressReporter for NoProgress {
    fn report(&self, _event: &UploadProgressEvent) {}
}

/// Feedback mode for the CLI: off, human (stderr), or JSON (stderr).
///
/// Shared by the progress indicator and the toast notifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum FeedbackMode {
    Off,
    Human,
    Json,
}

impl FeedbackMode {
    /// Default: human feedback when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            FeedbackMode::Human
        } else {
            FeedbackMode::Off
        }
    }

    pub fn progress_reporter(&self) -> Arc<dyn UploadProgressReporter> {
        match self {
            FeedbackMode::Off => Arc::new(NoProgress),
            FeedbackMode::Human => Arc::new(StderrProgress),
            FeedbackMode::Json => Arc::new(JsonProgress),
        }
    }
}

/// What the indicator currently shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub visible: bool,
    pub percent: u8,
    pub label: String,
}

/// The single progress indicator shared by all uploads.
#[derive(Clone)]
pub struct ProgressIndicator {
    state: Arc<Mutex<ProgressState>>,
    reporter: Arc<dyn UploadProgressReporter>,
}

impl ProgressIndicator {
    pub fn new(reporter: Arc<dyn UploadProgressReporter>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ProgressState::default())),
            reporter,
        }
    }

    /// Show the indicator for `file` at `percent`.
    pub fn set(&self, file: &str, percent: u8) {
        if let Ok(mut state) = self.state.lock() {
            state.visible = true;
            state.percent = percent;
            state.label = file.to_string();
        }
        self.reporter.report(&UploadProgressEvent::Step {
            file: file.to_string(),
            percent,
        });
    }

    /// Hide and reset the indicator.
    pub fn hide(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = ProgressState::default();
        }
        self.reporter.report(&UploadProgressEvent::Hidden);
    }

    /// Hide and reset after `delay`, whatever happens in between.
    pub fn hide_after(&self, delay: Duration) -> JoinHandle<()> {
        let indicator = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            indicator.hide();
        })
    }

    pub fn snapshot(&self) -> ProgressState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}
