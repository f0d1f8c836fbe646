//! Transient toast notifications.
//!
//! [`Notifier::notify`] is fire-and-forget: the toast is pushed onto the
//! active stack and handed to a [`ToastSink`], then a timer moves it to its
//! leaving phase after the display duration and removes it once the exit
//! phase has run. Toasts stack freely; there is no limit and no
//! deduplication.
//!
//! Every toast is also written to the `tracing` log, errors at `error`
//! level, so failures reach the diagnostic channel even with feedback off.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::progress::FeedbackMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastPhase {
    Visible,
    Leaving,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub phase: ToastPhase,
}

/// Where toasts are displayed.
pub trait ToastSink: Send + Sync {
    fn show(&self, toast: &Toast);
    fn dismiss(&self, _toast: &Toast) {}
}

/// One line per toast on stderr: "✓ report.pdf uploaded".
pub struct StderrToasts;

impl ToastSink for StderrToasts {
    fn show(&self, toast: &Toast) {
        let marker = match toast.kind {
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
            ToastKind::Info => "•",
        };
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{} {}", marker, toast.message);
        let _ = stderr.flush();
    }
}

/// One JSON object per toast event on stderr.
pub struct JsonToasts;

impl JsonToasts {
    fn emit(&self, event: &str, toast: &Toast) {
        let obj = serde_json::json!({
            "event": event,
            "id": toast.id,
            "kind": toast.kind.as_str(),
            "message": toast.message,
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

impl ToastSink for JsonToasts {
    fn show(&self, toast: &Toast) {
        self.emit("toast", toast);
    }

    fn dismiss(&self, toast: &Toast) {
        self.emit("toast_dismissed", toast);
    }
}

pub struct NoToasts;

impl ToastSink for NoToasts {
    fn show(&self, _toast: &Toast) {}
}

impl FeedbackMode {
    pub fn toast_sink(&self) -> Arc<dyn ToastSink> {
        match self {
            FeedbackMode::Off => Arc::new(NoToasts),
            FeedbackMode::Human => Arc::new(StderrToasts),
            FeedbackMode::Json => Arc::new(JsonToasts),
        }
    }
}

/// Toast stack with timed dismissal.
#[derive(Clone)]
pub struct Notifier {
    active: Arc<Mutex<Vec<Toast>>>,
    sink: Arc<dyn ToastSink>,
    next_id: Arc<AtomicU64>,
    display: Duration,
    exit: Duration,
}

impl Notifier {
    pub fn new(sink: Arc<dyn ToastSink>, display: Duration, exit: Duration) -> Self {
        Self {
            active: Arc::new(Mutex::new(Vec::new())),
            sink,
            next_id: Arc::new(AtomicU64::new(1)),
            display,
            exit,
        }
    }

    /// Show a toast. Must be called from within a tokio runtime.
    pub fn notify(&self, kind: ToastKind, message: impl Into<String>) {
        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            message: message.into(),
            phase: ToastPhase::Visible,
        };

        match kind {
            ToastKind::Error => tracing::error!(message = %toast.message, "notification"),
            _ => tracing::info!(kind = kind.as_str(), message = %toast.message, "notification"),
        }

        if let Ok(mut active) = self.active.lock() {
            active.push(toast.clone());
        }
        self.sink.show(&toast);

        let notifier = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(notifier.display).await;
            notifier.set_phase(toast.id, ToastPhase::Leaving);
            tokio::time::sleep(notifier.exit).await;
            notifier.remove(toast.id);
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(ToastKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(ToastKind::Error, message);
    }

    /// Toasts currently on screen, oldest first.
    pub fn active(&self) -> Vec<Toast> {
        self.active.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn set_phase(&self, id: u64, phase: ToastPhase) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(toast) = active.iter_mut().find(|t| t.id == id) {
                toast.phase = phase;
            }
        }
    }

    fn remove(&self, id: u64) {
        let removed = match self.active.lock() {
            Ok(mut active) => {
                let pos = active.iter().position(|t| t.id == id);
                pos.map(|p| active.remove(p))
            }
            Err(_) => None,
        };
        if let Some(toast) = removed {
            self.sink.dismiss(&toast);
        }
    }
}
