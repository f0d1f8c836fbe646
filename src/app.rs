//! Application controller.
//!
//! [`App`] owns every piece of mutable client state: settings, the document
//! registry, the chat transcript and busy flag, the toast stack and the
//! progress indicator. The pipelines in [`crate::upload`] and [`crate::chat`]
//! are free functions that take `&App`.
//!
//! Timers spawned on behalf of the pipelines (index transitions, progress
//! hiding) are tracked so a short-lived process can [`App::settle`] before
//! exiting instead of dropping them.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tokio::task::JoinHandle;

use crate::chat::Transcript;
use crate::client::ServiceClient;
use crate::config::Config;
use crate::models::TranscriptEntry;
use crate::notify::{Notifier, ToastSink};
use crate::progress::{FeedbackMode, ProgressIndicator, UploadProgressReporter};
use crate::registry::{DocumentListView, DocumentRegistry};
use crate::settings::{Settings, SettingsForm};
use crate::storage::KeyValueStore;

/// Holds the busy flag for the duration of one chat turn.
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub struct App {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    settings: RwLock<Settings>,
    settings_open: AtomicBool,
    documents: Arc<tokio::sync::Mutex<DocumentRegistry>>,
    transcript: Mutex<Transcript>,
    busy: AtomicBool,
    notifier: Notifier,
    progress: ProgressIndicator,
    client: ServiceClient,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

impl App {
    /// Load settings and documents from `store` and wire feedback output for `mode`.
    pub async fn start(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        mode: FeedbackMode,
    ) -> Result<Self> {
        let reporter = mode.progress_reporter();
        let sink = mode.toast_sink();
        Self::with_feedback(config, store, reporter, sink).await
    }

    /// Like [`App::start`] with explicit progress and toast outputs.
    pub async fn with_feedback(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        reporter: Arc<dyn UploadProgressReporter>,
        sink: Arc<dyn ToastSink>,
    ) -> Result<Self> {
        let settings = Settings::load(store.as_ref()).await?;
        let documents = DocumentRegistry::load(store.clone()).await?;
        let notifier = Notifier::new(
            sink,
            config.timing.toast_display(),
            config.timing.toast_exit(),
        );

        tracing::info!(
            documents = documents.documents().len(),
            model = %settings.model,
            "client state loaded"
        );

        Ok(Self {
            config,
            store,
            settings: RwLock::new(settings),
            settings_open: AtomicBool::new(false),
            documents: Arc::new(tokio::sync::Mutex::new(documents)),
            transcript: Mutex::new(Transcript::default()),
            busy: AtomicBool::new(false),
            notifier,
            progress: ProgressIndicator::new(reporter),
            client: ServiceClient::new(),
            timers: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ── Settings ──

    pub fn settings(&self) -> Settings {
        self.settings
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn model_badge(&self) -> String {
        self.settings().model_badge().to_string()
    }

    /// Open the settings view, pre-filled with the current values.
    pub fn open_settings(&self) -> SettingsForm {
        self.settings_open.store(true, Ordering::SeqCst);
        self.settings().to_form()
    }

    pub fn close_settings(&self) {
        self.settings_open.store(false, Ordering::SeqCst);
    }

    pub fn is_settings_open(&self) -> bool {
        self.settings_open.load(Ordering::SeqCst)
    }

    /// Trim and persist the form, then close the settings view.
    ///
    /// On a storage failure the in-memory settings are left untouched, the
    /// view stays open and an error toast is shown.
    pub async fn save_settings(&self, form: SettingsForm) -> Result<Settings> {
        let settings = form.into_settings();
        if let Err(e) = settings.save(self.store.as_ref()).await {
            self.notifier
                .error(format!("Could not save settings: {:#}", e));
            return Err(e);
        }

        match self.settings.write() {
            Ok(mut current) => *current = settings.clone(),
            Err(e) => *e.into_inner() = settings.clone(),
        }

        self.close_settings();
        tracing::info!(badge = settings.model_badge(), "settings saved");
        self.notifier.success("Settings saved");
        Ok(settings)
    }

    // ── Documents ──

    pub fn documents(&self) -> &Arc<tokio::sync::Mutex<DocumentRegistry>> {
        &self.documents
    }

    pub async fn document_view(&self) -> DocumentListView {
        self.documents.lock().await.view()
    }

    // ── Chat ──

    pub fn transcript(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the transcript entries from index `from` on.
    pub fn transcript_since(&self, from: usize) -> Vec<TranscriptEntry> {
        self.transcript()
            .entries()
            .get(from..)
            .map(<[TranscriptEntry]>::to_vec)
            .unwrap_or_default()
    }

    /// Whether a new chat turn may start (the submit control is enabled).
    pub fn can_submit(&self) -> bool {
        !self.busy.load(Ordering::SeqCst)
    }

    /// Set the busy flag, or `None` if a turn is already running.
    pub fn begin_turn(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard { flag: &self.busy })
    }

    // ── Feedback ──

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn progress(&self) -> &ProgressIndicator {
        &self.progress
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    // ── Timers ──

    /// Keep `handle` so [`App::settle`] can wait for it.
    pub fn track(&self, handle: JoinHandle<()>) {
        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        timers.retain(|h| !h.is_finished());
        timers.push(handle);
    }

    /// Wait until every tracked timer has fired.
    pub async fn settle(&self) {
        loop {
            let pending: Vec<JoinHandle<()>> = {
                let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
                std::mem::take(&mut *timers)
            };
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "timer task failed");
                }
            }
        }
    }
}
