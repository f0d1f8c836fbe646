//! Upload pipeline.
//!
//! Each accepted PDF goes through two requests: the presign service hands
//! back a signed URL, then the raw bytes are `PUT` to it. The registry
//! record follows along (`uploading`, then `processing` or `error`), the
//! progress indicator steps through fixed percentages, and a timer promotes
//! successful uploads to `indexed` after the configured delay.
//!
//! Files within one [`handle_files`] call are processed strictly in order.
//! Separate calls are not serialized against each other.

use std::path::Path;
use std::sync::Arc;

use crate::app::App;
use crate::client::PDF_CONTENT_TYPE;
use crate::error::{AskError, Endpoint};
use crate::models::DocStatus;
use crate::progress::{PERCENT_DONE, PERCENT_STARTED, PERCENT_TRANSFERRING};

/// A file chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PickedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = detect_content_type(&name).to_string();
        Self {
            name,
            content_type,
            bytes,
        }
    }

    /// Read a file from disk. The name is the final path component.
    pub async fn from_path(path: &Path) -> Result<Self, AskError> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_CONTENT_TYPE
    }
}

/// MIME type from a file name's extension.
pub fn detect_content_type(name: &str) -> &'static str {
    let ext = match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return "application/octet-stream",
    };
    match ext.as_str() {
        "pdf" => PDF_CONTENT_TYPE,
        "md" => "text/markdown",
        "txt" => "text/plain",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Where one accepted file ended up when its pipeline finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Empty when no record could be created for the file.
    pub id: String,
    pub name: String,
    pub status: DocStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReport {
    /// Nothing in the selection was a PDF.
    NoPdfFiles { rejected: Vec<String> },
    /// No presign endpoint; the settings view was opened.
    NeedsConfiguration,
    Completed {
        uploaded: Vec<UploadResult>,
        rejected: Vec<String>,
    },
}

impl UploadReport {
    /// Whether at least one file was accepted and every one made it to `processing`.
    pub fn is_success(&self) -> bool {
        match self {
            UploadReport::Completed { uploaded, .. } => {
                !uploaded.is_empty()
                    && uploaded.iter().all(|u| u.status == DocStatus::Processing)
            }
            _ => false,
        }
    }
}

/// Upload the PDFs in `files`, in order.
pub async fn handle_files(app: &App, files: Vec<PickedFile>) -> UploadReport {
    let (accepted, rejected): (Vec<PickedFile>, Vec<PickedFile>) =
        files.into_iter().partition(PickedFile::is_pdf);
    let rejected: Vec<String> = rejected.into_iter().map(|f| f.name).collect();

    if !rejected.is_empty() {
        tracing::info!(?rejected, "skipping non-PDF files");
    }

    if accepted.is_empty() {
        app.notifier().error(AskError::NoPdfFiles.to_string());
        return UploadReport::NoPdfFiles { rejected };
    }

    let presign_url = app.settings().presign_url;
    if presign_url.is_empty() {
        app.notifier()
            .error(AskError::NotConfigured(Endpoint::Presign).to_string());
        app.open_settings();
        return UploadReport::NeedsConfiguration;
    }

    let mut uploaded = Vec::with_capacity(accepted.len());
    for file in accepted {
        uploaded.push(upload_one(app, &presign_url, file).await);
    }

    UploadReport::Completed { uploaded, rejected }
}

async fn upload_one(app: &App, presign_url: &str, file: PickedFile) -> UploadResult {
    let PickedFile { name, bytes, .. } = file;

    let added = app.documents().lock().await.add(&name).await;
    let record = match added {
        Ok(record) => record,
        Err(e) => {
            tracing::error!(file = %name, error = %format!("{:#}", e), "could not record upload");
            let message = format!("Upload failed for {}: {:#}", name, e);
            app.notifier().error(message.clone());
            return UploadResult {
                id: String::new(),
                name,
                status: DocStatus::Error,
                error: Some(message),
            };
        }
    };

    tracing::info!(id = %record.id, file = %name, bytes = bytes.len(), "upload started");
    app.progress().set(&name, PERCENT_STARTED);

    let outcome = transfer(app, presign_url, &name, bytes).await;

    let (status, error) = match outcome {
        Ok(()) => {
            update_status(app, &record.id, DocStatus::Processing).await;
            app.notifier().success(format!("{} uploaded", name));
            schedule_indexed(app, record.id.clone());
            (DocStatus::Processing, None)
        }
        Err(e) => {
            tracing::error!(id = %record.id, file = %name, error = %e, "upload failed");
            update_status(app, &record.id, DocStatus::Error).await;
            let message = format!("Upload failed for {}: {}", name, e);
            app.notifier().error(message.clone());
            (DocStatus::Error, Some(message))
        }
    };

    app.track(
        app.progress()
            .hide_after(app.config().timing.progress_hide()),
    );

    UploadResult {
        id: record.id,
        name,
        status,
        error,
    }
}

async fn transfer(
    app: &App,
    presign_url: &str,
    name: &str,
    bytes: Vec<u8>,
) -> Result<(), AskError> {
    let signed_url = app.client().request_upload_url(presign_url, name).await?;
    app.progress().set(name, PERCENT_TRANSFERRING);
    app.client().put_blob(&signed_url, bytes).await?;
    app.progress().set(name, PERCENT_DONE);
    Ok(())
}

async fn update_status(app: &App, id: &str, status: DocStatus) {
    let mut registry = app.documents().lock().await;
    if let Err(e) = registry.set_status(id, status).await {
        tracing::error!(id, %status, error = %format!("{:#}", e), "could not persist status");
    }
}

/// Promote `id` to `indexed` once the index delay has passed.
fn schedule_indexed(app: &App, id: String) {
    let documents = Arc::clone(app.documents());
    let delay = app.config().timing.index_delay();
    app.track(tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let mut registry = documents.lock().await;
        match registry.set_status(&id, DocStatus::Indexed).await {
            Ok(true) => tracing::info!(id = %id, "document indexed"),
            Ok(false) => {}
            Err(e) => {
                tracing::error!(id = %id, error = %format!("{:#}", e), "could not persist status")
            }
        }
    }));
}
