//! HTTP transfer executor
//!
//! Streams a GET response into the destination file, reporting progress after
//! the headers arrive and after every chunk. A partially written destination is
//! removed when the transfer fails or is aborted.

use super::traits::{TransferEvent, TransferExecutor, TransferHandle};
use crate::config::TransferConfig;
use crate::error::{Result, TransferError, TransferErrorCode};
use crate::types::Progress;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Buffered progress events per transfer
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// [`TransferExecutor`] backed by `reqwest`
#[derive(Clone)]
pub struct HttpTransfer {
    client: reqwest::Client,
}

impl HttpTransfer {
    /// Build a client from the transfer configuration
    pub fn new(config: &TransferConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Use an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TransferExecutor for HttpTransfer {
    async fn start(
        &self,
        url: &str,
        dest: &Path,
        headers: &HashMap<String, String>,
    ) -> Result<TransferHandle> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        tokio::spawn(run_transfer(
            self.client.clone(),
            url.to_string(),
            dest.to_path_buf(),
            headers.clone(),
            tx,
            cancel.clone(),
        ));

        Ok(TransferHandle::new(rx, cancel))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

async fn run_transfer(
    client: reqwest::Client,
    url: String,
    dest: PathBuf,
    headers: HashMap<String, String>,
    tx: mpsc::Sender<TransferEvent>,
    cancel: CancellationToken,
) {
    let mut created = false;
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransferError::aborted()),
        result = fetch(&client, &url, &dest, &headers, &tx, &mut created) => result,
    };

    if outcome.is_err() && created {
        if let Err(e) = tokio::fs::remove_file(&dest).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %dest.display(), error = %e, "failed to remove partial download");
            }
        }
    }

    // The receiver may already be gone after an abort
    let _ = tx.send(TransferEvent::Finished(outcome)).await;
}

async fn fetch(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    headers: &HashMap<String, String>,
    tx: &mpsc::Sender<TransferEvent>,
    created: &mut bool,
) -> std::result::Result<(), TransferError> {
    let parsed = url::Url::parse(url).map_err(|e| {
        TransferError::new(
            TransferErrorCode::InvalidUrl,
            format!("invalid URL '{url}': {e}"),
        )
    })?;

    let response = client
        .get(parsed)
        .headers(header_map(headers)?)
        .send()
        .await
        .map_err(|e| classify(&e, url))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransferError::from_status(
            status.as_u16(),
            format!("HTTP {status} fetching {url}"),
        ));
    }

    let total = response.content_length().unwrap_or(0);
    debug!(url, total, "response headers received");
    send_progress(tx, Progress::new(0, total)).await?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| local_error("failed to create destination directory", dest, &e))?;
    }
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| local_error("failed to create destination file", dest, &e))?;
    *created = true;

    let mut loaded = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| classify(&e, url))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| local_error("failed to write destination file", dest, &e))?;
        loaded += chunk.len() as u64;
        send_progress(tx, Progress::new(loaded, total)).await?;
    }

    file.flush()
        .await
        .map_err(|e| local_error("failed to flush destination file", dest, &e))?;
    Ok(())
}

fn header_map(headers: &HashMap<String, String>) -> std::result::Result<HeaderMap, TransferError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            TransferError::new(
                TransferErrorCode::InvalidUrl,
                format!("invalid header name '{name}': {e}"),
            )
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            TransferError::new(
                TransferErrorCode::InvalidUrl,
                format!("invalid value for header '{name}': {e}"),
            )
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

async fn send_progress(
    tx: &mpsc::Sender<TransferEvent>,
    progress: Progress,
) -> std::result::Result<(), TransferError> {
    tx.send(TransferEvent::Progress(progress))
        .await
        .map_err(|_| TransferError::aborted())
}

fn classify(error: &reqwest::Error, url: &str) -> TransferError {
    if error.is_connect() || error.is_timeout() {
        TransferError::new(
            TransferErrorCode::Connection,
            format!("connection failed for '{url}': {error}"),
        )
    } else if error.is_builder() {
        TransferError::new(
            TransferErrorCode::InvalidUrl,
            format!("invalid request for '{url}': {error}"),
        )
    } else {
        TransferError::new(
            TransferErrorCode::Remote,
            format!("failed to fetch '{url}': {error}"),
        )
    }
}

fn local_error(context: &str, path: &Path, error: &std::io::Error) -> TransferError {
    TransferError::new(
        TransferErrorCode::Local,
        format!("{context} '{}': {error}", path.display()),
    )
}
