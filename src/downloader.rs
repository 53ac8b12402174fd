use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use reqwest::Response;
use reqwest::header::CONTENT_LENGTH;
use tokio::fs;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{PortalError, Result};
use crate::progress::{Clock, ProgressTracker, ProgressUpdate};

/// Something a body can be read from one chunk at a time.
#[allow(async_fn_in_trait)]
pub trait ChunkSource {
    fn content_length(&self) -> Option<u64>;

    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

impl ChunkSource for Response {
    fn content_length(&self) -> Option<u64> {
        self.headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
    }

    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.chunk().await?)
    }
}

/// Adapts a stream of byte chunks, e.g. `Response::bytes_stream`.
pub struct StreamSource<S> {
    stream: S,
    content_length: Option<u64>,
}

impl<S> StreamSource<S> {
    pub fn new(stream: S, content_length: Option<u64>) -> Self {
        Self {
            stream,
            content_length,
        }
    }
}

impl<S, E> ChunkSource for StreamSource<S>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        match self.stream.next().await {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(e)) => Err(PortalError::Stream(e.to_string())),
            None => Ok(None),
        }
    }
}

/// Reads `source` to the end, reporting throttled progress, and returns the
/// whole body.
pub async fn stream_body<S, F>(
    source: &mut S,
    settings: &Settings,
    clock: &dyn Clock,
    mut on_progress: F,
) -> Result<Bytes>
where
    S: ChunkSource,
    F: FnMut(&ProgressUpdate),
{
    let content_length = source.content_length();
    let mut tracker = ProgressTracker::new(
        content_length,
        settings.estimated_bytes,
        settings.progress_interval,
    );
    let mut chunks: Vec<Bytes> = Vec::new();

    while let Some(chunk) = source.next_chunk().await? {
        if chunk.is_empty() {
            continue;
        }
        let n = chunk.len() as u64;
        chunks.push(chunk);
        if let Some(update) = tracker.advance(n, clock.now()) {
            on_progress(&update);
        }
    }

    on_progress(&tracker.finish(clock.now()));

    if let Some(expected) = content_length {
        if expected != tracker.loaded() {
            debug!(expected, actual = tracker.loaded(), "body size differs from Content-Length");
        }
    }

    let mut body = BytesMut::with_capacity(tracker.loaded() as usize);
    for chunk in &chunks {
        body.extend_from_slice(chunk);
    }
    Ok(body.freeze())
}

/// Writes the payload next to its final name and renames it into place.
pub async fn save_download(dir: &Path, file_name: &str, body: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).await?;

    let output_path = dir.join(file_name);
    let partial_path = dir.join(format!("{file_name}.part"));

    if let Err(e) = fs::write(&partial_path, body).await {
        let _ = fs::remove_file(&partial_path).await;
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&partial_path, &output_path).await {
        let _ = fs::remove_file(&partial_path).await;
        return Err(e.into());
    }

    info!(path = %output_path.display(), bytes = body.len(), "download saved");
    Ok(output_path)
}
