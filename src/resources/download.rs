//! Streaming asset download with coarse progress reporting.
//!
//! The model is the only asset whose progress the user sees. Its bytes are
//! read chunk by chunk into a [`Download`], and every chunk yields a
//! [`LoadEvent::Progress`]. Natively the chunks come from a file under
//! `./assets/`, on the web from a streamed reqwest response.

use std::fmt::Debug;

use crate::data_structures::scene_graph::SceneNode;

/// One step of an asynchronous model load.
///
/// A load emits any number of `Progress` events followed by exactly one
/// `Loaded` or `Failed`.
pub enum LoadEvent {
    Progress { loaded: u64, total: Option<u64> },
    Loaded(Box<dyn SceneNode>),
    Failed(anyhow::Error),
}

impl Debug for LoadEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Progress { loaded, total } => f
                .debug_struct("Progress")
                .field("loaded", loaded)
                .field("total", total)
                .finish(),
            Self::Loaded(model) => f.debug_tuple("Loaded").field(&model.name()).finish(),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

/// Where the model load currently stands, as seen by the viewer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Pending,
    Progress(u32),
    Loaded,
    Failed(String),
}

/// `round(loaded / total * 100)`, never above 100. `None` when the total is unknown.
pub fn progress_percent(loaded: u64, total: Option<u64>) -> Option<u32> {
    match total {
        Some(total) if total > 0 => {
            let percent = (loaded as f64 / total as f64 * 100.0).round();
            Some(percent.min(100.0) as u32)
        }
        _ => None,
    }
}

/// Accumulates the chunks of one download.
#[derive(Debug, Default)]
pub struct Download {
    data: Vec<u8>,
    total: Option<u64>,
}

impl Download {
    pub fn new(total: Option<u64>) -> Self {
        Self {
            data: Vec::with_capacity(total.unwrap_or(0).min(256 * 1024 * 1024) as usize),
            total,
        }
    }

    /// Appends a chunk and returns the progress event describing the new state.
    pub fn push(&mut self, chunk: &[u8]) -> LoadEvent {
        self.data.extend_from_slice(chunk);
        LoadEvent::Progress {
            loaded: self.data.len() as u64,
            total: self.total,
        }
    }

    pub fn loaded(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(not(target_arch = "wasm32"))]
const CHUNK_SIZE: usize = 64 * 1024;

/// Fetches `file_name` from the asset root, reporting progress per chunk.
pub async fn fetch_with_progress(
    file_name: &str,
    report: &mut (dyn FnMut(LoadEvent) + Send),
) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    {
        use futures::StreamExt;

        let url = crate::resources::texture::format_url(file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        let mut download = Download::new(response.content_length());
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            report(download.push(&chunk?));
        }
        Ok(download.into_bytes())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use anyhow::Context as _;
        use tokio::io::AsyncReadExt;

        let path = crate::resources::texture::asset_path(file_name);
        let mut file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("cannot open {}", path.display()))?;
        let total = file.metadata().await.ok().map(|m| m.len());
        let mut download = Download::new(total);
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let read = file.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            report(download.push(&buf[..read]));
        }
        Ok(download.into_bytes())
    }
}
