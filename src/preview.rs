//! # Live Preview Worker
//!
//! Renders a single entry in the background while settings are being edited,
//! showing only the newest result.
//!
//! ## Flow
//!
//! ```text
//! caller ──request()──► watch<(generation, request)> ──► worker task
//!                                                          │ debounce
//!                                                          │ spawn_blocking(render)
//!                                                          │ newer request arrived? → discard
//! caller ◄──frames()─── watch<PreviewFrame> ◄──────────────┘
//! ```
//!
//! Every request gets the next generation number. `request()` never blocks:
//! it overwrites whatever request is still waiting. A finished frame is
//! published only if its generation is still the latest, so a slow render
//! can never replace a newer one.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sublayer::font::FontCache;
//! use sublayer::preview::{PreviewRequest, spawn_preview_worker};
//! use sublayer::settings::RenderSettings;
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let preview = spawn_preview_worker(Arc::new(FontCache::block()), Duration::ZERO);
//! let generation = preview.request(PreviewRequest::new(
//!     Arc::new(RenderSettings::default()),
//!     "Hello",
//!     Some("Hi"),
//! ));
//! let frame = preview.wait_for(generation).await.unwrap();
//! assert_eq!(frame.generation, generation);
//! # }
//! ```

use image::RgbaImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::font::FontCache;
use crate::render::EntryRenderer;
use crate::script::SubtitleEntry;
use crate::settings::RenderSettings;

/// Tag given to the entry rendered for a preview.
const PREVIEW_TAG: &str = "preview";

/// Text and settings to preview.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub settings: Arc<RenderSettings>,
    pub original: String,
    pub translation: Option<String>,
}

impl PreviewRequest {
    pub fn new(
        settings: Arc<RenderSettings>,
        original: impl Into<String>,
        translation: Option<impl Into<String>>,
    ) -> Self {
        Self {
            settings,
            original: original.into(),
            translation: translation.map(Into::into),
        }
    }

    fn entry(&self) -> SubtitleEntry {
        let entry = SubtitleEntry::standalone(PREVIEW_TAG, PREVIEW_TAG, self.original.clone());
        match &self.translation {
            Some(text) => entry.with_translation(format!("{PREVIEW_TAG}ch"), text.clone()),
            None => entry,
        }
    }
}

/// A finished preview.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    /// Generation of the request this frame answers.
    pub generation: u64,
    /// The rendered canvas, or why rendering failed.
    pub result: std::result::Result<Arc<RgbaImage>, String>,
}

type Pending = Option<(u64, PreviewRequest)>;

/// Caller side of a preview worker.
///
/// Dropping the handle stops the worker.
#[derive(Debug)]
pub struct PreviewHandle {
    requests: watch::Sender<Pending>,
    frames: watch::Receiver<Option<PreviewFrame>>,
    latest: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl PreviewHandle {
    /// Queue a preview, superseding any request not yet started.
    ///
    /// Returns the request's generation number.
    pub fn request(&self, request: PreviewRequest) -> u64 {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        self.requests.send_replace(Some((generation, request)));
        tracing::trace!(generation, "preview requested");
        generation
    }

    /// Generation of the newest request so far (0 before the first).
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Most recently published frame.
    pub fn latest_frame(&self) -> Option<PreviewFrame> {
        self.frames.borrow().clone()
    }

    /// Receiver that changes whenever a frame is published.
    pub fn frames(&self) -> watch::Receiver<Option<PreviewFrame>> {
        self.frames.clone()
    }

    /// Wait until a frame for `generation` or a newer request is published.
    ///
    /// `None` if the worker stopped first.
    pub async fn wait_for(&self, generation: u64) -> Option<PreviewFrame> {
        let mut frames = self.frames.clone();
        let frame = frames
            .wait_for(|frame| frame.as_ref().is_some_and(|f| f.generation >= generation))
            .await
            .ok()?;
        (*frame).clone()
    }

    /// Whether the worker task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start a preview worker on the current tokio runtime.
///
/// `debounce` is how long the worker waits after a change before rendering,
/// so a burst of edits costs one render.
pub fn spawn_preview_worker(fonts: Arc<FontCache>, debounce: Duration) -> PreviewHandle {
    let (requests, requests_rx) = watch::channel::<Pending>(None);
    let (frames_tx, frames) = watch::channel(None);
    let latest = Arc::new(AtomicU64::new(0));

    let task = tokio::spawn(run_worker(
        requests_rx,
        frames_tx,
        Arc::clone(&latest),
        fonts,
        debounce,
    ));

    PreviewHandle {
        requests,
        frames,
        latest,
        task,
    }
}

async fn run_worker(
    mut requests: watch::Receiver<Pending>,
    frames: watch::Sender<Option<PreviewFrame>>,
    latest: Arc<AtomicU64>,
    fonts: Arc<FontCache>,
    debounce: Duration,
) {
    tracing::debug!("preview worker started");

    while requests.changed().await.is_ok() {
        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }

        let Some((generation, request)) = requests.borrow_and_update().clone() else {
            continue;
        };

        let fonts = Arc::clone(&fonts);
        let rendered = tokio::task::spawn_blocking(move || render_request(&fonts, &request)).await;
        let result = match rendered {
            Ok(Ok(canvas)) => Ok(Arc::new(canvas)),
            Ok(Err(e)) => {
                tracing::warn!(generation, "preview render failed: {}", e);
                Err(e.to_string())
            }
            Err(e) => Err(format!("preview task failed: {e}")),
        };

        if generation != latest.load(Ordering::Acquire) {
            tracing::debug!(generation, "discarding stale preview");
            continue;
        }
        frames.send_replace(Some(PreviewFrame { generation, result }));
    }

    tracing::debug!("preview worker stopped");
}

fn render_request(fonts: &FontCache, request: &PreviewRequest) -> Result<RgbaImage> {
    EntryRenderer::new(&request.settings, fonts).render(&request.entry())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontBackend, FontLocator};
    use crate::settings::Resolution;

    fn small_settings() -> Arc<RenderSettings> {
        let mut settings = RenderSettings::default();
        settings.resolution = Resolution::new(200, 100).unwrap();
        Arc::new(settings)
    }

    #[tokio::test]
    async fn test_single_request_is_rendered() {
        let preview = spawn_preview_worker(Arc::new(FontCache::block()), Duration::ZERO);
        let generation = preview.request(PreviewRequest::new(small_settings(), "Hello", None::<String>));
        assert_eq!(generation, 1);

        let frame = preview.wait_for(generation).await.unwrap();
        assert_eq!(frame.generation, 1);
        let canvas = frame.result.unwrap();
        assert_eq!(canvas.dimensions(), (200, 100));
    }

    #[tokio::test]
    async fn test_burst_shows_only_the_newest() {
        let preview = spawn_preview_worker(Arc::new(FontCache::block()), Duration::from_millis(50));
        let mut last = 0;
        for text in ["H", "He", "Hel", "Hell", "Hello"] {
            last = preview.request(PreviewRequest::new(small_settings(), text, None::<String>));
        }
        assert_eq!(last, 5);

        let frame = preview.wait_for(last).await.unwrap();
        assert_eq!(frame.generation, 5);
        assert!(frame.result.is_ok());
    }

    #[tokio::test]
    async fn test_frames_never_go_backwards() {
        let preview = spawn_preview_worker(Arc::new(FontCache::block()), Duration::ZERO);
        let mut frames = preview.frames();
        let mut seen = Vec::new();

        for i in 0..5 {
            preview.request(PreviewRequest::new(small_settings(), format!("text {i}"), Some("t")));
        }
        while seen.last() != Some(&5) {
            frames.changed().await.unwrap();
            if let Some(frame) = frames.borrow_and_update().as_ref() {
                seen.push(frame.generation);
            }
        }
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "{seen:?}");
    }

    #[tokio::test]
    async fn test_render_failure_is_reported() {
        let fonts = FontCache::with_backend(FontBackend::Truetype(FontLocator::new(vec![], vec![])));
        let preview = spawn_preview_worker(Arc::new(fonts), Duration::ZERO);
        let generation = preview.request(PreviewRequest::new(small_settings(), "Hello", None::<String>));

        let frame = preview.wait_for(generation).await.unwrap();
        assert!(frame.result.unwrap_err().contains("No usable font"));
    }

    #[tokio::test]
    async fn test_no_frame_before_first_request() {
        let preview = spawn_preview_worker(Arc::new(FontCache::block()), Duration::ZERO);
        assert_eq!(preview.latest_generation(), 0);
        assert!(preview.latest_frame().is_none());
    }
}
