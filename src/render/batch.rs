//! Batch rendering on a bounded worker pool.
//!
//! Entries render in parallel on a dedicated rayon pool; results are
//! re-ordered before they reach the progress callback, so reporting always
//! advances in script order no matter which worker finishes first.
//!
//! ```text
//!  rayon pool ──(index, outcome)──► sync_channel ──► reorder buffer ──► progress
//!   entry 2 ✓                                         {2: ✓}
//!   entry 0 ✓                                         {} → report 0
//!   entry 1 ✗                                         {} → report 1, 2
//! ```
//!
//! A failed entry is logged and reported; it never stops the batch.

use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use super::{CanvasSink, EntryRenderer};
use crate::error::Result;
use crate::font::FontCache;
use crate::script::SubtitleEntry;
use crate::settings::RenderSettings;

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Written by the sink to this location.
    Rendered(PathBuf),
    /// Rendering or saving failed.
    Failed(String),
}

/// Outcome of one entry, in script order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    /// Position in the entry list.
    pub index: usize,
    pub id: String,
    pub original_tag: String,
    pub original_text: String,
    pub stem: String,
    pub outcome: EntryOutcome,
}

impl EntryReport {
    pub fn is_rendered(&self) -> bool {
        matches!(self.outcome, EntryOutcome::Rendered(_))
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub entries: Vec<EntryReport>,
}

impl BatchReport {
    pub fn rendered_count(&self) -> usize {
        self.entries.iter().filter(|r| r.is_rendered()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.rendered_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|r| !r.is_rendered())
    }

    /// Paths written, in script order.
    pub fn rendered_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.iter().filter_map(|r| match &r.outcome {
            EntryOutcome::Rendered(path) => Some(path),
            EntryOutcome::Failed(_) => None,
        })
    }

    pub fn all_rendered(&self) -> bool {
        self.failed_count() == 0
    }
}

/// File stems for `entries`, with `_2`, `_3`, … appended to repeats so that
/// no two entries overwrite each other.
pub fn unique_stems(entries: &[SubtitleEntry]) -> Vec<String> {
    let mut issued: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    entries
        .iter()
        .map(|entry| {
            let stem = entry.file_stem();
            if issued.insert(stem.clone()) {
                return stem;
            }
            // A renamed stem may itself be taken by a later entry's natural stem
            let suffix = next_suffix.entry(stem.clone()).or_insert(2);
            let renamed = loop {
                let candidate = format!("{stem}_{suffix}");
                *suffix += 1;
                if issued.insert(candidate.clone()) {
                    break candidate;
                }
            };
            tracing::warn!("duplicate file name '{}', saving as '{}'", stem, renamed);
            renamed
        })
        .collect()
}

/// Render every entry and hand each canvas to `sink`.
///
/// `jobs` bounds the worker pool; `None` uses the available parallelism.
/// `progress` sees each report as soon as all earlier entries are done.
/// Only failing to build the pool is an error; per-entry failures are in
/// the returned report.
pub fn render_batch(
    entries: &[SubtitleEntry],
    settings: &RenderSettings,
    fonts: &FontCache,
    sink: &dyn CanvasSink,
    jobs: Option<usize>,
    mut progress: impl FnMut(&EntryReport),
) -> Result<BatchReport> {
    let total = entries.len();
    if total == 0 {
        tracing::info!("no entries to render");
        return Ok(BatchReport::default());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.unwrap_or(0))
        .thread_name(|i| format!("sublayer-render-{i}"))
        .build()?;
    tracing::info!(entries = total, workers = pool.current_num_threads(), "rendering batch");

    let stems = unique_stems(entries);
    let renderer = EntryRenderer::new(settings, fonts);
    let buffer_cap = (pool.current_num_threads().max(1) * 4).min(256);
    let (tx, rx) = mpsc::sync_channel::<(usize, EntryOutcome)>(buffer_cap);

    let mut reports = Vec::with_capacity(total);

    thread::scope(|scope| {
        let pool = &pool;
        let stems = &stems;
        scope.spawn(move || {
            pool.install(|| {
                entries
                    .par_iter()
                    .enumerate()
                    .for_each_with(tx, |tx, (index, entry)| {
                        let outcome = render_one(&renderer, sink, entry, &stems[index]);
                        let _ = tx.send((index, outcome));
                    });
            });
        });

        let mut pending: BTreeMap<usize, EntryOutcome> = BTreeMap::new();
        let mut next = 0;
        while next < total {
            let Ok((index, outcome)) = rx.recv() else {
                break;
            };
            pending.insert(index, outcome);

            while let Some(outcome) = pending.remove(&next) {
                let entry = &entries[next];
                let report = EntryReport {
                    index: next,
                    id: entry.id.clone(),
                    original_tag: entry.original_tag.clone(),
                    original_text: entry.original_text.clone(),
                    stem: stems[next].clone(),
                    outcome,
                };
                progress(&report);
                reports.push(report);
                next += 1;
            }
        }
    });

    let report = BatchReport { entries: reports };
    tracing::info!(
        rendered = report.rendered_count(),
        failed = report.failed_count(),
        "batch finished"
    );
    Ok(report)
}

fn render_one(
    renderer: &EntryRenderer<'_>,
    sink: &dyn CanvasSink,
    entry: &SubtitleEntry,
    stem: &str,
) -> EntryOutcome {
    let result = renderer
        .render(entry)
        .and_then(|canvas| sink.store(stem, &canvas));
    match result {
        Ok(path) => EntryOutcome::Rendered(path),
        Err(e) => {
            tracing::error!(
                tag = %entry.original_tag,
                text = %entry.original_text,
                "failed to render entry: {}",
                e
            );
            EntryOutcome::Failed(e.to_string())
        }
    }
}
