//! Bounded-concurrency batch generation over a planned segment list.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;

use crate::client::AiClient;
use crate::constants::DEFAULT_CONCURRENCY;
use crate::core::{DetailImageSegment, GenerationState, ImageData};
use crate::credential::CredentialOverride;
use crate::error::AiError;

#[derive(Clone, Debug)]
pub struct SegmentProgress {
    pub id: String,
    pub index: usize,
    pub total: usize,
    pub state: GenerationState,
}

struct BoardInner {
    ids: Vec<String>,
    slots: Vec<Mutex<DetailImageSegment>>,
}

/// Shared, plan-ordered segment state. Each slot is locked independently:
/// workers on different segments never contend, and a consumer that
/// discards its handle mid-batch simply stops reading — in-flight workers
/// keep writing into their own clone of the board and finish quietly.
#[derive(Clone)]
pub struct SegmentBoard {
    inner: Arc<BoardInner>,
}

impl SegmentBoard {
    pub fn new(segments: Vec<DetailImageSegment>) -> Self {
        let ids = segments.iter().map(|s| s.id.clone()).collect();
        let slots = segments.into_iter().map(Mutex::new).collect();
        Self {
            inner: Arc::new(BoardInner { ids, slots }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    /// Copies in plan order, regardless of generation completion order.
    pub fn snapshot(&self) -> Vec<DetailImageSegment> {
        self.inner
            .slots
            .iter()
            .map(|slot| slot.lock().unwrap().clone())
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<DetailImageSegment> {
        let index = self.index_of(id)?;
        Some(self.inner.slots[index].lock().unwrap().clone())
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.inner.ids.iter().position(|known| known == id)
    }

    fn id_at(&self, index: usize) -> String {
        self.inner.ids[index].clone()
    }

    /// Atomically mark a segment `generating` and hand back a working copy.
    /// `None` means the segment should not be touched right now: it is
    /// already generating, or (unless forced) already has a good image.
    fn claim(&self, index: usize, force: bool) -> Option<DetailImageSegment> {
        let mut slot = self.inner.slots[index].lock().unwrap();
        if slot.state == GenerationState::Generating {
            return None;
        }
        if !force && slot.image_url.is_some() && slot.error_message.is_none() {
            return None;
        }
        slot.state = GenerationState::Generating;
        slot.error_message = None;
        Some(slot.clone())
    }

    /// Write the outcome back into the claimed slot only.
    fn finish(&self, index: usize, outcome: Result<String, AiError>) -> GenerationState {
        let mut slot = self.inner.slots[index].lock().unwrap();
        match outcome {
            Ok(image_url) => {
                slot.image_url = Some(image_url);
                slot.state = GenerationState::Idle;
                slot.error_message = None;
            }
            Err(err) => {
                slot.state = GenerationState::Error;
                slot.error_message = Some(err.to_string());
            }
        }
        slot.state
    }
}

/// Drives section-image generation for a board under a concurrency cap.
pub struct GenerationEngine {
    client: Arc<AiClient>,
    concurrency: usize,
    progress: Option<UnboundedSender<SegmentProgress>>,
}

impl GenerationEngine {
    pub fn new(client: Arc<AiClient>) -> Self {
        Self {
            client,
            concurrency: DEFAULT_CONCURRENCY,
            progress: None,
        }
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    pub fn with_progress(mut self, tx: UnboundedSender<SegmentProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Generate every pending or failed segment. Workers share a cursor and
    /// claim indexes with a fetch-and-increment, so no index is processed
    /// twice; segments that already carry a good image are skipped, which
    /// makes re-running a partially failed batch regenerate only the rest.
    /// All workers are joined before returning.
    pub async fn generate_all(
        &self,
        board: &SegmentBoard,
        reference_images: &[ImageData],
        overrides: Option<&CredentialOverride>,
    ) {
        let total = board.len();
        if total == 0 {
            return;
        }

        let cursor = Arc::new(AtomicUsize::new(0));
        let mut workers = JoinSet::new();
        for _ in 0..self.concurrency.min(total) {
            let cursor = Arc::clone(&cursor);
            let board = board.clone();
            let client = Arc::clone(&self.client);
            let reference_images = reference_images.to_vec();
            let overrides = overrides.cloned();
            let progress = self.progress.clone();
            workers.spawn(async move {
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    if index >= board.len() {
                        break;
                    }
                    process_segment(
                        &client,
                        &board,
                        index,
                        false,
                        &reference_images,
                        overrides.as_ref(),
                        progress.as_ref(),
                    )
                    .await;
                }
            });
        }
        while workers.join_next().await.is_some() {}
    }

    /// Regenerate one segment by id, touching nothing else. Safe to run
    /// while a batch is in flight on other segments. Returns whether the
    /// id was found on the board.
    pub async fn generate_one(
        &self,
        board: &SegmentBoard,
        id: &str,
        reference_images: &[ImageData],
        overrides: Option<&CredentialOverride>,
    ) -> bool {
        let Some(index) = board.index_of(id) else {
            return false;
        };
        process_segment(
            &self.client,
            board,
            index,
            true,
            reference_images,
            overrides,
            self.progress.as_ref(),
        )
        .await;
        true
    }
}

async fn process_segment(
    client: &AiClient,
    board: &SegmentBoard,
    index: usize,
    force: bool,
    reference_images: &[ImageData],
    overrides: Option<&CredentialOverride>,
    progress: Option<&UnboundedSender<SegmentProgress>>,
) {
    let Some(segment) = board.claim(index, force) else {
        return;
    };
    notify(progress, board, index, GenerationState::Generating);
    tracing::debug!(segment = %segment.id, index, "generating section image");

    let outcome = client
        .generate_section_image(&segment, reference_images, overrides)
        .await;
    if let Err(err) = &outcome {
        tracing::error!(segment = %segment.id, error = %err, "section image generation failed");
    }

    let state = board.finish(index, outcome);
    notify(progress, board, index, state);
}

fn notify(
    progress: Option<&UnboundedSender<SegmentProgress>>,
    board: &SegmentBoard,
    index: usize,
    state: GenerationState,
) {
    if let Some(tx) = progress {
        tx.send(SegmentProgress {
            id: board.id_at(index),
            index,
            total: board.len(),
            state,
        })
        .ok();
    }
}
