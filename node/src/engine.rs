// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ordered event driver.
//!
//! Feeds decoded events through the compiler and applies each batch to the
//! in-memory index before the next event is compiled.
//!
//! # Invariants
//! - Per chain, applied positions are strictly increasing
//! - A batch is applied exactly once; events at or behind the cursor are
//!   recompiled and compared, never reapplied
//! - A failed compile leaves cursor and state untouched
//! - At most `replay_window` digests are kept per chain; older positions
//!   can no longer be verified and are rejected
//!
//! # Guarantees
//! - Same events + same port answers → same batches and same digests
//! - A replay whose digest differs is reported, not applied

use std::collections::VecDeque;
use std::time::Instant;

use indexer_kernel::changeset::{batch_digest, Changeset};
use indexer_kernel::event::EventPosition;
use indexer_kernel::ports::{ChainReader, ContentFetcher, PriceFeed};
use indexer_kernel::state::IndexState;
use indexer_kernel::types::id::ChainId;
use indexer_kernel::{Compiler, EventRecord, Ports};
use rustc_hash::FxHashMap;

use crate::errors::NodeError;
use crate::telemetry::{CHANGESETS_EMITTED, COMPILE_DURATION, EVENTS_PROCESSED, EVENTS_REPLAYED, REPLAY_DIVERGENCE};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied(Vec<Changeset>),
    Replayed { diverged: bool },
}

pub const DEFAULT_REPLAY_WINDOW: usize = 4096;

pub struct Indexer<C, F, P> {
    chain: C,
    content: F,
    prices: P,
    state: IndexState,
    cursors: FxHashMap<ChainId, EventPosition>,
    /// Most recent applied positions per chain, oldest first.
    digests: FxHashMap<ChainId, VecDeque<(EventPosition, [u8; 32])>>,
    replay_window: usize,
}

impl<C, F, P> Indexer<C, F, P>
where
    C: ChainReader,
    F: ContentFetcher,
    P: PriceFeed,
{
    pub fn new(chain: C, content: F, prices: P) -> Self {
        Self {
            chain,
            content,
            prices,
            state: IndexState::new(),
            cursors: FxHashMap::default(),
            digests: FxHashMap::default(),
            replay_window: DEFAULT_REPLAY_WINDOW,
        }
    }

    /// Number of recent events per chain whose replays can be verified.
    pub fn with_replay_window(mut self, window: usize) -> Self {
        self.replay_window = window.max(1);
        self
    }

    pub fn state(&self) -> &IndexState {
        &self.state
    }

    /// Last applied position on `chain_id`.
    pub fn cursor(&self, chain_id: ChainId) -> Option<EventPosition> {
        self.cursors.get(&chain_id).copied()
    }

    pub fn retained_digests(&self, chain_id: ChainId) -> usize {
        self.digests.get(&chain_id).map_or(0, VecDeque::len)
    }

    pub async fn process(&mut self, event: &EventRecord) -> Result<Outcome, NodeError> {
        let chain_id = event.chain_id;
        let position = event.position();

        if let Some(cursor) = self.cursor(chain_id).filter(|c| position <= *c) {
            let expected = self.recorded_digest(chain_id, position, cursor)?;
            return self.replay(event, expected).await;
        }

        let batch = self.compile(event).await?;
        let digest = batch_digest(&batch)?;
        self.state.apply_batch(&batch);
        self.cursors.insert(chain_id, position);

        let window = self.digests.entry(chain_id).or_default();
        window.push_back((position, digest));
        while window.len() > self.replay_window {
            window.pop_front();
        }

        metrics::increment_counter!(EVENTS_PROCESSED);
        metrics::counter!(CHANGESETS_EMITTED, batch.len() as u64);
        tracing::debug!("Applied {} changesets for {} at {}", batch.len(), event.event_name, position);
        Ok(Outcome::Applied(batch))
    }

    fn recorded_digest(
        &self,
        chain_id: ChainId,
        position: EventPosition,
        cursor: EventPosition,
    ) -> Result<[u8; 32], NodeError> {
        let window = self.digests.get(&chain_id);
        if let Some(&(oldest, _)) = window.and_then(VecDeque::front) {
            if position < oldest {
                return Err(NodeError::BeyondReplayWindow { chain_id, position, oldest });
            }
        }
        window
            .and_then(|w| w.binary_search_by_key(&position, |(p, _)| *p).ok().map(|i| w[i].1))
            .ok_or(NodeError::OutOfOrder { chain_id, position, cursor })
    }

    async fn replay(&self, event: &EventRecord, expected: [u8; 32]) -> Result<Outcome, NodeError> {
        let batch = self.compile(event).await?;
        metrics::increment_counter!(EVENTS_REPLAYED);

        let diverged = batch_digest(&batch)? != expected;
        if diverged {
            metrics::increment_counter!(REPLAY_DIVERGENCE);
            tracing::warn!(
                "Replay of {} on chain {} at {} diverged from the applied batch",
                event.event_name,
                event.chain_id,
                event.position()
            );
        } else {
            tracing::debug!("Replay of {} at {} matched", event.event_name, event.position());
        }
        Ok(Outcome::Replayed { diverged })
    }

    async fn compile(&self, event: &EventRecord) -> Result<Vec<Changeset>, NodeError> {
        let start = Instant::now();
        let result = Compiler::new(Ports::new(&self.chain, &self.content, &self.state, &self.prices))
            .compile(event)
            .await;
        metrics::histogram!(COMPILE_DURATION, start.elapsed().as_secs_f64());
        Ok(result?)
    }
}
