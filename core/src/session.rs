//! Query-time lifecycle of the search box.
//!
//! ```text
//! Idle --begin_loading--> Loading --finish_loading(Ok)--> Ready <--> Searching
//!                                 \--finish_loading(Err)--> Failed
//! ```
//!
//! `Failed` is terminal: the input stays disabled until the page is reloaded
//! (a new session). Once `Ready`, searches run synchronously against shared,
//! read-only data, so any number of threads may search at once.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::document::DocumentStore;
use crate::error::SessionError;
use crate::index::InvertedIndex;
use crate::persist::{self, IndexPaths};
use crate::render::{RenderedPage, Renderer};
use crate::search::{QueryEngine, SearchOutcome};
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Searching,
    Failed,
}

struct Loaded {
    engine: QueryEngine,
    store: DocumentStore,
    renderer: Renderer,
}

enum Phase {
    Idle,
    Loading,
    Ready(Arc<Loaded>),
    Failed(String),
}

/// A submitted query. Only the most recently submitted ticket gets results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
    query: String,
}

impl QueryTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

pub struct SearchSession {
    config: SearchConfig,
    phase: RwLock<Phase>,
    in_flight: AtomicUsize,
    latest: AtomicU64,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SearchSession {
    pub fn new(config: SearchConfig) -> Self {
        Self { config, phase: RwLock::new(Phase::Idle), in_flight: AtomicUsize::new(0), latest: AtomicU64::new(0) }
    }

    pub fn state(&self) -> SessionState {
        match &*self.phase.read() {
            Phase::Idle => SessionState::Idle,
            Phase::Loading => SessionState::Loading,
            Phase::Ready(_) if self.in_flight.load(Ordering::SeqCst) > 0 => SessionState::Searching,
            Phase::Ready(_) => SessionState::Ready,
            Phase::Failed(_) => SessionState::Failed,
        }
    }

    /// The query box only accepts input once both artifacts are loaded.
    pub fn input_enabled(&self) -> bool {
        matches!(self.state(), SessionState::Ready | SessionState::Searching)
    }

    pub fn failure_reason(&self) -> Option<String> {
        match &*self.phase.read() {
            Phase::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    pub fn begin_loading(&self) -> Result<(), SessionError> {
        let mut phase = self.phase.write();
        if !matches!(&*phase, Phase::Idle) {
            return Err(SessionError::InvalidTransition { from: state_of(&phase), action: "begin loading" });
        }
        *phase = Phase::Loading;
        Ok(())
    }

    /// Complete the fetch started by [`begin_loading`](Self::begin_loading).
    /// Both the index and the store must have arrived for search to turn on.
    pub fn finish_loading(
        &self,
        artifacts: anyhow::Result<(InvertedIndex, DocumentStore)>,
    ) -> Result<SessionState, SessionError> {
        let mut phase = self.phase.write();
        if !matches!(&*phase, Phase::Loading) {
            return Err(SessionError::InvalidTransition { from: state_of(&phase), action: "finish loading" });
        }
        match artifacts {
            Ok((index, store)) => {
                // One tokenizer for the whole session, configured exactly as
                // the index was built.
                let tokenizer = Arc::new(Tokenizer::new(index.tokenizer.clone()));
                tracing::info!(num_docs = index.num_docs(), num_terms = index.terms.len(), "search index loaded");
                let engine = QueryEngine::new(Arc::new(index), tokenizer.clone(), self.config.matching);
                let renderer = Renderer::new(self.config.render.clone(), tokenizer);
                *phase = Phase::Ready(Arc::new(Loaded { engine, store, renderer }));
                Ok(SessionState::Ready)
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "search index failed to load");
                *phase = Phase::Failed(format!("{err:#}"));
                Ok(SessionState::Failed)
            }
        }
    }

    /// Load both artifacts from disk.
    pub fn load(&self, paths: &IndexPaths) -> Result<SessionState, SessionError> {
        self.begin_loading()?;
        self.finish_loading(persist::load_artifacts(paths))
    }

    /// Raw ranked results, or `Unavailable` when no index is loaded.
    pub fn outcome(&self, query: &str) -> SearchOutcome {
        match self.loaded() {
            Some(loaded) => {
                let _guard = self.enter();
                SearchOutcome::Results(loaded.engine.search(query))
            }
            None => SearchOutcome::Unavailable,
        }
    }

    /// Register `query` as the latest one, superseding earlier tickets.
    pub fn submit(&self, query: impl Into<String>) -> QueryTicket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        QueryTicket { generation, query: query.into() }
    }

    /// Run a ticket. Returns `None` when a newer ticket was submitted while
    /// this one ran, so stale results never reach the screen.
    pub fn execute(&self, ticket: &QueryTicket) -> Option<RenderedPage> {
        let page = self.search(&ticket.query);
        if self.latest.load(Ordering::SeqCst) != ticket.generation {
            tracing::debug!(query = %ticket.query, "discarding results of superseded query");
            return None;
        }
        Some(page)
    }

    /// Search and render in one step.
    pub fn search(&self, query: &str) -> RenderedPage {
        let loaded = {
            let phase = self.phase.read();
            match &*phase {
                Phase::Ready(loaded) => loaded.clone(),
                Phase::Failed(_) => return self.unavailable_page(),
                Phase::Idle | Phase::Loading => {
                    return RenderedPage::Loading { message: self.config.render.loading_message.clone() }
                }
            }
        };
        let _guard = self.enter();
        let results = loaded.engine.search(query);
        loaded.renderer.render(&results, &loaded.store, query)
    }

    fn unavailable_page(&self) -> RenderedPage {
        RenderedPage::Unavailable { message: self.config.render.unavailable_message.clone() }
    }

    fn loaded(&self) -> Option<Arc<Loaded>> {
        match &*self.phase.read() {
            Phase::Ready(loaded) => Some(loaded.clone()),
            _ => None,
        }
    }

    fn enter(&self) -> InFlight<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlight(&self.in_flight)
    }
}

fn state_of(phase: &Phase) -> SessionState {
    match phase {
        Phase::Idle => SessionState::Idle,
        Phase::Loading => SessionState::Loading,
        Phase::Ready(_) => SessionState::Ready,
        Phase::Failed(_) => SessionState::Failed,
    }
}
