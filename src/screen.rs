//! The in-memory side of a list-management screen.
//!
//! A `Screen` owns the cached list and its summary. Mutations go through
//! `idle -> submitting -> idle`; the list changes only once the backend
//! has confirmed the write, and the summary is recomputed from scratch
//! after every change.

use std::time::{Duration, Instant};

use crate::aggregate::Summarize;
use crate::backend::{Backend, ListQuery, PageInfo};
use crate::error::{CmsError, Result};
use crate::models::{Record, RecordId};
use crate::mutation::{apply_mutation, InsertPosition, Mutation};
use crate::search::{filter, Debouncer, SearchSequencer, SearchTicket, Searchable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

/// What the user asked for, already validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<D> {
    Create(D),
    Update(RecordId, D),
    Delete(RecordId),
}

/// Proof that `begin` succeeded; consumed by `resolve`.
#[derive(Debug)]
#[must_use]
pub struct InFlight(());

pub struct Screen<R: Record + Summarize> {
    records: Vec<R>,
    summary: R::Summary,
    page: PageInfo,
    phase: Phase,
    position: InsertPosition,
    search: SearchSequencer<R>,
    typing: Debouncer,
    last_error: Option<String>,
}

impl<R: Record + Summarize> Default for Screen<R> {
    fn default() -> Self {
        Self::new(InsertPosition::default())
    }
}

impl<R: Record + Summarize> Screen<R> {
    pub fn new(position: InsertPosition) -> Self {
        Self {
            records: Vec::new(),
            summary: R::summarize(&[]),
            page: PageInfo::default(),
            phase: Phase::Idle,
            position,
            search: SearchSequencer::default(),
            typing: Debouncer::default(),
            last_error: None,
        }
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.typing = Debouncer::new(delay);
        self
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn summary(&self) -> &R::Summary {
        &self.summary
    }

    pub fn page(&self) -> PageInfo {
        self.page
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn recompute(&mut self) {
        self.summary = R::summarize(&self.records);
    }

    /// Replace the cached list with a fresh fetch. On failure the old list
    /// stays on screen.
    pub fn load<B: Backend<R>>(&mut self, backend: &B, query: &ListQuery) -> Result<()> {
        match backend.fetch_list(query) {
            Ok(page) => {
                tracing::debug!(items = page.data.len(), total = page.pagination.total_items, "list loaded");
                self.records = page.data;
                self.page = page.pagination;
                self.last_error = None;
                self.recompute();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "list fetch failed");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Enter `Submitting`. Refused while another submission is in flight.
    pub fn begin(&mut self) -> Result<InFlight> {
        if self.phase == Phase::Submitting {
            return Err(CmsError::Busy);
        }
        self.phase = Phase::Submitting;
        Ok(InFlight(()))
    }

    /// Return to `Idle` with the backend's answer. Yields the id the
    /// confirmed mutation touched.
    pub fn resolve(&mut self, _in_flight: InFlight, outcome: Result<Mutation<R>>) -> Result<RecordId> {
        self.phase = Phase::Idle;
        match outcome {
            Ok(mutation) => {
                let id = mutation.id();
                tracing::debug!(kind = ?mutation.kind(), id, "mutation confirmed");
                let list = std::mem::take(&mut self.records);
                self.records = apply_mutation(list, mutation, self.position);
                self.last_error = None;
                self.recompute();
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "mutation failed, list left unchanged");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// `begin`, call the backend, `resolve`.
    pub fn submit<B: Backend<R>>(
        &mut self,
        backend: &B,
        submission: Submission<R::Draft>,
    ) -> Result<RecordId> {
        let in_flight = self.begin()?;
        let outcome = match submission {
            Submission::Create(draft) => backend.create(&draft).map(Mutation::Create),
            Submission::Update(id, draft) => backend.update(id, &draft).map(Mutation::Update),
            Submission::Delete(id) => backend.delete(id).map(|()| Mutation::Delete(id)),
        };
        self.resolve(in_flight, outcome)
    }

    pub fn find(&self, id: RecordId) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn begin_search(&mut self) -> SearchTicket {
        self.search.issue()
    }

    /// Show the response unless a newer one is already displayed.
    pub fn finish_search(&mut self, ticket: SearchTicket, outcome: Result<Vec<R>>) -> Result<bool> {
        match outcome {
            Ok(rows) => Ok(self.search.accept(ticket, rows)),
            Err(e) => {
                self.search.reject(ticket);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn search<B: Backend<R>>(&mut self, backend: &B, term: &str) -> Result<bool> {
        let ticket = self.begin_search();
        let outcome = backend.search(term);
        self.finish_search(ticket, outcome)
    }

    /// A keystroke in the search box. Nothing is sent until `poll_search`
    /// finds the input has gone quiet.
    pub fn type_search(&mut self, term: &str, now: Instant) {
        self.typing.input(term, now);
    }

    /// Run the pending search once the debounce delay has passed.
    /// `Ok(None)` means nothing was due yet.
    pub fn poll_search<B: Backend<R>>(&mut self, backend: &B, now: Instant) -> Result<Option<bool>> {
        match self.typing.poll(now) {
            Some(term) => self.search(backend, &term).map(Some),
            None => Ok(None),
        }
    }

    pub fn search_results(&self) -> Option<&[R]> {
        self.search.results()
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }
}

impl<R: Record + Summarize + Searchable> Screen<R> {
    /// Client-side filtered view of the cached list.
    pub fn visible(&self, term: &str) -> Vec<&R> {
        filter(&self.records, term)
    }
}
