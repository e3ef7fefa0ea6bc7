//! Filter ownership and render broadcasting.
//!
//! Ownership model:
//! - `FilterController` owns the `RecordStore` (and through it the filter
//!   state); views never see the store directly.
//! - Every accepted mutation is followed by exactly one broadcast that hands
//!   each registered view the freshly filtered records.
//! - Views that want to change filters while rendering go through a
//!   `FilterRequests` handle; queued updates are applied one at a time after
//!   the in-flight broadcast finishes.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use crate::data::Respondent;
use crate::errors::SurveyError;
use crate::filter::{FilterState, FilterUpdate};
use crate::store::RecordStore;

/// Subscriber contract for anything that renders filtered data.
pub trait View: Send {
    /// Stable name used in logs.
    fn name(&self) -> &str;

    /// Called once with the full dataset when the view is registered.
    fn initialize(&mut self, _dataset: &[Respondent]) -> Result<(), SurveyError> {
        Ok(())
    }

    /// Called after every filter change with the filtered records and the
    /// current per-group response threshold.
    fn render(&mut self, records: &[&Respondent], min_responses: u64);
}

/// Adapter turning a closure into a [`View`].
pub struct CallbackView<F> {
    name: String,
    callback: F,
}

impl<F> CallbackView<F>
where
    F: FnMut(&[&Respondent], u64) + Send,
{
    /// Wrap `callback` as a view named `name`.
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<F> View for CallbackView<F>
where
    F: FnMut(&[&Respondent], u64) + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&mut self, records: &[&Respondent], min_responses: u64) {
        (self.callback)(records, min_responses)
    }
}

/// Position in the render cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CyclePhase {
    /// Waiting for the next mutation.
    Idle,
    /// Filter state written, broadcast not started yet.
    Mutated,
    /// Views are rendering.
    Broadcasting,
}

/// Cloneable handle for queueing filter updates from inside a render.
#[derive(Clone, Debug, Default)]
pub struct FilterRequests {
    queue: Arc<Mutex<VecDeque<FilterUpdate>>>,
}

impl FilterRequests {
    /// Queue an update; it is applied after the current broadcast completes.
    pub fn submit(&self, update: FilterUpdate) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(update);
    }

    /// Number of updates waiting to be applied.
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn pop(&self) -> Option<FilterUpdate> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

/// Single owner of the filter state; keeps every registered view in sync.
pub struct FilterController {
    store: RecordStore,
    views: Vec<Box<dyn View>>,
    requests: FilterRequests,
    phase: CyclePhase,
    broadcasts: u64,
}

impl FilterController {
    /// Controller with no views registered yet.
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            views: Vec::new(),
            requests: FilterRequests::default(),
            phase: CyclePhase::Idle,
            broadcasts: 0,
        }
    }

    /// Read access to the owned store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Current filter state.
    pub fn filter_state(&self) -> &FilterState {
        self.store.filter_state()
    }

    /// Current render-cycle phase.
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Number of completed broadcasts.
    pub fn broadcasts(&self) -> u64 {
        self.broadcasts
    }

    /// Number of registered views.
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Handle for queueing updates from views.
    pub fn requests(&self) -> FilterRequests {
        self.requests.clone()
    }

    /// Initialize `view` with the full dataset and subscribe it to broadcasts.
    pub fn register_view(&mut self, mut view: Box<dyn View>) -> Result<(), SurveyError> {
        view.initialize(self.store.records())?;
        debug!(view = view.name(), "[surveyscope:controller] view registered");
        self.views.push(view);
        Ok(())
    }

    /// Validate and apply `update`, then broadcast once.
    ///
    /// A rejected update leaves the filter state untouched and renders nothing.
    pub fn apply_filter(&mut self, update: FilterUpdate) -> Result<(), SurveyError> {
        self.store.apply(update)?;
        self.phase = CyclePhase::Mutated;
        self.broadcast();
        self.process_requests();
        Ok(())
    }

    /// Restore the domain-derived filters and broadcast once.
    pub fn reset(&mut self) {
        self.store.reset_filters();
        self.phase = CyclePhase::Mutated;
        self.broadcast();
        self.process_requests();
    }

    /// Broadcast the current state without mutating it (used for the first render).
    pub fn refresh(&mut self) {
        self.broadcast();
        self.process_requests();
    }

    /// Apply queued updates in submission order, one broadcast each.
    ///
    /// Invalid queued updates are dropped with a warning. Returns the number
    /// of updates that were applied.
    pub fn process_requests(&mut self) -> usize {
        let mut applied = 0;
        while let Some(update) = self.requests.pop() {
            match self.store.apply(update.clone()) {
                Ok(()) => {
                    self.phase = CyclePhase::Mutated;
                    self.broadcast();
                    applied += 1;
                }
                Err(err) => {
                    warn!(
                        ?update,
                        error = %err,
                        "[surveyscope:controller] dropping queued filter update"
                    );
                }
            }
        }
        applied
    }

    fn broadcast(&mut self) {
        self.phase = CyclePhase::Broadcasting;
        let records = self.store.filtered_records();
        let min_responses = self.store.min_responses();
        for view in self.views.iter_mut() {
            view.render(&records, min_responses);
        }
        self.broadcasts += 1;
        self.phase = CyclePhase::Idle;
        debug!(
            broadcast = self.broadcasts,
            records = records.len(),
            min_responses,
            views = self.views.len(),
            "[surveyscope:controller] broadcast complete"
        );
    }
}
