//! Collection state for one page: the fetched items, where they came from and
//! whether a read is in flight.
//!
//! Every read is tagged with a [`Ticket`] carrying a generation number. Only the
//! newest ticket may settle the store; a response that arrives for an older
//! ticket is dropped, so a slow request the user already moved away from can
//! never overwrite the state of the current one.

use std::future::Future;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::store::derived::{self, Filterable, Query};

/// Anything that can be addressed by a server-side identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Settled,
}

/// The last failed read, kept next to the data it failed to replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for FetchFailure {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub locator: Option<String>,
    pub state: LoadState,
    pub error: Option<FetchFailure>,
    generation: u64,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            locator: None,
            state: LoadState::Idle,
            error: None,
            generation: 0,
        }
    }
}

impl<T> Snapshot<T> {
    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    locator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The collection was replaced with this many items.
    Applied(usize),
    /// A newer read was started before this one finished; its result was dropped.
    Superseded,
    /// The same locator was already being read; no second request was sent.
    AlreadyLoading,
}

pub struct ResourceStore<T> {
    state: watch::Sender<Snapshot<T>>,
}

impl<T> Default for ResourceStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourceStore<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.state.subscribe()
    }

    pub fn load_state(&self) -> LoadState {
        self.state.borrow().state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state() == LoadState::Loading
    }

    pub fn locator(&self) -> Option<String> {
        self.state.borrow().locator.clone()
    }

    pub fn error(&self) -> Option<FetchFailure> {
        self.state.borrow().error.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.state.borrow().items)
    }

    /// Forgets everything, including any read in flight.
    pub fn reset(&self) {
        self.state.send_modify(|s| {
            let generation = s.generation + 1;
            *s = Snapshot {
                generation,
                ..Snapshot::default()
            };
        });
    }

    /// Starts a read for `locator`. Returns `None` when that locator is already
    /// being read. Moving to a different locator empties the collection, since
    /// the old items belong to another scope.
    pub fn begin(&self, locator: &str) -> Option<Ticket> {
        let mut ticket = None;
        self.state.send_if_modified(|s| {
            if s.state == LoadState::Loading && s.locator.as_deref() == Some(locator) {
                return false;
            }
            if s.locator.as_deref() != Some(locator) {
                s.items.clear();
                s.locator = Some(locator.to_string());
            }
            s.generation += 1;
            s.state = LoadState::Loading;
            s.error = None;
            ticket = Some(Ticket {
                generation: s.generation,
                locator: locator.to_string(),
            });
            true
        });
        ticket
    }

    /// Finishes a read. Success replaces the collection in full; failure keeps
    /// the previous items and records the error. Stale tickets change nothing.
    pub fn settle(&self, ticket: Ticket, result: Result<Vec<T>>) -> Result<LoadOutcome> {
        let mut outcome = LoadOutcome::Superseded;
        let mut failure = None;

        self.state.send_if_modified(|s| {
            if s.generation != ticket.generation {
                return false;
            }
            s.state = LoadState::Settled;
            match result {
                Ok(items) => {
                    outcome = LoadOutcome::Applied(items.len());
                    s.items = items;
                    s.error = None;
                }
                Err(err) => {
                    s.error = Some(FetchFailure::from(&err));
                    failure = Some(err);
                }
            }
            true
        });

        if outcome == LoadOutcome::Superseded && failure.is_none() {
            debug!("Dropped superseded response for {}", ticket.locator);
        }
        match failure {
            Some(err) => {
                warn!("Fetch for {} failed: {}", ticket.locator, err);
                Err(err)
            }
            None => Ok(outcome),
        }
    }

    pub async fn load<Fut>(&self, locator: &str, fetch: Fut) -> Result<LoadOutcome>
    where
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let Some(ticket) = self.begin(locator) else {
            debug!("Read for {} already in flight", locator);
            return Ok(LoadOutcome::AlreadyLoading);
        };
        let result = fetch.await;
        self.settle(ticket, result)
    }

    /// Removes every item matching `predicate` and returns how many went.
    pub fn remove_where(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        self.state.send_if_modified(|s| {
            let before = s.items.len();
            s.items.retain(|item| !predicate(item));
            removed = before - s.items.len();
            removed > 0
        });
        removed
    }
}

impl<T: Clone> ResourceStore<T> {
    pub fn snapshot(&self) -> Snapshot<T> {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.state.borrow().items.clone()
    }
}

impl<T: Identified> ResourceStore<T> {
    /// Swaps in the server's copy of an item. Returns false when the item is
    /// not part of the current collection.
    pub fn replace_item(&self, item: T) -> bool {
        let mut replaced = false;
        self.state.send_if_modified(|s| {
            if let Some(slot) = s.items.iter_mut().find(|existing| existing.id() == item.id()) {
                *slot = item;
                replaced = true;
            }
            replaced
        });
        replaced
    }

    /// Applies a confirmed field change to the item with `id`.
    pub fn update_item(&self, id: &str, change: impl FnOnce(&mut T)) -> bool {
        let mut updated = false;
        self.state.send_if_modified(|s| {
            if let Some(item) = s.items.iter_mut().find(|item| item.id() == id) {
                change(item);
                updated = true;
            }
            updated
        });
        updated
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.borrow().items.iter().any(|item| item.id() == id)
    }
}

impl<T: Identified + Clone> ResourceStore<T> {
    pub fn get(&self, id: &str) -> Option<T> {
        self.state
            .borrow()
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }
}

impl<T: Filterable + Clone> ResourceStore<T> {
    /// Current projection of the collection under `query`.
    pub fn derive(&self, query: &Query<T::Status>) -> Vec<T> {
        derived::derive(&self.state.borrow().items, query)
            .into_iter()
            .cloned()
            .collect()
    }
}
