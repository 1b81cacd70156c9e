//! Explicit event emitter.
//!
//! Handlers are plain `Fn(&GridEvent)` closures. They are invoked outside
//! the adapter's state lock, in subscription order, so a handler may call
//! back into the adapter.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tabgrid_render::ColumnDef;
use tabgrid_types::{FilterDescriptor, PaginationState, RecordKey, ResponseEnvelope, Row, SortState};

/// Names of the events an adapter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Response,
    DataLoaded,
    LoadError,
    SortChange,
    Select,
    Deselect,
    DoubleClick,
    PagerUpdate,
    ColumnsChanged,
    FilterApplied,
    FilterCleared,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Response => "response",
            Self::DataLoaded => "dataLoaded",
            Self::LoadError => "loadError",
            Self::SortChange => "sortChange",
            Self::Select => "select",
            Self::Deselect => "deselect",
            Self::DoubleClick => "doubleClick",
            Self::PagerUpdate => "pagerUpdate",
            Self::ColumnsChanged => "columnsChanged",
            Self::FilterApplied => "filterApplied",
            Self::FilterCleared => "filterCleared",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// A load succeeded; carries the normalized envelope.
    Response(ResponseEnvelope),
    /// Rows were replaced by a load; fired right after `Response`.
    DataLoaded(ResponseEnvelope),
    LoadError {
        message: String,
        status: Option<u16>,
    },
    SortChange(SortState),
    Select {
        index: usize,
        key: Option<RecordKey>,
        record: Row,
    },
    Deselect,
    DoubleClick {
        index: usize,
        key: Option<RecordKey>,
        record: Row,
    },
    /// Pagination changed; `None` means the paginator should be hidden.
    PagerUpdate(Option<PaginationState>),
    ColumnsChanged(Vec<ColumnDef>),
    FilterApplied(FilterDescriptor),
    FilterCleared,
}

impl GridEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Response(_) => EventKind::Response,
            Self::DataLoaded(_) => EventKind::DataLoaded,
            Self::LoadError { .. } => EventKind::LoadError,
            Self::SortChange(_) => EventKind::SortChange,
            Self::Select { .. } => EventKind::Select,
            Self::Deselect => EventKind::Deselect,
            Self::DoubleClick { .. } => EventKind::DoubleClick,
            Self::PagerUpdate(_) => EventKind::PagerUpdate,
            Self::ColumnsChanged(_) => EventKind::ColumnsChanged,
            Self::FilterApplied(_) => EventKind::FilterApplied,
            Self::FilterCleared => EventKind::FilterCleared,
        }
    }
}

pub type EventHandler = Arc<dyn Fn(&GridEvent) + Send + Sync>;

/// Handle returned by [`EventEmitter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    kind: Option<EventKind>,
    handler: EventHandler,
}

#[derive(Default)]
pub struct EventEmitter {
    next_id: AtomicU64,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to every event.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&GridEvent) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(handler))
    }

    /// Subscribes to one kind of event.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&GridEvent) + Send + Sync + 'static,
    {
        self.register(Some(kind), Arc::new(handler))
    }

    fn register(&self, kind: Option<EventKind>, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscription { id, kind, handler });
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    pub fn emit(&self, event: &GridEvent) {
        let kind = event.kind();
        let handlers: Vec<EventHandler> = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.kind.is_none_or(|k| k == kind))
            .map(|s| Arc::clone(&s.handler))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
