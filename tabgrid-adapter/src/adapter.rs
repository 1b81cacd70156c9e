//! The grid data adapter.
//!
//! Owns the page, sort and filter state of one grid, runs the request
//! cycle against a [`RequestBuilder`] and a [`GridTransport`], and mirrors
//! the server's metadata, rows and pager. Every method takes `&self`; state
//! sits behind a short synchronous lock that is never held across an
//! `.await`, so several loads may be in flight at once. Events are emitted
//! after the lock is released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tabgrid_filter::{create_predicate, RowPredicate};
use tabgrid_render::{build_columns, ColumnDef};
use tabgrid_types::{
    Breadcrumbs, ColumnMetadata, FilterDescriptor, FilterState, PaginationState, RecordKey,
    ResponseEnvelope, Row, SortOrder, SortState,
};
use tracing::{debug, info, warn};

use crate::config::AdapterConfig;
use crate::error::{GridError, GridResult};
use crate::events::{EventEmitter, EventKind, GridEvent, SubscriptionId};
use crate::request::{LoadOptions, RequestBuilder, RequestParams, RequestShape};
use crate::selection::SelectionMirror;
use crate::transport::{GridRequest, GridTransport};

/// How a successful response is folded into state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadMode {
    /// Full replace: columns are rebuilt whenever `meta` is present.
    Replace,
    /// Page navigation with an unchanged request shape: columns are only
    /// rebuilt when `meta` differs from what is shown.
    Navigate,
}

struct PreparedLoad {
    page: u64,
    mode: LoadMode,
    shape: RequestShape,
    request: GridRequest,
}

#[derive(Default)]
struct GridState {
    metadata: Option<ColumnMetadata>,
    columns: Vec<ColumnDef>,
    rows: Vec<Row>,
    pagination: Option<PaginationState>,
    breadcrumbs: Option<Breadcrumbs>,
    selection: SelectionMirror,
    sort: SortState,
    filter: FilterState,
    client_filter: Option<(FilterDescriptor, RowPredicate)>,
    last_requested_page: Option<u64>,
    last_full_shape: Option<RequestShape>,
}

impl GridState {
    fn key_field(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(ColumnMetadata::key_field)
    }

    fn last_known_page(&self) -> Option<u64> {
        self.pagination
            .map(|p| p.current_page)
            .filter(|page| *page >= 1)
            .or(self.last_requested_page)
    }

    fn selected_index(&self) -> Option<usize> {
        self.selection.resolve(&self.rows, self.key_field())
    }

    fn select_event(&self, index: usize) -> Option<GridEvent> {
        let record = self.rows.get(index)?.clone();
        let key = self
            .key_field()
            .and_then(|field| RecordKey::of_row(&record, field));
        Some(GridEvent::Select { index, key, record })
    }

    fn replace_metadata(&mut self, metadata: ColumnMetadata) -> GridEvent {
        self.columns = build_columns(&metadata);
        self.metadata = Some(metadata);
        GridEvent::ColumnsChanged(self.columns.clone())
    }
}

/// Headless grid data adapter.
pub struct GridAdapter {
    config: AdapterConfig,
    builder: Arc<dyn RequestBuilder>,
    transport: Arc<dyn GridTransport>,
    events: EventEmitter,
    state: Mutex<GridState>,
}

impl GridAdapter {
    pub fn new(
        config: AdapterConfig,
        builder: Arc<dyn RequestBuilder>,
        transport: Arc<dyn GridTransport>,
    ) -> Self {
        Self {
            config,
            builder,
            transport,
            events: EventEmitter::new(),
            state: Mutex::new(GridState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GridState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit_all(&self, events: Vec<GridEvent>) {
        for event in &events {
            self.events.emit(event);
        }
    }

    /// The configuration the adapter was created with.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// The builder that turns grid state into request URLs and bodies.
    pub fn builder(&self) -> &Arc<dyn RequestBuilder> {
        &self.builder
    }

    /// The transport requests are sent through. Row actions reuse it.
    pub fn transport(&self) -> &Arc<dyn GridTransport> {
        &self.transport
    }

    /// The emitter all grid events go through.
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    /// Shorthand for `events().subscribe(..)`.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&GridEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }

    /// Shorthand for `events().on(..)`.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&GridEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, handler)
    }

    /// Removes a handler. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ── Request cycle ────────────────────────────────────────────

    /// Full replace-data cycle.
    ///
    /// `page` is used literally (only `0` is lifted to `1`); without it the
    /// last known page is reloaded. On failure a `loadError` event is
    /// emitted and no state changes.
    pub async fn load(
        &self,
        page: Option<u64>,
        options: LoadOptions,
    ) -> GridResult<ResponseEnvelope> {
        let prepared = self.prepare(page, &options, false)?;
        self.execute(prepared).await
    }

    /// Page navigation.
    ///
    /// When the request shape (sort, filter and overrides) matches the last
    /// full load, columns are left alone unless the server sends different
    /// metadata. Otherwise, or with `force_reload`, this is a full load.
    pub async fn set_page(
        &self,
        page: Option<u64>,
        options: LoadOptions,
    ) -> GridResult<ResponseEnvelope> {
        let prepared = self.prepare(page, &options, true)?;
        self.execute(prepared).await
    }

    fn prepare(
        &self,
        page: Option<u64>,
        options: &LoadOptions,
        navigate: bool,
    ) -> GridResult<PreparedLoad> {
        let (page, shape, mode) = {
            let state = self.lock();
            let page = page
                .map(|p| p.max(1))
                .or_else(|| state.last_known_page())
                .unwrap_or_else(|| self.config.default_page.max(1));
            let shape = RequestShape {
                sort: options.sort.clone().unwrap_or_else(|| state.sort.clone()),
                filter: options
                    .filter
                    .clone()
                    .unwrap_or_else(|| state.filter.clone()),
                url: options.url.clone().filter(|url| !url.trim().is_empty()),
                post_body: options.post_body.clone(),
            };
            let incremental = navigate
                && !options.force_reload
                && state.last_full_shape.as_ref() == Some(&shape);
            let mode = if incremental {
                LoadMode::Navigate
            } else {
                LoadMode::Replace
            };
            (page, shape, mode)
        };

        let params = RequestParams {
            page,
            sort: shape.sort.clone(),
            filter: shape.filter.clone(),
        };
        let built = self.builder.build(&params);
        let url = shape
            .url
            .clone()
            .or_else(|| built.as_ref().map(|b| b.url.clone()))
            .filter(|url| !url.trim().is_empty())
            .ok_or(GridError::NoUrl)?;
        let body = shape
            .post_body
            .clone()
            .or_else(|| built.map(|b| b.body))
            .unwrap_or_default();

        Ok(PreparedLoad {
            page,
            mode,
            shape,
            request: GridRequest::post(url, body),
        })
    }

    async fn execute(&self, prepared: PreparedLoad) -> GridResult<ResponseEnvelope> {
        debug!(
            url = %prepared.request.url,
            page = prepared.page,
            mode = ?prepared.mode,
            "loading grid page"
        );

        match self.fetch(prepared.request.clone()).await {
            Ok(envelope) => {
                let events = self.apply(&envelope, &prepared);
                info!(
                    page = prepared.page,
                    rows = envelope.data.len(),
                    "grid page loaded"
                );
                self.emit_all(events);
                Ok(envelope)
            }
            Err(err) => {
                warn!(url = %prepared.request.url, error = %err, "grid load failed");
                let status = match &err {
                    GridError::Status { status, .. } => Some(*status),
                    _ => None,
                };
                self.events.emit(&GridEvent::LoadError {
                    message: err.to_string(),
                    status,
                });
                Err(err)
            }
        }
    }

    async fn fetch(&self, request: GridRequest) -> GridResult<ResponseEnvelope> {
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(GridError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(ResponseEnvelope::from_body(&response.body)?)
    }

    /// Folds a successful response into state and returns the events to emit.
    fn apply(&self, envelope: &ResponseEnvelope, prepared: &PreparedLoad) -> Vec<GridEvent> {
        let mut events = Vec::new();
        let mut state = self.lock();

        if let Some(meta) = &envelope.meta {
            let changed = state.metadata.as_ref() != Some(meta);
            if prepared.mode == LoadMode::Replace || changed {
                events.push(state.replace_metadata(meta.clone()));
            }
        } else {
            debug!("response carried no metadata, keeping columns");
        }

        let pagination = envelope.pager.as_ref().map(|pager| {
            let mut next = PaginationState::merged(state.pagination.as_ref(), pager);
            if next.current_page == 0 {
                next.current_page = prepared.page;
            }
            // Only pages before the last are known to be full.
            let full_page = (next.has_next() && !envelope.data.is_empty())
                .then_some(envelope.data.len() as u64);
            next.with_page_size(full_page)
        });
        if pagination != state.pagination {
            state.pagination = pagination;
            events.push(GridEvent::PagerUpdate(pagination));
        }

        let previous = state
            .selected_index()
            .and_then(|index| state.rows.get(index).cloned());
        state.rows = envelope.data.clone();
        state.breadcrumbs = envelope.breadcrumbs.clone();
        state.last_requested_page = Some(prepared.page);
        if prepared.mode == LoadMode::Replace {
            state.last_full_shape = Some(prepared.shape.clone());
        }

        if self.config.selectable {
            let GridState {
                rows,
                metadata,
                selection,
                ..
            } = &mut *state;
            let key_field = metadata.as_ref().and_then(ColumnMetadata::key_field);
            let resolved = selection.reapply(rows, key_field, self.config.auto_select_first);
            match resolved {
                Some(index) => {
                    if previous.as_ref() != state.rows.get(index) {
                        events.extend(state.select_event(index));
                    }
                }
                None if previous.is_some() => events.push(GridEvent::Deselect),
                None => {}
            }
        }

        events.push(GridEvent::Response(envelope.clone()));
        events.push(GridEvent::DataLoaded(envelope.clone()));
        events
    }

    // ── Metadata ─────────────────────────────────────────────────

    /// Replaces column metadata and rebuilds column definitions.
    /// Calling it again with the same metadata yields the same columns.
    pub fn set_metadata(&self, metadata: ColumnMetadata) {
        let event = self.lock().replace_metadata(metadata);
        self.events.emit(&event);
    }

    /// Column metadata from the last response or `set_metadata`.
    pub fn metadata(&self) -> Option<ColumnMetadata> {
        self.lock().metadata.clone()
    }

    /// Display-ready column definitions built from the metadata.
    pub fn columns(&self) -> Vec<ColumnDef> {
        self.lock().columns.clone()
    }

    /// The field flagged as the record key, if any.
    pub fn key_field(&self) -> Option<String> {
        self.lock().key_field().map(str::to_string)
    }

    // ── Filter and sort state ────────────────────────────────────

    /// Sets a free-text server filter. A blank query clears the filter.
    /// No request is made.
    pub fn set_filter_query(&self, query: impl Into<String>) {
        self.lock().filter = FilterState::query(query);
    }

    /// Switches to structured server filters. An empty list clears the filter.
    pub fn set_filters(&self, filters: Vec<FilterDescriptor>) {
        self.lock().filter = FilterState::structured(filters);
    }

    /// Removes any server filter. No request is made.
    pub fn clear_filter(&self) {
        self.lock().filter = FilterState::None;
    }

    /// Current server filter.
    pub fn filter(&self) -> FilterState {
        self.lock().filter.clone()
    }

    /// Sets the sort. No request is made.
    pub fn set_sort(&self, field: impl Into<String>, order: SortOrder) {
        self.lock().sort = SortState::new(field, order);
    }

    /// Removes the sort. No request is made.
    pub fn clear_sort(&self) {
        self.lock().sort = SortState::none();
    }

    /// Current sort.
    pub fn sort(&self) -> SortState {
        self.lock().sort.clone()
    }

    /// Header click: cycles `none -> asc -> desc -> none` on a sortable
    /// column and emits `sortChange`. Returns `false` for unknown or
    /// unsortable fields.
    pub fn toggle_sort(&self, field: &str) -> bool {
        let next = {
            let mut state = self.lock();
            let sortable = state
                .metadata
                .as_ref()
                .and_then(|meta| meta.get(field))
                .is_some_and(|meta| meta.sortable);
            if !sortable {
                debug!(field, "ignoring sort toggle on unsortable field");
                return false;
            }
            state.sort = state.sort.cycled(field);
            state.sort.clone()
        };
        self.events.emit(&GridEvent::SortChange(next));
        true
    }

    // ── Rows and pagination ──────────────────────────────────────

    /// Rows of the current page, in server order.
    pub fn rows(&self) -> Vec<Row> {
        self.lock().rows.clone()
    }

    /// Whether the current page has no rows.
    pub fn is_empty(&self) -> bool {
        self.lock().rows.is_empty()
    }

    /// Pager mirror, or `None` when the last response had no pager.
    pub fn pagination(&self) -> Option<PaginationState> {
        self.lock().pagination
    }

    /// Breadcrumbs from the last response.
    pub fn breadcrumbs(&self) -> Option<Breadcrumbs> {
        self.lock().breadcrumbs.clone()
    }

    /// Drops rows and selection without a request.
    pub fn clear(&self) {
        let had_selection = {
            let mut state = self.lock();
            let had_selection = state.selected_index().is_some();
            state.rows.clear();
            state.selection.clear();
            had_selection
        };
        if had_selection {
            self.events.emit(&GridEvent::Deselect);
        }
    }

    /// Replaces the row with the same key, or appends the record when no
    /// row has that key. Returns `false` when the record carries no key
    /// value or no key field is declared.
    pub fn update_record(&self, record: Row) -> bool {
        let mut state = self.lock();
        let Some(field) = state.key_field().map(str::to_string) else {
            return false;
        };
        let Some(key) = RecordKey::of_row(&record, &field) else {
            return false;
        };
        match state
            .rows
            .iter()
            .position(|row| RecordKey::of_row(row, &field).as_ref() == Some(&key))
        {
            Some(index) => state.rows[index] = record,
            None => state.rows.push(record),
        }
        true
    }

    /// Removes the row with `key`. Clears the selection if it pointed there.
    pub fn delete_record(&self, key: &RecordKey) -> bool {
        let deselected = {
            let mut state = self.lock();
            let Some(field) = state.key_field().map(str::to_string) else {
                return false;
            };
            let Some(index) = state
                .rows
                .iter()
                .position(|row| RecordKey::of_row(row, &field).as_ref() == Some(key))
            else {
                return false;
            };
            let was_selected = state.selected_index() == Some(index);
            state.rows.remove(index);
            if was_selected {
                state.selection.clear();
            }
            was_selected
        };
        if deselected {
            self.events.emit(&GridEvent::Deselect);
        }
        true
    }

    // ── Selection ────────────────────────────────────────────────

    /// Position of the selected row on the current page.
    pub fn selected_index(&self) -> Option<usize> {
        self.lock().selected_index()
    }

    /// The selected row.
    pub fn selected_record(&self) -> Option<Row> {
        let state = self.lock();
        state
            .selected_index()
            .and_then(|index| state.rows.get(index).cloned())
    }

    /// Key of the selected record; `None` without a key field.
    pub fn selected_record_key(&self) -> Option<RecordKey> {
        let state = self.lock();
        let field = state.key_field()?;
        let row = state.rows.get(state.selected_index()?)?;
        RecordKey::of_row(row, field)
    }

    /// Selects the row with `key`. Returns `false` when selection is
    /// disabled, no key field is declared, or no row has that key.
    pub fn select_record_by_key(&self, key: &RecordKey) -> bool {
        if !self.config.selectable {
            return false;
        }
        let index = {
            let state = self.lock();
            let Some(field) = state.key_field() else {
                return false;
            };
            state
                .rows
                .iter()
                .position(|row| RecordKey::of_row(row, field).as_ref() == Some(key))
        };
        match index {
            Some(index) => self.select_index(index),
            None => false,
        }
    }

    /// Selects the row at `index` and emits `select`.
    pub fn select_index(&self, index: usize) -> bool {
        if !self.config.selectable {
            return false;
        }
        let event = {
            let mut state = self.lock();
            let GridState {
                rows,
                metadata,
                selection,
                ..
            } = &mut *state;
            let key_field = metadata.as_ref().and_then(ColumnMetadata::key_field);
            if !selection.select_row(rows, key_field, index) {
                return false;
            }
            state.select_event(index)
        };
        if let Some(event) = event {
            self.events.emit(&event);
        }
        true
    }

    /// Clears the selection, emitting `deselect` if something was selected.
    pub fn deselect(&self) {
        let had_selection = {
            let mut state = self.lock();
            let had_selection = state.selection.is_selected();
            state.selection.clear();
            had_selection
        };
        if had_selection {
            self.events.emit(&GridEvent::Deselect);
        }
    }

    /// Row double click: selects the row and emits `doubleClick`.
    pub fn double_click(&self, index: usize) -> bool {
        let already_selected = self.selected_index() == Some(index);
        if !already_selected && !self.select_index(index) {
            return false;
        }
        let event = {
            let state = self.lock();
            let Some(record) = state.rows.get(index).cloned() else {
                return false;
            };
            let key = state
                .key_field()
                .and_then(|field| RecordKey::of_row(&record, field));
            GridEvent::DoubleClick { index, key, record }
        };
        self.events.emit(&event);
        true
    }

    // ── Client-side filtering ────────────────────────────────────

    /// Filters the loaded rows locally. A descriptor that compiles to no
    /// predicate behaves like [`clear_client_filter`](Self::clear_client_filter).
    /// Returns the rows that remain visible.
    pub fn apply_client_filter(&self, descriptor: FilterDescriptor) -> Vec<Row> {
        let Some(predicate) = create_predicate(&descriptor) else {
            return self.clear_client_filter();
        };
        let visible = {
            let mut state = self.lock();
            let visible = predicate.apply(&state.rows).into_iter().cloned().collect();
            state.client_filter = Some((descriptor.clone(), predicate));
            visible
        };
        self.events.emit(&GridEvent::FilterApplied(descriptor));
        visible
    }

    /// Drops the client-side filter, emits `filterCleared` and returns all loaded rows.
    pub fn clear_client_filter(&self) -> Vec<Row> {
        let rows = {
            let mut state = self.lock();
            state.client_filter = None;
            state.rows.clone()
        };
        self.events.emit(&GridEvent::FilterCleared);
        rows
    }

    /// The client-side filter in effect, if any.
    pub fn active_filter(&self) -> Option<FilterDescriptor> {
        self.lock()
            .client_filter
            .as_ref()
            .map(|(descriptor, _)| descriptor.clone())
    }

    /// Loaded rows that pass the client-side filter.
    pub fn visible_rows(&self) -> Vec<Row> {
        let state = self.lock();
        match &state.client_filter {
            Some((_, predicate)) => predicate.apply(&state.rows).into_iter().cloned().collect(),
            None => state.rows.clone(),
        }
    }
}
