use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tabgrid_adapter::{
    encode_filter_state, GridAdapter, GridError, GridRequest, GridResult, GridTransport,
    LegacyRequestBuilder, LoadOptions,
};
use tabgrid_types::{RecordKey, ResponseEnvelope, Row};
use tracing::{debug, info, warn};

use crate::filter_form::FilterForm;

/// Target position of a `move` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    First,
    Last,
    Above,
    Below,
}

impl MoveDirection {
    /// Path segment used in move URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Above => "above",
            Self::Below => "below",
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin list controller around a grid adapter.
pub struct GridManager {
    adapter: Arc<GridAdapter>,
    builder: Arc<LegacyRequestBuilder>,
    filter: Mutex<Option<FilterForm>>,
    move_source: Mutex<Option<RecordKey>>,
    dirty: AtomicBool,
}

impl GridManager {
    /// `builder` must be the same builder the adapter was created with, so
    /// that language switches reach the adapter's requests.
    pub fn new(adapter: Arc<GridAdapter>, builder: Arc<LegacyRequestBuilder>) -> Self {
        Self {
            adapter,
            builder,
            filter: Mutex::new(None),
            move_source: Mutex::new(None),
            dirty: AtomicBool::new(false),
        }
    }

    /// The adapter holding the list's rows and selection.
    pub fn adapter(&self) -> &Arc<GridAdapter> {
        &self.adapter
    }

    /// The shared request builder.
    pub fn builder(&self) -> &Arc<LegacyRequestBuilder> {
        &self.builder
    }

    fn filter_slot(&self) -> MutexGuard<'_, Option<FilterForm>> {
        self.filter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn move_slot(&self) -> MutexGuard<'_, Option<RecordKey>> {
        self.move_source
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a row action changed server data since the manager was created.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Relaxed);
    }

    /// Page shown by the paginator, if any response carried a pager.
    pub fn current_page(&self) -> Option<u64> {
        self.adapter
            .pagination()
            .map(|p| p.current_page)
            .filter(|page| *page >= 1)
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Full reload from page 1.
    pub async fn reload(&self) -> GridResult<ResponseEnvelope> {
        self.adapter.load(Some(1), LoadOptions::forced()).await
    }

    /// Navigates to `page`, or re-fetches the current page when `None`.
    pub async fn load_page(&self, page: Option<u64>) -> GridResult<ResponseEnvelope> {
        let page = page.or_else(|| self.current_page()).unwrap_or(1);
        self.adapter.set_page(Some(page), LoadOptions::default()).await
    }

    /// Language tab switch: new `languageID`, no filter, page 1.
    pub async fn switch_language(&self, language_id: u64) -> GridResult<ResponseEnvelope> {
        info!(language_id, "switching grid language");
        self.builder.set_language_id(Some(language_id));
        *self.filter_slot() = None;
        self.adapter.clear_filter();
        self.reload().await
    }

    /// Header click: cycles the sort and reloads from page 1. Returns
    /// `Ok(None)` when the column is not sortable.
    pub async fn sort_by(&self, field: &str) -> GridResult<Option<ResponseEnvelope>> {
        if !self.adapter.toggle_sort(field) {
            return Ok(None);
        }
        self.adapter
            .load(Some(1), LoadOptions::default())
            .await
            .map(Some)
    }

    // ── Filter panel ─────────────────────────────────────────────

    /// Applies the filter panel and reloads. A form with no usable input
    /// resets the filter instead.
    pub async fn apply_filter_form(&self, form: FilterForm) -> GridResult<ResponseEnvelope> {
        if !form.is_active() {
            debug!(field = %form.field, "filter form has no values, resetting");
            return self.reset_filter_form().await;
        }
        self.adapter.set_filters(vec![form.to_descriptor()]);
        *self.filter_slot() = Some(form);
        self.reload().await
    }

    /// Clears the filter panel and reloads from page 1.
    pub async fn reset_filter_form(&self) -> GridResult<ResponseEnvelope> {
        *self.filter_slot() = None;
        self.adapter.clear_filter();
        self.reload().await
    }

    /// The filter panel as last applied.
    pub fn filter_form(&self) -> Option<FilterForm> {
        self.filter_slot().clone()
    }

    /// The filter fragment row actions resend so the server can reorder
    /// within the filtered set.
    fn filter_body(&self) -> String {
        encode_filter_state(&self.adapter.filter())
    }

    // ── Row actions ──────────────────────────────────────────────

    fn selected_key(&self) -> GridResult<RecordKey> {
        if self.adapter.key_field().is_none() {
            return Err(GridError::NoKeyField);
        }
        self.adapter
            .selected_record_key()
            .ok_or(GridError::NoSelection)
    }

    async fn post(&self, request: GridRequest) -> GridResult<()> {
        let url = request.url.clone();
        let response = self.adapter.transport().execute(request).await?;
        if !response.is_success() {
            warn!(url = %url, status = response.status, "row action rejected");
            return Err(GridError::Status {
                status: response.status,
                body: response.body,
            });
        }
        debug!(url = %url, "row action accepted");
        Ok(())
    }

    /// Deletes the selected record, then re-fetches the current page.
    pub async fn delete_selected(&self) -> GridResult<ResponseEnvelope> {
        let key = self.selected_key()?;
        let url = self.builder.record_url(&key, "delete");
        self.post(GridRequest::post_empty(url)).await?;
        info!(key = %key, "record deleted");
        self.mark_dirty();
        self.load_page(None).await
    }

    /// Moves the selected record one position up.
    pub async fn move_up(&self) -> GridResult<ResponseEnvelope> {
        self.shift("up").await
    }

    /// Moves the selected record one position down.
    pub async fn move_down(&self) -> GridResult<ResponseEnvelope> {
        self.shift("down").await
    }

    async fn shift(&self, action: &str) -> GridResult<ResponseEnvelope> {
        let key = self.selected_key()?;
        let url = self.builder.record_url(&key, action);
        self.post(GridRequest::post(url, self.filter_body())).await?;
        self.load_page(None).await
    }

    /// Remembers the record a move dialog was opened for.
    pub fn set_move_source(&self, key: RecordKey) {
        *self.move_slot() = Some(key);
    }

    /// The record remembered by [`set_move_source`](Self::set_move_source).
    pub fn move_source(&self) -> Option<RecordKey> {
        self.move_slot().clone()
    }

    /// Forgets the remembered move source.
    pub fn clear_move_source(&self) {
        *self.move_slot() = None;
    }

    /// `POST <base>move/<from>/<dir>/<to>/`. `to` is empty for
    /// [`MoveDirection::First`] and [`MoveDirection::Last`].
    pub async fn move_to(
        &self,
        direction: MoveDirection,
        from: &RecordKey,
        to: Option<&RecordKey>,
    ) -> GridResult<()> {
        let url = format!(
            "{}move/{}/{}/{}/",
            self.builder.base_path(),
            urlencoding::encode(from.as_str()),
            direction,
            to.map(|k| urlencoding::encode(k.as_str()).into_owned())
                .unwrap_or_default()
        );
        self.post(GridRequest::post_empty(url)).await?;
        info!(from = %from, direction = %direction, "record moved");
        self.mark_dirty();
        Ok(())
    }

    /// Moves the remembered record relative to the selected one (`above`,
    /// `below`) or to an end of the list (`first`, `last`).
    pub async fn move_selected_to(&self, direction: MoveDirection) -> GridResult<()> {
        let from = self.move_source().ok_or(GridError::NoSelection)?;
        let to = match direction {
            MoveDirection::First | MoveDirection::Last => None,
            MoveDirection::Above | MoveDirection::Below => Some(self.selected_key()?),
        };
        self.move_to(direction, &from, to.as_ref()).await?;
        self.clear_move_source();
        Ok(())
    }

    /// Called when an edit or add dialog closes: a saved record marks the
    /// list dirty and re-fetches the current page.
    pub async fn after_edit(&self, saved: bool) -> GridResult<Option<ResponseEnvelope>> {
        if !saved {
            return Ok(None);
        }
        self.mark_dirty();
        self.load_page(None).await.map(Some)
    }

    /// The selected record, for pickers that return a row to their caller.
    pub fn use_selected(&self) -> GridResult<Row> {
        self.adapter.selected_record().ok_or(GridError::NoSelection)
    }

    // ── URLs ─────────────────────────────────────────────────────

    /// `<base><key>/` for the selected record.
    pub fn view_url(&self) -> GridResult<String> {
        Ok(self.builder.record_url(&self.selected_key()?, ""))
    }

    /// `<base><key>/edit`, for `key` or else the selected record.
    pub fn edit_url(&self, key: Option<&RecordKey>) -> GridResult<String> {
        let key = match key {
            Some(key) => key.clone(),
            None => self.selected_key()?,
        };
        Ok(format!(
            "{}{}/edit",
            self.builder.base_path(),
            urlencoding::encode(key.as_str())
        ))
    }

    /// `<base>move/<key>`, the move dialog for `key` or else the selected record.
    pub fn move_url(&self, key: Option<&RecordKey>) -> GridResult<String> {
        let key = match key {
            Some(key) => key.clone(),
            None => self.selected_key()?,
        };
        Ok(format!(
            "{}move/{}",
            self.builder.base_path(),
            urlencoding::encode(key.as_str())
        ))
    }

    /// `<base>add/`.
    pub fn add_url(&self) -> String {
        self.builder.action_url("add")
    }

    /// `<base>print/`.
    pub fn print_url(&self) -> String {
        self.builder.action_url("print")
    }

    /// `<base>csv/`.
    pub fn csv_url(&self) -> String {
        self.builder.action_url("csv")
    }

    /// Selects the previous row and returns its edit URL. `Ok(None)` at the
    /// top of the page.
    pub fn edit_previous(&self) -> GridResult<Option<String>> {
        let index = self.adapter.selected_index().ok_or(GridError::NoSelection)?;
        match index.checked_sub(1) {
            Some(previous) if self.adapter.select_index(previous) => self.edit_url(None).map(Some),
            _ => Ok(None),
        }
    }

    /// Selects the next row and returns its edit URL. `Ok(None)` at the
    /// bottom of the page.
    pub fn edit_next(&self) -> GridResult<Option<String>> {
        let index = self.adapter.selected_index().ok_or(GridError::NoSelection)?;
        if self.adapter.select_index(index + 1) {
            self.edit_url(None).map(Some)
        } else {
            Ok(None)
        }
    }
}
