use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tabgrid_adapter::transport::mock::MockTransport;
use tabgrid_adapter::{AdapterConfig, GridAdapter, GridError, LegacyRequestBuilder, Method};
use tabgrid_manager::{FilterForm, GridManager, MoveDirection};
use tabgrid_types::{FilterState, RecordKey};

fn setup() -> (GridManager, Arc<MockTransport>) {
    let config = AdapterConfig {
        base_path: "/admin/news/".into(),
        language_id: Some(1),
        ..AdapterConfig::default()
    };
    let builder = Arc::new(LegacyRequestBuilder::from_config(&config).unwrap());
    let mock = Arc::new(MockTransport::new());
    let adapter = Arc::new(GridAdapter::new(config, builder.clone(), mock.clone()));
    (GridManager::new(adapter, builder), mock)
}

fn list(page: u64) -> Value {
    json!({
        "data": [
            {"news_id": 10, "news_title": "First", "news_date": "2024-03-05"},
            {"news_id": 11, "news_title": "Second", "news_date": "2024-03-06"}
        ],
        "meta": {
            "news_id": {"key": true, "type": "int"},
            "news_title": {"type": "text", "sort": 1},
            "news_date": {"type": "date", "sort": 1}
        },
        "pager": {"count": 3, "current": page, "records": 42}
    })
}

fn keyless() -> Value {
    json!({"data": [{"title": "A"}], "meta": {"title": {"type": "text"}}})
}

// ── Loading ─────────────────────────────────────────────────────

#[tokio::test]
async fn reload_requests_page_one() {
    let (manager, mock) = setup();
    mock.push_json(list(1));

    manager.reload().await.unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.url, "/admin/news/get-data/page-1/");
    assert_eq!(request.body.as_deref(), Some("languageID=1&"));
    assert_eq!(manager.current_page(), Some(1));
}

#[tokio::test]
async fn load_page_defaults_to_current_page() {
    let (manager, mock) = setup();
    mock.push_json(list(2));
    mock.push_json(list(2));
    mock.push_json(list(3));

    manager.load_page(Some(2)).await.unwrap();
    manager.load_page(None).await.unwrap();
    assert!(mock.last_request().unwrap().url.ends_with("page-2/"));

    manager.load_page(Some(3)).await.unwrap();
    assert!(mock.last_request().unwrap().url.ends_with("page-3/"));
}

#[tokio::test]
async fn switch_language_clears_filter_and_reloads() {
    let (manager, mock) = setup();
    mock.push_json(list(1));
    mock.push_json(list(1));
    manager
        .apply_filter_form(FilterForm::new("news_title", "like", ["rust"]))
        .await
        .unwrap();

    manager.switch_language(2).await.unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.url, "/admin/news/get-data/page-1/");
    assert_eq!(request.body.as_deref(), Some("languageID=2&"));
    assert_eq!(manager.filter_form(), None);
    assert_eq!(manager.builder().language_id(), Some(2));
}

#[tokio::test]
async fn sort_by_reloads_sortable_columns_only() {
    let (manager, mock) = setup();
    mock.push_json(list(2));
    mock.push_json(list(1));
    manager.load_page(Some(2)).await.unwrap();

    assert!(manager.sort_by("news_id").await.unwrap().is_none());
    assert_eq!(mock.request_count(), 1);

    assert!(manager.sort_by("news_date").await.unwrap().is_some());
    assert_eq!(
        mock.last_request().unwrap().url,
        "/admin/news/get-data/news_date-asc/page-1/"
    );
}

// ── Filter form ─────────────────────────────────────────────────

#[tokio::test]
async fn filter_form_is_encoded_into_body() {
    let (manager, mock) = setup();
    mock.push_json(list(1));

    let form = FilterForm::new("share_news.news_date", "between", ["2024-01-01", "2024-12-31"])
        .with_field_type("date");
    manager.apply_filter_form(form.clone()).await.unwrap();

    assert_eq!(
        mock.last_request().unwrap().body.as_deref(),
        Some(
            "languageID=1&filter[share_news][news_date][]=2024-01-01&filter[share_news][news_date][]=2024-12-31&filter[condition]=between&"
        )
    );
    assert_eq!(manager.filter_form(), Some(form));
}

#[tokio::test]
async fn blank_filter_form_resets() {
    let (manager, mock) = setup();
    mock.push_json(list(1));
    mock.push_json(list(1));
    manager
        .apply_filter_form(FilterForm::new("news_title", "like", ["x"]))
        .await
        .unwrap();

    manager
        .apply_filter_form(FilterForm::new("news_title", "like", ["  "]))
        .await
        .unwrap();

    assert_eq!(mock.last_request().unwrap().body.as_deref(), Some("languageID=1&"));
    assert_eq!(manager.filter_form(), None);
    assert_eq!(manager.adapter().filter(), FilterState::None);
}

#[tokio::test]
async fn reset_filter_form_sends_no_filter() {
    let (manager, mock) = setup();
    mock.push_json(list(1));
    mock.push_json(list(1));
    manager
        .apply_filter_form(FilterForm::new("news_title", "=", ["x"]))
        .await
        .unwrap();

    manager.reset_filter_form().await.unwrap();

    assert_eq!(mock.last_request().unwrap().body.as_deref(), Some("languageID=1&"));
}

#[test]
fn valueless_conditions_are_active() {
    let form = FilterForm::new("news_active", "checked", Vec::<String>::new());
    assert!(form.is_active());
    assert_eq!(form.encode(), "filter[news_active][]=&filter[condition]=checked&");
    assert!(!FilterForm::new("news_title", "like", [""]).is_active());
}

// ── Row actions ─────────────────────────────────────────────────

#[tokio::test]
async fn delete_selected_posts_and_reloads_current_page() {
    let (manager, mock) = setup();
    mock.push_json(list(2));
    mock.push_response(200, "");
    mock.push_json(list(2));
    manager.load_page(Some(2)).await.unwrap();
    assert!(manager.adapter().select_index(1));

    manager.delete_selected().await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].url, "/admin/news/11/delete/");
    assert_eq!(requests[1].method, Method::Post);
    assert_eq!(requests[1].body, None);
    assert!(requests[2].url.ends_with("page-2/"));
    assert!(manager.is_dirty());
}

#[tokio::test]
async fn failed_delete_keeps_list_clean() {
    let (manager, mock) = setup();
    mock.push_json(list(1));
    mock.push_response(403, "forbidden");
    manager.reload().await.unwrap();

    let err = manager.delete_selected().await.unwrap_err();

    assert!(matches!(err, GridError::Status { status: 403, .. }));
    assert!(!manager.is_dirty());
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn actions_without_selection_fail_locally() {
    let (manager, mock) = setup();
    mock.push_json(list(1));
    manager.reload().await.unwrap();
    manager.adapter().deselect();

    assert!(matches!(manager.delete_selected().await, Err(GridError::NoSelection)));
    assert!(matches!(manager.move_up().await, Err(GridError::NoSelection)));
    assert!(matches!(manager.view_url(), Err(GridError::NoSelection)));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn actions_without_key_field_fail_locally() {
    let (manager, mock) = setup();
    mock.push_json(keyless());
    manager.reload().await.unwrap();

    assert!(matches!(manager.delete_selected().await, Err(GridError::NoKeyField)));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn move_up_and_down_send_filter_body() {
    let (manager, mock) = setup();
    mock.push_json(list(1));
    mock.push_response(200, "");
    mock.push_json(list(1));
    mock.push_response(200, "");
    mock.push_json(list(1));
    manager
        .apply_filter_form(FilterForm::new("news_title", "like", ["a"]))
        .await
        .unwrap();

    manager.move_up().await.unwrap();
    manager.move_down().await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests[1].url, "/admin/news/10/up/");
    assert_eq!(
        requests[1].body.as_deref(),
        Some("filter[news_title][]=a&filter[condition]=like&")
    );
    assert_eq!(requests[3].url, "/admin/news/10/down/");
    assert!(requests[4].url.ends_with("page-1/"));
    assert!(!manager.is_dirty());
}

#[tokio::test]
async fn move_to_builds_move_url() {
    let (manager, mock) = setup();
    mock.push_response(200, "");
    mock.push_response(200, "");

    manager
        .move_to(MoveDirection::Above, &RecordKey::from(7u64), Some(&RecordKey::from(3u64)))
        .await
        .unwrap();
    manager
        .move_to(MoveDirection::First, &RecordKey::from(7u64), None)
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests[0].url, "/admin/news/move/7/above/3/");
    assert_eq!(requests[1].url, "/admin/news/move/7/first//");
    assert!(manager.is_dirty());
}

#[tokio::test]
async fn move_selected_uses_remembered_source() {
    let (manager, mock) = setup();
    mock.push_json(list(1));
    mock.push_response(200, "");
    manager.reload().await.unwrap();
    manager.set_move_source(RecordKey::from(99u64));
    manager.adapter().select_index(1);

    manager.move_selected_to(MoveDirection::Below).await.unwrap();

    assert_eq!(mock.last_request().unwrap().url, "/admin/news/move/99/below/11/");
    assert_eq!(manager.move_source(), None);
}

#[tokio::test]
async fn move_selected_without_source_fails() {
    let (manager, _) = setup();
    let err = manager.move_selected_to(MoveDirection::Last).await.unwrap_err();
    assert!(matches!(err, GridError::NoSelection));
}

#[tokio::test]
async fn after_edit_reloads_only_when_saved() {
    let (manager, mock) = setup();
    mock.push_json(list(2));
    mock.push_json(list(2));
    manager.load_page(Some(2)).await.unwrap();

    assert!(manager.after_edit(false).await.unwrap().is_none());
    assert!(!manager.is_dirty());

    assert!(manager.after_edit(true).await.unwrap().is_some());
    assert!(manager.is_dirty());
    assert!(mock.last_request().unwrap().url.ends_with("page-2/"));
}

// ── URLs ────────────────────────────────────────────────────────

#[tokio::test]
async fn record_urls_follow_selection() {
    let (manager, mock) = setup();
    mock.push_json(list(1));
    manager.reload().await.unwrap();

    assert_eq!(manager.view_url().unwrap(), "/admin/news/10/");
    assert_eq!(manager.edit_url(None).unwrap(), "/admin/news/10/edit");
    assert_eq!(
        manager.edit_url(Some(&RecordKey::from(5u64))).unwrap(),
        "/admin/news/5/edit"
    );
    assert_eq!(manager.move_url(None).unwrap(), "/admin/news/move/10");
    assert_eq!(manager.add_url(), "/admin/news/add/");
    assert_eq!(manager.print_url(), "/admin/news/print/");
    assert_eq!(manager.csv_url(), "/admin/news/csv/");
}

#[tokio::test]
async fn edit_next_and_previous_walk_rows() {
    let (manager, mock) = setup();
    mock.push_json(list(1));
    manager.reload().await.unwrap();

    assert_eq!(manager.edit_previous().unwrap(), None);
    assert_eq!(manager.edit_next().unwrap().as_deref(), Some("/admin/news/11/edit"));
    assert_eq!(manager.edit_next().unwrap(), None);
    assert_eq!(manager.edit_previous().unwrap().as_deref(), Some("/admin/news/10/edit"));
}

#[tokio::test]
async fn use_selected_returns_record() {
    let (manager, mock) = setup();
    mock.push_json(list(1));
    manager.reload().await.unwrap();

    let record = manager.use_selected().unwrap();
    assert_eq!(record["news_title"], json!("First"));
}

#[test]
fn descriptor_keeps_between_bounds_positional() {
    let form = FilterForm::new("price", "between", [" ", " 100 "]);
    assert!(form.is_active());
    assert_eq!(form.to_descriptor().values, vec!["", "100"]);
    assert_eq!(form.encode(), "filter[price][]=100&filter[condition]=between&");
}
