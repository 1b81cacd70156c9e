use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use tabgrid_adapter::transport::mock::MockTransport;
use tabgrid_adapter::{
    encode_filter, encode_filter_state, AdapterConfig, GridAdapter, GridError,
    LegacyRequestBuilder, LoadOptions, RequestBuilder, RequestParams,
};
use tabgrid_types::{FilterCondition, FilterDescriptor, FilterState, RecordKey, SortOrder, SortState};

fn builder() -> LegacyRequestBuilder {
    LegacyRequestBuilder::new("/admin/news").unwrap()
}

// ── Construction ────────────────────────────────────────────────

#[test]
fn blank_base_path_is_a_config_error() {
    let err = LegacyRequestBuilder::new("  ").unwrap_err();
    assert!(matches!(err, GridError::Config(_)));
}

#[test]
fn base_path_gets_trailing_slash() {
    assert_eq!(builder().base_path(), "/admin/news/");
    assert_eq!(
        LegacyRequestBuilder::new("/admin/news/").unwrap().base_path(),
        "/admin/news/"
    );
}

#[test]
fn from_config_carries_language() {
    let config = AdapterConfig {
        base_path: "/admin/news/".into(),
        language_id: Some(3),
        ..AdapterConfig::default()
    };
    let builder = LegacyRequestBuilder::from_config(&config).unwrap();
    assert_eq!(builder.language_id(), Some(3));

    builder.set_language_id(None);
    assert_eq!(builder.language_id(), None);
}

// ── URLs ────────────────────────────────────────────────────────

#[test]
fn data_url_without_sort() {
    assert_eq!(
        builder().data_url(2, &SortState::none()),
        "/admin/news/get-data/page-2/"
    );
}

#[test]
fn data_url_with_sort() {
    assert_eq!(
        builder().data_url(1, &SortState::new("news_date", SortOrder::Desc)),
        "/admin/news/get-data/news_date-desc/page-1/"
    );
}

#[test]
fn record_and_action_urls() {
    let b = builder();
    let key = RecordKey::from(42u64);
    assert_eq!(b.record_url(&key, "delete"), "/admin/news/42/delete/");
    assert_eq!(b.record_url(&key, "/up/"), "/admin/news/42/up/");
    assert_eq!(b.record_url(&key, ""), "/admin/news/42/");
    assert_eq!(b.action_url("add"), "/admin/news/add/");
    assert_eq!(b.action_url("/csv/"), "/admin/news/csv/");
}

#[test]
fn build_combines_url_and_body() {
    let b = builder().with_language(1);
    let built = b
        .build(&RequestParams {
            page: 5,
            sort: SortState::new("title", SortOrder::Asc),
            filter: FilterState::query("filter[title][]=x&filter[condition]=like&"),
        })
        .unwrap();
    assert_eq!(built.url, "/admin/news/get-data/title-asc/page-5/");
    assert_eq!(
        built.body,
        "languageID=1&filter[title][]=x&filter[condition]=like&"
    );
}

// ── Filter encoding ─────────────────────────────────────────────

#[test]
fn encode_single_value() {
    assert_eq!(
        encode_filter("title", &FilterCondition::Contains, &["news".into()]),
        "filter[title][]=news&filter[condition]=like&"
    );
}

#[test]
fn encode_escapes_values_and_condition() {
    assert_eq!(
        encode_filter("price", &FilterCondition::GreaterOrEqual, &["1 000".into()]),
        "filter[price][]=1%20000&filter[condition]=%3E%3D&"
    );
}

#[test]
fn encode_between_and_dotted_field() {
    assert_eq!(
        encode_filter(
            "share_news.news_date",
            &FilterCondition::Between,
            &["2024-01-01".into(), "2024-12-31".into()]
        ),
        "filter[share_news][news_date][]=2024-01-01&filter[share_news][news_date][]=2024-12-31&filter[condition]=between&"
    );
}

#[test]
fn encode_drops_blank_values() {
    assert_eq!(
        encode_filter("title", &FilterCondition::Equal, &["".into(), " ".into()]),
        ""
    );
    assert_eq!(
        encode_filter("active", &FilterCondition::Checked, &[]),
        "filter[active][]=&filter[condition]=checked&"
    );
}

#[test]
fn encode_state_variants() {
    assert_eq!(encode_filter_state(&FilterState::None), "");
    assert_eq!(encode_filter_state(&FilterState::query("raw=1")), "raw=1");
    let structured = FilterState::structured(vec![
        FilterDescriptor::new("a", "=", ["1"]),
        FilterDescriptor::new("b", "notempty", Vec::<String>::new()),
    ]);
    assert_eq!(
        encode_filter_state(&structured),
        "filter[a][]=1&filter[condition]=%3D&filter[b][]=&filter[condition]=notempty&"
    );
}

#[test]
fn blank_query_is_no_filter() {
    assert_eq!(FilterState::query("   "), FilterState::None);
    assert_eq!(FilterState::structured(Vec::new()), FilterState::None);
}

// ── Filter clearing ─────────────────────────────────────────────

fn cleared_filter_body(query: &str) -> (FilterState, Option<String>) {
    let builder = LegacyRequestBuilder::new("/admin/news/").unwrap();
    let mock = Arc::new(MockTransport::new());
    mock.push_json(json!({"data": []}));
    let adapter = GridAdapter::new(AdapterConfig::default(), Arc::new(builder), mock.clone());

    adapter.set_filter_query(query);
    adapter.clear_filter();
    tokio_test::block_on(adapter.load(None, LoadOptions::default())).unwrap();

    (adapter.filter(), mock.last_request().and_then(|r| r.body))
}

#[test]
fn clear_filter_after_query_sends_no_filter() {
    let (state, body) = cleared_filter_body("filter[title][]=x&filter[condition]=like&");
    assert_eq!(state, FilterState::None);
    assert_eq!(body.as_deref(), Some(""));
}

proptest! {
    #[test]
    fn any_query_then_clear_sends_no_filter(query in "[a-z\\[\\]=&%0-9 ]{0,40}") {
        let (state, body) = cleared_filter_body(&query);
        prop_assert_eq!(state, FilterState::None);
        prop_assert_eq!(body.as_deref(), Some(""));
    }

    #[test]
    fn out_of_range_pages_are_literal(page in 1u64..100_000) {
        let url = LegacyRequestBuilder::new("/x/").unwrap().data_url(page, &SortState::none());
        prop_assert_eq!(url, format!("/x/get-data/page-{page}/"));
    }
}
