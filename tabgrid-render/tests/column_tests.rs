use pretty_assertions::assert_eq;
use serde_json::json;
use tabgrid_render::{build_columns, resolve_alignment, Align, ColumnDef, Renderer};
use tabgrid_types::{ColumnMetadata, ColumnType, FieldMeta, Row};

fn metadata() -> ColumnMetadata {
    ColumnMetadata::from_value(&json!({
        "id": {"type": "int", "key": true, "visible": false},
        "name": {"title": "Name", "type": "string", "sort": 1, "width": 200, "tooltip": "Full name"},
        "price": {"title": "Price", "type": "money", "cssClass": "text-nowrap"},
        "active": {"title": "Active", "type": "boolean"},
        "secret": {"type": "hidden"},
        "notes": {"type": "text", "align": "middle", "minWidth": "80", "maxWidth": 0}
    }))
    .unwrap()
    .unwrap()
}

// ── build_columns ───────────────────────────────────────────────

#[test]
fn hidden_fields_are_skipped_in_order() {
    let columns = build_columns(&metadata());
    let fields: Vec<&str> = columns.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, vec!["name", "price", "active", "notes"]);
}

#[test]
fn column_copies_display_attributes() {
    let columns = build_columns(&metadata());
    assert_eq!(
        columns[0],
        ColumnDef {
            field: "name".to_string(),
            title: "Name".to_string(),
            tooltip: Some("Full name".to_string()),
            column_type: ColumnType::Text,
            sortable: true,
            align: None,
            width: Some(200),
            min_width: None,
            max_width: None,
            css_class: None,
        }
    );
    assert_eq!(columns[1].css_class.as_deref(), Some("text-nowrap"));
    assert_eq!(columns[3].min_width, Some(80));
    assert_eq!(columns[3].max_width, None);
}

#[test]
fn title_falls_back_to_field_name() {
    let meta = ColumnMetadata::new().with_field("code", FieldMeta::typed("text"));
    assert_eq!(build_columns(&meta)[0].title, "code");
}

#[test]
fn alignment_defaults_by_type() {
    let columns = build_columns(&metadata());
    assert_eq!(columns[1].align, Some(Align::Right));
    assert_eq!(columns[2].align, Some(Align::Center));
    assert_eq!(columns[3].align, Some(Align::Center));
}

#[test]
fn explicit_alignment_wins() {
    let meta = ColumnMetadata::new().with_field(
        "qty",
        FieldMeta {
            align: Some("CENTER".to_string()),
            ..FieldMeta::typed("int")
        },
    );
    assert_eq!(build_columns(&meta)[0].align, Some(Align::Center));

    assert_eq!(resolve_alignment(Some("right")), Some(Align::Right));
    assert_eq!(resolve_alignment(Some("left")), None);
    assert_eq!(resolve_alignment(None), None);
}

#[test]
fn build_columns_is_idempotent() {
    let meta = metadata();
    assert_eq!(build_columns(&meta), build_columns(&meta));
}

#[test]
fn empty_metadata_has_no_columns() {
    assert!(build_columns(&ColumnMetadata::new()).is_empty());
}

// ── render_row ──────────────────────────────────────────────────

#[test]
fn render_row_follows_column_order() {
    let meta = metadata();
    let columns = build_columns(&meta);
    let row: Row = serde_json::from_value(json!({
        "id": 7,
        "active": "Y",
        "name": "Widget",
        "price": "12,5"
    }))
    .unwrap();

    let cells = Renderer::default().render_row(&columns, &meta, &row);
    assert_eq!(cells.len(), 4);
    assert_eq!(cells[0], "Widget");
    assert_eq!(cells[1], "12.50");
    assert!(cells[2].contains("bg-success"));
    assert_eq!(cells[3], "\u{2014}");
}
