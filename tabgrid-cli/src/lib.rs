//! Argument handling and table output for the `tabgrid` binary.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tabgrid_adapter::{
    parse_page, AdapterConfig, GridAdapter, HttpTransport, HttpTransportConfig,
    LegacyRequestBuilder, LoadOptions,
};
use tabgrid_render::{to_plain_text, Align, ColumnDef, RenderConfig, Renderer};
use tabgrid_types::{ColumnMetadata, FilterDescriptor, FilterState, ResponseEnvelope, Row, SortOrder, SortState};
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tracing::debug;

#[derive(Parser, Debug, Clone)]
#[command(name = "tabgrid")]
#[command(about = "Fetch one page of a CMS admin list and print it")]
pub struct Args {
    /// Origin of the CMS, e.g. https://cms.example.com
    #[arg(long, env = "TABGRID_BASE_URL")]
    pub base_url: String,

    /// List path, e.g. /admin/news/
    #[arg(short, long)]
    pub path: String,

    /// Page to fetch
    #[arg(long, default_value = "1")]
    pub page: String,

    /// Sort as `field` or `field:asc|desc`
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Raw filter fragment sent as-is
    #[arg(short, long, conflicts_with = "filter")]
    pub query: Option<String>,

    /// Structured filter `field:condition[:v1,v2]` (repeatable)
    #[arg(short, long)]
    pub filter: Vec<String>,

    /// Content language id (`languageID`)
    #[arg(long)]
    pub lang: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Display locale for numbers and dates
    #[arg(long, default_value = "en-US")]
    pub locale: String,

    /// Prefix for relative file links
    #[arg(long)]
    pub media_base: Option<String>,

    /// Print the normalized response as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            base_path: self.path.clone(),
            language_id: self.lang,
            ..AdapterConfig::default()
        }
    }

    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            base_url: Some(self.base_url.clone()),
            timeout_secs: self.timeout,
            ..HttpTransportConfig::default()
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            locale: self.locale.clone(),
            media_base: self.media_base.clone(),
            ..RenderConfig::default()
        }
    }

    pub fn sort_state(&self) -> Result<SortState> {
        match &self.sort {
            Some(spec) => parse_sort(spec),
            None => Ok(SortState::none()),
        }
    }

    pub fn filter_state(&self) -> Result<FilterState> {
        if let Some(query) = &self.query {
            return Ok(FilterState::query(query.clone()));
        }
        let filters = self
            .filter
            .iter()
            .map(|spec| parse_filter(spec))
            .collect::<Result<Vec<_>>>()?;
        Ok(FilterState::structured(filters))
    }
}

/// `field` or `field:asc|desc`.
pub fn parse_sort(spec: &str) -> Result<SortState> {
    let (field, order) = match spec.split_once(':') {
        Some((field, order)) => (field.trim(), order.parse::<SortOrder>()?),
        None => (spec.trim(), SortOrder::Asc),
    };
    if field.is_empty() {
        bail!("sort field must not be empty: {spec:?}");
    }
    Ok(SortState::new(field, order))
}

/// `field:condition[:v1,v2]`.
pub fn parse_filter(spec: &str) -> Result<FilterDescriptor> {
    let mut parts = spec.splitn(3, ':');
    let field = parts.next().map(str::trim).unwrap_or_default();
    let condition = parts.next().map(str::trim).unwrap_or_default();
    if field.is_empty() || condition.is_empty() {
        bail!("filter must look like field:condition[:values], got {spec:?}");
    }
    let values: Vec<&str> = parts
        .next()
        .map(|v| v.split(',').collect())
        .unwrap_or_default();
    Ok(FilterDescriptor::new(field, condition, values))
}

/// Fetches the page described by `args` and returns the printable output.
pub async fn run(args: &Args) -> Result<String> {
    let config = args.adapter_config();
    let builder =
        LegacyRequestBuilder::from_config(&config).context("Invalid list path")?;
    let transport =
        HttpTransport::new(args.transport_config()).context("Failed to create HTTP client")?;
    let adapter = GridAdapter::new(config, Arc::new(builder), Arc::new(transport));

    let page = parse_page(&args.page);
    let options = LoadOptions::default()
        .with_sort(args.sort_state()?)
        .with_filter(args.filter_state()?);
    debug!(page, "fetching list");

    let envelope = adapter
        .load(Some(page), options)
        .await
        .with_context(|| format!("Failed to load {}", args.path))?;

    if args.json {
        return serde_json::to_string_pretty(&envelope).context("Failed to encode response");
    }

    let renderer = Renderer::new(args.render_config());
    let metadata = adapter.metadata().unwrap_or_default();
    let mut out = render_table(&renderer, &adapter.columns(), &metadata, &adapter.rows());
    out.push_str(&summary(&envelope, &adapter));
    Ok(out)
}

fn summary(envelope: &ResponseEnvelope, adapter: &GridAdapter) -> String {
    match adapter.pagination() {
        Some(p) => format!(
            "\npage {} of {} ({} records)\n",
            p.current_page,
            p.total_pages,
            p.total_records
                .map_or_else(|| envelope.data.len().to_string(), |n| n.to_string())
        ),
        None => format!("\n{} rows\n", envelope.data.len()),
    }
}

/// Lays the rendered cells out as a plain-text table in `psql` style.
pub fn render_table(
    renderer: &Renderer,
    columns: &[ColumnDef],
    metadata: &ColumnMetadata,
    rows: &[Row],
) -> String {
    if columns.is_empty() {
        return String::new();
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.title.clone()));
    for row in rows {
        builder.push_record(
            renderer
                .render_row(columns, metadata, row)
                .iter()
                .map(|cell| to_plain_text(cell)),
        );
    }

    let mut table = builder.build();
    table.with(Style::psql());
    for (index, column) in columns.iter().enumerate() {
        match column.align {
            Some(Align::Right) => {
                table.modify(Columns::new(index..=index), Alignment::right());
            }
            Some(Align::Center) => {
                table.modify(Columns::new(index..=index), Alignment::center());
            }
            None => {}
        }
    }

    let mut out = String::new();
    for line in table.to_string().lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
