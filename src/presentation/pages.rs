// HTML pages for the overview and raw data views
use crate::application::overview_service::{Overview, OverviewRequest};
use crate::application::raw_data_service::{RawDataRequest, RawDataView};
use crate::domain::dashboard::{Chart, Tab};
use crate::domain::filter::{Inclusion, ValueRange};
use crate::domain::region::Region;
use crate::domain::sale::Column;
use crate::infrastructure::config::{OverviewSettings, RawDataSettings};
use crate::presentation::charts::chart_svg;
use axum::http::StatusCode;
use std::fmt::{Display, Write};

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, active: &str, sidebar: &str, content: &str) -> String {
    let nav = [("overview", "/", "Dashboard"), ("raw", "/raw-data", "Raw data")]
        .iter()
        .map(|(id, href, label)| {
            let class = if *id == active { " class=\"active\"" } else { "" };
            format!(r#"<a href="{href}"{class}>{label}</a>"#)
        })
        .collect::<Vec<_>>()
        .join("");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <aside class="sidebar">
        <nav>{nav}</nav>
        {sidebar}
    </aside>
    <main>
        <h1>{title}</h1>
        {content}
    </main>
</body>
</html>"#,
        title = escape_html(title),
        css = inline_css(),
        nav = nav,
        sidebar = sidebar,
        content = content,
    )
}

fn inline_css() -> &'static str {
    r#"
body { margin: 0; display: flex; font-family: system-ui, sans-serif; color: #262730; }
.sidebar { width: 280px; min-height: 100vh; padding: 1rem; background: #f0f2f6; box-sizing: border-box; }
.sidebar nav a { display: block; padding: .3rem 0; color: #262730; text-decoration: none; }
.sidebar nav a.active { font-weight: 600; }
.sidebar fieldset { border: none; padding: 0; margin: 1rem 0; max-height: 220px; overflow-y: auto; }
.sidebar label { display: block; font-size: .9rem; }
main { flex: 1; padding: 1rem 2rem; overflow-x: auto; }
.tabs > input { display: none; }
.tabs > label { display: inline-block; padding: .5rem 1rem; cursor: pointer; border-bottom: 2px solid transparent; }
.tabs > input:checked + label { border-bottom-color: #ff4b4b; color: #ff4b4b; }
.panel { display: none; }
#tab-revenue:checked ~ #panel-revenue, #tab-quantity:checked ~ #panel-quantity, #tab-sellers:checked ~ #panel-sellers { display: block; }
.columns { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }
.metric .label { font-size: .9rem; } .metric .value { font-size: 2rem; }
.chart { margin: 1rem 0; } .chart figcaption { font-weight: 600; }
.chart svg { max-width: 100%; height: auto; }
.empty { color: #666; }
table { border-collapse: collapse; font-size: .85rem; }
th, td { border: 1px solid #ddd; padding: .25rem .5rem; text-align: left; }
.error { padding: 1rem; background: #ffe5e5; border-left: 4px solid #ff4b4b; }
"#
}

/// Chart SVG inside a captioned figure. A rendering failure leaves a placeholder.
fn chart_figure(chart: &Chart) -> String {
    let svg = match chart_svg(&chart.body, chart.value_title.as_deref()) {
        Ok(svg) => svg,
        Err(e) => {
            tracing::error!("Failed to render chart {}: {:#}", chart.id, e);
            r#"<p class="empty">Chart unavailable</p>"#.to_string()
        }
    };

    format!(
        r#"<figure class="chart" id="chart-{id}"><figcaption>{title}</figcaption>{svg}</figure>"#,
        id = escape_html(&chart.id),
        title = escape_html(&chart.title),
        svg = svg,
    )
}

fn checkbox(name: &str, value: &str, label: &str, checked: bool) -> String {
    format!(
        r#"<label><input type="checkbox" name="{name}" value="{value}"{checked}> {label}</label>"#,
        name = name,
        value = escape_html(value),
        label = escape_html(label),
        checked = if checked { " checked" } else { "" },
    )
}

fn number_input<T: Display>(name: &str, label: &str, value: T, min: T, max: T) -> String {
    format!(
        r#"<label>{label} <input type="number" name="{name}" value="{value}" min="{min}" max="{max}" step="any"></label>"#
    )
}

pub fn overview_page(
    overview: &Overview,
    request: &OverviewRequest,
    settings: &OverviewSettings,
) -> String {
    let mut sidebar = String::from(r#"<form method="get" action="/"><h2>Filters</h2>"#);

    sidebar.push_str(r#"<label>Region <select name="regiao">"#);
    for region in Region::ALL {
        let selected = if region == request.query.region { " selected" } else { "" };
        let _ = write!(sidebar, r#"<option{selected}>{}</option>"#, region.name());
    }
    sidebar.push_str("</select></label>");

    sidebar.push_str(r#"<label>Year <select name="ano"><option value="">Whole period</option>"#);
    for year in settings.first_year..=settings.last_year {
        let selected = if request.query.year == Some(year) { " selected" } else { "" };
        let _ = write!(sidebar, r#"<option{selected}>{year}</option>"#);
    }
    sidebar.push_str("</select></label>");

    sidebar.push_str("<fieldset><legend>Sellers</legend>");
    for seller in &overview.available_sellers {
        sidebar.push_str(&checkbox(
            "vendedores",
            seller,
            seller,
            request.sellers.contains(seller),
        ));
    }
    sidebar.push_str("</fieldset>");

    sidebar.push_str(&number_input(
        "top",
        "Number of sellers",
        overview.top_sellers,
        settings.min_sellers,
        settings.max_sellers,
    ));
    sidebar.push_str(r#"<p><button type="submit">Apply</button></p></form>"#);

    let mut content = String::from(r#"<div class="tabs">"#);
    for (i, tab) in overview.dashboard.tabs.iter().enumerate() {
        let checked = if i == 0 { " checked" } else { "" };
        let _ = write!(
            content,
            r#"<input type="radio" name="tab" id="tab-{id}"{checked}><label for="tab-{id}">{title}</label>"#,
            id = tab.id,
            title = escape_html(&tab.title),
        );
    }
    for tab in &overview.dashboard.tabs {
        content.push_str(&tab_panel(tab));
    }
    content.push_str("</div>");

    layout(&overview.dashboard.title, "overview", &sidebar, &content)
}

/// Metrics on top of two chart columns, alternating left and right.
fn tab_panel(tab: &Tab) -> String {
    let mut columns = [String::new(), String::new()];
    for (i, metric) in tab.metrics.iter().enumerate() {
        let _ = write!(
            columns[i % 2],
            r#"<div class="metric"><div class="label">{}</div><div class="value">{}</div></div>"#,
            escape_html(&metric.label),
            escape_html(&metric.value),
        );
    }
    for (i, chart) in tab.charts.iter().enumerate() {
        columns[i % 2].push_str(&chart_figure(chart));
    }

    format!(
        r#"<section class="panel" id="panel-{id}"><div class="columns"><div>{left}</div><div>{right}</div></div></section>"#,
        id = tab.id,
        left = columns[0],
        right = columns[1],
    )
}

fn inclusion_fieldset(name: &str, legend: &str, options: &[String], inclusion: &Inclusion) -> String {
    // The hidden empty value keeps the key present when every box is cleared.
    let mut html = format!(
        r#"<fieldset><legend>{legend}</legend><input type="hidden" name="{name}" value="">"#
    );
    for option in options {
        html.push_str(&checkbox(name, option, option, inclusion.accepts(option)));
    }
    html.push_str("</fieldset>");
    html
}

fn range_inputs<T: Display + Copy>(
    field: &str,
    legend: &str,
    range: Option<ValueRange<T>>,
    bounds: (T, T),
) -> String {
    let current = range.unwrap_or(ValueRange {
        min: bounds.0,
        max: bounds.1,
    });
    format!(
        "<fieldset><legend>{legend}</legend>{}{}</fieldset>",
        number_input(&format!("{field}_min"), "from", current.min, bounds.0, bounds.1),
        number_input(&format!("{field}_max"), "to", current.max, bounds.0, bounds.1),
    )
}

pub fn raw_data_page(
    view: &RawDataView,
    request: &RawDataRequest,
    settings: &RawDataSettings,
) -> String {
    let options = &view.options;
    let mut form = String::from(r#"<form method="get" action="/raw-data"><h2>Filters</h2>"#);

    form.push_str(r#"<fieldset><legend>Columns</legend><input type="hidden" name="columns" value="">"#);
    for column in Column::ALL {
        form.push_str(&checkbox(
            "columns",
            column.key(),
            column.header(),
            request.columns.contains(&column),
        ));
    }
    form.push_str("</fieldset>");

    form.push_str(&inclusion_fieldset("products", "Product", &options.products, &request.filter.products));
    form.push_str(&range_inputs("price", "Price", request.filter.price, (0.0, settings.price_max)));

    let dates = request.filter.purchase_date.or(options.purchase_date);
    if let Some(dates) = dates {
        let bounds = options.purchase_date.unwrap_or(dates);
        let _ = write!(
            form,
            r#"<fieldset><legend>Purchase date</legend><label>from <input type="date" name="date_from" value="{from}" min="{lo}" max="{hi}"></label><label>to <input type="date" name="date_to" value="{to}" min="{lo}" max="{hi}"></label></fieldset>"#,
            from = dates.min.max(bounds.min),
            to = dates.max.min(bounds.max),
            lo = bounds.min,
            hi = bounds.max,
        );
    }

    form.push_str(&inclusion_fieldset("categories", "Product category", &options.categories, &request.filter.categories));
    form.push_str(&range_inputs("freight", "Freight", request.filter.freight, (0.0, settings.freight_max)));
    form.push_str(&inclusion_fieldset("sellers", "Seller", &options.sellers, &request.filter.sellers));
    form.push_str(&inclusion_fieldset("locations", "Purchase location", &options.locations, &request.filter.locations));
    form.push_str(&range_inputs("rating", "Rating", request.filter.rating, (0, settings.rating_max)));
    form.push_str(&inclusion_fieldset("payment_types", "Payment type", &options.payment_types, &request.filter.payment_types));
    form.push_str(&range_inputs(
        "installments",
        "Installments",
        request.filter.installments,
        (0, settings.installments_max),
    ));

    let _ = write!(
        form,
        r#"<p><button type="submit">Apply</button></p><h2>Download</h2><label>File name <input type="text" name="file_name" value="{name}"></label><p><button type="submit" formaction="/api/raw-data/csv">Download table as CSV</button></p></form>"#,
        name = escape_html(&settings.default_file_name),
    );

    let mut content = format!(
        "<p>The table has <strong>{}</strong> rows and <strong>{}</strong> columns ({} rows before filtering).</p>",
        view.table.row_count(),
        view.table.column_count(),
        view.total_rows,
    );
    content.push_str("<table><thead><tr>");
    for header in view.table.headers() {
        let _ = write!(content, "<th>{}</th>", escape_html(header));
    }
    content.push_str("</tr></thead><tbody>");
    for row in &view.table.rows {
        content.push_str("<tr>");
        for cell in row {
            let _ = write!(content, "<td>{}</td>", escape_html(&cell.to_string()));
        }
        content.push_str("</tr>");
    }
    content.push_str("</tbody></table>");

    layout("Raw data", "raw", &form, &content)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let content = format!(
        r#"<div class="error"><strong>{status}</strong><p>{message}</p></div>"#,
        status = status,
        message = escape_html(message),
    );
    layout("Sales Dashboard", "", "", &content)
}
