// SVG rendering of dashboard charts
use crate::domain::dashboard::{Bar, ChartBody, LineSeries as YearSeries, MapPoint};
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

const SIZE: (u32, u32) = (640, 360);
const MAP_SIZE: (u32, u32) = (480, 520);

const PALETTE: [RGBColor; 6] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
];

// Longitude/latitude window of the map (South America).
const LON_RANGE: std::ops::Range<f64> = -82.0..-34.0;
const LAT_RANGE: std::ops::Range<f64> = -56.0..13.0;

/// Integers without decimals, everything else with two.
pub fn short_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Renders a chart body to a standalone SVG document.
pub fn chart_svg(body: &ChartBody, value_title: Option<&str>) -> Result<String> {
    let size = match body {
        ChartBody::Map { .. } => MAP_SIZE,
        _ => SIZE,
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;

        match body {
            ChartBody::Map { points } if !points.is_empty() => draw_map(&root, points)?,
            ChartBody::Line { series, y_max } if !series.is_empty() => {
                draw_lines(&root, series, *y_max, value_title)?
            }
            ChartBody::Bar { bars } if !bars.is_empty() => draw_bars(&root, bars, value_title)?,
            ChartBody::HorizontalBar { bars } if !bars.is_empty() => {
                draw_horizontal_bars(&root, bars)?
            }
            _ => draw_empty(&root, size)?,
        }

        root.present()?;
    }

    Ok(svg)
}

fn draw_empty<DB>(root: &DrawingArea<DB, Shift>, size: (u32, u32)) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.draw(&Text::new(
        "No data",
        (size.0 as i32 / 2 - 30, size.1 as i32 / 2),
        ("sans-serif", 18).into_font().color(&BLACK.mix(0.6)),
    ))?;
    Ok(())
}

fn segment_label(value: &SegmentValue<&String>) -> String {
    match value {
        SegmentValue::Exact(label) | SegmentValue::CenterOf(label) => (*label).clone(),
        SegmentValue::Last => String::new(),
    }
}

fn draw_bars<DB>(root: &DrawingArea<DB, Shift>, bars: &[Bar], value_title: Option<&str>) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
    let y_max = bars.iter().map(|b| b.value).fold(0.0, f64::max).max(1.0) * 1.1;

    let mut chart = ChartBuilder::on(root)
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(labels.as_slice().into_segmented(), 0.0..y_max)?;

    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&segment_label)
        .y_label_formatter(&|v| short_value(*v))
        .label_style(("sans-serif", 13));
    if let Some(title) = value_title {
        mesh.y_desc(title);
    }
    mesh.draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(PALETTE[0].filled())
            .margin(10)
            .data(bars.iter().map(|b| (&b.label, b.value))),
    )?;

    chart.draw_series(bars.iter().map(|b| {
        Text::new(
            short_value(b.value),
            (SegmentValue::CenterOf(&b.label), b.value),
            ("sans-serif", 12),
        )
    }))?;

    Ok(())
}

/// Ranked bars, first entry on top.
fn draw_horizontal_bars<DB>(root: &DrawingArea<DB, Shift>, bars: &[Bar]) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let labels: Vec<String> = bars.iter().rev().map(|b| b.label.clone()).collect();
    let x_max = bars.iter().map(|b| b.value).fold(0.0, f64::max).max(1.0) * 1.15;

    let mut chart = ChartBuilder::on(root)
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 150)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0.0..x_max, labels.as_slice().into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(labels.len())
        .y_label_formatter(&segment_label)
        .x_label_formatter(&|v| short_value(*v))
        .label_style(("sans-serif", 13))
        .draw()?;

    chart.draw_series(
        Histogram::horizontal(&chart)
            .style(PALETTE[0].filled())
            .margin(6)
            .data(bars.iter().map(|b| (&b.label, b.value))),
    )?;

    chart.draw_series(bars.iter().map(|b| {
        Text::new(
            short_value(b.value),
            (b.value, SegmentValue::CenterOf(&b.label)),
            ("sans-serif", 12),
        )
    }))?;

    Ok(())
}

/// One line per year over a categorical month axis, in first-appearance order.
fn draw_lines<DB>(
    root: &DrawingArea<DB, Shift>,
    series: &[YearSeries],
    y_max: f64,
    value_title: Option<&str>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut categories: Vec<String> = Vec::new();
    for point in series.iter().flat_map(|s| s.points.iter()) {
        if !categories.contains(&point.label) {
            categories.push(point.label.clone());
        }
    }
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(categories.as_slice().into_segmented(), 0.0..y_max)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_labels(categories.len())
        .x_label_formatter(&segment_label)
        .y_label_formatter(&|v| short_value(*v))
        .label_style(("sans-serif", 13));
    if let Some(title) = value_title {
        mesh.y_desc(title);
    }
    mesh.draw()?;

    for (idx, year) in series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let style = ShapeStyle {
            color: color.to_rgba(),
            filled: false,
            stroke_width: 2 + (idx % 2) as u32,
        };

        chart
            .draw_series(LineSeries::new(
                year.points
                    .iter()
                    .map(|p| (SegmentValue::CenterOf(&p.label), p.value)),
                style,
            ))?
            .label(year.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

        chart.draw_series(
            year.points
                .iter()
                .map(|p| Circle::new((SegmentValue::CenterOf(&p.label), p.value), 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK.mix(0.3))
        .label_font(("sans-serif", 13))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}

/// Markers over longitude/latitude; marker area grows with the value.
fn draw_map<DB>(root: &DrawingArea<DB, Shift>, points: &[MapPoint]) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let v_max = points.iter().map(|p| p.value).fold(0.0, f64::max).max(1.0);

    let mut chart = ChartBuilder::on(root)
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 40)
        .set_label_area_size(LabelAreaPosition::Bottom, 30)
        .build_cartesian_2d(LON_RANGE, LAT_RANGE)?;

    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .label_style(("sans-serif", 11))
        .draw()?;

    chart.draw_series(points.iter().map(|p| {
        let radius = (3.0 + 22.0 * (p.value / v_max).sqrt()) as i32;
        Circle::new((p.lon, p.lat), radius, PALETTE[0].mix(0.6).filled())
    }))?;

    chart.draw_series(points.iter().map(|p| {
        Text::new(p.label.clone(), (p.lon, p.lat), ("sans-serif", 11))
    }))?;

    Ok(())
}
