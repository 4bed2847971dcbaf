// 🖼️ Chart Renderer - Four-panel PNG summary
//
//   ┌───────────────────────┬───────────────────────┐
//   │ share per station     │ latest-year ranking   │
//   ├───────────────────────┼───────────────────────┤
//   │ share by type (pie)   │ start-to-end deltas   │
//   └───────────────────────┴───────────────────────┘

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use std::path::Path;
use tracing::{info, warn};

use crate::analysis::{category_summary, ranking, station_trends};
use crate::entities::parse_hex_color;
use crate::table::AudienceTable;

pub const CHART_SIZE: (u32, u32) = (1800, 1400);

const FONT: &str = "sans-serif";
const TITLE_SIZE: i32 = 26;
const LABEL_SIZE: i32 = 16;
const FALLBACK: RGBColor = RGBColor(128, 128, 128);

/// Render the four panels into a PNG file
pub fn render_chart<P: AsRef<Path>>(table: &AudienceTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((2, 2));
    draw_time_series(&panels[0], table)?;
    draw_ranking(&panels[1], table)?;
    draw_category_pie(&panels[2], table)?;
    draw_trends(&panels[3], table)?;

    root.present()?;
    info!(path = %path.display(), "chart rendered");
    Ok(())
}

fn rgb(token: &str) -> RGBColor {
    match parse_hex_color(token) {
        Some((r, g, b)) => RGBColor(r, g, b),
        None => {
            warn!(color = token, "unparseable colour, using grey");
            FALLBACK
        }
    }
}

fn label_font<'a>(color: &RGBColor, h: HPos) -> TextStyle<'a> {
    (FONT, LABEL_SIZE)
        .into_font()
        .color(color)
        .pos(Pos::new(h, VPos::Center))
}

/// Label for a horizontal bar chart whose rows sit at integer y positions.
///
/// `labels` are ordered bottom to top.
pub fn bar_label(labels: &[String], y: f64) -> String {
    let row = y.round();
    if (y - row).abs() > 1e-6 || row < 0.0 {
        return String::new();
    }
    labels.get(row as usize).cloned().unwrap_or_default()
}

fn draw_no_data<DB>(area: &DrawingArea<DB, Shift>, title: &str) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let inner = area.titled(title, (FONT, TITLE_SIZE))?;
    let (w, h) = inner.dim_in_pixel();
    inner.draw(&Text::new(
        "no data",
        (w as i32 / 2, h as i32 / 2),
        label_font(&BLACK, HPos::Center),
    ))?;
    Ok(())
}

// ============================================================================
// PANEL 1 - TIME SERIES
// ============================================================================

fn draw_time_series<DB>(area: &DrawingArea<DB, Shift>, table: &AudienceTable) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (Some(first), Some(last)) = (table.first_year(), table.latest_year()) else {
        return draw_no_data(area, "Audience share per station");
    };

    let y_max = table
        .records()
        .iter()
        .map(|r| r.audience_share)
        .fold(0.0, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("Audience share of Réunion radio stations ({}-{})", first, last),
            (FONT, TITLE_SIZE),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first..last + 1, 0.0..y_max.max(1.0))?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Audience share (%)")
        .x_label_formatter(&|year| year.to_string())
        .draw()?;

    for name in table.station_names() {
        let rows = table.for_station(name);
        let color = rows.first().map(|r| rgb(&r.color)).unwrap_or(FALLBACK);
        let points: Vec<(i32, f64)> = rows.iter().map(|r| (r.year, r.audience_share)).collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

// ============================================================================
// PANEL 2 - LATEST-YEAR RANKING
// ============================================================================

fn draw_ranking<DB>(area: &DrawingArea<DB, Shift>, table: &AudienceTable) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let Some(latest) = table.latest_year() else {
        return draw_no_data(area, "Audience ranking");
    };

    let ranked = ranking(table, latest, 10);
    let n = ranked.len();
    let x_max = ranked.iter().map(|r| r.value).fold(0.0, f64::max) * 1.15 + 1.0;

    // Largest at the top
    let labels: Vec<String> = ranked.iter().rev().map(|r| r.station.clone()).collect();
    let row_of = |i: usize| (n - 1 - i) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(format!("Audience ranking {}", latest), (FONT, TITLE_SIZE))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(140)
        .build_cartesian_2d(0.0..x_max, -0.5..(n as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|y| bar_label(&labels, *y))
        .x_desc("Audience share (%)")
        .draw()?;

    chart.draw_series(ranked.iter().enumerate().map(|(i, r)| {
        let y = row_of(i);
        Rectangle::new([(0.0, y - 0.35), (r.value, y + 0.35)], rgb(&r.color).filled())
    }))?;
    chart.draw_series(ranked.iter().enumerate().map(|(i, r)| {
        Text::new(
            format!("{:.1}%", r.value),
            (r.value + 0.1, row_of(i)),
            label_font(&BLACK, HPos::Left),
        )
    }))?;
    Ok(())
}

// ============================================================================
// PANEL 3 - CATEGORY PIE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub fraction: f64,
    /// Degrees, counter-clockwise from 3 o'clock
    pub start_deg: f64,
    pub end_deg: f64,
}

impl PieSlice {
    pub fn mid_deg(&self) -> f64 {
        (self.start_deg + self.end_deg) / 2.0
    }
}

/// Split values into counter-clockwise slices starting at `start_deg`.
///
/// Non-positive values are skipped; an all-zero input gives no slices.
pub fn pie_slices(values: &[(String, f64)], start_deg: f64) -> Vec<PieSlice> {
    let total: f64 = values.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut angle = start_deg;
    values
        .iter()
        .filter(|(_, v)| *v > 0.0)
        .map(|(label, value)| {
            let fraction = value / total;
            let slice = PieSlice {
                label: label.clone(),
                value: *value,
                fraction,
                start_deg: angle,
                end_deg: angle + fraction * 360.0,
            };
            angle = slice.end_deg;
            slice
        })
        .collect()
}

/// Pixel point at `radius` and `deg` around `center` (screen y grows down)
pub fn polar_point(center: (i32, i32), radius: f64, deg: f64) -> (i32, i32) {
    let rad = deg * PI / 180.0;
    (
        center.0 + (radius * rad.cos()).round() as i32,
        center.1 - (radius * rad.sin()).round() as i32,
    )
}

/// Closed polygon for one slice: center, then the arc every 2 degrees or less
pub fn slice_polygon(center: (i32, i32), radius: f64, slice: &PieSlice) -> Vec<(i32, i32)> {
    let sweep = slice.end_deg - slice.start_deg;
    let steps = ((sweep / 2.0).ceil() as usize).max(1);

    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for step in 0..=steps {
        let deg = slice.start_deg + sweep * step as f64 / steps as f64;
        points.push(polar_point(center, radius, deg));
    }
    points
}

fn draw_category_pie<DB>(area: &DrawingArea<DB, Shift>, table: &AudienceTable) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let Some(latest) = table.latest_year() else {
        return draw_no_data(area, "Share by station type");
    };

    let summary = category_summary(table, latest);
    let values: Vec<(String, f64)> = summary
        .iter()
        .map(|g| (g.category.as_str().to_string(), g.sum))
        .collect();
    let slices = pie_slices(&values, 90.0);

    let inner = area.titled(
        &format!("Share by station type in {}", latest),
        (FONT, TITLE_SIZE),
    )?;
    let (w, h) = inner.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.36;

    for (slice, group) in slices.iter().zip(summary.iter().filter(|g| g.sum > 0.0)) {
        let color = rgb(group.category.pie_color());
        inner.draw(&Polygon::new(
            slice_polygon(center, radius, slice),
            color.filled(),
        ))?;

        inner.draw(&Text::new(
            slice.label.clone(),
            polar_point(center, radius * 1.15, slice.mid_deg()),
            label_font(&BLACK, HPos::Center),
        ))?;
        inner.draw(&Text::new(
            format!("{:.1}%", slice.fraction * 100.0),
            polar_point(center, radius * 0.6, slice.mid_deg()),
            label_font(&BLACK, HPos::Center),
        ))?;
    }
    Ok(())
}

// ============================================================================
// PANEL 4 - TREND DELTAS
// ============================================================================

fn draw_trends<DB>(area: &DrawingArea<DB, Shift>, table: &AudienceTable) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let trends = station_trends(table);
    let (Some(first), Some(last)) = (table.first_year(), table.latest_year()) else {
        return draw_no_data(area, "Trends");
    };
    if trends.is_empty() {
        return draw_no_data(area, "Trends");
    }

    let n = trends.len();
    let low = trends.iter().map(|t| t.delta).fold(0.0, f64::min) - 1.0;
    let high = trends.iter().map(|t| t.delta).fold(0.0, f64::max) + 1.0;

    // First station at the top
    let labels: Vec<String> = trends.iter().rev().map(|t| t.station.clone()).collect();
    let row_of = |i: usize| (n - 1 - i) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("Trends {}-{} (change in points)", first, last),
            (FONT, TITLE_SIZE),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(140)
        .build_cartesian_2d(low..high, -0.5..(n as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|y| bar_label(&labels, *y))
        .x_desc("Change (% points)")
        .draw()?;

    chart.draw_series(trends.iter().enumerate().map(|(i, t)| {
        let y = row_of(i);
        Rectangle::new([(0.0, y - 0.35), (t.delta, y + 0.35)], rgb(&t.color).filled())
    }))?;

    chart.draw_series(LineSeries::new(
        vec![(0.0, -0.5), (0.0, n as f64 - 0.5)],
        BLACK.stroke_width(2),
    ))?;

    let green = RGBColor(0, 128, 0);
    chart.draw_series(trends.iter().enumerate().map(|(i, t)| {
        let (offset, color, anchor) = if t.delta >= 0.0 {
            (0.1, green, HPos::Left)
        } else {
            (-0.1, RED, HPos::Right)
        };
        Text::new(
            format!("{:+.1}", t.delta),
            (t.delta + offset, row_of(i)),
            label_font(&color, anchor),
        )
    }))?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
