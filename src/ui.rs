use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table, TableState,
    },
    Frame, Terminal,
};
use std::io;

use reunion_radio::{
    category_summary, parse_hex_color, ranking, station_trends, AudienceTable, CategorySummary,
    RankedStation, StationTrend,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Series,
    Ranking,
    Types,
    Trends,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Series => Page::Ranking,
            Page::Ranking => Page::Types,
            Page::Types => Page::Trends,
            Page::Trends => Page::Series,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Series => Page::Trends,
            Page::Ranking => Page::Series,
            Page::Types => Page::Ranking,
            Page::Trends => Page::Types,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Series => "Series",
            Page::Ranking => "Ranking",
            Page::Types => "By Type",
            Page::Trends => "Trends",
        }
    }

    fn all() -> [Page; 4] {
        [Page::Series, Page::Ranking, Page::Types, Page::Trends]
    }
}

pub struct App {
    pub table: AudienceTable,
    pub latest_year: Option<i32>,
    pub ranking: Vec<RankedStation>,
    pub trends: Vec<StationTrend>,
    pub categories: Vec<CategorySummary>,
    pub current_page: Page,
    pub trends_state: TableState,
}

impl App {
    pub fn new(table: AudienceTable) -> Self {
        let latest_year = table.latest_year();
        let ranking = latest_year
            .map(|year| ranking(&table, year, 10))
            .unwrap_or_default();
        let categories = latest_year
            .map(|year| category_summary(&table, year))
            .unwrap_or_default();
        let trends = station_trends(&table);

        let mut trends_state = TableState::default();
        if !trends.is_empty() {
            trends_state.select(Some(0));
        }

        Self {
            table,
            latest_year,
            ranking,
            trends,
            categories,
            current_page: Page::Series,
            trends_state,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next_row(&mut self) {
        if self.trends.is_empty() {
            return;
        }
        let i = match self.trends_state.selected() {
            Some(i) if i + 1 < self.trends.len() => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.trends_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        if self.trends.is_empty() {
            return;
        }
        let i = match self.trends_state.selected() {
            Some(0) | None => self.trends.len() - 1,
            Some(i) => i - 1,
        };
        self.trends_state.select(Some(i));
    }

    /// Share of each category in the latest-year total (percent)
    pub fn category_shares(&self) -> Vec<(String, f64)> {
        let total: f64 = self.categories.iter().map(|c| c.sum).sum();
        self.categories
            .iter()
            .map(|c| {
                let share = if total > 0.0 { c.sum / total * 100.0 } else { 0.0 };
                (c.category.as_str().to_string(), share)
            })
            .collect()
    }
}

fn tui_color(token: &str) -> Color {
    match parse_hex_color(token) {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::Gray,
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "dashboard stopped");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Down | KeyCode::Char('j') => app.next_row(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_row(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Series => render_series(f, chunks[1], app),
        Page::Ranking => render_ranking(f, chunks[1], app),
        Page::Types => render_types(f, chunks[1], app),
        Page::Trends => render_trends(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::all().iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Rows: {}", app.table.len()),
        Style::default().fg(Color::White),
    ));
    if let Some(year) = app.latest_year {
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled(
            format!("Latest: {}", year),
            Style::default().fg(Color::Green),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_series(f: &mut Frame, area: Rect, app: &App) {
    let (Some(first), Some(last)) = (app.table.first_year(), app.latest_year) else {
        render_empty(f, area, "Series");
        return;
    };

    let names = app.table.station_names();
    let series: Vec<(String, Color, Vec<(f64, f64)>)> = names
        .iter()
        .map(|name| {
            let rows = app.table.for_station(name);
            let color = rows.first().map(|r| tui_color(&r.color)).unwrap_or(Color::Gray);
            let points = rows
                .iter()
                .map(|r| (f64::from(r.year), r.audience_share))
                .collect();
            (name.to_string(), color, points)
        })
        .collect();

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(name, color, points)| {
            Dataset::default()
                .name(name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(points)
        })
        .collect();

    let y_max = app
        .table
        .records()
        .iter()
        .map(|r| r.audience_share)
        .fold(0.0, f64::max)
        .ceil()
        + 1.0;

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!(" Audience share {}-{} ", first, last))
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("Year")
                .style(Style::default().fg(Color::Gray))
                .bounds([f64::from(first), f64::from(last)])
                .labels(vec![
                    Span::raw(first.to_string()),
                    Span::raw(((first + last) / 2).to_string()),
                    Span::raw(last.to_string()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("%")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", y_max / 2.0)),
                    Span::raw(format!("{:.0}", y_max)),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_ranking(f: &mut Frame, area: Rect, app: &App) {
    let Some(year) = app.latest_year else {
        render_empty(f, area, "Ranking");
        return;
    };

    // Bars carry tenths of a point so one decimal survives the u64 values
    let bars: Vec<Bar> = app
        .ranking
        .iter()
        .map(|r| {
            Bar::default()
                .value((r.value * 10.0).round() as u64)
                .text_value(format!("{:.1}%", r.value))
                .label(Line::from(format!("{}. {}", r.rank, r.station)))
                .style(Style::default().fg(tui_color(&r.color)))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(format!(" Ranking {} ", year))
                .borders(Borders::ALL),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn render_types(f: &mut Frame, area: Rect, app: &App) {
    let Some(year) = app.latest_year else {
        render_empty(f, area, "By Type");
        return;
    };

    let header = Row::new(["Type", "Sum", "Mean", "Count", "Share"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let shares = app.category_shares();
    let rows: Vec<Row> = app
        .categories
        .iter()
        .zip(shares.iter())
        .map(|(c, (_, share))| {
            Row::new(vec![
                Cell::from(c.category.as_str()).style(
                    Style::default().fg(tui_color(c.category.pie_color())),
                ),
                Cell::from(format!("{:.1}", c.sum)),
                Cell::from(format!("{:.1}", c.mean)),
                Cell::from(c.count.to_string()),
                Cell::from(format!("{:.1}%", share)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!(" Breakdown by type ({}) ", year))
            .borders(Borders::ALL),
    );

    f.render_widget(table, area);
}

fn render_trends(f: &mut Frame, area: Rect, app: &mut App) {
    let header = Row::new(
        ["Station", "Type", "First", "Last", "Change", "Min", "Max", "Mean"]
            .iter()
            .map(|h| {
                Cell::from(*h).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            }),
    );

    let rows: Vec<Row> = app
        .trends
        .iter()
        .map(|t| {
            let delta_color = if t.delta >= 0.0 { Color::Green } else { Color::Red };
            Row::new(vec![
                Cell::from(t.station.clone()).style(Style::default().fg(tui_color(&t.color))),
                Cell::from(t.category.as_str()),
                Cell::from(format!("{:.1}", t.first)),
                Cell::from(format!("{:.1}", t.last)),
                Cell::from(format!("{:+.1}", t.delta)).style(Style::default().fg(delta_color)),
                Cell::from(format!("{:.1}", t.min)),
                Cell::from(format!("{:.1}", t.max)),
                Cell::from(format!("{:.1}", t.mean)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(13),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(Block::default().title(" Trends ").borders(Borders::ALL))
    .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("► ");

    f.render_stateful_widget(table, area, &mut app.trends_state);
}

fn render_empty(f: &mut Frame, area: Rect, title: &str) {
    let paragraph = Paragraph::new("No data")
        .block(Block::default().title(format!(" {} ", title)).borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect) {
    let status_spans = vec![
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use reunion_radio::{GeneratorConfig, SeriesGenerator, StationRegistry, TrendRegistry};

    fn app() -> App {
        let stations = StationRegistry::new();
        let trends = TrendRegistry::new();
        let generator =
            SeriesGenerator::new(&stations, &trends, GeneratorConfig::default()).unwrap();
        let series = generator.generate(&mut StdRng::seed_from_u64(8));
        App::new(AudienceTable::flatten(&series, &stations).unwrap())
    }

    #[test]
    fn test_page_cycle() {
        let mut page = Page::Series;
        for _ in 0..4 {
            page = page.next();
        }
        assert_eq!(page, Page::Series);
        assert_eq!(Page::Series.previous(), Page::Trends);
    }

    #[test]
    fn test_app_state() {
        let mut app = app();

        assert_eq!(app.latest_year, Some(2025));
        assert_eq!(app.ranking.len(), 8);
        assert_eq!(app.trends.len(), 8);
        assert_eq!(app.trends_state.selected(), Some(0));

        app.previous_row();
        assert_eq!(app.trends_state.selected(), Some(7));
        app.next_row();
        assert_eq!(app.trends_state.selected(), Some(0));

        let total: f64 = app.category_shares().iter().map(|(_, s)| s).sum();
        assert!((total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_app() {
        let mut app = App::new(AudienceTable::default());
        assert!(app.ranking.is_empty());
        assert_eq!(app.trends_state.selected(), None);
        app.next_row();
        assert_eq!(app.trends_state.selected(), None);
    }
}
