//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, Paragraph, Wrap};

use super::runtime::App;
use super::style;
use crate::forecast::{ForecastOutcome, ForecastPoint, PanelReport};
use crate::index;
use crate::report::{self, DATE_UNAVAILABLE};

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(2), // request info
            Constraint::Length(5), // panels
            Constraint::Min(10),   // chart
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_request(frame, app, chunks[1]);
    render_panels(frame, app, chunks[2]);
    render_chart(frame, app, chunks[3]);
    render_footer(frame, chunks[4]);
}

/// Header bar: title and selected date/time.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = Line::from(vec![
        Span::styled(
            " RENEWABLE FORECAST ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            format!("Date {}", app.date.format("%Y-%m-%d")),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" │ Time {} ", app.time.format("%H:%M"))),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// "Forecasting production for" and index lines, or the unavailable error.
fn render_request(frame: &mut Frame, app: &App, area: Rect) {
    let lines = if app.report.date_unavailable() {
        vec![Line::from(Span::styled(
            format!("  {DATE_UNAVAILABLE}"),
            Style::default().fg(style::ERROR_FG),
        ))]
    } else {
        vec![
            Line::from(format!(
                "  Forecasting production for: {}",
                report::format_datetime(app.report.requested)
            )),
            Line::from(format!(
                "  Corresponding index in the series: {}",
                app.report.target_index
            )),
        ]
    };
    frame.render_widget(Paragraph::new(lines), area);
}

/// Wind and solar outcome boxes side by side.
fn render_panels(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (panel, chunk) in app.report.panels.iter().zip(chunks.iter()) {
        render_panel(frame, app, panel, *chunk);
    }
}

fn render_panel(frame: &mut Frame, app: &App, panel: &PanelReport, area: Rect) {
    let color = match panel.outcome {
        Ok(ForecastOutcome::Predicted(_)) => style::SUCCESS_FG,
        _ => style::ERROR_FG,
    };
    let mut lines = vec![Line::from(Span::styled(
        report::outcome_message(panel.energy, &panel.outcome),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];
    if let Some(note) = report::missing_note(&panel.outcome, app.window_size()) {
        lines.push(Line::from(Span::styled(
            note,
            Style::default().fg(style::NOTE_FG),
        )));
    }

    let block = Block::default()
        .title(format!(" {} ", report::panel_title(panel.energy)))
        .borders(Borders::ALL);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Chart x coordinates are hours since the series start.
fn chart_points(points: &[ForecastPoint], start: chrono::NaiveDateTime) -> Vec<(f64, f64)> {
    points
        .iter()
        .filter(|p| !p.value_mw.is_nan())
        .map(|p| (index::to_index(start, p.timestamp) as f64, p.value_mw))
        .collect()
}

/// Actual vs forecast chart of the focused energy type.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL);

    let plot = match (app.show_plot, app.plot()) {
        (false, _) => {
            let hint = Paragraph::new("  Press p to show the forecast plots.")
                .block(block.title(" Forecast Plot "));
            frame.render_widget(hint, area);
            return;
        }
        (true, None) => {
            let message = app
                .plot_error
                .clone()
                .unwrap_or_else(|| "Plot unavailable".to_string());
            let error = Paragraph::new(Span::styled(
                format!("  {message}"),
                Style::default().fg(style::ERROR_FG),
            ))
            .block(block.title(" Forecast Plot "));
            frame.render_widget(error, area);
            return;
        }
        (true, Some(plot)) => plot,
    };

    let view = plot.visible(app.range);
    let Some(origin) = plot.actual.first().map(|p| p.timestamp) else {
        frame.render_widget(Paragraph::new("  No samples loaded.").block(block), area);
        return;
    };
    let actual_data = chart_points(view.actual, origin);
    let forecast_data = chart_points(view.forecast, origin);

    let y_bounds = style::auto_bounds_y(&actual_data, &forecast_data);
    let [x_lo, x_hi] = style::bounds_x(view.actual, view.forecast, origin);

    let first_label = view
        .actual
        .first()
        .map(|p| p.timestamp.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    let last_label = view
        .actual
        .last()
        .map(|p| p.timestamp.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    let datasets = vec![
        Dataset::default()
            .name(format!("Actual {} Production", plot.energy))
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::ACTUAL_COLOR))
            .data(&actual_data),
        Dataset::default()
            .name(format!("Forecasted {} Production", plot.energy))
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::forecast_color(plot.energy)))
            .data(&forecast_data),
    ];

    let title = format!(
        " Actual vs Forecasted {} Energy Production [{}] ",
        plot.energy, app.range
    );
    let chart = Chart::new(datasets)
        .block(block.title(title))
        .x_axis(
            Axis::default()
                .title("Date")
                .bounds([x_lo, x_hi])
                .labels(vec![first_label, last_label]),
        )
        .y_axis(
            Axis::default()
                .title("Production (MW)")
                .bounds(y_bounds)
                .labels(vec![
                    format!("{:.1}", y_bounds[0]),
                    format!("{:.1}", y_bounds[1]),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Footer with keybinding hints.
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        " q:Quit  ←/→:Day  PgUp/PgDn:Week  ↑/↓:Hour  p:Plot  Tab:Wind/Solar  z:Range  r:Reset",
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}
