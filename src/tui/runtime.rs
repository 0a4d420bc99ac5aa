//! Dashboard state: selected datetime, panel outcomes, and chart view.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::config::PresentationConfig;
use crate::forecast::{DashboardReport, EnergyType, ForecastService, PlotData, PlotRange};
use crate::models::PretrainedModel;

/// TUI application state.
pub struct App {
    service: ForecastService<PretrainedModel>,
    presentation: PresentationConfig,
    /// Selected calendar date, always within the presentation bounds.
    pub date: NaiveDate,
    /// Selected time of day.
    pub time: NaiveTime,
    /// Forecasts for the selected datetime.
    pub report: DashboardReport,
    /// Whether the chart is shown.
    pub show_plot: bool,
    /// Energy type drawn in the chart.
    pub focus: EnergyType,
    /// Backward-looking chart range.
    pub range: PlotRange,
    /// Plot data per energy type, computed on first display.
    plots: [Option<PlotData>; 2],
    /// Last plot failure, shown instead of the chart.
    pub plot_error: Option<String>,
    /// Whether the user has requested quit.
    pub quit: bool,
}

fn slot(energy: EnergyType) -> usize {
    match energy {
        EnergyType::Wind => 0,
        EnergyType::Solar => 1,
    }
}

impl App {
    /// Creates an app preselecting `initial`, clamped to the selectable dates.
    pub fn new(
        service: ForecastService<PretrainedModel>,
        presentation: PresentationConfig,
        initial: NaiveDateTime,
    ) -> Self {
        let date = initial
            .date()
            .clamp(presentation.min_date, presentation.max_date);
        let time = initial.time();
        let report = service.forecast_both(date.and_time(time));
        Self {
            service,
            presentation,
            date,
            time,
            report,
            show_plot: false,
            focus: EnergyType::Wind,
            range: PlotRange::default(),
            plots: [None, None],
            plot_error: None,
            quit: false,
        }
    }

    /// The selected datetime.
    pub fn requested(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Window length of the loaded models.
    pub fn window_size(&self) -> usize {
        self.service.settings().window_size
    }

    fn refresh(&mut self) {
        self.report = self.service.forecast_both(self.requested());
    }

    /// Moves the selected date by `days`, staying within the presentation bounds.
    pub fn shift_days(&mut self, days: i64) {
        let p = &self.presentation;
        let next = self
            .date
            .checked_add_signed(TimeDelta::days(days))
            .unwrap_or(self.date)
            .clamp(p.min_date, p.max_date);
        if next != self.date {
            self.date = next;
            self.refresh();
        }
    }

    /// Moves the selected time by `hours`, rolling over into the adjacent day.
    ///
    /// At the first or last selectable day the time stops at 00:00 / 23:00
    /// instead of leaving the bounds.
    pub fn shift_hours(&mut self, hours: i64) {
        let p = &self.presentation;
        let first = p.min_date.and_time(NaiveTime::default());
        let last_hour = NaiveTime::from_hms_opt(23, self.time.minute(), 0).unwrap_or_default();
        let last = p.max_date.and_time(last_hour);
        let next = (self.requested() + TimeDelta::hours(hours)).clamp(first, last);
        if next != self.requested() {
            self.date = next.date();
            self.time = next.time();
            self.refresh();
        }
    }

    /// Returns to the preselected date and time.
    pub fn reset(&mut self) {
        let initial = self.presentation.default_datetime();
        self.date = initial.date();
        self.time = initial.time();
        self.refresh();
    }

    /// Shows or hides the chart, computing the plot data on first use.
    pub fn toggle_plot(&mut self) {
        self.show_plot = !self.show_plot;
        if self.show_plot {
            self.ensure_plot();
        }
    }

    /// Switches the chart between wind and solar.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            EnergyType::Wind => EnergyType::Solar,
            EnergyType::Solar => EnergyType::Wind,
        };
        if self.show_plot {
            self.ensure_plot();
        }
    }

    /// Advances the chart range 1d → 1w → all.
    pub fn cycle_range(&mut self) {
        self.range = self.range.cycle();
    }

    /// Plot data of the focused energy type, if already computed.
    pub fn plot(&self) -> Option<&PlotData> {
        self.plots[slot(self.focus)].as_ref()
    }

    fn ensure_plot(&mut self) {
        let i = slot(self.focus);
        if self.plots[i].is_some() {
            return;
        }
        match self.service.plot(self.focus) {
            Ok(plot) => {
                self.plots[i] = Some(plot);
                self.plot_error = None;
            }
            Err(e) => self.plot_error = Some(e.to_string()),
        }
    }
}
