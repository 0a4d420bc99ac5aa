//! Integration tests for single-point and full-series forecasting.

mod common;

use chrono::TimeDelta;
use renewable_forecast::config::ForecastSettings;
use renewable_forecast::error::ForecastError;
use renewable_forecast::forecast::{
    BatchForecaster, EnergyPanel, EnergyType, ForecastOutcome, ForecastService,
};
use renewable_forecast::index::to_index;
use renewable_forecast::models::{ForecastModel, LinearModel};
use renewable_forecast::series::SeriesStore;

#[test]
fn index_20_uses_first_twenty_samples_once() {
    let (svc, model) = common::counting_service(common::ramp(25), common::ramp(25));
    let outcome = svc
        .forecast(EnergyType::Wind, common::at(20))
        .expect("forecast");

    assert_eq!(model.calls(), 1);
    let expected: Vec<f64> = (0..20).map(f64::from).collect();
    assert_eq!(model.windows(), vec![expected]);
    // sum of 0..20
    assert_eq!(outcome.value_mw(), Some(190.0));
}

#[test]
fn index_5_never_calls_the_model() {
    let (svc, model) = common::counting_service(common::ramp(25), common::ramp(25));
    let outcome = svc
        .forecast(EnergyType::Solar, common::at(5))
        .expect("forecast");
    assert!(matches!(
        outcome,
        ForecastOutcome::InsufficientHistory {
            target_index: 5,
            window_size: 20,
            ..
        }
    ));
    assert_eq!(model.calls(), 0);
}

#[test]
fn one_second_past_ceiling_is_unavailable() {
    let (svc, model) = common::counting_service(common::ramp(25), common::ramp(25));
    let late = ForecastSettings::default().max_valid_datetime + TimeDelta::seconds(1);
    assert_eq!(late, common::datetime(2023, 7, 1, 0, 0, 0));

    let report = svc.forecast_both(late);
    assert!(report.date_unavailable());
    for panel in &report.panels {
        assert!(matches!(
            panel.outcome,
            Ok(ForecastOutcome::DateUnavailable { .. })
        ));
    }
    assert_eq!(model.calls(), 0);
}

#[test]
fn empty_cell_reaches_the_model_unmodified() {
    let mut csv = String::from("a,b,c,d,e,production\n");
    for i in 0..25 {
        if i == 7 {
            csv.push_str("x,x,x,x,x,\n");
        } else {
            csv.push_str(&format!("x,x,x,x,x,{i}\n"));
        }
    }
    let store = SeriesStore::from_reader(csv.as_bytes(), 5, common::start()).expect("loads");
    assert_eq!(store.missing_count(), 1);

    let (svc, model) = common::counting_service(store, common::ramp(25));
    let outcome = svc
        .forecast(EnergyType::Wind, common::at(20))
        .expect("forecast");

    let windows = model.windows();
    assert_eq!(windows.len(), 1);
    assert!(windows[0][7].is_nan());
    assert_eq!(windows[0][8], 8.0);
    match outcome {
        ForecastOutcome::Predicted(r) => {
            assert!(r.value_mw.is_nan());
            assert_eq!(r.missing_in_window, 1);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn identical_requests_are_deterministic() {
    let (svc, model) = common::counting_service(common::ramp(40), common::ramp(40));
    let requested = common::at(33) + TimeDelta::minutes(59);
    let first = svc.forecast_both(requested);
    let second = svc.forecast_both(requested);
    for energy in EnergyType::ALL {
        let a = first.panel(energy).and_then(|p| p.outcome.as_ref().ok());
        let b = second.panel(energy).and_then(|p| p.outcome.as_ref().ok());
        assert!(a.is_some());
        assert_eq!(a, b);
    }
    // one call per energy type per request
    assert_eq!(model.calls(), 4);
}

#[test]
fn batch_predictions_align_with_timestamps() {
    let model = common::CountingModel::default();
    let store = common::ramp(57);
    let points = BatchForecaster::new(20, 32)
        .forecast_all(&store, &model)
        .expect("forecast");

    assert_eq!(points.len(), 37);
    assert_eq!(model.calls(), 37);
    for (i, p) in points.iter().enumerate() {
        assert_eq!(p.timestamp, common::at(20 + i as i64));
        assert_eq!(to_index(common::start(), p.timestamp), (20 + i) as i64);
    }
}

#[test]
fn plot_summary_matches_manual_error() {
    let (svc, _) = common::counting_service(common::ramp(22), common::ramp(22));
    let plot = svc.plot(EnergyType::Wind).expect("plot");
    assert_eq!(plot.forecast.len(), 2);
    // window sums 190 and 210 against actual samples 20 and 21
    let mae = ((190.0_f64 - 20.0).abs() + (210.0_f64 - 21.0).abs()) / 2.0;
    assert_eq!(plot.summary.compared, 2);
    assert_eq!(plot.summary.mae_mw, Some(mae));
}

#[test]
fn failing_model_only_aborts_its_own_panel() {
    let wind: Box<dyn ForecastModel> = Box::new(common::FailingModel);
    let solar: Box<dyn ForecastModel> = Box::new(LinearModel::persistence(20));
    let svc = ForecastService::new(
        ForecastSettings::default(),
        EnergyPanel::new(common::ramp(25), wind),
        EnergyPanel::new(common::ramp(25), solar),
    );

    let report = svc.forecast_both(common::at(21));
    let wind = report.panel(EnergyType::Wind).expect("wind panel");
    assert!(matches!(wind.outcome, Err(ForecastError::ModelInference(_))));
    let solar = report
        .panel(EnergyType::Solar)
        .and_then(|p| p.outcome.as_ref().ok())
        .and_then(ForecastOutcome::value_mw);
    // persistence over sample 20
    assert_eq!(solar, Some(20.0));

    assert!(matches!(
        svc.forecast(EnergyType::Wind, common::at(21)),
        Err(ForecastError::ModelInference(_))
    ));
}
