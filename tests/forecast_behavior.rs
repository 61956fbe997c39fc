//! Behavior tests for the ARIMA forecaster.
//!
//! These cover what callers rely on: horizon-sized output on calendar days
//! after the last observation, and `ForecastFailed` whenever the model
//! cannot be fitted.

use rstest::rstest;
use time::Duration;
use tradetalk_core::forecast::forecast;
use tradetalk_core::{
    ArimaOrder, Bar, CoreError, ErrorKind, Forecast, ForecastEngine, Horizon, Interval,
    PriceSeries, Symbol, UtcDateTime,
};

fn daily_series(closes: &[f64]) -> PriceSeries {
    let start = UtcDateTime::parse("2024-01-02T21:00:00Z").expect("valid timestamp");
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let ts = start
                .checked_add(Duration::days(i as i64))
                .expect("in range");
            Bar::new(ts, close, close, close, close, Some(1_000)).expect("valid bar")
        })
        .collect();
    PriceSeries::new(Symbol::parse("AAPL").expect("valid"), Interval::OneDay, bars)
}

fn random_walk(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut price = 150.0;
    (0..len)
        .map(|_| {
            price += rng.f64() * 4.0 - 2.0;
            price
        })
        .collect()
}

// =============================================================================
// Forecast: Output Shape
// =============================================================================

#[rstest]
#[case(1)]
#[case(10)]
#[case(30)]
fn when_history_is_long_enough_forecast_has_exactly_horizon_points(#[case] days: i64) {
    // Given: A year of noisy daily closes
    let series = daily_series(&random_walk(252, 42));

    // When: The system forecasts `days` periods
    let result = forecast(&series, Horizon::new(days).expect("valid horizon"));

    // Then: One point per requested period, all finite
    let forecast = result.expect("forecast should succeed");
    assert_eq!(forecast.points.len() as i64, days);
    assert!(forecast
        .points
        .iter()
        .all(|point| point.predicted_price.is_finite()));
}

#[test]
fn forecast_dates_are_consecutive_calendar_days_after_last_bar() {
    // Given: Thirty observations ending on a known day
    let series = daily_series(&random_walk(30, 7));
    let last_ts = series.last().expect("non-empty").ts;

    // When: The system forecasts ten periods
    let forecast = forecast(&series, Horizon::new(10).expect("valid")).expect("fits");

    // Then: Dates start the day after and increase one day at a time
    let mut previous = last_ts;
    for point in &forecast.points {
        assert!(point.date > previous, "dates must be strictly increasing");
        assert_eq!(
            point.date.unix_timestamp() - previous.unix_timestamp(),
            86_400
        );
        previous = point.date;
    }
}

#[test]
fn forecast_reports_the_fitted_model() {
    let series = daily_series(&random_walk(120, 3));

    let forecast = ForecastEngine::default()
        .forecast(&series, Horizon::new(5).expect("valid"))
        .expect("fits");

    assert_eq!(forecast.order, ArimaOrder::DEFAULT);
    assert_eq!(forecast.coefficients.len(), 5);
    assert_eq!(forecast.observations, 120);
    assert!(forecast.sigma2 >= 0.0);
}

#[test]
fn same_history_gives_same_forecast() {
    let series = daily_series(&random_walk(90, 11));
    let horizon = Horizon::new(15).expect("valid");

    let first = forecast(&series, horizon).expect("fits");
    let second = forecast(&series, horizon).expect("fits");

    assert_eq!(first, second);
}

// =============================================================================
// Forecast: Failure Modes
// =============================================================================

fn assert_forecast_failed(result: Result<Forecast, CoreError>) -> String {
    let error = result.expect_err("forecast should fail");
    assert_eq!(error.kind(), ErrorKind::ForecastFailed);
    error.to_string()
}

#[test]
fn when_history_is_too_short_forecast_fails() {
    // Given: Fewer closes than ARIMA(5,1,0) needs
    let series = daily_series(&random_walk(8, 1));

    // When / Then: ForecastFailed naming the requirement
    let message = assert_forecast_failed(forecast(&series, Horizon::new(10).expect("valid")));
    assert!(message.contains("needs at least 12 observations"), "{message}");
}

#[test]
fn minimum_history_is_exactly_twelve_closes() {
    let order = ArimaOrder::DEFAULT;
    assert_eq!(order.min_observations(), 12);

    // Given: Exactly the minimum number of closes
    let at_minimum = daily_series(&random_walk(order.min_observations(), 21));

    // When / Then: The fit succeeds
    let fit = forecast(&at_minimum, Horizon::new(3).expect("valid")).expect("fits at minimum");
    assert_eq!(fit.observations, 12);
    assert_eq!(fit.points.len(), 3);
}

#[test]
fn one_close_below_minimum_fails() {
    let order = ArimaOrder::DEFAULT;
    let below = daily_series(&random_walk(order.min_observations() - 1, 21));

    let message = assert_forecast_failed(forecast(&below, Horizon::new(3).expect("valid")));
    assert!(message.contains("got 11"), "{message}");
}

#[test]
fn when_prices_never_move_forecast_fails() {
    // Given: A flat series, so every differenced lag is zero
    let series = daily_series(&[100.0; 40]);

    // When / Then: The fit is singular rather than silently flat
    assert_forecast_failed(forecast(&series, Horizon::new(5).expect("valid")));
}

#[test]
fn moving_average_terms_are_rejected() {
    let series = daily_series(&random_walk(60, 5));
    let engine = ForecastEngine::new(ArimaOrder::new(5, 1, 1));

    assert_forecast_failed(engine.forecast(&series, Horizon::new(5).expect("valid")));
}

#[rstest]
#[case(0)]
#[case(31)]
#[case(-3)]
fn horizons_outside_one_to_thirty_are_invalid(#[case] days: i64) {
    assert!(Horizon::new(days).is_err());
}
