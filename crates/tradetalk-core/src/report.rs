//! Serializable view models assembled from gateway and forecast results.
//!
//! Everything a renderer needs is computed here so text and JSON output
//! show the same numbers.

use serde::{Deserialize, Serialize};

use crate::forecast::Forecast;
use crate::portfolio::{Holdings, Valuation};
use crate::{Article, ForecastPoint, PriceSeries, Symbol, UtcDateTime};

pub const HISTOGRAM_BINS: usize = 20;
pub const KDE_POINTS: usize = 100;

/// Descriptive statistics over closing prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation; absent below two observations.
    pub std_dev: Option<f64>,
}

impl SummaryStatistics {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / count as f64;
        let std_dev = (count > 1).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        Some(Self {
            count,
            min,
            max,
            mean,
            std_dev,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub ts: UtcDateTime,
    pub value: f64,
}

/// Close prices over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    pub title: String,
    pub points: Vec<LinePoint>,
}

impl LineChart {
    pub fn of_closes(title: impl Into<String>, series: &PriceSeries) -> Self {
        Self {
            title: title.into(),
            points: series
                .bars
                .iter()
                .map(|bar| LinePoint {
                    ts: bar.ts,
                    value: bar.close,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    pub x: f64,
    /// Gaussian KDE scaled to histogram counts.
    pub y: f64,
}

/// Equal-width histogram with a kernel density overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    pub bandwidth: Option<f64>,
    pub density: Vec<DensityPoint>,
}

impl Histogram {
    pub fn build(values: &[f64], bins: usize) -> Self {
        let Some(stats) = SummaryStatistics::from_values(values) else {
            return Self {
                bins: Vec::new(),
                bandwidth: None,
                density: Vec::new(),
            };
        };
        let bins = bins.max(1);

        // a degenerate range gets a unit-wide window centred on the value
        let (lower, upper) = if stats.max > stats.min {
            (stats.min, stats.max)
        } else {
            (stats.min - 0.5, stats.max + 0.5)
        };
        let width = (upper - lower) / bins as f64;

        let mut counts = vec![0_usize; bins];
        for value in values {
            let index = (((value - lower) / width).floor() as usize).min(bins - 1);
            counts[index] += 1;
        }

        let edges = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lower + width * i as f64,
                upper: lower + width * (i + 1) as f64,
                count,
            })
            .collect();

        // Scott's rule
        let bandwidth = stats
            .std_dev
            .filter(|std| *std > 0.0)
            .map(|std| std * (stats.count as f64).powf(-0.2));

        let density = bandwidth
            .map(|bw| kde_curve(values, bw, stats.min, stats.max, width))
            .unwrap_or_default();

        Self {
            bins: edges,
            bandwidth,
            density,
        }
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }
}

fn kde_curve(values: &[f64], bandwidth: f64, from: f64, to: f64, bin_width: f64) -> Vec<DensityPoint> {
    let n = values.len() as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let step = (to - from) / (KDE_POINTS - 1) as f64;

    (0..KDE_POINTS)
        .map(|i| {
            let x = from + step * i as f64;
            let pdf: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            DensityPoint {
                x,
                y: pdf * n * bin_width,
            }
        })
        .collect()
}

/// Data Analysis view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub company: Option<String>,
    pub symbol: Symbol,
    pub statistics: SummaryStatistics,
    pub line_chart: LineChart,
    pub histogram: Histogram,
}

impl AnalysisReport {
    /// `None` when the series has no bars.
    pub fn build(company: Option<&str>, series: &PriceSeries) -> Option<Self> {
        let closes = series.closes();
        let statistics = SummaryStatistics::from_values(&closes)?;
        let title = company.unwrap_or(series.symbol.as_str());

        Some(Self {
            company: company.map(str::to_owned),
            symbol: series.symbol.clone(),
            statistics,
            line_chart: LineChart::of_closes(format!("{title} closing price"), series),
            histogram: Histogram::build(&closes, HISTOGRAM_BINS),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "orientation", rename_all = "lowercase")]
pub enum ReferenceLine {
    /// Marks a forecast date.
    Vertical { at: UtcDateTime },
    Horizontal { at: f64, role: LineRole },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRole {
    PredictedPrice,
    CurrentPrice,
}

/// Historical closes annotated with forecast and current-price markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionChart {
    pub history: LineChart,
    pub reference_lines: Vec<ReferenceLine>,
}

impl PredictionChart {
    pub fn build(series: &PriceSeries, points: &[ForecastPoint], current_price: f64) -> Self {
        let mut reference_lines = Vec::with_capacity(points.len() * 2 + 1);
        for point in points {
            reference_lines.push(ReferenceLine::Vertical { at: point.date });
            reference_lines.push(ReferenceLine::Horizontal {
                at: point.predicted_price,
                role: LineRole::PredictedPrice,
            });
        }
        reference_lines.push(ReferenceLine::Horizontal {
            at: current_price,
            role: LineRole::CurrentPrice,
        });

        Self {
            history: LineChart::of_closes(
                format!("{} stock price comparison", series.symbol),
                series,
            ),
            reference_lines,
        }
    }
}

/// Prediction view: forecast table, chart and the latest close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub symbol: Symbol,
    pub intraday: bool,
    pub current_price: f64,
    pub forecast: Forecast,
    pub chart: PredictionChart,
}

impl PredictionReport {
    pub fn build(series: &PriceSeries, forecast: Forecast, current_price: f64, intraday: bool) -> Self {
        let chart = PredictionChart::build(series, &forecast.points, current_price);
        Self {
            symbol: series.symbol.clone(),
            intraday,
            current_price,
            forecast,
            chart,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceReport {
    pub symbol: Symbol,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsReport {
    pub symbol: Symbol,
    pub articles: Vec<Article>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl NewsReport {
    pub fn build(symbol: Symbol, articles: Vec<Article>) -> Self {
        let warning = articles
            .is_empty()
            .then(|| format!("No recent news available for {symbol}."));
        Self {
            symbol,
            articles,
            warning,
        }
    }
}

/// Current positions, optionally priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub holdings: Holdings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation: Option<Valuation>,
}
