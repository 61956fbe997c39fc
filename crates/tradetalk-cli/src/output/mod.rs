pub mod chart;

use std::io::Write;

use serde::Serialize;
use tradetalk_core::portfolio::Valuation;
use tradetalk_core::report::{
    AnalysisReport, NewsReport, PortfolioReport, PredictionReport, PriceReport,
};
use tradetalk_core::{Envelope, Symbol};

use self::chart::{DistributionChart, PriceChart, CHART_HEIGHT, CHART_WIDTH};
use crate::cli::OutputFormat;
use crate::error::CliError;

pub const WELCOME: &str = "Welcome to the Stock Analysis and Price Prediction App.";

/// Everything a command or session action can display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "report", rename_all = "snake_case")]
pub enum View {
    Home(HomeView),
    Prediction(PredictionReport),
    Price(PriceReport),
    News(NewsReport),
    Analysis(AnalysisReport),
    Companies(CompaniesView),
    Portfolio(PortfolioReport),
    Message(MessageView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeView {
    pub title: String,
    pub message: String,
    pub destinations: Vec<String>,
}

impl Default for HomeView {
    fn default() -> Self {
        Self {
            title: String::from("TradeTalk"),
            message: String::from(WELCOME),
            destinations: ["Home", "Prediction", "News", "Data Analysis", "Manage Portfolio"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyEntry {
    pub name: String,
    pub symbol: Symbol,
}

impl CompanyEntry {
    pub fn new(name: &str, symbol: &Symbol) -> Self {
        Self {
            name: name.to_owned(),
            symbol: symbol.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompaniesView {
    pub entries: Vec<CompanyEntry>,
}

/// Confirmation or notice produced by a session action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub level: MessageLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Warning,
    Error,
}

impl View {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Message(MessageView {
            level: MessageLevel::Success,
            text: text.into(),
        })
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::Message(MessageView {
            level: MessageLevel::Warning,
            text: text.into(),
        })
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Message(MessageView {
            level: MessageLevel::Error,
            text: text.into(),
        })
    }
}

pub fn render<W: Write>(
    out: &mut W,
    envelope: &Envelope<View>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Text => {
            for warning in &envelope.meta.warnings {
                writeln!(out, "warning: {warning}")?;
            }
            render_text(out, &envelope.data)?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn render_text<W: Write>(out: &mut W, view: &View) -> Result<(), CliError> {
    match view {
        View::Home(home) => {
            writeln!(out, "{}", home.title)?;
            writeln!(out, "{}", home.message)?;
        }
        View::Prediction(report) => render_prediction(out, report)?,
        View::Price(report) => {
            writeln!(
                out,
                "Current market price for {}: ${:.2}",
                report.symbol, report.price
            )?;
        }
        View::News(report) => render_news(out, report)?,
        View::Analysis(report) => render_analysis(out, report)?,
        View::Companies(companies) => {
            if companies.entries.is_empty() {
                writeln!(out, "No matching companies.")?;
            }
            for entry in &companies.entries {
                writeln!(out, "{:<40} {}", entry.name, entry.symbol)?;
            }
        }
        View::Portfolio(report) => render_portfolio(out, report)?,
        View::Message(message) => match message.level {
            MessageLevel::Success => writeln!(out, "{}", message.text)?,
            MessageLevel::Warning => writeln!(out, "warning: {}", message.text)?,
            MessageLevel::Error => writeln!(out, "error: {}", message.text)?,
        },
    }
    Ok(())
}

fn render_prediction<W: Write>(out: &mut W, report: &PredictionReport) -> Result<(), CliError> {
    let unit = if report.intraday { "periods" } else { "days" };
    writeln!(
        out,
        "Predicted prices for {} for the next {} {unit}:",
        report.symbol,
        report.forecast.points.len()
    )?;
    writeln!(out, "{:<12} {:>16}", "Date", "Predicted Price")?;
    for point in &report.forecast.points {
        writeln!(
            out,
            "{:<12} {:>16.2}",
            point.date.date().to_string(),
            point.predicted_price
        )?;
    }
    writeln!(out)?;
    write!(
        out,
        "{}",
        chart::to_text(
            PriceChart::new(&report.chart.history).overlays(&report.chart.reference_lines),
            CHART_WIDTH,
            CHART_HEIGHT
        )
    )?;
    writeln!(
        out,
        "Current market price for {}: ${:.2}",
        report.symbol, report.current_price
    )?;
    Ok(())
}

fn render_news<W: Write>(out: &mut W, report: &NewsReport) -> Result<(), CliError> {
    if let Some(warning) = &report.warning {
        writeln!(out, "warning: {warning}")?;
        return Ok(());
    }

    writeln!(out, "Recent news articles related to {}:", report.symbol)?;
    for article in &report.articles {
        writeln!(out)?;
        writeln!(out, "{}", article.title)?;
        if let Some(description) = &article.description {
            writeln!(out, "{description}")?;
        }
        writeln!(out, "{}", article.url)?;
        if let Some(image_url) = &article.image_url {
            writeln!(out, "image: {image_url}")?;
        }
        match (&article.source, &article.published_at) {
            (Some(source), Some(published_at)) => writeln!(out, "{source}, {published_at}")?,
            (Some(source), None) => writeln!(out, "{source}")?,
            (None, Some(published_at)) => writeln!(out, "{published_at}")?,
            (None, None) => {}
        }
    }
    Ok(())
}

fn render_analysis<W: Write>(out: &mut W, report: &AnalysisReport) -> Result<(), CliError> {
    let title = report.company.as_deref().unwrap_or(report.symbol.as_str());
    let stats = &report.statistics;
    writeln!(out, "Data Analysis for {title} ({})", report.symbol)?;
    writeln!(out)?;
    writeln!(out, "Basic Data Statistics:")?;
    writeln!(out, "Total Data Points: {}", stats.count)?;
    writeln!(out, "Minimum Price: ${:.2}", stats.min)?;
    writeln!(out, "Maximum Price: ${:.2}", stats.max)?;
    writeln!(out, "Average Price: ${:.2}", stats.mean)?;
    match stats.std_dev {
        Some(std_dev) => writeln!(out, "Standard Deviation: ${std_dev:.2}")?,
        None => writeln!(out, "Standard Deviation: n/a")?,
    }
    writeln!(out)?;
    writeln!(out, "Price Chart:")?;
    write!(
        out,
        "{}",
        chart::to_text(PriceChart::new(&report.line_chart), CHART_WIDTH, CHART_HEIGHT)
    )?;
    writeln!(out)?;
    writeln!(out, "Price Distribution:")?;
    write!(
        out,
        "{}",
        chart::to_text(DistributionChart::new(&report.histogram), CHART_WIDTH, CHART_HEIGHT)
    )?;
    Ok(())
}

fn render_portfolio<W: Write>(out: &mut W, report: &PortfolioReport) -> Result<(), CliError> {
    if report.holdings.is_empty() {
        writeln!(out, "warning: Your portfolio is empty.")?;
        return Ok(());
    }

    match &report.valuation {
        Some(valuation) => render_valuation(out, valuation)?,
        None => {
            writeln!(out, "Your Virtual Portfolio:")?;
            writeln!(out, "{:<12} {:>8}", "Symbol", "Shares")?;
            for (symbol, quantity) in &report.holdings {
                writeln!(out, "{:<12} {:>8}", symbol.as_str(), quantity)?;
            }
        }
    }
    Ok(())
}

fn render_valuation<W: Write>(out: &mut W, valuation: &Valuation) -> Result<(), CliError> {
    writeln!(
        out,
        "{:<12} {:>8} {:>12} {:>14}",
        "Symbol", "Shares", "Price", "Value"
    )?;
    for line in &valuation.lines {
        writeln!(
            out,
            "{:<12} {:>8} {:>12.2} {:>14.2}",
            line.symbol.as_str(),
            line.quantity,
            line.price,
            line.market_value
        )?;
    }
    writeln!(out, "Total Portfolio Value: ${:.2}", valuation.total)?;
    Ok(())
}
