//! Report charts drawn as ratatui widgets into an off-screen buffer.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget};
use tradetalk_core::report::{Histogram, LineChart, LineRole, ReferenceLine};

pub const CHART_WIDTH: u16 = 80;
pub const CHART_HEIGHT: u16 = 20;

/// Render `widget` at `width` x `height` and return the buffer as plain text.
pub fn to_text<W: Widget>(widget: W, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width.max(1), height.max(1));
    let mut buf = Buffer::empty(area);
    widget.render(area, &mut buf);

    let mut out = String::new();
    for row in buf.content.chunks(usize::from(area.width)) {
        let line: String = row.iter().map(|cell| cell.symbol()).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Close prices with forecast reference lines drawn as extra datasets.
pub struct PriceChart<'a> {
    chart: &'a LineChart,
    overlays: &'a [ReferenceLine],
}

impl<'a> PriceChart<'a> {
    pub fn new(chart: &'a LineChart) -> Self {
        Self {
            chart,
            overlays: &[],
        }
    }

    pub fn overlays(mut self, overlays: &'a [ReferenceLine]) -> Self {
        self.overlays = overlays;
        self
    }
}

impl Widget for PriceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.chart.title.as_str())
            .borders(Borders::ALL);
        if self.chart.points.is_empty() {
            block.title_bottom("no data").render(area, buf);
            return;
        }

        let closes: Vec<(f64, f64)> = self
            .chart
            .points
            .iter()
            .map(|point| (point.ts.unix_timestamp() as f64, point.value))
            .collect();

        let (mut x_min, mut x_max) = extent(closes.iter().map(|(x, _)| *x));
        let (mut y_min, mut y_max) = extent(closes.iter().map(|(_, y)| *y));
        for overlay in self.overlays {
            match overlay {
                ReferenceLine::Vertical { at } => {
                    let x = at.unix_timestamp() as f64;
                    x_min = x_min.min(x);
                    x_max = x_max.max(x);
                }
                ReferenceLine::Horizontal { at, .. } => {
                    y_min = y_min.min(*at);
                    y_max = y_max.max(*at);
                }
            }
        }
        if x_max <= x_min {
            x_max = x_min + 1.0;
        }
        let (y_lo, y_hi) = padded(y_min, y_max);

        let segments: Vec<(Marker, Color, [(f64, f64); 2])> = self
            .overlays
            .iter()
            .map(|overlay| match overlay {
                ReferenceLine::Vertical { at } => {
                    let x = at.unix_timestamp() as f64;
                    (Marker::Dot, Color::Red, [(x, y_lo), (x, y_hi)])
                }
                ReferenceLine::Horizontal {
                    at,
                    role: LineRole::PredictedPrice,
                } => (Marker::Dot, Color::Green, [(x_min, *at), (x_max, *at)]),
                ReferenceLine::Horizontal {
                    at,
                    role: LineRole::CurrentPrice,
                } => (Marker::Block, Color::Blue, [(x_min, *at), (x_max, *at)]),
            })
            .collect();

        // the close line goes last so it sits on top of the reference lines
        let mut datasets: Vec<Dataset> = segments
            .iter()
            .map(|(marker, color, data)| {
                Dataset::default()
                    .marker(*marker)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(*color))
                    .data(data)
            })
            .collect();
        datasets.push(
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&closes),
        );

        let x_labels = vec![Line::from(date_label(x_min)), Line::from(date_label(x_max))];
        let y_labels = vec![
            Line::from(format!("{y_lo:.2}")),
            Line::from(format!("{:.2}", (y_lo + y_hi) / 2.0)),
            Line::from(format!("{y_hi:.2}")),
        ];

        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([x_min, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title("Price")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([y_lo, y_hi])
                    .labels(y_labels),
            )
            .render(area, buf);
    }
}

/// Histogram bars with the density curve overlaid.
pub struct DistributionChart<'a> {
    histogram: &'a Histogram,
}

impl<'a> DistributionChart<'a> {
    pub fn new(histogram: &'a Histogram) -> Self {
        Self { histogram }
    }
}

impl Widget for DistributionChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Close price distribution")
            .borders(Borders::ALL);
        let (Some(first), Some(last)) = (self.histogram.bins.first(), self.histogram.bins.last())
        else {
            block.title_bottom("no data").render(area, buf);
            return;
        };

        let bars: Vec<(f64, f64)> = self
            .histogram
            .bins
            .iter()
            .map(|bin| ((bin.lower + bin.upper) / 2.0, bin.count as f64))
            .collect();
        let density: Vec<(f64, f64)> = self
            .histogram
            .density
            .iter()
            .map(|point| (point.x, point.y))
            .collect();

        let x_min = first.lower;
        let x_max = if last.upper > x_min { last.upper } else { x_min + 1.0 };
        let peak = bars
            .iter()
            .chain(density.iter())
            .map(|(_, y)| *y)
            .fold(1.0, f64::max);
        let y_max = peak * 1.1;

        let datasets = vec![
            Dataset::default()
                .marker(Marker::Block)
                .graph_type(GraphType::Bar)
                .style(Style::default().fg(Color::Blue))
                .data(&bars),
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Yellow))
                .data(&density),
        ];

        let x_labels = vec![
            Line::from(format!("{x_min:.2}")),
            Line::from(format!("{x_max:.2}")),
        ];
        let y_labels = vec![Line::from("0"), Line::from(format!("{y_max:.0}"))];

        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title("Close")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([x_min, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title("Count")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, y_max])
                    .labels(y_labels),
            )
            .render(area, buf);
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
        (lo.min(value), hi.max(value))
    })
}

fn padded(min: f64, max: f64) -> (f64, f64) {
    let pad = ((max - min) * 0.05).max(0.5);
    (min - pad, max + pad)
}

fn date_label(unix: f64) -> String {
    time::OffsetDateTime::from_unix_timestamp(unix as i64)
        .map(|value| value.date().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use tradetalk_core::report::{LinePoint, HISTOGRAM_BINS};
    use tradetalk_core::UtcDateTime;

    use super::*;

    fn chart(values: &[f64]) -> LineChart {
        let start = UtcDateTime::parse("2024-03-01T00:00:00Z").expect("ts");
        LineChart {
            title: String::from("TEST closing price"),
            points: values
                .iter()
                .enumerate()
                .map(|(i, &value)| LinePoint {
                    ts: start
                        .checked_add(time::Duration::days(i as i64))
                        .expect("in range"),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn price_chart_fills_the_buffer_with_title_and_axis_labels() {
        let rendered = to_text(PriceChart::new(&chart(&[10.0, 12.0, 11.0, 15.0])), 60, 15);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 15);
        assert!(lines[0].contains("TEST closing price"));
        assert!(rendered.contains("2024-03-01"));
        assert!(rendered.contains("2024-03-04"));
        assert!(rendered.contains("15.50"));
        assert!(rendered.contains("9.50"));
        // braille cells carry the close line
        assert!(rendered.chars().any(|ch| ('\u{2800}'..='\u{28FF}').contains(&ch)));
    }

    #[test]
    fn reference_lines_render_as_their_own_datasets() {
        let at = UtcDateTime::parse("2024-03-06T00:00:00Z").expect("ts");
        let overlays = [
            ReferenceLine::Vertical { at },
            ReferenceLine::Horizontal {
                at: 13.0,
                role: LineRole::PredictedPrice,
            },
            ReferenceLine::Horizontal {
                at: 9.0,
                role: LineRole::CurrentPrice,
            },
        ];
        let rendered = to_text(
            PriceChart::new(&chart(&[10.0, 12.0, 11.0, 15.0])).overlays(&overlays),
            60,
            15,
        );

        assert!(rendered.contains('•'));
        assert!(rendered.contains('█'));
        assert!(rendered.contains("2024-03-06"));
    }

    #[test]
    fn empty_chart_renders_only_the_frame() {
        let rendered = to_text(PriceChart::new(&chart(&[])), 30, 5);
        assert!(rendered.contains("TEST closing price"));
        assert!(rendered.contains("no data"));
    }

    #[test]
    fn distribution_chart_draws_bars_under_the_density_curve() {
        let values: Vec<f64> = (0..200).map(|i| 50.0 + f64::from(i % 23)).collect();
        let histogram = Histogram::build(&values, HISTOGRAM_BINS);
        let rendered = to_text(DistributionChart::new(&histogram), 60, 15);

        assert_eq!(rendered.lines().count(), 15);
        assert!(rendered.contains("Close price distribution"));
        assert!(rendered.contains('█'));
        assert!(rendered.contains("50.00"));
        assert!(rendered.contains("72.00"));
    }
}
