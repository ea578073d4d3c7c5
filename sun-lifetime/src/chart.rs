//! Terminal chart of remaining lifetime against elapsed time

use ratatui::{
    crossterm::event::{self, Event, KeyCode, KeyEventKind},
    layout::{Constraint, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::{Axis, Block, Chart, Dataset, GraphType, LegendPosition},
    DefaultTerminal, Frame,
};
use solar_offload_core::report::{
    chart_title, ELAPSED_AXIS_LABEL, ELAPSED_SERIES_LABEL, REMAINING_AXIS_LABEL,
    REMAINING_SERIES_LABEL,
};
use solar_offload_core::SimulationOutcome;
use std::io;

/// Upper bound on points handed to the canvas per curve
const MAX_PLOT_POINTS: usize = 2000;
const TICK_COUNT: usize = 5;
/// Figure is 10 wide by 6 tall
const FIGURE_ASPECT: (u32, u32) = (10, 6);
/// Terminal cells are roughly twice as tall as they are wide
const CELL_HEIGHT_TO_WIDTH: u32 = 2;
const REMAINING_COLOR: Color = Color::Rgb(255, 165, 0);
const ELAPSED_COLOR: Color = Color::Blue;
const GRID_COLOR: Color = Color::DarkGray;

/// Everything the chart draws, computed once from the outcome.
pub struct ChartView {
    title: String,
    remaining: Vec<(f64, f64)>,
    identity: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    grid: Vec<[(f64, f64); 2]>,
}

impl ChartView {
    pub fn new(outcome: &SimulationOutcome) -> Self {
        let series = &outcome.series;
        let remaining = downsample(&series.remaining_curve(), MAX_PLOT_POINTS);
        let identity = downsample(&series.identity_line(), MAX_PLOT_POINTS);

        let x_max = series
            .elapsed_times()
            .last()
            .copied()
            .filter(|&x| x > 0.0)
            .unwrap_or(1.0);
        let x_bounds = [0.0, x_max];
        let y_bounds = value_bounds(remaining.iter().map(|&(_, y)| y).chain([0.0, x_max]));

        let mut grid = Vec::with_capacity(2 * TICK_COUNT);
        for x in ticks(x_bounds) {
            grid.push([(x, y_bounds[0]), (x, y_bounds[1])]);
        }
        for y in ticks(y_bounds) {
            grid.push([(x_bounds[0], y), (x_bounds[1], y)]);
        }

        Self {
            title: chart_title(outcome.mass_loss_rate),
            remaining,
            identity,
            x_bounds,
            y_bounds,
            grid,
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = figure_area(frame.area());

        let mut datasets: Vec<Dataset> = self
            .grid
            .iter()
            .map(|line| {
                Dataset::default()
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(GRID_COLOR))
                    .data(line)
            })
            .collect();
        datasets.push(
            Dataset::default()
                .name(REMAINING_SERIES_LABEL)
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(REMAINING_COLOR))
                .data(&self.remaining),
        );
        datasets.push(
            Dataset::default()
                .name(ELAPSED_SERIES_LABEL)
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(ELAPSED_COLOR))
                .data(&self.identity),
        );

        let block = Block::bordered()
            .title(Line::from(self.title.as_str()).centered())
            .title_bottom(Line::from("q: quit").right_aligned());

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title(ELAPSED_AXIS_LABEL)
                    .bounds(self.x_bounds)
                    .labels(tick_labels(self.x_bounds)),
            )
            .y_axis(
                Axis::default()
                    .title(REMAINING_AXIS_LABEL)
                    .bounds(self.y_bounds)
                    .labels(tick_labels(self.y_bounds)),
            )
            .legend_position(Some(LegendPosition::TopLeft))
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

        frame.render_widget(chart, area);
    }
}

/// Open the chart full-screen and block until the user quits.
///
/// # Errors
/// Returns terminal I/O errors. The terminal is restored either way.
pub fn show(outcome: &SimulationOutcome) -> io::Result<()> {
    let view = ChartView::new(outcome);
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &view);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, view: &ChartView) -> io::Result<()> {
    loop {
        terminal.draw(|frame| view.draw(frame))?;
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press
                && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
            {
                return Ok(());
            }
        }
    }
}

/// Largest centered rectangle of `area` with the figure's physical aspect.
fn figure_area(area: Rect) -> Rect {
    let (aspect_w, aspect_h) = FIGURE_ASPECT;
    let available_w = u32::from(area.width);
    let available_h = u32::from(area.height);

    // width_cells / (height_cells * 2) = 10 / 6
    let width_for_full_height = available_h * CELL_HEIGHT_TO_WIDTH * aspect_w / aspect_h;
    let (width, height) = if width_for_full_height <= available_w {
        (width_for_full_height, available_h)
    } else {
        (
            available_w,
            available_w * aspect_h / (aspect_w * CELL_HEIGHT_TO_WIDTH),
        )
    };

    let width = u16::try_from(width).unwrap_or(area.width);
    let height = u16::try_from(height).unwrap_or(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Every n-th point such that at most `max_points` remain; always keeps the last.
fn downsample(points: &[(f64, f64)], max_points: usize) -> Vec<(f64, f64)> {
    if points.len() <= max_points || max_points < 2 {
        return points.to_vec();
    }
    let stride = (points.len() - 1).div_ceil(max_points - 1);
    let mut sampled: Vec<(f64, f64)> = points.iter().step_by(stride).copied().collect();
    if let Some(&last) = points.last() {
        if sampled.last() != Some(&last) {
            sampled.push(last);
        }
    }
    sampled
}

/// `[min(0, lowest), 1.05 * highest]`, with a unit range for degenerate input.
fn value_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let hi = if hi > lo { hi * 1.05 } else { lo + 1.0 };
    [lo, hi]
}

fn ticks(bounds: [f64; 2]) -> impl Iterator<Item = f64> {
    let [lo, hi] = bounds;
    let step = (hi - lo) / (TICK_COUNT - 1) as f64;
    (0..TICK_COUNT).map(move |i| lo + step * i as f64)
}

fn tick_labels(bounds: [f64; 2]) -> Vec<String> {
    ticks(bounds).map(|v| format!("{v:.1}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_offload_core::{simulate, GigatonnesPerSecond, LifetimeParams, Years};

    #[test]
    fn test_figure_area_keeps_aspect() {
        // Wide terminal: limited by height
        let area = figure_area(Rect::new(0, 0, 200, 30));
        assert_eq!(area.height, 30);
        assert_eq!(area.width, 100);
        assert_eq!(area.x, 50);

        // Tall terminal: limited by width
        let area = figure_area(Rect::new(0, 0, 100, 60));
        assert_eq!(area.width, 100);
        assert_eq!(area.height, 30);
        assert_eq!(area.y, 15);
    }

    #[test]
    fn test_downsample_keeps_endpoints() {
        let points: Vec<(f64, f64)> = (0..150_000).map(|i| (f64::from(i), 0.0)).collect();
        let sampled = downsample(&points, MAX_PLOT_POINTS);
        assert!(sampled.len() <= MAX_PLOT_POINTS + 1);
        assert_eq!(sampled.first(), points.first());
        assert_eq!(sampled.last(), points.last());

        let short = downsample(&points[..10], MAX_PLOT_POINTS);
        assert_eq!(short.len(), 10);
    }

    #[test]
    fn test_value_bounds() {
        assert_eq!(value_bounds([2.0, 4.0].into_iter()), [0.0, 4.2]);
        assert_eq!(value_bounds([-1.0, 1.0].into_iter()), [-1.0, 1.05]);
        assert_eq!(value_bounds(std::iter::empty()), [0.0, 1.0]);
    }

    #[test]
    fn test_tick_labels() {
        assert_eq!(
            tick_labels([0.0, 20.0]),
            vec!["0.0", "5.0", "10.0", "15.0", "20.0"]
        );
    }

    #[test]
    fn test_view_from_single_point_run() {
        let outcome = simulate(LifetimeParams::default(), GigatonnesPerSecond::new(1e6)).unwrap();
        let view = ChartView::new(&outcome);
        assert_eq!(view.remaining.len(), 1);
        assert_eq!(view.x_bounds, [0.0, 1.0]);
        assert_eq!(view.identity, vec![(0.0, 0.0)]);
        assert_eq!(view.grid.len(), 2 * TICK_COUNT);
        assert!(view.title.contains("1000000.00 Gt/s"));
    }

    #[test]
    fn test_view_from_empty_run_draws_no_lines() {
        let params = LifetimeParams {
            remaining_life: Years::new(9e9),
            ..LifetimeParams::default()
        };
        let outcome = simulate(params, GigatonnesPerSecond::new(0.0)).unwrap();
        assert!(outcome.series.is_empty());

        let view = ChartView::new(&outcome);
        assert!(view.remaining.is_empty());
        assert!(view.identity.is_empty());
        assert_eq!(view.x_bounds, [0.0, 1.0]);
    }

    #[test]
    fn test_identity_line_follows_recorded_points() {
        let outcome = simulate(LifetimeParams::default(), GigatonnesPerSecond::new(100.0)).unwrap();
        let view = ChartView::new(&outcome);
        let last = *outcome.series.elapsed_times().last().unwrap();

        assert!(view.identity.len() <= MAX_PLOT_POINTS + 1);
        assert_eq!(view.identity.first(), Some(&(0.0, 0.0)));
        assert_eq!(view.identity.last(), Some(&(last, last)));
        assert!(view.identity.iter().all(|&(x, y)| x == y));
    }
}
