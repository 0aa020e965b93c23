use chrono::NaiveDate;
use fitcheck_domain as domain;
use gloo_utils::window;
use plotters::{
    chart::ChartBuilder,
    prelude::{Circle, IntoDrawingArea, SVGBackend},
    series::{AreaSeries, LineSeries},
    style::{Color, IntoFont, RGBColor, TextStyle, WHITE},
};
use wasm_bindgen::JsValue;

use crate::Theme;

pub const OPACITY_LINE: f64 = 0.9;
pub const OPACITY_AREA: f64 = 0.25;

pub const WIDTH_LINE: u32 = 2;
pub const SIZE_POINT: u32 = 3;

pub const FONT: (&str, u32) = ("Roboto", 11);

/// Base and point color of a trend.
#[must_use]
pub fn trend_colors(trend: domain::Trend) -> (RGBColor, RGBColor) {
    match trend {
        domain::Trend::Strong => (RGBColor(16, 185, 129), RGBColor(5, 150, 105)),
        domain::Trend::Moderate => (RGBColor(37, 99, 235), RGBColor(29, 78, 216)),
        domain::Trend::Negative => (RGBColor(239, 68, 68), RGBColor(185, 28, 28)),
    }
}

/// CSS class of a statistic, matching the colors of the chart.
#[must_use]
pub fn stat_class(pct: Option<f32>, value: f32) -> &'static str {
    if value < 0. {
        return "negative";
    }
    if value == 0. {
        return "neutral";
    }
    match domain::Trend::from_pct(pct) {
        domain::Trend::Strong => "green",
        domain::Trend::Moderate | domain::Trend::Negative => "positive",
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Bounds {
    min: f32,
    max: f32,
}

impl Bounds {
    fn of(values: &[(NaiveDate, f32)]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            min: values.iter().map(|(_, v)| *v).fold(f32::MAX, f32::min),
            max: values.iter().map(|(_, v)| *v).fold(0., f32::max),
        })
    }

    fn min_with_margin(self) -> f32 {
        if self.min <= f32::EPSILON {
            return self.min;
        }
        f32::max(self.min - self.margin(), 0.)
    }

    fn max_with_margin(self) -> f32 {
        self.max + self.margin()
    }

    fn margin(self) -> f32 {
        if (self.max - self.min).abs() > f32::EPSILON {
            return (self.max - self.min) * 0.1;
        }
        0.1
    }
}

/// Plot the history of an exercise as SVG.
///
/// Only points inside `interval` are shown. The area below the values and
/// the line are colored by the trend from the first to the last value. No
/// chart is created if there is nothing to show.
#[allow(clippy::missing_errors_doc)]
pub fn plot_history(
    points: &[domain::MetricPoint],
    interval: &domain::Interval,
    theme: &Theme,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let points = points
        .iter()
        .filter(|p| interval.first <= p.date && p.date <= interval.last)
        .cloned()
        .collect::<Vec<_>>();
    let Some(stats) = domain::calculate_stats(&points) else {
        return Ok(None);
    };
    let mut values = points
        .iter()
        .map(|p| (p.date, p.value))
        .collect::<Vec<_>>();
    values.sort_by_key(|(date, _)| *date);
    let Some(bounds) = Bounds::of(&values) else {
        return Ok(None);
    };

    let (trend_color, point_color) = trend_colors(domain::Trend::from_pct(stats.pct));
    let mut result = String::new();

    {
        let root = SVGBackend::with_string(&mut result, (chart_width(), 200)).into_drawing_area();
        let (color, background_color) = colors(theme);

        root.fill(&background_color)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10f32)
            .x_label_area_size(30f32)
            .y_label_area_size(40f32)
            .build_cartesian_2d(
                interval.first..interval.last,
                bounds.min_with_margin()..bounds.max_with_margin(),
            )?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .set_all_tick_mark_size(3u32)
            .axis_style(color.mix(0.3))
            .bold_line_style(color.mix(0.05))
            .light_line_style(color.mix(0.0))
            .label_style(TextStyle::from(FONT.into_font()).color(&color))
            .x_labels(2)
            .y_labels(6)
            .draw()?;

        chart.draw_series(AreaSeries::new(
            values.iter().copied(),
            bounds.min_with_margin(),
            trend_color.mix(OPACITY_AREA),
        ))?;
        chart.draw_series(LineSeries::new(
            values.iter().copied(),
            trend_color.mix(OPACITY_LINE).stroke_width(WIDTH_LINE),
        ))?;
        chart.draw_series(
            values
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), SIZE_POINT, point_color.filled())),
        )?;

        root.present()?;
    }

    Ok(Some(result))
}

fn colors(theme: &Theme) -> (RGBColor, RGBColor) {
    let dark = RGBColor(20, 22, 26);
    match theme {
        Theme::System | Theme::Light => (dark, WHITE),
        Theme::Dark => (WHITE, dark),
    }
}

fn chart_width() -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    u32::min(
        u32::max(
            (window()
                .inner_width()
                .unwrap_or(JsValue::UNDEFINED)
                .as_f64()
                .unwrap_or(420.) as u32)
                .saturating_sub(20),
            300,
        ),
        960,
    )
}
