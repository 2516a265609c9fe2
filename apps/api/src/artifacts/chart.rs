//! Chart geometry in fixed pixel coordinates.
//!
//! All charts share one canvas; the plot area is the canvas minus `PLOT_MARGIN`
//! on every side. Origin is top-left, y grows downward.

use serde::Serialize;

use crate::analysis::metrics::{AdoptionPoint, Highlights};
use crate::analysis::quadrant::{Axis, Quadrant, VendorScoreRecord, FACTORS};

pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 600.0;
pub const PLOT_MARGIN: f64 = 60.0;
/// Axis scores are on a 0–10 scale.
const SCORE_MAX: f64 = 10.0;
const BAR_GAP: f64 = 24.0;

const PLOT_LEFT: f64 = PLOT_MARGIN;
const PLOT_TOP: f64 = PLOT_MARGIN;
const PLOT_WIDTH: f64 = CANVAS_WIDTH - 2.0 * PLOT_MARGIN;
const PLOT_HEIGHT: f64 = CANVAS_HEIGHT - 2.0 * PLOT_MARGIN;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

const CANVAS: Canvas = Canvas {
    width: CANVAS_WIDTH,
    height: CANVAS_HEIGHT,
    margin: PLOT_MARGIN,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Quadrant scatter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuadrantRegion {
    pub quadrant: Quadrant,
    pub label: &'static str,
    pub rect: Rect,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuadrantPoint {
    pub name: String,
    pub quadrant: Quadrant,
    pub ability_to_execute: f64,
    pub completeness_of_vision: f64,
    pub x: f64,
    pub y: f64,
}

/// Completeness of vision on x, ability to execute on y.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuadrantChart {
    pub canvas: Canvas,
    pub x_axis_label: &'static str,
    pub y_axis_label: &'static str,
    /// Factors rolled up into each axis, for the chart legend.
    pub x_axis_factors: Vec<&'static str>,
    pub y_axis_factors: Vec<&'static str>,
    pub regions: Vec<QuadrantRegion>,
    pub points: Vec<QuadrantPoint>,
}

pub fn quadrant_chart(vendors: &[VendorScoreRecord]) -> QuadrantChart {
    let half_w = PLOT_WIDTH / 2.0;
    let half_h = PLOT_HEIGHT / 2.0;
    let region = |quadrant: Quadrant, col: f64, row: f64| QuadrantRegion {
        quadrant,
        label: quadrant.label(),
        rect: Rect {
            x: PLOT_LEFT + col * half_w,
            y: PLOT_TOP + row * half_h,
            width: half_w,
            height: half_h,
        },
    };

    QuadrantChart {
        canvas: CANVAS,
        x_axis_label: "Completeness of Vision",
        y_axis_label: "Ability to Execute",
        x_axis_factors: factor_labels(Axis::Vision),
        y_axis_factors: factor_labels(Axis::Execution),
        regions: vec![
            region(Quadrant::Challengers, 0.0, 0.0),
            region(Quadrant::Leaders, 1.0, 0.0),
            region(Quadrant::NichePlayers, 0.0, 1.0),
            region(Quadrant::Visionaries, 1.0, 1.0),
        ],
        points: vendors
            .iter()
            .map(|v| QuadrantPoint {
                name: v.name.clone(),
                quadrant: v.quadrant,
                ability_to_execute: v.ability_to_execute,
                completeness_of_vision: v.completeness_of_vision,
                x: PLOT_LEFT + clamp_ratio(v.completeness_of_vision / SCORE_MAX) * PLOT_WIDTH,
                y: PLOT_TOP + (1.0 - clamp_ratio(v.ability_to_execute / SCORE_MAX)) * PLOT_HEIGHT,
            })
            .collect(),
    }
}

fn factor_labels(axis: Axis) -> Vec<&'static str> {
    FACTORS
        .iter()
        .filter(|f| f.axis == axis)
        .map(|f| f.label)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Forecast series
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub year: u16,
    pub percent: f64,
    pub x: f64,
    pub y: f64,
}

/// Adoption % over years; y spans 0–100%.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastChart {
    pub canvas: Canvas,
    pub points: Vec<SeriesPoint>,
}

pub fn forecast_chart(adoption: &[AdoptionPoint]) -> ForecastChart {
    let mut sorted = adoption.to_vec();
    sorted.sort_by_key(|p| p.year);
    sorted.dedup_by_key(|p| p.year);

    let first = sorted.first().map(|p| p.year).unwrap_or_default();
    let last = sorted.last().map(|p| p.year).unwrap_or_default();
    let span = f64::from(last.saturating_sub(first));

    let points = sorted
        .iter()
        .map(|p| {
            // A single year sits in the middle of the x axis.
            let x_ratio = if span == 0.0 {
                0.5
            } else {
                f64::from(p.year - first) / span
            };
            SeriesPoint {
                year: p.year,
                percent: p.percent,
                x: PLOT_LEFT + x_ratio * PLOT_WIDTH,
                y: PLOT_TOP + (1.0 - clamp_ratio(p.percent / 100.0)) * PLOT_HEIGHT,
            }
        })
        .collect();

    ForecastChart {
        canvas: CANVAS,
        points,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Market bars
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub unit: &'static str,
    pub rect: Rect,
}

/// Vertical bars scaled against the largest value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChart {
    pub canvas: Canvas,
    pub bars: Vec<Bar>,
}

/// Market size, CAGR, and maturity score where the highlights carry them.
pub fn metric_bars(highlights: &[&Highlights]) -> BarChart {
    let mut metrics: Vec<(String, f64, &'static str)> = Vec::new();
    for h in highlights {
        match h {
            Highlights::Market {
                market_size_usd_billions,
                cagr_percent,
                ..
            } => {
                if let Some(size) = market_size_usd_billions {
                    metrics.push(("Market size".to_string(), *size, "USD bn"));
                }
                if let Some(cagr) = cagr_percent {
                    metrics.push(("CAGR".to_string(), *cagr, "%"));
                }
            }
            Highlights::Maturity {
                maturity_score: Some(score),
                ..
            } => metrics.push(("Maturity".to_string(), *score, "/10")),
            _ => {}
        }
    }

    let max = metrics.iter().map(|(_, v, _)| *v).fold(0.0_f64, f64::max);
    let count = metrics.len() as f64;
    let bar_width = if metrics.is_empty() {
        0.0
    } else {
        (PLOT_WIDTH - BAR_GAP * (count - 1.0)) / count
    };

    let bars = metrics
        .into_iter()
        .enumerate()
        .map(|(i, (label, value, unit))| {
            let height = if max > 0.0 {
                clamp_ratio(value / max) * PLOT_HEIGHT
            } else {
                0.0
            };
            Bar {
                label,
                value,
                unit,
                rect: Rect {
                    x: PLOT_LEFT + i as f64 * (bar_width + BAR_GAP),
                    y: PLOT_TOP + PLOT_HEIGHT - height,
                    width: bar_width,
                    height,
                },
            }
        })
        .collect();

    BarChart {
        canvas: CANVAS,
        bars,
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::quadrant::QuadrantSource;
    use std::collections::BTreeMap;

    fn vendor(name: &str, execute: f64, vision: f64) -> VendorScoreRecord {
        VendorScoreRecord {
            name: name.to_string(),
            quadrant: Quadrant::from_scores(execute, vision),
            quadrant_source: QuadrantSource::Derived,
            ability_to_execute: execute,
            completeness_of_vision: vision,
            subscores: BTreeMap::new(),
        }
    }

    #[test]
    fn test_quadrant_points_map_into_plot_area() {
        let chart = quadrant_chart(&[vendor("Zscaler", 10.0, 10.0), vendor("Tiny", 0.0, 0.0)]);
        let top_right = &chart.points[0];
        assert_eq!(top_right.x, CANVAS_WIDTH - PLOT_MARGIN);
        assert_eq!(top_right.y, PLOT_MARGIN);
        let bottom_left = &chart.points[1];
        assert_eq!(bottom_left.x, PLOT_MARGIN);
        assert_eq!(bottom_left.y, CANVAS_HEIGHT - PLOT_MARGIN);
    }

    #[test]
    fn test_axis_legends_split_factors() {
        let chart = quadrant_chart(&[]);
        assert_eq!(chart.x_axis_factors.len(), 6);
        assert_eq!(chart.y_axis_factors.len(), 6);
        assert!(chart.x_axis_factors.contains(&"Innovation"));
        assert!(chart.y_axis_factors.contains(&"Customer Experience"));
    }

    #[test]
    fn test_leader_point_lies_in_leaders_region() {
        let chart = quadrant_chart(&[vendor("Okta", 8.2, 7.5)]);
        let point = &chart.points[0];
        let leaders = chart
            .regions
            .iter()
            .find(|r| r.quadrant == Quadrant::Leaders)
            .unwrap();
        assert!(point.x >= leaders.rect.x && point.x <= leaders.rect.x + leaders.rect.width);
        assert!(point.y >= leaders.rect.y && point.y <= leaders.rect.y + leaders.rect.height);
    }

    #[test]
    fn test_forecast_points_sorted_and_spread() {
        let chart = forecast_chart(&[
            AdoptionPoint { year: 2030, percent: 80.0 },
            AdoptionPoint { year: 2026, percent: 20.0 },
            AdoptionPoint { year: 2028, percent: 50.0 },
        ]);
        let years: Vec<u16> = chart.points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2026, 2028, 2030]);
        assert_eq!(chart.points[0].x, PLOT_MARGIN);
        assert_eq!(chart.points[2].x, CANVAS_WIDTH - PLOT_MARGIN);
        assert!(chart.points[2].y < chart.points[0].y);
    }

    #[test]
    fn test_single_forecast_point_is_centered() {
        let chart = forecast_chart(&[AdoptionPoint { year: 2027, percent: 40.0 }]);
        assert_eq!(chart.points[0].x, CANVAS_WIDTH / 2.0);
    }

    #[test]
    fn test_metric_bars_scale_to_largest() {
        let market = Highlights::Market {
            market_size_usd_billions: Some(40.0),
            cagr_percent: Some(20.0),
            percentages: vec![],
        };
        let chart = metric_bars(&[&market]);
        assert_eq!(chart.bars.len(), 2);
        assert_eq!(chart.bars[0].rect.height, PLOT_HEIGHT);
        assert_eq!(chart.bars[1].rect.height, PLOT_HEIGHT / 2.0);
        assert_eq!(chart.bars[0].rect.y + chart.bars[0].rect.height, CANVAS_HEIGHT - PLOT_MARGIN);
    }

    #[test]
    fn test_metric_bars_empty_without_numbers() {
        let vendor = Highlights::Vendor { vendors: vec![] };
        assert!(metric_bars(&[&vendor]).bars.is_empty());
    }
}
