use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt::Write;

use crate::evaluation::models::{Category, CategoryScores};

const SIZE: f64 = 260.0;
const CENTER: f64 = SIZE / 2.0;
/// Pixel radius of a score of 100.
const RADIUS: f64 = 90.0;
const GRID_LEVELS: [f64; 4] = [25.0, 50.0, 75.0, 100.0];
const LINE_COLOR: &str = "#7c3aed";

/// Point for `score` on the axis of the `index`-th category, first axis pointing up.
fn point(index: usize, score: f64) -> (f64, f64) {
    let angle = -FRAC_PI_2 + TAU * index as f64 / Category::ALL.len() as f64;
    let r = RADIUS * score / 100.0;
    (CENTER + r * angle.cos(), CENTER + r * angle.sin())
}

fn polygon(values: impl Iterator<Item = f64>) -> String {
    values
        .enumerate()
        .map(|(i, v)| {
            let (x, y) = point(i, v);
            format!("{x:.1},{y:.1}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Radar chart of the five category scores as inline SVG.
pub fn radar_chart(scores: &CategoryScores) -> String {
    let mut svg = format!(
        r#"<svg class="radar" viewBox="0 0 {SIZE} {SIZE}" width="{SIZE}" height="{SIZE}" role="img" aria-label="Category scores">"#
    );

    for level in GRID_LEVELS {
        let ring = polygon(Category::ALL.iter().map(|_| level));
        let _ = write!(
            svg,
            r##"<polygon points="{ring}" fill="none" stroke="#e5e7eb"/>"##
        );
    }

    for (i, category) in Category::ALL.into_iter().enumerate() {
        let (x, y) = point(i, 100.0);
        let (lx, ly) = point(i, 118.0);
        let _ = write!(
            svg,
            r##"<line x1="{CENTER}" y1="{CENTER}" x2="{x:.1}" y2="{y:.1}" stroke="#e5e7eb"/><text x="{lx:.1}" y="{ly:.1}" font-size="10" text-anchor="middle" dominant-baseline="middle">{label}</text>"##,
            label = category.label(),
        );
    }

    let shape = polygon(scores.iter().map(|(_, v)| v));
    let _ = write!(
        svg,
        r#"<polygon class="scores" points="{shape}" fill="{LINE_COLOR}" fill-opacity="0.25" stroke="{LINE_COLOR}" stroke-width="2"/></svg>"#
    );

    svg
}
