//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, deterministic (helpful for golden tests).
//! Trusted epochs are joined with `-`; untrusted epochs break the line.
//! Magnitudes are drawn with brighter (smaller) values at the top.

use crate::domain::Curve;

/// Render the trusted part of an evaluated light curve.
pub fn render_light_curve(epochs: &[f64], curve: &Curve, magnitudes: bool, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let segments = trusted_segments(epochs, curve);
    let points = segments.iter().flatten().copied();
    let Some((t_min, t_max, y_min, y_max)) = ranges(points) else {
        return "Plot: no trusted epochs\n".to_string();
    };
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for segment in &segments {
        let mut prev = None;
        for &(t, y) in segment {
            let x = map_x(t, t_min, t_max, width);
            let row = map_y(y, y_min, y_max, height, magnitudes);
            match prev {
                Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, row, '-'),
                None => grid[row][x] = '-',
            }
            prev = Some((x, row));
        }
    }

    let (unit, orientation) = if magnitudes { ("mag", " (brighter up)") } else { ("flux", "") };
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: t=[{t_min:.1}, {t_max:.1}] days | {unit}=[{y_min:.2}, {y_max:.2}]{orientation}\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Runs of consecutive trusted, finite points.
fn trusted_segments(epochs: &[f64], curve: &Curve) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (i, &t) in epochs.iter().enumerate() {
        let ok = curve.mask.get(i).copied().unwrap_or(false);
        let y = curve.value.get(i).copied().unwrap_or(f64::NAN);
        if ok && t.is_finite() && y.is_finite() {
            current.push((t, y));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn ranges(points: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64, f64, f64)> {
    let mut t_min = f64::INFINITY;
    let mut t_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (t, y) in points {
        t_min = t_min.min(t);
        t_max = t_max.max(t);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if t_max > t_min && y_max.is_finite() {
        let (y_min, y_max) = if y_max > y_min { (y_min, y_max) } else { (y_min - 0.5, y_max + 0.5) };
        Some((t_min, t_max, y_min, y_max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize, inverted: bool) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    let rows = height as f64 - 1.0;
    if inverted {
        (u * rows).round() as usize
    } else {
        (rows - u * rows).round() as usize
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
