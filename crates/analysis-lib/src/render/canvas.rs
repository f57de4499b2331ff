//! Minimal raster drawing on top of `image::RgbaImage`

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::error::Result;

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const PANEL_BACKGROUND: Rgba<u8> = Rgba([245, 245, 248, 255]);
pub const AXIS: Rgba<u8> = Rgba([90, 90, 90, 255]);
pub const GRID: Rgba<u8> = Rgba([220, 220, 225, 255]);
pub const WARNING: Rgba<u8> = Rgba([255, 165, 0, 255]);
pub const CRITICAL: Rgba<u8> = Rgba([220, 20, 20, 255]);

/// Series colors in metric order
pub const SERIES: [Rgba<u8>; 4] = [
    Rgba([31, 119, 180, 255]),
    Rgba([44, 160, 44, 255]),
    Rgba([148, 103, 189, 255]),
    Rgba([214, 39, 40, 255]),
];

/// Linear map from a data range onto a pixel range
#[derive(Debug, Clone, Copy)]
pub struct Scale {
    min: f64,
    span: f64,
}

impl Scale {
    /// Build a scale over the finite values; `None` if there are none
    pub fn fit(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })?;

        Some(Self::new(min, max))
    }

    /// Scale over `[min, max]`; a degenerate range is centered in a unit span
    pub fn new(min: f64, max: f64) -> Self {
        if (max - min).abs() < 0.0001 {
            Self {
                min: min - 0.5,
                span: 1.0,
            }
        } else {
            Self {
                min,
                span: max - min,
            }
        }
    }

    /// Position of `value` in `[0, 1]`
    pub fn ratio(&self, value: f64) -> f64 {
        ((value - self.min) / self.span).clamp(0.0, 1.0)
    }
}

/// Rectangular plot area inside the image
#[derive(Debug, Clone, Copy)]
pub struct Panel {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Panel {
    pub fn width(&self) -> f64 {
        f64::from(self.right - self.left)
    }

    pub fn height(&self) -> f64 {
        f64::from(self.bottom - self.top)
    }

    /// Pixel position of a point given its x/y ratios
    pub fn point(&self, x_ratio: f64, y_ratio: f64) -> (u32, u32) {
        let x = self.left + (x_ratio * self.width()) as u32;
        let y = self.bottom - (y_ratio * self.height()) as u32;
        (x, y)
    }
}

/// Split an image into a `rows` × `cols` grid of padded panels
pub fn grid(width: u32, height: u32, rows: u32, cols: u32) -> Vec<Panel> {
    const MARGIN: u32 = 40;
    let cell_w = width / cols;
    let cell_h = height / rows;

    (0..rows * cols)
        .map(|i| {
            let (row, col) = (i / cols, i % cols);
            Panel {
                left: col * cell_w + MARGIN,
                top: row * cell_h + MARGIN,
                right: (col + 1) * cell_w - MARGIN / 2,
                bottom: (row + 1) * cell_h - MARGIN,
            }
        })
        .collect()
}

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, BACKGROUND),
        }
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        let (width, height) = self.image.dimensions();
        if x >= 0 && y >= 0 && x < i64::from(width) && y < i64::from(height) {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.put(i64::from(x), i64::from(y), color);
            }
        }
    }

    /// Panel background with left and bottom axes
    pub fn draw_panel(&mut self, panel: &Panel) {
        self.fill_rect(panel.left, panel.top, panel.right, panel.bottom, PANEL_BACKGROUND);
        for i in 1..4 {
            let y = panel.top + (panel.height() * f64::from(i) / 4.0) as u32;
            self.draw_line(panel.left, y, panel.right, y, GRID);
        }
        self.draw_line(panel.left, panel.top, panel.left, panel.bottom, AXIS);
        self.draw_line(panel.left, panel.bottom, panel.right, panel.bottom, AXIS);
    }

    /// Bresenham line between two points
    pub fn draw_line(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>) {
        let (x0, y0, x1, y1) = (i64::from(x0), i64::from(y0), i64::from(x1), i64::from(y1));
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.put(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Horizontal dashed line across a panel
    pub fn draw_dashed_hline(&mut self, panel: &Panel, y: u32, color: Rgba<u8>) {
        const DASH: u32 = 8;
        let mut x = panel.left;
        while x < panel.right {
            let end = (x + DASH).min(panel.right);
            self.draw_line(x, y, end, y, color);
            self.draw_line(x, y + 1, end, y + 1, color);
            x += DASH * 2;
        }
    }

    /// Filled square marker centered on a point
    pub fn draw_marker(&mut self, x: u32, y: u32, radius: u32, color: Rgba<u8>) {
        self.fill_rect(
            x.saturating_sub(radius),
            y.saturating_sub(radius),
            x + radius + 1,
            y + radius + 1,
            color,
        );
    }

    /// Connected line through points in order
    pub fn draw_polyline(&mut self, points: &[(u32, u32)], color: Rgba<u8>) {
        for pair in points.windows(2) {
            self.draw_line(pair[0].0, pair[0].1, pair[1].0, pair[1].1, color);
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }
}

/// Blue-white-red diverging color for a value in `[-1, 1]`
pub fn diverging_color(value: f64) -> Rgba<u8> {
    const COLD: [f64; 3] = [59.0, 76.0, 192.0];
    const NEUTRAL: [f64; 3] = [221.0, 221.0, 221.0];
    const HOT: [f64; 3] = [180.0, 4.0, 38.0];

    if value.is_nan() {
        return Rgba([160, 160, 160, 255]);
    }

    let t = value.clamp(-1.0, 1.0);
    let (from, to, frac) = if t < 0.0 {
        (NEUTRAL, COLD, -t)
    } else {
        (NEUTRAL, HOT, t)
    };

    let mix = |i: usize| (from[i] + (to[i] - from[i]) * frac).round() as u8;
    Rgba([mix(0), mix(1), mix(2), 255])
}
