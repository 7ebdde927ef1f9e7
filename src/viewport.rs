// SPDX: CC0-1.0

//! Data-space window mapped onto a pixel canvas.

use crate::{Number, Point};
use core::{fmt, num::NonZeroU32, ops::Range};

/// Grid lines are never closer than this many pixels.
pub const MIN_GRID_SPACING: Number = 40.0;

/// Range multiplier for one wheel notch.
pub const ZOOM_FACTOR: Number = 1.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewportErr {
    EmptyRange { axis: Axis, range: Range<Number> },
    NonFinite { axis: Axis },
    ZeroSize { width: u32, height: u32 },
}

impl fmt::Display for ViewportErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRange { axis, range } => write!(
                f,
                "{axis} max ({}) must be greater than {axis} min ({})",
                range.end, range.start
            ),
            Self::NonFinite { axis } => write!(f, "{axis} bounds must be finite"),
            Self::ZeroSize { width, height } => {
                write!(f, "canvas size {width}x{height} must be nonzero")
            }
        }
    }
}

impl std::error::Error for ViewportErr {}

/// Which way the wheel turned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomDir {
    /// Scroll up: ranges shrink.
    In,
    /// Scroll down: ranges grow.
    Out,
}

impl ZoomDir {
    /// Wheel convention: positive delta scrolls down.
    pub fn from_wheel(delta: Number) -> Option<Self> {
        if delta > 0.0 {
            Some(Self::Out)
        } else if delta < 0.0 {
            Some(Self::In)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    x: Range<Number>,
    y: Range<Number>,
    width: NonZeroU32,
    height: NonZeroU32,
}

fn check_range(axis: Axis, range: &Range<Number>) -> Result<(), ViewportErr> {
    if !(range.start.is_finite() && range.end.is_finite() && (range.end - range.start).is_finite())
    {
        return Err(ViewportErr::NonFinite { axis });
    }
    if range.end <= range.start {
        return Err(ViewportErr::EmptyRange {
            axis,
            range: range.clone(),
        });
    }
    Ok(())
}

fn check_size(width: u32, height: u32) -> Result<(NonZeroU32, NonZeroU32), ViewportErr> {
    match (NonZeroU32::new(width), NonZeroU32::new(height)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(ViewportErr::ZeroSize { width, height }),
    }
}

impl Viewport {
    pub fn new(
        x: Range<Number>,
        y: Range<Number>,
        width: u32,
        height: u32,
    ) -> Result<Self, ViewportErr> {
        check_range(Axis::X, &x)?;
        check_range(Axis::Y, &y)?;
        let (width, height) = check_size(width, height)?;
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn x(&self) -> Range<Number> {
        self.x.clone()
    }

    pub fn y(&self) -> Range<Number> {
        self.y.clone()
    }

    pub fn x_span(&self) -> Number {
        self.x.end - self.x.start
    }

    pub fn y_span(&self) -> Number {
        self.y.end - self.y.start
    }

    pub fn width(&self) -> Number {
        Number::from(self.width.get())
    }

    pub fn height(&self) -> Number {
        Number::from(self.height.get())
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width.get(), self.height.get())
    }

    pub fn center(&self) -> Point<Number> {
        Point {
            x: (self.x.start + self.x.end) / 2.0,
            y: (self.y.start + self.y.end) / 2.0,
        }
    }

    /// Replaces both ranges, or leaves the viewport untouched on error.
    pub fn set_bounds(&mut self, x: Range<Number>, y: Range<Number>) -> Result<(), ViewportErr> {
        check_range(Axis::X, &x)?;
        check_range(Axis::Y, &y)?;
        self.x = x;
        self.y = y;
        Ok(())
    }

    pub fn set_size(&mut self, width: u32, height: u32) -> Result<(), ViewportErr> {
        let (width, height) = check_size(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn map_to_pixel(&self, p: Point<Number>) -> Point<Number> {
        Point {
            x: (p.x - self.x.start) / self.x_span() * self.width(),
            y: self.height() - (p.y - self.y.start) / self.y_span() * self.height(),
        }
    }

    pub fn map_from_pixel(&self, p: Point<Number>) -> Point<Number> {
        Point {
            x: self.x.start + p.x / self.width() * self.x_span(),
            y: self.y.start + (self.height() - p.y) / self.height() * self.y_span(),
        }
    }

    /// Shifts the window by a drag of `(dx, dy)` pixels. A shift that would
    /// leave the representable range keeps the previous bounds.
    pub fn pan_by_pixels(&mut self, dx: Number, dy: Number) -> Result<(), ViewportErr> {
        let shift_x = dx * self.x_span() / self.width();
        let shift_y = dy * self.y_span() / self.height();
        self.set_bounds(
            self.x.start - shift_x..self.x.end - shift_x,
            // pixel y grows downward
            self.y.start + shift_y..self.y.end + shift_y,
        )
    }

    /// Scales both ranges about the window midpoint. Zooming past the
    /// representable range, or below the float resolution, keeps the
    /// previous bounds.
    pub fn zoom(&mut self, dir: ZoomDir) -> Result<(), ViewportErr> {
        let factor = match dir {
            ZoomDir::Out => ZOOM_FACTOR,
            ZoomDir::In => ZOOM_FACTOR.recip(),
        };
        let center = self.center();
        let half_x = self.x_span() * factor / 2.0;
        let half_y = self.y_span() * factor / 2.0;
        self.set_bounds(
            center.x - half_x..center.x + half_x,
            center.y - half_y..center.y + half_y,
        )
    }

    /// Pushes every bound `p` lies beyond out to `padding` past it. Returns
    /// whether any bound moved.
    pub fn expand_to_include(
        &mut self,
        p: Point<Number>,
        padding: Number,
    ) -> Result<bool, ViewportErr> {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return Ok(false);
        }
        let (mut x, mut y) = (self.x(), self.y());
        if p.x > x.end {
            x.end = p.x + padding;
        } else if p.x < x.start {
            x.start = p.x - padding;
        }
        if p.y > y.end {
            y.end = p.y + padding;
        } else if p.y < y.start {
            y.start = p.y - padding;
        }
        if x == self.x && y == self.y {
            return Ok(false);
        }
        self.set_bounds(x, y)?;
        Ok(true)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("x range", &self.x)
            .field("y range", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Smallest power of two `>= 1` whose grid lines land at least
/// `min_spacing` pixels apart.
///
/// Returns `None` when no grid can be drawn (non-positive or non-finite
/// input), which also keeps the doubling search finite.
pub fn choose_grid_step(range: Number, pixel_extent: Number, min_spacing: Number) -> Option<Number> {
    if !(range.is_finite() && range > 0.0)
        || !(pixel_extent.is_finite() && pixel_extent > 0.0)
        || !(min_spacing.is_finite() && min_spacing > 0.0)
    {
        return None;
    }
    let mut step: Number = 1.0;
    while pixel_extent / (range / step) < min_spacing {
        step *= 2.0;
    }
    Some(step)
}
