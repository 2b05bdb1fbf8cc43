use nalgebra::Matrix1x4;
use num::Float;
use std::{fmt::Debug, marker::PhantomData};

/* ------------------------------------------------------------------------------
 * Coordinate spaces
 * ------------------------------------------------------------------------------ */

/// Marker for the coordinate space a [`Rect`] lives in.
pub trait Space: Debug + Clone + Copy + PartialEq {}

/// Fractions of the unit square, bottom-left origin (vision observations).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalized;

/// Target-surface points, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel;

impl Space for Normalized {}
impl Space for Pixel {}

/* ------------------------------------------------------------------------------
 * Type aliases
 * ------------------------------------------------------------------------------ */
pub type Xywh<T> = Matrix1x4<T>;
pub type NormalizedRect<T> = Rect<T, Normalized>;
pub type PixelRect<T> = Rect<T, Pixel>;

/* ------------------------------------------------------------------------------
 * Rect struct
 * ------------------------------------------------------------------------------ */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<T, S = Normalized>
where
    T: Debug + Float + 'static,
    S: Space,
{
    xywh: Xywh<T>,
    space: PhantomData<S>,
}

impl<T, S> Rect<T, S>
where
    T: Debug + Float + 'static,
    S: Space,
{
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            xywh: Matrix1x4::new(x, y, width, height),
            space: PhantomData,
        }
    }

    #[inline(always)]
    pub fn x(&self) -> T {
        self.xywh[(0, 0)]
    }

    #[inline(always)]
    pub fn set_x(&mut self, x: T) {
        self.xywh[(0, 0)] = x;
    }

    #[inline(always)]
    pub fn y(&self) -> T {
        self.xywh[(0, 1)]
    }

    #[inline(always)]
    pub fn set_y(&mut self, y: T) {
        self.xywh[(0, 1)] = y;
    }

    #[inline(always)]
    pub fn width(&self) -> T {
        self.xywh[(0, 2)]
    }

    #[inline(always)]
    pub fn set_width(&mut self, width: T) {
        self.xywh[(0, 2)] = width;
    }

    #[inline(always)]
    pub fn height(&self) -> T {
        self.xywh[(0, 3)]
    }

    #[inline(always)]
    pub fn set_height(&mut self, height: T) {
        self.xywh[(0, 3)] = height;
    }

    #[inline(always)]
    pub fn max_x(&self) -> T {
        self.x() + self.width()
    }

    #[inline(always)]
    pub fn max_y(&self) -> T {
        self.y() + self.height()
    }

    /// Raw `[x, y, width, height]` storage.
    pub fn xywh(&self) -> &Xywh<T> {
        &self.xywh
    }

    pub fn area(&self) -> T {
        self.width() * self.height()
    }

    /// Intersection over union. Zero-area pairs yield zero.
    pub fn calc_iou(&self, other: &Rect<T, S>) -> T {
        let iw = self.max_x().min(other.max_x()) - self.x().max(other.x());
        if iw <= T::zero() {
            return T::zero();
        }
        let ih = self.max_y().min(other.max_y()) - self.y().max(other.y());
        if ih <= T::zero() {
            return T::zero();
        }

        let inter = iw * ih;
        let union = self.area() + other.area() - inter;
        if union <= T::zero() {
            return T::zero();
        }
        inter / union
    }

    /// Get bounding box as [x1, y1, x2, y2] format
    pub fn get_xyxy(&self) -> [T; 4] {
        [self.x(), self.y(), self.max_x(), self.max_y()]
    }

    /// Create Rect from [x1, y1, x2, y2] format
    pub fn from_xyxy(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// True when every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.xywh.iter().all(|v| v.is_finite())
    }
}

impl<T> Rect<T, Normalized>
where
    T: Debug + Float + 'static,
{
    /// The whole unit square.
    pub fn unit() -> Self {
        Self::new(T::zero(), T::zero(), T::one(), T::one())
    }

    /// True when the rect lies inside the unit square.
    pub fn is_within_unit(&self) -> bool {
        self.x() >= T::zero()
            && self.y() >= T::zero()
            && self.width() >= T::zero()
            && self.height() >= T::zero()
            && self.max_x() <= T::one()
            && self.max_y() <= T::one()
    }

    /// Clamp into the unit square, keeping the corners that fall inside.
    ///
    /// Non-finite components collapse to zero.
    pub fn clamped(&self) -> Self {
        let clamp = |v: T| {
            if v.is_finite() {
                v.max(T::zero()).min(T::one())
            } else {
                T::zero()
            }
        };
        let x1 = clamp(self.x());
        let y1 = clamp(self.y());
        let x2 = clamp(self.max_x()).max(x1);
        let y2 = clamp(self.max_y()).max(y1);
        Self::from_xyxy(x1, y1, x2, y2)
    }
}

/* ------------------------------------------------------------------------------
 * Size struct
 * ------------------------------------------------------------------------------ */

/// Dimensions of a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size<T>
where
    T: Debug + Float,
{
    pub width: T,
    pub height: T,
}

impl<T> Size<T>
where
    T: Debug + Float,
{
    pub fn new(width: T, height: T) -> Self {
        Self { width, height }
    }

    pub fn unit() -> Self {
        Self::new(T::one(), T::one())
    }

    /// Both sides finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.width > T::zero()
            && self.height > T::zero()
    }
}
