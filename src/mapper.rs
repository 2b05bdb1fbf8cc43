//! Conversion from vision-space rectangles to surface rectangles.
//!
//! Vision observations are normalized to the unit square with the origin in
//! the bottom-left corner, while drawing surfaces put the origin in the
//! top-left corner. Converting one into the other is two steps: a vertical
//! flip inside the unit square ([`flip_vertical`]) followed by a linear
//! scale into the surface ([`remap`]). [`CoordinateMapper`] bundles both so
//! the flip happens exactly once.

use crate::rect::{NormalizedRect, PixelRect, Rect, Size};
use num::Float;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// How the y axis is mirrored before remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalFlip {
    /// `y' = 1 - y - height`: the box keeps covering the same region.
    #[default]
    OriginAndHeight,
    /// `y' = 1 - y`: mirrors the origin only, leaving the box shifted down
    /// by its own height. Kept for parity with older overlays.
    OriginOnly,
    /// The producer already reports top-left origin rects.
    Disabled,
}

/// Which normalized extent the pixel height is scaled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightSource {
    #[default]
    Height,
    /// Scales the width into the surface height. Only matches `Height` for
    /// square boxes; reproduces legacy overlays bit for bit.
    Width,
}

/// Mirror a bottom-left origin rect into top-left origin.
pub fn flip_vertical<T>(rect: &NormalizedRect<T>, flip: VerticalFlip) -> NormalizedRect<T>
where
    T: Debug + Float + 'static,
{
    let y = match flip {
        VerticalFlip::OriginAndHeight => T::one() - rect.y() - rect.height(),
        VerticalFlip::OriginOnly => T::one() - rect.y(),
        VerticalFlip::Disabled => rect.y(),
    };
    Rect::new(rect.x(), y, rect.width(), rect.height())
}

/// Scale a normalized rect into a surface of `target` size.
///
/// Component-wise multiplication only: no flip, no validation, no division.
/// Out-of-range input passes through arithmetically.
pub fn remap<T>(rect: &NormalizedRect<T>, target: &Size<T>) -> PixelRect<T>
where
    T: Debug + Float + 'static,
{
    remap_with(rect, target, HeightSource::Height)
}

/// [`remap`] with an explicit choice of the height source.
pub fn remap_with<T>(
    rect: &NormalizedRect<T>,
    target: &Size<T>,
    height_source: HeightSource,
) -> PixelRect<T>
where
    T: Debug + Float + 'static,
{
    let height = match height_source {
        HeightSource::Height => rect.height(),
        HeightSource::Width => rect.width(),
    };
    Rect::new(
        rect.x() * target.width,
        rect.y() * target.height,
        rect.width() * target.width,
        height * target.height,
    )
}

/*------------------------------------------------------------------------------
CoordinateMapper struct
------------------------------------------------------------------------------*/

/// Flip-then-remap pipeline with fixed settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoordinateMapper {
    flip: VerticalFlip,
    height_source: HeightSource,
}

impl CoordinateMapper {
    pub fn new(flip: VerticalFlip, height_source: HeightSource) -> Self {
        Self {
            flip,
            height_source,
        }
    }

    /// Origin-only flip and width-derived height, as the first overlays did.
    pub fn legacy() -> Self {
        Self::new(VerticalFlip::OriginOnly, HeightSource::Width)
    }

    pub fn flip(&self) -> VerticalFlip {
        self.flip
    }

    pub fn height_source(&self) -> HeightSource {
        self.height_source
    }

    /// Convert a vision-space rect into a surface rect.
    pub fn map<T>(&self, rect: &NormalizedRect<T>, target: &Size<T>) -> PixelRect<T>
    where
        T: Debug + Float + 'static,
    {
        let flipped = flip_vertical(rect, self.flip);
        remap_with(&flipped, target, self.height_source)
    }
}
