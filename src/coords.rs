//! Mapping between reference-image coordinates and canvas pixel ids.
//!
//! The server addresses pixels by a 1-based linear id over a fixed
//! `width × height` canvas. The reference image is anchored at a
//! configurable origin.

/// Fixed canvas dimensions plus the origin the reference image is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasGeometry {
    pub width: i64,
    pub height: i64,
    pub origin_x: i64,
    pub origin_y: i64,
}

impl CanvasGeometry {
    pub fn new(width: i64, height: i64, origin_x: i64, origin_y: i64) -> Self {
        Self {
            width,
            height,
            origin_x,
            origin_y,
        }
    }

    /// 1-based linear pixel id of the absolute canvas position `(x, y)`.
    pub fn pixel_index(&self, x: i64, y: i64) -> i64 {
        y * self.width + x + 1
    }

    /// Approximate inverse of [`pixel_index`](Self::pixel_index).
    ///
    /// The `+1` of the forward mapping is not undone, so the result is off by
    /// one column. Only use it for log output.
    pub fn position_from_index(&self, pixel: i64) -> (i64, i64) {
        (pixel.rem_euclid(self.width), pixel.div_euclid(self.width))
    }

    /// Pixel id of the local image coordinate `(x, y)`.
    pub fn canvas_position(&self, x: i64, y: i64) -> i64 {
        self.pixel_index(self.origin_x + x - 1, self.origin_y + y - 1)
    }

    /// Absolute canvas coordinate of the local image coordinate `(x, y)`.
    pub fn absolute(&self, x: i64, y: i64) -> (i64, i64) {
        (self.origin_x + x - 1, self.origin_y + y - 1)
    }
}
