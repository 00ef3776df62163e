//! Viewport transform between image space and device space.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Scale and offset mapping image coordinates onto the display surface.
///
/// The image is fitted into the display minus a margin, never scaled above
/// its native resolution, and centered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Device pixels per image unit.
    pub scale: f64,
    /// Device position of the image's top-left corner.
    pub offset: Vec2,
    /// Image size in image units.
    pub image_size: Size,
}

impl Viewport {
    /// Fit an image of `image_size` into a display of `display` size.
    ///
    /// Returns `None` for an empty image, which has no meaningful transform.
    pub fn fit(display: Size, margin: f64, image_size: Size) -> Option<Self> {
        if !(image_size.width > 0.0 && image_size.height > 0.0) {
            return None;
        }

        let scale_x = (display.width - margin) / image_size.width;
        let scale_y = (display.height - margin) / image_size.height;
        let scale = scale_x.min(scale_y).min(1.0);
        if !(scale > 0.0) {
            log::warn!(
                "display {}x{} leaves no room for the image after a {} margin",
                display.width,
                display.height,
                margin
            );
            return None;
        }

        let offset = Vec2::new(
            (display.width - image_size.width * scale) / 2.0,
            (display.height - image_size.height * scale) / 2.0,
        );

        Some(Self {
            scale,
            offset,
            image_size,
        })
    }

    /// Image bounds in image space.
    pub fn image_bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.image_size)
    }

    /// Image bounds in device space.
    pub fn image_device_bounds(&self) -> Rect {
        self.image_rect_to_device(self.image_bounds())
    }

    /// Transform from image space to device space.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Convert a device point to image space, clamped to the image.
    pub fn device_to_image(&self, device: Point) -> Point {
        Point::new(
            ((device.x - self.offset.x) / self.scale).clamp(0.0, self.image_size.width),
            ((device.y - self.offset.y) / self.scale).clamp(0.0, self.image_size.height),
        )
    }

    /// Convert an image point to device space.
    pub fn image_to_device(&self, image: Point) -> Point {
        Point::new(
            self.offset.x + image.x * self.scale,
            self.offset.y + image.y * self.scale,
        )
    }

    /// Convert an image-space rect to device space.
    pub fn image_rect_to_device(&self, rect: Rect) -> Rect {
        Rect::from_points(self.image_to_device(rect.origin()), self.image_to_device(Point::new(rect.x1, rect.y1)))
    }

    /// Convert a device-space displacement to image units (unclamped).
    pub fn device_delta_to_image(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DISPLAY: Size = Size::new(800.0, 600.0);

    #[test]
    fn test_fit_downscales_large_image() {
        let vp = Viewport::fit(DISPLAY, 20.0, Size::new(1560.0, 580.0)).unwrap();
        assert!((vp.scale - 0.5).abs() < 1e-12);
        assert!((vp.offset.x - 10.0).abs() < 1e-12);
        assert!((vp.offset.y - 155.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_never_upscales() {
        let vp = Viewport::fit(DISPLAY, 20.0, Size::new(200.0, 100.0)).unwrap();
        assert!((vp.scale - 1.0).abs() < f64::EPSILON);
        assert!((vp.offset.x - 300.0).abs() < f64::EPSILON);
        assert!((vp.offset.y - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_exact_display() {
        let vp = Viewport::fit(DISPLAY, 0.0, DISPLAY).unwrap();
        assert!((vp.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(vp.offset, Vec2::ZERO);
    }

    #[test]
    fn test_fit_empty_image() {
        assert!(Viewport::fit(DISPLAY, 20.0, Size::new(0.0, 100.0)).is_none());
        assert!(Viewport::fit(Size::new(10.0, 10.0), 20.0, Size::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_device_to_image_clamps() {
        let vp = Viewport::fit(DISPLAY, 20.0, Size::new(200.0, 100.0)).unwrap();
        assert_eq!(vp.device_to_image(Point::new(0.0, 0.0)), Point::new(0.0, 0.0));
        assert_eq!(vp.device_to_image(Point::new(799.0, 599.0)), Point::new(200.0, 100.0));
        assert_eq!(vp.device_to_image(Point::new(350.0, 260.0)), Point::new(50.0, 10.0));
    }

    #[test]
    fn test_transform_matches_point_conversion() {
        let vp = Viewport::fit(DISPLAY, 20.0, Size::new(1600.0, 900.0)).unwrap();
        let p = Point::new(400.0, 300.0);
        let a = vp.transform() * p;
        let b = vp.image_to_device(p);
        assert!((a.x - b.x).abs() < 1e-9);
        assert!((a.y - b.y).abs() < 1e-9);
    }

    #[test]
    fn test_delta_conversion() {
        let vp = Viewport::fit(DISPLAY, 20.0, Size::new(1560.0, 580.0)).unwrap();
        let d = vp.device_delta_to_image(Vec2::new(10.0, -4.0));
        assert!((d.x - 20.0).abs() < 1e-12);
        assert!((d.y + 8.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn roundtrip_conversion(
            width in 1.0f64..5000.0,
            height in 1.0f64..5000.0,
            fx in 0.0f64..=1.0,
            fy in 0.0f64..=1.0,
        ) {
            let vp = Viewport::fit(DISPLAY, 20.0, Size::new(width, height)).expect("non-empty image must fit");
            let original = Point::new(fx * width, fy * height);
            let back = vp.device_to_image(vp.image_to_device(original));
            prop_assert!((back.x - original.x).abs() < 1e-9, "x: {} -> {}", original.x, back.x);
            prop_assert!((back.y - original.y).abs() < 1e-9, "y: {} -> {}", original.y, back.y);
        }

        #[test]
        fn fitted_image_stays_on_display(width in 1.0f64..5000.0, height in 1.0f64..5000.0) {
            let vp = Viewport::fit(DISPLAY, 20.0, Size::new(width, height)).expect("non-empty image must fit");
            prop_assert!(vp.scale > 0.0 && vp.scale <= 1.0);
            let bounds = vp.image_device_bounds();
            prop_assert!(bounds.x0 >= 0.0 && bounds.y0 >= 0.0);
            prop_assert!(bounds.x1 <= DISPLAY.width + 1e-9 && bounds.y1 <= DISPLAY.height + 1e-9);
        }
    }
}
