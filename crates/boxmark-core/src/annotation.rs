//! Annotation records: labeled axis-aligned boxes in image space.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable annotation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier derived from a sequence number.
    pub fn from_seq(seq: u64) -> Self {
        Self(seq.to_string())
    }

    /// The raw identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the identifier as a sequence number, if it is one.
    pub fn as_seq(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Box geometry in image space, stored as origin plus size.
///
/// Kept separate from `kurbo::Rect` so that translating a box never
/// re-derives its size from edge coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxGeometry {
    pub origin: Point,
    pub size: Size,
}

impl BoxGeometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Normalized geometry spanning two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self::new(
            p1.x.min(p2.x),
            p1.y.min(p2.y),
            (p2.x - p1.x).abs(),
            (p2.y - p1.y).abs(),
        )
    }

    /// Geometry spanning `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    /// Whether both sides are strictly larger than `min_size`.
    pub fn exceeds(&self, min_size: f64) -> bool {
        self.size.width > min_size && self.size.height > min_size
    }

    /// Translate by `delta`, then shift back inside `bounds` keeping the size.
    ///
    /// A box larger than `bounds` is pinned to the top-left edge of `bounds`.
    pub fn translate_within(&self, delta: Vec2, bounds: Rect) -> Self {
        let x = (self.origin.x + delta.x)
            .min(bounds.x1 - self.size.width)
            .max(bounds.x0);
        let y = (self.origin.y + delta.y)
            .min(bounds.y1 - self.size.height)
            .max(bounds.y0);
        Self {
            origin: Point::new(x, y),
            size: self.size,
        }
    }
}

/// Where an annotation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationSource {
    /// Drawn by hand.
    #[default]
    Manual,
    /// Produced by a detector.
    #[serde(alias = "ai")]
    Automated,
}

/// A labeled axis-aligned box in image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    /// Left edge in image units.
    pub x: f64,
    /// Top edge in image units.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    /// Detector confidence in 0..1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<AnnotationSource>,
}

impl Annotation {
    /// Create a manual annotation.
    pub fn new(id: AnnotationId, x: f64, y: f64, width: f64, height: f64, label: impl Into<String>) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            label: label.into(),
            confidence: None,
            source: Some(AnnotationSource::Manual),
        }
    }

    /// Create a manual annotation with the given geometry.
    pub fn from_geometry(id: AnnotationId, geometry: BoxGeometry, label: impl Into<String>) -> Self {
        Self::new(
            id,
            geometry.origin.x,
            geometry.origin.y,
            geometry.size.width,
            geometry.size.height,
            label,
        )
    }

    /// Mark this annotation as a detector result.
    pub fn with_detection(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self.source = Some(AnnotationSource::Automated);
        self
    }

    /// Geometry as a kurbo rect (image space).
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn geometry(&self) -> BoxGeometry {
        BoxGeometry::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_geometry(&mut self, geometry: BoxGeometry) {
        self.x = geometry.origin.x;
        self.y = geometry.origin.y;
        self.width = geometry.size.width;
        self.height = geometry.size.height;
    }

    /// Apply a partial update. Returns true if anything changed.
    pub fn apply_patch(&mut self, patch: &AnnotationPatch) -> bool {
        let before = self.clone();
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(confidence) = patch.confidence {
            self.confidence = Some(confidence);
        }
        *self != before
    }

    /// Whether the box lies fully inside an image of the given size.
    pub fn is_within(&self, image_width: f64, image_height: f64) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= image_width
            && self.y + self.height <= image_height
    }

    /// Whether both sides are strictly larger than `min_size`.
    pub fn exceeds(&self, min_size: f64) -> bool {
        self.width > min_size && self.height > min_size
    }
}

/// Partial update for an annotation. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl AnnotationPatch {
    /// Patch that replaces the geometry.
    pub fn geometry(geometry: BoxGeometry) -> Self {
        Self {
            x: Some(geometry.origin.x),
            y: Some(geometry.origin.y),
            width: Some(geometry.size.width),
            height: Some(geometry.size.height),
            ..Self::default()
        }
    }

    /// Patch that replaces the label.
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_accessors() {
        let mut a = Annotation::new("1".into(), 10.0, 20.0, 30.0, 40.0, "cat");
        assert_eq!(a.rect(), Rect::new(10.0, 20.0, 40.0, 60.0));

        a.set_geometry(BoxGeometry::new(0.0, 5.0, 15.0, 20.0));
        assert_eq!((a.x, a.y, a.width, a.height), (0.0, 5.0, 15.0, 20.0));
    }

    #[test]
    fn test_from_corners_normalizes() {
        let g = BoxGeometry::from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!(g, BoxGeometry::new(10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn test_apply_patch_reports_change() {
        let mut a = Annotation::new("1".into(), 0.0, 0.0, 20.0, 20.0, "cat");
        assert!(!a.apply_patch(&AnnotationPatch::default()));
        assert!(!a.apply_patch(&AnnotationPatch::label("cat")));
        assert!(a.apply_patch(&AnnotationPatch::label("dog")));
        assert_eq!(a.label, "dog");
        assert!(a.apply_patch(&AnnotationPatch::geometry(BoxGeometry::new(1.0, 2.0, 30.0, 40.0))));
        assert_eq!((a.x, a.y, a.width, a.height), (1.0, 2.0, 30.0, 40.0));
    }

    #[test]
    fn test_source_serialization() {
        let a = Annotation::new("7".into(), 1.0, 2.0, 3.0, 4.0, "car").with_detection(0.9);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["source"], "automated");

        let parsed: Annotation = serde_json::from_str(
            r#"{"id":"x","x":0,"y":0,"width":12,"height":12,"label":"p","source":"ai"}"#,
        )
        .unwrap();
        assert_eq!(parsed.source, Some(AnnotationSource::Automated));
        assert_eq!(parsed.confidence, None);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let mut a = Annotation::new("1".into(), 0.0, 0.0, 20.0, 20.0, "cat");
        a.source = None;
        let json = serde_json::to_string(&a).unwrap();
        assert!(!json.contains("confidence"));
        assert!(!json.contains("source"));
    }

    #[test]
    fn test_translate_within_clamps() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let g = BoxGeometry::new(10.0, 10.0, 20.0, 20.0);

        let moved = g.translate_within(Vec2::new(-50.0, 200.0), bounds);
        assert_eq!(moved, BoxGeometry::new(0.0, 80.0, 20.0, 20.0));
    }

    #[test]
    fn test_translate_zero_delta_is_bit_identical() {
        let bounds = Rect::new(0.0, 0.0, 640.0, 480.0);
        let g = BoxGeometry::new(0.1, 0.7, 33.3, 12.9);
        let same = g.translate_within(Vec2::ZERO, bounds);
        assert_eq!(same.origin.x.to_bits(), g.origin.x.to_bits());
        assert_eq!(same.origin.y.to_bits(), g.origin.y.to_bits());
        assert_eq!(same.size, g.size);
    }

    #[test]
    fn test_seq_ids() {
        assert_eq!(AnnotationId::from_seq(42).as_seq(), Some(42));
        assert_eq!(AnnotationId::new("abc").as_seq(), None);
    }
}
