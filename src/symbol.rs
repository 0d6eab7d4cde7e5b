//! Decoded symbol envelope

use std::collections::HashMap;

use crate::format::BarcodeFormat;

/// A point in image pixel coordinates. For QR codes these are the finder
/// pattern centers (plus the alignment pattern for version >= 2); for 1D
/// codes, the two ends of the scanned row segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    /// Orientation in degrees clockwise from upright.
    Orientation,
    /// Name of the character set a byte segment resolved to.
    CharacterSet,
    /// GS1 / application-indicator modifier was in effect.
    Gs1,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Int(i32),
    Text(String),
    Flag(bool),
}

/// One decoded barcode: the text and/or raw bytes, where it sat in the
/// image, and which symbology produced it.
///
/// At least one of `text` and `raw_bytes` is always present.
#[derive(Debug, Clone)]
pub struct Symbol {
    text: Option<String>,
    raw_bytes: Option<Vec<u8>>,
    points: Vec<Point>,
    format: BarcodeFormat,
    metadata: HashMap<MetadataKey, MetadataValue>,
}

impl Symbol {
    pub fn new(text: impl Into<String>, points: Vec<Point>, format: BarcodeFormat) -> Self {
        Self {
            text: Some(text.into()),
            raw_bytes: None,
            points,
            format,
            metadata: HashMap::new(),
        }
    }

    pub fn with_bytes(
        text: impl Into<String>,
        raw_bytes: Vec<u8>,
        points: Vec<Point>,
        format: BarcodeFormat,
    ) -> Self {
        Self {
            text: Some(text.into()),
            raw_bytes: Some(raw_bytes),
            points,
            format,
            metadata: HashMap::new(),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn raw_bytes(&self) -> Option<&[u8]> {
        self.raw_bytes.as_deref()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn format(&self) -> BarcodeFormat {
        self.format
    }

    pub fn metadata(&self) -> &HashMap<MetadataKey, MetadataValue> {
        &self.metadata
    }

    pub fn put_metadata(&mut self, key: MetadataKey, value: MetadataValue) {
        self.metadata.insert(key, value);
    }

    pub(crate) fn set_points(&mut self, points: Vec<Point>) {
        self.points = points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_text_points_and_format() {
        let mut symbol = Symbol::new(
            "012345678905",
            vec![Point::new(3.0, 7.0), Point::new(95.0, 7.0)],
            BarcodeFormat::UpcA,
        );
        symbol.put_metadata(MetadataKey::Orientation, MetadataValue::Int(0));
        assert_eq!(symbol.text(), Some("012345678905"));
        assert_eq!(symbol.points().len(), 2);
        assert_eq!(symbol.format(), BarcodeFormat::UpcA);
        assert_eq!(
            symbol.metadata().get(&MetadataKey::Orientation),
            Some(&MetadataValue::Int(0))
        );
    }

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f32::EPSILON);
    }
}
