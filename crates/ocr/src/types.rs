use serde::{Deserialize, Serialize};
use std::fmt;

/// Output of one extraction run over a single image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub text: String,
    pub face_count: usize,
}

impl Extraction {
    pub fn new(text: impl Into<String>, face_count: usize) -> Self {
        Self { text: text.into(), face_count }
    }

    /// Length in characters, not bytes.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn has_faces(&self) -> bool {
        self.face_count > 0
    }
}

/// A detected face, in pixels of the image it was detected on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Detection confidence score.
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceScan {
    pub count: usize,
    pub has_faces: bool,
}

impl FaceScan {
    pub fn from_count(count: usize) -> Self {
        Self { count, has_faces: count > 0 }
    }
}

/// Clockwise rotation applied before a recognition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::None, Rotation::Cw90, Rotation::Cw180, Rotation::Cw270];

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_len_counts_chars() {
        let e = Extraction::new("Université", 0);
        assert_eq!(e.text_len(), 10);
        assert!(e.text.len() > 10);
    }

    #[test]
    fn face_scan_from_count() {
        assert!(!FaceScan::from_count(0).has_faces);
        assert!(FaceScan::from_count(2).has_faces);
    }

    #[test]
    fn rotation_display() {
        assert_eq!(Rotation::Cw270.to_string(), "270°");
        assert_eq!(Rotation::ALL.len(), 4);
    }
}
