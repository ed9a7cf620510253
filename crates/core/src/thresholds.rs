use serde::{Deserialize, Serialize};

/// Inclusive band of accepted width/height ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectBand {
    pub min: f32,
    pub max: f32,
}

impl AspectBand {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, ratio: f32) -> bool {
        ratio >= self.min && ratio <= self.max
    }
}

/// Every tunable number used by the rejection cascade.
///
/// The defaults are the values observed in the field app. None of them has a
/// recorded derivation; treat them as calibration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub min_width: u32,
    pub min_height: u32,
    /// Floor below which the extraction counts as empty.
    pub min_text_chars: usize,
    /// Lower floor for identity-card categories.
    pub id_card_min_text_chars: usize,
    /// A face plus less text than this reads as a selfie.
    pub selfie_max_text_chars: usize,
    pub max_faces: usize,
    /// height / width above which a face photo is a portrait selfie.
    pub portrait_min_aspect: f32,
    /// |width / height - 1| at or below this counts as square.
    pub square_aspect_tolerance: f32,
    pub profile_max_text_chars: usize,
    pub document_aspect: AspectBand,
    pub card_aspect: AspectBand,
    /// Text longer than this must mention an institution or board.
    pub academic_signal_min_chars: usize,
    pub min_academic_matches: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_width: 300,
            min_height: 300,
            min_text_chars: 20,
            id_card_min_text_chars: 10,
            selfie_max_text_chars: 50,
            max_faces: 1,
            portrait_min_aspect: 1.8,
            square_aspect_tolerance: 0.1,
            profile_max_text_chars: 80,
            document_aspect: AspectBand::new(0.5, 2.0),
            card_aspect: AspectBand::new(0.33, 3.0),
            academic_signal_min_chars: 30,
            min_academic_matches: 2,
        }
    }
}

impl Thresholds {
    pub fn from_toml(toml_content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_content)
    }
}
