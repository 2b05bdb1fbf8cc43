use crate::error::TrackError;
use crate::mapper::{CoordinateMapper, HeightSource, VerticalFlip};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Accuracy versus speed hint handed to the external tracker untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingLevel {
    #[default]
    Accurate,
    Fast,
}

/// Settings of an [`ObservationStore`](crate::store::ObservationStore).
///
/// Every key is optional when deserializing; missing keys take the
/// [`Default`] value.
///
/// # Example
/// ```
/// use boxtrack_rs::config::StoreConfig;
/// let config = StoreConfig::from_json_str(r#"{ "confidence_threshold": 0.7 }"#).unwrap();
/// assert_eq!(config.confidence_threshold, 0.7);
/// assert_eq!(config.max_missed_updates, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Detections must score strictly above this to be stored.
    pub confidence_threshold: f32,
    pub tracking_level: TrackingLevel,
    /// Closed frames an object may go without an update before eviction.
    pub max_missed_updates: usize,
    pub vertical_flip: VerticalFlip,
    pub height_source: HeightSource,
    /// Clamp incoming rects into the unit square instead of passing
    /// out-of-range values through.
    pub clamp_input: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.1,
            tracking_level: TrackingLevel::Accurate,
            max_missed_updates: 30,
            vertical_flip: VerticalFlip::OriginAndHeight,
            height_source: HeightSource::Height,
            clamp_input: false,
        }
    }
}

impl StoreConfig {
    pub fn with_confidence_threshold(self, confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
            ..self
        }
    }

    pub fn with_tracking_level(self, tracking_level: TrackingLevel) -> Self {
        Self {
            tracking_level,
            ..self
        }
    }

    pub fn with_max_missed_updates(self, max_missed_updates: usize) -> Self {
        Self {
            max_missed_updates,
            ..self
        }
    }

    pub fn with_mapper(self, mapper: CoordinateMapper) -> Self {
        Self {
            vertical_flip: mapper.flip(),
            height_source: mapper.height_source(),
            ..self
        }
    }

    pub fn with_clamp_input(self, clamp_input: bool) -> Self {
        Self {
            clamp_input,
            ..self
        }
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.vertical_flip, self.height_source)
    }

    pub fn from_json_str(json: &str) -> Result<Self, TrackError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TrackError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        let threshold = self.confidence_threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(TrackError::InvalidConfig(format!(
                "confidence_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        Ok(())
    }
}
