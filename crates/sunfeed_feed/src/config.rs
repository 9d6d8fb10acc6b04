//! Feed configuration
//!
//! Loaded from a `sunfeed.toml` file; every field has a default so an empty
//! file (or no file) is a valid configuration.
//!
//! ```toml
//! [animation]
//! fade_ms = 300
//! press_scale = 0.95
//!
//! [colors]
//! liked = "#FF3333"
//! unliked = "#FFFFFF"
//! ```

use crate::error::{FeedError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use sunfeed_core::Color;

/// Top-level feed configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub colors: ColorConfig,
}

/// Durations (milliseconds) and factors for every feed animation
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Comment panel fade in/out
    pub fade_ms: f32,
    /// Post preview fade inside the comment panel
    pub preview_fade_ms: f32,
    /// Scale factor at the bottom of a button press
    pub press_scale: f32,
    /// Whole press pulse, both halves
    pub press_ms: f32,
    /// Like counter tween
    pub count_ms: f32,
    /// Like icon color transition
    pub color_ms: f32,
    /// Scale + fade of a single comment entry
    pub comment_spawn_ms: f32,
    /// Pause between consecutive comment entries
    pub comment_spawn_delay_ms: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fade_ms: 300.0,
            preview_fade_ms: 200.0,
            press_scale: 0.95,
            press_ms: 200.0,
            count_ms: 500.0,
            color_ms: 200.0,
            comment_spawn_ms: 300.0,
            comment_spawn_delay_ms: 100.0,
        }
    }
}

impl AnimationConfig {
    /// Every duration set to zero; animations apply their end state at once
    pub fn instant() -> Self {
        Self {
            fade_ms: 0.0,
            preview_fade_ms: 0.0,
            press_ms: 0.0,
            count_ms: 0.0,
            color_ms: 0.0,
            comment_spawn_ms: 0.0,
            comment_spawn_delay_ms: 0.0,
            ..Default::default()
        }
    }

    fn durations(&self) -> [(&'static str, f32); 7] {
        [
            ("fade_ms", self.fade_ms),
            ("preview_fade_ms", self.preview_fade_ms),
            ("press_ms", self.press_ms),
            ("count_ms", self.count_ms),
            ("color_ms", self.color_ms),
            ("comment_spawn_ms", self.comment_spawn_ms),
            ("comment_spawn_delay_ms", self.comment_spawn_delay_ms),
        ]
    }
}

/// Like indicator colors
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColorConfig {
    #[serde(with = "hex_color")]
    pub liked: Color,
    #[serde(with = "hex_color")]
    pub unliked: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            liked: Color::LIKED,
            unliked: Color::WHITE,
        }
    }
}

impl ColorConfig {
    pub fn for_state(&self, liked: bool) -> Color {
        if liked {
            self.liked
        } else {
            self.unliked
        }
    }
}

impl FeedConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: FeedConfig =
            toml::from_str(text).map_err(|e| FeedError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.animation.durations() {
            if !value.is_finite() {
                return Err(FeedError::Config(format!("{} must be a finite number", name)));
            }
        }
        let scale = self.animation.press_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(FeedError::Config(format!(
                "press_scale must be positive, got {}",
                scale
            )));
        }
        Ok(())
    }
}

mod hex_color {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use sunfeed_core::Color;

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let hex = format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            channel(color.r),
            channel(color.g),
            channel(color.b),
            channel(color.a)
        );
        serializer.serialize_str(&hex)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::parse_hex(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid hex color {:?}", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(FeedConfig::from_toml_str("").unwrap(), FeedConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = FeedConfig::from_toml_str(
            r##"
            [animation]
            fade_ms = 150
            press_scale = 0.8

            [colors]
            liked = "#00FF00"
            "##,
        )
        .unwrap();

        assert_eq!(config.animation.fade_ms, 150.0);
        assert_eq!(config.animation.press_scale, 0.8);
        assert_eq!(config.animation.count_ms, 500.0);
        assert_eq!(config.colors.liked, Color::rgb(0.0, 1.0, 0.0));
        assert_eq!(config.colors.unliked, Color::WHITE);
    }

    #[test]
    fn test_default_liked_color_matches_hex() {
        assert_eq!(Color::parse_hex("#FF3333"), Some(Color::LIKED));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            FeedConfig::from_toml_str("[colors]\nliked = \"red\""),
            Err(FeedError::Config(_))
        ));
        assert!(matches!(
            FeedConfig::from_toml_str("[animation]\npress_scale = 0"),
            Err(FeedError::Config(_))
        ));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = FeedConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(FeedConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = FeedConfig::load(dir.path().join("sunfeed.toml")).unwrap();
        assert_eq!(config, FeedConfig::default());
    }
}
