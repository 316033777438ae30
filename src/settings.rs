//! Background effect settings
//!
//! Controls flock density and accessibility behavior. Persisted by the host
//! as JSON; the engine itself never touches storage.

use serde::{Deserialize, Serialize};

/// Effect density levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DensityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl DensityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DensityPreset::Low => "Low",
            DensityPreset::Medium => "Medium",
            DensityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(DensityPreset::Low),
            "medium" | "med" => Some(DensityPreset::Medium),
            "high" => Some(DensityPreset::High),
            _ => None,
        }
    }

    /// Flock size for this preset
    pub fn bird_count(&self) -> usize {
        match self {
            DensityPreset::Low => 15,
            DensityPreset::Medium => 35,
            DensityPreset::High => 60,
        }
    }

    /// Firefly pool size for this preset
    pub fn firefly_count(&self) -> usize {
        match self {
            DensityPreset::Low => 8,
            DensityPreset::Medium => 15,
            DensityPreset::High => 30,
        }
    }
}

/// Background effect settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSettings {
    /// Particle density preset
    pub density: DensityPreset,
    /// Explicit flock size (overrides the preset when set)
    pub bird_count: Option<u32>,
    /// Explicit firefly pool size (overrides the preset when set)
    pub firefly_count: Option<u32>,
    /// Firefly layer toggle
    pub fireflies: bool,
    /// Reduced motion: skip the exaggerated near-camera exit dive
    pub reduced_motion: bool,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            density: DensityPreset::Medium,
            bird_count: None,
            firefly_count: None,
            fireflies: true,
            reduced_motion: false,
        }
    }
}

impl EffectSettings {
    /// Create settings from a density preset (applies preset defaults)
    pub fn from_preset(preset: DensityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a density preset (updates density-dependent settings)
    pub fn apply_preset(&mut self, preset: DensityPreset) {
        self.density = preset;

        // Low preset sheds the secondary layer entirely
        if preset == DensityPreset::Low {
            self.fireflies = false;
        }
    }

    /// Flock size after overrides
    pub fn effective_bird_count(&self) -> usize {
        self.bird_count
            .map(|n| n as usize)
            .unwrap_or_else(|| self.density.bird_count())
    }

    /// Firefly pool size after overrides and the layer toggle
    pub fn effective_firefly_count(&self) -> usize {
        if !self.fireflies {
            0
        } else {
            self.firefly_count
                .map(|n| n as usize)
                .unwrap_or_else(|| self.density.firefly_count())
        }
    }

    /// Serialize for host-side persistence
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore from host-side persistence
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_name_round_trip() {
        for preset in [
            DensityPreset::Low,
            DensityPreset::Medium,
            DensityPreset::High,
        ] {
            assert_eq!(DensityPreset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(DensityPreset::from_str("med"), Some(DensityPreset::Medium));
        assert_eq!(DensityPreset::from_str("ultra"), None);
    }

    #[test]
    fn test_effective_counts_follow_preset() {
        let settings = EffectSettings::default();
        assert_eq!(settings.effective_bird_count(), 35);
        assert_eq!(settings.effective_firefly_count(), 15);
    }

    #[test]
    fn test_overrides_win_over_preset() {
        let settings = EffectSettings {
            bird_count: Some(5),
            firefly_count: Some(2),
            ..Default::default()
        };
        assert_eq!(settings.effective_bird_count(), 5);
        assert_eq!(settings.effective_firefly_count(), 2);
    }

    #[test]
    fn test_firefly_toggle_zeroes_count() {
        let settings = EffectSettings {
            fireflies: false,
            firefly_count: Some(10),
            ..Default::default()
        };
        assert_eq!(settings.effective_firefly_count(), 0);
    }

    #[test]
    fn test_low_preset_sheds_fireflies() {
        let settings = EffectSettings::from_preset(DensityPreset::Low);
        assert_eq!(settings.effective_bird_count(), 15);
        assert_eq!(settings.effective_firefly_count(), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let settings = EffectSettings {
            density: DensityPreset::High,
            bird_count: Some(42),
            reduced_motion: true,
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        let restored = EffectSettings::from_json(&json).unwrap();
        assert_eq!(restored.density, DensityPreset::High);
        assert_eq!(restored.bird_count, Some(42));
        assert!(restored.reduced_motion);
    }
}
