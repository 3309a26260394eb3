use serde::{Serialize, Deserialize};

/// Hard ceiling on recursion depth, matching the builder's clamp
pub const MAX_GENERATION: u32 = 15;

/// Flat configuration record consumed read-only by every branch during
/// construction
///
/// Missing YAML fields fall back to the defaults below, so a preset file
/// only needs the values it wants to override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    /// Trunk height
    pub height: f32,
    /// Trunk radius at the base
    pub radius: f32,
    /// Recursion depth; 1 builds a single capped branch
    pub generation: u32,
    /// Exclusive upper bound on children per branch (lower bound is 2)
    pub child_count: u32,
    /// Rings per branch
    pub segment_height: usize,
    /// Vertices per ring (one of them duplicates the seam point)
    pub segment_width: usize,
    /// Jitter applied to ring points, as a fraction of the local radius
    pub segment_noise: f32,
    /// Radius multiplier from a branch's base to its tip
    pub radius_reduction_rate: f32,
    /// Range of the height multiplier applied to each child
    pub height_reduction_rate_min: f32,
    pub height_reduction_rate_max: f32,
    /// Range of the radius multiplier applied to non-continuation children
    pub child_radius_rate_min: f32,
    pub child_radius_rate_max: f32,
    /// Fractional range along a branch where children may attach
    pub child_segment_from_min: f32,
    pub child_segment_from_max: f32,
    /// Magnitude of the lateral bend sampled per branch
    pub bending_noise: f32,
    /// Per-generation multiplier on bending noise; children bend harder
    pub bending_scale: f32,
    /// Growth animation speed; 1.0 grows one ring per unit tick
    pub growth_speed: f32,
    /// Interpolate the growth front instead of snapping ring by ring
    pub smooth_growth: bool,
    /// Seed for the build's random generator
    pub seed: u64,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            height: 8.0,
            radius: 1.5,
            generation: 7,
            child_count: 3,
            segment_height: 14,
            segment_width: 10,
            segment_noise: 0.2,
            radius_reduction_rate: 0.6,
            height_reduction_rate_min: 0.8,
            height_reduction_rate_max: 0.9,
            child_radius_rate_min: 0.7,
            child_radius_rate_max: 0.85,
            child_segment_from_min: 0.2,
            child_segment_from_max: 0.9,
            bending_noise: 0.3,
            bending_scale: 1.1,
            growth_speed: 0.5,
            smooth_growth: false,
            seed: 42,
        }
    }
}

impl Preset {
    /// Parse from a YAML string and validate
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let preset: Preset = serde_yaml::from_str(yaml)
            .map_err(|e| format!("YAML parse error: {}", e))?;
        preset.validate()?;
        Ok(preset)
    }

    /// Reject configurations that cannot produce a well-formed tree
    ///
    /// Runs before any recursion starts; a failed build never yields a
    /// partially constructed tree.
    pub fn validate(&self) -> Result<(), String> {
        if self.generation < 1 {
            return Err(format!(
                "generation must be at least 1, got {}",
                self.generation
            ));
        }
        if self.segment_width < 3 {
            return Err(format!(
                "segment_width must be at least 3 to form a ring, got {}",
                self.segment_width
            ));
        }
        if self.segment_height < 2 {
            return Err(format!(
                "segment_height must be at least 2, got {}",
                self.segment_height
            ));
        }
        if !(self.height > 0.0) {
            return Err(format!("height must be positive, got {}", self.height));
        }
        if !(self.radius > 0.0) {
            return Err(format!("radius must be positive, got {}", self.radius));
        }
        if !(self.growth_speed > 0.0) {
            return Err(format!(
                "growth_speed must be positive, got {}",
                self.growth_speed
            ));
        }
        if self.child_segment_from_min < 0.0
            || self.child_segment_from_max > 1.0
            || self.child_segment_from_min > self.child_segment_from_max
        {
            return Err(format!(
                "child segment range [{}, {}] must lie within [0, 1]",
                self.child_segment_from_min, self.child_segment_from_max
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preset_is_valid() {
        assert!(Preset::default().validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let preset = Preset::from_yaml("generation: 3\nsegment_height: 6\n").unwrap();
        assert_eq!(preset.generation, 3);
        assert_eq!(preset.segment_height, 6);
        assert_eq!(preset.segment_width, 10);
        assert!((preset.height - 8.0).abs() < 0.0001);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let preset = Preset::from_yaml("{}").unwrap();
        assert_eq!(preset.generation, 7);
        assert_eq!(preset.seed, 42);
    }

    #[test]
    fn test_rejects_zero_generation() {
        let result = Preset::from_yaml("generation: 0");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("generation"));
    }

    #[test]
    fn test_rejects_degenerate_ring() {
        let result = Preset::from_yaml("segment_width: 2");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("segment_width"));
    }

    #[test]
    fn test_rejects_non_positive_height() {
        let preset = Preset {
            height: 0.0,
            ..Default::default()
        };
        assert!(preset.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_attach_range() {
        let preset = Preset {
            child_segment_from_min: 0.8,
            child_segment_from_max: 0.3,
            ..Default::default()
        };
        assert!(preset.validate().is_err());
    }

    #[test]
    fn test_parse_error_is_descriptive() {
        let result = Preset::from_yaml(": not yaml :");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("YAML"));
    }
}
