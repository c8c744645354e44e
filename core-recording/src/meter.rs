//! Input-level pulse mapping.
//!
//! The recorder engine reports instantaneous input levels in roughly dBFS
//! units (0 is full scale, silence trends far negative). The UI renders a
//! pulse whose size follows the level; the mapping is a linear decay over an
//! assumed floor-to-0 range:
//!
//! ```text
//! scale(level) = clamp(1 - |level| / floor, 0, 1)
//! ```
//!
//! With the default 80 dB floor: -40 maps to 0.5, -100 clamps to 0, and 0
//! maps to 1. Purely presentational, but the numeric mapping is a
//! reproducible contract.

/// Default dynamic-range floor in dB.
pub const DEFAULT_METERING_FLOOR_DB: f32 = 80.0;

/// Map a metering level to the normalized pulse scale.
///
/// `floor_db` is the magnitude of the assumed silence floor; levels at or
/// below `-floor_db` produce 0, a level of 0 produces 1. Positive levels
/// (above full scale) also clamp to 1.
pub fn pulse_scale(level_db: f32, floor_db: f32) -> f32 {
    (1.0 - level_db.abs() / floor_db).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_values() {
        assert_eq!(pulse_scale(-40.0, DEFAULT_METERING_FLOOR_DB), 0.5);
        assert_eq!(pulse_scale(-100.0, DEFAULT_METERING_FLOOR_DB), 0.0);
        assert_eq!(pulse_scale(0.0, DEFAULT_METERING_FLOOR_DB), 1.0);
    }

    #[test]
    fn test_floor_exactly_reached() {
        assert_eq!(pulse_scale(-80.0, 80.0), 0.0);
    }

    #[test]
    fn test_above_full_scale_clamps() {
        // |level| for a (nonsensical) positive level still decays the scale;
        // only values past the floor clamp.
        assert_eq!(pulse_scale(40.0, 80.0), 0.5);
        assert_eq!(pulse_scale(160.0, 80.0), 0.0);
    }

    #[test]
    fn test_custom_floor() {
        assert_eq!(pulse_scale(-30.0, 60.0), 0.5);
    }
}
