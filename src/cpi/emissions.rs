//! Energy-to-carbon conversion and occupancy normalization.

/// Multiplier applied to the occupancy factor for medical accommodations.
pub const MEDICAL_OCCUPANCY_MULTIPLIER: f64 = 1.5;

/// Converts consumed energy into carbon-equivalent mass.
///
/// No bounds checking: negative inputs propagate to a negative result.
///
/// # Arguments
///
/// * `energy_kwh` - Energy consumed (kWh)
/// * `carbon_intensity` - Grid intensity (kg CO₂e per kWh)
///
/// # Returns
///
/// Emissions in kg CO₂e.
pub fn compute_emissions(energy_kwh: f64, carbon_intensity: f64) -> f64 {
    energy_kwh * carbon_intensity
}

/// Effective head count used by the area/occupancy normalization.
///
/// At least one occupant is always assumed.
pub fn occupancy_factor(occupancy_count: u32, medical_accommodation: bool) -> f64 {
    let base = f64::from(occupancy_count.max(1));
    if medical_accommodation {
        base * MEDICAL_OCCUPANCY_MULTIPLIER
    } else {
        base
    }
}

/// Emissions per square foot per effective occupant.
pub fn normalize_emissions(
    emissions_kg: f64,
    floor_area: f64,
    occupancy_count: u32,
    medical_accommodation: bool,
) -> f64 {
    emissions_kg / (floor_area * occupancy_factor(occupancy_count, medical_accommodation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emissions_is_product() {
        assert_eq!(compute_emissions(100.0, 0.42), 42.0);
        assert_eq!(compute_emissions(0.0, 0.42), 0.0);
    }

    #[test]
    fn negative_inputs_pass_through() {
        assert_eq!(compute_emissions(-10.0, 0.5), -5.0);
    }

    #[test]
    fn occupancy_factor_floors_at_one() {
        assert_eq!(occupancy_factor(0, false), 1.0);
        assert_eq!(occupancy_factor(1, false), 1.0);
        assert_eq!(occupancy_factor(3, false), 3.0);
    }

    #[test]
    fn medical_flag_scales_factor() {
        assert_eq!(occupancy_factor(0, true), 1.5);
        assert_eq!(occupancy_factor(2, true), 3.0);
    }

    #[test]
    fn normalization_divides_by_area_and_factor() {
        // 300 kg over 100 sqft and 2 occupants
        assert_eq!(normalize_emissions(300.0, 100.0, 2, false), 1.5);
        assert_eq!(normalize_emissions(300.0, 100.0, 2, true), 1.0);
    }
}
