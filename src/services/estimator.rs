/// ============================================================
///  Photovoltaic Feasibility Estimator
///
///  First-order sizing model, not an engineering-grade simulator:
///   1. Aggregate statistics over the daily irradiance series
///      (unweighted mean / max / min; normalized zeros included,
///      so missing days pull the average down)
///   2. Per-panel daily yield – E = G_avg × η × A × rotation
///   3. Panel count – smallest integer meeting the declared need
///      (capacity always rounds up, never down)
///   4. Fixed-tilt angle – latitude-equals-tilt heuristic for an
///      equator-facing panel
/// ============================================================

use crate::errors::AnalysisError;
use crate::models::analysis::{AnalysisResult, DailySample, LocationData, UserRequirement};

// ─── Model constants ─────────────────────────────────────────
// Compile-time constants of the model; changing them is a
// model-version change, not configuration.
pub const PANEL_EFFICIENCY: f64 = 0.20;
pub const PANEL_AREA_M2: f64 = 1.6;
pub const ROTATION_GAIN: f64 = 1.25;

/// Sizes a panel array against the declared daily energy need.
///
/// Pure function of its inputs: no I/O, no clock, no randomness. The series
/// must already be sentinel-normalized and date-ascending — the `-999`
/// missing-day marker is a protocol detail of the archive fetch, handled at
/// ingestion, never here.
///
/// Fails loudly instead of returning a zero-filled or NaN result:
/// * empty series → `EmptyHistoryData` (the caller should have rejected the
///   fetch result already; this is the last line of defense)
/// * non-positive or non-finite need → `InvalidRequirement`
/// * zero average irradiance (e.g. permanent polar night) →
///   `InsufficientData`, since panel sizing divides by per-panel yield
pub fn estimate(
    series: &[DailySample],
    requirement: &UserRequirement,
    location: &LocationData,
) -> Result<AnalysisResult, AnalysisError> {
    if series.is_empty() {
        return Err(AnalysisError::EmptyHistoryData);
    }
    let need = requirement.daily_energy_need_kwh;
    if !need.is_finite() || need <= 0.0 {
        return Err(AnalysisError::InvalidRequirement(format!(
            "daily energy need must be positive, got {} kWh",
            need
        )));
    }
    if !location.validate() {
        return Err(AnalysisError::InvalidCoordinates(
            location.latitude,
            location.longitude,
        ));
    }

    let days = series.len() as f64;
    let average_radiation = series.iter().map(|s| s.radiation).sum::<f64>() / days;
    let max_radiation = series.iter().map(|s| s.radiation).fold(f64::MIN, f64::max);
    let min_radiation = series.iter().map(|s| s.radiation).fold(f64::MAX, f64::min);

    // Context means for the narration layer; sizing ignores them.
    let average_temperature_c = series.iter().map(|s| s.temperature_c).sum::<f64>() / days;
    let average_cloud_cover_percent =
        series.iter().map(|s| s.cloud_cover_percent).sum::<f64>() / days;

    // Flat tracking bonus across the whole window, not sun-angle physics.
    let rotation_factor = if requirement.use_rotating_mount { ROTATION_GAIN } else { 1.0 };

    let per_panel_output_kwh = average_radiation * PANEL_EFFICIENCY * PANEL_AREA_M2 * rotation_factor;
    if per_panel_output_kwh <= 0.0 {
        return Err(AnalysisError::InsufficientData);
    }

    let panels_required = (need / per_panel_output_kwh).ceil() as u32;
    let total_energy_potential_kwh = panels_required as f64 * per_panel_output_kwh;

    let optimal_tilt_degrees = location.latitude.abs();

    Ok(AnalysisResult {
        location: location.clone(),
        requirement: requirement.clone(),
        average_radiation,
        max_radiation,
        min_radiation,
        average_temperature_c,
        average_cloud_cover_percent,
        total_energy_potential_kwh,
        panels_required,
        daily_series: series.to_vec(),
        optimal_tilt_degrees,
        current_weather: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series_of(radiation: &[f64]) -> Vec<DailySample> {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        radiation
            .iter()
            .enumerate()
            .map(|(i, &r)| DailySample {
                date: start + chrono::Days::new(i as u64),
                radiation: r,
                temperature_c: 20.0,
                cloud_cover_percent: 30.0,
            })
            .collect()
    }

    fn site(latitude: f64) -> LocationData {
        LocationData {
            name: "Test Site".to_string(),
            latitude,
            longitude: -122.4,
        }
    }

    fn need(kwh: f64, rotating: bool) -> UserRequirement {
        UserRequirement { daily_energy_need_kwh: kwh, use_rotating_mount: rotating }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fixed_mount_sizing() {
        // 5.0 kWh/m²/day × 0.20 × 1.6 m² = 1.6 kWh per panel;
        // 3.0 kWh need → 2 panels → 3.2 kWh achievable.
        let r = estimate(&series_of(&[5.0, 5.0, 5.0]), &need(3.0, false), &site(37.0)).unwrap();
        assert!(close(r.average_radiation, 5.0));
        assert_eq!(r.panels_required, 2);
        assert!(close(r.total_energy_potential_kwh, 3.2), "got {}", r.total_energy_potential_kwh);
    }

    #[test]
    fn rotating_mount_sizing() {
        // Same series with tracking: 1.6 × 1.25 = 2.0 kWh per panel → 2 panels, 4.0 kWh.
        let r = estimate(&series_of(&[5.0, 5.0, 5.0]), &need(3.0, true), &site(37.0)).unwrap();
        assert_eq!(r.panels_required, 2);
        assert!(close(r.total_energy_potential_kwh, 4.0), "got {}", r.total_energy_potential_kwh);
    }

    #[test]
    fn all_missing_days_is_insufficient_data() {
        // Sentinel days normalize to zero upstream; an all-zero window makes
        // per-panel yield zero and sizing undefined.
        let err = estimate(&series_of(&[0.0, 0.0]), &need(3.0, false), &site(37.0)).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData));
    }

    #[test]
    fn southern_hemisphere_tilt() {
        let r = estimate(&series_of(&[5.0]), &need(1.0, false), &site(-23.5)).unwrap();
        assert!(close(r.optimal_tilt_degrees, 23.5));
    }

    #[test]
    fn tilt_stays_within_quarter_turn() {
        for lat in [-90.0, -45.0, 0.0, 66.5, 90.0] {
            let r = estimate(&series_of(&[4.0]), &need(1.0, false), &site(lat)).unwrap();
            assert!(r.optimal_tilt_degrees >= 0.0 && r.optimal_tilt_degrees <= 90.0);
        }
    }

    #[test]
    fn uneven_series_statistics() {
        let r = estimate(&series_of(&[2.0, 8.0]), &need(1.0, false), &site(37.0)).unwrap();
        assert!(close(r.average_radiation, 5.0));
        assert!(close(r.min_radiation, 2.0));
        assert!(close(r.max_radiation, 8.0));
        assert_eq!(r.panels_required, 1);
        assert!(close(r.total_energy_potential_kwh, 1.6));
    }

    #[test]
    fn min_average_max_stay_ordered() {
        let r = estimate(&series_of(&[0.0, 3.3, 7.1, 1.2]), &need(5.0, false), &site(50.0)).unwrap();
        assert!(r.min_radiation <= r.average_radiation);
        assert!(r.average_radiation <= r.max_radiation);
    }

    #[test]
    fn capacity_always_covers_the_need() {
        let series = series_of(&[3.7, 4.2, 5.9, 2.1, 6.4]);
        for need_kwh in [0.1, 1.0, 3.0, 7.5, 42.0, 999.0] {
            for rotating in [false, true] {
                let r = estimate(&series, &need(need_kwh, rotating), &site(37.0)).unwrap();
                assert!(r.panels_required >= 1);
                assert!(
                    r.total_energy_potential_kwh >= need_kwh,
                    "need {} not covered by {}",
                    need_kwh,
                    r.total_energy_potential_kwh
                );
            }
        }
    }

    #[test]
    fn rotation_never_increases_panel_count() {
        let series = series_of(&[3.7, 4.2, 5.9, 2.1, 6.4]);
        for need_kwh in [0.5, 2.0, 10.0, 100.0] {
            let fixed = estimate(&series, &need(need_kwh, false), &site(37.0)).unwrap();
            let tracking = estimate(&series, &need(need_kwh, true), &site(37.0)).unwrap();
            assert!(tracking.panels_required <= fixed.panels_required);
        }
    }

    #[test]
    fn zero_days_count_toward_the_average() {
        // Missing days are zero contribution, not excluded: they drag the
        // mean down by policy.
        let with_gap = estimate(&series_of(&[6.0, 0.0]), &need(1.0, false), &site(37.0)).unwrap();
        assert!(close(with_gap.average_radiation, 3.0));
    }

    #[test]
    fn empty_series_is_rejected() {
        let err = estimate(&[], &need(3.0, false), &site(37.0)).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyHistoryData));
    }

    #[test]
    fn non_positive_need_is_rejected() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = estimate(&series_of(&[5.0]), &need(bad, false), &site(37.0)).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidRequirement(_)), "accepted {}", bad);
        }
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let err = estimate(&series_of(&[5.0]), &need(1.0, false), &site(91.0)).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidCoordinates(..)));
    }
}
