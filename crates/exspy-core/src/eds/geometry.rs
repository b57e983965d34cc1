//! Detector/stage geometry.

/// Take-off angle in degrees: the angle with which the X-rays leave the
/// sample surface towards the detector.
///
/// `tilt_alpha_deg` tilts the sample towards the detector when positive;
/// `tilt_beta_deg` tilts it towards positive 90 in the azimuthal direction.
/// The detector position is given by its azimuth (0 is perpendicular to the
/// alpha tilt axis) and elevation.
pub fn take_off_angle(
    tilt_alpha_deg: f64,
    azimuth_angle_deg: f64,
    elevation_angle_deg: f64,
    tilt_beta_deg: f64,
) -> f64 {
    let alpha = tilt_alpha_deg.to_radians();
    let beta = -tilt_beta_deg.to_radians();
    let phi = azimuth_angle_deg.to_radians();
    let theta = -elevation_angle_deg.to_radians();

    let projection = alpha.sin() * beta.cos() * phi.cos() * theta.cos()
        - beta.sin() * phi.sin() * theta.cos()
        - alpha.cos() * beta.cos() * theta.sin();

    90.0 - projection.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::take_off_angle;

    fn assert_close(expected: f64, actual: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected={expected} actual={actual}"
        );
    }

    #[test]
    fn aligned_detector_adds_tilt_and_elevation() {
        assert_close(40.0, take_off_angle(30.0, 0.0, 10.0, 0.0), 1.0e-9);
    }

    #[test]
    fn beta_tilt_replaces_alpha_at_90_degree_azimuth() {
        assert_close(40.0, take_off_angle(0.0, 90.0, 10.0, 30.0), 1.0e-9);
    }

    #[test]
    fn oblique_geometry_matches_reference_value() {
        assert_close(
            73.157_883_763_701_21,
            take_off_angle(45.0, 45.0, 45.0, 45.0),
            1.0e-9,
        );
    }
}
