//! Relative spectral power distributions of the supported illuminants.
//!
//! Tabulated data is sampled every 10 nm from 380 to 780 nm. Illuminant A is
//! computed from Planck's law; the D-series from the S0/S1/S2 basis.

/// Mean daylight basis vector S0.
pub const DAYLIGHT_S0: [f64; 41] = [
    63.4, 65.8, 94.8, 104.8, 105.9, 96.8, 113.9, 125.6, 125.5, 121.3,
    121.3, 113.5, 113.1, 110.8, 106.5, 108.8, 105.3, 104.4, 100.0, 96.0,
    95.1, 89.1, 90.5, 90.3, 88.4, 84.0, 85.1, 81.9, 82.6, 84.9,
    81.3, 71.9, 74.3, 76.4, 63.3, 71.7, 77.0, 65.2, 47.7, 68.6,
    65.0,
];

/// First daylight characteristic vector S1.
pub const DAYLIGHT_S1: [f64; 41] = [
    38.5, 35.0, 43.4, 46.3, 43.9, 37.1, 36.7, 35.9, 32.6, 27.9,
    24.3, 20.1, 16.2, 13.2, 8.6, 6.1, 4.2, 1.9, 0.0, -1.6,
    -3.5, -3.5, -5.8, -7.2, -8.6, -9.5, -10.9, -10.7, -12.0, -14.0,
    -13.6, -12.0, -13.3, -12.9, -10.6, -11.6, -12.2, -10.2, -7.8, -11.2,
    -10.4,
];

/// Second daylight characteristic vector S2.
pub const DAYLIGHT_S2: [f64; 41] = [
    3.0, 1.2, -1.1, -0.5, -0.7, -1.2, -2.6, -2.9, -2.8, -2.6,
    -2.6, -1.8, -1.5, -1.3, -1.2, -1.0, -0.5, -0.3, 0.0, 0.2,
    0.5, 2.1, 3.2, 4.1, 4.7, 5.1, 6.7, 7.3, 8.6, 9.8,
    10.2, 8.3, 9.6, 8.5, 7.0, 7.6, 8.0, 6.7, 5.2, 7.4,
    6.8,
];

/// CIE illuminant C.
pub const ILLUMINANT_C: [f64; 41] = [
    33.0, 47.4, 63.3, 80.6, 98.1, 112.4, 121.5, 124.0, 123.1, 123.8,
    123.9, 120.7, 112.1, 102.3, 96.9, 98.0, 102.1, 105.2, 105.3, 102.3,
    97.8, 93.2, 89.7, 88.4, 88.1, 88.0, 87.8, 88.2, 87.9, 86.3,
    84.0, 80.2, 76.3, 72.4, 68.3, 64.4, 61.5, 59.2, 58.1, 58.2,
    59.1,
];

// ---------------------------------------------------------------------------
// Analytic illuminants
// ---------------------------------------------------------------------------

/// Second radiation constant as used by the CIE definition of illuminant A (nm·K).
const C2_A: f64 = 1.435e7;

/// CIE illuminant A at `nm`, normalized to 100 at 560 nm.
pub fn illuminant_a(nm: f64) -> f64 {
    let t = 2848.0;
    100.0 * (560.0 / nm).powi(5) * ((C2_A / (t * 560.0)).exp() - 1.0) / ((C2_A / (t * nm)).exp() - 1.0)
}

/// Daylight mixing weights `(M1, M2)` for a nominal correlated colour temperature.
///
/// The nominal temperature is corrected for the 1968 revision of `c2`, and the
/// weights are rounded to three decimals as the CIE tables are.
pub fn daylight_weights(nominal_cct: f64) -> (f64, f64) {
    let t = nominal_cct * 1.4388 / 1.4380;
    let x = if t <= 7000.0 {
        -4.6070e9 / t.powi(3) + 2.9678e6 / t.powi(2) + 0.09911e3 / t + 0.244063
    } else {
        -2.0064e9 / t.powi(3) + 1.9018e6 / t.powi(2) + 0.24748e3 / t + 0.237040
    };
    let y = -3.0 * x * x + 2.870 * x - 0.275;
    let m = 0.0241 + 0.2562 * x - 0.7341 * y;
    let m1 = (-1.3515 - 1.7703 * x + 5.9114 * y) / m;
    let m2 = (0.0300 - 31.4424 * x + 30.0717 * y) / m;
    (round3(m1), round3(m2))
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// D-series illuminant for `nominal_cct` sampled on the 10 nm grid.
pub fn daylight(nominal_cct: f64) -> [f64; 41] {
    let (m1, m2) = daylight_weights(nominal_cct);
    let mut out = [0.0; 41];
    for (i, v) in out.iter_mut().enumerate() {
        *v = DAYLIGHT_S0[i] + m1 * DAYLIGHT_S1[i] + m2 * DAYLIGHT_S2[i];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn illuminant_a_is_normalized_at_560() {
        assert_abs_diff_eq!(illuminant_a(560.0), 100.0, epsilon = 1e-12);
        assert!(illuminant_a(380.0) < illuminant_a(780.0));
    }

    #[test]
    fn d65_weights_match_published_values() {
        let (m1, m2) = daylight_weights(6500.0);
        assert_abs_diff_eq!(m1, -0.295, epsilon = 1e-9);
        assert_abs_diff_eq!(m2, -0.689, epsilon = 1e-9);
    }

    #[test]
    fn d65_is_close_to_100_at_560() {
        let d65 = daylight(6500.0);
        // index 18 is 560 nm
        assert!((d65[18] - 100.0).abs() < 0.5, "got {}", d65[18]);
    }
}
