use anyhow::{Context, Result};
use serde_json::json;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Reflectance in percent: a base level plus Gaussian bands, clamped to [0, 100].
fn generate_spectrum(
    wavelengths: &[f64],
    base: f64,
    bands: &[(f64, f64, f64)],
    noise_level: f64,
    noise: &mut MeasurementNoise,
) -> Vec<f64> {
    wavelengths
        .iter()
        .map(|&nm| {
            let signal: f64 = bands
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(nm, mu, sigma, amp))
                .sum();
            (base + signal + noise.sample(noise_level)).clamp(0.0, 100.0)
        })
        .collect()
}

/// Deterministic instrument noise: splitmix64 uniforms, Box-Muller pairs.
struct MeasurementNoise {
    counter: u64,
    spare: Option<f64>,
}

impl MeasurementNoise {
    const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

    fn seeded(seed: u64) -> Self {
        MeasurementNoise {
            counter: seed,
            spare: None,
        }
    }

    /// Uniform in (0, 1].
    fn uniform(&mut self) -> f64 {
        self.counter = self.counter.wrapping_add(Self::GOLDEN_GAMMA);
        let mut z = self.counter;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        ((z >> 11) + 1) as f64 / (1u64 << 53) as f64
    }

    /// Normal deviate with standard deviation `sigma` (percent reflectance).
    fn sample(&mut self, sigma: f64) -> f64 {
        if let Some(z) = self.spare.take() {
            return sigma * z;
        }
        let radius = (-2.0 * self.uniform().ln()).sqrt();
        let angle = std::f64::consts::TAU * self.uniform();
        self.spare = Some(radius * angle.sin());
        sigma * radius * angle.cos()
    }
}

fn main() -> Result<()> {
    let mut noise = MeasurementNoise::seeded(42);

    // Wavelengths: 380 → 780 nm, step 5
    let wavelengths: Vec<f64> = (0..81).map(|i| 380.0 + i as f64 * 5.0).collect();

    // (name, base reflectance, bands as (centre nm, width nm, amplitude))
    let swatches: Vec<(&str, f64, Vec<(f64, f64, f64)>)> = vec![
        ("white tile", 88.0, vec![(450.0, 60.0, 3.0)]),
        ("grey card", 18.0, vec![]),
        ("red paint", 5.0, vec![(680.0, 60.0, 70.0)]),
        ("leaf green", 6.0, vec![(550.0, 30.0, 25.0), (760.0, 40.0, 45.0)]),
        ("ultramarine", 8.0, vec![(450.0, 35.0, 40.0)]),
        ("cadmium yellow", 4.0, vec![(620.0, 90.0, 80.0)]),
    ];

    let samples: Vec<_> = swatches
        .iter()
        .map(|(name, base, bands)| {
            let values = generate_spectrum(&wavelengths, *base, bands, 0.3, &mut noise);
            json!({ "name": name, "values": values })
        })
        .collect();

    let document = json!({
        "unit": "nm",
        "scale": 100,
        "wavelength": wavelengths,
        "samples": samples,
    });

    let output_path = "sample_spectra.json";
    let text = serde_json::to_string_pretty(&document).context("serializing spectra")?;
    std::fs::write(output_path, text).with_context(|| format!("writing {output_path}"))?;

    println!(
        "Wrote {} spectra ({} wavelengths each) to {output_path}",
        samples.len(),
        wavelengths.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_reproducible_and_bounded() {
        let mut a = MeasurementNoise::seeded(7);
        let mut b = MeasurementNoise::seeded(7);
        for _ in 0..1000 {
            let u = a.uniform();
            assert!(u > 0.0 && u <= 1.0);
            assert_eq!(u, b.uniform());
        }
        let spectrum = generate_spectrum(&[380.0, 550.0, 780.0], 99.9, &[], 5.0, &mut a);
        assert!(spectrum.iter().all(|v| (0.0..=100.0).contains(v)));
    }
}
