//! Spectrum → XYZ.
//!
//! ```text
//!  raw (λ, v) pairs ── nm, sorted, range-checked
//!        │
//!        ▼
//!  WavelengthGrid      integer start/end/step inside 380..=780
//!        │
//!        ▼
//!  cubic resample      skipped when the grid equals the input wavelengths
//!        │
//!        ▼
//!  Σ S·cmf·v / Σ S·ȳ   Y of a perfect reflector = 100
//! ```

use nalgebra::{Matrix3xX, Vector3};

use crate::color::batch_from_columns;
use crate::context::ColorimetricContext;
use crate::data::model::{SpectralTable, Spectrum, SpectrumScale, WavelengthUnit};
use crate::error::{ColourError, Result};
use crate::interp::{Boundary, Degree, InterpolationModel};
use crate::tables::{WAVELENGTH_END, WAVELENGTH_START};

/// A spectrum whose minimum wavelength lies above this is rejected.
pub const MAX_FIRST_WAVELENGTH: f64 = 400.0;
/// A spectrum whose maximum wavelength lies below this is rejected.
pub const MIN_LAST_WAVELENGTH: f64 = 700.0;

// ---------------------------------------------------------------------------
// WavelengthGrid
// ---------------------------------------------------------------------------

/// Integer wavelength grid the reference tables are sampled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavelengthGrid {
    pub start: u32,
    pub end: u32,
    pub step: u32,
}

impl WavelengthGrid {
    /// Grid for sorted wavelengths (nm), stepping by their median spacing.
    ///
    /// The grid spans 380..=780 nm, shrunk to the spectrum's own range when
    /// that is narrower.
    pub fn for_wavelengths(sorted: &[f64]) -> Self {
        let step = median_spacing(sorted).round().clamp(1.0, 10.0) as u32;
        let fstep = f64::from(step);
        let (min, max) = match (sorted.first(), sorted.last()) {
            (Some(&min), Some(&max)) => (min, max),
            _ => (f64::from(WAVELENGTH_START), f64::from(WAVELENGTH_END)),
        };

        let start = if min <= f64::from(WAVELENGTH_START) {
            WAVELENGTH_START
        } else {
            ((min / fstep).floor() * fstep).max(f64::from(WAVELENGTH_START)) as u32
        };
        let end = if max >= f64::from(WAVELENGTH_END) {
            WAVELENGTH_END
        } else {
            ((max / fstep).ceil() * fstep).min(f64::from(WAVELENGTH_END)) as u32
        };

        WavelengthGrid { start, end, step }
    }

    pub fn points(&self) -> Vec<f64> {
        (self.start..=self.end)
            .step_by(self.step as usize)
            .map(f64::from)
            .collect()
    }

    /// Offsets into the 1 nm reference tables.
    fn table_indices(&self) -> impl Iterator<Item = usize> {
        (self.start..=self.end)
            .step_by(self.step as usize)
            .map(|nm| (nm - WAVELENGTH_START) as usize)
    }
}

fn median_spacing(sorted: &[f64]) -> f64 {
    let mut gaps: Vec<f64> = sorted.windows(2).map(|w| w[1] - w[0]).collect();
    if gaps.is_empty() {
        return 1.0;
    }
    gaps.sort_by(f64::total_cmp);
    let mid = gaps.len() / 2;
    if gaps.len() % 2 == 0 {
        (gaps[mid - 1] + gaps[mid]) / 2.0
    } else {
        gaps[mid]
    }
}

// ---------------------------------------------------------------------------
// SpectrumIntegrator
// ---------------------------------------------------------------------------

/// Integrates spectra against the context's illuminant and observer.
#[derive(Debug, Clone)]
pub struct SpectrumIntegrator<'a> {
    context: &'a ColorimetricContext,
    unit: WavelengthUnit,
    scale: SpectrumScale,
}

impl<'a> SpectrumIntegrator<'a> {
    pub fn new(context: &'a ColorimetricContext) -> Self {
        SpectrumIntegrator {
            context,
            unit: WavelengthUnit::default(),
            scale: SpectrumScale::default(),
        }
    }

    pub fn with_unit(mut self, unit: WavelengthUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_scale(mut self, scale: SpectrumScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn context(&self) -> &'a ColorimetricContext {
        self.context
    }

    pub fn integrate(&self, spectrum: &Spectrum) -> Result<Vector3<f64>> {
        let xyz = self.integrate_columns(&spectrum.wavelengths, std::slice::from_ref(&spectrum.values))?;
        Ok(xyz.column(0).into_owned())
    }

    /// XYZ of every column, as a 3×N batch.
    pub fn integrate_table(&self, table: &SpectralTable) -> Result<Matrix3xX<f64>> {
        self.integrate_columns(&table.wavelengths, &table.columns)
    }

    fn integrate_columns(&self, wavelengths: &[f64], columns: &[Vec<f64>]) -> Result<Matrix3xX<f64>> {
        if wavelengths.len() < 2 {
            return Err(ColourError::TooFewPoints {
                required: 2,
                got: wavelengths.len(),
            });
        }
        for column in columns {
            if column.len() != wavelengths.len() {
                return Err(ColourError::LengthMismatch {
                    x: wavelengths.len(),
                    y: column.len(),
                });
            }
        }

        let nm: Vec<f64> = wavelengths.iter().map(|&w| self.unit.to_nanometres(w)).collect();
        if nm.iter().chain(columns.iter().flatten()).any(|v| !v.is_finite()) {
            return Err(ColourError::NonFinite);
        }
        let mut order: Vec<usize> = (0..nm.len()).collect();
        order.sort_by(|&a, &b| nm[a].total_cmp(&nm[b]));
        let sorted: Vec<f64> = order.iter().map(|&i| nm[i]).collect();

        let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
        if min > MAX_FIRST_WAVELENGTH {
            return Err(ColourError::MinWavelength(min));
        }
        if max < MIN_LAST_WAVELENGTH {
            return Err(ColourError::MaxWavelength(max));
        }

        let grid = WavelengthGrid::for_wavelengths(&sorted);
        let points = grid.points();
        let resampled = if points == sorted {
            log::debug!(
                "grid {}..={} nm step {} matches input, resampling skipped",
                grid.start,
                grid.end,
                grid.step
            );
            columns
                .iter()
                .map(|c| order.iter().map(|&i| c[i]).collect())
                .collect()
        } else {
            log::debug!(
                "resampling {} samples onto {}..={} nm step {}",
                sorted.len(),
                grid.start,
                grid.end,
                grid.step
            );
            let boundary = if sorted.len() >= 4 {
                Boundary::NotAKnot
            } else {
                log::debug!("{} samples, using natural boundary", sorted.len());
                Boundary::Natural
            };
            let model = InterpolationModel::with_series(&nm, columns, Degree::Cubic, boundary)?;
            model.evaluate(&points).values
        };

        let xyz = resampled
            .iter()
            .map(|values| self.weighted_sum(&grid, values))
            .collect::<Result<Vec<_>>>()?;
        Ok(batch_from_columns(&xyz))
    }

    fn weighted_sum(&self, grid: &WavelengthGrid, values: &[f64]) -> Result<[f64; 3]> {
        let tables = self.context.tables();
        let power = tables.illuminant(self.context.illuminant());
        let cmf = tables.observer(self.context.observer());
        let upper = self.scale.upper();

        let mut sum = [0.0; 3];
        let mut norm = 0.0;
        for (index, value) in grid.table_indices().zip(values) {
            let s = power[index];
            let bar = cmf[index];
            let v = value / upper;
            sum[0] += s * bar[0] * v;
            sum[1] += s * bar[1] * v;
            sum[2] += s * bar[2] * v;
            norm += s * bar[1];
        }
        if norm == 0.0 {
            return Err(ColourError::ZeroNormalization);
        }
        Ok(sum.map(|c| 100.0 * c / norm))
    }
}

/// XYZ of a single spectrum under `context`.
pub fn integrate_spectrum(
    spectrum: &Spectrum,
    context: &ColorimetricContext,
    unit: WavelengthUnit,
    scale: SpectrumScale,
) -> Result<Vector3<f64>> {
    SpectrumIntegrator::new(context)
        .with_unit(unit)
        .with_scale(scale)
        .integrate(spectrum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::make_context;
    use approx::assert_relative_eq;

    fn flat(start: u32, end: u32, step: usize, value: f64) -> Spectrum {
        let wavelengths: Vec<f64> = (start..=end).step_by(step).map(f64::from).collect();
        let values = vec![value; wavelengths.len()];
        Spectrum::new(wavelengths, values).unwrap()
    }

    fn smooth(nm: f64) -> f64 {
        50.0 + 30.0 * ((nm - 380.0) / 60.0).sin()
    }

    #[test]
    fn grid_follows_the_input_spacing() {
        let ten: Vec<f64> = (40..=70).map(|i| f64::from(i) * 10.0).collect();
        let grid = WavelengthGrid::for_wavelengths(&ten);
        assert_eq!(grid, WavelengthGrid { start: 400, end: 700, step: 10 });
        assert_eq!(grid.points(), ten);

        let wide: Vec<f64> = (72..=166).map(|i| f64::from(i) * 5.0).collect();
        assert_eq!(
            WavelengthGrid::for_wavelengths(&wide),
            WavelengthGrid { start: 380, end: 780, step: 5 }
        );

        let irregular = [383.3, 399.5, 452.0, 500.3, 640.0, 700.2];
        let grid = WavelengthGrid::for_wavelengths(&irregular);
        assert_eq!(grid.step, 10);
        assert_eq!((grid.start, grid.end), (380, 710));
    }

    #[test]
    fn grid_step_is_clamped() {
        let coarse = [380.0, 400.0, 420.0, 440.0, 700.0];
        assert_eq!(WavelengthGrid::for_wavelengths(&coarse).step, 10);
        let fine: Vec<f64> = (0..1000).map(|i| 390.0 + 0.4 * f64::from(i)).collect();
        let grid = WavelengthGrid::for_wavelengths(&fine);
        assert_eq!(grid.step, 1);
        assert_eq!((grid.start, grid.end), (390, 780));
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let ctx = make_context("D65", 2).unwrap();
        let integrator = SpectrumIntegrator::new(&ctx);

        let nan_wavelength = Spectrum::new(vec![400.0, f64::NAN], vec![1.0, 1.0]).unwrap();
        assert_eq!(integrator.integrate(&nan_wavelength), Err(ColourError::NonFinite));

        let infinite_value = Spectrum::new(vec![400.0, 700.0], vec![1.0, f64::INFINITY]).unwrap();
        assert_eq!(integrator.integrate(&infinite_value), Err(ColourError::NonFinite));
    }

    #[test]
    fn perfect_reflector_has_y_100() {
        let ctx = make_context("D65", 2).unwrap();
        let xyz = integrate_spectrum(
            &flat(400, 700, 10, 1.0),
            &ctx,
            WavelengthUnit::Nanometre,
            SpectrumScale::Fraction,
        )
        .unwrap();
        assert_relative_eq!(xyz.y, 100.0, max_relative = 1e-12);

        let full = SpectrumIntegrator::new(&ctx).integrate(&flat(380, 780, 5, 100.0)).unwrap();
        let white = ctx.white_point();
        assert_relative_eq!(full, white, max_relative = 5e-3);
    }

    #[test]
    fn wavelength_bounds_are_checked() {
        let ctx = make_context("D65", 2).unwrap();
        let integrator = SpectrumIntegrator::new(&ctx);
        assert_eq!(
            integrator.integrate(&flat(401, 720, 1, 50.0)).unwrap_err(),
            ColourError::MinWavelength(401.0)
        );
        assert!(integrator.integrate(&flat(400, 720, 1, 50.0)).is_ok());
        assert_eq!(
            integrator.integrate(&flat(380, 699, 1, 50.0)).unwrap_err(),
            ColourError::MaxWavelength(699.0)
        );
    }

    #[test]
    fn units_scales_and_order_do_not_change_the_result() {
        let ctx = make_context("C", 10).unwrap();
        let nm: Vec<f64> = (38..=78).map(|i| f64::from(i) * 10.0).collect();
        let percent: Vec<f64> = nm.iter().map(|&w| smooth(w)).collect();
        let reference = SpectrumIntegrator::new(&ctx)
            .integrate(&Spectrum::new(nm.clone(), percent.clone()).unwrap())
            .unwrap();

        let um: Vec<f64> = nm.iter().map(|w| w / 1000.0).collect();
        let fraction: Vec<f64> = percent.iter().map(|v| v / 100.0).collect();
        let converted = SpectrumIntegrator::new(&ctx)
            .with_unit(WavelengthUnit::Micrometre)
            .with_scale(SpectrumScale::Fraction)
            .integrate(&Spectrum::new(um, fraction).unwrap())
            .unwrap();
        assert_relative_eq!(converted, reference, max_relative = 1e-9);

        let mut reversed_nm = nm.clone();
        let mut reversed_values = percent.clone();
        reversed_nm.reverse();
        reversed_values.reverse();
        let reversed = SpectrumIntegrator::new(&ctx)
            .integrate(&Spectrum::new(reversed_nm, reversed_values).unwrap())
            .unwrap();
        assert_relative_eq!(reversed, reference, max_relative = 1e-12);
    }

    #[test]
    fn resampled_spectrum_agrees_with_dense_sampling() {
        let ctx = make_context("D65", 10).unwrap();
        let dense: Vec<f64> = (380..=780).map(f64::from).collect();
        let dense_xyz = SpectrumIntegrator::new(&ctx)
            .integrate(&Spectrum::new(dense.clone(), dense.iter().map(|&w| smooth(w)).collect()).unwrap())
            .unwrap();

        let sparse: Vec<f64> = (0..=57).map(|i| 381.5 + 7.0 * f64::from(i)).collect();
        let sparse_xyz = SpectrumIntegrator::new(&ctx)
            .integrate(&Spectrum::new(sparse.clone(), sparse.iter().map(|&w| smooth(w)).collect()).unwrap())
            .unwrap();
        assert_relative_eq!(sparse_xyz, dense_xyz, max_relative = 2e-2);
    }

    #[test]
    fn three_samples_fall_back_to_natural() {
        let ctx = make_context("A", 2).unwrap();
        let spectrum = Spectrum::from_pairs(&[(380.0, 20.0), (550.0, 60.0), (780.0, 40.0)]).unwrap();
        let xyz = SpectrumIntegrator::new(&ctx).integrate(&spectrum).unwrap();
        assert!(xyz.iter().all(|c| c.is_finite() && *c > 0.0));
    }

    #[test]
    fn table_integration_matches_single_spectra() {
        let ctx = make_context("D50", 2).unwrap();
        let nm: Vec<f64> = (0..=42).map(|i| 375.0 + 10.0 * f64::from(i)).collect();
        let mut table = SpectralTable::new(nm.clone());
        table.push("smooth", nm.iter().map(|&w| smooth(w)).collect()).unwrap();
        table.push("grey", vec![18.0; nm.len()]).unwrap();

        let integrator = SpectrumIntegrator::new(&ctx);
        let batch = integrator.integrate_table(&table).unwrap();
        assert_eq!(batch.ncols(), 2);
        for i in 0..2 {
            let single = integrator.integrate(&table.spectrum(i).unwrap().unwrap()).unwrap();
            assert_relative_eq!(batch.column(i).into_owned(), single, max_relative = 1e-12);
        }
    }
}
