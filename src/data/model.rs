use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ColourError, Result};

// ---------------------------------------------------------------------------
// WavelengthUnit / SpectrumScale – declared by the caller, never guessed
// ---------------------------------------------------------------------------

/// Unit of the wavelength axis. Everything is nanometres internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WavelengthUnit {
    #[default]
    Nanometre,
    Micrometre,
}

impl WavelengthUnit {
    pub fn to_nanometres(self, value: f64) -> f64 {
        match self {
            WavelengthUnit::Nanometre => value,
            WavelengthUnit::Micrometre => value * 1000.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            WavelengthUnit::Nanometre => "nm",
            WavelengthUnit::Micrometre => "um",
        }
    }
}

impl FromStr for WavelengthUnit {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nm" | "nanometre" | "nanometer" => Ok(WavelengthUnit::Nanometre),
            "um" | "μm" | "µm" | "micrometre" | "micrometer" => Ok(WavelengthUnit::Micrometre),
            _ => Err(ColourError::UnknownUnit(s.to_string())),
        }
    }
}

impl TryFrom<String> for WavelengthUnit {
    type Error = ColourError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<WavelengthUnit> for String {
    fn from(value: WavelengthUnit) -> Self {
        value.symbol().to_string()
    }
}

impl fmt::Display for WavelengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Declared range of spectrum values: fractions (0..1) or percent (0..100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum SpectrumScale {
    Fraction,
    #[default]
    Percent,
}

impl SpectrumScale {
    /// Value of a perfect reflector on this scale.
    pub fn upper(self) -> f64 {
        match self {
            SpectrumScale::Fraction => 1.0,
            SpectrumScale::Percent => 100.0,
        }
    }
}

impl TryFrom<f64> for SpectrumScale {
    type Error = ColourError;

    fn try_from(upper: f64) -> Result<Self> {
        if upper == 1.0 {
            Ok(SpectrumScale::Fraction)
        } else if upper == 100.0 {
            Ok(SpectrumScale::Percent)
        } else {
            Err(ColourError::UnknownScale(upper.to_string()))
        }
    }
}

impl From<SpectrumScale> for f64 {
    fn from(value: SpectrumScale) -> Self {
        value.upper()
    }
}

impl FromStr for SpectrumScale {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<f64>()
            .map_err(|_| ColourError::UnknownScale(s.to_string()))
            .and_then(SpectrumScale::try_from)
    }
}

impl fmt::Display for SpectrumScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.upper())
    }
}

// ---------------------------------------------------------------------------
// Spectrum – one measured curve
// ---------------------------------------------------------------------------

/// Wavelength/value samples of one measurement, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub wavelengths: Vec<f64>,
    pub values: Vec<f64>,
}

impl Spectrum {
    /// At least two samples, one value per wavelength.
    pub fn new(wavelengths: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if wavelengths.len() != values.len() {
            return Err(ColourError::LengthMismatch {
                x: wavelengths.len(),
                y: values.len(),
            });
        }
        if wavelengths.len() < 2 {
            return Err(ColourError::TooFewPoints {
                required: 2,
                got: wavelengths.len(),
            });
        }
        Ok(Spectrum {
            wavelengths,
            values,
        })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        let (wavelengths, values) = pairs.iter().copied().unzip();
        Self::new(wavelengths, values)
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SpectralTable – many curves over one wavelength column
// ---------------------------------------------------------------------------

/// Named value columns sharing one wavelength axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralTable {
    pub wavelengths: Vec<f64>,
    pub columns: Vec<Vec<f64>>,
    pub names: Vec<String>,
}

impl SpectralTable {
    pub fn new(wavelengths: Vec<f64>) -> Self {
        SpectralTable {
            wavelengths,
            columns: Vec::new(),
            names: Vec::new(),
        }
    }

    /// Append a named column; it must match the wavelength axis.
    pub fn push(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.wavelengths.len() {
            return Err(ColourError::LengthMismatch {
                x: self.wavelengths.len(),
                y: values.len(),
            });
        }
        self.columns.push(values);
        self.names.push(name.into());
        Ok(())
    }

    /// Number of spectra (columns).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column `index` as a standalone spectrum.
    pub fn spectrum(&self, index: usize) -> Option<Result<Spectrum>> {
        self.columns
            .get(index)
            .map(|values| Spectrum::new(self.wavelengths.clone(), values.clone()))
    }
}

impl From<Spectrum> for SpectralTable {
    fn from(spectrum: Spectrum) -> Self {
        SpectralTable {
            wavelengths: spectrum.wavelengths,
            columns: vec![spectrum.values],
            names: vec!["Sample 1".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_and_scales_parse() {
        assert_eq!("NM".parse::<WavelengthUnit>().unwrap(), WavelengthUnit::Nanometre);
        assert_eq!("μm".parse::<WavelengthUnit>().unwrap(), WavelengthUnit::Micrometre);
        assert_eq!(WavelengthUnit::Micrometre.to_nanometres(0.55), 550.0);
        assert_eq!(
            "cm".parse::<WavelengthUnit>().unwrap_err(),
            ColourError::UnknownUnit("cm".into())
        );
        assert_eq!("1".parse::<SpectrumScale>().unwrap(), SpectrumScale::Fraction);
        assert_eq!(SpectrumScale::try_from(100.0).unwrap(), SpectrumScale::Percent);
        assert_eq!(
            SpectrumScale::try_from(255.0).unwrap_err(),
            ColourError::UnknownScale("255".into())
        );
    }

    #[test]
    fn spectrum_needs_two_matching_samples() {
        assert!(Spectrum::from_pairs(&[(400.0, 1.0), (700.0, 1.0)]).is_ok());
        assert_eq!(
            Spectrum::from_pairs(&[(400.0, 1.0)]).unwrap_err(),
            ColourError::TooFewPoints { required: 2, got: 1 }
        );
        assert_eq!(
            Spectrum::new(vec![400.0, 500.0], vec![1.0]).unwrap_err(),
            ColourError::LengthMismatch { x: 2, y: 1 }
        );
    }

    #[test]
    fn table_columns_follow_the_axis() {
        let mut table = SpectralTable::new(vec![400.0, 550.0, 700.0]);
        table.push("white", vec![100.0, 100.0, 100.0]).unwrap();
        assert!(table.push("short", vec![1.0]).is_err());
        assert_eq!(table.len(), 1);
        assert_eq!(table.names, vec!["white"]);
        let single = table.spectrum(0).unwrap().unwrap();
        assert_eq!(single.values, vec![100.0; 3]);
        assert!(table.spectrum(1).is_none());
    }
}
