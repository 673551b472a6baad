use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::context::ColorimetricContext;
use crate::data::model::{SpectrumScale, WavelengthUnit};
use crate::integrate::SpectrumIntegrator;
use crate::report::FieldSelection;
use crate::tables::{Illuminant, Observer};

// ---------------------------------------------------------------------------
// ReportOptions – everything a report run is parameterized by
// ---------------------------------------------------------------------------

/// Report parameters. Missing keys in a JSON options file take the defaults:
/// D65, 2°, nm, percent, all fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub illuminant: Illuminant,
    pub angle: Observer,
    pub unit: WavelengthUnit,
    pub scale: SpectrumScale,
    pub fields: FieldSelection,
}

impl ReportOptions {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading options {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing options {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid report options")
    }

    pub fn context(&self) -> ColorimetricContext {
        ColorimetricContext::new(self.illuminant, self.angle)
    }

    pub fn integrator<'a>(&self, context: &'a ColorimetricContext) -> SpectrumIntegrator<'a> {
        SpectrumIntegrator::new(context)
            .with_unit(self.unit)
            .with_scale(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportField;

    #[test]
    fn defaults_fill_missing_keys() {
        let options = ReportOptions::from_json(r#"{ "illuminant": "c", "fields": ["YI"] }"#).unwrap();
        assert_eq!(options.illuminant, Illuminant::C);
        assert_eq!(options.angle, Observer::Deg2);
        assert_eq!(options.unit, WavelengthUnit::Nanometre);
        assert_eq!(options.scale, SpectrumScale::Percent);
        assert_eq!(options.fields.fields(), vec![ReportField::YellownessIndex]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ReportOptions::from_json(r#"{ "angle": 4 }"#).is_err());
        assert!(ReportOptions::from_json(r#"{ "unit": "mm" }"#).is_err());
        assert!(ReportOptions::from_json(r#"{ "fields": ["nope"] }"#).is_err());
    }

    #[test]
    fn options_round_trip() {
        let options = ReportOptions {
            illuminant: Illuminant::D75,
            angle: Observer::Deg10,
            unit: WavelengthUnit::Micrometre,
            scale: SpectrumScale::Fraction,
            fields: FieldSelection::from_titles(["X", "Y"]).unwrap(),
        };
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(ReportOptions::from_json(&json).unwrap(), options);
        assert_eq!(options.context().observer(), Observer::Deg10);
    }
}
