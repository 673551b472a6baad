use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value as JsonValue};

use super::model::{SpectralTable, SpectrumScale, WavelengthUnit};

/// Spectra read from disk plus the unit/scale the file declares, if any.
#[derive(Debug, Clone)]
pub struct LoadedSpectra {
    pub table: SpectralTable,
    pub unit: Option<WavelengthUnit>,
    pub scale: Option<SpectrumScale>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load spectra from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.json` – see [`parse_json`]
pub fn load_file(path: &Path) -> Result<LoadedSpectra> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let loaded = parse_json(&text).with_context(|| format!("parsing {}", path.display()))?;
            log::debug!("loaded {} spectra from {}", loaded.table.len(), path.display());
            Ok(loaded)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// {
///   "unit": "nm",
///   "scale": 100,
///   "wavelength": [380.0, 390.0, ...],
///   "samples": [
///     { "name": "tile A", "values": [12.1, 13.4, ...] },
///     ...
///   ]
/// }
/// ```
///
/// A single spectrum may also be written as `{ "wavelength": [...], "values": [...] }`.
/// `unit` and `scale` are optional.
pub fn parse_json(text: &str) -> Result<LoadedSpectra> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let obj = root.as_object().context("Expected top-level JSON object")?;

    let wavelengths = json_array_to_f64(obj.get("wavelength"), "wavelength")?;
    let mut table = SpectralTable::new(wavelengths);

    match (obj.get("samples"), obj.get("values")) {
        (Some(samples), _) => {
            let samples = samples.as_array().context("'samples' must be an array")?;
            for (i, sample) in samples.iter().enumerate() {
                let sample = sample
                    .as_object()
                    .with_context(|| format!("Sample {i} is not a JSON object"))?;
                let name = sample_name(sample, i);
                let values = json_array_to_f64(sample.get("values"), &format!("samples[{i}].values"))?;
                table
                    .push(name, values)
                    .with_context(|| format!("Sample {i}"))?;
            }
        }
        (None, Some(values)) => {
            let values = json_array_to_f64(Some(values), "values")?;
            table.push("Sample 1", values)?;
        }
        (None, None) => bail!("Expected a 'samples' array or a 'values' array"),
    }

    let unit = match obj.get("unit") {
        Some(JsonValue::String(s)) => Some(s.parse::<WavelengthUnit>()?),
        Some(other) => bail!("'unit' must be a string, got {other}"),
        None => None,
    };
    let scale = match obj.get("scale") {
        Some(v) => {
            let upper = v.as_f64().with_context(|| format!("'scale' must be a number, got {v}"))?;
            Some(SpectrumScale::try_from(upper)?)
        }
        None => None,
    };

    Ok(LoadedSpectra { table, unit, scale })
}

fn sample_name(sample: &Map<String, JsonValue>, index: usize) -> String {
    match sample.get("name") {
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => format!("Sample {}", index + 1),
    }
}

fn json_array_to_f64(val: Option<&JsonValue>, what: &str) -> Result<Vec<f64>> {
    let arr = val
        .and_then(|v| v.as_array())
        .with_context(|| format!("missing or invalid '{what}' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .with_context(|| format!("{what}[{j}]: not a number"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_samples() {
        let text = r#"{
            "unit": "um",
            "scale": 1,
            "wavelength": [0.38, 0.55, 0.78],
            "samples": [
                { "name": "paper", "values": [0.8, 0.9, 0.85] },
                { "values": [0.1, 0.2, 0.3] }
            ]
        }"#;
        let loaded = parse_json(text).unwrap();
        assert_eq!(loaded.unit, Some(WavelengthUnit::Micrometre));
        assert_eq!(loaded.scale, Some(SpectrumScale::Fraction));
        assert_eq!(loaded.table.names, vec!["paper", "Sample 2"]);
        assert_eq!(loaded.table.columns[1], vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn parses_single_spectrum_shorthand() {
        let loaded = parse_json(r#"{ "wavelength": [400, 700], "values": [50, 60] }"#).unwrap();
        assert_eq!(loaded.table.len(), 1);
        assert_eq!(loaded.unit, None);
        assert_eq!(loaded.scale, None);
    }

    #[test]
    fn reports_malformed_documents() {
        let err = parse_json(r#"{ "wavelength": [400, 700], "values": [50, "x"] }"#).unwrap_err();
        assert!(err.to_string().contains("values[1]"));

        let err = parse_json(r#"{ "wavelength": [400, 700], "samples": [{ "values": [1] }] }"#).unwrap_err();
        assert!(format!("{err:#}").contains("Sample 0"));

        let err = parse_json(r#"{ "wavelength": [400, 700], "values": [1, 2], "scale": 255 }"#).unwrap_err();
        assert!(err.to_string().contains("255"));

        assert!(parse_json("[1, 2]").is_err());
        assert!(parse_json(r#"{ "wavelength": [400, 700] }"#).is_err());
    }

    #[test]
    fn rejects_unknown_extensions() {
        let err = load_file(Path::new("spectra.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
