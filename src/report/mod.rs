/// Colour report: every derived quantity of a spectrum, in canonical order.
///
/// Architecture:
/// ```text
///   SpectralTable ──► SpectrumIntegrator ──► XYZ (3×N)
///                                             │ batch conversions
///                                             ▼
///                                   ┌───────────────────┐
///                                   │ ColourReport × N   │ 27 fields each
///                                   └───────────────────┘
///                                             │ FieldSelection
///                                             ▼
///                                   ┌───────────────────┐
///                                   │ ColourTable        │ fields × spectra
///                                   └───────────────────┘
///                                             │
///                                             ▼
///                                       export (CSV / JSON)
/// ```
pub mod convert;
pub mod export;
pub mod select;

use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix3xX, Vector3};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::color::{rgb_to_hex, Triples};
use crate::context::{chs, ColorimetricContext};
use crate::data::model::{SpectralTable, Spectrum, SpectrumScale};
use crate::error::{ColourError, Result};
use crate::integrate::SpectrumIntegrator;

pub use select::FieldSelection;

// ---------------------------------------------------------------------------
// ReportField
// ---------------------------------------------------------------------------

/// One row of the report. Declaration order is the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportField {
    X,
    Y,
    Z,
    ChromaticityX,
    ChromaticityY,
    ChromaticityZ,
    LabL,
    LabA,
    LabB,
    LabChroma,
    LabHue,
    HunterL,
    HunterA,
    HunterB,
    HunterChroma,
    HunterHue,
    Srgb,
    UPrime,
    VPrime,
    WPrime,
    LuvL,
    LuvU,
    LuvV,
    LuvChroma,
    LuvHue,
    LuvSaturation,
    YellownessIndex,
}

impl ReportField {
    pub const ALL: [ReportField; 27] = [
        ReportField::X,
        ReportField::Y,
        ReportField::Z,
        ReportField::ChromaticityX,
        ReportField::ChromaticityY,
        ReportField::ChromaticityZ,
        ReportField::LabL,
        ReportField::LabA,
        ReportField::LabB,
        ReportField::LabChroma,
        ReportField::LabHue,
        ReportField::HunterL,
        ReportField::HunterA,
        ReportField::HunterB,
        ReportField::HunterChroma,
        ReportField::HunterHue,
        ReportField::Srgb,
        ReportField::UPrime,
        ReportField::VPrime,
        ReportField::WPrime,
        ReportField::LuvL,
        ReportField::LuvU,
        ReportField::LuvV,
        ReportField::LuvChroma,
        ReportField::LuvHue,
        ReportField::LuvSaturation,
        ReportField::YellownessIndex,
    ];

    /// Unique key used for selection.
    pub fn title(self) -> &'static str {
        use ReportField::*;
        match self {
            X => "X",
            Y => "Y",
            Z => "Z",
            ChromaticityX => "x",
            ChromaticityY => "y",
            ChromaticityZ => "z",
            LabL => "CIELAB-L*",
            LabA => "CIELAB-a*",
            LabB => "CIELAB-b*",
            LabChroma => "CIELAB-C*_ab",
            LabHue => "CIELAB-h_ab",
            HunterL => "Hunter L",
            HunterA => "Hunter a",
            HunterB => "Hunter b",
            HunterChroma => "Hunter C_ab",
            HunterHue => "Hunter h_ab",
            Srgb => "sRGB",
            UPrime => "u'",
            VPrime => "v'",
            WPrime => "w'",
            LuvL => "CIELUV-L*",
            LuvU => "CIELUV-u*",
            LuvV => "CIELUV-v*",
            LuvChroma => "CIELUV-C*_uv",
            LuvHue => "CIELUV-h_uv",
            LuvSaturation => "CIELUV-s_uv",
            YellownessIndex => "YI",
        }
    }

    /// Short row label; not unique across spaces.
    pub fn label(self) -> &'static str {
        use ReportField::*;
        match self {
            LabL | LuvL => "L*",
            LabA => "a*",
            LabB => "b*",
            LabChroma => "C*_ab",
            HunterL => "L",
            HunterA => "a",
            HunterB => "b",
            HunterChroma => "C_ab",
            LabHue | HunterHue => "h_ab",
            LuvU => "u*",
            LuvV => "v*",
            LuvChroma => "C*_uv",
            LuvHue => "h_uv",
            LuvSaturation => "s_uv",
            other => other.title(),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for ReportField {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        ReportField::ALL
            .into_iter()
            .find(|f| f.title() == wanted)
            .ok_or_else(|| ColourError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl Serialize for ReportField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// A report cell: a number, or the sRGB hex code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Hex(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Hex(_) => None,
        }
    }

    /// Numbers with `precision` decimals; hex codes unchanged.
    pub fn format(&self, precision: usize) -> String {
        match self {
            FieldValue::Number(v) => format!("{v:.precision$}"),
            FieldValue::Hex(code) => code.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(f.precision().unwrap_or(3)))
    }
}

// ---------------------------------------------------------------------------
// ColourReport
// ---------------------------------------------------------------------------

/// Every quantity derived from one XYZ, before conversion to cells.
struct Derived<T> {
    xyz: T,
    lab: T,
    lab_chs: T,
    hunter: T,
    hunter_chs: T,
    srgb: T,
    yuv: T,
    luv: T,
    luv_chs: T,
}

impl<T: Triples> Derived<T> {
    fn compute(context: &ColorimetricContext, xyz: &T) -> Self {
        let lab = context.xyz_to_lab(xyz);
        let hunter = context.xyz_to_hunter_lab(xyz);
        let luv = context.xyz_to_luv(xyz);
        Derived {
            xyz: xyz.clone(),
            lab_chs: chs(&lab),
            hunter_chs: chs(&hunter),
            luv_chs: chs(&luv),
            srgb: context.xyz_to_srgb(xyz),
            yuv: context.xyz_to_yuv(xyz),
            lab,
            hunter,
            luv,
        }
    }
}

impl Derived<Matrix3xX<f64>> {
    fn column(&self, i: usize) -> Derived<Vector3<f64>> {
        let pick = |m: &Matrix3xX<f64>| m.column(i).into_owned();
        Derived {
            xyz: pick(&self.xyz),
            lab: pick(&self.lab),
            lab_chs: pick(&self.lab_chs),
            hunter: pick(&self.hunter),
            hunter_chs: pick(&self.hunter_chs),
            srgb: pick(&self.srgb),
            yuv: pick(&self.yuv),
            luv: pick(&self.luv),
            luv_chs: pick(&self.luv_chs),
        }
    }
}

/// All report fields of one colour.
#[derive(Debug, Clone, PartialEq)]
pub struct ColourReport {
    xyz: Vector3<f64>,
    values: Vec<FieldValue>,
}

impl ColourReport {
    fn from_derived(d: Derived<Vector3<f64>>) -> Self {
        use FieldValue::Number as N;
        let xyz = d.xyz;
        let sum = xyz.sum();
        let yellowness = 100.0 * (1.28 * xyz.x - 1.06 * xyz.z) / xyz.y;

        let values = vec![
            N(xyz.x),
            N(xyz.y),
            N(xyz.z),
            N(xyz.x / sum),
            N(xyz.y / sum),
            N(xyz.z / sum),
            N(d.lab.x),
            N(d.lab.y),
            N(d.lab.z),
            N(d.lab_chs.x),
            N(d.lab_chs.y),
            N(d.hunter.x),
            N(d.hunter.y),
            N(d.hunter.z),
            N(d.hunter_chs.x),
            N(d.hunter_chs.y),
            FieldValue::Hex(rgb_to_hex(&d.srgb, 1.0)),
            N(d.yuv.y),
            N(d.yuv.z),
            N(1.0 - d.yuv.y - d.yuv.z),
            N(d.luv.x),
            N(d.luv.y),
            N(d.luv.z),
            N(d.luv_chs.x),
            N(d.luv_chs.y),
            N(d.luv_chs.z),
            N(yellowness),
        ];
        ColourReport { xyz, values }
    }

    pub fn from_xyz(context: &ColorimetricContext, xyz: &Vector3<f64>) -> Self {
        Self::from_derived(Derived::compute(context, xyz))
    }

    /// One report per column of a 3×N XYZ batch.
    pub fn from_xyz_batch(context: &ColorimetricContext, xyz: &Matrix3xX<f64>) -> Vec<Self> {
        let derived = Derived::compute(context, xyz);
        (0..xyz.ncols())
            .map(|i| Self::from_derived(derived.column(i)))
            .collect()
    }

    pub fn xyz(&self) -> Vector3<f64> {
        self.xyz
    }

    pub fn get(&self, field: ReportField) -> &FieldValue {
        &self.values[field.index()]
    }

    /// Every field in canonical order.
    pub fn entries(&self) -> impl Iterator<Item = (ReportField, &FieldValue)> {
        ReportField::ALL.into_iter().zip(&self.values)
    }

    /// Enabled fields in canonical order.
    pub fn selected<'a>(
        &'a self,
        selection: &'a FieldSelection,
    ) -> impl Iterator<Item = (ReportField, &'a FieldValue)> + 'a {
        self.entries().filter(|(f, _)| selection.is_enabled(*f))
    }
}

impl Serialize for ColourReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.entries() {
            map.serialize_entry(field.title(), value)?;
        }
        map.end()
    }
}

/// Report for a single spectrum given in nanometres.
pub fn colour_report(
    spectrum: &Spectrum,
    context: &ColorimetricContext,
    scale: SpectrumScale,
) -> Result<ColourReport> {
    let xyz = SpectrumIntegrator::new(context)
        .with_scale(scale)
        .integrate(spectrum)?;
    Ok(ColourReport::from_xyz(context, &xyz))
}

// ---------------------------------------------------------------------------
// ColourTable – result matrix (fields × spectra)
// ---------------------------------------------------------------------------

/// Selected fields of several spectra, with per-spectrum names.
#[derive(Debug, Clone, PartialEq)]
pub struct ColourTable {
    pub names: Vec<String>,
    pub fields: Vec<ReportField>,
    reports: Vec<ColourReport>,
}

impl ColourTable {
    pub fn new(names: Vec<String>, reports: Vec<ColourReport>, selection: &FieldSelection) -> Self {
        ColourTable {
            names,
            fields: selection.fields(),
            reports,
        }
    }

    pub fn reports(&self) -> &[ColourReport] {
        &self.reports
    }

    /// Each selected field with its value for every spectrum.
    pub fn rows(&self) -> impl Iterator<Item = (ReportField, Vec<&FieldValue>)> + '_ {
        self.fields
            .iter()
            .map(|&field| (field, self.reports.iter().map(|r| r.get(field)).collect()))
    }
}

/// Integrate every column of `table` and keep the selected fields.
pub fn colour_table(
    table: &SpectralTable,
    integrator: &SpectrumIntegrator<'_>,
    selection: &FieldSelection,
) -> Result<ColourTable> {
    let xyz = integrator.integrate_table(table)?;
    log::debug!("computed {} colour reports", xyz.ncols());
    let reports = ColourReport::from_xyz_batch(integrator.context(), &xyz);
    Ok(ColourTable::new(table.names.clone(), reports, selection))
}

struct SelectedFields<'a> {
    fields: &'a [ReportField],
    report: &'a ColourReport,
}

impl Serialize for SelectedFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for &field in self.fields {
            map.serialize_entry(field.title(), self.report.get(field))?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct NamedReport<'a> {
    name: &'a str,
    values: SelectedFields<'a>,
}

impl Serialize for ColourTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.reports.len()))?;
        for (name, report) in self.names.iter().zip(&self.reports) {
            seq.serialize_element(&NamedReport {
                name,
                values: SelectedFields {
                    fields: &self.fields,
                    report,
                },
            })?;
        }
        seq.end()
    }
}
