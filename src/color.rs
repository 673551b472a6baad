use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix3xX, Vector3};
use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{ColourError, Result};

// ---------------------------------------------------------------------------
// ColourSpace – tag carried by every colour value
// ---------------------------------------------------------------------------

/// Colour spaces the context converts between.
///
/// Component order: XYZ `(X, Y, Z)`, Lab `(L*, a*, b*)`, Luv `(L*, u*, v*)`,
/// Yxy `(Y, x, y)`, Yuv `(Y, u', v')`, Hunter Lab `(L, a, b)`, sRGB `(R, G, B)`
/// in 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColourSpace {
    Xyz,
    Lab,
    Luv,
    Yxy,
    Yuv,
    HunterLab,
    Srgb,
}

impl ColourSpace {
    pub const ALL: [ColourSpace; 7] = [
        ColourSpace::Xyz,
        ColourSpace::Lab,
        ColourSpace::Luv,
        ColourSpace::Yxy,
        ColourSpace::Yuv,
        ColourSpace::HunterLab,
        ColourSpace::Srgb,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColourSpace::Xyz => "xyz",
            ColourSpace::Lab => "lab",
            ColourSpace::Luv => "luv",
            ColourSpace::Yxy => "yxy",
            ColourSpace::Yuv => "yuv",
            ColourSpace::HunterLab => "hunterlab",
            ColourSpace::Srgb => "srgb",
        }
    }
}

impl FromStr for ColourSpace {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' ' | '\''))
            .collect::<String>()
            .to_ascii_lowercase();
        ColourSpace::ALL
            .into_iter()
            .find(|space| space.name() == key)
            .ok_or_else(|| ColourError::UnknownSpace(s.to_string()))
    }
}

impl TryFrom<String> for ColourSpace {
    type Error = ColourError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ColourSpace> for String {
    fn from(value: ColourSpace) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for ColourSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Triples – one 3-vector or a 3×N batch, converted with the same formulas
// ---------------------------------------------------------------------------

/// Shapes the conversions accept: a single triple or a batch of columns.
pub trait Triples: Clone {
    /// Apply `f` to every triple, keeping the shape.
    fn map_triples<F: FnMut(Vector3<f64>) -> Vector3<f64>>(&self, f: F) -> Self;

    fn triple_count(&self) -> usize;
}

impl Triples for Vector3<f64> {
    fn map_triples<F: FnMut(Vector3<f64>) -> Vector3<f64>>(&self, mut f: F) -> Self {
        f(*self)
    }

    fn triple_count(&self) -> usize {
        1
    }
}

impl Triples for Matrix3xX<f64> {
    fn map_triples<F: FnMut(Vector3<f64>) -> Vector3<f64>>(&self, mut f: F) -> Self {
        let mut out = self.clone();
        for mut column in out.column_iter_mut() {
            let mapped = f(Vector3::new(column[0], column[1], column[2]));
            column.copy_from(&mapped);
        }
        out
    }

    fn triple_count(&self) -> usize {
        self.ncols()
    }
}

/// A value (or batch) tagged with the space it is expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Colour<T = Vector3<f64>> {
    pub space: ColourSpace,
    pub values: T,
}

impl<T: Triples> Colour<T> {
    pub fn new(space: ColourSpace, values: T) -> Self {
        Colour { space, values }
    }
}

/// Build a 3×N batch from three equally long rows.
pub fn batch_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Matrix3xX<f64>> {
    if rows.len() != 3 {
        return Err(ColourError::BatchRows(rows.len()));
    }
    let expected = rows[0].as_ref().len();
    for (row, values) in rows.iter().enumerate() {
        let len = values.as_ref().len();
        if len != expected {
            return Err(ColourError::RaggedBatch { row, len, expected });
        }
    }
    Ok(Matrix3xX::from_fn(expected, |r, c| rows[r].as_ref()[c]))
}

/// Build a 3×N batch from N triples.
pub fn batch_from_columns(columns: &[[f64; 3]]) -> Matrix3xX<f64> {
    Matrix3xX::from_fn(columns.len(), |r, c| columns[c][r])
}

// ---------------------------------------------------------------------------
// Hex codec
// ---------------------------------------------------------------------------

/// Encode an RGB triple whose channels run to `upper` as `#rrggbb`.
///
/// Channels are rounded and clipped to 0..=255; NaN encodes as 0.
pub fn rgb_to_hex(rgb: &Vector3<f64>, upper: f64) -> String {
    let channel = |v: f64| (v / upper * 255.0).round().clamp(0.0, 255.0) as u8;
    let encoded: Srgb<u8> = Srgb::new(channel(rgb.x), channel(rgb.y), channel(rgb.z));
    format!("#{encoded:x}")
}

pub fn rgb_to_hex_batch(rgb: &Matrix3xX<f64>, upper: f64) -> Vec<String> {
    rgb.column_iter()
        .map(|c| rgb_to_hex(&Vector3::new(c[0], c[1], c[2]), upper))
        .collect()
}

/// Decode `#rrggbb` to channels in 0..=1.
pub fn hex_to_rgb(hex: &str) -> Result<Vector3<f64>> {
    hex_to_rgb_scaled(hex, 1.0)
}

/// Decode `#rrggbb` to channels in 0..=`upper`.
pub fn hex_to_rgb_scaled(hex: &str, upper: f64) -> Result<Vector3<f64>> {
    let digits = hex.strip_prefix('#').unwrap_or("");
    if hex.len() != 7 || digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColourError::HexFormat(hex.to_string()));
    }
    let decoded: Srgb<u8> = hex
        .parse()
        .map_err(|_| ColourError::HexFormat(hex.to_string()))?;
    let scale = |c: u8| f64::from(c) / 255.0 * upper;
    Ok(Vector3::new(
        scale(decoded.red),
        scale(decoded.green),
        scale(decoded.blue),
    ))
}
