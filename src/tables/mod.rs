/// Reference data: illuminants, observers, white points and RGB primaries.
///
/// Layout:
/// ```text
///   observer.rs     CIE 1931 2° / CIE 1964 10° at 5 nm
///   illuminant.rs   C, daylight S0/S1/S2 at 10 nm, Planck formula for A
///        │
///        ▼  expanded once to 1 nm (380..=780), first use
///   ┌─────────────────┐
///   │ ReferenceTables │  + white points, Hunter Ka/Kb, sRGB matrices
///   └─────────────────┘
///        │  &'static
///        ▼
///   ColorimetricContext / SpectrumIntegrator
/// ```
pub mod illuminant;
pub mod observer;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::ColourError;

/// First wavelength of every table (nm).
pub const WAVELENGTH_START: u32 = 380;
/// Last wavelength of every table (nm).
pub const WAVELENGTH_END: u32 = 780;
/// Samples per table at 1 nm.
pub const TABLE_LEN: usize = (WAVELENGTH_END - WAVELENGTH_START) as usize + 1;

// ---------------------------------------------------------------------------
// Illuminant
// ---------------------------------------------------------------------------

/// Supported CIE standard illuminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Illuminant {
    A,
    #[default]
    D65,
    C,
    D50,
    D55,
    D75,
}

impl Illuminant {
    pub const ALL: [Illuminant; 6] = [
        Illuminant::A,
        Illuminant::D65,
        Illuminant::C,
        Illuminant::D50,
        Illuminant::D55,
        Illuminant::D75,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Illuminant::A => "A",
            Illuminant::D65 => "D65",
            Illuminant::C => "C",
            Illuminant::D50 => "D50",
            Illuminant::D55 => "D55",
            Illuminant::D75 => "D75",
        }
    }

    /// Relative spectral power on the 1 nm grid.
    fn spectrum(self) -> Vec<f64> {
        match self {
            Illuminant::A => (0..TABLE_LEN)
                .map(|i| illuminant::illuminant_a(f64::from(WAVELENGTH_START) + i as f64))
                .collect(),
            Illuminant::C => expand(&illuminant::ILLUMINANT_C, 10),
            Illuminant::D50 => expand(&illuminant::daylight(5000.0), 10),
            Illuminant::D55 => expand(&illuminant::daylight(5500.0), 10),
            Illuminant::D65 => expand(&illuminant::daylight(6500.0), 10),
            Illuminant::D75 => expand(&illuminant::daylight(7500.0), 10),
        }
    }
}

impl FromStr for Illuminant {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Illuminant::ALL
            .into_iter()
            .find(|ill| ill.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ColourError::UnknownIlluminant(s.to_string()))
    }
}

impl TryFrom<String> for Illuminant {
    type Error = ColourError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Illuminant> for String {
    fn from(value: Illuminant) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for Illuminant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Observer (viewing angle)
// ---------------------------------------------------------------------------

/// Standard observer, identified by its viewing angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Observer {
    #[default]
    Deg2,
    Deg10,
}

impl Observer {
    pub fn angle(self) -> u32 {
        match self {
            Observer::Deg2 => 2,
            Observer::Deg10 => 10,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u32> for Observer {
    type Error = ColourError;

    fn try_from(angle: u32) -> Result<Self, Self::Error> {
        match angle {
            2 => Ok(Observer::Deg2),
            10 => Ok(Observer::Deg10),
            other => Err(ColourError::UnknownAngle(other.to_string())),
        }
    }
}

impl From<Observer> for u32 {
    fn from(value: Observer) -> Self {
        value.angle()
    }
}

impl FromStr for Observer {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches('°');
        digits
            .parse::<u32>()
            .map_err(|_| ColourError::UnknownAngle(s.to_string()))
            .and_then(Observer::try_from)
    }
}

impl fmt::Display for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.angle())
    }
}

// ---------------------------------------------------------------------------
// Constants per (observer, illuminant)
// ---------------------------------------------------------------------------

/// ASTM E308 white points, `[observer][illuminant]`, Y = 100.
const WHITE_POINTS: [[[f64; 3]; 6]; 2] = [
    [
        [109.850, 100.0, 35.585],
        [95.047, 100.0, 108.883],
        [98.074, 100.0, 118.232],
        [96.422, 100.0, 82.521],
        [95.682, 100.0, 92.149],
        [94.972, 100.0, 122.638],
    ],
    [
        [111.144, 100.0, 35.200],
        [94.811, 100.0, 107.304],
        [97.285, 100.0, 116.145],
        [96.720, 100.0, 81.427],
        [95.799, 100.0, 90.926],
        [94.416, 100.0, 120.641],
    ],
];

/// Hunter Lab `(Ka, Kb)`, `[observer][illuminant]`.
const HUNTER_COEFFICIENTS: [[(f64, f64); 6]; 2] = [
    [
        (185.44, 43.51),
        (172.36, 67.04),
        (175.03, 70.04),
        (173.57, 58.58),
        (172.92, 61.67),
        (172.29, 71.45),
    ],
    [
        (186.58, 43.39),
        (172.15, 66.53),
        (174.33, 69.37),
        (173.83, 58.23),
        (173.02, 61.28),
        (171.80, 70.81),
    ],
];

// ---------------------------------------------------------------------------
// ReferenceTables
// ---------------------------------------------------------------------------

/// Process-wide constant tables at 1 nm, indexed by `wavelength - 380`.
#[derive(Debug)]
pub struct ReferenceTables {
    illuminants: Vec<Vec<f64>>,
    observers: Vec<Vec<[f64; 3]>>,
    xyz_to_rgb: Matrix3<f64>,
    rgb_to_xyz: Matrix3<f64>,
}

/// Shared tables, built on first access.
pub fn reference_tables() -> &'static ReferenceTables {
    static TABLES: OnceLock<ReferenceTables> = OnceLock::new();
    TABLES.get_or_init(ReferenceTables::build)
}

impl ReferenceTables {
    fn build() -> Self {
        log::debug!("expanding reference tables to 1 nm ({TABLE_LEN} samples)");
        let illuminants = Illuminant::ALL.iter().map(|ill| ill.spectrum()).collect();
        let observers = [&observer::CIE1931_2DEG, &observer::CIE1964_10DEG]
            .into_iter()
            .map(expand_triples)
            .collect();

        ReferenceTables {
            illuminants,
            observers,
            // linear sRGB (D65) primaries
            xyz_to_rgb: Matrix3::new(
                3.2404542, -1.5371385, -0.4985314, //
                -0.9692660, 1.8760108, 0.0415560, //
                0.0556434, -0.2040259, 1.0572252,
            ),
            rgb_to_xyz: Matrix3::new(
                0.4124564322682360, 0.3575760762800275, 0.1804374802944501, //
                0.2126728463183620, 0.7151521671548808, 0.0721749995732126, //
                0.0193339041032990, 0.1191920282432210, 0.9503040736774040,
            ),
        }
    }

    /// Relative spectral power of `illuminant`, 380..=780 nm.
    pub fn illuminant(&self, illuminant: Illuminant) -> &[f64] {
        &self.illuminants[illuminant.index()]
    }

    /// `[x̄, ȳ, z̄]` of `observer`, 380..=780 nm.
    pub fn observer(&self, observer: Observer) -> &[[f64; 3]] {
        &self.observers[observer.index()]
    }

    pub fn white_point(&self, illuminant: Illuminant, observer: Observer) -> Vector3<f64> {
        Vector3::from(WHITE_POINTS[observer.index()][illuminant.index()])
    }

    /// Reference white for Hunter Lab; the CIE tristimulus white point is used.
    pub fn hunter_white_point(&self, illuminant: Illuminant, observer: Observer) -> Vector3<f64> {
        self.white_point(illuminant, observer)
    }

    pub fn hunter_coefficients(&self, illuminant: Illuminant, observer: Observer) -> (f64, f64) {
        HUNTER_COEFFICIENTS[observer.index()][illuminant.index()]
    }

    /// XYZ (Y in 0..1) to linear sRGB.
    pub fn xyz_to_rgb(&self) -> &Matrix3<f64> {
        &self.xyz_to_rgb
    }

    /// Linear sRGB to XYZ (Y in 0..1).
    pub fn rgb_to_xyz(&self) -> &Matrix3<f64> {
        &self.rgb_to_xyz
    }
}

/// Linear expansion of a table sampled every `step` nm onto the 1 nm grid.
fn expand(samples: &[f64], step: usize) -> Vec<f64> {
    (0..TABLE_LEN)
        .map(|i| {
            let (k, r) = (i / step, i % step);
            if r == 0 {
                samples[k]
            } else {
                let t = r as f64 / step as f64;
                samples[k] + (samples[k + 1] - samples[k]) * t
            }
        })
        .collect()
}

fn expand_triples(samples: &[[f64; 3]; 81]) -> Vec<[f64; 3]> {
    let channels: Vec<Vec<f64>> = (0..3)
        .map(|c| {
            let column: Vec<f64> = samples.iter().map(|row| row[c]).collect();
            expand(&column, 5)
        })
        .collect();
    (0..TABLE_LEN)
        .map(|i| [channels[0][i], channels[1][i], channels[2][i]])
        .collect()
}
