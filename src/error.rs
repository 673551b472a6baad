use thiserror::Error;

// ---------------------------------------------------------------------------
// ColourError – every failure the numeric core can report
// ---------------------------------------------------------------------------

/// Validation and numeric-domain failures of the colorimetric core.
///
/// Nothing here is transient: every operation is deterministic, so an error
/// always points at the input or the chosen configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColourError {
    // -- validation --
    #[error("unsupported illuminant '{0}', expected one of A, D65, C, D50, D55, D75")]
    UnknownIlluminant(String),

    #[error("unsupported viewing angle '{0}', expected 2 or 10")]
    UnknownAngle(String),

    #[error("unsupported interpolation degree '{0}', expected 1, 2, 3, linear, quadratic or cubic")]
    UnknownDegree(String),

    #[error("unsupported boundary condition '{0}', expected natural, not-a-knot or periodic")]
    UnknownBoundary(String),

    #[error("unsupported colour space '{0}', expected xyz, lab, luv, yxy, yuv, hunterlab or srgb")]
    UnknownSpace(String),

    #[error("unsupported wavelength unit '{0}', expected nm or um")]
    UnknownUnit(String),

    #[error("unsupported spectrum upper bound '{0}', expected 1 or 100")]
    UnknownScale(String),

    #[error("unknown report field '{0}'")]
    UnknownField(String),

    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("need at least {required} breakpoints, got {got}")]
    TooFewPoints { required: usize, got: usize },

    #[error("breakpoint {0} appears more than once")]
    DuplicateBreakpoint(f64),

    #[error("breakpoints and values must be finite")]
    NonFinite,

    #[error("batch must have exactly 3 rows, got {0}")]
    BatchRows(usize),

    #[error("batch row {row} has {len} columns, expected {expected}")]
    RaggedBatch {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("spectrum minimum wavelength {0} nm is above 400 nm")]
    MinWavelength(f64),

    #[error("spectrum maximum wavelength {0} nm is below 700 nm")]
    MaxWavelength(f64),

    #[error("malformed sRGB hex code '{0}', expected '#rrggbb'")]
    HexFormat(String),

    // -- numeric domain --
    #[error("interpolation system is singular")]
    SingularSystem,

    #[error("normalization denominator is zero")]
    ZeroNormalization,
}

pub type Result<T> = std::result::Result<T, ColourError>;
