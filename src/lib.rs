//! Spectrum to colour.
//!
//! Integrates reflectance/transmittance spectra against CIE illuminants and
//! observers, then expresses the result in XYZ, Lab, Luv, Hunter Lab, Yxy,
//! Yu'v' and sRGB.
//!
//! ```no_run
//! use rusty_chroma::{colour_report, make_context, ReportField, Spectrum, SpectrumScale};
//!
//! let ctx = make_context("D65", 2)?;
//! let spectrum = Spectrum::from_pairs(&[(380.0, 0.4), (550.0, 0.6), (780.0, 0.5)])?;
//! let report = colour_report(&spectrum, &ctx, SpectrumScale::Fraction)?;
//! println!("L* = {}", report.get(ReportField::LabL));
//! # Ok::<(), rusty_chroma::ColourError>(())
//! ```

pub mod color;
pub mod config;
pub mod context;
pub mod data;
pub mod error;
pub mod integrate;
pub mod interp;
pub mod report;
pub mod tables;

pub use color::{hex_to_rgb, hex_to_rgb_scaled, rgb_to_hex, Colour, ColourSpace, Triples};
pub use config::ReportOptions;
pub use context::{chs, make_context, ColorimetricContext};
pub use data::model::{SpectralTable, Spectrum, SpectrumScale, WavelengthUnit};
pub use error::{ColourError, Result};
pub use integrate::{integrate_spectrum, SpectrumIntegrator, WavelengthGrid};
pub use interp::{build_interpolator, evaluate, Boundary, Degree, Evaluation, InterpolationModel};
pub use report::{colour_report, colour_table, ColourReport, ColourTable, FieldSelection, FieldValue, ReportField};
pub use tables::{reference_tables, Illuminant, Observer, ReferenceTables};
