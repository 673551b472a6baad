/// Data layer: spectrum types and loading.
///
/// Architecture:
/// ```text
///  .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → LoadedSpectra (+ declared unit / scale)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SpectralTable │  shared wavelength column, named value columns
///   └──────────────┘
///        │
///        ▼
///   SpectrumIntegrator
/// ```
pub mod loader;
pub mod model;
