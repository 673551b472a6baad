//! Piecewise polynomial interpolation over one or more value series.
//!
//! A model is built once from breakpoints, values, a [`Degree`] and a
//! [`Boundary`] condition. Each series owns a coefficient matrix whose row `i`
//! holds the polynomial valid on `[x_i, x_{i+1}]`, written in powers of
//! `(x - x_i)`. Queries are sorted before evaluation, so results come back in
//! ascending query order.

use std::fmt;
use std::str::FromStr;

use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};

use crate::error::{ColourError, Result};

// ---------------------------------------------------------------------------
// Degree / Boundary – chosen once at build time
// ---------------------------------------------------------------------------

/// Polynomial degree of every segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Degree {
    Linear,
    Quadratic,
    Cubic,
}

impl Degree {
    /// Highest power of each segment polynomial.
    pub fn order(self) -> usize {
        match self {
            Degree::Linear => 1,
            Degree::Quadratic => 2,
            Degree::Cubic => 3,
        }
    }
}

impl TryFrom<u32> for Degree {
    type Error = ColourError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(Degree::Linear),
            2 => Ok(Degree::Quadratic),
            3 => Ok(Degree::Cubic),
            other => Err(ColourError::UnknownDegree(other.to_string())),
        }
    }
}

impl FromStr for Degree {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "linear" => Ok(Degree::Linear),
            "2" | "quadratic" => Ok(Degree::Quadratic),
            "3" | "cubic" => Ok(Degree::Cubic),
            _ => Err(ColourError::UnknownDegree(s.to_string())),
        }
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Degree::Linear => "linear",
            Degree::Quadratic => "quadratic",
            Degree::Cubic => "cubic",
        };
        f.write_str(name)
    }
}

/// End condition closing the quadratic and cubic systems.
///
/// Linear models ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Boundary {
    /// Zero curvature at the ends.
    Natural,
    /// Third-derivative continuity at the second and second-to-last knots.
    #[default]
    NotAKnot,
    /// First derivative (and curvature, for cubics) wraps from last to first knot.
    Periodic,
}

impl FromStr for Boundary {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "natural" => Ok(Boundary::Natural),
            "not-a-knot" => Ok(Boundary::NotAKnot),
            "periodic" => Ok(Boundary::Periodic),
            _ => Err(ColourError::UnknownBoundary(s.to_string())),
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Boundary::Natural => "natural",
            Boundary::NotAKnot => "not-a-knot",
            Boundary::Periodic => "periodic",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// InterpolationModel
// ---------------------------------------------------------------------------

/// An immutable piecewise polynomial over sorted breakpoints.
#[derive(Debug, Clone)]
pub struct InterpolationModel {
    x: Vec<f64>,
    degree: Degree,
    boundary: Boundary,
    /// One `(n - 1) × (order + 1)` matrix per series.
    coefficients: Vec<DMatrix<f64>>,
}

/// Values of every series at the sorted query points.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Query points in ascending order.
    pub points: Vec<f64>,
    /// `values[s][j]` is series `s` at `points[j]`.
    pub values: Vec<Vec<f64>>,
}

impl InterpolationModel {
    /// Build a model for a single series.
    pub fn new(x: &[f64], y: &[f64], degree: Degree, boundary: Boundary) -> Result<Self> {
        Self::with_series(x, &[y], degree, boundary)
    }

    /// Build a model for several series sharing the breakpoints `x`.
    ///
    /// Breakpoints need not be sorted; each series is permuted along with
    /// them. The quadratic/cubic system depends only on `x`, so it is
    /// factorized once and solved per series.
    pub fn with_series<S: AsRef<[f64]>>(
        x: &[f64],
        series: &[S],
        degree: Degree,
        boundary: Boundary,
    ) -> Result<Self> {
        let n = x.len();
        if series.is_empty() {
            return Err(ColourError::LengthMismatch { x: n, y: 0 });
        }
        for s in series {
            let s = s.as_ref();
            if s.len() != n {
                return Err(ColourError::LengthMismatch { x: n, y: s.len() });
            }
            if s.iter().any(|v| !v.is_finite()) {
                return Err(ColourError::NonFinite);
            }
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ColourError::NonFinite);
        }

        let required = minimum_points(degree, boundary);
        if n < required {
            return Err(ColourError::TooFewPoints { required, got: n });
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| x[a].total_cmp(&x[b]));
        let xs: Vec<f64> = order.iter().map(|&i| x[i]).collect();
        if let Some(w) = xs.windows(2).find(|w| w[0] == w[1]) {
            return Err(ColourError::DuplicateBreakpoint(w[0]));
        }
        let ys: Vec<Vec<f64>> = series
            .iter()
            .map(|s| {
                let s = s.as_ref();
                order.iter().map(|&i| s[i]).collect()
            })
            .collect();

        let dx: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        log::trace!(
            "building {degree} interpolant ({boundary}) over {n} breakpoints, {} series",
            ys.len()
        );

        let coefficients = match degree {
            Degree::Linear => ys.iter().map(|y| linear_coefficients(&dx, y)).collect(),
            Degree::Quadratic => {
                let lu = quadratic_system(&dx, boundary).lu();
                ys.iter()
                    .map(|y| quadratic_coefficients(&lu, &dx, y))
                    .collect::<Result<Vec<_>>>()?
            }
            Degree::Cubic => {
                let lu = cubic_system(&dx, boundary).lu();
                ys.iter()
                    .map(|y| cubic_coefficients(&lu, &dx, y, boundary))
                    .collect::<Result<Vec<_>>>()?
            }
        };

        Ok(InterpolationModel {
            x: xs,
            degree,
            boundary,
            coefficients,
        })
    }

    /// Sorted breakpoints.
    pub fn breakpoints(&self) -> &[f64] {
        &self.x
    }

    pub fn degree(&self) -> Degree {
        self.degree
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Number of value series carried by the model.
    pub fn series_count(&self) -> usize {
        self.coefficients.len()
    }

    /// Coefficient matrix of one series; row `i` is `[a, b, c, d]` (truncated
    /// to the degree) for `a + b·t + c·t² + d·t³`, `t = x - x_i`.
    pub fn coefficients(&self, series: usize) -> Option<&DMatrix<f64>> {
        self.coefficients.get(series)
    }

    /// Evaluate every series at `query`.
    ///
    /// Points before the first breakpoint use the first segment, points at or
    /// after the last breakpoint use the final segment.
    pub fn evaluate(&self, query: &[f64]) -> Evaluation {
        let mut points = query.to_vec();
        points.sort_by(f64::total_cmp);
        let segments = self.locate(&points);

        let values = self
            .coefficients
            .iter()
            .map(|coef| {
                points
                    .iter()
                    .zip(&segments)
                    .map(|(&p, &seg)| horner(coef, seg, p - self.x[seg]))
                    .collect()
            })
            .collect();

        Evaluation { points, values }
    }

    /// Segment index of each sorted point, scanning forward from the last hit.
    fn locate(&self, sorted: &[f64]) -> Vec<usize> {
        let last = self.x.len() - 2;
        let mut current = 0;
        sorted
            .iter()
            .map(|&p| {
                if p >= self.x[last + 1] {
                    return last;
                }
                while current < last && p >= self.x[current + 1] {
                    current += 1;
                }
                current
            })
            .collect()
    }
}

/// Build an interpolation model over `y` (one or more series).
pub fn build_interpolator<S: AsRef<[f64]>>(
    x: &[f64],
    y: &[S],
    degree: Degree,
    boundary: Boundary,
) -> Result<InterpolationModel> {
    InterpolationModel::with_series(x, y, degree, boundary)
}

/// Evaluate `model` at `query`; output follows ascending query order.
pub fn evaluate(model: &InterpolationModel, query: &[f64]) -> Evaluation {
    model.evaluate(query)
}

// ---------------------------------------------------------------------------
// Coefficient construction
// ---------------------------------------------------------------------------

fn minimum_points(degree: Degree, boundary: Boundary) -> usize {
    match (degree, boundary) {
        (Degree::Quadratic, Boundary::NotAKnot) => 3,
        (Degree::Cubic, Boundary::NotAKnot) => 4,
        _ => 2,
    }
}

fn secants(dx: &[f64], y: &[f64]) -> Vec<f64> {
    dx.iter()
        .enumerate()
        .map(|(i, h)| (y[i + 1] - y[i]) / h)
        .collect()
}

fn horner(coef: &DMatrix<f64>, segment: usize, t: f64) -> f64 {
    (0..coef.ncols())
        .rev()
        .fold(0.0, |acc, j| acc * t + coef[(segment, j)])
}

fn linear_coefficients(dx: &[f64], y: &[f64]) -> DMatrix<f64> {
    let k = secants(dx, y);
    DMatrix::from_fn(dx.len(), 2, |i, j| if j == 0 { y[i] } else { k[i] })
}

/// Unknowns are the knot slopes `s_i`. Row `i ≥ 1` says the segment average of
/// `s_{i-1}` and `s_i` equals the secant; row 0 is the boundary equation.
fn quadratic_system(dx: &[f64], boundary: Boundary) -> DMatrix<f64> {
    let n = dx.len() + 1;
    let mut m = DMatrix::zeros(n, n);
    for i in 1..n {
        m[(i, i - 1)] = 1.0;
        m[(i, i)] = 1.0;
    }
    match boundary {
        Boundary::Natural => {
            m[(0, 0)] = 1.0;
            m[(0, 1)] = -1.0;
        }
        Boundary::NotAKnot => {
            m[(0, 0)] = dx[1];
            m[(0, 1)] = -(dx[0] + dx[1]);
            m[(0, 2)] = dx[0];
        }
        Boundary::Periodic => {
            m[(0, 0)] = 1.0;
            m[(0, n - 1)] = -1.0;
        }
    }
    m
}

fn quadratic_coefficients(lu: &LU<f64, Dyn, Dyn>, dx: &[f64], y: &[f64]) -> Result<DMatrix<f64>> {
    let k = secants(dx, y);
    let mut rhs = DVector::zeros(dx.len() + 1);
    for (i, ki) in k.iter().enumerate() {
        rhs[i + 1] = 2.0 * ki;
    }
    let s = lu.solve(&rhs).ok_or(ColourError::SingularSystem)?;

    Ok(DMatrix::from_fn(dx.len(), 3, |i, j| match j {
        0 => y[i],
        1 => s[i],
        _ => (s[i + 1] - s[i]) / (2.0 * dx[i]),
    }))
}

/// Unknowns are `c_i = S''(x_i) / 2`. Interior rows are the classic
/// tridiagonal recurrence; the first and last rows come from the boundary.
fn cubic_system(dx: &[f64], boundary: Boundary) -> DMatrix<f64> {
    let n = dx.len() + 1;
    let last = n - 1;
    let l = dx.len() - 1;
    let mut m = DMatrix::zeros(n, n);
    for i in 1..last {
        m[(i, i - 1)] = dx[i - 1];
        m[(i, i)] = 2.0 * (dx[i - 1] + dx[i]);
        m[(i, i + 1)] = dx[i];
    }
    match boundary {
        Boundary::Natural => {
            m[(0, 0)] = 1.0;
            m[(last, last)] = 1.0;
        }
        Boundary::NotAKnot => {
            m[(0, 0)] = -dx[1];
            m[(0, 1)] = dx[0] + dx[1];
            m[(0, 2)] = -dx[0];
            m[(last, last)] = -dx[l - 1];
            m[(last, last - 1)] = dx[l] + dx[l - 1];
            m[(last, last - 2)] = -dx[l];
        }
        Boundary::Periodic => {
            m[(0, 0)] = 1.0;
            m[(0, last)] = -1.0;
            // S'(x_0) = S'(x_last); columns overlap when n == 2
            m[(last, 0)] += 2.0 * dx[0];
            m[(last, 1)] += dx[0];
            m[(last, last - 1)] += dx[l];
            m[(last, last)] += 2.0 * dx[l];
        }
    }
    m
}

fn cubic_coefficients(
    lu: &LU<f64, Dyn, Dyn>,
    dx: &[f64],
    y: &[f64],
    boundary: Boundary,
) -> Result<DMatrix<f64>> {
    let k = secants(dx, y);
    let n = dx.len() + 1;
    let mut rhs = DVector::zeros(n);
    for i in 1..n - 1 {
        rhs[i] = 3.0 * (k[i] - k[i - 1]);
    }
    if boundary == Boundary::Periodic {
        rhs[n - 1] = 3.0 * (k[0] - k[k.len() - 1]);
    }
    let c = lu.solve(&rhs).ok_or(ColourError::SingularSystem)?;

    Ok(DMatrix::from_fn(dx.len(), 4, |i, j| match j {
        0 => y[i],
        1 => k[i] - dx[i] * (2.0 * c[i] + c[i + 1]) / 3.0,
        2 => c[i],
        _ => (c[i + 1] - c[i]) / (3.0 * dx[i]),
    }))
}
