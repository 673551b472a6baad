//! Colour-space conversions bound to one illuminant and viewing angle.
//!
//! Every conversion is generic over [`Triples`], so the same formulas serve a
//! single `Vector3` and a `Matrix3xX` batch. XYZ is on the Y = 100 scale, sRGB
//! channels run 0..1.

use nalgebra::Vector3;

use crate::color::{Colour, ColourSpace, Triples};
use crate::error::Result;
use crate::tables::{reference_tables, Illuminant, Observer, ReferenceTables};

/// `(6/29)^3`, where the Lab companding function turns linear.
const LAB_EPSILON: f64 = 216.0 / 24389.0;
const LAB_KNEE: f64 = 6.0 / 29.0;

/// White point and constants for one (illuminant, observer) pair.
#[derive(Debug, Clone)]
pub struct ColorimetricContext {
    illuminant: Illuminant,
    observer: Observer,
    white: Vector3<f64>,
    hunter_white: Vector3<f64>,
    ka: f64,
    kb: f64,
    tables: &'static ReferenceTables,
}

/// Build a context from an illuminant name (case-insensitive) and an angle of 2 or 10.
pub fn make_context(illuminant: &str, angle: u32) -> Result<ColorimetricContext> {
    ColorimetricContext::from_names(illuminant, angle)
}

impl ColorimetricContext {
    pub fn new(illuminant: Illuminant, observer: Observer) -> Self {
        let tables = reference_tables();
        let (ka, kb) = tables.hunter_coefficients(illuminant, observer);
        ColorimetricContext {
            illuminant,
            observer,
            white: tables.white_point(illuminant, observer),
            hunter_white: tables.hunter_white_point(illuminant, observer),
            ka,
            kb,
            tables,
        }
    }

    pub fn from_names(illuminant: &str, angle: u32) -> Result<Self> {
        Ok(Self::new(illuminant.parse()?, Observer::try_from(angle)?))
    }

    pub fn illuminant(&self) -> Illuminant {
        self.illuminant
    }

    pub fn observer(&self) -> Observer {
        self.observer
    }

    pub fn white_point(&self) -> Vector3<f64> {
        self.white
    }

    pub fn hunter_white_point(&self) -> Vector3<f64> {
        self.hunter_white
    }

    /// Hunter `(Ka, Kb)`.
    pub fn hunter_coefficients(&self) -> (f64, f64) {
        (self.ka, self.kb)
    }

    pub fn tables(&self) -> &'static ReferenceTables {
        self.tables
    }

    // -----------------------------------------------------------------------
    // CIE Lab
    // -----------------------------------------------------------------------

    pub fn xyz_to_lab<T: Triples>(&self, xyz: &T) -> T {
        xyz.map_triples(|v| {
            let f = v.component_div(&self.white).map(lab_f);
            Vector3::new(116.0 * f.y - 16.0, 500.0 * (f.x - f.y), 200.0 * (f.y - f.z))
        })
    }

    pub fn lab_to_xyz<T: Triples>(&self, lab: &T) -> T {
        lab.map_triples(|v| {
            let fy = (v.x + 16.0) / 116.0;
            let f = Vector3::new(fy + v.y / 500.0, fy, fy - v.z / 200.0);
            f.map(lab_f_inverse).component_mul(&self.white)
        })
    }

    // -----------------------------------------------------------------------
    // Hunter Lab
    // -----------------------------------------------------------------------

    pub fn xyz_to_hunter_lab<T: Triples>(&self, xyz: &T) -> T {
        xyz.map_triples(|v| {
            let r = v.component_div(&self.hunter_white);
            let root = r.y.sqrt();
            Vector3::new(
                100.0 * root,
                self.ka * (r.x - r.y) / root,
                self.kb * (r.y - r.z) / root,
            )
        })
    }

    pub fn hunter_lab_to_xyz<T: Triples>(&self, hunter: &T) -> T {
        hunter.map_triples(|v| {
            let root = v.x / 100.0;
            let yr = root * root;
            Vector3::new(v.y * root / self.ka + yr, yr, yr - v.z * root / self.kb)
                .component_mul(&self.hunter_white)
        })
    }

    // -----------------------------------------------------------------------
    // Yu'v' and Yxy
    // -----------------------------------------------------------------------

    /// XYZ to `(Y, u', v')`.
    pub fn xyz_to_yuv<T: Triples>(&self, xyz: &T) -> T {
        xyz.map_triples(|v| {
            let (u, w) = uv_prime(&v);
            Vector3::new(v.y, u, w)
        })
    }

    pub fn yuv_to_xyz<T: Triples>(&self, yuv: &T) -> T {
        yuv.map_triples(|v| {
            let (y, u, w) = (v.x, v.y, v.z);
            let denominator = 9.0 * y / w;
            let x = u * denominator / 4.0;
            Vector3::new(x, y, (denominator - x - 15.0 * y) / 3.0)
        })
    }

    /// XYZ to `(Y, x, y)`.
    pub fn xyz_to_yxy<T: Triples>(&self, xyz: &T) -> T {
        xyz.map_triples(|v| {
            let sum = v.sum();
            Vector3::new(v.y, v.x / sum, v.y / sum)
        })
    }

    pub fn yxy_to_xyz<T: Triples>(&self, yxy: &T) -> T {
        yxy.map_triples(|v| {
            let (big_y, x, y) = (v.x, v.y, v.z);
            Vector3::new(x * big_y / y, big_y, (1.0 - x - y) * big_y / y)
        })
    }

    // -----------------------------------------------------------------------
    // CIE Luv
    // -----------------------------------------------------------------------

    /// A black sample (zero XYZ sum) takes the white chromaticity, giving `u* = v* = 0`.
    pub fn xyz_to_luv<T: Triples>(&self, xyz: &T) -> T {
        let (un, vn) = uv_prime(&self.white);
        xyz.map_triples(|v| {
            let l = 116.0 * lab_f(v.y / self.white.y) - 16.0;
            let (u, w) = if v.x + 15.0 * v.y + 3.0 * v.z == 0.0 {
                (un, vn)
            } else {
                uv_prime(&v)
            };
            Vector3::new(l, 13.0 * l * (u - un), 13.0 * l * (w - vn))
        })
    }

    pub fn luv_to_xyz<T: Triples>(&self, luv: &T) -> T {
        let (un, vn) = uv_prime(&self.white);
        luv.map_triples(|v| {
            let l = v.x;
            if l == 0.0 {
                return Vector3::zeros();
            }
            let u = v.y / (13.0 * l) + un;
            let w = v.z / (13.0 * l) + vn;
            let y = self.white.y * lab_f_inverse((l + 16.0) / 116.0);
            Vector3::new(
                y * 9.0 * u / (4.0 * w),
                y,
                y * (12.0 - 3.0 * u - 20.0 * w) / (4.0 * w),
            )
        })
    }

    // -----------------------------------------------------------------------
    // sRGB
    // -----------------------------------------------------------------------

    /// Gamma-encoded sRGB clipped to 0..1. NaN linear values are treated as 0.
    pub fn xyz_to_srgb<T: Triples>(&self, xyz: &T) -> T {
        let m = self.tables.xyz_to_rgb();
        xyz.map_triples(|v| {
            let linear = m * (v / 100.0);
            linear.map(|c| {
                let c = if c.is_nan() {
                    log::trace!("NaN linear sRGB channel treated as 0");
                    0.0
                } else {
                    c
                };
                gamma_encode(c).clamp(0.0, 1.0)
            })
        })
    }

    pub fn srgb_to_xyz<T: Triples>(&self, rgb: &T) -> T {
        let m = self.tables.rgb_to_xyz();
        rgb.map_triples(|v| {
            let linear = v.map(|c| gamma_decode(c.clamp(0.0, 1.0)));
            m * linear * 100.0
        })
    }

    pub fn lab_to_srgb<T: Triples>(&self, lab: &T) -> T {
        self.xyz_to_srgb(&self.lab_to_xyz(lab))
    }

    pub fn srgb_to_lab<T: Triples>(&self, rgb: &T) -> T {
        self.xyz_to_lab(&self.srgb_to_xyz(rgb))
    }

    // -----------------------------------------------------------------------
    // Cylindrical quantities and generic dispatch
    // -----------------------------------------------------------------------

    /// Chroma, hue (degrees, -180..=180) and saturation `C/L` of a Lab-like
    /// triple. Saturation is 0 where `L` is 0.
    pub fn chs<T: Triples>(&self, lab_like: &T) -> T {
        chs(lab_like)
    }

    /// Express `colour` in `target`, routing through XYZ.
    pub fn convert<T: Triples>(&self, colour: &Colour<T>, target: ColourSpace) -> Colour<T> {
        if colour.space == target {
            return colour.clone();
        }
        let xyz = self.to_xyz(colour.space, &colour.values);
        Colour::new(target, self.from_xyz(target, &xyz))
    }

    pub fn to_xyz<T: Triples>(&self, space: ColourSpace, values: &T) -> T {
        match space {
            ColourSpace::Xyz => values.clone(),
            ColourSpace::Lab => self.lab_to_xyz(values),
            ColourSpace::Luv => self.luv_to_xyz(values),
            ColourSpace::Yxy => self.yxy_to_xyz(values),
            ColourSpace::Yuv => self.yuv_to_xyz(values),
            ColourSpace::HunterLab => self.hunter_lab_to_xyz(values),
            ColourSpace::Srgb => self.srgb_to_xyz(values),
        }
    }

    pub fn from_xyz<T: Triples>(&self, space: ColourSpace, xyz: &T) -> T {
        match space {
            ColourSpace::Xyz => xyz.clone(),
            ColourSpace::Lab => self.xyz_to_lab(xyz),
            ColourSpace::Luv => self.xyz_to_luv(xyz),
            ColourSpace::Yxy => self.xyz_to_yxy(xyz),
            ColourSpace::Yuv => self.xyz_to_yuv(xyz),
            ColourSpace::HunterLab => self.xyz_to_hunter_lab(xyz),
            ColourSpace::Srgb => self.xyz_to_srgb(xyz),
        }
    }
}

/// Chroma, hue and saturation; see [`ColorimetricContext::chs`].
pub fn chs<T: Triples>(lab_like: &T) -> T {
    lab_like.map_triples(|v| {
        let chroma = v.y.hypot(v.z);
        let hue = v.z.atan2(v.y).to_degrees();
        let saturation = if v.x == 0.0 { 0.0 } else { chroma / v.x };
        Vector3::new(chroma, hue, saturation)
    })
}

fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        841.0 / 108.0 * t + 4.0 / 29.0
    }
}

fn lab_f_inverse(f: f64) -> f64 {
    if f > LAB_KNEE {
        f * f * f
    } else {
        108.0 / 841.0 * (f - 4.0 / 29.0)
    }
}

fn uv_prime(xyz: &Vector3<f64>) -> (f64, f64) {
    let d = xyz.x + 15.0 * xyz.y + 3.0 * xyz.z;
    (4.0 * xyz.x / d, 9.0 * xyz.y / d)
}

fn gamma_encode(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn gamma_decode(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::batch_from_columns;
    use crate::error::ColourError;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use palette::white_point::D65;
    use palette::{IntoColor, Lab, Srgb, Xyz};

    const SAMPLES: [[f64; 3]; 5] = [
        [41.24, 21.26, 1.93],
        [20.0, 30.0, 40.0],
        [95.0, 100.0, 108.0],
        [0.5, 0.4, 0.9],
        [60.0, 45.0, 12.0],
    ];

    fn all_contexts() -> Vec<ColorimetricContext> {
        Illuminant::ALL
            .into_iter()
            .flat_map(|ill| [Observer::Deg2, Observer::Deg10].map(|obs| ColorimetricContext::new(ill, obs)))
            .collect()
    }

    #[test]
    fn xyz_round_trips_through_every_space() {
        let spaces = [
            ColourSpace::Lab,
            ColourSpace::Luv,
            ColourSpace::Yxy,
            ColourSpace::Yuv,
            ColourSpace::HunterLab,
        ];
        for ctx in all_contexts() {
            for sample in SAMPLES {
                let xyz = Vector3::from(sample);
                for space in spaces {
                    let back = ctx.to_xyz(space, &ctx.from_xyz(space, &xyz));
                    assert_relative_eq!(back, xyz, max_relative = 1e-6);
                }
            }
        }
    }

    #[test]
    fn srgb_round_trips_through_xyz_and_lab() {
        let ctx = make_context("D65", 2).unwrap();
        for rgb in [[0.2, 0.5, 0.8], [1.0, 1.0, 1.0], [0.01, 0.02, 0.03], [0.9, 0.1, 0.4]] {
            let rgb = Vector3::from(rgb);
            assert_relative_eq!(ctx.xyz_to_srgb(&ctx.srgb_to_xyz(&rgb)), rgb, max_relative = 1e-6);
            assert_relative_eq!(ctx.lab_to_srgb(&ctx.srgb_to_lab(&rgb)), rgb, max_relative = 1e-6);
        }
    }

    #[test]
    fn white_point_maps_to_reference_white() {
        for ctx in all_contexts() {
            let white = ctx.white_point();
            assert_relative_eq!(ctx.xyz_to_lab(&white), Vector3::new(100.0, 0.0, 0.0), epsilon = 1e-9);
            assert_relative_eq!(ctx.xyz_to_luv(&white), Vector3::new(100.0, 0.0, 0.0), epsilon = 1e-9);
            assert_relative_eq!(
                ctx.xyz_to_hunter_lab(&white),
                Vector3::new(100.0, 0.0, 0.0),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn dark_colours_use_the_linear_lab_segment() {
        let ctx = make_context("d50", 10).unwrap();
        let xyz = Vector3::new(0.3, 0.2, 0.25);
        let lab = ctx.xyz_to_lab(&xyz);
        assert!(lab.x < 8.0);
        assert_relative_eq!(ctx.lab_to_xyz(&lab), xyz, max_relative = 1e-9);
    }

    #[test]
    fn lab_matches_palette_for_d65() {
        let ctx = make_context("D65", 2).unwrap();
        for sample in SAMPLES {
            let ours = ctx.xyz_to_lab(&Vector3::from(sample));
            let theirs: Lab<D65, f64> =
                Xyz::<D65, f64>::new(sample[0] / 100.0, sample[1] / 100.0, sample[2] / 100.0).into_color();
            assert_relative_eq!(ours.x, theirs.l, epsilon = 1e-6);
            assert_relative_eq!(ours.y, theirs.a, epsilon = 1e-6);
            assert_relative_eq!(ours.z, theirs.b, epsilon = 1e-6);
        }
    }

    #[test]
    fn srgb_matches_palette_for_in_gamut_colours() {
        let ctx = make_context("D65", 2).unwrap();
        for sample in [[20.0, 30.0, 40.0], [41.24, 21.26, 1.93], [60.0, 45.0, 12.0]] {
            let ours = ctx.xyz_to_srgb(&Vector3::from(sample));
            let theirs: Srgb<f64> =
                Xyz::<D65, f64>::new(sample[0] / 100.0, sample[1] / 100.0, sample[2] / 100.0).into_color();
            assert_abs_diff_eq!(ours.x, theirs.red, epsilon = 1e-3);
            assert_abs_diff_eq!(ours.y, theirs.green, epsilon = 1e-3);
            assert_abs_diff_eq!(ours.z, theirs.blue, epsilon = 1e-3);
        }
    }

    #[test]
    fn srgb_absorbs_negative_and_nan_inputs() {
        let ctx = make_context("D65", 2).unwrap();
        assert_eq!(ctx.xyz_to_srgb(&Vector3::new(-5.0, -5.0, -5.0)), Vector3::zeros());
        assert_eq!(ctx.xyz_to_srgb(&Vector3::new(f64::NAN, 0.0, 0.0)), Vector3::zeros());
        let bright = ctx.xyz_to_srgb(&Vector3::new(300.0, 300.0, 300.0));
        assert_eq!(bright, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn batches_match_single_vectors() {
        let ctx = make_context("C", 10).unwrap();
        let batch = batch_from_columns(&SAMPLES);
        let lab = ctx.xyz_to_lab(&batch);
        let hunter = ctx.xyz_to_hunter_lab(&batch);
        for (i, sample) in SAMPLES.iter().enumerate() {
            let v = Vector3::from(*sample);
            assert_eq!(lab.column(i).into_owned(), ctx.xyz_to_lab(&v));
            assert_eq!(hunter.column(i).into_owned(), ctx.xyz_to_hunter_lab(&v));
        }
    }

    #[test]
    fn chs_of_the_achromatic_point_is_zero() {
        assert_eq!(chs(&Vector3::new(0.0, 0.0, 0.0)), Vector3::zeros());
        let v = chs(&Vector3::new(50.0, 0.0, 10.0));
        assert_relative_eq!(v, Vector3::new(10.0, 90.0, 0.2), epsilon = 1e-12);
        let negative_hue = chs(&Vector3::new(40.0, 0.0, -10.0));
        assert_relative_eq!(negative_hue.y, -90.0, epsilon = 1e-12);
    }

    #[test]
    fn black_has_neutral_luv() {
        let ctx = make_context("A", 2).unwrap();
        assert_abs_diff_eq!(ctx.xyz_to_luv(&Vector3::zeros()), Vector3::zeros(), epsilon = 1e-12);
        assert_eq!(ctx.luv_to_xyz(&Vector3::zeros()), Vector3::zeros());
    }

    #[test]
    fn convert_routes_between_any_pair() {
        let ctx = make_context("D65", 2).unwrap();
        let lab = Colour::new(ColourSpace::Lab, Vector3::new(52.0, 30.0, -20.0));
        let hunter = ctx.convert(&lab, ColourSpace::HunterLab);
        assert_eq!(hunter.space, ColourSpace::HunterLab);
        let back = ctx.convert(&hunter, ColourSpace::Lab);
        assert_relative_eq!(back.values, lab.values, max_relative = 1e-6);
        assert_eq!(ctx.convert(&lab, ColourSpace::Lab), lab);
    }

    #[test]
    fn invalid_context_names_are_rejected() {
        assert_eq!(
            make_context("F11", 2).unwrap_err(),
            ColourError::UnknownIlluminant("F11".into())
        );
        assert_eq!(make_context("D65", 5).unwrap_err(), ColourError::UnknownAngle("5".into()));
        assert_eq!(make_context("a", 10).unwrap().illuminant(), Illuminant::A);
    }
}
