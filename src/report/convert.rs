use std::fmt;

use nalgebra::Vector3;
use serde::Serialize;

use crate::color::{rgb_to_hex, Colour};
use crate::context::{chs, ColorimetricContext};

// ---------------------------------------------------------------------------
// ConversionSummary – one colour, every space
// ---------------------------------------------------------------------------

/// A single colour expressed in every supported space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionSummary {
    pub xyz: [f64; 3],
    pub xy: [f64; 2],
    pub uv_prime: [f64; 2],
    pub lab: [f64; 3],
    /// `C*ab`, `hab`
    pub lab_ch: [f64; 2],
    pub hunter_lab: [f64; 3],
    pub hunter_ch: [f64; 2],
    pub luv: [f64; 3],
    /// `C*uv`, `huv`, `suv`
    pub luv_chs: [f64; 3],
    /// Channels on the 0..255 scale.
    pub srgb: [f64; 3],
    pub hex: String,
}

impl ConversionSummary {
    pub fn new(context: &ColorimetricContext, colour: &Colour) -> Self {
        let xyz = context.to_xyz(colour.space, &colour.values);
        let yxy = context.xyz_to_yxy(&xyz);
        let yuv = context.xyz_to_yuv(&xyz);
        let lab = context.xyz_to_lab(&xyz);
        let hunter = context.xyz_to_hunter_lab(&xyz);
        let luv = context.xyz_to_luv(&xyz);
        let lab_chs = chs(&lab);
        let hunter_chs = chs(&hunter);
        let luv_chs = chs(&luv);
        let srgb = context.xyz_to_srgb(&xyz);

        ConversionSummary {
            xyz: xyz.into(),
            xy: [yxy.y, yxy.z],
            uv_prime: [yuv.y, yuv.z],
            lab: lab.into(),
            lab_ch: [lab_chs.x, lab_chs.y],
            hunter_lab: hunter.into(),
            hunter_ch: [hunter_chs.x, hunter_chs.y],
            luv: luv.into(),
            luv_chs: luv_chs.into(),
            srgb: (srgb * 255.0).into(),
            hex: rgb_to_hex(&srgb, 1.0),
        }
    }
}

/// Summary of `colour` under `context`.
pub fn summarize(context: &ColorimetricContext, colour: &Colour<Vector3<f64>>) -> ConversionSummary {
    ConversionSummary::new(context, colour)
}

fn write_row(f: &mut fmt::Formatter<'_>, title: &str, values: &[f64]) -> fmt::Result {
    write!(f, "{title:<12}")?;
    for v in values {
        write!(f, "{v:>10.3}")?;
    }
    writeln!(f)
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_row(f, "XYZ", &self.xyz)?;
        write_row(f, "xy", &self.xy)?;
        write_row(f, "u'v'", &self.uv_prime)?;
        write_row(f, "Lab", &self.lab)?;
        write_row(f, "C*ab h", &self.lab_ch)?;
        write_row(f, "Hunter Lab", &self.hunter_lab)?;
        write_row(f, "C h", &self.hunter_ch)?;
        write_row(f, "Luv", &self.luv)?;
        write_row(f, "C*uv h s", &self.luv_chs)?;
        write_row(f, "sRGB", &self.srgb)?;
        writeln!(f, "{:<12}{:>10}", "hex", self.hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{hex_to_rgb, ColourSpace};
    use crate::context::make_context;
    use approx::assert_relative_eq;

    #[test]
    fn summary_from_srgb_red() {
        let ctx = make_context("D65", 2).unwrap();
        let red = Colour::new(ColourSpace::Srgb, hex_to_rgb("#ff0000").unwrap());
        let summary = summarize(&ctx, &red);
        assert_eq!(summary.hex, "#ff0000");
        assert_relative_eq!(summary.srgb[0], 255.0, max_relative = 1e-6);
        assert_relative_eq!(summary.xyz[1], 21.26728463183620, max_relative = 1e-9);
        assert!(summary.lab[1] > 70.0);
    }

    #[test]
    fn every_input_space_agrees() {
        let ctx = make_context("D50", 10).unwrap();
        let xyz = Colour::new(ColourSpace::Xyz, Vector3::new(30.0, 25.0, 12.0));
        let reference = summarize(&ctx, &xyz);
        for space in ColourSpace::ALL {
            if space == ColourSpace::Srgb {
                // sRGB clips, so it only reproduces in-gamut colours
                continue;
            }
            let entered = ctx.convert(&xyz, space);
            let summary = summarize(&ctx, &entered);
            for (a, b) in summary.xyz.iter().zip(&reference.xyz) {
                assert_relative_eq!(*a, *b, max_relative = 1e-6);
            }
            assert_eq!(summary.hex, reference.hex);
        }
    }

    #[test]
    fn display_lists_every_space() {
        let ctx = make_context("C", 2).unwrap();
        let text = summarize(&ctx, &Colour::new(ColourSpace::Lab, Vector3::new(50.0, 10.0, -10.0))).to_string();
        assert_eq!(text.lines().count(), 11);
        assert!(text.starts_with("XYZ"));
        assert!(text.contains("hex"));
    }
}
