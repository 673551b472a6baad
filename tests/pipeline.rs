use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::Vector3;

use rusty_chroma::data::loader::parse_json;
use rusty_chroma::report::export::write_csv;
use rusty_chroma::{
    build_interpolator, chs, colour_table, evaluate, hex_to_rgb, make_context, rgb_to_hex, Boundary,
    ColourError, Degree, FieldSelection, FieldValue, ReportField, Spectrum, SpectrumIntegrator,
    SpectrumScale, WavelengthUnit,
};

fn flat(start: u32, end: u32, step: usize, value: f64) -> Spectrum {
    let wavelengths: Vec<f64> = (start..=end).step_by(step).map(f64::from).collect();
    let values = vec![value; wavelengths.len()];
    Spectrum::new(wavelengths, values).unwrap()
}

#[test]
fn perfect_reflector_is_white() {
    let ctx = make_context("D65", 2).unwrap();
    let xyz = SpectrumIntegrator::new(&ctx)
        .with_scale(SpectrumScale::Fraction)
        .integrate(&flat(400, 700, 10, 1.0))
        .unwrap();
    assert_relative_eq!(xyz.y, 100.0, epsilon = 1e-9);

    let rgb = ctx.xyz_to_srgb(&xyz);
    for c in rgb.iter() {
        assert!((0.99..=1.0).contains(c), "channel {c}");
    }
    assert_eq!(rgb_to_hex(&rgb, 1.0), "#ffffff");

    let lab = ctx.xyz_to_lab(&xyz);
    assert_relative_eq!(lab.x, 100.0, epsilon = 1e-9);
}

#[test]
fn micrometre_input_matches_nanometres() {
    let ctx = make_context("C", 10).unwrap();
    let nm = SpectrumIntegrator::new(&ctx)
        .integrate(&flat(380, 780, 10, 40.0))
        .unwrap();

    let um: Vec<f64> = (38..=78).map(|i| f64::from(i) / 100.0).collect();
    let spectrum = Spectrum::new(um.clone(), vec![40.0; um.len()]).unwrap();
    let xyz = SpectrumIntegrator::new(&ctx)
        .with_unit(WavelengthUnit::Micrometre)
        .integrate(&spectrum)
        .unwrap();

    assert_relative_eq!(xyz, nm, max_relative = 1e-9);
    assert_relative_eq!(xyz.y, 40.0, epsilon = 1e-9);
}

#[test]
fn wavelength_coverage_is_enforced() {
    let ctx = make_context("D65", 2).unwrap();
    let integrator = SpectrumIntegrator::new(&ctx);

    assert!(integrator.integrate(&flat(400, 700, 10, 50.0)).is_ok());
    assert_eq!(
        integrator.integrate(&flat(401, 701, 10, 50.0)),
        Err(ColourError::MinWavelength(401.0))
    );
    assert_eq!(
        integrator.integrate(&flat(380, 690, 10, 50.0)),
        Err(ColourError::MaxWavelength(690.0))
    );
}

#[test]
fn hex_codes_round_trip() {
    let red = hex_to_rgb("#ff0000").unwrap();
    assert_eq!(red, Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(rgb_to_hex(&red, 1.0), "#ff0000");
    assert_eq!(rgb_to_hex(&Vector3::new(0.0, 128.0, 255.0), 255.0), "#0080ff");
    assert!(matches!(hex_to_rgb("ff0000"), Err(ColourError::HexFormat(_))));
}

#[test]
fn chs_of_black_is_zero() {
    assert_eq!(chs(&Vector3::new(0.0, 0.0, 0.0)), Vector3::zeros());
    let c = chs(&Vector3::new(50.0, 3.0, 4.0));
    assert_relative_eq!(c, Vector3::new(5.0, 4.0f64.atan2(3.0).to_degrees(), 0.1), epsilon = 1e-12);
}

#[test]
fn json_to_csv_report() {
    let loaded = parse_json(
        r#"{
            "scale": 100,
            "wavelength": [400, 450, 500, 550, 600, 650, 700],
            "samples": [
                { "name": "white", "values": [100, 100, 100, 100, 100, 100, 100] },
                { "name": "grey", "values": [50, 50, 50, 50, 50, 50, 50] }
            ]
        }"#,
    )
    .unwrap();

    let ctx = make_context("D65", 2).unwrap();
    let integrator = SpectrumIntegrator::new(&ctx).with_scale(loaded.scale.unwrap());
    let selection = FieldSelection::from_titles(["Y", "sRGB"]).unwrap();
    let table = colour_table(&loaded.table, &integrator, &selection).unwrap();

    assert_eq!(
        table.reports()[0].get(ReportField::Srgb),
        &FieldValue::Hex("#ffffff".to_string())
    );

    let mut out = Vec::new();
    write_csv(&table, &mut out, 3).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "-,white,grey");
    assert_eq!(lines[1], "Y,100.000,50.000");
}

#[test]
fn interpolators_reproduce_their_data() {
    let x = [0.0, 1.0, 2.5, 3.0, 4.5, 6.0];
    let cubic: Vec<f64> = x.iter().map(|&t| t * t * t - 2.0 * t + 1.0).collect();
    let line: Vec<f64> = x.iter().map(|&t| 3.0 * t - 1.0).collect();

    let model = build_interpolator(&x, &[cubic, line], Degree::Cubic, Boundary::NotAKnot).unwrap();
    let out = evaluate(&model, &[5.2, 0.7, 3.3]);
    assert_eq!(out.points, vec![0.7, 3.3, 5.2]);
    for (j, &t) in out.points.iter().enumerate() {
        assert_relative_eq!(out.values[0][j], t * t * t - 2.0 * t + 1.0, epsilon = 1e-9);
        assert_relative_eq!(out.values[1][j], 3.0 * t - 1.0, epsilon = 1e-9);
    }

    let y = [2.0, -1.0, 4.0, 0.5, 3.0, 1.0];
    for degree in [Degree::Linear, Degree::Quadratic, Degree::Cubic] {
        let model = build_interpolator(&x, &[y], degree, Boundary::Natural).unwrap();
        let at_knots = evaluate(&model, &x);
        for (got, want) in at_knots.values[0].iter().zip(&y) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-9);
        }
    }
}
