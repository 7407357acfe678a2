/// sRGB color as `(r, g, b)`.
pub type Rgb = (u8, u8, u8);

// sRGB <- XYZ (D65) matrix used by HSLuv.
const M: [[f64; 3]; 3] = [
    [3.240969941904521, -1.537383177570093, -0.498610760293],
    [-0.96924363628087, 1.87596750150772, 0.041555057407175],
    [0.055630079696993, -0.20397695888897, 1.056971514242878],
];

const REF_Y: f64 = 1.0;
const REF_U: f64 = 0.19783000664283;
const REF_V: f64 = 0.46831999493879;
const KAPPA: f64 = 903.2962962;
const EPSILON: f64 = 0.0088564516;

/// Convert HSLuv (h: 0..360, s: 0..100, l: 0..100) to RGB.
///
/// HSLuv keeps perceived lightness constant across hues, so colors spread
/// around the wheel at a fixed `s`/`l` read as equally bright.
pub fn hsluv_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let (l, c, h) = hsluv_to_lch(h, s, l);
    let (l, u, v) = lch_to_luv(l, c, h);
    let (x, y, z) = luv_to_xyz(l, u, v);
    xyz_to_rgb(x, y, z)
}

/// Format RGB as lowercase `#rrggbb`.
pub fn rgb_to_hex((r, g, b): Rgb) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Achromatic color at the given HSLuv lightness.
pub fn neutral(lightness: f64) -> Rgb {
    hsluv_to_rgb(0.0, 0.0, lightness)
}

fn hsluv_to_lch(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if l > 99.9999999 {
        return (100.0, 0.0, h);
    }
    if l < 0.00000001 {
        return (0.0, 0.0, h);
    }
    let max = max_chroma_for_lh(l, h);
    (l, max / 100.0 * s, h)
}

fn lch_to_luv(l: f64, c: f64, h: f64) -> (f64, f64, f64) {
    let hrad = h.to_radians();
    (l, hrad.cos() * c, hrad.sin() * c)
}

fn luv_to_xyz(l: f64, u: f64, v: f64) -> (f64, f64, f64) {
    if l == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let var_u = u / (13.0 * l) + REF_U;
    let var_v = v / (13.0 * l) + REF_V;
    let y = l_to_y(l);
    let x = -(9.0 * y * var_u) / ((var_u - 4.0) * var_v - var_u * var_v);
    let z = (9.0 * y - 15.0 * var_v * y - var_v * x) / (3.0 * var_v);
    (x, y, z)
}

fn l_to_y(l: f64) -> f64 {
    if l <= 8.0 {
        REF_Y * l / KAPPA
    } else {
        REF_Y * ((l + 16.0) / 116.0).powi(3)
    }
}

fn xyz_to_rgb(x: f64, y: f64, z: f64) -> Rgb {
    let channel = |row: &[f64; 3]| {
        let linear = row[0] * x + row[1] * y + row[2] * z;
        (from_linear(linear).clamp(0.0, 1.0) * 255.0).round() as u8
    };
    (channel(&M[0]), channel(&M[1]), channel(&M[2]))
}

fn from_linear(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// The largest chroma that stays inside sRGB for a given lightness and hue.
fn max_chroma_for_lh(l: f64, h: f64) -> f64 {
    let hrad = h.to_radians();
    gamut_bounds(l)
        .iter()
        .map(|&(slope, intercept)| intercept / (hrad.sin() - slope * hrad.cos()))
        .filter(|length| *length >= 0.0)
        .fold(f64::MAX, f64::min)
}

/// Six lines (slope, intercept) bounding the sRGB gamut in the LCh plane at `l`.
fn gamut_bounds(l: f64) -> [(f64, f64); 6] {
    let sub1 = (l + 16.0).powi(3) / 1_560_896.0;
    let sub2 = if sub1 > EPSILON { sub1 } else { l / KAPPA };

    let mut bounds = [(0.0, 0.0); 6];
    for (c, row) in M.iter().enumerate() {
        let [m1, m2, m3] = *row;
        for t in 0..2 {
            let t = t as f64;
            let top1 = (284_517.0 * m1 - 94_839.0 * m3) * sub2;
            let top2 = (838_422.0 * m3 + 769_860.0 * m2 + 731_718.0 * m1) * l * sub2
                - 769_860.0 * t * l;
            let bottom = (632_260.0 * m3 - 126_452.0 * m2) * sub2 + 126_452.0 * t;
            bounds[c * 2 + t as usize] = (top1 / bottom, top2 / bottom);
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::{hsluv_to_rgb, neutral, rgb_to_hex};

    fn hsluv_to_hex(h: f64, s: f64, l: f64) -> String {
        rgb_to_hex(hsluv_to_rgb(h, s, l))
    }

    #[test]
    fn extremes_of_lightness_are_black_and_white() {
        assert_eq!(hsluv_to_hex(0.0, 0.0, 0.0), "#000000");
        assert_eq!(hsluv_to_hex(0.0, 0.0, 100.0), "#ffffff");
        assert_eq!(hsluv_to_hex(250.0, 100.0, 100.0), "#ffffff");
    }

    #[test]
    fn half_lightness_gray_matches_reference() {
        assert_eq!(hsluv_to_hex(0.0, 0.0, 50.0), "#777777");
    }

    #[test]
    fn reference_primaries_convert_back_to_srgb() {
        assert_eq!(
            hsluv_to_hex(12.177050630061776, 100.0, 53.23711559542933),
            "#ff0000"
        );
        assert_eq!(
            hsluv_to_hex(127.71501294924047, 100.0, 87.73551910965973),
            "#00ff00"
        );
        assert_eq!(
            hsluv_to_hex(265.8743202181779, 100.0, 32.30087290398002),
            "#0000ff"
        );
    }

    #[test]
    fn neutral_is_achromatic() {
        for lightness in [20.0, 50.0, 65.0, 90.0] {
            let (r, g, b) = neutral(lightness);
            assert_eq!(r, g);
            assert_eq!(g, b);
        }
    }

    #[test]
    fn equal_lightness_hues_are_distinct() {
        let a = hsluv_to_rgb(0.0, 50.0, 50.0);
        let b = hsluv_to_rgb(120.0, 50.0, 50.0);
        let c = hsluv_to_rgb(240.0, 50.0, 50.0);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn hex_is_lowercase_and_zero_padded() {
        assert_eq!(rgb_to_hex((0, 128, 255)), "#0080ff");
        assert_eq!(rgb_to_hex((10, 11, 12)), "#0a0b0c");
    }
}
