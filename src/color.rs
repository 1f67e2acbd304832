use image::Rgba;
use palette::{IntoColor, Lab, Mix, Srgb};

// ---------------------------------------------------------------------------
// Diverging colour scale for correlation values
// ---------------------------------------------------------------------------

/// Anchor colours of the cool-warm diverging map (blue, neutral grey, red).
const COOL: (f32, f32, f32) = (0.2298, 0.2987, 0.7537);
const NEUTRAL: (f32, f32, f32) = (0.8650, 0.8650, 0.8650);
const WARM: (f32, f32, f32) = (0.7057, 0.0156, 0.1502);

/// Colour for `NaN` cells and figure background.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const FOREGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Present / missing cells in the missing-value map (ends of viridis).
pub const PRESENT: Rgba<u8> = Rgba([68, 1, 84, 255]);
pub const MISSING: Rgba<u8> = Rgba([253, 231, 37, 255]);

fn lab(c: (f32, f32, f32)) -> Lab {
    Srgb::new(c.0, c.1, c.2).into_color()
}

fn to_rgba(rgb: Srgb) -> Rgba<u8> {
    Rgba([
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
        255,
    ])
}

/// Maps values in a fixed `[min, max]` range onto the cool-warm scale.
///
/// Interpolation happens in CIE L*a*b* so lightness changes evenly towards
/// the neutral midpoint.
#[derive(Debug, Clone, Copy)]
pub struct DivergingScale {
    pub min: f64,
    pub max: f64,
}

impl Default for DivergingScale {
    fn default() -> Self {
        DivergingScale { min: -1.0, max: 1.0 }
    }
}

impl DivergingScale {
    fn lab_for(&self, value: f64) -> Lab {
        let t = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0) as f32;
        if t < 0.5 {
            lab(COOL).mix(lab(NEUTRAL), t * 2.0)
        } else {
            lab(NEUTRAL).mix(lab(WARM), (t - 0.5) * 2.0)
        }
    }

    /// Fill colour for a cell; `NaN` maps to the background.
    pub fn color_for(&self, value: f64) -> Rgba<u8> {
        if value.is_nan() {
            return BACKGROUND;
        }
        let rgb: Srgb = self.lab_for(value).into_color();
        to_rgba(rgb)
    }

    /// Black or white, whichever reads better on top of `color_for(value)`.
    pub fn text_color_for(&self, value: f64) -> Rgba<u8> {
        if value.is_nan() || self.lab_for(value).l > 55.0 {
            FOREGROUND
        } else {
            Rgba([255, 255, 255, 255])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_are_blue_and_red() {
        let scale = DivergingScale::default();
        let Rgba([r, _, b, _]) = scale.color_for(-1.0);
        assert!(b > r);
        let Rgba([r, _, b, _]) = scale.color_for(1.0);
        assert!(r > b);
    }

    #[test]
    fn values_outside_range_are_clamped() {
        let scale = DivergingScale::default();
        assert_eq!(scale.color_for(3.0), scale.color_for(1.0));
        assert_eq!(scale.color_for(f64::NAN), BACKGROUND);
    }

    #[test]
    fn midpoint_is_light_with_dark_text() {
        let scale = DivergingScale::default();
        assert_eq!(scale.text_color_for(0.0), FOREGROUND);
        assert_ne!(scale.text_color_for(-1.0), FOREGROUND);
    }
}
