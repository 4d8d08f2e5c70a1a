use crate::foundation::core::Rgba8;
use crate::scene::attrs::{AttrValue, AttributeSet};
use std::f64::consts::{PI, TAU};

/// Interpolation contract for tweened values.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Rgba8 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        Self {
            r: lerp_u8(a.r, b.r, t),
            g: lerp_u8(a.g, b.g, t),
            b: lerp_u8(a.b, b.b, t),
            a: lerp_u8(a.a, b.a, t),
        }
    }
}

/// Interpolate an angle along the shorter way around the circle.
pub fn lerp_angle(a: f64, b: f64, t: f64) -> f64 {
    let mut d = (b - a) % TAU;
    if d > PI {
        d -= TAU;
    } else if d < -PI {
        d += TAU;
    }
    a + d * t
}

impl Lerp for AttrValue {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (*a, *b) {
            (Self::Position(x), Self::Position(y)) => {
                Self::Position(<f64 as Lerp>::lerp(&x, &y, t))
            }
            (Self::Extent(x), Self::Extent(y)) => {
                Self::Extent(<f64 as Lerp>::lerp(&x, &y, t))
            }
            (Self::Opacity(x), Self::Opacity(y)) => {
                Self::Opacity(<f64 as Lerp>::lerp(&x, &y, t))
            }
            (Self::Angle(x), Self::Angle(y)) => Self::Angle(lerp_angle(x, y, t)),
            (Self::Color(x), Self::Color(y)) => Self::Color(Rgba8::lerp(&x, &y, t)),
            // Kind changed between renders: no meaningful midpoint.
            (from, to) => {
                if t >= 1.0 {
                    to
                } else {
                    from
                }
            }
        }
    }
}

impl Lerp for AttributeSet {
    /// Attributes present only in `b` appear at their target value; those only in `a` hold.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let mut out = a.clone();
        for (name, to) in b.iter() {
            let v = match a.get(name) {
                Some(from) => AttrValue::lerp(&from, &to, t),
                None => to,
            };
            out.set(name, v);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/lerp.rs"]
mod tests;
