use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::Rgba8,
    error::{CanvasError, CanvasResult},
};

/// A color written the way canvas `fillStyle` accepts it.
///
/// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`, `hsl()`/`hsla()` and the
/// common CSS named colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CssColor(pub Rgba8);

impl CssColor {
    /// Parse a CSS color string.
    pub fn parse(s: &str) -> CanvasResult<Self> {
        parse_css_color(s)
            .map(Self)
            .map_err(|e| CanvasError::validation(format!("invalid color '{s}': {e}")))
    }

    /// Straight RGBA8 value.
    pub fn rgba8(self) -> Rgba8 {
        self.0
    }
}

impl From<Rgba8> for CssColor {
    fn from(c: Rgba8) -> Self {
        Self(c)
    }
}

impl FromStr for CssColor {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rgba8 { r, g, b, a } = self.0;
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Serialize for CssColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CssColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Css(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Css(s) => parse_css_color(&s)
                .map(Self)
                .map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self(Rgba8::new(*r, *g, *b, 255))),
                [r, g, b, a] => Ok(Self(Rgba8::new(*r, *g, *b, *a))),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_css_color(s: &str) -> Result<Rgba8, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty color".to_owned());
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some((func, args)) = split_function(&lower) {
        return match func {
            "rgb" | "rgba" => parse_rgb_args(args),
            "hsl" | "hsla" => parse_hsl_args(args),
            _ => Err(format!("unsupported color function '{func}'")),
        };
    }

    named_color(&lower).ok_or_else(|| format!("unknown color name '{s}'"))
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    fn nibble(c: u8) -> Result<u8, String> {
        (c as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| format!("invalid hex digit '{}'", c as char))
    }

    let bytes = s.as_bytes();
    let mut digits = Vec::with_capacity(bytes.len());
    for &b in bytes {
        digits.push(nibble(b)?);
    }

    match digits.as_slice() {
        [r, g, b] => Ok(Rgba8::new(r * 17, g * 17, b * 17, 255)),
        [r, g, b, a] => Ok(Rgba8::new(r * 17, g * 17, b * 17, a * 17)),
        [r1, r0, g1, g0, b1, b0] => Ok(Rgba8::new(
            r1 * 16 + r0,
            g1 * 16 + g0,
            b1 * 16 + b0,
            255,
        )),
        [r1, r0, g1, g0, b1, b0, a1, a0] => Ok(Rgba8::new(
            r1 * 16 + r0,
            g1 * 16 + g0,
            b1 * 16 + b0,
            a1 * 16 + a0,
        )),
        _ => Err("hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

fn split_function(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    Some((s[..open].trim(), inner))
}

/// Split `a, b, c` or `a b c / d` into components.
fn split_args(args: &str) -> Vec<&str> {
    args.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_channel(s: &str) -> Result<u8, String> {
    let v = if let Some(pct) = s.strip_suffix('%') {
        parse_f64(pct)? / 100.0 * 255.0
    } else {
        parse_f64(s)?
    };
    Ok(v.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(s: &str) -> Result<u8, String> {
    let v = if let Some(pct) = s.strip_suffix('%') {
        parse_f64(pct)? / 100.0
    } else {
        parse_f64(s)?
    };
    Ok((v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn parse_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number '{s}'"))?;
    if !v.is_finite() {
        return Err(format!("non-finite number '{s}'"));
    }
    Ok(v)
}

fn parse_rgb_args(args: &str) -> Result<Rgba8, String> {
    let parts = split_args(args);
    let (r, g, b, a) = match parts.as_slice() {
        [r, g, b] => (r, g, b, None),
        [r, g, b, a] => (r, g, b, Some(a)),
        _ => return Err("rgb() takes 3 or 4 components".to_owned()),
    };
    let a = match a {
        Some(a) => parse_alpha(a)?,
        None => 255,
    };
    Ok(Rgba8::new(
        parse_channel(r)?,
        parse_channel(g)?,
        parse_channel(b)?,
        a,
    ))
}

fn parse_hsl_args(args: &str) -> Result<Rgba8, String> {
    let parts = split_args(args);
    let (h, s, l, a) = match parts.as_slice() {
        [h, s, l] => (h, s, l, None),
        [h, s, l, a] => (h, s, l, Some(a)),
        _ => return Err("hsl() takes 3 or 4 components".to_owned()),
    };
    let h = parse_f64(h.trim_end_matches("deg"))?;
    let s = parse_f64(s.trim_end_matches('%'))? / 100.0;
    let l = parse_f64(l.trim_end_matches('%'))? / 100.0;
    let a = match a {
        Some(a) => parse_alpha(a)?,
        None => 255,
    };
    let [r, g, b] = hsl_to_rgb(h, s, l);
    Ok(Rgba8::new(r, g, b, a))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    fn to_u8(x: f64) -> u8 {
        (x.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return [to_u8(l), to_u8(l), to_u8(l)];
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    [
        to_u8(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_u8(hue_to_rgb(p, q, h)),
        to_u8(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    ]
}

fn named_color(name: &str) -> Option<Rgba8> {
    let rgb = |r, g, b| Some(Rgba8::new(r, g, b, 255));
    match name {
        "transparent" => Some(Rgba8::TRANSPARENT),
        "black" => rgb(0, 0, 0),
        "white" => rgb(255, 255, 255),
        "red" => rgb(255, 0, 0),
        "lime" => rgb(0, 255, 0),
        "green" => rgb(0, 128, 0),
        "blue" => rgb(0, 0, 255),
        "yellow" => rgb(255, 255, 0),
        "cyan" | "aqua" => rgb(0, 255, 255),
        "magenta" | "fuchsia" => rgb(255, 0, 255),
        "silver" => rgb(192, 192, 192),
        "gray" | "grey" => rgb(128, 128, 128),
        "darkgray" | "darkgrey" => rgb(169, 169, 169),
        "lightgray" | "lightgrey" => rgb(211, 211, 211),
        "maroon" => rgb(128, 0, 0),
        "olive" => rgb(128, 128, 0),
        "purple" => rgb(128, 0, 128),
        "teal" => rgb(0, 128, 128),
        "navy" => rgb(0, 0, 128),
        "orange" => rgb(255, 165, 0),
        "gold" => rgb(255, 215, 0),
        "pink" => rgb(255, 192, 203),
        "hotpink" => rgb(255, 105, 180),
        "violet" => rgb(238, 130, 238),
        "indigo" => rgb(75, 0, 130),
        "brown" => rgb(165, 42, 42),
        "crimson" => rgb(220, 20, 60),
        "coral" => rgb(255, 127, 80),
        "salmon" => rgb(250, 128, 114),
        "skyblue" => rgb(135, 206, 235),
        "royalblue" => rgb(65, 105, 225),
        "dodgerblue" => rgb(30, 144, 255),
        "turquoise" => rgb(64, 224, 208),
        "whitesmoke" => rgb(245, 245, 245),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/color.rs"]
mod tests;
