use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{CanvasError, CanvasResult};

/// Font slant parsed from a CSS font shorthand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontSlant {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
    /// Oblique.
    Oblique,
}

/// A parsed CSS `font` shorthand, e.g. `bold 32px "Inter", sans-serif`.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// Slant keyword.
    pub slant: FontSlant,
    /// Numeric weight (400 = normal, 700 = bold).
    pub weight: u16,
    /// Size in pixels.
    pub size_px: f32,
    /// Family names in preference order, quotes removed.
    pub families: Vec<String>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            slant: FontSlant::Normal,
            weight: 400,
            size_px: 10.0,
            families: vec!["sans-serif".to_string()],
        }
    }
}

impl FontSpec {
    /// Parse a CSS font shorthand.
    ///
    /// Accepts optional style/variant/weight keywords, a required size (`px`, `pt`, `em`, `rem`
    /// or `%`, with an optional `/line-height` that is ignored) and a comma-separated family list.
    pub fn parse(s: &str) -> CanvasResult<Self> {
        let s = s.trim();
        let err = |msg: &str| CanvasError::validation(format!("invalid font '{s}': {msg}"));

        let mut out = Self {
            families: Vec::new(),
            ..Self::default()
        };

        let mut rest = s;
        let mut size = None;
        while size.is_none() {
            let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let token = &rest[..token_end];
            if token.is_empty() {
                return Err(err("missing font size"));
            }
            rest = rest[token_end..].trim_start();

            match token.to_ascii_lowercase().as_str() {
                "normal" | "small-caps" => {}
                "italic" => out.slant = FontSlant::Italic,
                "oblique" => out.slant = FontSlant::Oblique,
                "bold" => out.weight = 700,
                "bolder" => out.weight = 900,
                "lighter" => out.weight = 300,
                t if t.len() == 3 && t.bytes().all(|b| b.is_ascii_digit()) => {
                    let w: u16 = t.parse().map_err(|_| err("bad weight"))?;
                    if !(1..=1000).contains(&w) {
                        return Err(err("weight must be in 1..=1000"));
                    }
                    out.weight = w;
                }
                t => size = Some(parse_size(t).ok_or_else(|| err("bad font size"))?),
            }
        }

        for family in rest.split(',') {
            let family = family.trim().trim_matches(|c| c == '"' || c == '\'').trim();
            if !family.is_empty() {
                out.families.push(family.to_string());
            }
        }
        if out.families.is_empty() {
            return Err(err("missing font family"));
        }

        out.size_px = size.unwrap_or(10.0);
        Ok(out)
    }

    /// First family in the list.
    pub fn primary_family(&self) -> &str {
        self.families.first().map(String::as_str).unwrap_or("sans-serif")
    }
}

fn parse_size(token: &str) -> Option<f32> {
    let token = token.split('/').next()?;
    let (num, mul, div) = if let Some(v) = token.strip_suffix("px") {
        (v, 1.0, 1.0)
    } else if let Some(v) = token.strip_suffix("pt") {
        (v, 4.0, 3.0)
    } else if let Some(v) = token.strip_suffix("rem") {
        (v, 16.0, 1.0)
    } else if let Some(v) = token.strip_suffix("em") {
        (v, 10.0, 1.0)
    } else if let Some(v) = token.strip_suffix('%') {
        (v, 10.0, 100.0)
    } else {
        return None;
    };
    let v: f32 = num.parse().ok()?;
    let px = v * mul / div;
    (px.is_finite() && px > 0.0).then_some(px)
}

impl FromStr for FontSpec {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slant {
            FontSlant::Normal => {}
            FontSlant::Italic => write!(f, "italic ")?,
            FontSlant::Oblique => write!(f, "oblique ")?,
        }
        if self.weight != 400 {
            write!(f, "{} ", self.weight)?;
        }
        write!(f, "{}px ", self.size_px)?;
        for (i, family) in self.families.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if family.contains(char::is_whitespace) {
                write!(f, "\"{family}\"")?;
            } else {
                write!(f, "{family}")?;
            }
        }
        Ok(())
    }
}

impl Serialize for FontSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FontSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/font.rs"]
mod tests;
