use serde::{Deserialize, Serialize};

use crate::{
    config::keyed::ElementMap,
    foundation::{
        core::MAX_SURFACE_DIM,
        error::{CanvasError, CanvasResult},
    },
    style::{color::CssColor, font::FontSpec, paint::Gradient},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A complete, declarative description of one output image.
///
/// A config can be built programmatically (see [`crate::RenderConfigBuilder`]) or deserialized
/// from JSON, and is rendered by [`crate::Renderer::generate`].
pub struct RenderConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Default font for text elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_font: Option<FontSpec>,
    /// Default fill color for text and progress bars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_color: Option<CssColor>,
    /// Background image reference, stretched over the whole surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Fonts registered before drawing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fonts: Vec<RequiredFont>,
    /// Elements painted in order after the background.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A font file registered under a logical family name.
pub struct RequiredFont {
    /// Font file path.
    pub path: String,
    /// Logical name used in CSS font strings.
    pub font_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
/// One drawable unit, selected by an explicit `kind` discriminant.
pub enum Element {
    /// An image drawn into a box, optionally clipped to a circle.
    Avatar {
        /// Box left edge.
        x: f64,
        /// Box top edge.
        y: f64,
        /// Image source and box size.
        image: ImageSpec,
    },
    /// A single line of text with its alphabetic baseline at `y`.
    Text {
        /// Start x.
        x: f64,
        /// Baseline y.
        y: f64,
        /// Text value and style.
        text: TextSpec,
    },
    /// A horizontal bar filled to a fraction of its width.
    #[serde(rename_all = "camelCase")]
    ProgressBar {
        /// Bar left edge.
        x: f64,
        /// Bar top edge.
        y: f64,
        /// Bar geometry and style.
        progress_bar: ProgressBarSpec,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Image element parameters.
pub struct ImageSpec {
    /// Image reference (path, `data:` URL or `http(s)` URL).
    pub url: String,
    /// Box width in pixels.
    pub width: f64,
    /// Box height in pixels.
    pub height: f64,
    /// Clip to a circle of radius `height / 2` centered in the box.
    #[serde(default)]
    pub is_rounded: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Text element parameters.
pub struct TextSpec {
    /// Literal text, drawn without wrapping.
    pub value: String,
    /// Font override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSpec>,
    /// Fill color override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CssColor>,
    /// Gradient fill; takes precedence over `color`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
    /// Compress the text horizontally when it is wider than this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    /// Outline color drawn over the fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<CssColor>,
    /// Outline width in pixels.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

fn default_stroke_width() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Progress bar parameters.
pub struct ProgressBarSpec {
    /// Full bar width in pixels.
    pub width: f64,
    /// Bar height in pixels.
    pub height: f64,
    /// Fill color of the filled portion.
    pub color: CssColor,
    /// Outline color around the full bar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<CssColor>,
    /// Use fully rounded ends.
    #[serde(default)]
    pub is_round: bool,
    /// Gradient fill; takes precedence over `color`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
    /// Filled fraction in `[0, 1]`.
    #[serde(default = "default_progress")]
    pub progress: f64,
    /// Color of the unfilled track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_color: Option<CssColor>,
}

fn default_progress() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq)]
/// One entry of [`RenderConfig::elements`].
///
/// Objects carrying a `kind` field deserialize as a typed [`Element`]. Any other object is read as
/// a keyed [`ElementMap`] whose entry names select the element kind.
pub enum ElementEntry {
    /// Explicitly typed element.
    Typed(Element),
    /// Name-keyed element group.
    Keyed(ElementMap),
}

impl Serialize for ElementEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Typed(e) => e.serialize(serializer),
            Self::Keyed(m) => m.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ElementEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_typed = value
            .as_object()
            .is_some_and(|obj| obj.get("kind").is_some_and(serde_json::Value::is_string));
        if is_typed {
            Element::deserialize(value)
                .map(Self::Typed)
                .map_err(serde::de::Error::custom)
        } else {
            ElementMap::deserialize(value)
                .map(Self::Keyed)
                .map_err(serde::de::Error::custom)
        }
    }
}

impl From<Element> for ElementEntry {
    fn from(e: Element) -> Self {
        Self::Typed(e)
    }
}

impl From<ElementMap> for ElementEntry {
    fn from(m: ElementMap) -> Self {
        Self::Keyed(m)
    }
}

impl Element {
    /// Image reference this element loads, if any.
    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Avatar { image, .. } => Some(image.url.as_str()),
            Self::Text { .. } | Self::ProgressBar { .. } => None,
        }
    }

    /// Check geometry and style values.
    pub fn validate(&self) -> CanvasResult<()> {
        match self {
            Self::Avatar { x, y, image } => {
                validate_finite(&[(*x, "avatar x"), (*y, "avatar y")])?;
                if image.url.trim().is_empty() {
                    return Err(CanvasError::validation("avatar image url must be non-empty"));
                }
                validate_extent(image.width, "avatar image width")?;
                validate_extent(image.height, "avatar image height")?;
            }
            Self::Text { x, y, text } => {
                validate_finite(&[(*x, "text x"), (*y, "text y")])?;
                if let Some(w) = text.max_width
                    && !w.is_finite()
                {
                    return Err(CanvasError::validation("text maxWidth must be finite"));
                }
                if !text.stroke_width.is_finite() || text.stroke_width <= 0.0 {
                    return Err(CanvasError::validation(
                        "text strokeWidth must be finite and > 0",
                    ));
                }
                if let Some(g) = &text.gradient {
                    g.validate()?;
                }
            }
            Self::ProgressBar { x, y, progress_bar } => {
                validate_finite(&[(*x, "progress bar x"), (*y, "progress bar y")])?;
                validate_extent(progress_bar.width, "progress bar width")?;
                validate_extent(progress_bar.height, "progress bar height")?;
                if !(0.0..=1.0).contains(&progress_bar.progress) {
                    return Err(CanvasError::validation(
                        "progress bar progress must be in [0, 1]",
                    ));
                }
                if let Some(g) = &progress_bar.gradient {
                    g.validate()?;
                }
            }
        }
        Ok(())
    }
}

impl RenderConfig {
    /// Minimal config: a blank `width x height` surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            global_font: None,
            global_color: None,
            background: None,
            required_fonts: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Parse a config from JSON text.
    pub fn from_json_str(s: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize to pretty JSON text.
    pub fn to_json_pretty(&self) -> CanvasResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Flatten [`Self::elements`] into paint order, expanding keyed groups.
    pub fn resolved_elements(&self) -> Vec<Element> {
        let mut out = Vec::with_capacity(self.elements.len());
        for entry in &self.elements {
            match entry {
                ElementEntry::Typed(e) => out.push(e.clone()),
                ElementEntry::Keyed(m) => out.extend(m.to_elements()),
            }
        }
        out
    }

    /// Check dimensions, references and every element.
    pub fn validate(&self) -> CanvasResult<()> {
        self.validate_resolved(&self.resolved_elements())
    }

    /// [`validate`](Self::validate) against elements already produced by
    /// [`resolved_elements`](Self::resolved_elements).
    pub(crate) fn validate_resolved(&self, elements: &[Element]) -> CanvasResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CanvasError::validation("canvas width/height must be > 0"));
        }
        if self.width > MAX_SURFACE_DIM || self.height > MAX_SURFACE_DIM {
            return Err(CanvasError::validation(format!(
                "canvas width/height must be <= {MAX_SURFACE_DIM}"
            )));
        }
        if let Some(bg) = &self.background
            && bg.trim().is_empty()
        {
            return Err(CanvasError::validation("background must be non-empty"));
        }
        for font in &self.required_fonts {
            if font.path.trim().is_empty() {
                return Err(CanvasError::validation(format!(
                    "required font '{}' has an empty path",
                    font.font_name
                )));
            }
            if font.font_name.trim().is_empty() {
                return Err(CanvasError::validation(format!(
                    "required font '{}' has an empty fontName",
                    font.path
                )));
            }
        }
        for element in elements {
            element.validate()?;
        }
        Ok(())
    }
}

fn validate_finite(values: &[(f64, &str)]) -> CanvasResult<()> {
    for (v, name) in values {
        if !v.is_finite() {
            return Err(CanvasError::validation(format!("{name} must be finite")));
        }
    }
    Ok(())
}

fn validate_extent(v: f64, name: &str) -> CanvasResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(CanvasError::validation(format!(
            "{name} must be finite and >= 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
