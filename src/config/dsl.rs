use crate::{
    config::model::{
        Element, ElementEntry, ImageSpec, ProgressBarSpec, RenderConfig, RequiredFont, TextSpec,
    },
    foundation::error::{CanvasError, CanvasResult},
    style::{color::CssColor, font::FontSpec, paint::Gradient},
};

/// Fluent builder for [`RenderConfig`]; [`Self::build`] validates the result.
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    /// Start a blank `width x height` config.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            config: RenderConfig::new(width, height),
        }
    }

    /// Set the default font from a CSS shorthand.
    pub fn global_font(mut self, font: &str) -> CanvasResult<Self> {
        self.config.global_font = Some(FontSpec::parse(font)?);
        Ok(self)
    }

    /// Set the default fill color.
    pub fn global_color(mut self, color: impl Into<CssColor>) -> Self {
        self.config.global_color = Some(color.into());
        self
    }

    /// Set the background image reference.
    pub fn background(mut self, reference: impl Into<String>) -> Self {
        self.config.background = Some(reference.into());
        self
    }

    /// Register a font file under `font_name` before drawing.
    pub fn font(
        mut self,
        path: impl Into<String>,
        font_name: impl Into<String>,
    ) -> CanvasResult<Self> {
        let font_name = font_name.into();
        if self
            .config
            .required_fonts
            .iter()
            .any(|f| f.font_name.eq_ignore_ascii_case(&font_name))
        {
            return Err(CanvasError::validation(format!(
                "duplicate required font '{font_name}'"
            )));
        }
        self.config.required_fonts.push(RequiredFont {
            path: path.into(),
            font_name,
        });
        Ok(self)
    }

    /// Append any element entry.
    pub fn element(mut self, element: impl Into<ElementEntry>) -> Self {
        self.config.elements.push(element.into());
        self
    }

    /// Append an avatar drawn into `(x, y, width, height)`.
    pub fn avatar(self, x: f64, y: f64, image: ImageSpec) -> Self {
        self.element(Element::Avatar { x, y, image })
    }

    /// Append a text run with its baseline at `(x, y)`.
    pub fn text(self, x: f64, y: f64, text: TextSpec) -> Self {
        self.element(Element::Text { x, y, text })
    }

    /// Append a progress bar at `(x, y)`.
    pub fn progress_bar(self, x: f64, y: f64, progress_bar: ProgressBarSpec) -> Self {
        self.element(Element::ProgressBar { x, y, progress_bar })
    }

    /// Validate and return the config.
    pub fn build(self) -> CanvasResult<RenderConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Image spec for a `width x height` box.
pub fn image_spec(url: impl Into<String>, width: f64, height: f64) -> ImageSpec {
    ImageSpec {
        url: url.into(),
        width,
        height,
        is_rounded: false,
    }
}

/// Image spec clipped to the circle inscribed by the box height.
pub fn rounded_image_spec(url: impl Into<String>, width: f64, height: f64) -> ImageSpec {
    ImageSpec {
        is_rounded: true,
        ..image_spec(url, width, height)
    }
}

/// Plain text spec with inherited font and color.
pub fn text_spec(value: impl Into<String>) -> TextSpec {
    TextSpec {
        value: value.into(),
        stroke_width: 1.0,
        ..TextSpec::default()
    }
}

impl TextSpec {
    /// Override the font from a CSS shorthand.
    pub fn with_font(mut self, font: &str) -> CanvasResult<Self> {
        self.font = Some(FontSpec::parse(font)?);
        Ok(self)
    }

    /// Override the fill color.
    pub fn with_color(mut self, color: impl Into<CssColor>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Fill with a gradient.
    pub fn with_gradient(mut self, gradient: Gradient) -> Self {
        self.gradient = Some(gradient);
        self
    }

    /// Limit the drawn width.
    pub fn with_max_width(mut self, max_width: f64) -> Self {
        self.max_width = Some(max_width);
        self
    }

    /// Outline the glyphs.
    pub fn with_stroke(mut self, color: impl Into<CssColor>, width: f64) -> Self {
        self.stroke = Some(color.into());
        self.stroke_width = width;
        self
    }
}

/// Progress bar spec filled to `progress` with `color`.
pub fn progress_bar_spec(
    width: f64,
    height: f64,
    color: impl Into<CssColor>,
    progress: f64,
) -> ProgressBarSpec {
    ProgressBarSpec {
        width,
        height,
        color: color.into(),
        stroke: None,
        is_round: false,
        gradient: None,
        progress,
        track_color: None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/dsl.rs"]
mod tests;
