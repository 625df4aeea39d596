use std::borrow::Cow;

use crate::{
    foundation::error::{CanvasError, CanvasResult},
    style::font::FontSpec,
    text::fonts::FontRegistry,
};

/// One line of shaped text, positioned relative to its start point on the baseline.
#[derive(Clone)]
pub(crate) struct ShapedLine {
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) font_size: f32,
    pub(crate) glyphs: Vec<vello_cpu::Glyph>,
    /// Advance width of the whole line in pixels.
    pub(crate) width: f64,
}

impl FontRegistry {
    /// Shape `text` as a single unwrapped line using the font resolved for `font`.
    pub(crate) fn shape_line(&mut self, text: &str, font: &FontSpec) -> CanvasResult<ShapedLine> {
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return Err(CanvasError::text("font size must be finite and > 0"));
        }
        let resolved = self.resolve(font)?;
        let family = resolved.shaping_family().to_string();
        let font_data = resolved.data().clone();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Single(parley::style::FontFamily::Named(Cow::Owned(family))),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        for line in layout.lines() {
            let baseline = line.metrics().baseline;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y - baseline,
                }));
            }
        }

        Ok(ShapedLine {
            font: font_data,
            font_size: font.size_px,
            glyphs,
            width: f64::from(layout.width()),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
