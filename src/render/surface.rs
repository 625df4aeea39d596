use kurbo::Shape as _;

use crate::{
    assets::cache::LoadedImage,
    foundation::{
        core::{Affine, FrameRGBA, MAX_SURFACE_DIM, Point, Rect, Rgba8, affine_to_cpu, bezpath_to_cpu},
        error::{CanvasError, CanvasResult},
    },
    style::{
        font::FontSpec,
        paint::{FillStyle, gradient_to_cpu},
    },
    text::layout::ShapedLine,
};

const PATH_TOLERANCE: f64 = 0.1;

#[derive(Clone, Debug, Default, PartialEq)]
/// Style applied by fill and text operations, saved and restored as a unit.
pub(crate) struct DrawingState {
    pub(crate) font: FontSpec,
    pub(crate) fill: FillStyle,
    /// Clip layers pushed since this state became current.
    clip_layers: usize,
}

/// A fixed-size drawing target with a canvas-like state stack.
pub(crate) struct Surface {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
    state: DrawingState,
    saved: Vec<DrawingState>,
}

impl Surface {
    /// Allocate a `width x height` surface cleared to `clear`.
    pub(crate) fn new(width: u32, height: u32, clear: Rgba8) -> CanvasResult<Self> {
        let dim = |v: u32, what: &str| -> CanvasResult<u16> {
            if v == 0 || v > MAX_SURFACE_DIM {
                return Err(CanvasError::validation(format!(
                    "surface {what} must be in 1..={MAX_SURFACE_DIM}, got {v}"
                )));
            }
            u16::try_from(v).map_err(|_| CanvasError::validation(format!("surface {what} exceeds u16")))
        };
        let (w, h) = (dim(width, "width")?, dim(height, "height")?);

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        if clear.a > 0 {
            ctx.set_paint(clear.to_cpu());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
        }

        Ok(Self {
            ctx,
            width: w,
            height: h,
            state: DrawingState::default(),
            saved: Vec::new(),
        })
    }

    pub(crate) fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub(crate) fn height(&self) -> u32 {
        u32::from(self.height)
    }

    pub(crate) fn state(&self) -> &DrawingState {
        &self.state
    }

    /// Number of outstanding [`Surface::save`] calls.
    pub(crate) fn depth(&self) -> usize {
        self.saved.len()
    }

    pub(crate) fn set_font(&mut self, font: FontSpec) {
        self.state.font = font;
    }

    pub(crate) fn set_fill(&mut self, fill: FillStyle) {
        self.state.fill = fill.normalized();
    }

    pub(crate) fn save(&mut self) {
        let mut next = self.state.clone();
        next.clip_layers = 0;
        self.saved.push(std::mem::replace(&mut self.state, next));
    }

    /// Undo everything since the matching [`Surface::save`]. Without one this does nothing.
    pub(crate) fn restore(&mut self) {
        let Some(prev) = self.saved.pop() else {
            return;
        };
        for _ in 0..self.state.clip_layers {
            self.ctx.pop_layer();
        }
        self.state = prev;
    }

    /// Run `f` between a save and a restore. The restore also happens when `f` fails.
    pub(crate) fn with_saved<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> CanvasResult<T>,
    ) -> CanvasResult<T> {
        self.save();
        let out = f(self);
        self.restore();
        out
    }

    /// Intersect the clip region with a circle in canvas coordinates.
    pub(crate) fn clip_circle(&mut self, center: Point, radius: f64) {
        let path = bezpath_to_cpu(&kurbo::Circle::new(center, radius.max(0.0)).to_path(PATH_TOLERANCE));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.push_clip_layer(&path);
        self.state.clip_layers += 1;
    }

    /// Draw `image` stretched to fill `dest`.
    pub(crate) fn draw_image(&mut self, image: &LoadedImage, dest: Rect) {
        let (iw, ih) = (f64::from(image.width()), f64::from(image.height()));
        if iw == 0.0 || ih == 0.0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
            return;
        }
        let transform = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / iw, dest.height() / ih);

        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(image.paint().clone());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
    }

    /// Fill `rect` with the current fill style.
    pub(crate) fn fill_rect(&mut self, rect: Rect) {
        self.apply_fill(Affine::IDENTITY);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1));
    }

    pub(crate) fn fill_rounded_rect(&mut self, rect: Rect, radius: f64) {
        if radius <= 0.0 {
            return self.fill_rect(rect);
        }
        let path = bezpath_to_cpu(&rect.to_rounded_rect(radius).to_path(PATH_TOLERANCE));
        self.apply_fill(Affine::IDENTITY);
        self.ctx.fill_path(&path);
    }

    pub(crate) fn stroke_rounded_rect(&mut self, rect: Rect, radius: f64, color: Rgba8, width: f64) {
        let path = bezpath_to_cpu(&rect.to_rounded_rect(radius.max(0.0)).to_path(PATH_TOLERANCE));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color.to_cpu());
        self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        self.ctx.stroke_path(&path);
    }

    /// Fill a shaped line whose baseline starts at `origin`, squeezed horizontally by `scale_x`.
    pub(crate) fn fill_glyphs(&mut self, line: &ShapedLine, origin: Point, scale_x: f64) {
        self.apply_fill(glyph_transform(origin, scale_x));
        self.ctx
            .glyph_run(&line.font)
            .font_size(line.font_size)
            .fill_glyphs(cpu_glyphs(line));
    }

    pub(crate) fn stroke_glyphs(
        &mut self,
        line: &ShapedLine,
        origin: Point,
        scale_x: f64,
        color: Rgba8,
        width: f64,
    ) {
        self.ctx
            .set_transform(affine_to_cpu(glyph_transform(origin, scale_x)));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color.to_cpu());
        self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        self.ctx
            .glyph_run(&line.font)
            .font_size(line.font_size)
            .stroke_glyphs(cpu_glyphs(line));
    }

    /// Close any open clip layers and rasterize into a premultiplied RGBA8 frame.
    pub(crate) fn finish(mut self) -> FrameRGBA {
        while !self.saved.is_empty() {
            self.restore();
        }
        for _ in 0..self.state.clip_layers {
            self.ctx.pop_layer();
        }

        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    /// Install `transform` and the current fill as paint. Gradients stay in canvas coordinates.
    fn apply_fill(&mut self, transform: Affine) {
        let transform = affine_to_cpu(transform);
        self.ctx.set_transform(transform);
        match &self.state.fill {
            FillStyle::Solid(c) => {
                self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                self.ctx.set_paint(c.to_cpu());
            }
            FillStyle::Gradient(g) => {
                self.ctx.set_paint_transform(transform.inverse());
                self.ctx.set_paint(gradient_to_cpu(g));
            }
        }
    }
}

fn glyph_transform(origin: Point, scale_x: f64) -> Affine {
    Affine::translate(origin.to_vec2()) * Affine::scale_non_uniform(scale_x, 1.0)
}

fn cpu_glyphs(line: &ShapedLine) -> impl Iterator<Item = vello_cpu::Glyph> + '_ {
    line.glyphs.iter().map(|g| vello_cpu::Glyph {
        id: g.id,
        x: g.x,
        y: g.y,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
