use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::cache::LoadedImage,
    config::model::{Element, ImageSpec, ProgressBarSpec, TextSpec},
    foundation::{
        core::{Point, Rect},
        error::{CanvasError, CanvasResult},
    },
    render::surface::Surface,
    style::paint::FillStyle,
    text::fonts::FontRegistry,
};

/// Images loaded for one render call, keyed by reference.
pub(crate) type LoadedImages = HashMap<String, Arc<LoadedImage>>;

/// Stretch the background over the whole surface.
pub(crate) fn draw_background(surface: &mut Surface, image: &LoadedImage) {
    let full = Rect::new(
        0.0,
        0.0,
        f64::from(surface.width()),
        f64::from(surface.height()),
    );
    surface.draw_image(image, full);
}

pub(crate) fn draw_element(
    surface: &mut Surface,
    fonts: &mut FontRegistry,
    images: &LoadedImages,
    element: &Element,
) -> CanvasResult<()> {
    match element {
        Element::Avatar { x, y, image } => {
            let loaded = images.get(&image.url).ok_or_else(|| {
                CanvasError::avatar_load(
                    &image.url,
                    CanvasError::validation("image was not loaded before drawing"),
                )
            })?;
            draw_avatar(surface, loaded, *x, *y, image)
        }
        Element::Text { x, y, text } => draw_text(surface, fonts, *x, *y, text),
        Element::ProgressBar { x, y, progress_bar } => {
            draw_progress_bar(surface, *x, *y, progress_bar)
        }
    }
}

fn draw_avatar(
    surface: &mut Surface,
    image: &LoadedImage,
    x: f64,
    y: f64,
    spec: &ImageSpec,
) -> CanvasResult<()> {
    surface.with_saved(|s| {
        if spec.is_rounded {
            // Radius follows the box height, also for non-square boxes.
            let center = Point::new(x + spec.width / 2.0, y + spec.height / 2.0);
            s.clip_circle(center, spec.height / 2.0);
        }
        s.draw_image(image, Rect::new(x, y, x + spec.width, y + spec.height));
        Ok(())
    })
}

fn draw_text(
    surface: &mut Surface,
    fonts: &mut FontRegistry,
    x: f64,
    y: f64,
    spec: &TextSpec,
) -> CanvasResult<()> {
    surface.with_saved(|s| {
        if let Some(font) = &spec.font {
            s.set_font(font.clone());
        }
        if let Some(color) = spec.color {
            s.set_fill(FillStyle::Solid(color.rgba8()));
        }
        if let Some(gradient) = &spec.gradient {
            s.set_fill(FillStyle::Gradient(gradient.clone()));
        }

        let line = fonts.shape_line(&spec.value, &s.state().font)?;
        let scale_x = match spec.max_width {
            Some(max) if max <= 0.0 => return Ok(()),
            Some(max) if line.width > max => max / line.width,
            _ => 1.0,
        };

        let origin = Point::new(x, y);
        s.fill_glyphs(&line, origin, scale_x);
        if let Some(stroke) = spec.stroke {
            s.stroke_glyphs(&line, origin, scale_x, stroke.rgba8(), spec.stroke_width);
        }
        Ok(())
    })
}

fn draw_progress_bar(
    surface: &mut Surface,
    x: f64,
    y: f64,
    spec: &ProgressBarSpec,
) -> CanvasResult<()> {
    surface.with_saved(|s| {
        let radius = if spec.is_round { spec.height / 2.0 } else { 0.0 };
        let track = Rect::new(x, y, x + spec.width, y + spec.height);

        if let Some(color) = spec.track_color {
            s.set_fill(FillStyle::Solid(color.rgba8()));
            s.fill_rounded_rect(track, radius);
        }

        let progress = spec.progress.clamp(0.0, 1.0);
        if progress > 0.0 {
            let fill = match &spec.gradient {
                Some(g) => FillStyle::Gradient(g.clone()),
                None => FillStyle::Solid(spec.color.rgba8()),
            };
            s.set_fill(fill);
            let filled = Rect::new(x, y, x + spec.width * progress, y + spec.height);
            s.fill_rounded_rect(filled, radius.min(filled.width() / 2.0));
        }

        if let Some(color) = spec.stroke {
            s.stroke_rounded_rect(track, radius, color.rgba8(), 1.0);
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/elements.rs"]
mod tests;
