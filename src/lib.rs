//! ayo-canvas composes images declaratively and encodes them as PNG.
//!
//! One [`RenderConfig`] describes the whole picture:
//!
//! - a background image stretched over the canvas
//! - avatars, optionally clipped to a circle
//! - text with solid or gradient fills and an optional outline
//! - progress bars
//!
//! A [`Renderer`] owns the image cache and the registered fonts, so repeated calls reuse both.
//! Rasterization runs on the CPU through `vello_cpu`, and text is shaped with `parley`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod foundation;
mod render;
mod style;
mod text;

pub use crate::assets::cache::{CachePolicy, ImageCache, LoadedImage};
pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::fetch::{DefaultFetcher, ImageFetcher};
pub use crate::config::dsl::{
    RenderConfigBuilder, image_spec, progress_bar_spec, rounded_image_spec, text_spec,
};
pub use crate::config::keyed::{ElementMap, ElementSpec};
pub use crate::config::model::{
    Element, ElementEntry, ImageSpec, ProgressBarSpec, RenderConfig, RequiredFont, TextSpec,
};
pub use crate::foundation::core::{FrameRGBA, MAX_SURFACE_DIM, Point, Rect, Rgba8};
pub use crate::foundation::error::{CanvasError, CanvasResult};
pub use crate::render::encode::encode_png;
pub use crate::render::renderer::{Renderer, RendererOpts};
pub use crate::style::color::CssColor;
pub use crate::style::font::{FontSlant, FontSpec};
pub use crate::style::paint::{ColorStop, FillStyle, Gradient, GradientKind};
pub use crate::text::fonts::{FontRegistry, RegisteredFont, Registration};
