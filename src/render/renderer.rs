use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use rayon::prelude::*;

use crate::{
    assets::{
        cache::{CachePolicy, ImageCache},
        fetch::{DefaultFetcher, ImageFetcher},
    },
    config::model::{Element, RenderConfig, RequiredFont},
    foundation::{
        core::{FrameRGBA, Rgba8},
        error::{CanvasError, CanvasResult},
    },
    render::{
        elements::{LoadedImages, draw_background, draw_element},
        encode::encode_png,
        surface::Surface,
    },
    style::paint::FillStyle,
    text::fonts::{FontRegistry, Registration},
};

#[derive(Clone, Debug, Default)]
/// Per-renderer settings.
pub struct RendererOpts {
    /// Image cache bounds.
    pub cache: CachePolicy,
    /// Size of the image loading pool. `None` uses rayon's default.
    pub load_threads: Option<usize>,
    /// Color the surface is cleared to before painting. `None` is transparent.
    pub clear_rgba: Option<[u8; 4]>,
    /// Base directory for relative font and image paths.
    pub assets_root: Option<PathBuf>,
}

impl RendererOpts {
    /// Replace the cache policy.
    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    /// Set the image loading pool size.
    pub fn with_load_threads(mut self, threads: usize) -> Self {
        self.load_threads = Some(threads);
        self
    }

    /// Set the surface clear color (straight RGBA).
    pub fn with_clear_rgba(mut self, rgba: [u8; 4]) -> Self {
        self.clear_rgba = Some(rgba);
        self
    }

    /// Resolve relative font and image paths against `root`.
    pub fn with_assets_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets_root = Some(root.into());
        self
    }
}

#[derive(Clone, Copy, Debug)]
enum ImageRole {
    Background,
    Avatar,
}

impl ImageRole {
    fn wrap(self, url: &str, err: CanvasError) -> CanvasError {
        match self {
            Self::Background => CanvasError::background_load(url, err),
            Self::Avatar => CanvasError::avatar_load(url, err),
        }
    }
}

/// Renders [`RenderConfig`]s to PNG.
///
/// A renderer owns its image cache and font registry, so repeated calls reuse decoded images and
/// registered fonts. It is `Sync`; share one instance between threads instead of building many.
pub struct Renderer {
    opts: RendererOpts,
    cache: ImageCache,
    fonts: Mutex<FontRegistry>,
    fetcher: Box<dyn ImageFetcher>,
    pool: rayon::ThreadPool,
}

impl Renderer {
    /// Renderer with default options and the [`DefaultFetcher`].
    pub fn new() -> CanvasResult<Self> {
        Self::with_opts(RendererOpts::default())
    }

    /// Renderer with `opts` and a [`DefaultFetcher`] rooted at `opts.assets_root`.
    pub fn with_opts(opts: RendererOpts) -> CanvasResult<Self> {
        let fetcher = match &opts.assets_root {
            Some(root) => DefaultFetcher::with_root(root),
            None => DefaultFetcher::new(),
        };
        Self::with_fetcher(opts, fetcher)
    }

    /// Renderer loading image bytes through a custom fetcher.
    pub fn with_fetcher(
        opts: RendererOpts,
        fetcher: impl ImageFetcher + 'static,
    ) -> CanvasResult<Self> {
        let pool = build_thread_pool(opts.load_threads)?;
        Ok(Self {
            cache: ImageCache::new(opts.cache),
            fonts: Mutex::new(FontRegistry::new()),
            fetcher: Box::new(fetcher),
            pool,
            opts,
        })
    }

    /// Options this renderer was built with.
    pub fn opts(&self) -> &RendererOpts {
        &self.opts
    }

    /// The image cache shared by every call on this renderer.
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Logical names of the fonts registered so far.
    pub fn registered_fonts(&self) -> Vec<String> {
        self.lock_fonts().names().map(str::to_string).collect()
    }

    /// Render `config` and encode the result as PNG.
    ///
    /// The first failure aborts the call; no partial image is returned.
    #[tracing::instrument(
        skip_all,
        fields(width = config.width, height = config.height, elements = config.elements.len())
    )]
    pub fn generate(&self, config: &RenderConfig) -> CanvasResult<Vec<u8>> {
        let frame = self.render_rgba(config)?;
        encode_png(&frame)
    }

    /// Render `config` to premultiplied RGBA8 pixels.
    pub fn render_rgba(&self, config: &RenderConfig) -> CanvasResult<FrameRGBA> {
        let elements = config.resolved_elements();
        config.validate_resolved(&elements)?;

        self.register_fonts(&config.required_fonts)?;

        let images = self.load_images(config.background.as_deref(), &elements)?;

        let clear = self
            .opts
            .clear_rgba
            .map(|[r, g, b, a]| Rgba8::new(r, g, b, a))
            .unwrap_or(Rgba8::TRANSPARENT);
        let mut surface = Surface::new(config.width, config.height, clear)?;
        if let Some(font) = &config.global_font {
            surface.set_font(font.clone());
        }
        if let Some(color) = config.global_color {
            surface.set_fill(FillStyle::Solid(color.rgba8()));
        }

        if let Some(bg) = &config.background {
            let image = images.get(bg).ok_or_else(|| {
                CanvasError::background_load(
                    bg,
                    CanvasError::validation("image was not loaded before drawing"),
                )
            })?;
            draw_background(&mut surface, image);
        }

        let mut fonts = self.lock_fonts();
        for element in &elements {
            draw_element(&mut surface, &mut fonts, &images, element)?;
        }
        drop(fonts);

        debug_assert_eq!(surface.depth(), 0);
        Ok(surface.finish())
    }

    fn register_fonts(&self, required: &[RequiredFont]) -> CanvasResult<()> {
        if required.is_empty() {
            return Ok(());
        }
        let mut fonts = self.lock_fonts();
        for font in required {
            let path = self.resolve_asset_path(&font.path);
            match fonts.register(&path, &font.font_name) {
                Ok(Registration::Added | Registration::AlreadyPresent) => {}
                Err(e) => {
                    tracing::error!(
                        name = %font.font_name,
                        path = %path.display(),
                        error = %e,
                        "font registration failed"
                    );
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn load_images(
        &self,
        background: Option<&str>,
        elements: &[Element],
    ) -> CanvasResult<LoadedImages> {
        let mut seen = HashSet::new();
        let mut wanted = Vec::new();
        let candidates = background
            .map(|bg| (bg, ImageRole::Background))
            .into_iter()
            .chain(
                elements
                    .iter()
                    .filter_map(|e| e.image_url().map(|url| (url, ImageRole::Avatar))),
            );
        for (url, role) in candidates {
            if seen.insert(url) {
                wanted.push((url, role));
            }
        }

        let cache = &self.cache;
        let fetcher = self.fetcher.as_ref();
        let loaded: Vec<CanvasResult<_>> = self.pool.install(|| {
            wanted
                .par_iter()
                .map(|&(url, role)| {
                    cache
                        .get_or_load(url, fetcher)
                        .map(|image| (url.to_string(), image))
                        .map_err(|e| {
                            tracing::error!(url, ?role, error = %e, "image load failed");
                            role.wrap(url, e)
                        })
                })
                .collect()
        });

        loaded.into_iter().collect()
    }

    fn resolve_asset_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        match &self.opts.assets_root {
            Some(root) if p.is_relative() => root.join(p),
            _ => p.to_path_buf(),
        }
    }

    fn lock_fonts(&self) -> MutexGuard<'_, FontRegistry> {
        self.fonts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn build_thread_pool(threads: Option<usize>) -> CanvasResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(CanvasError::validation(
            "renderer load_threads must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CanvasError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
