use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};

use crate::{
    foundation::error::{CanvasError, CanvasResult},
    style::font::FontSpec,
};

#[derive(Clone)]
/// A font file registered under a logical name.
pub struct RegisteredFont {
    name: String,
    path: PathBuf,
    family: String,
    shaping_family: String,
    data: vello_cpu::peniko::FontData,
}

impl RegisteredFont {
    /// Logical name as given at registration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the font was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Family name reported by the font file itself.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Family this file was registered under in the Parley collection. Unique per logical name,
    /// so shaping always picks this file even when another one shares its embedded family.
    pub(crate) fn shaping_family(&self) -> &str {
        &self.shaping_family
    }

    pub(crate) fn data(&self) -> &vello_cpu::peniko::FontData {
        &self.data
    }
}

impl fmt::Debug for RegisteredFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredFont")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Outcome of [`FontRegistry::register`].
pub enum Registration {
    /// The font file was read and registered.
    Added,
    /// The logical name was already registered from the same path.
    AlreadyPresent,
}

/// Fonts available to text elements, keyed by case-insensitive logical name.
///
/// Owns the Parley font and layout contexts used for shaping. Registering a name twice from the
/// same path is a no-op, so one registry can serve many render calls.
pub struct FontRegistry {
    pub(super) font_ctx: parley::FontContext,
    pub(super) layout_ctx: parley::LayoutContext<()>,
    fonts: HashMap<String, RegisteredFont>,
    order: Vec<String>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    /// Empty registry with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            fonts: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Number of registered logical names.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether no fonts are registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Look up a registration by logical name.
    pub fn get(&self, name: &str) -> Option<&RegisteredFont> {
        self.fonts.get(&name_key(name))
    }

    /// Logical names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter_map(|k| self.fonts.get(k))
            .map(RegisteredFont::name)
    }

    /// Register the font file at `path` under the logical `name`.
    ///
    /// Re-registering a name from the same path returns [`Registration::AlreadyPresent`];
    /// from a different path it fails with [`CanvasError::FontRegistration`].
    pub fn register(&mut self, path: impl AsRef<Path>, name: &str) -> CanvasResult<Registration> {
        let path = path.as_ref();
        let fail = |cause: anyhow::Error| {
            CanvasError::font_registration(name, path.display().to_string(), cause)
        };

        let key = name_key(name);
        if key.is_empty() {
            return Err(fail(anyhow!("font name must be non-empty")));
        }
        if let Some(existing) = self.fonts.get(&key) {
            if existing.path == path {
                tracing::debug!(name, path = %path.display(), "font already registered");
                return Ok(Registration::AlreadyPresent);
            }
            return Err(fail(anyhow!(
                "'{}' is already registered from '{}'",
                existing.name,
                existing.path.display()
            )));
        }

        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))
            .map_err(fail)?;

        let family = embedded_family_name(&bytes)
            .ok_or_else(|| fail(anyhow!("no font family name found in file")))?;
        let shaping_family = format!("ayo-canvas:{key}");
        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(bytes.clone()),
            Some(parley::fontique::FontInfoOverride {
                family_name: Some(shaping_family.as_str()),
                ..Default::default()
            }),
        );
        if families.is_empty() {
            return Err(fail(anyhow!("no font families found in file")));
        }

        tracing::debug!(name, family = %family, path = %path.display(), "font registered");
        self.fonts.insert(
            key.clone(),
            RegisteredFont {
                name: name.trim().to_string(),
                path: path.to_path_buf(),
                family,
                shaping_family,
                data: vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(bytes),
                    0,
                ),
            },
        );
        self.order.push(key);
        Ok(Registration::Added)
    }

    /// Pick the registered font for `font`.
    ///
    /// Families are tried in order, first by logical name and then by the family name embedded
    /// in the file. When nothing matches, the first registered font is used.
    pub fn resolve(&self, font: &FontSpec) -> CanvasResult<&RegisteredFont> {
        for family in &font.families {
            if let Some(f) = self.fonts.get(&name_key(family)) {
                return Ok(f);
            }
        }
        for family in &font.families {
            let by_family = self
                .order
                .iter()
                .filter_map(|k| self.fonts.get(k))
                .find(|f| f.family.eq_ignore_ascii_case(family.trim()));
            if let Some(f) = by_family {
                return Ok(f);
            }
        }
        self.order
            .first()
            .and_then(|k| self.fonts.get(k))
            .ok_or_else(|| {
                CanvasError::text(format!("no fonts registered; cannot draw with font '{font}'"))
            })
    }
}

fn embedded_family_name(bytes: &[u8]) -> Option<String> {
    use parley::swash::StringId;

    let font = parley::swash::FontRef::from_index(bytes, 0)?;
    let strings = font.localized_strings();
    strings
        .find_by_id(StringId::TypographicFamily, None)
        .or_else(|| strings.find_by_id(StringId::Family, None))
        .map(|s| s.to_string())
        .filter(|s| !s.trim().is_empty())
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
