use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::model::{Element, ImageSpec, ProgressBarSpec, TextSpec};

/// Legacy element description: a position plus optional per-kind sub-specs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    /// Left edge (or text start).
    pub x: f64,
    /// Top edge (or text baseline).
    pub y: f64,
    /// Image sub-spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSpec>,
    /// Text sub-spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextSpec>,
    /// Progress bar sub-spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_bar: Option<ProgressBarSpec>,
}

/// A group of element specs keyed by name.
///
/// The name selects the kind: names containing `avatar` draw the image sub-spec, names containing
/// `text` draw the text sub-spec and names containing `progress` draw the progress bar. The checks
/// are independent, so one entry can produce several elements. Entries are expanded in key order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementMap(pub BTreeMap<String, ElementSpec>);

impl ElementMap {
    /// Empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry `name`.
    pub fn insert(&mut self, name: impl Into<String>, spec: ElementSpec) -> &mut Self {
        self.0.insert(name.into(), spec);
        self
    }

    /// Expand into typed elements in paint order.
    pub fn to_elements(&self) -> Vec<Element> {
        let mut out = Vec::new();
        for (name, spec) in &self.0 {
            if name.contains("avatar")
                && let Some(image) = &spec.image
            {
                out.push(Element::Avatar {
                    x: spec.x,
                    y: spec.y,
                    image: image.clone(),
                });
            }
            if name.contains("text")
                && let Some(text) = &spec.text
            {
                out.push(Element::Text {
                    x: spec.x,
                    y: spec.y,
                    text: text.clone(),
                });
            }
            if name.contains("progress")
                && let Some(progress_bar) = &spec.progress_bar
            {
                out.push(Element::ProgressBar {
                    x: spec.x,
                    y: spec.y,
                    progress_bar: progress_bar.clone(),
                });
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/keyed.rs"]
mod tests;
