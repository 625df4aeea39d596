use serde::{Deserialize, Serialize};

use crate::{
    foundation::{
        core::Rgba8,
        error::{CanvasError, CanvasResult},
    },
    style::color::CssColor,
};

/// One `(offset, color)` transition point along a gradient.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f32,
    /// Color at `offset`.
    pub color: CssColor,
}

/// Gradient geometry kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    /// Linear from `(x0, y0)` to `(x1, y1)`.
    #[default]
    Linear,
    /// Two-point radial between circles at `(x0, y0, r0)` and `(x1, y1, r1)`.
    Radial,
}

/// Gradient fill expressed in canvas coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    /// Start x.
    pub x0: f64,
    /// Start y.
    pub y0: f64,
    /// End x.
    pub x1: f64,
    /// End y.
    pub y1: f64,
    /// Stops in ascending order.
    #[serde(default)]
    pub color_stops: Vec<ColorStop>,
    /// Geometry kind.
    #[serde(default, rename = "type")]
    pub kind: GradientKind,
    /// Start radius for radial gradients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r0: Option<f64>,
    /// End radius for radial gradients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r1: Option<f64>,
}

impl Gradient {
    /// Linear gradient with no stops.
    pub fn linear(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            color_stops: Vec::new(),
            kind: GradientKind::Linear,
            r0: None,
            r1: None,
        }
    }

    /// Radial gradient between two circles with no stops.
    pub fn radial(x0: f64, y0: f64, r0: f64, x1: f64, y1: f64, r1: f64) -> Self {
        Self {
            kind: GradientKind::Radial,
            r0: Some(r0),
            r1: Some(r1),
            ..Self::linear(x0, y0, x1, y1)
        }
    }

    /// Append a color stop.
    pub fn with_stop(mut self, offset: f32, color: impl Into<CssColor>) -> Self {
        self.color_stops.push(ColorStop {
            offset,
            color: color.into(),
        });
        self
    }

    /// Check coordinates, offsets and radii.
    pub fn validate(&self) -> CanvasResult<()> {
        for v in [self.x0, self.y0, self.x1, self.y1] {
            if !v.is_finite() {
                return Err(CanvasError::validation(
                    "gradient coordinates must be finite",
                ));
            }
        }
        let mut last = 0.0f32;
        for stop in &self.color_stops {
            if !stop.offset.is_finite() || !(0.0..=1.0).contains(&stop.offset) {
                return Err(CanvasError::validation(format!(
                    "gradient stop offset {} is outside [0, 1]",
                    stop.offset
                )));
            }
            if stop.offset < last {
                return Err(CanvasError::validation(
                    "gradient stop offsets must be ascending",
                ));
            }
            last = stop.offset;
        }
        if self.kind == GradientKind::Radial {
            let r1 = self.r1.ok_or_else(|| {
                CanvasError::validation("radial gradient requires an end radius 'r1'")
            })?;
            let r0 = self.r0.unwrap_or(0.0);
            if !r0.is_finite() || !r1.is_finite() || r0 < 0.0 || r1 < 0.0 {
                return Err(CanvasError::validation(
                    "radial gradient radii must be finite and >= 0",
                ));
            }
        }
        Ok(())
    }
}

/// The paint used by fill operations.
#[derive(Clone, Debug, PartialEq)]
pub enum FillStyle {
    /// Uniform color.
    Solid(Rgba8),
    /// Gradient in canvas coordinates.
    Gradient(Gradient),
}

impl Default for FillStyle {
    fn default() -> Self {
        Self::Solid(Rgba8::BLACK)
    }
}

impl FillStyle {
    /// Reduce degenerate gradients the way canvas does: no stops paints nothing and a single stop
    /// paints that stop's color everywhere.
    pub(crate) fn normalized(self) -> Self {
        match self {
            Self::Gradient(g) if g.color_stops.is_empty() => Self::Solid(Rgba8::TRANSPARENT),
            Self::Gradient(g) if g.color_stops.len() == 1 => Self::Solid(g.color_stops[0].color.0),
            other => other,
        }
    }
}

pub(crate) fn gradient_to_cpu(g: &Gradient) -> vello_cpu::peniko::Gradient {
    let start = vello_cpu::kurbo::Point::new(g.x0, g.y0);
    let end = vello_cpu::kurbo::Point::new(g.x1, g.y1);
    let base = match g.kind {
        GradientKind::Linear => vello_cpu::peniko::Gradient::new_linear(start, end),
        GradientKind::Radial => vello_cpu::peniko::Gradient::new_two_point_radial(
            start,
            g.r0.unwrap_or(0.0) as f32,
            end,
            g.r1.unwrap_or(0.0) as f32,
        ),
    };
    let stops: Vec<vello_cpu::peniko::ColorStop> = g
        .color_stops
        .iter()
        .map(|s| vello_cpu::peniko::ColorStop::from((s.offset, s.color.0.to_cpu())))
        .collect();
    base.with_stops(stops.as_slice())
}

#[cfg(test)]
#[path = "../../tests/unit/style/paint.rs"]
mod tests;
