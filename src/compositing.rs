//! Per-layer compositing: blend operators, the image filter pipeline and the
//! erase-mask scaling contract.
//!
//! An image or line layer may own any number of erase-mask lines. Masks
//! store their points in the host's local space together with the host size
//! at creation time; when the host is later resized the mask is stretched by
//! `current / original` per axis and its stroke width by the mean of the two
//! factors. Erasing is idempotent, so mask order never matters.

use egui::{Pos2, Vec2, pos2, vec2};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::layer::{LayerId, LayerKind};

/// Compositing operator of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    /// Destination-out: removes already painted pixels.
    Erase,
}

impl BlendMode {
    /// Canvas-style composite operation name.
    pub fn composite_operation(&self) -> &'static str {
        match self {
            BlendMode::Normal => "source-over",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
            BlendMode::Erase => "destination-out",
        }
    }
}

/// Image filter attributes. Every field at its default means "no filter".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// -1.0 ..= 1.0
    pub brightness: f32,
    /// -100.0 ..= 100.0
    pub contrast: f32,
    pub blur_radius: f32,
    /// 0.0 ..= 1.0
    pub noise: f32,
    /// Pixelation block size; values above 1 are active.
    pub pixel_size: f32,
    pub grayscale: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            blur_radius: 0.0,
            noise: 0.0,
            pixel_size: 1.0,
            grayscale: false,
        }
    }
}

/// One step of the filter pipeline handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Brightness(f32),
    Contrast(f32),
    Blur(f32),
    Noise(f32),
    Pixelate(f32),
    Grayscale,
}

impl Filters {
    /// Active filters in application order; defaults are skipped.
    pub fn pipeline(&self) -> Vec<FilterOp> {
        let mut ops = Vec::new();
        if self.brightness != 0.0 {
            ops.push(FilterOp::Brightness(self.brightness));
        }
        if self.contrast != 0.0 {
            ops.push(FilterOp::Contrast(self.contrast));
        }
        if self.blur_radius > 0.0 {
            ops.push(FilterOp::Blur(self.blur_radius));
        }
        if self.noise > 0.0 {
            ops.push(FilterOp::Noise(self.noise));
        }
        if self.pixel_size > 1.0 {
            ops.push(FilterOp::Pixelate(self.pixel_size));
        }
        if self.grayscale {
            ops.push(FilterOp::Grayscale);
        }
        ops
    }

    pub fn is_identity(&self) -> bool {
        self.pipeline().is_empty()
    }
}

/// Per-axis factor mapping a mask from its original host size to the
/// current one. Missing or degenerate dimensions yield `(1, 1)`.
pub fn mask_scale(original: Option<Vec2>, current: Option<Vec2>) -> Vec2 {
    match (original, current) {
        (Some(original), Some(current)) if original.x > 0.0 && original.y > 0.0 => {
            vec2(current.x / original.x, current.y / original.y)
        }
        (Some(original), Some(_)) => {
            warn!("Erase mask has degenerate original size {:?}; drawing unscaled", original);
            Vec2::splat(1.0)
        }
        _ => Vec2::splat(1.0),
    }
}

pub fn scale_mask_points(points: &[Pos2], scale: Vec2) -> Vec<Pos2> {
    points.iter().map(|p| pos2(p.x * scale.x, p.y * scale.y)).collect()
}

pub fn scale_mask_width(width: f32, scale: Vec2) -> f32 {
    width * (scale.x + scale.y) / 2.0
}

/// An erase mask ready to be drawn with destination-out over its host.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMask {
    pub id: LayerId,
    /// In the host's local space, already rescaled.
    pub points: Vec<Pos2>,
    pub stroke_width: f32,
}

/// All visible erase masks owned by `host`, rescaled to its current size.
pub fn resolve_masks(document: &Document, host: LayerId) -> Vec<ResolvedMask> {
    let Some(host_layer) = document.get(host) else {
        return Vec::new();
    };
    let current = host_layer.mask_host_size();
    document
        .children(Some(host))
        .filter(|layer| layer.visible && layer.is_erase_mask())
        .filter_map(|layer| match &layer.kind {
            LayerKind::Line {
                points,
                stroke_width,
                original_parent_size,
                ..
            } => {
                let scale = mask_scale(*original_parent_size, current);
                let offset = vec2(layer.x, layer.y);
                let local: Vec<Pos2> = points.iter().map(|p| *p + offset).collect();
                Some(ResolvedMask {
                    id: layer.id,
                    points: scale_mask_points(&local, scale),
                    stroke_width: scale_mask_width(*stroke_width, scale),
                })
            }
            _ => None,
        })
        .collect()
}
