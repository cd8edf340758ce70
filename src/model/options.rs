use serde::{Deserialize, Serialize};

use crate::foundation::color::Rgba8;
use crate::foundation::error::{GifcaptionError, GifcaptionResult};

/// Speeds closer to zero than this are treated as `1.0`.
pub const SPEED_EPSILON: f64 = 0.001;
/// Exclusive upper bound for `crop_top + crop_bottom` and `crop_left + crop_right`.
pub const MAX_CROP_SUM: f64 = 0.95;
/// Scale multipliers below this floor mean "no scaling".
pub const MIN_SCALE: f64 = 0.1;
/// Maximum scaling per axis; the area multiplier is bounded by its square.
pub const MAX_SCALING: f64 = 3.0;
/// Upper bound for `scale_width * scale_height`.
pub const MAX_AREA_MULTIPLIER: f64 = MAX_SCALING * MAX_SCALING;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Where the caption box goes relative to the frame content.
pub enum Placement {
    /// Extend the canvas upwards and draw the caption above the content.
    #[default]
    Above,
    /// Overlay at the top edge.
    Top,
    /// Overlay, vertically centered.
    Middle,
    /// Overlay at the bottom edge.
    Bottom,
    /// Extend the canvas downwards and draw the caption below the content.
    Below,
}

impl Placement {
    /// All placements in their conventional ordinal order.
    pub const ALL: [Placement; 5] = [
        Placement::Above,
        Placement::Top,
        Placement::Middle,
        Placement::Bottom,
        Placement::Below,
    ];

    /// `true` for placements drawn on top of frame content instead of beside it.
    pub fn is_overlay(self) -> bool {
        match self {
            Placement::Top | Placement::Middle | Placement::Bottom => true,
            Placement::Above | Placement::Below => false,
        }
    }

    /// Lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Above => "above",
            Placement::Top => "top",
            Placement::Middle => "middle",
            Placement::Bottom => "bottom",
            Placement::Below => "below",
        }
    }
}

impl std::str::FromStr for Placement {
    type Err = String;

    /// Accepts a case-insensitive name or an ordinal `0..=4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<usize>() {
            return Placement::ALL
                .get(ordinal)
                .copied()
                .ok_or_else(|| format!("placement ordinal must be 0..=4, got {ordinal}"));
        }
        Placement::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown placement \"{s}\""))
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Per-invocation configuration for [`crate::transform`].
pub struct Options {
    /// Playback speed multiplier; negative values reverse playback.
    pub speed: f64,
    /// Fraction of the canvas height cut from the top, in `[0, 1)`.
    pub crop_top: f64,
    /// Fraction of the canvas height cut from the bottom, in `[0, 1)`.
    pub crop_bottom: f64,
    /// Fraction of the canvas width cut from the left, in `[0, 1)`.
    pub crop_left: f64,
    /// Fraction of the canvas width cut from the right, in `[0, 1)`.
    pub crop_right: f64,
    /// Fraction of frames trimmed from the start.
    pub start: f64,
    /// Fraction of frames trimmed from the end.
    pub end: f64,
    /// Horizontal scale multiplier.
    pub scale_width: f64,
    /// Vertical scale multiplier.
    pub scale_height: f64,
    /// Caption text; whitespace runs separate words.
    pub caption: String,
    /// Caption placement.
    pub placement: Placement,
    /// Font name; empty selects the cache's default font.
    pub font: String,
    /// Multiplier on the width-derived font size; non-positive means `1.0`.
    pub font_size: f64,
    /// Glyph color; opaque white when unset.
    pub text_color: Option<Rgba8>,
    /// Caption box color for `Above`/`Below`; opaque black when unset.
    pub background_color: Option<Rgba8>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            speed: 1.0,
            crop_top: 0.0,
            crop_bottom: 0.0,
            crop_left: 0.0,
            crop_right: 0.0,
            start: 0.0,
            end: 0.0,
            scale_width: 1.0,
            scale_height: 1.0,
            caption: String::new(),
            placement: Placement::Above,
            font: String::new(),
            font_size: 1.0,
            text_color: None,
            background_color: None,
        }
    }
}

impl Options {
    /// Load options from a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> GifcaptionResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| GifcaptionError::validation(format!("invalid options json: {e}")))
    }

    /// Check every invariant and derive the values the pipeline consumes.
    pub fn normalize(&self) -> GifcaptionResult<NormalizedOptions> {
        let fields = [
            ("speed", self.speed),
            ("crop_top", self.crop_top),
            ("crop_bottom", self.crop_bottom),
            ("crop_left", self.crop_left),
            ("crop_right", self.crop_right),
            ("start", self.start),
            ("end", self.end),
            ("scale_width", self.scale_width),
            ("scale_height", self.scale_height),
            ("font_size", self.font_size),
        ];
        for (name, v) in fields {
            if !v.is_finite() {
                return Err(GifcaptionError::validation(format!(
                    "{name} must be finite"
                )));
            }
        }

        for (name, v) in [
            ("crop_top", self.crop_top),
            ("crop_bottom", self.crop_bottom),
            ("crop_left", self.crop_left),
            ("crop_right", self.crop_right),
        ] {
            if !(0.0..1.0).contains(&v) {
                return Err(GifcaptionError::validation(format!(
                    "{name} must be in [0, 1), got {v}"
                )));
            }
        }
        if self.crop_top + self.crop_bottom >= MAX_CROP_SUM {
            return Err(GifcaptionError::validation(format!(
                "too much vertical crop: crop_top + crop_bottom must be < {MAX_CROP_SUM}"
            )));
        }
        if self.crop_left + self.crop_right >= MAX_CROP_SUM {
            return Err(GifcaptionError::validation(format!(
                "too much horizontal crop: crop_left + crop_right must be < {MAX_CROP_SUM}"
            )));
        }

        for (name, v) in [("start", self.start), ("end", self.end)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(GifcaptionError::validation(format!(
                    "{name} must be in [0, 1], got {v}"
                )));
            }
        }
        if self.start + self.end > 1.0 {
            return Err(GifcaptionError::validation(
                "start and end can't overlap: start + end must be <= 1",
            ));
        }

        let speed = if self.speed.abs() < SPEED_EPSILON {
            1.0
        } else {
            self.speed
        };

        let (scale_width, scale_height) = clamp_scale(self.scale_width, self.scale_height);

        let placement = self.placement;
        let text_color = self.text_color.unwrap_or(Rgba8::WHITE);
        let background_color = if placement.is_overlay() {
            Rgba8::TRANSPARENT
        } else {
            self.background_color.unwrap_or(Rgba8::BLACK)
        };

        Ok(NormalizedOptions {
            speed: speed.abs(),
            reverse: speed < 0.0,
            crop_top: self.crop_top,
            crop_bottom: self.crop_bottom,
            crop_left: self.crop_left,
            crop_right: self.crop_right,
            start: self.start,
            end: self.end,
            scale_width,
            scale_height,
            caption: self.caption.clone(),
            placement,
            font: self.font.clone(),
            font_size: if self.font_size > 0.0 {
                self.font_size
            } else {
                1.0
            },
            text_color,
            background_color,
        })
    }
}

/// Apply the minimum-floor and maximum-area rules to a scale pair.
///
/// Multipliers below [`MIN_SCALE`] become `1.0`. If the product exceeds
/// [`MAX_AREA_MULTIPLIER`], both are divided by the same factor so that their ratio is kept and
/// their product equals the maximum.
pub fn clamp_scale(scale_width: f64, scale_height: f64) -> (f64, f64) {
    let mut w = if scale_width < MIN_SCALE {
        1.0
    } else {
        scale_width
    };
    let mut h = if scale_height < MIN_SCALE {
        1.0
    } else {
        scale_height
    };

    let area = w * h;
    if area > MAX_AREA_MULTIPLIER {
        let factor = (area / MAX_AREA_MULTIPLIER).sqrt();
        w /= factor;
        h /= factor;
    }
    (w, h)
}

#[derive(Clone, Debug, PartialEq)]
/// Validated options with speed, scale and colors resolved.
pub struct NormalizedOptions {
    /// Absolute speed multiplier, never zero.
    pub speed: f64,
    /// Visit frames in reverse order.
    pub reverse: bool,
    /// See [`Options::crop_top`].
    pub crop_top: f64,
    /// See [`Options::crop_bottom`].
    pub crop_bottom: f64,
    /// See [`Options::crop_left`].
    pub crop_left: f64,
    /// See [`Options::crop_right`].
    pub crop_right: f64,
    /// See [`Options::start`].
    pub start: f64,
    /// See [`Options::end`].
    pub end: f64,
    /// Clamped horizontal scale.
    pub scale_width: f64,
    /// Clamped vertical scale.
    pub scale_height: f64,
    /// Caption text.
    pub caption: String,
    /// Caption placement.
    pub placement: Placement,
    /// Requested font name.
    pub font: String,
    /// Font size multiplier, always positive.
    pub font_size: f64,
    /// Resolved glyph color.
    pub text_color: Rgba8,
    /// Resolved caption box color (transparent for overlays).
    pub background_color: Rgba8,
}

#[cfg(test)]
#[path = "../../tests/unit/model/options.rs"]
mod tests;
