use crate::glyphs::{ink_mask, normalize, GlyphTemplates};
use crate::render::TILE_INSET;
use crate::tiles::{Letter, Tile};
use image::imageops::{resize, FilterType};
use image::math::Rect;
use image::{GenericImageView, GrayImage, Luma};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};
use log::trace;
use std::borrow::Cow;

/// Side of a canonical cell in pixels. Cells are rescaled to this size before
/// they are classified.
pub const CELL: u32 = 40;

/// Border that is ignored when looking at a cell, so grid lines are never
/// mistaken for ink.
pub const MARGIN: u32 = 4;

/// The corner of a tile that carries the blank marker, in canonical cell pixels.
pub const MARKER: Rect = Rect {
    x: 31,
    y: 3,
    width: 5,
    height: 5,
};

/// Slack around [MARKER] for a marker that is a little off after rectification.
const MARKER_SLACK: u32 = 2;

/// Where to look for the blank marker: [MARKER] grown by [MARKER_SLACK], but clear of
/// the tile edge, where grid lines or the rack bar may show.
fn marker_area() -> Rect {
    let x = MARKER.x - MARKER_SLACK;
    let y = MARKER.y.saturating_sub(MARKER_SLACK).max(TILE_INSET + 1);
    Rect {
        x,
        y,
        width: (MARKER.x + MARKER.width + MARKER_SLACK).min(CELL - TILE_INSET - 1) - x,
        height: MARKER.y + MARKER.height + MARKER_SLACK - y,
    }
}

/// Distance in tone from the tile threshold at which a tone decision gets full confidence.
const TONE_MARGIN: f32 = 0.05;

/// Scores closer than this are considered a tie.
const TIE_EPSILON: f32 = 1e-4;

/// What a cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// No tile
    Empty,
    /// A tile with a letter; `blank` is set when the blank marker is visible
    Tile(Tile),
    /// An unplayed blank tile (only valid on the rack)
    Blank,
}

/// The result of classifying one cell: the best guess and how sure we are of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub glyph: Glyph,
    /// 0 (no idea) ..= 1 (exact match)
    pub confidence: f32,
}

impl Reading {
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

/// Brightness (0..1) of the 90th percentile pixel: the tile or square color, ignoring ink.
pub fn tone(img: &GrayImage) -> f32 {
    let mut hist = [0u32; 256];
    for p in img.pixels() {
        hist[p[0] as usize] += 1;
    }
    let total = img.width() * img.height();
    let target = (total as f32 * 0.9).ceil() as u32;
    let mut seen = 0;
    for (level, &n) in hist.iter().enumerate() {
        seen += n;
        if seen >= target {
            return level as f32 / 255.;
        }
    }
    1.0
}

/// Mean and standard deviation of the pixels, both normalized to 0..1.
pub fn mean_std(img: &GrayImage) -> (f32, f32) {
    let n = (img.width() * img.height()).max(1) as f64;
    let (sum, sum_sq) = img.pixels().fold((0f64, 0f64), |(s, sq), p| {
        let v = p[0] as f64;
        (s + v, sq + v * v)
    });
    let mean = sum / n;
    let var = (sum_sq / n - mean * mean).max(0.);
    ((mean / 255.) as f32, (var.sqrt() / 255.) as f32)
}

/// Classifies cell images by comparing them with glyph templates.
#[derive(Debug, Clone)]
pub struct CellClassifier {
    templates: GlyphTemplates,
    /// Minimum tone of a tile, darker cells are board squares.
    tile_tone_min: f32,
    /// Maximum standard deviation of a cell without ink.
    empty_std_max: f32,
}

impl Default for CellClassifier {
    fn default() -> Self {
        CellClassifier::new(GlyphTemplates::builtin())
    }
}

impl CellClassifier {
    pub fn new(templates: GlyphTemplates) -> CellClassifier {
        let tile_tone_min = templates.blank_tone() - 0.06;
        CellClassifier {
            templates,
            tile_tone_min,
            empty_std_max: 0.06,
        }
    }

    pub fn with_tile_tone_min(mut self, tone: f32) -> CellClassifier {
        self.tile_tone_min = tone;
        self
    }

    pub fn with_empty_std_max(mut self, std: f32) -> CellClassifier {
        self.empty_std_max = std;
        self
    }

    pub fn templates(&self) -> &GlyphTemplates {
        &self.templates
    }

    /// Classify a single cell or rack tile image.
    ///
    /// The steps are:
    /// 1. A cell darker than a tile is an empty board square.
    /// 2. A tile without texture is an unplayed blank.
    /// 3. Otherwise the blank marker is checked and masked, and the ink is matched against
    ///    every letter template with normalized cross correlation. The best score is the
    ///    confidence; ties go to the letter with the higher prior frequency.
    pub fn classify(&self, cell: &GrayImage) -> Reading {
        let mut cell: Cow<GrayImage> = if cell.dimensions() != (CELL, CELL) {
            Cow::Owned(resize(cell, CELL, CELL, FilterType::Lanczos3))
        } else {
            Cow::Borrowed(cell)
        };

        let inner = Self::inner(&cell);
        let tone = tone(&inner);
        let tone_confidence = (0.5 + (tone - self.tile_tone_min).abs() / (2. * TONE_MARGIN)).min(1.);
        if tone < self.tile_tone_min {
            return Reading {
                glyph: Glyph::Empty,
                confidence: tone_confidence,
            };
        }

        // check if the tile carries the blank marker, and paint it over
        let corner = marker_area();
        let dark = (tone * 255. * 0.5) as u8;
        let marker_ink = cell
            .view(corner.x, corner.y, corner.width, corner.height)
            .pixels()
            .filter(|(_, _, p)| p[0] < dark)
            .count() as u32;
        let is_blank = marker_ink * 2 >= MARKER.width * MARKER.height;
        if is_blank {
            let fill = Luma([(tone * 255.).round() as u8]);
            let owned = cell.to_mut();
            for y in corner.y..corner.y + corner.height {
                for x in corner.x..corner.x + corner.width {
                    owned.put_pixel(x, y, fill);
                }
            }
        }
        let inner = Self::inner(&cell);

        let (_, std) = mean_std(&inner);
        if std < self.empty_std_max {
            let texture_confidence = 0.5 + (self.empty_std_max - std) / (2. * self.empty_std_max);
            return Reading {
                glyph: Glyph::Blank,
                confidence: tone_confidence.min(texture_confidence),
            };
        }

        let glyph = match normalize(&ink_mask(&inner)) {
            Some(glyph) => glyph,
            None => {
                return Reading {
                    glyph: Glyph::Empty,
                    confidence: 0.,
                }
            }
        };
        match self.best_match(&glyph) {
            Some((letter, score)) => Reading {
                glyph: Glyph::Tile(Tile {
                    letter,
                    blank: is_blank,
                }),
                confidence: score.min(tone_confidence),
            },
            None => Reading {
                glyph: Glyph::Empty,
                confidence: 0.,
            },
        }
    }

    fn inner(cell: &GrayImage) -> GrayImage {
        cell.view(MARGIN, MARGIN, CELL - 2 * MARGIN, CELL - 2 * MARGIN)
            .to_image()
    }

    /// The best matching letter and its score.
    fn best_match(&self, glyph: &GrayImage) -> Option<(Letter, f32)> {
        let method = MatchTemplateMethod::CrossCorrelationNormalized;
        let mut best: Option<(Letter, f32)> = None;
        for (letter, template) in self.templates.letters() {
            let score = find_extremes(&match_template(glyph, template, method)).max_value;
            trace!("{} {:.3}", letter, score);
            let better = match best {
                None => true,
                Some((best_letter, best_score)) => {
                    score > best_score + TIE_EPSILON
                        || ((score - best_score).abs() <= TIE_EPSILON
                            && letter.frequency() > best_letter.frequency())
                }
            };
            if better {
                best = Some((*letter, score));
            }
        }
        best
    }
}
