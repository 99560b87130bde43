//! Tile glyph templates.
//!
//! A template is a binary ink mask (ink = 255) cropped to the bounding box of the
//! ink and scaled to [GLYPH_WIDTH] x [GLYPH_HEIGHT]. Cells go through the same
//! normalization before they are compared, which makes matching insensitive to
//! the position and size of the letter inside the tile.

use crate::tiles::{Letter, ALPHABET_SIZE};
use crate::Error;
use image::imageops::{invert, resize, FilterType};
use image::{GenericImageView, GrayImage, ImageBuffer, Luma};
use imageproc::contrast::{otsu_level, threshold};
use log::debug;
use std::path::Path;

/// Width of a normalized glyph mask.
pub const GLYPH_WIDTH: u32 = 20;
/// Height of a normalized glyph mask.
pub const GLYPH_HEIGHT: u32 = 28;

/// Font columns and rows.
pub const FONT_WIDTH: u32 = 5;
pub const FONT_HEIGHT: u32 = 7;

/// Minimum number of ink pixels for a mask to count as a glyph.
const MIN_INK: usize = 8;

/// 5x7 bitmap font for `A..=Z`, one byte per row, bit 4 is the leftmost column.
const FONT: [[u8; FONT_HEIGHT as usize]; ALPHABET_SIZE] = [
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
];

/// True if the font pixel at (`x`, `y`) of `letter` is inked.
pub fn font_pixel(letter: Letter, x: u32, y: u32) -> bool {
    FONT[letter.index()][y as usize] & (0x10 >> x) != 0
}

/// Render `letter` as an ink mask, each font pixel a `scale` x `scale` block.
pub fn render_glyph(letter: Letter, scale: u32) -> GrayImage {
    ImageBuffer::from_fn(FONT_WIDTH * scale, FONT_HEIGHT * scale, |x, y| {
        if font_pixel(letter, x / scale, y / scale) {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Binarize a gray tile area: dark pixels become ink (255), the rest 0.
pub fn ink_mask(area: &GrayImage) -> GrayImage {
    let level = otsu_level(area);
    let mut mask = threshold(area, level);
    invert(&mut mask);
    mask
}

/// Crop an ink mask to its bounding box and scale it to the glyph size.
/// Returns `None` if there is too little ink.
pub fn normalize(mask: &GrayImage) -> Option<GrayImage> {
    let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0, 0);
    let mut ink = 0;
    for (x, y, p) in mask.enumerate_pixels() {
        if p[0] > 127 {
            ink += 1;
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
    }
    if ink < MIN_INK {
        return None;
    }
    let glyph = mask.view(x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image();
    Some(resize(&glyph, GLYPH_WIDTH, GLYPH_HEIGHT, FilterType::Nearest))
}

/// The reference set the cell classifier compares against: one normalized mask
/// per letter, plus the tone of a blank tile.
#[derive(Debug, Clone)]
pub struct GlyphTemplates {
    letters: Vec<(Letter, GrayImage)>,
    blank_tone: f32,
}

impl Default for GlyphTemplates {
    fn default() -> Self {
        GlyphTemplates::builtin()
    }
}

impl GlyphTemplates {
    pub(crate) fn new(letters: Vec<(Letter, GrayImage)>, blank_tone: f32) -> GlyphTemplates {
        GlyphTemplates {
            letters,
            blank_tone,
        }
    }

    /// Templates rendered from the built-in tile font.
    pub fn builtin() -> GlyphTemplates {
        let letters = Letter::all()
            .map(|letter| {
                // a rendered glyph always has ink
                let mask = normalize(&render_glyph(letter, 4))
                    .unwrap_or_else(|| GrayImage::new(GLYPH_WIDTH, GLYPH_HEIGHT));
                (letter, mask)
            })
            .collect();
        GlyphTemplates::new(letters, crate::render::TILE_TONE as f32 / 255.)
    }

    /// Load tile images `A.png` .. `Z.png` and `BLANK.png` from `dir`, for
    /// example captures written by [save_templates](crate::save_templates).
    ///
    /// # Errors
    /// If an image is missing or can not be decoded.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<GlyphTemplates, Error> {
        let dir = dir.as_ref();
        let open = |name: &str| {
            let path = dir.join(format!("{}.png", name));
            image::open(&path)
                .map(|img| img.into_luma8())
                .map_err(|source| Error::TemplateRead { path, source })
        };
        let mut letters = Vec::with_capacity(ALPHABET_SIZE);
        for letter in Letter::all() {
            let tile = open(&letter.to_string())?;
            match normalize(&ink_mask(&tile)) {
                Some(mask) => letters.push((letter, mask)),
                None => debug!("template {} has no ink, skipped", letter),
            }
        }
        let blank = open("BLANK")?;
        let blank_tone = crate::classifier::tone(&blank);
        Ok(GlyphTemplates::new(letters, blank_tone))
    }

    pub fn letters(&self) -> &[(Letter, GrayImage)] {
        &self.letters
    }

    /// Normalized brightness (0..1) of an unplayed blank tile.
    pub fn blank_tone(&self) -> f32 {
        self.blank_tone
    }
}
