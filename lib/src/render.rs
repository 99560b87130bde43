//! Synthetic screenshots.
//!
//! Draws a board and rack in the style the detector and classifier expect: a
//! light background, a dark grid, bonus squares in shades of gray, light tiles
//! with dark letters from the built-in font, and a dark rack bar under the board.
//! Useful for fixtures, and as a reference when capturing real templates.

use crate::board::{BonusKind, Board, Position, SIZE};
use crate::classifier::{CELL, MARKER};
use crate::glyphs::{font_pixel, FONT_HEIGHT, FONT_WIDTH};
use crate::tiles::{RackTile, Tile};
use image::imageops::{resize, FilterType};
use image::math::Rect;
use image::{GrayImage, Luma};

pub const BACKGROUND: u8 = 255;
pub const LINE: u8 = 40;
pub const INK: u8 = 30;
pub const TILE_TONE: u8 = 235;
pub const RACK_BAR: u8 = 90;

/// Inset of a tile inside its cell box, in canonical pixels.
pub const TILE_INSET: u32 = 2;

/// Width of a grid line, in canonical pixels.
const LINE_WIDTH: u32 = 2;

/// Offset of the glyph inside a cell box, and the size of a font pixel.
const GLYPH_ORIGIN: u32 = 8;
const GLYPH_SCALE: u32 = 4;

fn square_tone(bonus: BonusKind) -> u8 {
    match bonus {
        BonusKind::None => 200,
        BonusKind::DoubleLetter => 180,
        BonusKind::TripleLetter => 165,
        BonusKind::DoubleWord | BonusKind::Center => 190,
        BonusKind::TripleWord => 170,
    }
}

/// Controls the size and placement of a rendered screenshot.
#[derive(Debug, Clone, Copy)]
pub struct RenderStyle {
    /// Integer upscale of the canonical 40 pixel cell.
    pub scale: u32,
    /// Background border around the board, in canonical pixels.
    pub margin: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle {
            scale: 1,
            margin: 20,
        }
    }
}

impl RenderStyle {
    fn board_px(&self) -> u32 {
        CELL * SIZE as u32
    }

    /// Top left corner of the rack bar, in canonical pixels.
    fn rack_origin(&self) -> (u32, u32) {
        (self.margin, self.margin + self.board_px() + CELL / 2)
    }

    fn rack_height(&self) -> u32 {
        CELL + CELL / 5
    }

    /// Bounding box of the board square `pos` in the rendered image.
    pub fn cell_rect(&self, pos: Position) -> Rect {
        Rect {
            x: (self.margin + pos.col as u32 * CELL) * self.scale,
            y: (self.margin + pos.row as u32 * CELL) * self.scale,
            width: CELL * self.scale,
            height: CELL * self.scale,
        }
    }

    /// Bounding box of the cell around rack tile `slot` in the rendered image.
    pub fn rack_rect(&self, slot: usize) -> Rect {
        let (x, y) = self.rack_origin();
        Rect {
            x: (x + CELL / 2 + slot as u32 * (CELL + CELL / 10)) * self.scale,
            y: (y + CELL / 10) * self.scale,
            width: CELL * self.scale,
            height: CELL * self.scale,
        }
    }

    fn size(&self) -> (u32, u32) {
        let (_, rack_y) = self.rack_origin();
        (
            self.board_px() + 2 * self.margin,
            rack_y + self.rack_height() + self.margin,
        )
    }
}

fn fill(img: &mut GrayImage, x: u32, y: u32, width: u32, height: u32, value: u8) {
    for yy in y..y + height {
        for xx in x..x + width {
            img.put_pixel(xx, yy, Luma([value]));
        }
    }
}

/// Draw a tile in the cell box with top left corner (`x`, `y`), canonical scale.
/// `None` draws an unplayed blank tile, a blank [Tile] gets the blank marker.
pub fn draw_tile(img: &mut GrayImage, x: u32, y: u32, tile: Option<Tile>) {
    fill(
        img,
        x + TILE_INSET,
        y + TILE_INSET,
        CELL - 2 * TILE_INSET,
        CELL - 2 * TILE_INSET,
        TILE_TONE,
    );
    let tile = match tile {
        Some(tile) => tile,
        None => return,
    };
    for fy in 0..FONT_HEIGHT {
        for fx in 0..FONT_WIDTH {
            if font_pixel(tile.letter, fx, fy) {
                fill(
                    img,
                    x + GLYPH_ORIGIN + fx * GLYPH_SCALE,
                    y + GLYPH_ORIGIN + fy * GLYPH_SCALE,
                    GLYPH_SCALE,
                    GLYPH_SCALE,
                    INK,
                );
            }
        }
    }
    if tile.blank {
        fill(
            img,
            x + MARKER.x,
            y + MARKER.y,
            MARKER.width,
            MARKER.height,
            INK,
        );
    }
}

/// Render a screenshot of `board` with `rack` under it.
pub fn render_screenshot(board: &Board, rack: &[RackTile], style: &RenderStyle) -> GrayImage {
    let (width, height) = style.size();
    let mut img = GrayImage::from_pixel(width, height, Luma([BACKGROUND]));
    let (bx, by) = (style.margin, style.margin);
    let board_px = style.board_px();

    for cell in board.cells() {
        let pos = cell.pos();
        let (x, y) = (bx + pos.col as u32 * CELL, by + pos.row as u32 * CELL);
        fill(&mut img, x, y, CELL, CELL, square_tone(cell.bonus()));
        if let Some(tile) = cell.tile() {
            draw_tile(&mut img, x, y, Some(tile));
        }
    }

    // grid lines, including the closing line on the right and bottom edge
    for k in 0..=SIZE as u32 {
        let offset = (k * CELL).min(board_px - LINE_WIDTH);
        fill(&mut img, bx + offset, by, LINE_WIDTH, board_px, LINE);
        fill(&mut img, bx, by + offset, board_px, LINE_WIDTH, LINE);
    }

    let (rx, ry) = style.rack_origin();
    fill(&mut img, rx, ry, board_px, style.rack_height(), RACK_BAR);
    let canonical = RenderStyle { scale: 1, ..*style };
    for (slot, &tile) in rack.iter().enumerate() {
        let r = canonical.rack_rect(slot);
        let tile = match tile {
            RackTile::Letter(letter) => Some(Tile::new(letter)),
            RackTile::Blank => None,
        };
        draw_tile(&mut img, r.x, r.y, tile);
    }

    if style.scale > 1 {
        img = resize(
            &img,
            width * style.scale,
            height * style.scale,
            FilterType::Nearest,
        );
    }
    img
}
