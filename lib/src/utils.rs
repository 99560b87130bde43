use crate::board::{Board, Position, SIZE};
use crate::classifier::{CELL, MARGIN};
use crate::detector::Detection;
use crate::tiles::RackTile;
use crate::Error;
use image::imageops::{replace, resize, FilterType};
use image::math::Rect;
use image::{GenericImageView, GrayImage, ImageBuffer};
use log::info;
use std::path::{Path, PathBuf};

/// Create a collage from parts of a source image.
/// Parts are scaled to the size of the first part.
pub fn collage(source: &GrayImage, parts: &[Rect], maxrows: Option<u32>) -> GrayImage {
    if parts.is_empty() {
        return GrayImage::new(0, 0);
    }
    let nimages = parts.len();
    let mut nrows = ((nimages as f64).sqrt().floor() as u32).max(1); // size of collage square
    if let Some(maxrows) = maxrows {
        nrows = nrows.min(maxrows.max(1));
    }
    let ncols = (nimages as f64 / nrows as f64).ceil() as u32;
    let nrows = (nimages as f64 / ncols as f64).ceil() as u32;
    let (w, h) = (parts[0].width, parts[0].height);
    let mut collage: GrayImage = ImageBuffer::new(w * ncols, h * nrows);
    for (i, &part) in parts.iter().enumerate() {
        let (row, col) = (i as u32 / ncols, i as u32 % ncols);
        let src = source.view(part.x, part.y, part.width, part.height).to_image();
        let src = if (part.width, part.height) != (w, h) {
            resize(&src, w, h, FilterType::Lanczos3)
        } else {
            src
        };
        replace(&mut collage, &src, col * w, row * h);
    }
    collage
}

/// All board squares of a detection side by side, in board layout.
pub fn board_collage(detection: &Detection) -> GrayImage {
    let parts: Vec<Rect> = (0..SIZE * SIZE)
        .map(|i| Detection::cell_rect(Position::from_index(i)))
        .collect();
    collage(&detection.board, &parts, Some(SIZE as u32))
}

/// The part of a cell or rack tile image the classifier looks at.
fn template_area(img: &GrayImage) -> GrayImage {
    let img = if img.dimensions() != (CELL, CELL) {
        resize(img, CELL, CELL, FilterType::Lanczos3)
    } else {
        img.clone()
    };
    img.view(MARGIN, MARGIN, CELL - 2 * MARGIN, CELL - 2 * MARGIN)
        .to_image()
}

/// Save tiles of a detected board as templates, for use with
/// [GlyphTemplates::from_dir](crate::GlyphTemplates::from_dir).
///
/// `board` and `rack` describe what the image really shows. Every letter that is
/// on the board as a normal tile is saved as `<letter>.png`, and an unplayed blank
/// on the rack as `BLANK.png`. Existing files are kept.
/// Returns the paths that were written.
pub fn save_templates<P: AsRef<Path>>(
    savedir: P,
    detection: &Detection,
    board: &Board,
    rack: &[RackTile],
) -> Result<Vec<PathBuf>, Error> {
    let mut tiles: Vec<(String, GrayImage)> = board
        .cells()
        .filter_map(|cell| cell.tile().map(|tile| (cell.pos(), tile)))
        .filter(|(_, tile)| !tile.blank)
        .map(|(pos, tile)| (tile.letter.to_string(), detection.cell(pos)))
        .collect();
    let blank = rack
        .iter()
        .zip(&detection.rack)
        .find(|(tile, _)| **tile == RackTile::Blank);
    if let Some((_, img)) = blank {
        tiles.push((String::from("BLANK"), img.clone()));
    }

    let mut saved = Vec::new();
    for (name, img) in tiles {
        let path = savedir.as_ref().join(format!("{}.png", name));
        if path.exists() {
            continue;
        }
        template_area(&img)
            .save(&path)
            .map_err(|source| Error::ImageError {
                path: path.clone(),
                source,
            })?;
        info!("save {}", path.display());
        saved.push(path);
    }
    Ok(saved)
}
