use crate::board::{Board, Direction, Position, CENTER, SIZE};
use crate::classifier::{Glyph, Reading};
use crate::dictionary::Dictionary;
use crate::score::Move;
use crate::tiles::{Rack, RackTile, Tile, RACK_SIZE};
use crate::Error;
use log::{debug, warn};

/// What to do with readings below the acceptance threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UncertainPolicy {
    /// Fail with [Error::UncertainCells]
    Reject,
    /// Log the uncertain cells and use the best guess
    BestGuess,
}

impl Default for UncertainPolicy {
    fn default() -> Self {
        UncertainPolicy::Reject
    }
}

/// A validated board and rack, ready for move generation.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    pub board: Board,
    pub rack: Rack,
}

impl BoardState {
    /// Combine cell readings into a board and rack.
    ///
    /// `board` holds the 225 readings of the board squares in row-major order,
    /// `rack` the readings of the rack tiles. A reading is uncertain if its
    /// confidence is below `threshold`. A board square showing an unplayed blank is
    /// uncertain too, and so is a rack tile that reads as empty.
    ///
    /// # Errors
    /// - [Error::UncertainCells] with the uncertain positions and rack slots, unless
    ///   `policy` is [UncertainPolicy::BestGuess]
    /// - [Error::InvalidBoardGeometry] if the tiles do not form one group through
    ///   the center
    /// - [Error::InvalidRack] if there are more than 7 rack tiles
    pub fn reconcile(
        board: &[Reading],
        rack: &[Reading],
        threshold: f32,
        policy: UncertainPolicy,
    ) -> Result<BoardState, Error> {
        if board.len() != SIZE * SIZE {
            return Err(Error::InvalidBoardGeometry {
                reason: format!("expected {} cells, got {}", SIZE * SIZE, board.len()),
                cells: Vec::new(),
            });
        }
        let uncertain_cells: Vec<Position> = board
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_confident(threshold) || r.glyph == Glyph::Blank)
            .map(|(i, _)| Position::from_index(i))
            .collect();
        let uncertain_slots: Vec<usize> = rack
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_confident(threshold) || r.glyph == Glyph::Empty)
            .map(|(i, _)| i)
            .collect();
        if !uncertain_cells.is_empty() || !uncertain_slots.is_empty() {
            match policy {
                UncertainPolicy::Reject => {
                    return Err(Error::UncertainCells {
                        board: uncertain_cells,
                        rack: uncertain_slots,
                    })
                }
                UncertainPolicy::BestGuess => warn!(
                    "using best guesses for uncertain cells {:?} and rack slots {:?}",
                    uncertain_cells, uncertain_slots
                ),
            }
        }

        let mut result = Board::new();
        for (i, reading) in board.iter().enumerate() {
            if let Glyph::Tile(tile) = reading.glyph {
                result.place(Position::from_index(i), tile);
            }
        }
        result.validate_geometry()?;

        let tiles = rack.iter().filter_map(|reading| match reading.glyph {
            Glyph::Empty => None,
            Glyph::Blank => Some(RackTile::Blank),
            Glyph::Tile(tile) if tile.blank => Some(RackTile::Blank),
            Glyph::Tile(tile) => Some(RackTile::Letter(tile.letter)),
        });
        let rack = Rack::from_tiles(tiles)?;
        debug!("board has {} tiles, rack {}", result.tile_count(), rack);
        Ok(BoardState {
            board: result,
            rack,
        })
    }

    /// Check that this board follows from `previous` by one legal move, and return
    /// that move. Returns `None` if the boards are the same.
    ///
    /// The new tiles must all be on one line, form one word without gaps together
    /// with the tiles already on that line, touch the previous tiles (or cover the
    /// center on the first move), and every word they form must be in `dictionary`.
    ///
    /// # Errors
    /// [Error::InconsistentCapture] describing the first violation.
    pub fn check_successor(
        &self,
        previous: &Board,
        dictionary: &Dictionary,
    ) -> Result<Option<Move>, Error> {
        let inconsistent = |msg: String| Err(Error::InconsistentCapture(msg));
        let mut placements: Vec<(Position, Tile)> = Vec::new();
        for cell in self.board.cells() {
            let pos = cell.pos();
            match (previous.get(pos), cell.tile()) {
                (Some(old), Some(new)) if old != new => {
                    return inconsistent(format!("tile at {} changed from {} to {}", pos, old, new))
                }
                (Some(old), None) => {
                    return inconsistent(format!("tile {} at {} was removed", old, pos))
                }
                (None, Some(new)) => placements.push((pos, new)),
                _ => {}
            }
        }
        if placements.is_empty() {
            return Ok(None);
        }
        if placements.len() > RACK_SIZE {
            return inconsistent(format!("{} tiles added in one move", placements.len()));
        }

        let first = placements[0].0;
        let last = placements[placements.len() - 1].0;
        let direction = if placements.iter().all(|(p, _)| p.row == first.row) {
            if placements.len() == 1 && self.board.word_at(first, Direction::Across).1.len() < 2 {
                Direction::Down
            } else {
                Direction::Across
            }
        } else if placements.iter().all(|(p, _)| p.col == first.col) {
            Direction::Down
        } else {
            return inconsistent(String::from("new tiles are not on one line"));
        };
        let span = last.offset(direction) - first.offset(direction);
        let gap = (0..=span).find_map(|i| {
            first
                .step(direction, i as isize)
                .filter(|&pos| !self.board.is_occupied(pos))
        });
        if let Some(pos) = gap {
            return inconsistent(format!("gap at {} between the new tiles", pos));
        }
        if previous.is_empty() {
            if !placements.iter().any(|&(p, _)| p == CENTER) {
                return inconsistent(String::from("first move does not cover the center"));
            }
        } else if !placements.iter().any(|&(p, _)| previous.has_neighbor(p)) {
            return inconsistent(String::from("new tiles do not touch the board"));
        }

        let play = Move::new(previous, placements, direction);
        if play.word.chars().count() < 2 {
            return inconsistent(format!("word {} is too short", play.word));
        }
        let unknown = std::iter::once(&play.word)
            .chain(play.cross_words.iter())
            .find(|word| !dictionary.contains(word));
        if let Some(word) = unknown {
            return inconsistent(format!("{} is not a word", word));
        }
        Ok(Some(play))
    }
}
