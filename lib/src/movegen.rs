//! Move generation after Appel and Jacobson, "The World's Fastest Scrabble Program" (1988).
//!
//! Every legal move covers at least one anchor. For each line (row or column) and
//! each anchor on it, the search first chooses a left part, the tiles before the
//! anchor, and then extends the word to the right through the anchor. Both steps
//! walk the dictionary graph in step with the board, so a letter is only tried
//! if some word starts with the letters chosen so far, and only if it passes the
//! cross check of its square.

use crate::board::{Board, Direction, Position, SIZE};
use crate::crosscheck::CrossChecks;
use crate::dictionary::{Dictionary, NodeId};
use crate::score::Move;
use crate::tiles::{Rack, Tile};
use log::debug;
use rayon::prelude::*;
use std::collections::HashSet;

/// Enumerates every legal move of a rack on a board.
#[derive(Debug, Clone, Copy)]
pub struct MoveGenerator<'a> {
    dictionary: &'a Dictionary,
    parallel: bool,
}

impl<'a> MoveGenerator<'a> {
    pub fn new(dictionary: &'a Dictionary) -> MoveGenerator<'a> {
        MoveGenerator {
            dictionary,
            parallel: true,
        }
    }

    /// Search the lines on the rayon thread pool (the default) or on the calling thread.
    pub fn with_parallel(mut self, parallel: bool) -> MoveGenerator<'a> {
        self.parallel = parallel;
        self
    }

    /// All distinct legal moves of `rack` on `board`, scored but not ranked.
    /// The order only depends on the input.
    pub fn generate(&self, board: &Board, rack: &Rack) -> Vec<Move> {
        if rack.is_empty() {
            return Vec::new();
        }
        let checks = CrossChecks::compute(board, self.dictionary);
        let anchors = board.anchors();
        let lines: Vec<(Direction, usize)> = [Direction::Across, Direction::Down]
            .iter()
            .flat_map(|&dir| (0..SIZE).map(move |line| (dir, line)))
            .collect();

        let search = |&(dir, line): &(Direction, usize)| {
            let mut line_search = LineSearch {
                board,
                dictionary: self.dictionary,
                checks: &checks,
                dir,
                line,
                anchor: 0,
                rack: *rack,
                placed: Vec::new(),
                found: Vec::new(),
            };
            line_search.run(&anchors);
            line_search.found
        };
        let found: Vec<Vec<Vec<(Position, Tile)>>> = if self.parallel {
            lines.par_iter().map(search).collect()
        } else {
            lines.iter().map(search).collect()
        };

        let mut seen = HashSet::new();
        let mut moves = Vec::new();
        let mut candidates = 0;
        for (&(dir, _), placements) in lines.iter().zip(found) {
            for mut placement in placements {
                candidates += 1;
                placement.sort();
                if seen.insert(placement.clone()) {
                    moves.push(Move::new(board, placement, dir));
                }
            }
        }
        debug!(
            "{} anchors, {} candidates, {} distinct moves",
            anchors.len(),
            candidates,
            moves.len()
        );
        moves
    }
}

/// The search along one row or column.
struct LineSearch<'a> {
    board: &'a Board,
    dictionary: &'a Dictionary,
    checks: &'a CrossChecks,
    dir: Direction,
    line: usize,
    /// Offset of the current anchor
    anchor: usize,
    /// Tiles left to play
    rack: Rack,
    /// New tiles of the partial word, as (offset, tile)
    placed: Vec<(usize, Tile)>,
    /// Complete moves found
    found: Vec<Vec<(Position, Tile)>>,
}

impl<'a> LineSearch<'a> {
    fn pos(&self, offset: usize) -> Position {
        Position::on_line(self.dir, self.line, offset)
    }

    fn run(&mut self, anchors: &[Position]) {
        let mut previous_anchor: Option<usize> = None;
        for offset in 0..SIZE {
            let pos = self.pos(offset);
            if !anchors.contains(&pos) {
                continue;
            }
            self.anchor = offset;
            let root = self.dictionary.root();
            let before = if offset > 0 {
                self.board.run(pos, self.dir, -1)
            } else {
                Vec::new()
            };
            if !before.is_empty() {
                // the left part is already on the board
                let letters: Vec<_> = before.iter().map(|t| t.letter).collect();
                if let Some(node) = self.dictionary.walk(root, &letters) {
                    self.extend_right(node, offset);
                }
            } else {
                // empty squares left of the anchor, up to the previous anchor
                let free = match previous_anchor {
                    Some(prev) => offset - prev - 1,
                    None => offset,
                };
                let limit = free.min(self.rack.len().saturating_sub(1));
                self.left_part(root, limit);
            }
            previous_anchor = Some(offset);
        }
    }

    /// Try every left part of up to `limit` rack tiles that is a word prefix,
    /// placed directly before the anchor.
    fn left_part(&mut self, node: NodeId, limit: usize) {
        // `placed` holds the left part in reading order; it ends just before the anchor
        let len = self.placed.len();
        let shifted: Vec<(usize, Tile)> = self
            .placed
            .iter()
            .enumerate()
            .map(|(i, &(_, tile))| (self.anchor - len + i, tile))
            .collect();
        let saved = std::mem::replace(&mut self.placed, shifted);
        self.extend_right(node, self.anchor);
        self.placed = saved;

        if limit == 0 {
            return;
        }
        let dictionary = self.dictionary;
        for (letter, next) in dictionary.children(node) {
            if self.rack.take(letter) {
                self.placed.push((0, Tile::new(letter)));
                self.left_part(next, limit - 1);
                self.placed.pop();
                self.rack.put_back(Tile::new(letter));
            }
            if self.rack.take_blank() {
                self.placed.push((0, Tile::blank(letter)));
                self.left_part(next, limit - 1);
                self.placed.pop();
                self.rack.put_back(Tile::blank(letter));
            }
        }
    }

    /// Extend the partial word that reached `node` with the square at `offset`.
    fn extend_right(&mut self, node: NodeId, offset: usize) {
        let dictionary = self.dictionary;
        if offset >= SIZE {
            if dictionary.is_terminal(node) {
                self.record(offset);
            }
            return;
        }
        let pos = self.pos(offset);
        match self.board.get(pos) {
            Some(tile) => {
                if let Some(next) = dictionary.child(node, tile.letter) {
                    self.extend_right(next, offset + 1);
                }
            }
            None => {
                if offset > self.anchor && dictionary.is_terminal(node) {
                    self.record(offset);
                }
                if self.rack.is_empty() {
                    return;
                }
                let allowed = self.checks.get(pos, self.dir);
                for (letter, next) in dictionary.children(node) {
                    if !allowed.contains(letter) {
                        continue;
                    }
                    if self.rack.take(letter) {
                        self.place(Tile::new(letter), next, offset);
                    }
                    if self.rack.take_blank() {
                        self.place(Tile::blank(letter), next, offset);
                    }
                }
            }
        }
    }

    /// Put a tile taken from the rack on `offset` and continue to the right.
    fn place(&mut self, tile: Tile, next: NodeId, offset: usize) {
        self.placed.push((offset, tile));
        self.extend_right(next, offset + 1);
        self.placed.pop();
        self.rack.put_back(tile);
    }

    /// Record the word that ends before `end`, if it is at least two letters long.
    fn record(&mut self, end: usize) {
        let start = self.board_start();
        if end - start < 2 || self.placed.is_empty() {
            return;
        }
        let placements = self
            .placed
            .iter()
            .map(|&(offset, tile)| (self.pos(offset), tile))
            .collect();
        self.found.push(placements);
    }

    /// First offset of the current word: the first new tile, or the tiles on
    /// the board before the anchor.
    fn board_start(&self) -> usize {
        let first = self
            .placed
            .first()
            .map_or(self.anchor, |&(offset, _)| offset);
        let before = self.board.run(self.pos(first), self.dir, -1).len();
        first - before
    }
}
