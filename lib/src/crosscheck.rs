use crate::board::{Board, Direction, Position, SIZE};
use crate::dictionary::Dictionary;
use crate::tiles::{LetterSet, Tile};
use log::debug;

/// Letters that may be placed on each square, per play direction.
///
/// A letter placed while playing across also forms a word down through the
/// square, and the other way around. The set for (`pos`, `dir`) holds the
/// letters for which that perpendicular word is in the dictionary. Squares
/// without a perpendicular neighbor allow every letter.
///
/// The table is computed once per board, for every anchor, and then shared
/// read-only by the move search.
#[derive(Debug, Clone)]
pub struct CrossChecks {
    across: Vec<LetterSet>,
    down: Vec<LetterSet>,
    constrained: Vec<bool>,
}

impl CrossChecks {
    pub fn compute(board: &Board, dictionary: &Dictionary) -> CrossChecks {
        let mut checks = CrossChecks {
            across: vec![LetterSet::ALL; SIZE * SIZE],
            down: vec![LetterSet::ALL; SIZE * SIZE],
            constrained: vec![false; 2 * SIZE * SIZE],
        };
        for pos in board.anchors() {
            for &dir in [Direction::Across, Direction::Down].iter() {
                if let Some(set) = cross_check(board, dictionary, pos, dir) {
                    checks.set(pos, dir, set);
                }
            }
        }
        debug!(
            "cross checks: {} constrained squares",
            checks.constrained.iter().filter(|&&c| c).count()
        );
        checks
    }

    fn set(&mut self, pos: Position, dir: Direction, set: LetterSet) {
        let i = pos.index();
        match dir {
            Direction::Across => {
                self.across[i] = set;
                self.constrained[i] = true;
            }
            Direction::Down => {
                self.down[i] = set;
                self.constrained[SIZE * SIZE + i] = true;
            }
        }
    }

    /// Letters allowed on `pos` in a word played in direction `dir`.
    pub fn get(&self, pos: Position, dir: Direction) -> LetterSet {
        match dir {
            Direction::Across => self.across[pos.index()],
            Direction::Down => self.down[pos.index()],
        }
    }

    /// True if a perpendicular word restricts the letters on `pos`.
    pub fn is_constrained(&self, pos: Position, dir: Direction) -> bool {
        match dir {
            Direction::Across => self.constrained[pos.index()],
            Direction::Down => self.constrained[SIZE * SIZE + pos.index()],
        }
    }
}

/// The cross-check set of the empty square `pos` for a word played in direction
/// `dir`, or `None` if there are no tiles next to it in the perpendicular direction.
pub fn cross_check(
    board: &Board,
    dictionary: &Dictionary,
    pos: Position,
    dir: Direction,
) -> Option<LetterSet> {
    let cross = dir.perpendicular();
    let prefix = board.run(pos, cross, -1);
    let suffix = board.run(pos, cross, 1);
    if prefix.is_empty() && suffix.is_empty() {
        return None;
    }
    let letters = |tiles: &[Tile]| tiles.iter().map(|t| t.letter).collect::<Vec<_>>();
    let suffix = letters(&suffix);
    let mut set = LetterSet::EMPTY;
    if let Some(node) = dictionary.walk(dictionary.root(), &letters(&prefix)) {
        for (letter, next) in dictionary.children(node) {
            let complete = dictionary
                .walk(next, &suffix)
                .map_or(false, |end| dictionary.is_terminal(end));
            if complete {
                set.insert(letter);
            }
        }
    }
    Some(set)
}
