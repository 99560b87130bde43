use crate::board::{Board, Direction, Position};
use crate::tiles::{Tile, RACK_SIZE};
use std::cmp::Ordering;
use std::fmt;

/// Bonus for playing all [RACK_SIZE] rack tiles in one move.
pub const BINGO_BONUS: u32 = 50;

/// A candidate play: the tiles placed, the words formed and the points scored.
///
/// Scoring follows the standard rules. All letters of a word count, but letter
/// and word multipliers only apply to squares covered by this move. Every word
/// multiplier square covered multiplies the word, so two double word squares
/// give four times the letter sum. Every cross word formed by a new tile is
/// scored the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    /// New tiles in reading order
    pub placements: Vec<(Position, Tile)>,
    pub direction: Direction,
    /// Start of the main word
    pub start: Position,
    /// The main word, blanks in lowercase
    pub word: String,
    /// Words formed perpendicular to the main word
    pub cross_words: Vec<String>,
    pub score: u32,
}

fn spell(tiles: &[Tile]) -> String {
    tiles.iter().map(|t| t.to_char()).collect()
}

/// Score the word of `len` tiles from `start` in direction `dir` on `board`,
/// where the squares in `new` were covered by the current move.
fn word_score(
    board: &Board,
    start: Position,
    dir: Direction,
    len: usize,
    new: &[(Position, Tile)],
) -> u32 {
    let mut sum = 0;
    let mut multiplier = 1;
    for i in 0..len {
        let pos = match start.step(dir, i as isize) {
            Some(pos) => pos,
            None => break,
        };
        let cell = board.cell(pos);
        let value = cell.tile().map_or(0, Tile::value);
        if new.iter().any(|&(p, _)| p == pos) {
            sum += value * cell.bonus().letter_multiplier();
            multiplier *= cell.bonus().word_multiplier();
        } else {
            sum += value;
        }
    }
    sum * multiplier
}

impl Move {
    /// Build and score the move that places `placements` on `board`, reading the
    /// main word in `direction`. The placements must lie on one line in `direction`.
    pub fn new(board: &Board, mut placements: Vec<(Position, Tile)>, direction: Direction) -> Move {
        placements.sort();
        let after = board.with_placements(&placements);
        let first = placements.first().map_or(crate::board::CENTER, |&(pos, _)| pos);
        let (start, tiles) = after.word_at(first, direction);
        let mut score = word_score(&after, start, direction, tiles.len(), &placements);

        let cross = direction.perpendicular();
        let mut cross_words = Vec::new();
        for &(pos, _) in &placements {
            let (cross_start, cross_tiles) = after.word_at(pos, cross);
            if cross_tiles.len() > 1 {
                score += word_score(&after, cross_start, cross, cross_tiles.len(), &placements);
                cross_words.push(spell(&cross_tiles));
            }
        }
        if placements.len() == RACK_SIZE {
            score += BINGO_BONUS;
        }
        Move {
            placements,
            direction,
            start,
            word: spell(&tiles),
            cross_words,
            score,
        }
    }

    /// Number of rack tiles used.
    pub fn tiles_used(&self) -> usize {
        self.placements.len()
    }

    pub fn is_bingo(&self) -> bool {
        self.tiles_used() == RACK_SIZE
    }

    /// Ranking order: highest score first, then shorter words, then
    /// alphabetically, across before down, and finally by placement.
    pub fn rank_cmp(&self, other: &Move) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.word.len().cmp(&other.word.len()))
            .then_with(|| self.word.cmp(&other.word))
            .then_with(|| self.direction.cmp(&other.direction))
            .then_with(|| self.placements.cmp(&other.placements))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.word, self.start, self.direction, self.score
        )?;
        if !self.cross_words.is_empty() {
            write!(f, " ({})", self.cross_words.join(", "))?;
        }
        Ok(())
    }
}

/// Sort `moves` best first and keep the first `top_n` (all if `None`).
pub fn rank(moves: &mut Vec<Move>, top_n: Option<usize>) {
    moves.sort_by(Move::rank_cmp);
    if let Some(n) = top_n {
        moves.truncate(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SIZE;
    use crate::tiles::Letter;

    fn tile(c: char) -> Tile {
        Tile::from_char(c).unwrap()
    }

    fn across(row: usize, col: usize, word: &str) -> Vec<(Position, Tile)> {
        word.chars()
            .enumerate()
            .map(|(i, c)| (Position::new(row, col + i), tile(c)))
            .collect()
    }

    #[test]
    fn test_first_move_on_center() {
        // Q U I Z = 22, doubled by the center square
        let m = Move::new(&Board::new(), across(7, 5, "QUIZ"), Direction::Across);
        assert_eq!(m.word, "QUIZ");
        assert_eq!(m.start, Position::new(7, 5));
        assert_eq!(m.score, 44);
        assert!(m.cross_words.is_empty());
    }

    #[test]
    fn test_blank_scores_zero() {
        let m = Move::new(&Board::new(), across(7, 5, "QUiZ"), Direction::Across);
        assert_eq!(m.word, "QUiZ");
        assert_eq!(m.score, 42);
    }

    #[test]
    fn test_premiums_only_for_new_tiles() {
        let mut rows = vec!["..............."; SIZE];
        rows[7] = "......CARE.....";
        let board = Board::from_strings(&rows).unwrap();
        // S on a plain square, the center double word is already covered
        let m = Move::new(&board, across(7, 10, "S"), Direction::Across);
        assert_eq!(m.word, "CARES");
        assert_eq!(m.score, 7);
        // S on (7, 11), a double letter: C A R E . S is not one word
        let m = Move::new(&board, across(7, 11, "S"), Direction::Across);
        assert_eq!(m.word, "S");
    }

    #[test]
    fn test_cross_words() {
        let mut rows = vec!["..............."; SIZE];
        rows[7] = "......CARE.....";
        let board = Board::from_strings(&rows).unwrap();
        // AS under CA also forms CA and AS down
        let m = Move::new(&board, across(8, 6, "AS"), Direction::Across);
        assert_eq!(m.word, "AS");
        assert_eq!(m.cross_words, vec!["CA", "AS"]);
        // (8,6) is a double letter square, (8,7) is plain
        let a = Letter::from_char('A').unwrap().value();
        let s = Letter::from_char('S').unwrap().value();
        let main = 2 * a + s;
        let ca = 3 + 2 * a;
        let as_ = 1 + s;
        assert_eq!(m.score, main + ca + as_);
    }

    #[test]
    fn test_two_word_multipliers() {
        // row 1 has double words at cols 1 and 13
        let word = "ABCDEFGHIJKLM";
        let m = Move::new(&Board::new(), across(1, 1, word), Direction::Across);
        let sum: u32 = word
            .chars()
            .map(|c| Letter::from_char(c).unwrap().value())
            .sum();
        // triple letters at cols 5 and 9 add twice the value of E and I
        let extra = 2 * (tile('E').value() + tile('I').value());
        assert_eq!(m.score, (sum + extra) * 4);
    }

    #[test]
    fn test_bingo() {
        let seven = Move::new(&Board::new(), across(7, 4, "RETAINS"), Direction::Across);
        assert!(seven.is_bingo());
        assert_eq!(seven.score, 7 * 2 + BINGO_BONUS);
        let six = Move::new(&Board::new(), across(7, 4, "RETAIN"), Direction::Across);
        assert!(!six.is_bingo());
        assert_eq!(six.score, 6 * 2);
    }

    #[test]
    fn test_rank() {
        let board = Board::new();
        let mut moves = vec![
            Move::new(&board, across(7, 6, "AT"), Direction::Across),
            Move::new(&board, across(7, 5, "QUIZ"), Direction::Across),
            Move::new(&board, across(7, 7, "TA"), Direction::Across),
            Move::new(&board, across(7, 4, "RETAINS"), Direction::Across),
        ];
        rank(&mut moves, Some(3));
        let words: Vec<&str> = moves.iter().map(|m| m.word.as_str()).collect();
        assert_eq!(words, vec!["RETAINS", "QUIZ", "AT"]);
    }
}
