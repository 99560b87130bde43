use crate::tiles::Tile;
use crate::Error;
use std::fmt;

/// Number of rows and columns on the board.
pub const SIZE: usize = 15;

/// The center square, where the first word must be played.
pub const CENTER: Position = Position { row: 7, col: 7 };

/// Standard bonus layout.
/// `T`: triple word, `D`: double word, `t`: triple letter, `d`: double letter, `*`: center.
const BONUS_LAYOUT: [&str; SIZE] = [
    "T..d...T...d..T",
    ".D...t...t...D.",
    "..D...d.d...D..",
    "d..D...d...D..d",
    "....D.....D....",
    ".t...t...t...t.",
    "..d...d.d...d..",
    "T..d...*...d..T",
    "..d...d.d...d..",
    ".t...t...t...t.",
    "....D.....D....",
    "d..D...d...D..d",
    "..D...d.d...D..",
    ".D...t...t...D.",
    "T..d...T...d..T",
];

/// A (row, col) coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    /// Linear index `row * 15 + col`.
    pub fn index(self) -> usize {
        self.row * SIZE + self.col
    }

    pub fn from_index(index: usize) -> Position {
        Position::new(index / SIZE, index % SIZE)
    }

    /// The position `delta` squares away in direction `dir`, if it is on the board.
    pub fn step(self, dir: Direction, delta: isize) -> Option<Position> {
        let (row, col) = match dir {
            Direction::Across => (self.row as isize, self.col as isize + delta),
            Direction::Down => (self.row as isize + delta, self.col as isize),
        };
        if (0..SIZE as isize).contains(&row) && (0..SIZE as isize).contains(&col) {
            Some(Position::new(row as usize, col as usize))
        } else {
            None
        }
    }

    /// Orthogonal neighbors that are on the board.
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        IntoIterator::into_iter([
            self.step(Direction::Down, -1),
            self.step(Direction::Down, 1),
            self.step(Direction::Across, -1),
            self.step(Direction::Across, 1),
        ])
        .flatten()
    }

    /// Position of square `offset` on line `line` when reading in direction `dir`.
    /// For `Across` the line is a row, for `Down` a column.
    pub fn on_line(dir: Direction, line: usize, offset: usize) -> Position {
        match dir {
            Direction::Across => Position::new(line, offset),
            Direction::Down => Position::new(offset, line),
        }
    }

    /// Offset of this position along direction `dir`.
    pub fn offset(self, dir: Direction) -> usize {
        match dir {
            Direction::Across => self.col,
            Direction::Down => self.row,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Reading direction of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    pub fn perpendicular(self) -> Direction {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Premium square kinds. The center square counts as a double word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BonusKind {
    None,
    DoubleLetter,
    TripleLetter,
    DoubleWord,
    TripleWord,
    Center,
}

impl BonusKind {
    fn from_layout(c: u8) -> BonusKind {
        match c {
            b'd' => BonusKind::DoubleLetter,
            b't' => BonusKind::TripleLetter,
            b'D' => BonusKind::DoubleWord,
            b'T' => BonusKind::TripleWord,
            b'*' => BonusKind::Center,
            _ => BonusKind::None,
        }
    }

    /// The standard bonus at `pos`.
    pub fn at(pos: Position) -> BonusKind {
        BonusKind::from_layout(BONUS_LAYOUT[pos.row].as_bytes()[pos.col])
    }

    pub fn letter_multiplier(self) -> u32 {
        match self {
            BonusKind::DoubleLetter => 2,
            BonusKind::TripleLetter => 3,
            _ => 1,
        }
    }

    pub fn word_multiplier(self) -> u32 {
        match self {
            BonusKind::DoubleWord | BonusKind::Center => 2,
            BonusKind::TripleWord => 3,
            _ => 1,
        }
    }

    /// Two character tag, e.g. `2L` or `3W`; `--` for a plain square.
    pub fn tag(self) -> &'static str {
        match self {
            BonusKind::None => "--",
            BonusKind::DoubleLetter => "2L",
            BonusKind::TripleLetter => "3L",
            BonusKind::DoubleWord => "2W",
            BonusKind::TripleWord => "3W",
            BonusKind::Center => "ss",
        }
    }
}

/// A board square. The bonus is fixed when the board is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pos: Position,
    bonus: BonusKind,
    tile: Option<Tile>,
}

impl Cell {
    pub fn pos(&self) -> Position {
        self.pos
    }

    pub fn bonus(&self) -> BonusKind {
        self.bonus
    }

    pub fn tile(&self) -> Option<Tile> {
        self.tile
    }

    pub fn is_empty(&self) -> bool {
        self.tile.is_none()
    }
}

/// A 15 x 15 board, stored as a flat array indexed by [Position::index].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; SIZE * SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    /// An empty board with the standard bonus layout.
    pub fn new() -> Board {
        let mut cells = [Cell {
            pos: CENTER,
            bonus: BonusKind::None,
            tile: None,
        }; SIZE * SIZE];
        for (i, cell) in cells.iter_mut().enumerate() {
            cell.pos = Position::from_index(i);
            cell.bonus = BonusKind::at(cell.pos);
        }
        Board { cells }
    }

    /// Create a board from 15 strings of 15 characters.
    /// `.` is an empty square, uppercase a normal tile and lowercase a blank.
    ///
    /// # Errors
    /// If the dimensions are wrong or a character is not a letter or `.`.
    pub fn from_strings<S: AsRef<str>>(rows: &[S]) -> Result<Board, Error> {
        if rows.len() != SIZE {
            return Err(Error::InvalidBoardString(format!(
                "expected {} rows, got {}",
                SIZE,
                rows.len()
            )));
        }
        let mut board = Board::new();
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            if line.chars().count() != SIZE {
                return Err(Error::InvalidBoardString(format!(
                    "row {} has {} chars, expected {}",
                    row,
                    line.chars().count(),
                    SIZE
                )));
            }
            for (col, c) in line.chars().enumerate() {
                if c == '.' {
                    continue;
                }
                let tile = Tile::from_char(c).ok_or_else(|| {
                    Error::InvalidBoardString(format!("invalid tile {:?} at ({},{})", c, row, col))
                })?;
                board.place(Position::new(row, col), tile);
            }
        }
        Ok(board)
    }

    /// The board as 15 strings, see [from_strings](Board::from_strings).
    pub fn to_strings(&self) -> Vec<String> {
        (0..SIZE)
            .map(|row| {
                (0..SIZE)
                    .map(|col| self.get(Position::new(row, col)).map_or('.', Tile::to_char))
                    .collect()
            })
            .collect()
    }

    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[pos.index()]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn get(&self, pos: Position) -> Option<Tile> {
        self.cells[pos.index()].tile
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    /// Put `tile` on `pos`, replacing what was there.
    pub fn place(&mut self, pos: Position, tile: Tile) {
        self.cells[pos.index()].tile = Some(tile);
    }

    /// A copy of this board with `placements` added.
    pub fn with_placements(&self, placements: &[(Position, Tile)]) -> Board {
        let mut board = *self;
        for &(pos, tile) in placements {
            board.place(pos, tile);
        }
        board
    }

    /// Positions of all tiles, in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .filter(|cell| cell.tile.is_some())
            .map(|cell| cell.pos)
    }

    pub fn tile_count(&self) -> usize {
        self.occupied().count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// Empty squares next to a tile, in row-major order. On an empty board the
    /// only anchor is the center square.
    pub fn anchors(&self) -> Vec<Position> {
        if self.is_empty() {
            return vec![CENTER];
        }
        self.cells
            .iter()
            .filter(|cell| cell.is_empty() && self.has_neighbor(cell.pos))
            .map(|cell| cell.pos)
            .collect()
    }

    /// True if an orthogonal neighbor of `pos` holds a tile.
    pub fn has_neighbor(&self, pos: Position) -> bool {
        pos.neighbors().any(|n| self.is_occupied(n))
    }

    /// The contiguous run of tiles directly before (`delta = -1`) or after
    /// (`delta = 1`) `pos` in direction `dir`, in reading order.
    pub fn run(&self, pos: Position, dir: Direction, delta: isize) -> Vec<Tile> {
        let mut tiles = Vec::new();
        let mut next = pos.step(dir, delta);
        while let Some(p) = next {
            match self.get(p) {
                Some(tile) => tiles.push(tile),
                None => break,
            }
            next = p.step(dir, delta);
        }
        if delta < 0 {
            tiles.reverse();
        }
        tiles
    }

    /// The maximal word through the occupied square `pos` in direction `dir`,
    /// as (start position, tiles).
    pub fn word_at(&self, pos: Position, dir: Direction) -> (Position, Vec<Tile>) {
        let before = self.run(pos, dir, -1);
        let start = pos
            .step(dir, -(before.len() as isize))
            .unwrap_or(pos);
        let mut tiles = before;
        tiles.extend(self.get(pos));
        tiles.extend(self.run(pos, dir, 1));
        (start, tiles)
    }

    /// Connected groups of tiles, found with a flood fill. Each group is sorted.
    pub fn components(&self) -> Vec<Vec<Position>> {
        let mut seen = [false; SIZE * SIZE];
        let mut groups = Vec::new();
        for start in self.occupied() {
            if seen[start.index()] {
                continue;
            }
            seen[start.index()] = true;
            let mut group = Vec::new();
            let mut stack = vec![start];
            while let Some(pos) = stack.pop() {
                group.push(pos);
                for n in pos.neighbors() {
                    if self.is_occupied(n) && !seen[n.index()] {
                        seen[n.index()] = true;
                        stack.push(n);
                    }
                }
            }
            group.sort();
            groups.push(group);
        }
        groups
    }

    /// Check that the tiles could be the result of legal play: either no tiles,
    /// or one connected group of at least two tiles covering the center square.
    ///
    /// # Errors
    /// [Error::InvalidBoardGeometry] listing the offending tiles.
    pub fn validate_geometry(&self) -> Result<(), Error> {
        let groups = self.components();
        if groups.is_empty() {
            return Ok(());
        }
        let main = groups.iter().position(|g| g.contains(&CENTER));
        let main = match main {
            Some(main) => main,
            None => {
                return Err(Error::InvalidBoardGeometry {
                    reason: String::from("center square is empty"),
                    cells: groups.into_iter().flatten().collect(),
                })
            }
        };
        if groups[main].len() < 2 {
            return Err(Error::InvalidBoardGeometry {
                reason: String::from("single isolated tile"),
                cells: groups[main].clone(),
            });
        }
        if groups.len() > 1 {
            let mut isolated: Vec<Position> = groups
                .into_iter()
                .enumerate()
                .filter(|&(i, _)| i != main)
                .flat_map(|(_, g)| g)
                .collect();
            isolated.sort();
            return Err(Error::InvalidBoardGeometry {
                reason: String::from("tiles not connected to the center group"),
                cells: isolated,
            });
        }
        Ok(())
    }

    /// The bonus grid as tags, one row per line (`ss` marks the center).
    pub fn bonus_grid(&self) -> String {
        (0..SIZE)
            .map(|row| {
                (0..SIZE)
                    .map(|col| self.cell(Position::new(row, col)).bonus.tag())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.to_strings()).finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..SIZE {
            write!(f, "{:2}", col)?;
        }
        for (row, line) in self.to_strings().iter().enumerate() {
            write!(f, "\n{:2} ", row)?;
            for c in line.chars() {
                write!(f, " {}", c)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_rows() -> Vec<String> {
        vec![".".repeat(SIZE); SIZE]
    }

    fn board_with(words: &[(usize, usize, &str)]) -> Board {
        let mut rows: Vec<Vec<char>> = empty_rows().iter().map(|r| r.chars().collect()).collect();
        for &(row, col, word) in words {
            for (i, c) in word.chars().enumerate() {
                rows[row][col + i] = c;
            }
        }
        let rows: Vec<String> = rows.into_iter().map(|r| r.into_iter().collect()).collect();
        Board::from_strings(&rows).unwrap()
    }

    #[test]
    fn test_bonus_layout_is_symmetric() {
        for row in 0..SIZE {
            for col in 0..SIZE {
                let b = BonusKind::at(Position::new(row, col));
                assert_eq!(b, BonusKind::at(Position::new(col, row)));
                assert_eq!(b, BonusKind::at(Position::new(SIZE - 1 - row, col)));
            }
        }
        assert_eq!(BonusKind::at(CENTER), BonusKind::Center);
        assert_eq!(BonusKind::at(Position::new(0, 0)), BonusKind::TripleWord);
        assert_eq!(BonusKind::at(Position::new(7, 3)), BonusKind::DoubleLetter);
        assert_eq!(BonusKind::Center.word_multiplier(), 2);
    }

    #[test]
    fn test_strings_round_trip() {
        let board = board_with(&[(7, 6, "CaRE")]);
        let rows = board.to_strings();
        assert_eq!(rows[7], "......CaRE.....");
        assert_eq!(Board::from_strings(&rows).unwrap(), board);
        assert!(board.get(Position::new(7, 7)).unwrap().blank);
    }

    #[test]
    fn test_from_strings_errors() {
        let mut rows = empty_rows();
        rows.pop();
        assert!(Board::from_strings(&rows).is_err());
        let mut rows = empty_rows();
        rows[3] = String::from("......1........");
        assert!(Board::from_strings(&rows).is_err());
    }

    #[test]
    fn test_neighbors() {
        assert_eq!(Position::new(0, 0).neighbors().count(), 2);
        assert_eq!(Position::new(0, 7).neighbors().count(), 3);
        let around: Vec<Position> = Position::new(7, 7).neighbors().collect();
        assert_eq!(
            around,
            vec![
                Position::new(6, 7),
                Position::new(8, 7),
                Position::new(7, 6),
                Position::new(7, 8),
            ]
        );
        let last = Position::new(SIZE - 1, SIZE - 1);
        assert!(last.neighbors().all(|n| n.row < SIZE && n.col < SIZE));
    }

    #[test]
    fn test_anchors() {
        assert_eq!(Board::new().anchors(), vec![CENTER]);
        let board = board_with(&[(7, 6, "CARE")]);
        let anchors = board.anchors();
        // 4 above, 4 below, one left and one right
        assert_eq!(anchors.len(), 10);
        assert!(anchors.contains(&Position::new(7, 5)));
        assert!(anchors.contains(&Position::new(7, 10)));
        assert!(anchors.contains(&Position::new(6, 9)));
        assert!(!anchors.contains(&Position::new(7, 7)));
    }

    #[test]
    fn test_word_at() {
        let board = board_with(&[(7, 6, "CARE")]);
        let (start, tiles) = board.word_at(Position::new(7, 8), Direction::Across);
        assert_eq!(start, Position::new(7, 6));
        let word: String = tiles.iter().map(|t| t.to_char()).collect();
        assert_eq!(word, "CARE");
        let (start, tiles) = board.word_at(Position::new(7, 8), Direction::Down);
        assert_eq!(start, Position::new(7, 8));
        assert_eq!(tiles.len(), 1);
    }

    #[test]
    fn test_validate_geometry() {
        assert!(Board::new().validate_geometry().is_ok());
        assert!(board_with(&[(7, 6, "CARE")]).validate_geometry().is_ok());

        let board = board_with(&[(7, 6, "CARE"), (0, 0, "X")]);
        match board.validate_geometry() {
            Err(Error::InvalidBoardGeometry { cells, .. }) => {
                assert_eq!(cells, vec![Position::new(0, 0)])
            }
            other => panic!("unexpected {:?}", other),
        }

        // center not covered
        assert!(board_with(&[(2, 2, "CARE")]).validate_geometry().is_err());
        // single tile on the center
        assert!(board_with(&[(7, 7, "A")]).validate_geometry().is_err());
    }

    #[test]
    fn test_display() {
        let board = board_with(&[(7, 6, "CARE")]);
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), SIZE + 1);
        assert!(lines[8].starts_with(" 7 "));
        assert!(lines[8].contains("C A R E"));
    }
}
