use crate::Error;
use std::fmt;
use std::str::FromStr;

/// Number of letters in the tile alphabet.
pub const ALPHABET_SIZE: usize = 26;

/// Maximum number of tiles on a rack.
pub const RACK_SIZE: usize = 7;

/// Standard tile values for `A..=Z`.
const LETTER_VALUES: [u32; ALPHABET_SIZE] = [
    1, 3, 3, 2, 1, 4, 2, 4, 1, 8, 5, 1, 3, 1, 1, 3, 10, 1, 1, 1, 1, 4, 4, 8, 4, 10,
];

/// Relative frequency of `A..=Z` in English text, in hundredths of a percent.
/// Used to break ties between equally good template matches.
const LETTER_FREQUENCY: [u32; ALPHABET_SIZE] = [
    817, 129, 278, 425, 1270, 223, 202, 609, 697, 15, 77, 403, 241, 675, 751, 193, 10, 599, 633,
    906, 276, 98, 236, 15, 197, 7,
];

/// A letter of the tile alphabet, `A` is 0 and `Z` is 25.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter(u8);

impl Letter {
    /// Returns the letter for `c` (case-insensitive), or `None` if `c` is not in `A..=Z`.
    pub fn from_char(c: char) -> Option<Letter> {
        let c = c.to_ascii_uppercase();
        if c.is_ascii_uppercase() {
            Some(Letter(c as u8 - b'A'))
        } else {
            None
        }
    }

    /// Returns the letter with alphabet index `index`.
    pub fn from_index(index: usize) -> Option<Letter> {
        if index < ALPHABET_SIZE {
            Some(Letter(index as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The uppercase character for this letter.
    pub fn to_char(self) -> char {
        (b'A' + self.0) as char
    }

    /// Point value of a normal (non-blank) tile with this letter.
    pub fn value(self) -> u32 {
        LETTER_VALUES[self.index()]
    }

    /// Prior frequency of this letter, used as a classification tie breaker.
    pub fn frequency(self) -> u32 {
        LETTER_FREQUENCY[self.index()]
    }

    /// Iterate over the whole alphabet in order.
    pub fn all() -> impl Iterator<Item = Letter> {
        (0..ALPHABET_SIZE as u8).map(Letter)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A tile lying on the board: the letter it shows, and whether it is a blank
/// standing in for that letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
    pub letter: Letter,
    pub blank: bool,
}

impl Tile {
    pub fn new(letter: Letter) -> Tile {
        Tile {
            letter,
            blank: false,
        }
    }

    pub fn blank(letter: Letter) -> Tile {
        Tile {
            letter,
            blank: true,
        }
    }

    /// Point value, 0 for a blank.
    pub fn value(self) -> u32 {
        if self.blank {
            0
        } else {
            self.letter.value()
        }
    }

    /// Uppercase for a normal tile, lowercase for a blank.
    pub fn to_char(self) -> char {
        let c = self.letter.to_char();
        if self.blank {
            c.to_ascii_lowercase()
        } else {
            c
        }
    }

    /// Parse the board text notation: uppercase is a normal tile, lowercase a blank.
    pub fn from_char(c: char) -> Option<Tile> {
        let letter = Letter::from_char(c)?;
        Some(Tile {
            letter,
            blank: c.is_ascii_lowercase(),
        })
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A tile on the rack, before it is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RackTile {
    Letter(Letter),
    Blank,
}

impl RackTile {
    pub fn to_char(self) -> char {
        match self {
            RackTile::Letter(letter) => letter.to_char(),
            RackTile::Blank => '?',
        }
    }
}

/// The active player's tiles: a multiset of at most [RACK_SIZE] letters and blanks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rack {
    counts: [u8; ALPHABET_SIZE],
    blanks: u8,
}

impl Rack {
    pub fn new() -> Rack {
        Rack::default()
    }

    /// Build a rack from tiles.
    ///
    /// # Errors
    /// If there are more than [RACK_SIZE] tiles.
    pub fn from_tiles<I: IntoIterator<Item = RackTile>>(tiles: I) -> Result<Rack, Error> {
        let mut rack = Rack::new();
        for tile in tiles {
            if rack.len() == RACK_SIZE {
                return Err(Error::InvalidRack(format!(
                    "more than {} tiles",
                    RACK_SIZE
                )));
            }
            rack.push(tile);
        }
        Ok(rack)
    }

    fn push(&mut self, tile: RackTile) {
        match tile {
            RackTile::Letter(letter) => self.counts[letter.index()] += 1,
            RackTile::Blank => self.blanks += 1,
        }
    }

    /// Total number of tiles.
    pub fn len(&self) -> usize {
        self.counts.iter().map(|&n| n as usize).sum::<usize>() + self.blanks as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, letter: Letter) -> u8 {
        self.counts[letter.index()]
    }

    pub fn blanks(&self) -> u8 {
        self.blanks
    }

    /// Remove one `letter` tile, returns false if there is none.
    pub(crate) fn take(&mut self, letter: Letter) -> bool {
        let n = &mut self.counts[letter.index()];
        if *n == 0 {
            return false;
        }
        *n -= 1;
        true
    }

    /// Remove one blank, returns false if there is none.
    pub(crate) fn take_blank(&mut self) -> bool {
        if self.blanks == 0 {
            return false;
        }
        self.blanks -= 1;
        true
    }

    /// Return a tile taken with `take` or `take_blank`.
    pub(crate) fn put_back(&mut self, tile: Tile) {
        if tile.blank {
            self.blanks += 1;
        } else {
            self.counts[tile.letter.index()] += 1;
        }
    }

    /// The tiles in alphabetical order, blanks last.
    pub fn tiles(&self) -> Vec<RackTile> {
        let mut tiles = Vec::with_capacity(self.len());
        for letter in Letter::all() {
            for _ in 0..self.count(letter) {
                tiles.push(RackTile::Letter(letter));
            }
        }
        for _ in 0..self.blanks {
            tiles.push(RackTile::Blank);
        }
        tiles
    }
}

impl FromStr for Rack {
    type Err = Error;

    /// Letters are case-insensitive, `?` or `*` is a blank.
    fn from_str(s: &str) -> Result<Rack, Error> {
        let tiles = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                '?' | '*' => Ok(RackTile::Blank),
                _ => Letter::from_char(c)
                    .map(RackTile::Letter)
                    .ok_or_else(|| Error::InvalidRack(format!("invalid tile {:?}", c))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Rack::from_tiles(tiles)
    }
}

impl fmt::Display for Rack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s: String = self.tiles().into_iter().map(RackTile::to_char).collect();
        write!(f, "{}", s)
    }
}

/// A set of letters, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LetterSet(u32);

impl LetterSet {
    pub const EMPTY: LetterSet = LetterSet(0);
    pub const ALL: LetterSet = LetterSet((1 << ALPHABET_SIZE) - 1);

    pub fn contains(self, letter: Letter) -> bool {
        self.0 & (1 << letter.0) != 0
    }

    pub fn insert(&mut self, letter: Letter) {
        self.0 |= 1 << letter.0;
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Letter> {
        Letter::all().filter(move |&l| self.contains(l))
    }
}

impl fmt::Display for LetterSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s: String = self.iter().map(Letter::to_char).collect();
        write!(f, "{{{}}}", s)
    }
}
