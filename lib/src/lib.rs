//! Reads a word tile game board from a screenshot or photo, and finds the best moves.
//!
//! The pipeline has two halves. Perception turns an image into a board and a rack:
//! the [BoardDetector] locates and rectifies the 15 x 15 grid, the [CellClassifier]
//! reads every square and rack tile with a confidence, and [BoardState] accepts or
//! rejects the readings. Search then enumerates every legal move with the
//! Appel-Jacobson algorithm ([MoveGenerator]) over a [Dictionary] graph, scores
//! them and ranks them.
//!
//! # Basic usage
//! ```no_run
//! # use crossplay_solver::{Analyzer, AnalyzerConfig, Dictionary, Error};
//! # use std::sync::Arc;
//! let dictionary = Arc::new(Dictionary::from_file("wordlist.txt")?);
//! let analyzer = Analyzer::new(AnalyzerConfig::default().with_top_n(Some(5)), dictionary);
//! let analysis = analyzer.analyze_file("screenshot.png")?;
//! println!("{}", analysis.state.board);
//! for m in &analysis.moves {
//!     println!("{}", m);
//! }
//! # Ok::<(), Error>(())
//! ```
//!
//! The board is displayed in text form, where `.` is an empty square, uppercase is a
//! normal tile and lowercase is a blank tile:
//!
//! ```text
//!     0 1 2 3 4 5 6 7 8 91011121314
//!  0  . . . . . . . . . . . . . . .
//! ...
//!  7  . . . . . . C A R E s . . . .
//! ```
//!
//! Boards that are already known can be solved directly:
//! ```
//! # use crossplay_solver::{solve, Board, Dictionary, Rack};
//! let dictionary = Dictionary::from_words(&["care", "cares", "scare"]);
//! let mut rows = vec!["..............."; 15];
//! rows[7] = "......CARE.....";
//! let board = Board::from_strings(&rows)?;
//! let rack: Rack = "S".parse()?;
//! let moves = solve(&board, &rack, &dictionary, None);
//! // CARES and SCARE both score 7, ties go to the alphabetically first word
//! assert_eq!(moves.len(), 2);
//! assert_eq!(moves[0].word, "CARES");
//! assert_eq!(moves[0].score, 7);
//! # Ok::<(), crossplay_solver::Error>(())
//! ```

mod analyzer;
mod board;
mod classifier;
mod crosscheck;
mod detector;
mod dictionary;
mod error;
mod glyphs;
mod movegen;
mod render;
mod score;
mod state;
mod tiles;
mod utils;

pub use analyzer::{solve, Analysis, Analyzer, AnalyzerConfig};
pub use board::{BonusKind, Board, Cell, Direction, Position, CENTER, SIZE};
pub use classifier::{CellClassifier, Glyph, Reading, CELL};
pub use crosscheck::{cross_check, CrossChecks};
pub use detector::{BoardDetector, Detection};
pub use dictionary::{Dictionary, DictionaryBuilder, NodeId};
pub use error::Error;
pub use glyphs::GlyphTemplates;
pub use movegen::MoveGenerator;
pub use render::{render_screenshot, RenderStyle};
pub use score::{rank, Move, BINGO_BONUS};
pub use state::{BoardState, UncertainPolicy};
pub use tiles::{Letter, LetterSet, Rack, RackTile, Tile, RACK_SIZE};
pub use utils::{board_collage, collage, save_templates};
