use crate::board::Board;
use crate::classifier::{CellClassifier, Reading};
use crate::detector::{BoardDetector, Detection};
use crate::dictionary::Dictionary;
use crate::glyphs::GlyphTemplates;
use crate::movegen::MoveGenerator;
use crate::score::{rank, Move};
use crate::state::{BoardState, UncertainPolicy};
use crate::tiles::Rack;
use crate::Error;
use image::GrayImage;
use log::{debug, info};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Thresholds and options of the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    /// Minimum confidence of a cell classification
    pub acceptance_threshold: f32,
    /// Minimum confidence that the located grid is a 15 x 15 board
    pub grid_confidence_threshold: f32,
    /// Distance from the background intensity that marks grid ink
    pub foreground_delta: u8,
    /// Minimum share of the image covered by the board
    pub min_board_fraction: f32,
    /// Standard deviation below which a tile has no letter
    pub empty_std_max: f32,
    pub uncertain_policy: UncertainPolicy,
    /// Number of moves to return, `None` for all
    pub top_n: Option<usize>,
    /// Classify cells and search moves on the rayon thread pool
    pub parallel: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            acceptance_threshold: 0.8,
            grid_confidence_threshold: 0.9,
            foreground_delta: 96,
            min_board_fraction: 0.1,
            empty_std_max: 0.06,
            uncertain_policy: UncertainPolicy::Reject,
            top_n: None,
            parallel: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_acceptance_threshold(mut self, threshold: f32) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    pub fn with_grid_confidence_threshold(mut self, threshold: f32) -> Self {
        self.grid_confidence_threshold = threshold;
        self
    }

    pub fn with_foreground_delta(mut self, delta: u8) -> Self {
        self.foreground_delta = delta;
        self
    }

    pub fn with_min_board_fraction(mut self, fraction: f32) -> Self {
        self.min_board_fraction = fraction;
        self
    }

    pub fn with_empty_std_max(mut self, std: f32) -> Self {
        self.empty_std_max = std;
        self
    }

    pub fn with_uncertain_policy(mut self, policy: UncertainPolicy) -> Self {
        self.uncertain_policy = policy;
        self
    }

    pub fn with_top_n(mut self, top_n: Option<usize>) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// The result of analyzing one image.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The reconstructed board and rack
    pub state: BoardState,
    /// Legal moves, best first. Empty if there is no legal move.
    pub moves: Vec<Move>,
    /// Board corners in the image: top left, top right, bottom right, bottom left
    pub corners: [(f32, f32); 4],
    pub grid_confidence: f32,
    /// Readings of the 225 board squares, row-major
    pub readings: Vec<Reading>,
    /// Readings of the rack tiles, left to right
    pub rack_readings: Vec<Reading>,
}

/// Turns a board image into a ranked list of moves.
///
/// The dictionary is shared: one `Analyzer` (or several, holding clones of the
/// same [Arc]) can serve any number of analyses, from any number of threads.
pub struct Analyzer {
    config: AnalyzerConfig,
    dictionary: Arc<Dictionary>,
    classifier: CellClassifier,
}

impl Analyzer {
    /// Analyzer with the built-in glyph templates.
    pub fn new(config: AnalyzerConfig, dictionary: Arc<Dictionary>) -> Analyzer {
        Analyzer::with_templates(config, dictionary, GlyphTemplates::builtin())
    }

    /// Analyzer matching tiles against `templates`, e.g. from
    /// [GlyphTemplates::from_dir].
    pub fn with_templates(
        config: AnalyzerConfig,
        dictionary: Arc<Dictionary>,
        templates: GlyphTemplates,
    ) -> Analyzer {
        let classifier = CellClassifier::new(templates).with_empty_std_max(config.empty_std_max);
        Analyzer {
            config,
            dictionary,
            classifier,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn classifier(&self) -> &CellClassifier {
        &self.classifier
    }

    /// The board detector configured from [AnalyzerConfig].
    pub fn detector(&self) -> BoardDetector {
        BoardDetector {
            foreground_delta: self.config.foreground_delta,
            confidence_threshold: self.config.grid_confidence_threshold,
            min_board_fraction: self.config.min_board_fraction,
        }
    }

    /// Classify the board squares and rack tiles of a detection.
    pub fn classify(&self, detection: &Detection) -> (Vec<Reading>, Vec<Reading>) {
        let cells = detection.cells();
        let classify = |cell: &GrayImage| self.classifier.classify(cell);
        if self.config.parallel {
            (
                cells.par_iter().map(classify).collect(),
                detection.rack.par_iter().map(classify).collect(),
            )
        } else {
            (
                cells.iter().map(classify).collect(),
                detection.rack.iter().map(classify).collect(),
            )
        }
    }

    /// Analyze a grayscale screenshot or photo of the board.
    ///
    /// # Errors
    /// - [Error::GridNotFound] if no board is found
    /// - [Error::UncertainCells] if some cells can not be read reliably (see
    ///   [AnalyzerConfig::uncertain_policy])
    /// - [Error::InvalidBoardGeometry] if the tiles read can not be a real game
    pub fn analyze(&self, img: &GrayImage) -> Result<Analysis, Error> {
        let now = Instant::now();
        let detection = self.detector().detect(img)?;
        debug!("detect: {:?}", now.elapsed());

        let now = Instant::now();
        let (readings, rack_readings) = self.classify(&detection);
        debug!("classify: {:?}", now.elapsed());

        let state = BoardState::reconcile(
            &readings,
            &rack_readings,
            self.config.acceptance_threshold,
            self.config.uncertain_policy,
        )?;
        info!(
            "board with {} tiles, rack {}",
            state.board.tile_count(),
            state.rack
        );

        let now = Instant::now();
        let mut moves = MoveGenerator::new(&self.dictionary)
            .with_parallel(self.config.parallel)
            .generate(&state.board, &state.rack);
        let total = moves.len();
        rank(&mut moves, self.config.top_n);
        info!("{} moves found in {:?}", total, now.elapsed());

        Ok(Analysis {
            state,
            moves,
            corners: detection.corners,
            grid_confidence: detection.confidence,
            readings,
            rack_readings,
        })
    }

    /// Read an image file and analyze it.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<Analysis, Error> {
        let path = path.as_ref();
        let gray = image::open(path)
            .map_err(|source| Error::ImageError {
                path: path.to_path_buf(),
                source,
            })?
            .into_luma8();
        self.analyze(&gray)
    }

    /// Decode an encoded image (PNG or PNM) and analyze it.
    pub fn analyze_memory(&self, buffer: &[u8]) -> Result<Analysis, Error> {
        let gray = image::load_from_memory(buffer)?.into_luma8();
        self.analyze(&gray)
    }
}

/// Legal moves of `rack` on a known `board`, best first, at most `top_n`.
pub fn solve(
    board: &Board,
    rack: &Rack,
    dictionary: &Dictionary,
    top_n: Option<usize>,
) -> Vec<Move> {
    let mut moves = MoveGenerator::new(dictionary).generate(board, rack);
    rank(&mut moves, top_n);
    moves
}
