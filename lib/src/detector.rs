use crate::board::{Position, SIZE};
use crate::classifier::CELL;
use crate::render::TILE_INSET;
use crate::tiles::RACK_SIZE;
use crate::Error;
use image::math::Rect;
use image::{GenericImageView, GrayImage, ImageBuffer, Luma};
use imageproc::contrast::otsu_level;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use imageproc::integral_image::{integral_image, sum_image_pixels};
use imageproc::region_labelling::{connected_components, Connectivity};
use log::{debug, info, warn};

/// Side of the rectified board image.
pub const CANVAS: u32 = CELL * SIZE as u32;

/// Fraction of a grid line that must be grid ink.
const LINE_FILL: f32 = 0.75;

/// How far (in canonical pixels) a grid line may be from where it is expected.
const LINE_TOLERANCE: u32 = 2;

/// Minimum fraction of foreground pixels in a rack bar row.
const BAR_FILL: f32 = 0.25;

/// Minimum fraction of tile-bright pixels in a rack tile column or row.
const TILE_FILL: f32 = 0.05;

/// Height of the strip under the board that is rectified along with the board, and
/// searched for the rack.
pub const RACK_BAND: u32 = 3 * CELL;

type IntegralImage = ImageBuffer<Luma<u64>, Vec<u64>>;

/// Pixel counts over a 0/1 mask, backed by an integral image.
struct Counts {
    integral: IntegralImage,
}

impl Counts {
    /// `mask` must hold 0 or 1 per pixel.
    fn new(mask: &GrayImage) -> Counts {
        Counts {
            integral: integral_image::<_, u64>(mask),
        }
    }

    fn count(&self, rect: Rect) -> u64 {
        if rect.width == 0 || rect.height == 0 {
            return 0;
        }
        sum_image_pixels(
            &self.integral,
            rect.x,
            rect.y,
            rect.x + rect.width - 1,
            rect.y + rect.height - 1,
        )[0]
    }

    fn fraction(&self, rect: Rect) -> f32 {
        let n = rect.width as u64 * rect.height as u64;
        if n == 0 {
            return 0.;
        }
        self.count(rect) as f32 / n as f32
    }

    /// Fraction of set pixels in each column (`horizontal == false`) or each row of `rect`.
    fn profile(&self, rect: Rect, horizontal: bool) -> Vec<f32> {
        let (start, dim) = if horizontal {
            (rect.y, rect.height)
        } else {
            (rect.x, rect.width)
        };
        (start..start + dim)
            .map(|i| {
                let line = if horizontal {
                    Rect {
                        x: rect.x,
                        y: i,
                        width: rect.width,
                        height: 1,
                    }
                } else {
                    Rect {
                        x: i,
                        y: rect.y,
                        width: 1,
                        height: rect.height,
                    }
                };
                self.fraction(line)
            })
            .collect()
    }
}

#[derive(Debug, PartialEq)]
enum Segment {
    LookForRisingEdge(usize),
    InTile(usize),
    Done,
}

/// Find up to `maxcount` runs where `profile` is above `threshold`.
/// Returns (start, end) pairs, both inclusive.
fn segment_runs(profile: &[f32], threshold: f32, maxcount: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut state = Segment::LookForRisingEdge(0);
    for (i, &value) in profile.iter().enumerate() {
        match state {
            Segment::LookForRisingEdge(n) => {
                if value > threshold {
                    runs.push((i, i));
                    state = Segment::InTile(n);
                }
            }
            Segment::InTile(n) => {
                if value > threshold {
                    runs[n].1 = i;
                } else if n + 1 < maxcount {
                    state = Segment::LookForRisingEdge(n + 1);
                } else {
                    state = Segment::Done;
                }
            }
            Segment::Done => break,
        }
    }
    runs
}

/// 0/1 mask of pixels that differ from the background by more than `delta`.
fn foreground(img: &GrayImage, background: u8, delta: u8) -> GrayImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let d = (img.get_pixel(x, y)[0] as i16 - background as i16).abs();
        Luma([(d > delta as i16) as u8])
    })
}

/// Fraction of the canvas length along which the band `lo..hi` (columns, or rows when
/// `horizontal`) has at least one foreground pixel. A slightly slanted line still
/// fills its band.
fn line_fill(counts: &Counts, lo: u32, hi: u32, horizontal: bool) -> f32 {
    let filled = (0..CANVAS)
        .filter(|&i| {
            let rect = if horizontal {
                Rect {
                    x: i,
                    y: lo,
                    width: 1,
                    height: hi - lo,
                }
            } else {
                Rect {
                    x: lo,
                    y: i,
                    width: hi - lo,
                    height: 1,
                }
            };
            counts.count(rect) > 0
        })
        .count();
    filled as f32 / CANVAS as f32
}

/// Median of the pixels on the image border.
fn estimate_background(img: &GrayImage) -> u8 {
    let (w, h) = img.dimensions();
    let mut border: Vec<u8> = Vec::with_capacity(2 * (w + h) as usize);
    for x in 0..w {
        border.push(img.get_pixel(x, 0)[0]);
        border.push(img.get_pixel(x, h - 1)[0]);
    }
    for y in 0..h {
        border.push(img.get_pixel(0, y)[0]);
        border.push(img.get_pixel(w - 1, y)[0]);
    }
    border.sort_unstable();
    border[border.len() / 2]
}

/// Bounding box and extreme points of one connected foreground region.
#[derive(Debug, Clone, Copy)]
struct Blob {
    min: (u32, u32),
    max: (u32, u32),
    /// points minimizing x + y, maximizing x - y, maximizing x + y, minimizing x - y
    extremes: [(u32, u32); 4],
}

impl Blob {
    fn new(x: u32, y: u32) -> Blob {
        Blob {
            min: (x, y),
            max: (x, y),
            extremes: [(x, y); 4],
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.min = (self.min.0.min(x), self.min.1.min(y));
        self.max = (self.max.0.max(x), self.max.1.max(y));
        let sum = |p: (u32, u32)| p.0 as i64 + p.1 as i64;
        let diff = |p: (u32, u32)| p.0 as i64 - p.1 as i64;
        if sum((x, y)) < sum(self.extremes[0]) {
            self.extremes[0] = (x, y);
        }
        if diff((x, y)) > diff(self.extremes[1]) {
            self.extremes[1] = (x, y);
        }
        if sum((x, y)) > sum(self.extremes[2]) {
            self.extremes[2] = (x, y);
        }
        if diff((x, y)) < diff(self.extremes[3]) {
            self.extremes[3] = (x, y);
        }
    }

    fn area(&self) -> u64 {
        (self.max.0 - self.min.0 + 1) as u64 * (self.max.1 - self.min.1 + 1) as u64
    }

    /// Outer corners (pixel edges) in order top left, top right, bottom right, bottom left.
    fn corners(&self) -> [(f32, f32); 4] {
        let [tl, tr, br, bl] = self.extremes;
        [
            (tl.0 as f32, tl.1 as f32),
            (tr.0 as f32 + 1., tr.1 as f32),
            (br.0 as f32 + 1., br.1 as f32 + 1.),
            (bl.0 as f32, bl.1 as f32 + 1.),
        ]
    }
}

/// The located board: its outline, the rectified board image and the rack tiles.
pub struct Detection {
    /// Board corners in the source image: top left, top right, bottom right, bottom left
    pub corners: [(f32, f32); 4],
    /// How well the rectified image matches a regular 15 x 15 grid (0..1)
    pub confidence: f32,
    /// The board warped to a [CANVAS] x [CANVAS] top-down view
    pub board: GrayImage,
    /// The strip under the board, rectified like the board: [CANVAS] x [RACK_BAND]
    pub rack_band: GrayImage,
    /// Cell boxes of the rack tiles in `rack_band`, left to right
    pub rack_areas: Vec<Rect>,
    /// The rack tile images
    pub rack: Vec<GrayImage>,
}

impl Detection {
    /// Bounding rectangle of `pos` in the rectified board image.
    pub fn cell_rect(pos: Position) -> Rect {
        Rect {
            x: pos.col as u32 * CELL,
            y: pos.row as u32 * CELL,
            width: CELL,
            height: CELL,
        }
    }

    /// The rectified image of the square at `pos`.
    pub fn cell(&self, pos: Position) -> GrayImage {
        let r = Detection::cell_rect(pos);
        self.board.view(r.x, r.y, r.width, r.height).to_image()
    }

    /// All 225 square images in row-major order.
    pub fn cells(&self) -> Vec<GrayImage> {
        (0..SIZE * SIZE)
            .map(|i| self.cell(Position::from_index(i)))
            .collect()
    }
}

/// Locates the board grid and the rack in a screenshot or photo.
#[derive(Debug, Clone, Copy)]
pub struct BoardDetector {
    /// Distance from the background intensity that marks grid ink
    pub foreground_delta: u8,
    /// Minimum geometric confidence
    pub confidence_threshold: f32,
    /// Minimum share of the image covered by the board
    pub min_board_fraction: f32,
}

impl Default for BoardDetector {
    fn default() -> Self {
        BoardDetector {
            foreground_delta: 96,
            confidence_threshold: 0.9,
            min_board_fraction: 0.1,
        }
    }
}

impl BoardDetector {
    /// Find the board and rack in `img`.
    ///
    /// The phases are:
    /// 1. Segment the grid ink from the background and take the connected region with the
    ///    largest bounding box as the grid.
    /// 2. Take its extreme points as the four board corners, and warp the board to a
    ///    square top-down view. This corrects small rotations, scaling and perspective.
    /// 3. Check that the warped image shows 16 evenly spaced lines in both directions.
    /// 4. Rectify the strip under the board with the same projection, and segment the
    ///    rack tiles in it.
    ///
    /// # Errors
    /// [Error::GridNotFound] if there is no grid or it is not regular enough.
    pub fn detect(&self, img: &GrayImage) -> Result<Detection, Error> {
        let grid_not_found = |confidence: f32, reason: &str| Error::GridNotFound {
            confidence,
            reason: String::from(reason),
        };
        let (w, h) = img.dimensions();
        if w < CELL || h < CELL {
            return Err(grid_not_found(0., "image too small"));
        }
        let background = estimate_background(img);
        let mask = foreground(img, background, self.foreground_delta);
        let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

        let mut blobs: Vec<Option<Blob>> = Vec::new();
        for (x, y, label) in labels.enumerate_pixels() {
            let label = label[0] as usize;
            if label == 0 {
                continue;
            }
            if blobs.len() <= label {
                blobs.resize(label + 1, None);
            }
            match &mut blobs[label] {
                Some(blob) => blob.add(x, y),
                slot => *slot = Some(Blob::new(x, y)),
            }
        }
        let blob = blobs
            .into_iter()
            .flatten()
            .max_by_key(Blob::area)
            .ok_or_else(|| grid_not_found(0., "no foreground"))?;
        let fraction = blob.area() as f32 / (w as f32 * h as f32);
        if fraction < self.min_board_fraction {
            return Err(grid_not_found(0., "largest region is too small for a board"));
        }

        let corners = blob.corners();
        debug!("board corners {:?} ({:.0}% of image)", corners, fraction * 100.);
        let canvas = CANVAS as f32;
        let target = [(0., 0.), (canvas, 0.), (canvas, canvas), (0., canvas)];
        let projection = Projection::from_control_points(corners, target)
            .ok_or_else(|| grid_not_found(0., "degenerate board outline"))?;
        // the rack is under the board, so it is rectified with the same projection
        let mut rectified = GrayImage::from_pixel(CANVAS, CANVAS + RACK_BAND, Luma([background]));
        warp_into(
            img,
            &projection,
            Interpolation::Bilinear,
            Luma([background]),
            &mut rectified,
        );
        let board = rectified.view(0, 0, CANVAS, CANVAS).to_image();
        let rack_band = rectified.view(0, CANVAS, CANVAS, RACK_BAND).to_image();

        let confidence = self.grid_confidence(&board, background);
        info!("grid confidence {:.3}", confidence);
        if confidence < self.confidence_threshold {
            return Err(grid_not_found(confidence, "no regular 15 x 15 grid"));
        }

        let rack_areas = self.segment_rack(&rack_band, background);
        let rack = rack_areas
            .iter()
            .map(|r| rack_band.view(r.x, r.y, r.width, r.height).to_image())
            .collect();
        Ok(Detection {
            corners,
            confidence,
            board,
            rack_band,
            rack_areas,
            rack,
        })
    }

    /// Score how well `board` matches an evenly spaced grid: the share of the 32 expected
    /// lines that are present, reduced for every solid line halfway between two grid
    /// lines (which a filled region would produce).
    fn grid_confidence(&self, board: &GrayImage, background: u8) -> f32 {
        let counts = Counts::new(&foreground(board, background, self.foreground_delta));
        let mut found = 0;
        let mut spurious = 0;
        for &horizontal in [false, true].iter() {
            for k in 0..=SIZE as u32 {
                let expected = (k * CELL).min(CANVAS - 2);
                let lo = expected.saturating_sub(LINE_TOLERANCE);
                let hi = (expected + LINE_TOLERANCE + 2).min(CANVAS);
                if line_fill(&counts, lo, hi, horizontal) >= LINE_FILL {
                    found += 1;
                }
                let mid = k * CELL + CELL / 2;
                if k < SIZE as u32 && line_fill(&counts, mid, mid + 1, horizontal) >= LINE_FILL {
                    spurious += 1;
                }
            }
        }
        let lines = 2. * (SIZE as f32 + 1.);
        let mids = 2. * SIZE as f32;
        debug!("grid lines found {}, spurious {}", found, spurious);
        (found as f32 / lines) * (1. - spurious as f32 / mids)
    }

    /// Locate the rack tiles in the rectified strip under the board.
    ///
    /// The bar is the first band of foreground rows in the strip that is at least half a
    /// cell high. Inside the bar, tiles
    /// are brighter than the bar itself; their columns and rows are segmented from the
    /// fraction of bright pixels, and each tile box is grown by the tile inset to its
    /// cell box. A bar without two clearly separated tones holds no tiles.
    fn segment_rack(&self, band: &GrayImage, background: u8) -> Vec<Rect> {
        let (w, h) = band.dimensions();
        let counts = Counts::new(&foreground(band, background, self.foreground_delta));
        let all = Rect {
            x: 0,
            y: 0,
            width: w,
            height: h,
        };
        let rows = counts.profile(all, true);
        // thinner runs are edge pixels of the board itself
        let bar_rows = segment_runs(&rows, BAR_FILL, rows.len())
            .into_iter()
            .find(|&(y0, y1)| (y1 - y0 + 1) as u32 >= CELL / 2);
        let (y0, y1) = match bar_rows {
            Some(run) => run,
            None => {
                warn!("no rack found");
                return Vec::new();
            }
        };
        let band_rect = Rect {
            x: 0,
            y: y0 as u32,
            width: w,
            height: (y1 - y0 + 1) as u32,
        };
        // horizontal extent of the bar; tiles cover most of the bar height, so any
        // column with a fair share of bar pixels belongs to it
        let cols = counts.profile(band_rect, false);
        let inside = |c: &f32| *c >= BAR_FILL / 2.;
        let bar = match (cols.iter().position(inside), cols.iter().rposition(inside)) {
            (Some(x0), Some(x1)) => Rect {
                x: x0 as u32,
                y: band_rect.y,
                width: (x1 - x0 + 1) as u32,
                height: band_rect.height,
            },
            _ => return Vec::new(),
        };
        debug!("rack bar {:?}", bar);

        let area = band.view(bar.x, bar.y, bar.width, bar.height).to_image();
        let level = otsu_level(&area);
        match class_means(&area, level) {
            Some((dark, light)) if light - dark >= self.foreground_delta as f32 => {}
            means => {
                debug!("rack bar has a single tone {:?}, no tiles", means);
                return Vec::new();
            }
        }
        let bright: GrayImage =
            ImageBuffer::from_fn(area.width(), area.height(), |x, y| {
                Luma([(area.get_pixel(x, y)[0] > level) as u8])
            });
        let bright = Counts::new(&bright);
        let local = Rect {
            x: 0,
            y: 0,
            width: bar.width,
            height: bar.height,
        };
        let columns = segment_runs(&bright.profile(local, false), TILE_FILL, RACK_SIZE + 1);
        let mut tiles = Vec::new();
        for (x0, x1) in columns {
            let width = (x1 - x0 + 1) as u32;
            if width < CELL / 2 || width > CELL * 3 / 2 {
                debug!("rack run {}..={} is no tile", x0, x1);
                continue;
            }
            let strip = Rect {
                x: x0 as u32,
                y: 0,
                width,
                height: bar.height,
            };
            let (y0, y1) = match segment_runs(&bright.profile(strip, true), TILE_FILL, 1).first() {
                Some(&run) => run,
                None => continue,
            };
            let height = (y1 - y0 + 1) as u32;
            let pad = |extent: u32| {
                (extent as f32 * TILE_INSET as f32 / (CELL - 2 * TILE_INSET) as f32).round() as u32
            };
            let (px, py) = (pad(width), pad(height));
            let x = (bar.x + x0 as u32).saturating_sub(px);
            let y = (bar.y + y0 as u32).saturating_sub(py);
            tiles.push(Rect {
                x,
                y,
                width: (width + 2 * px).min(w - x),
                height: (height + 2 * py).min(h - y),
            });
        }
        if tiles.len() > RACK_SIZE {
            warn!("found {} rack tiles, keeping {}", tiles.len(), RACK_SIZE);
            tiles.truncate(RACK_SIZE);
        }
        debug!("rack tiles {:?}", tiles);
        tiles
    }
}

/// Mean intensity of the pixels at or below `level`, and of those above it.
/// `None` if either class is empty.
fn class_means(img: &GrayImage, level: u8) -> Option<(f32, f32)> {
    let (mut sums, mut counts) = ([0u64; 2], [0u64; 2]);
    for p in img.pixels() {
        let class = (p[0] > level) as usize;
        sums[class] += p[0] as u64;
        counts[class] += 1;
    }
    if counts.contains(&0) {
        return None;
    }
    Some((
        sums[0] as f32 / counts[0] as f32,
        sums[1] as f32 / counts[1] as f32,
    ))
}
