use anyhow::{Context, Result};
use crossplay_solver::{
    render_screenshot, Analyzer, AnalyzerConfig, Board, BoardDetector, Dictionary, Error,
    Position, Rack, RenderStyle, UncertainPolicy, SIZE,
};
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use imageproc::geometric_transformations::{rotate_about_center, warp, Interpolation, Projection};
use std::sync::Arc;
use std::time::Instant;

const WORDS: &[&str] = &[
    "care", "cares", "cared", "scare", "scared", "race", "races", "acre", "acres", "ex", "sex",
    "as", "at", "ta", "tax", "eta", "tea", "teas", "sea", "seat", "east", "eat", "eats", "sat",
    "set", "ate",
];

fn board() -> Result<Board> {
    let mut rows = vec!["..............."; SIZE];
    rows[7] = "......cARE.....";
    rows[8] = ".........X.....";
    Ok(Board::from_strings(&rows)?)
}

fn analyzer(config: AnalyzerConfig) -> Analyzer {
    Analyzer::new(config, Arc::new(Dictionary::from_words(WORDS)))
}

fn screenshot(style: &RenderStyle) -> Result<(Board, Rack, GrayImage)> {
    let board = board()?;
    let rack: Rack = "AST?".parse()?;
    let img = render_screenshot(&board, &rack.tiles(), style);
    Ok((board, rack, img))
}

#[test]
fn test_analyze_screenshot() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let (board, rack, img) = screenshot(&RenderStyle::default())?;
    let analyzer = analyzer(AnalyzerConfig::default());
    let now = Instant::now();
    let analysis = analyzer.analyze(&img)?;
    println!("Analyze screenshot took {:?}", now.elapsed());
    println!("{}", analysis.state.board);
    assert_eq!(analysis.state.board, board);
    assert_eq!(analysis.state.rack, rack);
    assert!(analysis.grid_confidence > 0.9);
    assert_eq!(analysis.readings.len(), SIZE * SIZE);
    assert_eq!(analysis.rack_readings.len(), 4);

    assert!(!analysis.moves.is_empty());
    for pair in analysis.moves.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for m in &analysis.moves {
        for &(pos, _) in &m.placements {
            assert!(!board.is_occupied(pos));
        }
        assert!(analyzer.dictionary().contains(&m.word));
    }
    Ok(())
}

#[test]
fn test_analyze_scaled_screenshot() -> Result<()> {
    let (board, rack, img) = screenshot(&RenderStyle {
        scale: 2,
        margin: 20,
    })?;
    let analysis = analyzer(AnalyzerConfig::default()).analyze(&img)?;
    assert_eq!(analysis.state.board, board);
    assert_eq!(analysis.state.rack, rack);
    Ok(())
}

#[test]
fn test_detect_rotated_board() -> Result<()> {
    let (_, _, img) = screenshot(&RenderStyle {
        scale: 1,
        margin: 40,
    })?;
    let angle = 2f32.to_radians();
    let rotated = rotate_about_center(&img, angle, Interpolation::Bilinear, Luma([255u8]));
    let detection = BoardDetector::default().detect(&rotated)?;
    assert!(detection.confidence >= 0.9);
    // the top edge of the board is tilted by the rotation angle
    let [tl, tr, _, _] = detection.corners;
    let slope = (tr.1 - tl.1) / (tr.0 - tl.0);
    assert!((slope.abs() - angle.tan()).abs() < 0.01, "slope {}", slope);
    assert_eq!(detection.rack.len(), 4);
    Ok(())
}

#[test]
fn test_analyze_rotated_screenshot() -> Result<()> {
    let (board, rack, img) = screenshot(&RenderStyle {
        scale: 2,
        margin: 40,
    })?;
    let analyzer = analyzer(AnalyzerConfig::default());
    for &degrees in [1f32, 2., 3., -2.].iter() {
        let rotated = rotate_about_center(
            &img,
            degrees.to_radians(),
            Interpolation::Bilinear,
            Luma([255u8]),
        );
        let analysis = analyzer
            .analyze(&rotated)
            .with_context(|| format!("rotated by {} degrees", degrees))?;
        assert_eq!(analysis.state.board, board, "{} degrees", degrees);
        assert_eq!(analysis.state.rack, rack, "{} degrees", degrees);
    }
    Ok(())
}

#[test]
fn test_analyze_skewed_screenshot() -> Result<()> {
    let (board, rack, img) = screenshot(&RenderStyle {
        scale: 2,
        margin: 40,
    })?;
    // (7, 6) holds a blank tile
    assert!(board.get(Position::new(7, 6)).map_or(false, |tile| tile.blank));
    let analyzer = analyzer(AnalyzerConfig::default());
    let (w, h) = (img.width() as f32, img.height() as f32);
    for &skew in [0.01f32, 0.04].iter() {
        // the top edge is further away than the bottom edge
        let from = [(0., 0.), (w, 0.), (w, h), (0., h)];
        let to = [(skew * w, 0.), ((1. - skew) * w, 0.), (w, h), (0., h)];
        let projection =
            Projection::from_control_points(from, to).context("degenerate projection")?;
        let skewed = warp(&img, &projection, Interpolation::Bilinear, Luma([255u8]));
        let analysis = analyzer
            .analyze(&skewed)
            .with_context(|| format!("skewed by {}", skew))?;
        assert_eq!(analysis.state.board, board, "skew {}", skew);
        assert_eq!(analysis.state.rack, rack, "skew {}", skew);
    }
    Ok(())
}

#[test]
fn test_analyze_empty_rack() -> Result<()> {
    let board = board()?;
    let img = render_screenshot(&board, &[], &RenderStyle::default());
    let analysis = analyzer(AnalyzerConfig::default()).analyze(&img)?;
    assert_eq!(analysis.state.board, board);
    assert!(analysis.state.rack.is_empty());
    assert!(analysis.rack_readings.is_empty());
    assert!(analysis.moves.is_empty());
    Ok(())
}

#[test]
fn test_uncertain_cell() -> Result<()> {
    let style = RenderStyle::default();
    let (_, _, mut img) = screenshot(&style)?;
    // scribble over the R
    let pos = Position::new(7, 8);
    let r = style.cell_rect(pos);
    for y in r.y + 8..r.y + 36 {
        for x in r.x + 8..r.x + 28 {
            let value = if (x + y) % 2 == 0 { 30 } else { 235 };
            img.put_pixel(x, y, Luma([value]));
        }
    }
    match analyzer(AnalyzerConfig::default()).analyze(&img) {
        Err(Error::UncertainCells { board, rack }) => {
            assert!(board.contains(&pos), "{:?}", board);
            assert!(rack.is_empty());
        }
        Err(err) => return Err(err.into()),
        Ok(analysis) => panic!("expected uncertain cells, got\n{}", analysis.state.board),
    }

    // the best guess still reads a tile there
    let config = AnalyzerConfig::default().with_uncertain_policy(UncertainPolicy::BestGuess);
    let analysis = analyzer(config).analyze(&img)?;
    assert!(analysis.state.board.is_occupied(pos));
    assert!(analysis.readings[pos.index()].confidence < 0.8);
    Ok(())
}

#[test]
fn test_no_grid() -> Result<()> {
    let img = GrayImage::from_pixel(400, 400, Luma([255u8]));
    match analyzer(AnalyzerConfig::default()).analyze(&img) {
        Err(Error::GridNotFound { .. }) => Ok(()),
        Err(err) => Err(err.into()),
        Ok(_) => panic!("found a board in a blank image"),
    }
}

#[test]
fn test_analyze_memory_and_file() -> Result<()> {
    let (board, _, img) = screenshot(&RenderStyle::default())?;
    let analyzer = analyzer(AnalyzerConfig::default().with_top_n(Some(3)));

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(img.clone()).write_to(&mut png, ImageOutputFormat::Png)?;
    let analysis = analyzer.analyze_memory(&png)?;
    assert_eq!(analysis.state.board, board);
    assert!(analysis.moves.len() <= 3);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("screenshot.png");
    img.save(&path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    let analysis = analyzer.analyze_file(&path)?;
    assert_eq!(analysis.state.board, board);

    let missing = analyzer.analyze_file(dir.path().join("missing.png"));
    assert!(matches!(missing, Err(Error::ImageError { .. })));
    Ok(())
}
