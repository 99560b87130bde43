use anyhow::Result;
use crossplay_solver::{
    board_collage, render_screenshot, save_templates, Board, BoardDetector, CellClassifier,
    Glyph, GlyphTemplates, Letter, Position, Rack, RenderStyle, Tile, SIZE,
};

/// All 26 letters on the first two rows.
fn alphabet_board() -> Result<Board> {
    let mut rows = vec![String::from("..............."); SIZE];
    rows[0] = String::from("ABCDEFGHIJKLMNO");
    rows[1] = String::from("PQRSTUVWXYZ....");
    Ok(Board::from_strings(&rows)?)
}

#[test]
fn test_captured_templates() -> Result<()> {
    let board = alphabet_board()?;
    let rack: Rack = "E?".parse()?;
    let img = render_screenshot(&board, &rack.tiles(), &RenderStyle::default());
    let detection = BoardDetector::default().detect(&img)?;
    assert_eq!(detection.rack.len(), 2);

    let dir = tempfile::tempdir()?;
    let saved = save_templates(dir.path(), &detection, &board, &rack.tiles())?;
    assert_eq!(saved.len(), 27);
    assert!(dir.path().join("Q.png").exists());
    assert!(dir.path().join("BLANK.png").exists());
    // existing templates are kept
    let saved = save_templates(dir.path(), &detection, &board, &rack.tiles())?;
    assert!(saved.is_empty());

    let templates = GlyphTemplates::from_dir(dir.path())?;
    assert_eq!(templates.letters().len(), 26);
    assert!((templates.blank_tone() - GlyphTemplates::builtin().blank_tone()).abs() < 0.01);

    let classifier = CellClassifier::new(templates);
    for (i, letter) in Letter::all().enumerate() {
        let pos = Position::from_index(i);
        let reading = classifier.classify(&detection.cell(pos));
        assert_eq!(reading.glyph, Glyph::Tile(Tile::new(letter)), "{}", pos);
        assert!(reading.confidence > 0.95);
    }
    let reading = classifier.classify(&detection.rack[1]);
    assert_eq!(reading.glyph, Glyph::Blank);
    Ok(())
}

#[test]
fn test_incomplete_template_dir() -> Result<()> {
    let dir = tempfile::tempdir()?;
    assert!(GlyphTemplates::from_dir(dir.path()).is_err());
    Ok(())
}

#[test]
fn test_board_collage() -> Result<()> {
    let board = alphabet_board()?;
    let img = render_screenshot(&board, &[], &RenderStyle::default());
    let detection = BoardDetector::default().detect(&img)?;
    let sheet = board_collage(&detection);
    assert_eq!(sheet.dimensions(), detection.board.dimensions());
    assert_eq!(sheet, detection.board);
    Ok(())
}
