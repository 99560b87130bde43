use anyhow::{Context, Result};
use crossplay_solver::{save_templates, Board, BoardDetector, Rack};

/// Save the tiles of a screenshot as glyph templates. The board text and the rack
/// must describe what the screenshot shows.
fn run() -> Result<()> {
    env_logger::init();
    let usage = "Usage: capture SCREENSHOT BOARD.txt RACK SAVEDIR";
    let mut args = std::env::args().skip(1);
    let path = args.next().expect(usage);
    let board_path = args.next().expect(usage);
    let rack: Rack = args.next().expect(usage).parse()?;
    let savedir = args.next().expect(usage);

    let text = std::fs::read_to_string(&board_path)
        .with_context(|| format!("Failed to read {}", board_path))?;
    let rows: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let board = Board::from_strings(&rows)?;
    let gray = image::open(&path)
        .with_context(|| format!("Failed to open {}", path))?
        .into_luma8();
    let detection = BoardDetector::default().detect(&gray)?;
    std::fs::create_dir_all(&savedir)?;
    for path in save_templates(&savedir, &detection, &board, &rack.tiles())? {
        println!("save {}", path.display());
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:?}", err);
    }
}
