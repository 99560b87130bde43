use anyhow::{Context, Result};
use crossplay_solver::{render_screenshot, Board, Rack, RenderStyle};

fn run() -> Result<()> {
    let usage = "Usage: render BOARD.txt RACK OUTPUT.png [SCALE]";
    let mut args = std::env::args().skip(1);
    let path = args.next().expect(usage);
    let rack: Rack = args.next().expect(usage).parse()?;
    let output = args.next().expect(usage);
    let scale = match args.next() {
        Some(scale) => scale.parse::<u32>().context("SCALE must be a number")?,
        None => 1,
    };

    let text =
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;
    let rows: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let board = Board::from_strings(&rows)?;
    let style = RenderStyle {
        scale,
        ..RenderStyle::default()
    };
    render_screenshot(&board, &rack.tiles(), &style).save(&output)?;
    eprintln!("saved {}", output);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:?}", err);
    }
}
