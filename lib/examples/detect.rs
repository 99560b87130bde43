use anyhow::{Context, Result};
use crossplay_solver::{board_collage, collage, BoardDetector};
use image::DynamicImage;
use imageproc::drawing::draw_antialiased_line_segment_mut;
use imageproc::pixelops::interpolate;

fn run() -> Result<()> {
    env_logger::init();
    let path = std::env::args().nth(1).expect("Usage: detect SCREENSHOT");
    eprintln!("read image from {}", path);
    let gray = image::open(&path)
        .with_context(|| format!("Failed to open {}", path))?
        .into_luma8();
    let detection = BoardDetector::default().detect(&gray)?;

    eprintln!("grid confidence: {:.3}", detection.confidence);
    for (name, corner) in ["top left", "top right", "bottom right", "bottom left"]
        .iter()
        .zip(detection.corners.iter())
    {
        eprintln!("  {}: {:.1},{:.1}", name, corner.0, corner.1);
    }
    for (i, r) in detection.rack_areas.iter().enumerate() {
        eprintln!("  Rack {}: {},{} {}x{}", i, r.x, r.y, r.width, r.height);
    }

    // draw the board outline in the image
    let red = image::Rgba([255, 0, 0, 255]);
    let mut img = DynamicImage::ImageLuma8(gray.clone()).into_rgba8();
    let corners = detection.corners;
    for i in 0..4 {
        let (x0, y0) = corners[i];
        let (x1, y1) = corners[(i + 1) % 4];
        draw_antialiased_line_segment_mut(
            &mut img,
            (x0 as i32, y0 as i32),
            (x1 as i32, y1 as i32),
            red,
            interpolate,
        );
    }
    img.save("detected.png")?;
    detection.board.save("board.png")?;
    board_collage(&detection).save("collage.png")?;
    if !detection.rack_areas.is_empty() {
        collage(&detection.rack_band, &detection.rack_areas, Some(1)).save("rack.png")?;
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{}", err);
    }
}
