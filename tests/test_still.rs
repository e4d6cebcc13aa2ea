mod common;

use circlecam::config::{HSV_WINDOW, ORIGINAL_WINDOW};
use circlecam::still::{StillImageViewer, StillViews, load_image};
use common::*;
use image::{ImageBuffer, Rgb, RgbImage};

#[test]
fn loads_images_by_content() -> anyhow::Result<()> {
    let file = write_test_image();
    let img = load_image(file.path())?;
    assert_eq!((img.width(), img.height()), (90, 60));
    Ok(())
}

/// Writes a 90x60 image, left half red and right half blue.
fn write_test_image() -> tempfile::NamedTempFile {
    let img = ImageBuffer::from_fn(90, 60, |x, _| {
        if x < 45 { Rgb([255u8, 0, 0]) } else { Rgb([0u8, 0, 255]) }
    });
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

#[cfg(feature = "opencv")]
#[test]
fn downscales_by_a_third_and_converts_to_hsv() -> anyhow::Result<()> {
    let file = write_test_image();
    let img = load_image(file.path())?;

    let views = StillImageViewer::new().prepare(img)?;

    assert_eq!(views.resized.dimensions(), (30, 20));
    assert_eq!(views.hsv.dimensions(), (30, 20));

    assert_eq!(views.resized.get_pixel(2, 10).0, [255, 0, 0]);
    assert_eq!(views.hsv.get_pixel(2, 10).0, [0, 255, 255]);
    assert_eq!(views.hsv.get_pixel(27, 10).0, [120, 255, 255]);
    Ok(())
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_image(std::path::Path::new("does/not/exist.jpeg")).is_err());
}

#[test]
fn shows_both_windows_and_waits_for_a_key() -> anyhow::Result<()> {
    let viewer = StillImageViewer::new();
    let views = StillViews {
        resized: RgbImage::new(30, 20),
        hsv: RgbImage::new(30, 20),
    };
    let probe = Probe::new();

    viewer.show(&views, FakeDisplay::new(vec![Some(' ')], &probe))?;

    let shown = probe.shown.borrow();
    let windows: Vec<_> = shown.iter().map(|(name, size, _)| (name.as_str(), *size)).collect();
    assert_eq!(windows, vec![(ORIGINAL_WINDOW, (30, 20)), (HSV_WINDOW, (30, 20))]);
    assert!(shown.iter().all(|(_, _, overlay)| overlay.shapes.is_empty()));
    assert_eq!(probe.display_closes.get(), 1);
    Ok(())
}

#[cfg(feature = "opencv")]
#[test]
fn debug_output_saves_every_step() -> anyhow::Result<()> {
    let file = write_test_image();
    let dir = tempfile::TempDir::new()?;
    let out = dir.path().join("debug");

    StillImageViewer::new()
        .with_divisor(2)
        .with_debug(Some(out.clone()))
        .prepare(load_image(file.path())?)?;

    assert!(out.join("00_input/01.png").exists());
    assert!(out.join("01_downscale/01.png").exists());
    assert!(out.join("02_hsv_conversion/01.png").exists());
    Ok(())
}

#[cfg(feature = "opencv")]
#[test]
fn debug_output_refuses_non_empty_directory() -> anyhow::Result<()> {
    let file = write_test_image();
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("keep.txt"), b"x")?;

    let result = StillImageViewer::new()
        .with_debug(Some(dir.path().to_path_buf()))
        .prepare(load_image(file.path())?);

    assert!(result.is_err());
    Ok(())
}
