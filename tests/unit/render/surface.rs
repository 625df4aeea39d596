use std::{io::Cursor, sync::Arc};

use super::*;
use crate::{
    assets::{
        cache::{CachePolicy, ImageCache},
        fetch::ImageFetcher,
    },
    style::paint::Gradient,
};

struct StaticFetcher(Vec<u8>);

impl ImageFetcher for StaticFetcher {
    fn fetch(&self, _reference: &str) -> CanvasResult<Vec<u8>> {
        Ok(self.0.clone())
    }
}

fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> Arc<LoadedImage> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    ImageCache::new(CachePolicy::default())
        .get_or_load("solid", &StaticFetcher(png))
        .unwrap()
}

const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
const BLUE: Rgba8 = Rgba8::new(0, 0, 255, 255);

#[test]
fn new_rejects_out_of_range_dimensions() {
    assert!(Surface::new(0, 10, Rgba8::TRANSPARENT).is_err());
    assert!(Surface::new(10, 0, Rgba8::TRANSPARENT).is_err());
    assert!(Surface::new(70_000, 10, Rgba8::TRANSPARENT).is_err());
    let s = Surface::new(12, 7, Rgba8::TRANSPARENT).unwrap();
    assert_eq!((s.width(), s.height()), (12, 7));
}

#[test]
fn finish_returns_cleared_premultiplied_frame() {
    let frame = Surface::new(4, 3, Rgba8::new(10, 20, 30, 255))
        .unwrap()
        .finish();
    assert_eq!((frame.width, frame.height), (4, 3));
    assert!(frame.premultiplied);
    assert_eq!(frame.data.len(), 4 * 3 * 4);
    assert_eq!(frame.pixel(3, 2), [10, 20, 30, 255]);

    let blank = Surface::new(2, 2, Rgba8::TRANSPARENT).unwrap().finish();
    assert!(blank.data.iter().all(|&b| b == 0));
}

#[test]
fn fill_rect_uses_current_fill() {
    let mut s = Surface::new(10, 10, Rgba8::TRANSPARENT).unwrap();
    s.set_fill(FillStyle::Solid(RED));
    s.fill_rect(Rect::new(2.0, 2.0, 6.0, 6.0));
    let frame = s.finish();
    assert_eq!(frame.pixel(3, 3), [255, 0, 0, 255]);
    assert_eq!(frame.pixel(8, 8), [0, 0, 0, 0]);
}

#[test]
fn default_fill_is_opaque_black_and_default_font_is_10px_sans() {
    let s = Surface::new(1, 1, Rgba8::TRANSPARENT).unwrap();
    assert_eq!(s.state().fill, FillStyle::Solid(Rgba8::BLACK));
    assert_eq!(s.state().font, FontSpec::default());
}

#[test]
fn restore_returns_to_saved_state() {
    let mut s = Surface::new(4, 4, Rgba8::TRANSPARENT).unwrap();
    s.set_fill(FillStyle::Solid(RED));
    s.save();
    s.set_fill(FillStyle::Solid(BLUE));
    s.set_font(FontSpec::parse("bold 20px Body").unwrap());
    assert_eq!(s.depth(), 1);
    s.restore();

    assert_eq!(s.depth(), 0);
    assert_eq!(s.state().fill, FillStyle::Solid(RED));
    assert_eq!(s.state().font, FontSpec::default());
}

#[test]
fn restore_without_save_is_a_no_op() {
    let mut s = Surface::new(4, 4, Rgba8::TRANSPARENT).unwrap();
    s.set_fill(FillStyle::Solid(RED));
    s.restore();
    assert_eq!(s.state().fill, FillStyle::Solid(RED));
}

#[test]
fn with_saved_restores_after_an_error() {
    let mut s = Surface::new(4, 4, Rgba8::TRANSPARENT).unwrap();
    let out: CanvasResult<()> = s.with_saved(|s| {
        s.set_fill(FillStyle::Solid(BLUE));
        s.clip_circle(Point::new(2.0, 2.0), 1.0);
        Err(CanvasError::text("boom"))
    });
    assert!(out.is_err());
    assert_eq!(s.depth(), 0);
    assert_eq!(s.state().fill, FillStyle::Solid(Rgba8::BLACK));
}

#[test]
fn circle_clip_is_released_on_restore() {
    let mut s = Surface::new(20, 20, Rgba8::TRANSPARENT).unwrap();
    s.with_saved(|s| {
        s.clip_circle(Point::new(5.0, 5.0), 4.0);
        s.set_fill(FillStyle::Solid(RED));
        s.fill_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        Ok(())
    })
    .unwrap();
    s.set_fill(FillStyle::Solid(BLUE));
    s.fill_rect(Rect::new(12.0, 12.0, 20.0, 20.0));
    let frame = s.finish();

    assert_eq!(frame.pixel(5, 5), [255, 0, 0, 255]);
    assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
    assert_eq!(frame.pixel(15, 5), [0, 0, 0, 0]);
    assert_eq!(frame.pixel(15, 15), [0, 0, 255, 255]);
}

#[test]
fn finish_closes_unbalanced_clips() {
    let mut s = Surface::new(8, 8, Rgba8::TRANSPARENT).unwrap();
    s.clip_circle(Point::new(4.0, 4.0), 2.0);
    s.save();
    s.clip_circle(Point::new(4.0, 4.0), 3.0);
    s.set_fill(FillStyle::Solid(RED));
    s.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0));
    let frame = s.finish();
    assert_eq!(frame.pixel(4, 4), [255, 0, 0, 255]);
    assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
}

#[test]
fn draw_image_stretches_into_destination() {
    let image = solid_image(2, 2, [0, 255, 0, 255]);
    let mut s = Surface::new(30, 20, Rgba8::TRANSPARENT).unwrap();
    s.draw_image(&image, Rect::new(5.0, 5.0, 25.0, 15.0));
    let frame = s.finish();

    assert_eq!(frame.pixel(6, 6), [0, 255, 0, 255]);
    assert_eq!(frame.pixel(24, 14), [0, 255, 0, 255]);
    assert_eq!(frame.pixel(2, 2), [0, 0, 0, 0]);
    assert_eq!(frame.pixel(27, 17), [0, 0, 0, 0]);
}

#[test]
fn draw_image_skips_empty_destination() {
    let image = solid_image(1, 1, [0, 255, 0, 255]);
    let mut s = Surface::new(4, 4, Rgba8::TRANSPARENT).unwrap();
    s.draw_image(&image, Rect::new(1.0, 1.0, 1.0, 3.0));
    assert!(s.finish().data.iter().all(|&b| b == 0));
}

#[test]
fn gradient_fill_is_in_canvas_coordinates() {
    let gradient = Gradient::linear(0.0, 0.0, 100.0, 0.0)
        .with_stop(0.0, RED)
        .with_stop(1.0, BLUE);
    let mut s = Surface::new(100, 4, Rgba8::TRANSPARENT).unwrap();
    s.set_fill(FillStyle::Gradient(gradient));
    s.fill_rect(Rect::new(0.0, 0.0, 100.0, 4.0));
    let frame = s.finish();

    let left = frame.pixel(2, 2);
    let right = frame.pixel(97, 2);
    assert!(left[0] > 200 && left[2] < 50, "left {left:?}");
    assert!(right[2] > 200 && right[0] < 50, "right {right:?}");
}

#[test]
fn single_stop_gradient_paints_its_color() {
    let mut s = Surface::new(4, 4, Rgba8::TRANSPARENT).unwrap();
    s.set_fill(FillStyle::Gradient(
        Gradient::linear(0.0, 0.0, 4.0, 0.0).with_stop(0.5, BLUE),
    ));
    assert_eq!(s.state().fill, FillStyle::Solid(BLUE));
}

#[test]
fn rounded_rect_leaves_corners_empty() {
    let mut s = Surface::new(40, 20, Rgba8::TRANSPARENT).unwrap();
    s.set_fill(FillStyle::Solid(RED));
    s.fill_rounded_rect(Rect::new(0.0, 0.0, 40.0, 20.0), 10.0);
    let frame = s.finish();
    assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
    assert_eq!(frame.pixel(20, 10), [255, 0, 0, 255]);
}
