// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Annotation of evaluation images.

use image::{ImageResult, Rgb, RgbImage};
use std::path::Path;

/// Color of the rectangles drawn by `annotate_file`.
pub const HIGHLIGHT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Stroke width of the rectangles drawn by `annotate_file`.
pub const HIGHLIGHT_THICKNESS: u32 = 5;

/// Draw the outline of a rectangle given by two opposite corners.
///
/// Coordinates have their origin at the bottom left of the image,
/// and both corners are part of the rectangle.
/// The stroke grows towards the inside, parts outside of the image are clipped.
pub fn draw_rectangle(
    img: &mut RgbImage,
    bottom_left: (u32, u32),
    top_right: (u32, u32),
    color: Rgb<u8>,
    thickness: u32,
) {
    let height = i64::from(img.height());
    let flip = |y: u32| height - i64::from(y);
    let (left, right) = ordered(i64::from(bottom_left.0), i64::from(top_right.0));
    let (top, bottom) = ordered(flip(top_right.1), flip(bottom_left.1));
    let thickness = i64::from(thickness);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let (x, y) = (i64::from(x), i64::from(y));
        let inside = x >= left && x <= right && y >= top && y <= bottom;
        let on_stroke = x - left < thickness
            || right - x < thickness
            || y - top < thickness
            || bottom - y < thickness;
        if inside && on_stroke {
            *pixel = color;
        }
    }
}

fn ordered(a: i64, b: i64) -> (i64, i64) {
    (a.min(b), a.max(b))
}

/// Highlight a region of an image file and save the result to another file.
pub fn annotate_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    bottom_left: (u32, u32),
    top_right: (u32, u32),
) -> ImageResult<()> {
    let mut img = image::open(input)?.to_rgb8();
    draw_rectangle(
        &mut img,
        bottom_left,
        top_right,
        HIGHLIGHT_COLOR,
        HIGHLIGHT_THICKNESS,
    );
    img.save(output)
}

// TESTS #############################################################

#[cfg(test)]
mod tests {

    use super::*;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn red_pixels(img: &RgbImage) -> Vec<(u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| **p == HIGHLIGHT_COLOR)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn origin_is_bottom_left() {
        let mut img = RgbImage::new(10, 10);
        draw_rectangle(&mut img, (2, 1), (4, 3), HIGHLIGHT_COLOR, 1);
        // Rows 7 to 9 from the top, columns 2 to 4.
        let mut expected = Vec::new();
        for y in 7..=9 {
            for x in 2..=4 {
                if !(x == 3 && y == 8) {
                    expected.push((x, y));
                }
            }
        }
        assert_eq!(red_pixels(&img), expected);
        assert_eq!(img.get_pixel(3, 8), &BLACK);
    }

    #[test]
    fn thick_stroke_fills_small_rectangles() {
        let mut img = RgbImage::new(8, 8);
        draw_rectangle(&mut img, (1, 1), (4, 4), HIGHLIGHT_COLOR, 5);
        assert_eq!(red_pixels(&img).len(), 16);
    }

    #[test]
    fn outside_parts_are_clipped() {
        let mut img = RgbImage::new(6, 4);
        draw_rectangle(&mut img, (3, 0), (20, 2), HIGHLIGHT_COLOR, 1);
        // Bottom edge is at row 4, out of the image.
        assert_eq!(img.get_pixel(3, 2), &HIGHLIGHT_COLOR);
        assert_eq!(img.get_pixel(5, 2), &HIGHLIGHT_COLOR);
        assert_eq!(img.get_pixel(3, 3), &HIGHLIGHT_COLOR);
        assert_eq!(img.get_pixel(4, 3), &BLACK);
    }
}
