//! Software rotation
//!
//! The renderer draws in logical coordinates. For a panel mounted at 90°
//! or 270° the logical raster is the panel's native raster with width and
//! height swapped. Rotation is clockwise.

use crate::buffer::Area;
use crate::config::Rotation;
use crate::error::DisplayError;

/// Size of a `width` x `height` raster after rotation
pub const fn rotated_size(width: u16, height: u16, rotation: Rotation) -> (u16, u16) {
    if rotation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Map a logical rectangle onto the panel
///
/// `logical_width` and `logical_height` are the renderer's resolution.
/// Coordinates beyond it are clamped to the panel edge.
pub fn rotate_area(area: &Area, rotation: Rotation, logical_width: u16, logical_height: u16) -> Area {
    let right = |x: u16| logical_width.saturating_sub(1).saturating_sub(x);
    let bottom = |y: u16| logical_height.saturating_sub(1).saturating_sub(y);
    match rotation {
        Rotation::Deg0 => *area,
        Rotation::Deg90 => Area::new(bottom(area.y2), area.x1, bottom(area.y1), area.x2),
        Rotation::Deg180 => Area::new(right(area.x2), bottom(area.y2), right(area.x1), bottom(area.y1)),
        Rotation::Deg270 => Area::new(area.y1, right(area.x2), area.y2, right(area.x1)),
    }
}

/// Rotate a packed `width` x `height` raster of `bpp`-byte pixels into `dst`
///
/// `dst` receives a packed raster of [`rotated_size`]. 0° is a plain copy.
pub fn rotate_pixels(
    src: &[u8],
    width: u16,
    height: u16,
    bpp: usize,
    rotation: Rotation,
    dst: &mut [u8],
) -> Result<(), DisplayError> {
    let w = width as usize;
    let h = height as usize;
    let len = w * h * bpp;
    if bpp == 0 || src.len() < len || dst.len() < len {
        return Err(DisplayError::InvalidParameter);
    }

    if rotation == Rotation::Deg0 {
        dst[..len].copy_from_slice(&src[..len]);
        return Ok(());
    }

    for y in 0..h {
        for x in 0..w {
            let to = match rotation {
                Rotation::Deg90 => x * h + (h - 1 - y),
                Rotation::Deg180 => (h - 1 - y) * w + (w - 1 - x),
                Rotation::Deg270 => (w - 1 - x) * h + y,
                Rotation::Deg0 => y * w + x,
            };
            let from = (y * w + x) * bpp;
            dst[to * bpp..(to + 1) * bpp].copy_from_slice(&src[from..from + bpp]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_90_pixels() {
        // 3 x 2          2 x 3
        // a b c          d a
        // d e f   ->     e b
        //                f c
        let src = *b"abcdef";
        let mut dst = [0u8; 6];
        rotate_pixels(&src, 3, 2, 1, Rotation::Deg90, &mut dst).unwrap();
        assert_eq!(&dst, b"daebfc");
    }

    #[test]
    fn test_rotate_270_pixels() {
        let src = *b"abcdef";
        let mut dst = [0u8; 6];
        rotate_pixels(&src, 3, 2, 1, Rotation::Deg270, &mut dst).unwrap();
        assert_eq!(&dst, b"cfbead");
    }

    #[test]
    fn test_rotate_180_pixels_multibyte() {
        let src = [1, 2, 3, 4, 5, 6];
        let mut dst = [0u8; 6];
        rotate_pixels(&src, 3, 1, 2, Rotation::Deg180, &mut dst).unwrap();
        assert_eq!(dst, [5, 6, 3, 4, 1, 2]);
    }

    #[test]
    fn test_rotate_area_90() {
        // Logical 320 x 240 on a 240 x 320 panel
        let area = Area::new(0, 0, 9, 4);
        assert_eq!(rotate_area(&area, Rotation::Deg90, 320, 240), Area::new(235, 0, 239, 9));
    }

    #[test]
    fn test_rotate_area_matches_pixel_rotation() {
        // The top-left logical pixel lands where rotate_pixels puts it
        let area = Area::new(2, 1, 4, 2);
        let (lw, lh) = (6, 4);
        let target = rotate_area(&area, Rotation::Deg270, lw, lh);
        // (x, y) -> (y, lw - 1 - x)
        assert_eq!((target.x1, target.y2), (1, 3));
        assert_eq!(target.width(), area.height());
        assert_eq!(target.height(), area.width());
    }

    #[test]
    fn test_rotate_area_clamps_off_panel_coordinates() {
        let area = Area::new(0, 0, 20, 20);
        assert_eq!(rotate_area(&area, Rotation::Deg180, 8, 4), Area::new(0, 0, 7, 3));
        assert_eq!(rotate_area(&area, Rotation::Deg90, 0, 0), Area::new(0, 0, 0, 20));
    }

    #[test]
    fn test_short_buffers_rejected() {
        let mut dst = [0u8; 2];
        assert_eq!(
            rotate_pixels(&[0u8; 6], 3, 2, 1, Rotation::Deg90, &mut dst),
            Err(DisplayError::InvalidParameter)
        );
    }
}
