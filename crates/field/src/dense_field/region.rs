//! Window extraction around a pixel

use tracing::trace;

use super::DenseField;
use crate::raster::Raster;

/// Values extracted from a [`DenseField`] around a centre pixel
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub u: Raster<f64>,
    pub v: Raster<f64>,
    pub mask: Raster<u8>,
}

impl DenseField {
    /// Extract the window `[x - rad, x + rad] x [y - rad, y + rad]`.
    ///
    /// Parts of the window outside the image are dropped when `truncate` is
    /// set, otherwise they are filled with zeros (mask included) so the
    /// result is `2 * rad + 1` square whenever the centre is inside the image.
    pub fn region(&self, x: i64, y: i64, rad: i64, truncate: bool) -> Region {
        let n_cols = self.n_cols() as i64;
        let n_rows = self.n_rows() as i64;
        if n_cols == 0 || n_rows == 0 {
            return Region {
                u: Raster::new(0, 0, 0.0),
                v: Raster::new(0, 0, 0.0),
                mask: Raster::new(0, 0, 0),
            };
        }

        let left = (x - rad).min(n_cols - 1).max(0) as usize;
        let right = (x + rad).min(n_cols - 1).max(0) as usize;
        let bottom = (y - rad).min(n_rows - 1).max(0) as usize;
        let top = (y + rad).min(n_rows - 1).max(0) as usize;

        let u = self.u.crop(left, bottom, right, top);
        let v = self.v.crop(left, bottom, right, top);
        let mask = self.mask.crop(left, bottom, right, top);

        if truncate {
            return Region { u, v, mask };
        }

        let pad_left = (rad - x).max(0) as usize;
        let pad_right = (x + rad - n_cols + 1).max(0) as usize;
        let pad_bottom = (rad - y).max(0) as usize;
        let pad_top = (y + rad - n_rows + 1).max(0) as usize;
        if pad_left + pad_right + pad_bottom + pad_top > 0 {
            trace!(
                "region: ({}, {}) rad {} padded l{} r{} b{} t{}",
                x,
                y,
                rad,
                pad_left,
                pad_right,
                pad_bottom,
                pad_top
            );
        }

        Region {
            u: u.pad(pad_left, pad_right, pad_bottom, pad_top, 0.0),
            v: v.pad(pad_left, pad_right, pad_bottom, pad_top, 0.0),
            mask: mask.pad(pad_left, pad_right, pad_bottom, pad_top, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 6x6 image numbered 1..=36 in row-major order
    fn numbered() -> DenseField {
        let u = Raster::from_fn(6, 6, |x, y| (y * 6 + x + 1) as f64);
        let mask = u.map(|value| value as u8);
        DenseField::new(u.clone(), u, Some(mask)).unwrap()
    }

    fn rows(raster: &Raster<f64>) -> Vec<Vec<f64>> {
        (0..raster.height()).map(|y| raster.row(y).to_vec()).collect()
    }

    #[test]
    fn test_region_inside_image() {
        let region = numbered().region(3, 3, 2, true);
        assert_eq!(
            rows(&region.u),
            vec![
                vec![8.0, 9.0, 10.0, 11.0, 12.0],
                vec![14.0, 15.0, 16.0, 17.0, 18.0],
                vec![20.0, 21.0, 22.0, 23.0, 24.0],
                vec![26.0, 27.0, 28.0, 29.0, 30.0],
                vec![32.0, 33.0, 34.0, 35.0, 36.0],
            ]
        );
        assert_eq!(region.u, region.v);
        assert_eq!(region.mask.map(f64::from), region.u);
    }

    #[test]
    fn test_region_truncated_at_origin() {
        let region = numbered().region(1, 1, 2, true);
        assert_eq!(
            rows(&region.u),
            vec![
                vec![1.0, 2.0, 3.0, 4.0],
                vec![7.0, 8.0, 9.0, 10.0],
                vec![13.0, 14.0, 15.0, 16.0],
                vec![19.0, 20.0, 21.0, 22.0],
            ]
        );
    }

    #[test]
    fn test_region_padded_at_origin() {
        let region = numbered().region(1, 1, 2, false);
        assert_eq!(
            rows(&region.u),
            vec![
                vec![0.0, 0.0, 0.0, 0.0, 0.0],
                vec![0.0, 1.0, 2.0, 3.0, 4.0],
                vec![0.0, 7.0, 8.0, 9.0, 10.0],
                vec![0.0, 13.0, 14.0, 15.0, 16.0],
                vec![0.0, 19.0, 20.0, 21.0, 22.0],
            ]
        );
        assert_eq!(region.mask.map(f64::from), region.u);
    }

    #[test]
    fn test_region_padded_at_far_corner() {
        let region = numbered().region(4, 4, 2, false);
        assert_eq!(
            rows(&region.v),
            vec![
                vec![15.0, 16.0, 17.0, 18.0, 0.0],
                vec![21.0, 22.0, 23.0, 24.0, 0.0],
                vec![27.0, 28.0, 29.0, 30.0, 0.0],
                vec![33.0, 34.0, 35.0, 36.0, 0.0],
                vec![0.0, 0.0, 0.0, 0.0, 0.0],
            ]
        );
    }

    #[test]
    fn test_default_mask_region_is_ones() {
        let field = DenseField::uniform(6, 6, 1.0, 1.0);
        let region = field.region(0, 0, 1, true);
        assert_eq!(region.mask.dims(), (2, 2));
        assert!(region.mask.as_slice().iter().all(|&m| m == 1));
    }
}
