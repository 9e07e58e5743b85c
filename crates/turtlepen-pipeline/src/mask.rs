//! Binary mask: the validated foreground/background grid fed to the
//! compiler.
//!
//! Every constructor checks the input shape before any compilation work
//! starts, so a [`BinaryMask`] is always rectangular and non-empty.
//! Background is `false`, foreground is `true`.

use image::GrayImage;

use crate::types::{Dimensions, PipelineError, Pixel};

/// Grayscale value that marks a foreground pixel in a binary image.
pub const FOREGROUND: u8 = 255;

/// Grayscale value that marks a background pixel in a binary image.
pub const BACKGROUND: u8 = 0;

/// A rectangular grid of foreground/background cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl BinaryMask {
    /// Create a mask from row-major cells.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ZeroDimensions`] if either dimension is zero.
    /// Returns [`PipelineError::SizeMismatch`] if `cells.len()` is not
    /// `width * height`.
    pub fn new(width: u32, height: u32, cells: Vec<bool>) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::ZeroDimensions { width, height });
        }
        let expected = cell_count(width, height);
        if cells.len() != expected {
            return Err(PipelineError::SizeMismatch {
                expected,
                found: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Create a mask from rows of cells.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ZeroDimensions`] if there are no rows or the
    /// first row is empty. Returns [`PipelineError::RaggedRows`] if any row
    /// differs in length from the first.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, PipelineError> {
        let expected = rows.first().map_or(0, |row| row.as_ref().len());
        let width = u32::try_from(expected).map_err(|_| PipelineError::SizeMismatch {
            expected: u32::MAX as usize,
            found: expected,
        })?;
        let height = u32::try_from(rows.len()).map_err(|_| PipelineError::SizeMismatch {
            expected: u32::MAX as usize,
            found: rows.len(),
        })?;
        if width == 0 || height == 0 {
            return Err(PipelineError::ZeroDimensions { width, height });
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (row, cells_in_row) in rows.iter().enumerate() {
            let cells_in_row = cells_in_row.as_ref();
            if cells_in_row.len() != expected {
                return Err(PipelineError::RaggedRows {
                    row,
                    expected,
                    found: cells_in_row.len(),
                });
            }
            cells.extend_from_slice(cells_in_row);
        }

        Self::new(width, height, cells)
    }

    /// Convert a strictly binary grayscale image.
    ///
    /// [`FOREGROUND`] (255) is foreground and [`BACKGROUND`] (0) is
    /// background.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ZeroDimensions`] for an empty image and
    /// [`PipelineError::NonBinaryValue`] for the first cell (row-major)
    /// holding any other value.
    pub fn from_gray(image: &GrayImage) -> Result<Self, PipelineError> {
        let cells = image
            .enumerate_pixels()
            .map(|(x, y, pixel)| match pixel.0[0] {
                FOREGROUND => Ok(true),
                BACKGROUND => Ok(false),
                value => Err(PipelineError::NonBinaryValue { x, y, value }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(image.width(), image.height(), cells)
    }

    /// Convert a grayscale image by thresholding: cells at or above `level`
    /// are foreground.
    ///
    /// With `level = 255` only a full-intensity cell is foreground.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ZeroDimensions`] for an empty image.
    pub fn threshold(image: &GrayImage, level: u8) -> Result<Self, PipelineError> {
        let cells = image.pixels().map(|p| p.0[0] >= level).collect();
        Self::new(image.width(), image.height(), cells)
    }

    /// Mask width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Mask dimensions, used as the canvas size of the compiled program.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Whether the cell at `(x, y)` is foreground. Out-of-bounds cells
    /// read as background.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.cells[self.index(x, y)]
    }

    /// Number of foreground cells.
    #[must_use]
    pub fn foreground_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Foreground cells in row-major order.
    pub fn foreground_pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        let width = self.width;
        (0..self.height)
            .flat_map(move |y| (0..width).map(move |x| Pixel::new(x, y)))
            .filter(|p| self.get(p.x, p.y))
    }

    /// Row-major index of `(x, y)`. Callers check bounds.
    pub(crate) const fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

const fn cell_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_dimensions() {
        let result = BinaryMask::new(0, 3, Vec::new());
        assert!(matches!(
            result,
            Err(PipelineError::ZeroDimensions {
                width: 0,
                height: 3
            })
        ));
    }

    #[test]
    fn new_rejects_wrong_cell_count() {
        let result = BinaryMask::new(2, 2, vec![false; 3]);
        assert!(matches!(
            result,
            Err(PipelineError::SizeMismatch {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let rows = vec![vec![true, false], vec![true], vec![false, false]];
        let result = BinaryMask::from_rows(&rows);
        assert!(matches!(
            result,
            Err(PipelineError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn from_rows_rejects_empty_input() {
        let rows: Vec<Vec<bool>> = Vec::new();
        assert!(matches!(
            BinaryMask::from_rows(&rows),
            Err(PipelineError::ZeroDimensions { .. })
        ));

        let rows: Vec<Vec<bool>> = vec![Vec::new()];
        assert!(matches!(
            BinaryMask::from_rows(&rows),
            Err(PipelineError::ZeroDimensions { .. })
        ));
    }

    #[test]
    fn from_rows_reads_row_major() {
        let mask = BinaryMask::from_rows(&[[false, true, false], [true, false, false]]).unwrap();
        assert_eq!(mask.width(), 3);
        assert_eq!(mask.height(), 2);
        assert!(mask.get(1, 0));
        assert!(mask.get(0, 1));
        assert!(!mask.get(2, 1));
        let pixels: Vec<Pixel> = mask.foreground_pixels().collect();
        assert_eq!(pixels, vec![Pixel::new(1, 0), Pixel::new(0, 1)]);
    }

    #[test]
    fn out_of_bounds_reads_as_background() {
        let mask = BinaryMask::from_rows(&[[true]]).unwrap();
        assert!(mask.get(0, 0));
        assert!(!mask.get(1, 0));
        assert!(!mask.get(0, 1));
    }

    #[test]
    fn from_gray_accepts_binary_image() {
        let mut img = GrayImage::new(4, 3);
        img.put_pixel(2, 1, image::Luma([FOREGROUND]));
        let mask = BinaryMask::from_gray(&img).unwrap();
        assert_eq!(mask.dimensions(), Dimensions { width: 4, height: 3 });
        assert_eq!(mask.foreground_count(), 1);
        assert!(mask.get(2, 1));
    }

    #[test]
    fn from_gray_rejects_gray_values() {
        let mut img = GrayImage::new(4, 3);
        img.put_pixel(3, 2, image::Luma([128]));
        assert!(matches!(
            BinaryMask::from_gray(&img),
            Err(PipelineError::NonBinaryValue {
                x: 3,
                y: 2,
                value: 128
            })
        ));
    }

    #[test]
    fn from_gray_rejects_empty_image() {
        let img = GrayImage::new(0, 0);
        assert!(matches!(
            BinaryMask::from_gray(&img),
            Err(PipelineError::ZeroDimensions { .. })
        ));
    }

    #[test]
    fn threshold_only_counts_values_at_or_above_level() {
        let img = GrayImage::from_fn(3, 1, |x, _| image::Luma([[0, 254, 255][x as usize]]));
        let strict = BinaryMask::threshold(&img, 255).unwrap();
        assert_eq!(strict.foreground_count(), 1);
        let lenient = BinaryMask::threshold(&img, 128).unwrap();
        assert_eq!(lenient.foreground_count(), 2);
    }
}
