use crate::error::{Error, Result};
use image::{DynamicImage, Rgb, Rgb32FImage};
use std::collections::HashMap;

/// A dense, row-major `H x W x 3` array of channel values, as handed over by
/// whatever loaded the image.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorArray {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl ColorArray {
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<f32>) -> Self {
        Self {
            shape: shape.into(),
            data,
        }
    }
}

/// A color together with the cell it was taken from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PixelRecord {
    pub color: [f32; 3],
    pub row: u32,
    pub col: u32,
}

/// A distinct color of a [`PixelBuffer`] and the number of pixels holding it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub color: [f32; 3],
    pub count: usize,
}

/// An image as a fixed `height x width` grid of RGB values.
///
/// Channel values are stored as `f32` in whatever range the caller uses and
/// are never clamped or rounded.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    img: Rgb32FImage,
}

impl PixelBuffer {
    /// Builds a buffer from an `H x W x 3` array.
    ///
    /// Fails with [`Error::Shape`] if the array is not rank 3, its last
    /// dimension is not 3, or its data does not fill the shape exactly.
    pub fn from_source(array: ColorArray) -> Result<Self> {
        let ColorArray { shape, data } = array;
        let len = data.len();
        let dims = match shape.as_slice() {
            &[height, width, 3] => Some((height, width)),
            _ => None,
        };
        let Some((height, width)) = dims.filter(|&(height, width)| {
            height.checked_mul(width).and_then(|n| n.checked_mul(3)) == Some(len)
        }) else {
            return Err(Error::Shape { shape, len });
        };
        let (Ok(height), Ok(width)) = (u32::try_from(height), u32::try_from(width)) else {
            return Err(Error::Shape { shape, len });
        };
        let img = Rgb32FImage::from_raw(width, height, data).ok_or(Error::Shape { shape, len })?;
        Ok(Self { img })
    }

    /// Converts a decoded image to float RGB, channel values in `0.0..=1.0`.
    pub fn from_image(img: &DynamicImage) -> Self {
        Self {
            img: img.to_rgb32f(),
        }
    }

    pub(crate) fn from_records(height: u32, width: u32, records: &[PixelRecord]) -> Self {
        let mut img = Rgb32FImage::new(width, height);
        for record in records {
            img.put_pixel(record.col, record.row, Rgb(record.color));
        }
        Self { img }
    }

    pub(crate) fn map_pixels<F>(&self, mut f: F) -> Self
    where
        F: FnMut(usize, [f32; 3]) -> [f32; 3],
    {
        let mut img = self.img.clone();
        img.pixels_mut()
            .enumerate()
            .for_each(|(i, p)| *p = Rgb(f(i, p.0)));
        Self { img }
    }

    /// Copies the buffer back out as an `H x W x 3` array.
    pub fn to_array(&self) -> ColorArray {
        ColorArray::new(self.shape(), self.img.as_raw().clone())
    }

    /// All cells as records, in row-major order.
    pub(crate) fn flatten_with_coordinates(&self) -> Vec<PixelRecord> {
        self.img
            .enumerate_pixels()
            .map(|(col, row, p)| PixelRecord {
                color: p.0,
                row,
                col,
            })
            .collect()
    }

    pub(crate) fn colors(&self) -> Vec<[f32; 3]> {
        self.img.pixels().map(|p| p.0).collect()
    }

    /// Distinct colors with their pixel counts, in order of first appearance.
    pub fn palette(&self) -> Vec<PaletteEntry> {
        let mut index = HashMap::new();
        let mut entries: Vec<PaletteEntry> = Vec::new();
        for p in self.img.pixels() {
            let i = *index.entry(p.0.map(f32::to_bits)).or_insert_with(|| {
                entries.push(PaletteEntry {
                    color: p.0,
                    count: 0,
                });
                entries.len() - 1
            });
            entries[i].count += 1;
        }
        entries
    }

    /// # Panics
    ///
    /// Panics if `(row, col)` is outside the buffer.
    #[inline]
    pub fn get(&self, row: u32, col: u32) -> [f32; 3] {
        self.img.get_pixel(col, row).0
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.img.height()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.img.width()
    }

    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        [self.height() as usize, self.width() as usize, 3]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.height() as usize * self.width() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn as_image(&self) -> &Rgb32FImage {
        &self.img
    }

    #[inline]
    pub fn into_image(self) -> Rgb32FImage {
        self.img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array_2x2() -> ColorArray {
        ColorArray::new(
            [2, 2, 3],
            vec![
                0.0, 1.0, 2.0, 3.0, 4.0, 5.0, //
                6.0, 7.0, 8.0, 9.0, 10.0, 11.0,
            ],
        )
    }

    #[test]
    fn from_source_and_back() {
        let buffer = PixelBuffer::from_source(array_2x2()).unwrap();
        assert_eq!(buffer.shape(), [2, 2, 3]);
        assert_eq!(buffer.get(0, 1), [3.0, 4.0, 5.0]);
        assert_eq!(buffer.get(1, 0), [6.0, 7.0, 8.0]);
        assert_eq!(buffer.to_array(), array_2x2());
    }

    #[test]
    fn from_source_rejects_bad_shapes() {
        let bad = [
            ColorArray::new([2, 2], vec![0.0; 4]),
            ColorArray::new([2, 2, 4], vec![0.0; 16]),
            ColorArray::new([2, 2, 3, 1], vec![0.0; 12]),
            ColorArray::new([2, 2, 3], vec![0.0; 11]),
            ColorArray::new([usize::MAX, 2, 3], vec![]),
        ];
        for array in bad {
            let shape = array.shape.clone();
            match PixelBuffer::from_source(array) {
                Err(Error::Shape { shape: got, .. }) => assert_eq!(got, shape),
                other => panic!("expected shape error for {shape:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_buffer() {
        let buffer = PixelBuffer::from_source(ColorArray::new([0, 5, 3], vec![])).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.shape(), [0, 5, 3]);
        assert!(buffer.flatten_with_coordinates().is_empty());
        assert!(buffer.palette().is_empty());
    }

    #[test]
    fn flatten_is_row_major() {
        let buffer = PixelBuffer::from_source(array_2x2()).unwrap();
        let coords: Vec<_> = buffer
            .flatten_with_coordinates()
            .iter()
            .map(|r| (r.row, r.col))
            .collect();
        assert_eq!(coords, [(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn palette_counts_in_first_appearance_order() {
        let array = ColorArray::new(
            [1, 4, 3],
            vec![
                1.0, 1.0, 1.0, 0.5, 0.5, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
            ],
        );
        let palette = PixelBuffer::from_source(array).unwrap().palette();
        assert_eq!(
            palette,
            [
                PaletteEntry {
                    color: [1.0, 1.0, 1.0],
                    count: 3
                },
                PaletteEntry {
                    color: [0.5, 0.5, 0.5],
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn from_image_uses_unit_range() {
        let img = image::RgbImage::from_pixel(2, 1, Rgb([255, 0, 0]));
        let buffer = PixelBuffer::from_image(&DynamicImage::ImageRgb8(img));
        assert_eq!(buffer.shape(), [1, 2, 3]);
        assert_eq!(buffer.get(0, 1), [1.0, 0.0, 0.0]);
    }
}
