//! Median cut quantization.
//!
//! The pixels are split in two along the channel with the widest range, at the
//! median, and each half is split again until the requested depth is reached.
//! Every leaf bucket is then replaced by its average color, so a depth of `d`
//! leaves at most `2^d` colors.

use crate::error::{Error, Result};
use crate::pixel_buffer::{PixelBuffer, PixelRecord};
use crate::stack::Stack;
use crate::Quantizer;
use log::debug;
use std::ops::Range;

/// Depth-first traversal keeps at most `depth + 1` buckets pending and the
/// depth never exceeds `usize::BITS - 1`.
const STACK_SIZE: usize = usize::BITS as usize + 1;

#[derive(Default, Clone, Copy, Debug)]
struct Bucket {
    start: usize,
    end: usize,
    depth: u32,
}

/// Reduces a [`PixelBuffer`] to at most `2^floor(log2(n_colors))` colors.
///
/// Note that a `n_colors` which is not a power of two is rounded down, so
/// asking for 12 colors gives at most 8.
#[derive(Default, Clone, Copy, Debug)]
pub struct MedianCutQuantizer {
    parallel: bool,
}

impl MedianCutQuantizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split the two halves of every bucket on the rayon thread pool.
    /// The output is identical either way.
    pub fn parallel(self, parallel: bool) -> Self {
        Self { parallel }
    }
}

impl Quantizer for MedianCutQuantizer {
    fn quantize(&self, buffer: &PixelBuffer, target_colors: usize) -> Result<PixelBuffer> {
        let depth = depth_for(target_colors)?;
        if buffer.is_empty() {
            return Ok(buffer.clone());
        }
        let mut records = buffer.flatten_with_coordinates();
        let buckets = if self.parallel {
            partition_parallel(&mut records, depth)
        } else {
            let mut buckets = 0;
            partition(&mut records, depth, |_| buckets += 1);
            buckets
        };
        debug!(
            "median_cut: depth {depth}, {} pixels, {buckets} buckets",
            records.len()
        );
        Ok(PixelBuffer::from_records(
            buffer.height(),
            buffer.width(),
            &records,
        ))
    }
}

/// `floor(log2(target_colors))`.
pub fn depth_for(target_colors: usize) -> Result<u32> {
    if target_colors < 1 {
        return Err(Error::InvalidArgument {
            name: "target color count",
            value: target_colors,
            expected: "at least 1".to_string(),
        });
    }
    Ok(target_colors.ilog2())
}

/// Splits `records` in place with an explicit work stack. Every leaf bucket is
/// filled with its mean color and reported to `on_leaf` as a range into
/// `records`.
fn partition<F>(records: &mut [PixelRecord], depth: u32, mut on_leaf: F)
where
    F: FnMut(Range<usize>),
{
    let mut stack = Stack::<Bucket, STACK_SIZE>::new();
    stack.push(Bucket {
        start: 0,
        end: records.len(),
        depth,
    });
    while let Some(Bucket { start, end, depth }) = stack.pop() {
        let bucket = &mut records[start..end];
        if bucket.is_empty() {
            continue;
        }
        if depth == 0 || bucket.len() <= 1 {
            fill_mean(bucket);
            on_leaf(start..end);
            continue;
        }
        let mid = start + split(bucket);
        // lower half on top, so buckets are finished in the same order as recursion
        stack.push(Bucket {
            start: mid,
            end,
            depth: depth - 1,
        });
        stack.push(Bucket {
            start,
            end: mid,
            depth: depth - 1,
        });
    }
}

/// Fork-join version of [`partition`]. Returns the number of leaf buckets.
fn partition_parallel(records: &mut [PixelRecord], depth: u32) -> usize {
    if records.is_empty() {
        return 0;
    }
    if depth == 0 || records.len() <= 1 {
        fill_mean(records);
        return 1;
    }
    let mid = split(records);
    let (left, right) = records.split_at_mut(mid);
    let (left, right) = rayon::join(
        || partition_parallel(left, depth - 1),
        || partition_parallel(right, depth - 1),
    );
    left + right
}

/// Sorts the bucket along its widest channel and returns the split index.
/// The upper half gets the extra record when the length is odd.
fn split(bucket: &mut [PixelRecord]) -> usize {
    let channel = widest_channel(bucket);
    // stable, equal values keep their row-major order; `+ 0.0` folds -0.0 into 0.0
    bucket.sort_by(|a, b| (a.color[channel] + 0.0).total_cmp(&(b.color[channel] + 0.0)));
    bucket.len() / 2
}

/// Index of the channel with the largest `max - min`, the lowest index
/// winning ties.
fn widest_channel(bucket: &[PixelRecord]) -> usize {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for record in bucket {
        for c in 0..3 {
            min[c] = min[c].min(record.color[c]);
            max[c] = max[c].max(record.color[c]);
        }
    }
    let range = |c: usize| max[c] - min[c];
    let mut widest = 0;
    for c in 1..3 {
        if range(c) > range(widest) {
            widest = c;
        }
    }
    widest
}

fn fill_mean(bucket: &mut [PixelRecord]) {
    if bucket.is_empty() {
        return;
    }
    let mut sum = [0f64; 3];
    for record in bucket.iter() {
        sum.iter_mut()
            .zip(record.color)
            .for_each(|(s, c)| *s += f64::from(c));
    }
    let n = bucket.len() as f64;
    let mean = sum.map(|s| (s / n) as f32);
    bucket.iter_mut().for_each(|record| record.color = mean);
}
