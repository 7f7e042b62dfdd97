//! Extraction of the 1-D lines of an N-D buffer along one axis.
//!
//! For a row-major buffer of shape `[s0, .., sD-1]` and axis `k`, the buffer is
//! viewed as `[outer, len, inner]` with `outer = s0·..·sk-1`, `len = sk` and
//! `inner = sk+1·..·sD-1`. Line `l` starts at
//! `(l / inner)·len·inner + l % inner` and steps by `inner`. The `inner` lines
//! that share an outer index occupy one contiguous block of `len·inner`
//! samples; blocks never overlap.

use paramorph_image::{Image, Pixel};

use crate::error::MorphologyError;

/// Position of one line in a flat buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDescriptor {
    /// Offset of the first sample.
    pub start: usize,
    /// Distance between consecutive samples.
    pub stride: usize,
    /// Number of samples.
    pub len: usize,
}

impl LineDescriptor {
    /// Buffer offsets of the samples of the line, in order.
    pub fn offsets(&self) -> impl Iterator<Item = usize> {
        let LineDescriptor { start, stride, len } = *self;
        (0..len).map(move |t| start + t * stride)
    }
}

/// The lines of a buffer parallel to one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLayout {
    axis: usize,
    len: usize,
    inner: usize,
    outer: usize,
}

impl LineLayout {
    /// Describe the lines along `axis` of a buffer with the given shape.
    ///
    /// # Errors
    ///
    /// `InvalidAxis` if `axis` is not smaller than the number of axes.
    ///
    /// # Examples
    ///
    /// ```
    /// use paramorph_imgproc::lines::LineLayout;
    ///
    /// let layout = LineLayout::new(&[2, 3, 4], 1).unwrap();
    /// assert_eq!(layout.line_len(), 3);
    /// assert_eq!(layout.stride(), 4);
    /// assert_eq!(layout.num_lines(), 8);
    /// ```
    pub fn new(shape: &[usize], axis: usize) -> Result<Self, MorphologyError> {
        if axis >= shape.len() {
            return Err(MorphologyError::InvalidAxis(axis, shape.len()));
        }
        Ok(Self {
            axis,
            len: shape[axis],
            inner: shape[axis + 1..].iter().product(),
            outer: shape[..axis].iter().product(),
        })
    }

    /// Describe the lines along `axis` of an image whose rank must be `expected_rank`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the image rank differs from `expected_rank`,
    /// `InvalidAxis` if `axis` is out of range.
    pub fn for_image<T, const D: usize>(
        image: &Image<T, D>,
        expected_rank: usize,
        axis: usize,
    ) -> Result<Self, MorphologyError> {
        if image.rank() != expected_rank {
            return Err(MorphologyError::DimensionMismatch {
                expected: expected_rank,
                actual: image.rank(),
            });
        }
        Self::new(&image.size(), axis)
    }

    /// The axis the lines run along.
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Number of samples per line.
    pub fn line_len(&self) -> usize {
        self.len
    }

    /// Distance in the buffer between consecutive samples of a line.
    pub fn stride(&self) -> usize {
        self.inner
    }

    /// Number of lines.
    pub fn num_lines(&self) -> usize {
        self.outer * self.inner
    }

    /// Number of contiguous blocks of lines.
    pub fn num_blocks(&self) -> usize {
        self.outer
    }

    /// Number of samples in a block.
    pub fn block_len(&self) -> usize {
        self.len * self.inner
    }

    /// Whether the lines are contiguous in memory (last axis).
    pub fn is_contiguous(&self) -> bool {
        self.inner == 1
    }

    /// Write-back position of line `index`.
    ///
    /// `index` must be smaller than [`Self::num_lines`].
    pub fn descriptor(&self, index: usize) -> LineDescriptor {
        debug_assert!(index < self.num_lines());
        let (block, lane) = (index / self.inner, index % self.inner);
        LineDescriptor {
            start: block * self.block_len() + lane,
            stride: self.inner,
            len: self.len,
        }
    }

    /// Iterate the descriptors of every line, in buffer order of their first sample.
    pub fn lines(&self) -> AxisLines {
        AxisLines {
            layout: *self,
            next: 0,
        }
    }

    /// Copy a line out of `data` into `buf`, converting to `f64`.
    pub fn extract<T: Pixel>(&self, data: &[T], line: &LineDescriptor, buf: &mut [f64]) {
        for (dst, offset) in buf.iter_mut().zip(line.offsets()) {
            *dst = data[offset].to_f64();
        }
    }

    /// Copy `buf` back into the samples of a line of `data`.
    pub fn write_back(&self, data: &mut [f64], line: &LineDescriptor, buf: &[f64]) {
        for (src, offset) in buf.iter().zip(line.offsets()) {
            data[offset] = *src;
        }
    }

    /// Scatter the lines of block `block` from a line-major buffer into the block's samples.
    ///
    /// `lines` holds every line of the layout back to back, `line_len` samples each.
    pub fn write_block(&self, block: usize, dst: &mut [f64], lines: &[f64]) {
        debug_assert_eq!(dst.len(), self.block_len());
        let first = block * self.inner * self.len;
        for (t, row) in dst.chunks_exact_mut(self.inner).enumerate() {
            for (lane, v) in row.iter_mut().enumerate() {
                *v = lines[first + lane * self.len + t];
            }
        }
    }
}

/// Lazy iterator over the lines of a [`LineLayout`].
///
/// Cloning the iterator or calling [`AxisLines::restart`] starts over.
#[derive(Debug, Clone)]
pub struct AxisLines {
    layout: LineLayout,
    next: usize,
}

impl AxisLines {
    /// Go back to the first line.
    pub fn restart(&mut self) {
        self.next = 0;
    }
}

impl Iterator for AxisLines {
    type Item = LineDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.layout.num_lines() {
            return None;
        }
        let line = self.layout.descriptor(self.next);
        self.next += 1;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.layout.num_lines().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AxisLines {}
