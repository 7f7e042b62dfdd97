use crate::error::ImageError;
use crate::pixel::Pixel;

/// Compute the row-major strides of a shape.
///
/// The last axis varies fastest in memory.
///
/// # Examples
///
/// ```
/// use paramorph_image::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape([2, 3]), [3, 1]);
/// assert_eq!(get_strides_from_shape([2, 3, 4]), [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const D: usize>(shape: [usize; D]) -> [usize; D] {
    let mut strides: [usize; D] = [0; D];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// Physical layout of an N-dimensional image.
///
/// The sample at index `i` along axis `k` sits at `origin[k] + i * spacing[k]`
/// in physical coordinates.
///
/// # Examples
///
/// ```
/// use paramorph_image::ImageGeometry;
///
/// let geometry = ImageGeometry::new([20, 10]).with_spacing([0.5, 2.0]).unwrap();
///
/// assert_eq!(geometry.size, [20, 10]);
/// assert_eq!(geometry.spacing, [0.5, 2.0]);
/// assert_eq!(geometry.origin, [0.0, 0.0]);
/// assert_eq!(geometry.numel(), 200);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageGeometry<const D: usize> {
    /// Number of samples along each axis.
    pub size: [usize; D],
    /// Physical distance between neighbouring samples along each axis.
    pub spacing: [f64; D],
    /// Physical position of the first sample.
    pub origin: [f64; D],
}

impl<const D: usize> ImageGeometry<D> {
    /// Create a geometry with unit spacing and zero origin.
    pub fn new(size: [usize; D]) -> Self {
        Self {
            size,
            spacing: [1.0; D],
            origin: [0.0; D],
        }
    }

    /// Replace the spacing, checking that every component is finite and positive.
    pub fn with_spacing(mut self, spacing: [f64; D]) -> Result<Self, ImageError> {
        self.spacing = spacing;
        self.validate()?;
        Ok(self)
    }

    /// Replace the origin, checking that every component is finite.
    pub fn with_origin(mut self, origin: [f64; D]) -> Result<Self, ImageError> {
        self.origin = origin;
        self.validate()?;
        Ok(self)
    }

    /// Check the spacing and origin invariants.
    pub fn validate(&self) -> Result<(), ImageError> {
        for (axis, &h) in self.spacing.iter().enumerate() {
            if !(h.is_finite() && h > 0.0) {
                return Err(ImageError::InvalidSpacing(axis, h));
            }
        }
        for (axis, &o) in self.origin.iter().enumerate() {
            if !o.is_finite() {
                return Err(ImageError::InvalidOrigin(axis, o));
            }
        }
        Ok(())
    }

    /// Total number of samples.
    pub fn numel(&self) -> usize {
        self.size.iter().product()
    }
}

impl<const D: usize> std::fmt::Display for ImageGeometry<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageGeometry {{ size: {:?}, spacing: {:?}, origin: {:?} }}",
            self.size, self.spacing, self.origin
        )
    }
}

/// An N-dimensional scalar image.
///
/// Samples are stored contiguously in row-major order together with the
/// [`ImageGeometry`] describing where they live in physical space.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const D: usize> {
    geometry: ImageGeometry<D>,
    strides: [usize; D],
    data: Vec<T>,
}

impl<T, const D: usize> Image<T, D> {
    /// Create a new image with unit spacing and zero origin.
    ///
    /// # Arguments
    ///
    /// * `size` - The number of samples along each axis.
    /// * `data` - The samples in row-major order.
    ///
    /// # Errors
    ///
    /// If the length of the data does not match the size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use paramorph_image::Image;
    ///
    /// let image = Image::<u8, 3>::new([4, 3, 2], vec![0u8; 24]).unwrap();
    ///
    /// assert_eq!(image.size(), [4, 3, 2]);
    /// assert_eq!(image.strides(), [6, 2, 1]);
    /// assert_eq!(image.numel(), 24);
    /// ```
    pub fn new(size: [usize; D], data: Vec<T>) -> Result<Self, ImageError> {
        Self::from_geometry(ImageGeometry::new(size), data)
    }

    /// Create a new image from a geometry and the samples in row-major order.
    ///
    /// # Errors
    ///
    /// If the geometry is invalid or the data length does not match it, an error is returned.
    pub fn from_geometry(geometry: ImageGeometry<D>, data: Vec<T>) -> Result<Self, ImageError> {
        geometry.validate()?;
        let numel = geometry.numel();
        if data.len() != numel {
            return Err(ImageError::InvalidShape(data.len(), numel));
        }
        Ok(Self {
            strides: get_strides_from_shape(geometry.size),
            geometry,
            data,
        })
    }

    /// Create a new image of the given size filled with `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use paramorph_image::Image;
    ///
    /// let image = Image::<f32, 2>::from_size_val([3, 5], 1.5).unwrap();
    /// assert_eq!(image.get([2, 4]), Some(&1.5));
    /// ```
    pub fn from_size_val(size: [usize; D], val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Self::from_geometry_val(ImageGeometry::new(size), val)
    }

    /// Create a new image with the given geometry filled with `val`.
    pub fn from_geometry_val(geometry: ImageGeometry<D>, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; geometry.numel()];
        Self::from_geometry(geometry, data)
    }

    /// Create a new image by evaluating `f` at every index, in memory order.
    pub fn from_fn<F>(geometry: ImageGeometry<D>, mut f: F) -> Result<Self, ImageError>
    where
        F: FnMut([usize; D]) -> T,
    {
        let strides = get_strides_from_shape(geometry.size);
        let data = (0..geometry.numel())
            .map(|offset| f(index_from_offset(offset, &strides)))
            .collect();
        Self::from_geometry(geometry, data)
    }

    /// Replace the spacing of the image.
    pub fn with_spacing(mut self, spacing: [f64; D]) -> Result<Self, ImageError> {
        self.geometry = self.geometry.with_spacing(spacing)?;
        Ok(self)
    }

    /// Replace the origin of the image.
    pub fn with_origin(mut self, origin: [f64; D]) -> Result<Self, ImageError> {
        self.geometry = self.geometry.with_origin(origin)?;
        Ok(self)
    }

    /// The geometry of the image.
    pub fn geometry(&self) -> &ImageGeometry<D> {
        &self.geometry
    }

    /// Number of samples along each axis.
    pub fn size(&self) -> [usize; D] {
        self.geometry.size
    }

    /// Physical spacing along each axis.
    pub fn spacing(&self) -> [f64; D] {
        self.geometry.spacing
    }

    /// Physical position of the first sample.
    pub fn origin(&self) -> [f64; D] {
        self.geometry.origin
    }

    /// Memory strides of each axis, in samples.
    pub fn strides(&self) -> [usize; D] {
        self.strides
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        D
    }

    /// Total number of samples.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Whether the image holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The samples in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The samples in row-major order, mutable.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its samples.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Memory offset of an index, or `None` when the index is out of bounds.
    pub fn get_iter_offset(&self, index: [usize; D]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, dim_size), stride) in index.iter().zip(self.geometry.size).zip(self.strides) {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Index of the sample at a memory offset. The reverse of [`Self::get_iter_offset`].
    ///
    /// # Errors
    ///
    /// If the offset is not smaller than the number of samples, an error is returned.
    pub fn get_index(&self, offset: usize) -> Result<[usize; D], ImageError> {
        if offset >= self.numel() {
            return Err(ImageError::IndexOutOfBounds(
                vec![offset],
                vec![self.numel()],
            ));
        }
        Ok(index_from_offset(offset, &self.strides))
    }

    /// Reference to the sample at an index.
    pub fn get(&self, index: [usize; D]) -> Option<&T> {
        self.get_iter_offset(index).map(|i| &self.data[i])
    }

    /// Mutable reference to the sample at an index.
    pub fn get_mut(&mut self, index: [usize; D]) -> Option<&mut T> {
        self.get_iter_offset(index).map(|i| &mut self.data[i])
    }

    /// Set the sample at an index.
    ///
    /// # Errors
    ///
    /// If the index is out of bounds, an error is returned.
    pub fn set(&mut self, index: [usize; D], value: T) -> Result<(), ImageError> {
        let size = self.geometry.size;
        let pixel = self
            .get_mut(index)
            .ok_or_else(|| ImageError::IndexOutOfBounds(index.to_vec(), size.to_vec()))?;
        *pixel = value;
        Ok(())
    }

    /// Apply `f` to every sample, keeping the geometry.
    pub fn map<U, F>(&self, f: F) -> Image<U, D>
    where
        F: Fn(&T) -> U,
    {
        Image {
            geometry: self.geometry,
            strides: self.strides,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Smallest and largest sample, or `None` for an empty image.
    ///
    /// Samples that do not compare (`NaN`) are skipped.
    pub fn min_max(&self) -> Option<(T, T)>
    where
        T: PartialOrd + Copy,
    {
        let mut iter = self.data.iter().copied().filter(|v| v.partial_cmp(v).is_some());
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| {
            (if v < lo { v } else { lo }, if v > hi { v } else { hi })
        }))
    }

    /// Pad every axis on both sides with a constant value.
    ///
    /// The origin moves so that the original samples keep their physical position.
    ///
    /// # Errors
    ///
    /// If a padded axis, or the padded sample count, does not fit in memory, an error is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use paramorph_image::Image;
    ///
    /// let image = Image::<u8, 1>::new([2], vec![1, 2]).unwrap();
    /// let padded = image.pad_constant([1], 9).unwrap();
    ///
    /// assert_eq!(padded.as_slice(), &[9, 1, 2, 9]);
    /// assert_eq!(padded.origin(), [-1.0]);
    /// ```
    pub fn pad_constant(&self, pad: [usize; D], value: T) -> Result<Image<T, D>, ImageError>
    where
        T: Clone,
    {
        // Vec cannot hold more than isize::MAX bytes
        let max_len = isize::MAX as usize / std::mem::size_of::<T>().max(1);
        let mut geometry = self.geometry;
        let mut numel: usize = 1;
        for axis in 0..D {
            let extent = geometry.size[axis];
            let size = pad[axis]
                .checked_mul(2)
                .and_then(|p| p.checked_add(extent))
                .filter(|&s| numel.checked_mul(s).is_some_and(|n| n <= max_len))
                .ok_or(ImageError::PaddingOverflow {
                    axis,
                    pad: pad[axis],
                    extent,
                })?;
            numel *= size;
            geometry.size[axis] = size;
            geometry.origin[axis] -= pad[axis] as f64 * geometry.spacing[axis];
        }
        let strides = get_strides_from_shape(geometry.size);
        let mut data = vec![value; geometry.numel()];

        for (offset, v) in self.data.iter().enumerate() {
            let index = index_from_offset(offset, &self.strides);
            let dst = index
                .iter()
                .zip(pad)
                .zip(strides)
                .map(|((&i, p), s)| (i + p) * s)
                .sum::<usize>();
            data[dst] = v.clone();
        }

        Ok(Image {
            geometry,
            strides,
            data,
        })
    }

    /// Extract the block of `size` samples starting at `lower`.
    ///
    /// # Errors
    ///
    /// If the block does not fit inside the image, an error is returned.
    pub fn crop(&self, lower: [usize; D], size: [usize; D]) -> Result<Image<T, D>, ImageError>
    where
        T: Clone,
    {
        let mut geometry = self.geometry;
        for axis in 0..D {
            let extent = self.geometry.size[axis];
            if lower[axis] + size[axis] > extent {
                return Err(ImageError::InvalidCrop {
                    axis,
                    lower: lower[axis],
                    size: size[axis],
                    extent,
                });
            }
            geometry.size[axis] = size[axis];
            geometry.origin[axis] += lower[axis] as f64 * geometry.spacing[axis];
        }
        let strides = get_strides_from_shape(geometry.size);
        let data = (0..geometry.numel())
            .map(|offset| {
                let index = index_from_offset(offset, &strides);
                let src = index
                    .iter()
                    .zip(lower)
                    .zip(self.strides)
                    .map(|((&i, l), s)| (i + l) * s)
                    .sum::<usize>();
                self.data[src].clone()
            })
            .collect();

        Ok(Image {
            geometry,
            strides,
            data,
        })
    }
}

impl<T: Pixel, const D: usize> Image<T, D> {
    /// Convert the samples to another pixel type, keeping the geometry.
    ///
    /// # Examples
    ///
    /// ```
    /// use paramorph_image::Image;
    ///
    /// let image = Image::<f64, 1>::new([3], vec![-1.0, 12.4, 300.0]).unwrap();
    /// let image_u8 = image.cast::<u8>();
    ///
    /// assert_eq!(image_u8.as_slice(), &[0, 12, 255]);
    /// ```
    pub fn cast<U: Pixel>(&self) -> Image<U, D> {
        self.map(|&v| U::from_f64(v.to_f64()))
    }
}

fn index_from_offset<const D: usize>(offset: usize, strides: &[usize; D]) -> [usize; D] {
    let mut index = [0; D];
    let mut rem = offset;
    for (i, &s) in strides.iter().enumerate() {
        if s == 0 {
            continue;
        }
        index[i] = rem / s;
        rem %= s;
    }
    index
}
