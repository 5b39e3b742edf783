//! Dense Tensor
//!
//! A contiguous, row-major `f32` tensor. This is the storage type behind every
//! tensor-valued document field and behind the stacked columns of a
//! [`DocumentArrayStacked`](crate::array::DocumentArrayStacked).

use serde::{Deserialize, Serialize};

use crate::error::{DocArrayError, Result};

/// Number of elements described by a shape, or `None` if it overflows `usize`.
/// The empty shape is a scalar.
#[inline]
pub fn shape_numel(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// Element count of a shape whose every sub-shape also fits in `usize`
///
/// Zero-sized dimensions are skipped when checking, so `[0, n, m]` is only
/// accepted if `n * m` fits as well; rows of such a tensor stay addressable.
fn checked_numel(shape: &[usize]) -> Result<usize> {
    let nonzero = shape
        .iter()
        .filter(|&&dim| dim != 0)
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim));
    match nonzero {
        Some(_) if shape.contains(&0) => Ok(0),
        Some(numel) => Ok(numel),
        None => Err(DocArrayError::InvalidShape {
            shape: shape.to_vec(),
            reason: "element count overflows usize".to_string(),
        }),
    }
}

/// Dense row-major tensor of 32-bit floats
///
/// # Example
/// ```
/// use docarray::tensor::Tensor;
///
/// let t = Tensor::zeros(&[3, 2, 2]);
/// assert_eq!(t.shape(), &[3, 2, 2]);
/// assert_eq!(t.numel(), 12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTensor")]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

/// Unvalidated wire form; checked on the way in.
#[derive(Deserialize)]
struct RawTensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl TryFrom<RawTensor> for Tensor {
    type Error = DocArrayError;

    fn try_from(raw: RawTensor) -> Result<Self> {
        Tensor::new(raw.shape, raw.data)
    }
}

impl Tensor {
    /// Create a tensor from a shape and row-major data
    ///
    /// # Errors
    /// * `InvalidShape` - If the element count overflows, or `data.len()` does
    ///   not match it
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected = checked_numel(&shape)?;
        if expected != data.len() {
            return Err(DocArrayError::InvalidShape {
                shape,
                reason: format!("expected {} elements, got {}", expected, data.len()),
            });
        }
        Ok(Self { shape, data })
    }

    /// Create a 1-D tensor from a vector
    pub fn from_vec(data: Vec<f32>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, 0.0)
    }

    /// Create a tensor filled with `value`
    ///
    /// # Panics
    /// If the element count of `shape` overflows `usize`
    pub fn full(shape: &[usize], value: f32) -> Self {
        let numel = match checked_numel(shape) {
            Ok(numel) => numel,
            Err(err) => panic!("{}", err),
        };
        Self {
            shape: shape.to_vec(),
            data: vec![value; numel],
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the tensor and return its row-major data
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Return a tensor with the same data and a new shape
    ///
    /// # Errors
    /// * `InvalidShape` - If the element counts differ or `shape` overflows
    pub fn reshape(&self, shape: &[usize]) -> Result<Tensor> {
        self.clone().into_shape(shape)
    }

    /// Consuming variant of [`Tensor::reshape`]
    pub fn into_shape(self, shape: &[usize]) -> Result<Tensor> {
        if checked_numel(shape)? != self.numel() {
            return Err(DocArrayError::InvalidShape {
                shape: shape.to_vec(),
                reason: format!(
                    "cannot reshape tensor of shape {:?} ({} elements)",
                    self.shape,
                    self.numel()
                ),
            });
        }
        Ok(Tensor {
            shape: shape.to_vec(),
            data: self.data,
        })
    }

    /// Check this tensor against a declared field shape
    ///
    /// A tensor with exactly the declared shape is returned unchanged. A tensor
    /// with the same number of elements is reshaped to the declared shape.
    ///
    /// # Errors
    /// * `InvalidShape` - If the declared shape's element count overflows
    /// * `ShapeMismatch` - If the element counts differ
    pub fn validate_shape(self, expected: &[usize]) -> Result<Tensor> {
        if self.shape == expected {
            return Ok(self);
        }
        if checked_numel(expected)? != self.numel() {
            return Err(DocArrayError::ShapeMismatch {
                expected: expected.to_vec(),
                actual: self.shape,
            });
        }
        self.into_shape(expected)
    }

    /// Stack tensors of identical shape along a new leading axis
    ///
    /// The result has shape `[tensors.len(), *shape]` and owns one contiguous
    /// copy of all elements.
    ///
    /// # Errors
    /// * `StackError` - If `tensors` is empty
    /// * `ShapeMismatch` - If any tensor differs in shape from the first
    pub fn stack(tensors: &[&Tensor]) -> Result<Tensor> {
        let first = tensors.first().ok_or_else(|| DocArrayError::StackError {
            reason: "no tensors to stack".to_string(),
        })?;

        let mut data = Vec::with_capacity(first.numel() * tensors.len());
        for tensor in tensors {
            if tensor.shape != first.shape {
                return Err(DocArrayError::ShapeMismatch {
                    expected: first.shape.clone(),
                    actual: tensor.shape.clone(),
                });
            }
            data.extend_from_slice(&tensor.data);
        }

        let mut shape = Vec::with_capacity(first.ndim() + 1);
        shape.push(tensors.len());
        shape.extend_from_slice(&first.shape);
        checked_numel(&shape)?;

        Ok(Tensor { shape, data })
    }

    /// Get the sub-tensor at `index` along the leading axis
    ///
    /// # Returns
    /// `None` for a scalar tensor or an out-of-range index
    pub fn index_axis0(&self, index: usize) -> Option<Tensor> {
        let (&len, rest) = self.shape.split_first()?;
        if index >= len {
            return None;
        }
        let stride = shape_numel(rest)?;
        let start = index * stride;
        Some(Tensor {
            shape: rest.to_vec(),
            data: self.data[start..start + stride].to_vec(),
        })
    }

    /// Split along the leading axis; inverse of [`Tensor::stack`]
    ///
    /// # Errors
    /// * `InvalidShape` - If the tensor is a scalar, or has more empty rows
    ///   than can be allocated
    pub fn unstack(&self) -> Result<Vec<Tensor>> {
        let Some((&len, rest)) = self.shape.split_first() else {
            return Err(DocArrayError::InvalidShape {
                shape: Vec::new(),
                reason: "cannot unstack a scalar tensor".to_string(),
            });
        };
        let stride = checked_numel(rest)?;
        if stride == 0 {
            // No data bounds the row count here.
            let mut rows = Vec::new();
            rows.try_reserve_exact(len).map_err(|err| DocArrayError::InvalidShape {
                shape: self.shape.clone(),
                reason: format!("cannot allocate {} rows: {}", len, err),
            })?;
            rows.resize(len, Tensor::zeros(rest));
            return Ok(rows);
        }
        Ok(self
            .data
            .chunks_exact(stride)
            .map(|chunk| Tensor {
                shape: rest.to_vec(),
                data: chunk.to_vec(),
            })
            .collect())
    }

    /// Apply `f` to every element, producing a new tensor of the same shape
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }
}

impl From<Vec<f32>> for Tensor {
    fn from(data: Vec<f32>) -> Self {
        Tensor::from_vec(data)
    }
}
