//! Tensor Module
//!
//! Tensor types that can be stored in document fields:
//! - Dense `f32` tensors with shape validation and stacking
//! - Audio tensors with 16-bit PCM encoding

pub mod audio;
pub mod dense;

pub use audio::{AudioTensor, WavConfig, MAX_INT_16};
pub use dense::{shape_numel, Tensor};
