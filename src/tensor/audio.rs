//! Audio Tensor
//!
//! A tensor of floating-point audio samples in `[-1.0, 1.0]`. Adds PCM
//! encoding on top of [`Tensor`]: raw 16-bit bytes and 16-bit WAV files.
//!
//! Layout: a 1-D tensor is a mono signal. A 2-D tensor of shape
//! `[frames, channels]` holds interleaved multi-channel audio, which is the
//! order WAV expects.

use std::ops::{Deref, DerefMut};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DocArrayError, Result};
use crate::tensor::dense::Tensor;

/// Scale factor between float samples and 16-bit PCM
///
/// This is `i16::MAX` (32767) rather than `2^15`, so a full-scale `1.0` maps to
/// 32767 instead of overflowing; bytes differ by one step from a `2^15` scale.
pub const MAX_INT_16: f32 = i16::MAX as f32;

/// Default sample rate for WAV export (CD quality)
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

// ============================================================================
// WAV Configuration
// ============================================================================

/// WAV export configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WavConfig {
    /// Sample rate in Hz (default: 44100)
    pub sample_rate: u32,
    /// Bits per sample; only 16 is written (default: 16)
    pub bits_per_sample: u16,
}

impl Default for WavConfig {
    fn default() -> Self {
        WavConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            bits_per_sample: 16,
        }
    }
}

impl WavConfig {
    /// Create a 16-bit configuration with the given sample rate
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        WavConfig {
            sample_rate,
            ..Default::default()
        }
    }

    /// 16 kHz, the usual rate for speech models
    pub fn speech() -> Self {
        Self::with_sample_rate(16000)
    }

    /// 48 kHz studio rate
    pub fn studio() -> Self {
        Self::with_sample_rate(48000)
    }
}

// ============================================================================
// Audio Tensor
// ============================================================================

/// Tensor of audio samples
///
/// # Example
/// ```
/// use docarray::tensor::AudioTensor;
///
/// let audio = AudioTensor::zeros(&[100]);
/// let bytes = audio.to_audio_bytes();
/// assert_eq!(bytes.len(), 200);
/// assert!(bytes.iter().all(|&b| b == 0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioTensor(Tensor);

impl AudioTensor {
    pub fn new(tensor: Tensor) -> Self {
        AudioTensor(tensor)
    }

    /// Create a mono audio tensor from samples
    pub fn from_samples(samples: Vec<f32>) -> Self {
        AudioTensor(Tensor::from_vec(samples))
    }

    /// Create a silent audio tensor
    pub fn zeros(shape: &[usize]) -> Self {
        AudioTensor(Tensor::zeros(shape))
    }

    pub fn tensor(&self) -> &Tensor {
        &self.0
    }

    pub fn into_tensor(self) -> Tensor {
        self.0
    }

    /// Number of channels: 1 for a 1-D tensor, `shape[1]` for a 2-D tensor
    ///
    /// # Returns
    /// `None` if the tensor is neither 1-D nor 2-D
    pub fn num_channels(&self) -> Option<usize> {
        match self.0.shape() {
            [_] => Some(1),
            [_, channels] => Some(*channels),
            _ => None,
        }
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> Option<usize> {
        match self.0.shape() {
            [frames] | [frames, _] => Some(*frames),
            _ => None,
        }
    }

    /// Encode as raw 16-bit PCM bytes
    ///
    /// Each sample is multiplied by [`MAX_INT_16`] and cast to `i16`. The cast
    /// truncates toward zero and saturates at the `i16` range, so out-of-range
    /// input clips instead of wrapping. Bytes are little-endian.
    ///
    /// # Returns
    /// A byte vector of length `numel * 2`
    pub fn to_audio_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.numel() * 2);
        for sample in self.pcm_samples() {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    /// Write the samples to a 16-bit PCM WAV file
    ///
    /// # Arguments
    /// * `path` - Destination file, created or truncated
    /// * `config` - Sample rate and bit depth
    ///
    /// # Errors
    /// * `UnsupportedFormat` - If the bit depth is not 16
    /// * `InvalidShape` - If the tensor is not 1-D or 2-D, or has zero channels
    /// * `Audio` - If the WAV writer fails
    pub fn save_to_wav_file(&self, path: &Path, config: &WavConfig) -> Result<()> {
        if config.bits_per_sample != 16 {
            return Err(DocArrayError::UnsupportedFormat {
                format: format!(
                    "{}-bit audio (only 16-bit WAV is supported)",
                    config.bits_per_sample
                ),
            });
        }

        let channels = match self.num_channels() {
            Some(0) | None => {
                return Err(DocArrayError::InvalidShape {
                    shape: self.0.shape().to_vec(),
                    reason: "audio must be [frames] or [frames, channels] with channels > 0"
                        .to_string(),
                })
            }
            Some(channels) => channels,
        };
        let channels = u16::try_from(channels).map_err(|_| DocArrayError::UnsupportedFormat {
            format: format!("{}-channel audio", channels),
        })?;

        let spec = WavSpec {
            channels,
            sample_rate: config.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        debug!(
            path = %path.display(),
            channels,
            sample_rate = config.sample_rate,
            "writing audio tensor to WAV"
        );

        let mut writer = WavWriter::create(path, spec)?;
        for sample in self.pcm_samples() {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        Ok(())
    }

    fn pcm_samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.0.data().iter().map(|&s| (s * MAX_INT_16) as i16)
    }
}

impl From<Tensor> for AudioTensor {
    fn from(tensor: Tensor) -> Self {
        AudioTensor(tensor)
    }
}

impl Deref for AudioTensor {
    type Target = Tensor;

    fn deref(&self) -> &Tensor {
        &self.0
    }
}

impl DerefMut for AudioTensor {
    fn deref_mut(&mut self) -> &mut Tensor {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;
    use tempfile::tempdir;

    #[test]
    fn test_zero_tensor_encodes_to_zero_bytes() {
        let audio = AudioTensor::zeros(&[1000, 2]);
        let bytes = audio.to_audio_bytes();

        assert_eq!(bytes.len(), 1000 * 2 * 2);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_full_scale_samples() {
        let audio = AudioTensor::from_samples(vec![1.0, -1.0, 0.5]);
        let bytes = audio.to_audio_bytes();

        assert_eq!(&bytes[0..2], &i16::MAX.to_le_bytes());
        assert_eq!(&bytes[2..4], &(-i16::MAX).to_le_bytes());
        // 0.5 * 32767 = 16383.5, truncated toward zero
        assert_eq!(&bytes[4..6], &16383_i16.to_le_bytes());
    }

    #[test]
    fn test_out_of_range_samples_saturate() {
        let audio = AudioTensor::from_samples(vec![4.0, -4.0]);
        let bytes = audio.to_audio_bytes();

        assert_eq!(&bytes[0..2], &i16::MAX.to_le_bytes());
        assert_eq!(&bytes[2..4], &i16::MIN.to_le_bytes());
    }

    #[test]
    fn test_channel_layout() {
        assert_eq!(AudioTensor::zeros(&[10]).num_channels(), Some(1));
        assert_eq!(AudioTensor::zeros(&[10, 2]).num_channels(), Some(2));
        assert_eq!(AudioTensor::zeros(&[10, 2]).num_frames(), Some(10));
        assert_eq!(AudioTensor::zeros(&[2, 2, 2]).num_channels(), None);
    }

    #[test]
    fn test_wav_config_presets() {
        assert_eq!(WavConfig::default().sample_rate, 44100);
        assert_eq!(WavConfig::speech().sample_rate, 16000);
        assert_eq!(WavConfig::studio().bits_per_sample, 16);
    }

    #[test]
    fn test_save_to_wav_file_stereo() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");

        let tensor = Tensor::new(vec![3, 2], vec![0.0, 0.5, -0.5, 1.0, 0.25, -1.0]).unwrap();
        let audio = AudioTensor::new(tensor);
        audio.save_to_wav_file(&path, &WavConfig::studio()).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.bits_per_sample, 16);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16383, -16383, 32767, 8191, -32767]);
    }

    #[test]
    fn test_save_to_wav_file_rejects_bad_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.wav");

        let cube = AudioTensor::zeros(&[2, 2, 2]);
        assert!(matches!(
            cube.save_to_wav_file(&path, &WavConfig::default()),
            Err(DocArrayError::InvalidShape { .. })
        ));

        let config = WavConfig {
            bits_per_sample: 24,
            ..Default::default()
        };
        assert!(matches!(
            AudioTensor::zeros(&[4]).save_to_wav_file(&path, &config),
            Err(DocArrayError::UnsupportedFormat { .. })
        ));
    }
}
