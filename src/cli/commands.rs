//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::tensor::{AudioTensor, Tensor, WavConfig};

/// Accepted JSON layouts for audio input
#[derive(Deserialize)]
#[serde(untagged)]
enum AudioInput {
    Samples(Vec<f32>),
    Tensor(Tensor),
}

/// Read an audio tensor from a JSON file.
pub fn load_audio(path: &Path) -> Result<AudioTensor> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let input: AudioInput = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a sample array or tensor", path.display()))?;

    Ok(match input {
        AudioInput::Samples(samples) => AudioTensor::from_samples(samples),
        AudioInput::Tensor(tensor) => AudioTensor::new(tensor),
    })
}

/// Encode an audio file as raw PCM bytes.
pub fn audio_bytes(input: &Path, output: &Path) -> Result<()> {
    info!("Encoding audio: {} -> {}", input.display(), output.display());

    let audio = load_audio(input)?;
    let bytes = audio.to_audio_bytes();
    fs::write(output, &bytes).with_context(|| format!("failed to write {}", output.display()))?;

    println!("Wrote {} bytes to {}", bytes.len(), output.display());
    Ok(())
}

/// Encode an audio file as a WAV file.
pub fn wav(input: &Path, output: &Path, sample_rate: u32) -> Result<()> {
    info!("Writing WAV: {} -> {}", input.display(), output.display());

    let audio = load_audio(input)?;
    audio
        .save_to_wav_file(output, &WavConfig::with_sample_rate(sample_rate))
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "Wrote {} frames at {} Hz to {}",
        audio.num_frames().unwrap_or(0),
        sample_rate,
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_audio_layouts() {
        let dir = tempdir().unwrap();

        let flat = dir.path().join("flat.json");
        fs::write(&flat, "[0.0, 0.5, -0.5]").unwrap();
        assert_eq!(load_audio(&flat).unwrap().shape(), &[3]);

        let shaped = dir.path().join("shaped.json");
        fs::write(&shaped, r#"{"shape": [2, 2], "data": [0.0, 0.1, 0.2, 0.3]}"#).unwrap();
        assert_eq!(load_audio(&shaped).unwrap().num_channels(), Some(2));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{"shape": [3], "data": [0.0]}"#).unwrap();
        assert!(load_audio(&bad).is_err());
    }

    #[test]
    fn test_audio_bytes_command() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.pcm");
        fs::write(&input, "[0.0, 0.0, 0.0, 0.0]").unwrap();

        audio_bytes(&input, &output).unwrap();

        let bytes = fs::read(&output).unwrap();
        assert_eq!(bytes, vec![0u8; 8]);
    }

    #[test]
    fn test_wav_command() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.wav");
        fs::write(&input, "[0.0, 1.0]").unwrap();

        wav(&input, &output, 8000).unwrap();

        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.len(), 2);
    }
}
