//! Audio Tests
//!
//! Audio tensors inside documents: PCM encoding and WAV export.

use approx::assert_abs_diff_eq;
use docarray::array::{AnyDocumentArray, DocumentArray};
use docarray::document::predefined::{audio, audio_schema};
use docarray::document::{Document, FieldKind, Schema};
use docarray::tensor::{AudioTensor, Tensor, WavConfig, MAX_INT_16};
use hound::WavReader;
use tempfile::tempdir;

/// Helper to create a mono sine wave
fn sine(frequency: f32, sample_rate: u32, num_samples: usize) -> AudioTensor {
    let samples = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.5
        })
        .collect();
    AudioTensor::from_samples(samples)
}

#[test]
fn test_zero_tensor_to_audio_bytes() {
    for shape in [vec![1], vec![1000], vec![1000, 2]] {
        let audio = AudioTensor::zeros(&shape);
        let bytes = audio.to_audio_bytes();

        assert_eq!(bytes.len(), audio.numel() * 2);
        assert!(bytes.iter().all(|&b| b == 0));
    }
}

#[test]
fn test_audio_bytes_decode_to_scaled_samples() {
    let audio = sine(440.0, 16000, 256);
    let bytes = audio.to_audio_bytes();

    for (chunk, &sample) in bytes.chunks_exact(2).zip(audio.data()) {
        let decoded = i16::from_le_bytes([chunk[0], chunk[1]]) as f32 / MAX_INT_16;
        assert_abs_diff_eq!(decoded, sample, epsilon = 1.0 / MAX_INT_16);
    }
}

#[test]
fn test_plain_tensor_coerced_in_audio_field() {
    let schema = Schema::builder("MyAudioDoc")
        .field("title", FieldKind::Text)
        .optional("audio_tensor", FieldKind::AudioTensor)
        .build()
        .unwrap();

    let doc = Document::builder(&schema)
        .with("title", "my_first_audio_doc")
        .with("audio_tensor", Tensor::zeros(&[1000, 2]))
        .build()
        .unwrap();

    let audio = doc.get("audio_tensor").unwrap().as_audio().unwrap();
    assert_eq!(audio.num_channels(), Some(2));
    assert_eq!(audio.to_audio_bytes().len(), 4000);
}

#[test]
fn test_save_document_audio_to_wav() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("file_1.wav");

    let doc = audio(sine(220.0, 16000, 1600));
    let tensor = doc.get("tensor").unwrap().as_audio().unwrap();
    tensor.save_to_wav_file(&path, &WavConfig::speech()).unwrap();

    let mut reader = WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, 16000);

    let samples: Vec<f32> = reader
        .samples::<i16>()
        .map(|s| s.unwrap() as f32 / MAX_INT_16)
        .collect();
    assert_eq!(samples.len(), 1600);
    for (read, &original) in samples.iter().zip(tensor.data()) {
        assert_abs_diff_eq!(*read, original, epsilon = 1.0 / MAX_INT_16);
    }
}

#[test]
fn test_stacked_audio_batch() {
    let docs: Vec<Document> = (0..3).map(|_| audio(sine(440.0, 16000, 400))).collect();
    let batch = DocumentArray::from_docs(&audio_schema(), docs).unwrap();

    let stacked = batch.stack().unwrap();
    let tensor = stacked.traverse_flat("tensor").unwrap();
    assert_eq!(tensor.as_tensor().unwrap().shape(), &[3, 400]);

    let restored = stacked.unstack().unwrap();
    assert_eq!(restored, batch);
}
