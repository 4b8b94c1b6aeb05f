//! Integration tests for decoding, loudness and pitch tables

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tonemeter_dsp::{
    build_frequency_table, load, measure_audio_file, measure_loudness, reference_frequencies,
    AnalysisError, Channels, DecoderContext, FrequencyRange,
};

/// Write planar channels as a 32-bit float WAV file
fn write_wav(dir: &Path, name: &str, channels: &[Vec<f32>], sample_rate: u32) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(&path, spec).expect("Failed to create WAV");
    let frames = channels[0].len();
    for i in 0..frames {
        for channel in channels {
            writer.write_sample(channel[i]).expect("Failed to write sample");
        }
    }
    writer.finalize().expect("Failed to finalize WAV");
    path
}

fn sine(freq: f32, amplitude: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
    let len = (sample_rate as f32 * seconds) as usize;
    (0..len)
        .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

#[test]
fn test_decode_stereo_wav() {
    let dir = TempDir::new().unwrap();
    let left = sine(440.0, 0.5, 44100, 2.0);
    let right = sine(660.0, 0.25, 44100, 2.0);
    let path = write_wav(dir.path(), "stereo.wav", &[left.clone(), right.clone()], 44100);

    let buffer = load(&path, None).expect("Decoding should succeed");

    assert_eq!(buffer.channel_count(), 2);
    assert_eq!(buffer.sample_rate(), 44100);
    assert!((buffer.duration() - 2.0).abs() < 1e-3);
    assert_eq!(buffer.duration_string(), "00:02");

    let decoded_left = buffer.channel(0).unwrap();
    assert_eq!(decoded_left.len(), left.len());
    for (a, b) in decoded_left.iter().zip(left.iter()).take(1000) {
        assert!((a - b).abs() < 1e-6);
    }
    assert!((buffer.channel(1).unwrap()[100] - right[100]).abs() < 1e-6);
}

#[test]
fn test_measure_decoded_file() {
    let dir = TempDir::new().unwrap();
    let path = write_wav(dir.path(), "half.wav", &[vec![0.5f32; 44100 * 2]], 44100);

    let result = measure_audio_file(&path, Channels::Mono).unwrap();
    assert!(
        (result.avg.rms_db + 6.0206).abs() < 1e-3,
        "expected -6.02 dBFS, got {:.4}",
        result.avg.rms_db
    );
    assert_eq!(result.avg.sample_rate, 44100);
    assert!(result.channel1.is_none());
}

#[test]
fn test_stereo_average_through_decoder() {
    let dir = TempDir::new().unwrap();
    let a0 = 10f32.powf(-10.0 / 20.0);
    let a1 = 10f32.powf(-14.0 / 20.0);
    let path = write_wav(
        dir.path(),
        "levels.wav",
        &[vec![a0; 48000], vec![a1; 48000]],
        48000,
    );

    let buffer = load(&path, None).unwrap();
    let result = measure_loudness(&buffer, Channels::Stereo);

    assert!((result.channel0.rms_db + 10.0).abs() < 1e-3);
    assert!((result.channel1.unwrap().rms_db + 14.0).abs() < 1e-3);
    assert!((result.avg.rms_db + 12.0).abs() < 1e-3);
}

#[test]
fn test_silent_file_is_negative_infinity() {
    let dir = TempDir::new().unwrap();
    let path = write_wav(dir.path(), "silence.wav", &[vec![0.0f32; 22050]], 22050);

    let result = measure_audio_file(&path, Channels::Stereo).unwrap();
    assert_eq!(result.avg.rms_db, f64::NEG_INFINITY);
}

#[test]
fn test_context_reuse_across_files() {
    let dir = TempDir::new().unwrap();
    let first = write_wav(dir.path(), "a.wav", &[sine(220.0, 0.3, 44100, 1.0)], 44100);
    let second = write_wav(
        dir.path(),
        "b.wav",
        &[sine(220.0, 0.3, 48000, 0.5), sine(330.0, 0.3, 48000, 0.5)],
        48000,
    );

    let mut context = DecoderContext::new();
    let a = load(&first, Some(&mut context)).unwrap();
    let b = load(&second, Some(&mut context)).unwrap();
    let again = load(&first, Some(&mut context)).unwrap();

    assert_eq!(context.files_decoded(), 3);
    assert_eq!(a.channel_count(), 1);
    assert_eq!(b.channel_count(), 2);
    assert_eq!(b.sample_rate(), 48000);
    assert_eq!(a, again);
}

#[test]
fn test_missing_file_is_decoding_error() {
    let dir = TempDir::new().unwrap();
    let result = load(dir.path().join("missing.wav"), None);
    assert!(matches!(result, Err(AnalysisError::DecodingError(_))));
}

#[test]
fn test_corrupt_file_is_decoding_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corrupt.wav");
    std::fs::write(&path, b"definitely not a RIFF header, just bytes").unwrap();

    let mut context = DecoderContext::new();
    let result = load(&path, Some(&mut context));
    assert!(matches!(result, Err(AnalysisError::DecodingError(_))));
    assert_eq!(context.files_decoded(), 0);
}

#[test]
fn test_frequency_table_from_reference() {
    let table = build_frequency_table(&reference_frequencies(440.0, 4));
    let degrees = table.degrees();

    assert_eq!(degrees.len(), 8);
    assert_eq!(degrees[0].letters, vec!["C".to_string(), "B#".to_string()]);
    assert!((degrees[5].frequency.unwrap() - 440.0).abs() < 1e-3);
    assert_eq!(degrees[5].range, Some(FrequencyRange::LowMids));
    assert!((degrees[7].frequency.unwrap() - 2.0 * degrees[0].frequency.unwrap()).abs() < 1e-3);

    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(8));
    assert_eq!(json[2]["child"], serde_json::Value::Null);
    assert_eq!(json[0]["child"]["letters"][1], "Db");
}
