//! Example: Measure and analyze a single audio file
//!
//! Usage: `cargo run --example analyze_file -- <path> [profile] [--auto-tuning]`

use tonemeter_dsp::{
    build_frequency_table, detect_audio, measure_audio_file, reference_frequencies, Channels,
    DetectionConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: analyze_file <path> [profile] [--auto-tuning]")?;

    let mut config = DetectionConfig::default();
    for arg in args {
        if arg == "--auto-tuning" {
            config.auto_tuning = true;
        } else {
            config.profile = arg;
        }
    }

    let loudness = measure_audio_file(&path, Channels::Stereo)?;
    println!("Loudness:");
    println!("  Channel 0: {:.2} dBFS", loudness.channel0.rms_db);
    if let Some(channel1) = loudness.channel1 {
        println!("  Channel 1: {:.2} dBFS", channel1.rms_db);
    }
    println!("  Average:   {:.2} dBFS", loudness.avg.rms_db);

    let result = detect_audio(&path, &config).await?;
    println!("Detection:");
    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(detection) = result.detection() {
        let table = build_frequency_table(&reference_frequencies(detection.tuning as f32, 4));
        println!("Pitch table (A4 = {} Hz):", detection.tuning);
        for degree in table.iter() {
            match (degree.frequency, degree.range) {
                (Some(freq), Some(range)) => {
                    println!("  {:<8} {:>8.2} Hz  {}", degree.letters.join("/"), freq, range.name())
                }
                _ => println!("  {:<8} -", degree.letters.join("/")),
            }
        }
    }

    Ok(())
}
