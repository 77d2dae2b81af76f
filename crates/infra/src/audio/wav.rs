//! WAV encoding and sample conversion

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use smartcal_domain::Result;

use crate::errors::InfraError;

fn wav_error(err: hound::Error) -> smartcal_domain::SmartCalError {
    InfraError::from(err).into()
}

/// Encode mono `f32` samples as a 16-bit PCM WAV file in memory.
///
/// # Errors
/// `SmartCalError::Audio` if the writer fails.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut buffer, spec).map_err(wav_error)?;
        for &s in samples {
            let clamped = s.clamp(-1.0, 1.0);
            let v = (clamped * f32::from(i16::MAX)).round() as i16;
            writer.write_sample(v).map_err(wav_error)?;
        }
        writer.finalize().map_err(wav_error)?;
    }
    Ok(buffer.into_inner())
}

/// Decode a WAV file into mono `f32` samples and its sample rate.
///
/// # Errors
/// `SmartCalError::InvalidInput` for malformed files and
/// `SmartCalError::Unsupported` for sample formats hound cannot read.
pub fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut reader = WavReader::new(Cursor::new(bytes)).map_err(wav_error)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max).map_err(wav_error))
                .collect::<Result<Vec<f32>>>()?
        }
        SampleFormat::Float => {
            reader.samples::<f32>().map(|s| s.map_err(wav_error)).collect::<Result<Vec<f32>>>()?
        }
    };

    Ok((to_mono(&samples, spec.channels), spec.sample_rate))
}

/// Average interleaved channels into one.
pub fn to_mono(data: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    let ch = channels as usize;
    data.chunks_exact(ch).map(|frame| frame.iter().sum::<f32>() / ch as f32).collect()
}

/// Linear-interpolation resampler.
///
/// Speech energy sits well below 8 kHz, so no anti-alias filter is applied
/// when going down to 16 kHz.
pub fn resample(samples: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if src_rate == dst_rate || samples.is_empty() || src_rate == 0 || dst_rate == 0 {
        return samples.to_vec();
    }

    let ratio = f64::from(src_rate) / f64::from(dst_rate);
    let out_len = (samples.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let src_pos = i as f64 * ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < samples.len() {
            f64::from(samples[idx]) * (1.0 - frac) + f64::from(samples[idx + 1]) * frac
        } else {
            f64::from(samples[idx.min(samples.len() - 1)])
        };

        output.push(sample as f32);
    }

    output
}
