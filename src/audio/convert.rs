//! Channel downmix and sample-rate conversion.
//!
//! Speech providers want 16 kHz mono; microphones deliver whatever the OS
//! mixer is set to (typically 44.1 or 48 kHz stereo).  [`to_mono`] averages
//! interleaved channels, [`resample`] converts rates by linear
//! interpolation — plenty for speech, and dependency-free.

/// Mix interleaved multi-channel audio down to mono by averaging frames.
///
/// * `channels == 1` returns the input unchanged (owned).
/// * `channels == 0` returns an empty vector.
pub fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Resample mono audio from `from_rate` to `to_rate` Hz by linear
/// interpolation.  Equal rates and empty input are no-op fast paths.
///
/// The output length is approximately `samples.len() * to_rate / from_rate`.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = match samples.get(idx) {
            Some(&a) => match samples.get(idx + 1) {
                Some(&b) => a * (1.0 - frac) + b * frac,
                None => a,
            },
            None => 0.0,
        };
        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passthrough() {
        let samples = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(to_mono(&samples, 1), samples);
    }

    #[test]
    fn stereo_frames_are_averaged() {
        let stereo = vec![1.0_f32, 0.0, 0.5, -0.5]; // L R L R
        let mono = to_mono(&stereo, 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.5).abs() < 1e-6);
        assert!((mono[1] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn zero_channels_yields_empty() {
        assert!(to_mono(&[0.1, 0.2], 0).is_empty());
    }

    #[test]
    fn equal_rates_are_a_noop() {
        let samples = vec![0.25_f32; 160];
        assert_eq!(resample(&samples, 16_000, 16_000), samples);
    }

    #[test]
    fn downsample_48k_to_16k_thirds_the_length() {
        let samples = vec![0.5_f32; 480];
        let out = resample(&samples, 48_000, 16_000);
        assert_eq!(out.len(), 160);
        // Constant signal stays constant through linear interpolation.
        assert!(out.iter().all(|s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn upsample_interpolates_between_neighbours() {
        let samples = vec![0.0_f32, 1.0];
        let out = resample(&samples, 1, 2);
        assert_eq!(out.len(), 4);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert!((out[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(resample(&[], 48_000, 16_000).is_empty());
    }
}
