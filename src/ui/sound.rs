/// Sound engine: procedural cues via rodio.
///
/// Everything is synthesised into in-memory WAV buffers at init time, except
/// the laser blips whose pitch depends on the beam index. Playback is
/// fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely (the stub
/// SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_ambient: Arc<Vec<u8>>,
        sfx_hit: Arc<Vec<u8>>,
        sfx_miss: Arc<Vec<u8>>,
        sfx_cue: Arc<Vec<u8>>,
        sfx_complete: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(error = %e, "no audio output; running silent");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_ambient: Arc::new(make_wav(&gen_drone())),
                sfx_hit: Arc::new(make_wav(&gen_hit())),
                sfx_miss: Arc::new(make_wav(&gen_miss())),
                sfx_cue: Arc::new(make_wav(&gen_tone(1320.0, 0.06, 0.2))),
                sfx_complete: Arc::new(make_wav(&gen_complete())),
            })
        }

        fn play_bytes(&self, bytes: Vec<u8>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(bytes)) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            self.play_bytes(buf.as_ref().clone());
        }

        /// Laser blip; pitch climbs with the beam index.
        pub fn play_beam(&self, index: u64, total: u64) {
            let ratio = index as f32 / total.max(1) as f32;
            let freq = 220.0 + ratio * 1100.0;
            self.play_bytes(make_wav(&gen_tone(freq, 0.03, 0.18)));
        }

        pub fn play_ambient(&self) { self.play(&self.sfx_ambient); }
        pub fn play_hit(&self) { self.play(&self.sfx_hit); }
        pub fn play_miss(&self) { self.play(&self.sfx_miss); }
        pub fn play_cue(&self) { self.play(&self.sfx_cue); }
        pub fn play_complete(&self) { self.play(&self.sfx_complete); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn frames(seconds: f32) -> usize {
        (SAMPLE_RATE as f32 * seconds) as usize
    }

    /// Sine with a linear fade out.
    fn gen_tone(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = frames(duration);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                (t * freq * TAU).sin() * env * volume
            })
            .collect()
    }

    /// Low detuned drone with slow swell and release, for the laser sweep.
    fn gen_drone() -> Vec<f32> {
        let n = frames(4.0);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let p = i as f32 / n as f32;
                let env = (p * 4.0).min(1.0) * (1.0 - p).powf(0.5);
                let a = (t * 55.0 * TAU).sin();
                let b = (t * 55.7 * TAU).sin();
                let c = (t * 110.3 * TAU).sin() * 0.3;
                (a + b + c) * env * 0.12
            })
            .collect()
    }

    /// Two quick rising notes.
    fn gen_hit() -> Vec<f32> {
        let mut out = gen_tone(880.0, 0.05, 0.25);
        out.extend(gen_tone(1175.0, 0.08, 0.25));
        out
    }

    /// Short falling buzz.
    fn gen_miss() -> Vec<f32> {
        let n = frames(0.18);
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = 240.0 - p * 120.0;
                let square = if (t * freq * TAU).sin() >= 0.0 { 1.0 } else { -1.0 };
                square * (1.0 - p) * 0.12
            })
            .collect()
    }

    /// Slow three-note chime with a held tail.
    fn gen_complete() -> Vec<f32> {
        let mut out = Vec::new();
        for (freq, dur) in [(659.0_f32, 0.12), (784.0, 0.12), (988.0, 0.4)] {
            let n = frames(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - i as f32 / n as f32).powf(0.7);
                let wave = (t * freq * TAU).sin() * 0.8 + (t * freq * 2.0 * TAU).sin() * 0.2;
                out.push(wave * env * 0.25);
            }
        }
        out
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a 16-bit mono PCM buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let samples = gen_hit();
            let wav = make_wav(&samples);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(wav.len(), 44 + samples.len() * 2);
            let riff = u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]);
            assert_eq!(riff as usize, wav.len() - 8);
        }

        #[test]
        fn generators_stay_in_range() {
            for s in [gen_drone(), gen_hit(), gen_miss(), gen_complete()] {
                assert!(!s.is_empty());
                assert!(s.iter().all(|v| v.abs() <= 1.0));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_beam(&self, _index: u64, _total: u64) {}
    pub fn play_ambient(&self) {}
    pub fn play_hit(&self) {}
    pub fn play_miss(&self) {}
    pub fn play_cue(&self) {}
    pub fn play_complete(&self) {}
}
