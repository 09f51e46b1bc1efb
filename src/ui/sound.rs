/// Sound effects: short procedural blips played through rodio.
///
/// Every effect is synthesized once into an in-memory WAV buffer when the
/// engine starts. Playback is fire-and-forget on a detached Sink.
///
/// Without the "sound" feature the engine is a stub whose calls do nothing.

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
        sfx_coin: Arc<Vec<u8>>,
        sfx_all_coins: Arc<Vec<u8>>,
        sfx_jump: Arc<Vec<u8>>,
        sfx_land: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("No audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_coin: Arc::new(make_wav(&gen_coin())),
                sfx_all_coins: Arc::new(make_wav(&gen_all_coins())),
                sfx_jump: Arc::new(make_wav(&gen_jump())),
                sfx_land: Arc::new(make_wav(&gen_land())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_coin(&self) { self.play(&self.sfx_coin); }
        pub fn play_all_coins(&self) { self.play(&self.sfx_all_coins); }
        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_land(&self) { self.play(&self.sfx_land); }
    }

    // ── Waveforms (mono f32 samples in -1.0..=1.0) ──

    fn samples_for(secs: f32) -> usize {
        (SAMPLE_RATE as f32 * secs) as usize
    }

    /// Coin: two quick square-ish notes, B5 then E6.
    pub(super) fn gen_coin() -> Vec<f32> {
        let mut out = Vec::new();
        for &(freq, dur) in &[(988.0_f32, 0.05), (1319.0, 0.12)] {
            let n = samples_for(dur);
            out.extend((0..n).map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                wave * env * 0.25
            }));
        }
        out
    }

    /// All coins: rising C-major arpeggio with a held top note.
    pub(super) fn gen_all_coins() -> Vec<f32> {
        let mut out = Vec::new();
        for &(freq, dur) in &[(523.0_f32, 0.08), (659.0, 0.08), (784.0, 0.08), (1047.0, 0.3)] {
            let n = samples_for(dur);
            out.extend((0..n).map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.5;
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 2.0 * TAU).sin() * 0.3;
                wave * env * 0.3
            }));
        }
        out
    }

    /// Jump: upward pitch sweep, 300 Hz to 700 Hz.
    pub(super) fn gen_jump() -> Vec<f32> {
        let n = samples_for(0.12);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                phase += (300.0 + p * 400.0) / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - p) * 0.25
            })
            .collect()
    }

    /// Land: low thud with a burst of LCG noise.
    pub(super) fn gen_land() -> Vec<f32> {
        let n = samples_for(0.06);
        let mut rng: u32 = 0x5EED;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng >> 16) as f32 / 32768.0 - 1.0;
                let tone = (t * 90.0 * TAU).sin();
                (tone * 0.6 + noise * 0.4) * (1.0 - p).powi(2) * 0.35
            })
            .collect()
    }

    // ── WAV container: 16-bit PCM mono ──

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_len = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_len as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_len).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_len.to_le_bytes());
        for &s in samples {
            buf.extend_from_slice(&((s.clamp(-1.0, 1.0) * 32767.0) as i16).to_le_bytes());
        }
        buf
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_coin(&self) {}
    pub fn play_all_coins(&self) {}
    pub fn play_jump(&self) {}
    pub fn play_land(&self) {}
}
