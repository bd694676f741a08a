//! Sound effects
//!
//! Effects are short synthesized tones, so the game ships without asset
//! files. Audio is optional: `AudioManager::new` returns None when no output
//! device is available and the host runs silent.

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::time::Duration;
use tracing::warn;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sfx {
    Move,
    Rotate,
    RowClear,
    LevelUp,
    GameOver,
}

impl Sfx {
    /// Tone sequence as (frequency Hz, duration ms)
    fn notes(&self) -> &'static [(f32, u64)] {
        match self {
            Sfx::Move => &[(440.0, 25)],
            Sfx::Rotate => &[(660.0, 30)],
            Sfx::RowClear => &[(523.25, 60), (659.25, 60), (783.99, 90)],
            Sfx::LevelUp => &[(523.25, 80), (659.25, 80), (783.99, 80), (1046.5, 160)],
            Sfx::GameOver => &[(392.0, 150), (311.13, 150), (261.63, 300)],
        }
    }
}

/// Audio manager handles all sound playback
pub struct AudioManager {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sfx_volume: f32,
}

impl AudioManager {
    /// Open the default output device
    pub fn new() -> Option<Self> {
        let (stream, stream_handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                warn!("No audio output, running silent: {}", e);
                return None;
            }
        };

        Some(Self {
            _stream: stream,
            stream_handle,
            sfx_volume: 0.5,
        })
    }

    /// Set SFX volume (0.0 to 1.0)
    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
    }

    /// Play a sound effect without blocking
    pub fn play_sfx(&mut self, sfx: Sfx) {
        if self.sfx_volume <= 0.0 {
            return;
        }

        let Ok(sink) = Sink::try_new(&self.stream_handle) else {
            return;
        };
        sink.set_volume(self.sfx_volume);
        for &(freq, ms) in sfx.notes() {
            sink.append(
                SineWave::new(freq)
                    .take_duration(Duration::from_millis(ms))
                    .amplify(0.2),
            );
        }
        sink.detach(); // Let it play and clean up automatically
    }
}
