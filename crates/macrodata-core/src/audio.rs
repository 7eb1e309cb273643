//! Fire-and-forget sound effects.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Sound {
    Startup,
    Click,
}

pub trait AudioSink {
    /// Starts playback without blocking.
    fn play(&mut self, sound: Sound, volume_pct: u8);

    fn is_busy(&self) -> bool;
}

/// Sink for boards without a speaker or without bundled sounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _sound: Sound, _volume_pct: u8) {}

    fn is_busy(&self) -> bool {
        false
    }
}

/// Plays the click unless other audio is still running.
pub fn play_click<A: AudioSink + ?Sized>(audio: &mut A, volume_pct: u8) -> bool {
    if audio.is_busy() {
        return false;
    }

    audio.play(Sound::Click, volume_pct);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingAudio {
        busy: bool,
        played: heapless::Vec<(Sound, u8), 4>,
    }

    impl AudioSink for RecordingAudio {
        fn play(&mut self, sound: Sound, volume_pct: u8) {
            let _ = self.played.push((sound, volume_pct));
        }

        fn is_busy(&self) -> bool {
            self.busy
        }
    }

    #[test]
    fn click_skipped_while_busy() {
        let mut audio = RecordingAudio {
            busy: true,
            ..Default::default()
        };

        assert!(!play_click(&mut audio, 10));
        assert!(audio.played.is_empty());

        audio.busy = false;
        assert!(play_click(&mut audio, 10));
        assert_eq!(audio.played.as_slice(), &[(Sound::Click, 10)]);
    }
}
