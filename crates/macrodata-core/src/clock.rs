//! Wall-clock time shown in the overlay.

use core::fmt::Write;

use heapless::String;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TimeOfDay {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimeOfDay {
    /// Wraps any second count onto a 24 hour dial.
    pub const fn from_seconds(total: u32) -> Self {
        let secs = total % SECONDS_PER_DAY;
        Self {
            hours: (secs / 3600) as u8,
            minutes: (secs / 60 % 60) as u8,
            seconds: (secs % 60) as u8,
        }
    }

    pub const fn as_seconds(self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }

    /// Adds an uptime offset in milliseconds.
    pub const fn advanced_by_ms(self, elapsed_ms: u64) -> Self {
        let elapsed = (elapsed_ms / 1_000 % SECONDS_PER_DAY as u64) as u32;
        Self::from_seconds(self.as_seconds() + elapsed)
    }

    /// Parses `HH:MM:SS`.
    pub fn parse_hms(text: &str) -> Option<Self> {
        let mut parts = text.trim().split(':');
        let hours: u8 = parts.next()?.parse().ok()?;
        let minutes: u8 = parts.next()?.parse().ok()?;
        let seconds: u8 = parts.next()?.parse().ok()?;
        if parts.next().is_some() || hours > 23 || minutes > 59 || seconds > 59 {
            return None;
        }

        Some(Self {
            hours,
            minutes,
            seconds,
        })
    }

    pub fn format_hms(self) -> String<8> {
        let mut out = String::new();
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        );
        out
    }
}
