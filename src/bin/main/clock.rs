use embassy_time::Instant;
use log::{info, warn};
use macrodata_core::clock::TimeOfDay;

/// Time of day seeded at build time and advanced by uptime.
pub(super) struct WallClock {
    base: TimeOfDay,
    boot: Instant,
}

impl WallClock {
    pub(super) fn from_build_env() -> Self {
        let base = match option_env!("MACRODATA_CLOCK_BASE") {
            Some(text) => TimeOfDay::parse_hms(text).unwrap_or_else(|| {
                warn!("clock: MACRODATA_CLOCK_BASE={} is not HH:MM:SS, using 00:00:00", text);
                TimeOfDay::default()
            }),
            None => TimeOfDay::default(),
        };
        info!("clock: base={}", base.format_hms().as_str());

        Self {
            base,
            boot: Instant::now(),
        }
    }

    pub(super) fn now(&self) -> TimeOfDay {
        self.base.advanced_by_ms(self.boot.elapsed().as_millis())
    }
}

pub(super) fn uptime_ms() -> u64 {
    Instant::now().as_millis()
}
