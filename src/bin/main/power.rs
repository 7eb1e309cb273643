use embassy_time::Timer;
use esp_hal::{
    gpio::RtcPin,
    peripherals::{GPIO14, LPWR},
    rtc_cntl::{
        Rtc,
        sleep::{RtcioWakeupSource, WakeupLevel},
    },
};
use log::info;

use super::buttons::BUTTON_LATCH;

/// Powers down until the button is pressed again; waking reboots the firmware.
pub(super) async fn enter_deep_sleep() -> ! {
    // A held button would wake the chip straight back up.
    while BUTTON_LATCH.is_pressed() {
        Timer::after_millis(20).await;
    }
    info!("power: entering deep sleep, wake on button");

    let mut rtc = Rtc::new(unsafe { LPWR::steal() });
    let mut wake_button = unsafe { GPIO14::steal() };
    let mut wake_pins: [(&mut dyn RtcPin, WakeupLevel); 1] =
        [(&mut wake_button, WakeupLevel::Low)];
    let wake_source = RtcioWakeupSource::new(&mut wake_pins);

    rtc.sleep_deep(&[&wake_source]);
}
