use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel, signal::Signal};
use embassy_time::Timer;
use esp_hal::gpio::Input;
use log::{info, warn};
use macrodata_core::input::{
    ButtonEvent, ButtonSource, ControlEvent, Gesture, HoldPoll, HoldWatch, PressTracker,
};
use macrodata_hal_esp32s3::input::button::{ButtonInput, ButtonLatch};

use super::clock::uptime_ms;

const BUTTON_POLL_MS: u64 = 5;
const CONTROL_QUEUE_DEPTH: usize = 8;

/// Control requests for the render loop, drained at the top of every frame.
pub(super) static CONTROL_EVENTS: Channel<
    CriticalSectionRawMutex,
    ControlEvent,
    CONTROL_QUEUE_DEPTH,
> = Channel::new();
pub(super) static BUTTON_LATCH: ButtonLatch = ButtonLatch::new();
static PRESS_STARTED: Signal<CriticalSectionRawMutex, u64> = Signal::new();

#[derive(Clone, Copy, Debug)]
pub(super) struct HoldTimings {
    pub(super) restart_ms: u64,
    pub(super) shutdown_ms: u64,
    pub(super) poll_ms: u64,
}

fn post(event: ControlEvent) {
    if CONTROL_EVENTS.try_send(event).is_err() {
        warn!("button: control queue full, dropped {:?}", event);
    }
}

#[embassy_executor::task]
pub(super) async fn button_task(mut button: ButtonInput<Input<'static>>, restart_hold_ms: u64) {
    let mut tracker = PressTracker::new(restart_hold_ms);

    loop {
        match button.poll_event() {
            Ok(Some(event)) => {
                BUTTON_LATCH.observe(event);
                let now = uptime_ms();
                if event == ButtonEvent::Press {
                    PRESS_STARTED.signal(now);
                }
                if let Some(Gesture::Collect) = tracker.on_event(event, now) {
                    post(ControlEvent::Collect);
                }
            }
            Ok(None) => {}
            Err(err) => warn!("button: poll failed err={:?}", err),
        }

        Timer::after_millis(BUTTON_POLL_MS).await;
    }
}

/// Watches each press: a long hold restarts the screensaver, a longer one shuts it down.
#[embassy_executor::task]
pub(super) async fn hold_watch_task(timings: HoldTimings) {
    loop {
        let pressed_at = PRESS_STARTED.wait().await;
        let restart = HoldWatch::new(pressed_at, timings.restart_ms);
        let shutdown = HoldWatch::new(pressed_at, timings.shutdown_ms);
        let mut restart_sent = false;

        loop {
            Timer::after_millis(timings.poll_ms).await;
            if PRESS_STARTED.signaled() {
                break;
            }

            let now = uptime_ms();
            let pressed = BUTTON_LATCH.is_pressed();
            if !restart_sent {
                match restart.poll(now, pressed) {
                    HoldPoll::Holding => continue,
                    HoldPoll::Released => break,
                    HoldPoll::Elapsed => {
                        info!("button: held {}ms, requesting restart", timings.restart_ms);
                        post(ControlEvent::Restart);
                        restart_sent = true;
                    }
                }
            }

            match shutdown.poll(now, pressed) {
                HoldPoll::Holding => {}
                HoldPoll::Released => break,
                HoldPoll::Elapsed => {
                    info!("button: held {}ms, requesting shutdown", timings.shutdown_ms);
                    post(ControlEvent::Shutdown);
                    break;
                }
            }
        }
    }
}
