//! NotifyButton firmware entry point.
//!
//! Boot: config from SPIFFS, red LED, Wi-Fi, orange LED, arm (green).
//! Then the main task waits on task notifications from two sources:
//!
//! - button ISR: edge accepted, run the dispatch
//! - re-arm timer: gate re-opened, enable the button interrupt again
//!
//! The button interrupt disables itself after every edge. It is only
//! re-enabled while the gate is armed, so a locked gate sees no interrupt
//! load from a bouncing contact.

#[cfg(target_os = "espidf")]
mod hal;

#[cfg(target_os = "espidf")]
fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("{}", env!("VERSION_STRING"));

    if let Err(e) = firmware::start() {
        log::error!("fatal: {:#}", e);
        firmware::halt();
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "{}: firmware image; build for an ESP-IDF target to run it",
        env!("VERSION_STRING")
    );
}

#[cfg(target_os = "espidf")]
mod firmware {
    use core::num::NonZeroU32;
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::delay::{FreeRtos, TickType};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::task::notification::Notification;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::timer::EspTaskTimerService;

    use notify_button::log_drain::drain_to_log;
    use notify_button::{
        bootstrap, isr_debug, isr_info, Config, Dispatcher, EdgeOutcome, Indicator,
        IndicatorState, TriggerMachine, TriggerState, EVENT_LOG,
    };

    use crate::hal::gpio::{Board, BoardIndicator, ButtonPin};
    use crate::hal::http::EspHttpTransport;
    use crate::hal::timer::EspRearmTimer;
    use crate::hal::wifi::EspWifiLink;
    use crate::hal::{storage, timestamp_us};

    const EDGE_ACCEPTED: NonZeroU32 = bit(1);
    const REARMED: NonZeroU32 = bit(2);

    /// How long the main task sleeps before draining the event log anyway.
    const IDLE_WAIT_MS: u64 = 1000;

    const fn bit(value: u32) -> NonZeroU32 {
        match NonZeroU32::new(value) {
            Some(v) => v,
            None => panic!("notification bit must be non-zero"),
        }
    }

    /// Board bring-up, then the main loop. Returns only if bring-up fails;
    /// a later error halts with the indicator still showing its last colour.
    pub fn start() -> Result<()> {
        let peripherals = Peripherals::take()?;
        let Board {
            indicator,
            button,
            onboard_led,
        } = Board::new(peripherals.pins)?;

        let indicator = Arc::new(indicator);
        if let Err(e) = run(Arc::clone(&indicator), button, peripherals.modem) {
            log::error!("fatal: {:#}", e);
        }

        // Dropping a PinDriver resets the pin; hold them while parked.
        let _held = (indicator, onboard_led);
        halt()
    }

    /// Park the task forever.
    pub fn halt() -> ! {
        loop {
            FreeRtos::delay_ms(1000);
        }
    }

    fn run(
        indicator: Arc<BoardIndicator>,
        mut button: ButtonPin,
        modem: esp_idf_svc::hal::modem::Modem,
    ) -> Result<()> {
        storage::mount().context("mounting SPIFFS")?;
        let raw = storage::read_config()
            .with_context(|| format!("reading {}", storage::CONFIG_PATH))?;
        let config = Config::from_slice(&raw)?;
        drop(raw);

        log::info!(
            "config: ssid '{}', dead time {} ms",
            config.wifi_ssid,
            config.dead_time.as_millis()
        );

        let machine = Arc::new(TriggerMachine::new(Arc::clone(&indicator), config.dead_time));
        indicator.set_indicator(IndicatorState::Red);

        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;
        let mut link = EspWifiLink::new(modem, sysloop, Some(nvs), config.wifi_timeout)?;
        let conn = bootstrap(&mut link, &config)?;
        log::info!("network: {}", conn);
        indicator.set_indicator(IndicatorState::Orange);

        let mut dispatcher = Dispatcher::new(
            EspHttpTransport::new(config.notification.http_timeout),
            &config.notification,
        );

        let notification = Notification::new();

        let timer_service = EspTaskTimerService::new()?;
        let rearm_timer = {
            let machine = Arc::clone(&machine);
            let notifier = notification.notifier();
            EspRearmTimer::new(&timer_service, move || {
                if machine.on_rearm_timer_fire() {
                    isr_debug!(EVENT_LOG, timestamp_us(), "re-armed");
                    // SAFETY: the notification outlives the timer; both live
                    // for the rest of run().
                    unsafe {
                        notifier.notify_and_yield(REARMED);
                    }
                }
            })?
        };

        machine.arm();

        {
            let machine = Arc::clone(&machine);
            let notifier = notification.notifier();
            // SAFETY: the closure only touches atomics and the lock-free log.
            unsafe {
                button.subscribe(move || {
                    let now = timestamp_us();
                    if machine.accept_edge() {
                        isr_info!(EVENT_LOG, now, "edge accepted");
                        notifier.notify_and_yield(EDGE_ACCEPTED);
                    } else {
                        isr_debug!(EVENT_LOG, now, "edge ignored");
                    }
                })?;
            }
        }
        button.enable_interrupt()?;

        log::info!("ready");

        loop {
            let bits = notification.wait(TickType::new_millis(IDLE_WAIT_MS).ticks());

            if let Some(bits) = bits {
                if bits.get() & EDGE_ACCEPTED.get() != 0 {
                    match machine.complete_trigger(&mut dispatcher, &rearm_timer) {
                        EdgeOutcome::Delivered => log::info!("trigger: notification delivered"),
                        EdgeOutcome::Failed => log::warn!("trigger: notification failed"),
                        EdgeOutcome::Ignored => {}
                    }
                    log::info!("stats: {}", machine.stats());
                }
            }

            if machine.state() == TriggerState::Armed {
                button.enable_interrupt()?;
            }

            drain_to_log(&EVENT_LOG);
        }
    }
}
