use embassy_time::{Duration, Timer};
use myrtio_light_sync::LinkStats;
use myrtio_light_sync::runtime::{ActionReceiver, EventSender, run_receiver, run_transmitter};

use crate::infrastructure::config;
use crate::infrastructure::drivers::{EspNowLinkReceiver, EspNowLinkSender};

/// Background task sending queued frames over ESP-NOW
#[embassy_executor::task]
pub(crate) async fn esp_now_tx_task(
    mut link: EspNowLinkSender,
    actions: ActionReceiver<'static>,
    stats: &'static LinkStats,
) {
    run_transmitter(&mut link, actions, stats).await
}

/// Background task feeding received frames to the sync task
#[embassy_executor::task]
pub(crate) async fn esp_now_rx_task(mut link: EspNowLinkReceiver, events: EventSender<'static>) {
    run_receiver(&mut link, events).await
}

/// Background task periodically logging delivery counters
#[embassy_executor::task]
pub(crate) async fn link_report_task(stats: &'static LinkStats) {
    let period = Duration::from_secs(config::LINK.report_period_secs);
    loop {
        Timer::after(period).await;
        let counters = stats.counters();
        log::info!(
            "esp_now: sent={} delivered={} failed={}",
            counters.sent,
            counters.delivered,
            counters.failed
        );
    }
}
