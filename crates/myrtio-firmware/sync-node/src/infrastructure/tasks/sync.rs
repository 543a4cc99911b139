use embassy_time::Duration;
use myrtio_light_sync::runtime::{ActionSender, EventReceiver, EventSender, run_sync, run_ticker};
use myrtio_light_sync::{Event, StateStore, SyncProtocol};

use crate::infrastructure::config;

/// Background task owning the sync state machine
#[embassy_executor::task]
pub(crate) async fn sync_task(
    mut protocol: SyncProtocol<'static, StateStore>,
    events: EventReceiver<'static>,
    actions: ActionSender<'static>,
) {
    run_sync(&mut protocol, events, actions).await
}

/// Background task pushing the full state to every peer
#[embassy_executor::task]
pub(crate) async fn resync_ticker_task(events: EventSender<'static>) {
    let period = Duration::from_millis(config::TIMING.resync_period_ms);
    run_ticker(events, period, Event::ResyncTick).await
}

#[embassy_executor::task]
pub(crate) async fn liveness_ticker_task(events: EventSender<'static>) {
    let period = Duration::from_millis(config::TIMING.liveness_sweep_ms);
    run_ticker(events, period, Event::LivenessTick).await
}
