#![no_std]
#![no_main]
#![feature(type_alias_impl_trait)]

mod controllers;
mod infrastructure;

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};

use myrtio_light_sync::{
    ActionChannel, Event, EventChannel, LinkStats, LocalCommand, LocalCommandForwarder,
    StateStore, SyncProtocol,
};

use crate::controllers::init_button_controller;
use crate::infrastructure::config;
use crate::infrastructure::drivers::init_esp_now;
use crate::infrastructure::tasks::{
    esp_now_rx_task, esp_now_tx_task, link_report_task, liveness_ticker_task,
    resync_ticker_task, sync_task,
};

esp_bootloader_esp_idf::esp_app_desc!();

static LIGHT_STATE: StateStore = StateStore::new(config::STARTUP_STATE);
static EVENTS: EventChannel = EventChannel::new();
static ACTIONS: ActionChannel = ActionChannel::new();
static LINK_STATS: LinkStats = LinkStats::new();

// static_cell::make_static! in main causes a compiler error
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();

    // Initialize hardware
    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    // The radio driver allocates its buffers on the heap
    esp_alloc::heap_allocator!(size: 72 * 1024);

    // Start rtos
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    log::info!(
        "sync: starting {} as {:?}",
        config::NODE.name,
        config::NODE.role
    );

    let (link_tx, link_rx) = match init_esp_now(peripherals.WIFI, &config::NODE.peers).await {
        Ok(link) => link,
        Err(err) => {
            log::error!("esp_now: init failed: {:?}, restarting", err);
            Timer::after(Duration::from_secs(1)).await;
            esp_hal::system::software_reset()
        }
    };

    let on_press = mk_static!(
        LocalCommandForwarder<'static>,
        LocalCommandForwarder::new(EVENTS.sender(), LocalCommand::AdvanceMode)
    );
    init_button_controller(peripherals.IO_MUX, button_gpio!(peripherals), on_press);

    let protocol = SyncProtocol::new(config::sync_config(), &LIGHT_STATE);
    if EVENTS.try_send(Event::Boot).is_err() {
        log::warn!("sync: event queue full, skipping handshake");
    }

    spawner
        .spawn(sync_task(protocol, EVENTS.receiver(), ACTIONS.sender()))
        .ok();
    spawner
        .spawn(esp_now_tx_task(link_tx, ACTIONS.receiver(), &LINK_STATS))
        .ok();
    spawner.spawn(esp_now_rx_task(link_rx, EVENTS.sender())).ok();
    spawner.spawn(resync_ticker_task(EVENTS.sender())).ok();
    spawner.spawn(liveness_ticker_task(EVENTS.sender())).ok();
    spawner.spawn(link_report_task(&LINK_STATS)).ok();

    loop {
        Timer::after(Duration::from_secs(5)).await;
    }
}
