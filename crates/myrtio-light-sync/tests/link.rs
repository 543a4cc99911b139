//! Delivery accounting and button-to-protocol event forwarding.

use embassy_time::Instant;
use myrtio_light_sync::{
    ButtonInput, DeliveryStatus, Event, EventChannel, LinkCounters, LinkStats, LocalCommand,
    LocalCommandForwarder,
};

#[test]
fn stats_count_every_outcome() {
    let stats = LinkStats::new();
    stats.record(DeliveryStatus::Delivered);
    stats.record(DeliveryStatus::Failed);
    stats.record(DeliveryStatus::Delivered);

    assert_eq!(
        stats.counters(),
        LinkCounters {
            sent: 3,
            delivered: 2,
            failed: 1,
        }
    );
}

#[test]
fn fresh_stats_are_zero() {
    assert_eq!(LinkStats::default().counters(), LinkCounters::default());
}

#[test]
fn accepted_press_enqueues_local_command() {
    let channel = EventChannel::new();
    let forwarder = LocalCommandForwarder::new(channel.sender(), LocalCommand::AdvanceMode);
    let mut button = ButtonInput::default();
    button.register(&forwarder);

    button.on_falling_edge(Instant::from_millis(0));
    button.on_falling_edge(Instant::from_millis(10));

    assert_eq!(
        channel.try_receive(),
        Ok(Event::Local(LocalCommand::AdvanceMode))
    );
    assert!(channel.try_receive().is_err(), "bounce must not enqueue");
}

#[test]
fn full_event_queue_drops_presses() {
    let channel = EventChannel::new();
    let forwarder = LocalCommandForwarder::new(channel.sender(), LocalCommand::BrightnessUp);
    let mut button = ButtonInput::default();
    button.register(&forwarder);

    for press in 0..20 {
        button.on_falling_edge(Instant::from_millis(press * 100));
    }

    let mut queued = 0;
    while channel.try_receive().is_ok() {
        queued += 1;
    }
    assert_eq!(queued, 8);
}
