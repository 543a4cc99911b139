//! Run loops polled by hand against in-memory links.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::pin::{Pin, pin};
use std::task::{Context, Waker};
use std::time::Duration as StdDuration;

use embassy_time::{Duration, Instant};
use myrtio_light_sync::protocol::INTER_SEND_PAUSE;
use myrtio_light_sync::runtime::{run_receiver, run_sync, run_ticker, run_transmitter};
use myrtio_light_sync::{
    Action, ActionChannel, Address, Datagram, DeliveryStatus, Event, EventChannel, LightState,
    LightStateSink, LinkCounters, LinkReceiver, LinkSender, LinkStats, LocalCommand, Message,
    ModeId, PeerTable, Role, StateStore, SyncConfig, SyncProtocol,
};

const PAIRED_LEAD: Address = Address::new([0xDC, 0x54, 0x75, 0xF1, 0xE2, 0x38]);
const FOLLOW: Address = Address::new([0xDC, 0x54, 0x75, 0xF1, 0xE1, 0x34]);

const INITIAL: LightState = LightState::new(ModeId::Warm, 153);

fn lead_config() -> SyncConfig {
    SyncConfig::new(
        Role::Lead,
        PeerTable::new()
            .with_paired_lead(PAIRED_LEAD, 0)
            .with_follow(FOLLOW, 0),
    )
}

fn send(to: Address, state: LightState) -> Action {
    Action::Send {
        to,
        frame: Message::Snapshot(state).encode(),
    }
}

fn resync_batch(state: LightState) -> [Action; 3] {
    [
        send(FOLLOW, state),
        Action::Pause(INTER_SEND_PAUSE),
        send(PAIRED_LEAD, state),
    ]
}

/// Poll a run loop once; it must still be running afterwards
fn poll_once<F: Future>(future: Pin<&mut F>) {
    let mut cx = Context::from_waker(Waker::noop());
    assert!(future.poll(&mut cx).is_pending());
}

/// Keep polling until `done` holds, sleeping between polls so timers can expire
fn poll_until<F: Future>(mut future: Pin<&mut F>, done: impl Fn() -> bool) {
    for _ in 0..2_000 {
        if done() {
            return;
        }
        poll_once(future.as_mut());
        std::thread::sleep(StdDuration::from_millis(1));
    }
    panic!("run loop made no progress");
}

fn drain_actions(channel: &ActionChannel) -> Vec<Action> {
    std::iter::from_fn(|| channel.try_receive().ok()).collect()
}

fn drain_events(channel: &EventChannel) -> Vec<Event> {
    std::iter::from_fn(|| channel.try_receive().ok()).collect()
}

struct RecordingLink<'a> {
    sent: &'a RefCell<Vec<(Address, Vec<u8>, Instant)>>,
    unreachable: Option<Address>,
}

impl LinkSender for RecordingLink<'_> {
    async fn send(&mut self, to: &Address, payload: &[u8]) -> DeliveryStatus {
        self.sent
            .borrow_mut()
            .push((*to, payload.to_vec(), Instant::now()));
        if self.unreachable == Some(*to) {
            DeliveryStatus::Failed
        } else {
            DeliveryStatus::Delivered
        }
    }
}

struct ScriptedLink {
    inbox: VecDeque<Datagram>,
}

impl LinkReceiver for ScriptedLink {
    async fn receive(&mut self) -> Datagram {
        match self.inbox.pop_front() {
            Some(datagram) => datagram,
            None => std::future::pending().await,
        }
    }
}

#[test]
fn sync_loop_forwards_batches_in_order() {
    let store = StateStore::new(INITIAL);
    let mut protocol = SyncProtocol::new(lead_config(), &store);
    let events = EventChannel::new();
    let actions = ActionChannel::new();

    events.try_send(Event::ResyncTick).unwrap();
    events.try_send(Event::Local(LocalCommand::AdvanceMode)).unwrap();

    let future = pin!(run_sync(&mut protocol, events.receiver(), actions.sender()));
    poll_once(future);

    let advanced = LightState::new(ModeId::Blue, 153);
    assert_eq!(
        drain_actions(&actions),
        [resync_batch(INITIAL), resync_batch(advanced)].concat()
    );
}

#[test]
fn sync_loop_drops_batches_that_do_not_fit_whole() {
    let store = StateStore::new(INITIAL);
    let mut protocol = SyncProtocol::new(lead_config(), &store);
    let events = EventChannel::new();
    let actions = ActionChannel::new();

    for _ in 0..3 {
        events.try_send(Event::ResyncTick).unwrap();
    }

    let mut future = pin!(run_sync(&mut protocol, events.receiver(), actions.sender()));
    poll_once(future.as_mut());

    // Capacity 8 holds two batches of three, the third is dropped entirely
    let queued = drain_actions(&actions);
    assert_eq!(queued, [resync_batch(INITIAL), resync_batch(INITIAL)].concat());
    assert_eq!(queued.last(), Some(&send(PAIRED_LEAD, INITIAL)));

    // The loop keeps going once the outbox drains
    events.try_send(Event::ResyncTick).unwrap();
    poll_once(future.as_mut());
    assert_eq!(drain_actions(&actions), resync_batch(INITIAL));
}

#[test]
fn sync_loop_survives_rejected_payloads() {
    let store = StateStore::new(INITIAL);
    let mut protocol = SyncProtocol::new(lead_config(), &store);
    let events = EventChannel::new();
    let actions = ActionChannel::new();

    events
        .try_send(Event::Datagram(Datagram::new(PAIRED_LEAD, &[1, 2, 3])))
        .unwrap();
    events.try_send(Event::ResyncTick).unwrap();

    let future = pin!(run_sync(&mut protocol, events.receiver(), actions.sender()));
    poll_once(future);

    assert_eq!(drain_actions(&actions), resync_batch(INITIAL));
    assert_eq!(store.get(), INITIAL);
}

#[test]
fn transmitter_sends_in_order_with_pause() {
    let sent = RefCell::new(Vec::new());
    let mut link = RecordingLink {
        sent: &sent,
        unreachable: Some(PAIRED_LEAD),
    };
    let actions = ActionChannel::new();
    let stats = LinkStats::new();

    for action in resync_batch(INITIAL) {
        actions.try_send(action).unwrap();
    }

    let future = pin!(run_transmitter(&mut link, actions.receiver(), &stats));
    poll_until(future, || sent.borrow().len() == 2);

    let sent = sent.borrow();
    let payload = Message::Snapshot(INITIAL).encode().as_bytes().to_vec();
    assert_eq!(sent[0].0, FOLLOW);
    assert_eq!(sent[1].0, PAIRED_LEAD);
    assert_eq!(sent[0].1, payload);
    assert_eq!(sent[1].1, payload);
    assert!(sent[1].2.duration_since(sent[0].2) >= INTER_SEND_PAUSE);

    assert_eq!(
        stats.counters(),
        LinkCounters {
            sent: 2,
            delivered: 1,
            failed: 1,
        }
    );
}

#[test]
fn receiver_forwards_datagrams_as_events() {
    let first = Datagram::new(PAIRED_LEAD, &[0xFF]);
    let second = Datagram::new(FOLLOW, &[1, 51]);
    let mut link = ScriptedLink {
        inbox: VecDeque::from([first, second]),
    };
    let events = EventChannel::new();

    let future = pin!(run_receiver(&mut link, events.sender()));
    poll_once(future);

    assert_eq!(
        drain_events(&events),
        [Event::Datagram(first), Event::Datagram(second)]
    );
}

#[test]
fn receiver_drops_datagrams_when_event_queue_is_full() {
    let mut link = ScriptedLink {
        inbox: (0..12u8)
            .map(|brightness| Datagram::new(PAIRED_LEAD, &[1, brightness]))
            .collect(),
    };
    let events = EventChannel::new();

    let future = pin!(run_receiver(&mut link, events.sender()));
    poll_once(future);

    let queued = drain_events(&events);
    assert_eq!(queued.len(), 8);
    assert_eq!(
        queued.first(),
        Some(&Event::Datagram(Datagram::new(PAIRED_LEAD, &[1, 0])))
    );
}

#[test]
fn ticker_emits_its_event_periodically() {
    let events = EventChannel::new();

    let future = pin!(run_ticker(
        events.sender(),
        Duration::from_millis(5),
        Event::LivenessTick
    ));
    poll_until(future, || events.len() >= 2);

    assert!(
        drain_events(&events)
            .iter()
            .all(|event| *event == Event::LivenessTick)
    );
}
