use embassy_time::{Duration, Timer};
use esp_hal::peripherals::WIFI;
use esp_radio::esp_now::{
    EspNowError, EspNowReceiver, EspNowSender, EspNowWifiInterface, PeerInfo,
};
use esp_radio::wifi::{ClientConfig, Config as WifiConfig, ModeConfig, WifiController, WifiError};
use esp_radio::InitializationError;
use static_cell::make_static;

use myrtio_light_sync::{
    Address, Datagram, DeliveryStatus, LinkReceiver, LinkSender, Peer, PeerTable,
};

use crate::infrastructure::config;

#[derive(Debug)]
pub(crate) enum LinkInitError {
    Radio(InitializationError),
    Wifi(WifiError),
    Peer(Address, EspNowError),
}

pub(crate) struct EspNowLinkSender {
    sender: EspNowSender<'static>,
}

impl LinkSender for EspNowLinkSender {
    async fn send(&mut self, to: &Address, payload: &[u8]) -> DeliveryStatus {
        match self.sender.send_async(to.as_bytes(), payload).await {
            Ok(()) => DeliveryStatus::Delivered,
            Err(_) => DeliveryStatus::Failed,
        }
    }
}

pub(crate) struct EspNowLinkReceiver {
    receiver: EspNowReceiver<'static>,
}

impl LinkReceiver for EspNowLinkReceiver {
    async fn receive(&mut self) -> Datagram {
        let received = self.receiver.receive_async().await;
        Datagram::new(Address::new(received.info.src_address), received.data())
    }
}

/// Bring up the radio in station mode and register every peer this node sends to
pub(crate) async fn init_esp_now(
    wifi_device: WIFI<'static>,
    peers: &PeerTable,
) -> Result<(EspNowLinkSender, EspNowLinkReceiver), LinkInitError> {
    let esp_radio_ctrl = esp_radio::init().map_err(LinkInitError::Radio)?;
    let esp_radio_ctrl = &*make_static!(esp_radio_ctrl);
    let (mut controller, interfaces) =
        esp_radio::wifi::new(esp_radio_ctrl, wifi_device, WifiConfig::default())
            .map_err(LinkInitError::Wifi)?;

    controller
        .set_config(&ModeConfig::Client(ClientConfig::default()))
        .map_err(LinkInitError::Wifi)?;
    start_radio(&mut controller).await?;

    let (manager, sender, receiver) = interfaces.esp_now.split();
    for peer in peers.send_targets() {
        manager
            .add_peer(peer_info(&peer))
            .map_err(|err| LinkInitError::Peer(peer.address, err))?;
        log::info!("esp_now: registered {:?} {}", peer.role, peer.address);
    }

    // Dropping the controller stops the radio
    make_static!(controller);

    Ok((
        EspNowLinkSender { sender },
        EspNowLinkReceiver { receiver },
    ))
}

async fn start_radio(controller: &mut WifiController<'static>) -> Result<(), LinkInitError> {
    let mut backoff = Duration::from_millis(config::LINK.start_backoff_ms);
    let mut attempt = 1;
    loop {
        match controller.start_async().await {
            Ok(()) => return Ok(()),
            Err(err) if attempt < config::LINK.start_attempts => {
                log::warn!(
                    "esp_now: radio start failed ({:?}), attempt {}/{}, retrying in {} ms",
                    err,
                    attempt,
                    config::LINK.start_attempts,
                    backoff.as_millis()
                );
                Timer::after(backoff).await;
                backoff = backoff * 2;
                attempt += 1;
            }
            Err(err) => return Err(LinkInitError::Wifi(err)),
        }
    }
}

fn peer_info(peer: &Peer) -> PeerInfo {
    PeerInfo {
        interface: EspNowWifiInterface::Sta,
        peer_address: *peer.address.as_bytes(),
        lmk: None,
        channel: (peer.channel != 0).then_some(peer.channel),
        encrypt: false,
    }
}
