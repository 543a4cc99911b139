mod esp_now;

pub(crate) use esp_now::{EspNowLinkReceiver, EspNowLinkSender, init_esp_now};
