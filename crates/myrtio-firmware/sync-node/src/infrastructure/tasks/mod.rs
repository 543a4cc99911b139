pub(crate) mod link;
pub(crate) mod sync;

pub(crate) use link::{esp_now_rx_task, esp_now_tx_task, link_report_task};
pub(crate) use sync::{liveness_ticker_task, resync_ticker_task, sync_task};
