use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use embassy_time::{Duration, Instant};
use esp_hal::{
    gpio::{Event, Input, InputConfig, InputPin, Io, Pull},
    handler,
    peripherals::IO_MUX,
    ram,
};
use myrtio_light_sync::{ButtonInput, PressHandler};

use crate::infrastructure::config;

static BUTTON: Mutex<CriticalSectionRawMutex, RefCell<Option<Input>>> =
    Mutex::new(RefCell::new(None));

static BUTTON_INPUT: Mutex<CriticalSectionRawMutex, RefCell<ButtonInput<'static>>> =
    Mutex::new(RefCell::new(ButtonInput::new(Duration::from_millis(
        config::TIMING.debounce_ms,
    ))));

/// Listen for falling edges on `pin` and route debounced presses to `on_press`
pub(crate) fn init_button_controller(
    mux: IO_MUX<'static>,
    pin: impl InputPin + 'static,
    on_press: &'static dyn PressHandler,
) {
    BUTTON_INPUT.lock(|cell| cell.borrow_mut().register(on_press));

    let mut io = Io::new(mux);
    io.set_interrupt_handler(handle_button_edge);
    let mut button = Input::new(pin, InputConfig::default().with_pull(Pull::Up));
    button.listen(Event::FallingEdge);

    BUTTON.lock(|cell| {
        cell.borrow_mut().replace(button);
    });
}

#[handler]
#[ram]
fn handle_button_edge() {
    let is_button_interrupt = BUTTON.lock(|cell| {
        let mut cell = cell.borrow_mut();
        if let Some(button) = cell.as_mut() {
            let is_set = button.is_interrupt_set();
            button.clear_interrupt();
            is_set
        } else {
            false
        }
    });

    if is_button_interrupt {
        let now = Instant::now();
        BUTTON_INPUT.lock(|cell| {
            cell.borrow_mut().on_falling_edge(now);
        });
    }
}
