mod button;

pub(crate) use button::init_button_controller;
