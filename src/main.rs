mod app;
mod config;
mod error;
mod message;
mod model;
mod service;
mod utils;
mod views;

pub fn main() -> iced::Result {
    app::run()
}
