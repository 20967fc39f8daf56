mod command;
mod controller;
mod engine;

pub use {
    command::{VolumeCommand, VolumeOutcome, percent_to_scalar, scalar_to_percent},
    controller::VolumeController,
    engine::VolumeEngine,
};
