mod config;
mod fakes;
mod hotkey;
