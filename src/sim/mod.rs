pub mod command;
pub mod controller;
pub mod event;
pub mod games;
pub mod hub;
pub mod intro;
pub mod results;
pub mod screen;
pub mod sequencer;
pub mod timer;
