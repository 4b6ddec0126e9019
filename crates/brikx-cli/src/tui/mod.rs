//! Minimal terminal runtime: an event loop and a runner that feeds its events
//! to an [`App`].

mod app;
mod event;
mod event_loop;
mod runner;

pub use self::{app::App, event_loop::RenderMode, runner::Tui};
