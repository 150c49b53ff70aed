mod actions;
mod app;
mod config;
mod dom;
mod net;
mod output;
mod state;
mod submit;
mod surface;
mod util;

pub use app::run;
