//! `solar-quote`: command-line front end of the PV quoting tool.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod params;
pub mod session;
pub mod tables;
pub mod utils;
