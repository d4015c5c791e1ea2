pub mod command_parser;
pub mod config_loader;
pub mod contest_processor;
pub mod scoreboard;
pub mod scroll_flow;
pub mod session;
pub mod snapshot;
