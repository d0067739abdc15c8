//! Command implementations

mod catalog;
mod core;
mod serve;

pub use catalog::{cmd_courses_list, cmd_crawl};
pub use core::{cmd_init, cmd_status, open_db};
pub use serve::cmd_serve;
