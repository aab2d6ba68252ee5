/// Recipe Wizard - multi-step recipe editing engine
///
/// Core library providing the recipe form wizard state machine, draft
/// persistence and the recipe backend client.

pub mod config;
pub mod core;
pub mod database;


pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
