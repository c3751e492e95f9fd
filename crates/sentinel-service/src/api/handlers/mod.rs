//! API request handlers

mod analyze;
mod deploy;
mod health;
mod monitor;

pub use analyze::*;
pub use deploy::*;
pub use health::*;
pub use monitor::*;
