pub mod check;
pub mod config;
pub mod session;
pub mod setup;
pub mod toggle;
