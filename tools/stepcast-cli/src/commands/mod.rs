pub mod config;
pub mod displays;
pub mod record;
