pub mod catalog;
pub mod error;
pub mod keys;
pub mod ports;
