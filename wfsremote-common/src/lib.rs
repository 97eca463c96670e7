//! wfsremote-common/src/lib.rs
//!
//! Types shared by the OSC engine, the server binary and any UI front end.

pub mod error;
pub mod models;

pub use error::Error;
