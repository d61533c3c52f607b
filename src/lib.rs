#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod datamodel;
pub mod error;
pub mod metrics;
pub mod transport;
