pub mod config;
pub mod coverage;
pub mod encoding;
pub mod fingerprint;
pub mod loader;
pub mod placeholder;
pub mod qa;
pub mod resolve;
pub mod writer;
