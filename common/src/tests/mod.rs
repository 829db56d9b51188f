#[cfg(feature = "config")]
mod config;
#[cfg(feature = "http")]
mod http;
