pub mod config;

pub use config::{Credentials, HarnessConfig};
