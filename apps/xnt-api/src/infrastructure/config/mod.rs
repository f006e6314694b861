//! Configuration Module
//!
//! Client configuration, built in code or loaded from the environment.

mod settings;

pub use settings::{
    AuthMethod, ClientConfig, ConfigError, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TOKEN_TTL, DEFAULT_URL,
};
