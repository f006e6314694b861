//! Application Ports
//!
//! - `TokenSource` (driven): read access to the current bearer token. The
//!   HTTP and streaming adapters depend on this port only; the owner of the
//!   token lifecycle lives in infrastructure.

mod token_source_port;

pub use token_source_port::{StaticToken, Token, TokenSource};
