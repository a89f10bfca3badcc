//! Identity-domain identifiers and the access token handed out by the token exchange.

pub mod id;
pub mod token;

pub use id::*;
pub use token::*;
