//! Identity normalization pipeline: parse the user-info payload, resolve the organization
//! affiliation, and assemble the canonical record.

pub mod affiliation;
pub mod parser;
pub mod record;

pub use affiliation::*;
pub use parser::*;
pub use record::*;
