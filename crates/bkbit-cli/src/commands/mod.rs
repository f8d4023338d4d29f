//! CLI command implementations
//!
//! Each group of subcommands has its own module; translation results go to
//! stdout, everything else is logged.

pub mod anatomical;
pub mod catalog;
pub mod genome;
pub mod schema;
pub mod specimen;
