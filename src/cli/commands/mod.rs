//! One module per `ragkeeper` subcommand.

pub mod backfill;
pub mod embed;
pub mod load;
pub mod prompt;
pub mod search;
pub mod serve_check;
pub mod stats;
