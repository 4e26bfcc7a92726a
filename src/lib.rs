pub mod config;
pub mod diagnostics;
pub mod input;
pub mod output;
pub mod records;
pub mod sets;
pub mod tally;
