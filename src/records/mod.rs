pub mod reader;
pub mod types;

pub use reader::{filter_records, read_log_file};
pub use types::{strip_quotes, EventCode, EventRecord};
