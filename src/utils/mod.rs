pub mod formatting;

pub use formatting::{examination_label, format_date, format_flag};
