pub mod document;
pub mod time;

pub use document::{Element, TtmlDocument};
pub use time::{parse_time, try_parse_time};
