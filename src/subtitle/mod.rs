pub mod extract;
pub mod vtt;

pub use extract::{extract_cues, ExtractOptions};
pub use vtt::{format_timestamp, VttFormatter};

use std::time::Duration;

/// One timed caption unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// 1-based position in the output, without gaps.
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

pub trait SubtitleFormatter {
    fn format(&self, cues: &[Cue]) -> String;
    fn extension(&self) -> &'static str;
}
