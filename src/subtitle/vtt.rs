// WebVTT subtitle format
use super::{Cue, SubtitleFormatter};
use std::fmt::Write;
use std::time::Duration;

pub struct VttFormatter;

impl SubtitleFormatter for VttFormatter {
    /// Header line, then each cue preceded by a blank line:
    /// index, `start --> end`, text.
    fn format(&self, cues: &[Cue]) -> String {
        let mut output = String::from("WEBVTT\n");

        for cue in cues {
            let _ = write!(
                output,
                "\n{}\n{} --> {}\n{}\n",
                cue.index,
                format_timestamp(cue.start),
                format_timestamp(cue.end),
                cue.text
            );
        }

        output
    }

    fn extension(&self) -> &'static str {
        "vtt"
    }
}

/// Render a duration as `HH:MM:SS.mmm`. Hours widen past two digits.
pub fn format_timestamp(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = d.subsec_millis();
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
