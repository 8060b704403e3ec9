//! TTML to WebVTT conversion.
//!
//! This is the pure part of the tool: a document string goes in, a VTT
//! string comes out. It performs no I/O and holds no state between calls.

use crate::error::Result;
use crate::subtitle::{extract_cues, Cue, ExtractOptions, SubtitleFormatter, VttFormatter};
use crate::ttml::TtmlDocument;

/// Parse a TTML document and extract its cues.
pub fn ttml_to_cues(ttml: &str, options: ExtractOptions) -> Result<Vec<Cue>> {
    let doc = TtmlDocument::parse(ttml)?;
    extract_cues(&doc, options)
}

/// Convert a TTML document to WebVTT with default options.
pub fn ttml_to_vtt(ttml: &str) -> Result<String> {
    ttml_to_vtt_with_options(ttml, ExtractOptions::default())
}

/// Convert a TTML document to WebVTT.
///
/// Fails with `Parse` for malformed markup and `Structure` when the
/// `tt/body/div/p` path is missing. No output is produced on failure.
pub fn ttml_to_vtt_with_options(ttml: &str, options: ExtractOptions) -> Result<String> {
    let cues = ttml_to_cues(ttml, options)?;
    Ok(VttFormatter.format(&cues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PodvttError;

    #[test]
    fn test_end_to_end_single_paragraph() {
        let ttml = r#"<?xml version="1.0" encoding="UTF-8"?>
<tt xmlns="http://www.w3.org/ns/ttml"><body><div>
<p begin="0:00:01.000" end="0:00:03.000"><span><span>Hi</span><span>there</span></span></p>
</div></body></tt>"#;

        assert_eq!(
            ttml_to_vtt(ttml).unwrap(),
            "WEBVTT\n\n1\n00:00:01.000 --> 00:00:03.000\nHi there\n"
        );
    }

    #[test]
    fn test_malformed_input_is_parse_error() {
        assert!(matches!(
            ttml_to_vtt("<tt><body><div><p></div></body></tt>"),
            Err(PodvttError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_container_is_structure_error() {
        assert!(matches!(
            ttml_to_vtt("<tt><body/></tt>"),
            Err(PodvttError::Structure(_))
        ));
    }
}
