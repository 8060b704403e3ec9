use super::Cue;
use crate::error::{PodvttError, Result};
use crate::ttml::{parse_time, Element, TtmlDocument};
use tracing::{debug, warn};

/// Options for turning caption paragraphs into cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Emit a cue even when its paragraph holds no words.
    pub keep_empty: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { keep_empty: true }
    }
}

/// Extract one cue per `<p>` under `tt/body/div`, in document order.
pub fn extract_cues(doc: &TtmlDocument, options: ExtractOptions) -> Result<Vec<Cue>> {
    let paragraphs = caption_paragraphs(doc)?;
    let mut cues = Vec::with_capacity(paragraphs.len());

    for p in paragraphs {
        let start = parse_time(p.attribute("begin"));
        let mut end = parse_time(p.attribute("end"));
        if end < start {
            warn!(
                "Paragraph ends before it begins ({:?} < {:?}), clamping end to start",
                end, start
            );
            end = start;
        }

        let text = paragraph_text(p);
        if text.is_empty() && !options.keep_empty {
            debug!("Dropping paragraph without words at {:?}", start);
            continue;
        }

        cues.push(Cue {
            index: cues.len() + 1,
            start,
            end,
            text,
        });
    }

    Ok(cues)
}

/// The `<p>` elements of the first `<div>` of the first `<body>`.
fn caption_paragraphs(doc: &TtmlDocument) -> Result<Vec<&Element>> {
    let root = doc.root();
    if root.name() != "tt" {
        return Err(PodvttError::Structure(format!(
            "root element is <{}>, expected <tt>",
            root.name()
        )));
    }

    let body = root
        .child("body")
        .ok_or_else(|| PodvttError::Structure("missing <body>".to_string()))?;
    let div = body
        .child("div")
        .ok_or_else(|| PodvttError::Structure("missing <div> in <body>".to_string()))?;

    let paragraphs: Vec<&Element> = div.children_named("p").collect();
    if paragraphs.is_empty() {
        return Err(PodvttError::Structure(
            "no <p> paragraphs in the first <div>".to_string(),
        ));
    }

    Ok(paragraphs)
}

/// Words are the `span`s nested inside sentence `span`s; text directly in a
/// sentence span, or in the paragraph itself, is not part of the cue.
fn paragraph_text(p: &Element) -> String {
    p.children_named("span")
        .flat_map(|sentence| sentence.children_named("span"))
        .map(|word| word.text().trim())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn doc(body: &str) -> TtmlDocument {
        TtmlDocument::parse(&format!(
            r#"<tt xmlns="http://www.w3.org/ns/ttml"><body>{}</body></tt>"#,
            body
        ))
        .unwrap()
    }

    #[test]
    fn test_words_across_sentences_are_space_joined() {
        let doc = doc(
            r#"<div><p begin="0:01" end="0:02">
                <span><span>Hello</span></span>
                <span><span>world</span></span>
            </p></div>"#,
        );

        let cues = extract_cues(&doc, ExtractOptions::default()).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Hello world");
        assert_eq!(cues[0].start, Duration::from_secs(1));
        assert_eq!(cues[0].end, Duration::from_secs(2));
    }

    #[test]
    fn test_sentence_level_text_is_ignored() {
        let doc = doc(r#"<div><p><span>loose <span>kept</span></span>stray</p></div>"#);
        let cues = extract_cues(&doc, ExtractOptions::default()).unwrap();
        assert_eq!(cues[0].text, "kept");
    }

    #[test]
    fn test_indices_are_sequential() {
        let doc = doc(
            r#"<div>
                <p begin="1" end="2"><span><span>a</span></span></p>
                <p begin="2" end="3"><span><span>b</span></span></p>
                <p begin="3" end="4"><span><span>c</span></span></p>
            </div>"#,
        );

        let cues = extract_cues(&doc, ExtractOptions::default()).unwrap();
        let indices: Vec<usize> = cues.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(cues[2].text, "c");
    }

    #[test]
    fn test_missing_times_are_zero() {
        let doc = doc(r#"<div><p><span><span>x</span></span></p></div>"#);
        let cues = extract_cues(&doc, ExtractOptions::default()).unwrap();
        assert_eq!(cues[0].start, Duration::ZERO);
        assert_eq!(cues[0].end, Duration::ZERO);
    }

    #[test]
    fn test_end_before_start_is_clamped() {
        let doc = doc(r#"<div><p begin="5" end="2"><span><span>x</span></span></p></div>"#);
        let cues = extract_cues(&doc, ExtractOptions::default()).unwrap();
        assert_eq!(cues[0].start, Duration::from_secs(5));
        assert_eq!(cues[0].end, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_paragraph_kept_by_default() {
        let doc = doc(
            r#"<div><p begin="1" end="2"/><p begin="2" end="3"><span><span>b</span></span></p></div>"#,
        );

        let cues = extract_cues(&doc, ExtractOptions::default()).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "");
        assert_eq!(cues[1].index, 2);
    }

    #[test]
    fn test_empty_paragraph_dropped_without_gaps() {
        let doc = doc(
            r#"<div>
                <p begin="1" end="2"><span><span>a</span></span></p>
                <p begin="2" end="3"><span></span></p>
                <p begin="3" end="4"><span><span>c</span></span></p>
            </div>"#,
        );

        let cues = extract_cues(&doc, ExtractOptions { keep_empty: false }).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].index, 2);
        assert_eq!(cues[1].text, "c");
    }

    #[test]
    fn test_only_first_div_is_used() {
        let doc = doc(
            r#"<div><p><span><span>first</span></span></p></div>
               <div><p><span><span>second</span></span></p></div>"#,
        );
        let cues = extract_cues(&doc, ExtractOptions::default()).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "first");
    }

    #[test]
    fn test_structure_errors() {
        let no_div = doc("");
        assert!(matches!(
            extract_cues(&no_div, ExtractOptions::default()),
            Err(PodvttError::Structure(_))
        ));

        let no_p = doc("<div></div>");
        assert!(matches!(
            extract_cues(&no_p, ExtractOptions::default()),
            Err(PodvttError::Structure(_))
        ));

        let wrong_root = TtmlDocument::parse("<html><body><div><p/></div></body></html>").unwrap();
        assert!(matches!(
            extract_cues(&wrong_root, ExtractOptions::default()),
            Err(PodvttError::Structure(_))
        ));

        let no_body = TtmlDocument::parse("<tt><head/></tt>").unwrap();
        assert!(matches!(
            extract_cues(&no_body, ExtractOptions::default()),
            Err(PodvttError::Structure(_))
        ));
    }
}
