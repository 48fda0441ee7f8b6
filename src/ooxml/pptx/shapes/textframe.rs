/// Text frame reading and rewriting.
///
/// A text frame is the `p:txBody` element of an auto shape: body
/// properties, an optional list style, then one `a:p` per paragraph, each
/// holding runs (`a:r`), line breaks (`a:br`) and fields (`a:fld`).
use super::base::skip_subtree;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xml::escape_xml;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Text frame view over the XML of a single shape.
pub struct TextFrame<'a> {
    xml: &'a str,
}

impl<'a> TextFrame<'a> {
    /// Wrap the XML of one `p:sp` element.
    pub fn new(shape_xml: &'a str) -> Self {
        Self { xml: shape_xml }
    }

    /// Plain text of the frame, or `None` when the shape has no `p:txBody`.
    ///
    /// Runs within a paragraph are concatenated, line breaks become `'\n'`
    /// and paragraphs are joined with `'\n'`.
    pub fn text(&self) -> Result<Option<String>> {
        let mut reader = Reader::from_str(self.xml);
        let mut paragraphs: Vec<String> = Vec::new();
        let mut found = false;
        let mut in_body = false;
        let mut in_text = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"txBody" if !found => {
                        found = true;
                        in_body = true;
                    },
                    b"p" if in_body => paragraphs.push(String::new()),
                    b"t" if in_body => in_text = true,
                    _ => {},
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"txBody" if !found => found = true,
                    b"p" if in_body => paragraphs.push(String::new()),
                    b"br" if in_body => {
                        if let Some(p) = paragraphs.last_mut() {
                            p.push('\n');
                        }
                    },
                    _ => {},
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"txBody" if in_body => break,
                    _ => {},
                },
                Event::Text(e) if in_text => {
                    let s = std::str::from_utf8(&e)
                        .map_err(|err| OoxmlError::Xml(err.to_string()))?;
                    if let Some(p) = paragraphs.last_mut() {
                        p.push_str(s);
                    }
                },
                Event::CData(e) if in_text => {
                    let s = std::str::from_utf8(&e)
                        .map_err(|err| OoxmlError::Xml(err.to_string()))?;
                    if let Some(p) = paragraphs.last_mut() {
                        p.push_str(s);
                    }
                },
                Event::GeneralRef(e) if in_text => {
                    let name = std::str::from_utf8(&e)
                        .map_err(|err| OoxmlError::Xml(err.to_string()))?;
                    let c = resolve_entity(name).ok_or_else(|| {
                        OoxmlError::Xml(format!("unknown entity reference &{};", name))
                    })?;
                    if let Some(p) = paragraphs.last_mut() {
                        p.push(c);
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        if !found {
            return Ok(None);
        }
        Ok(Some(paragraphs.join("\n")))
    }

    /// Return the shape XML with its text replaced by `text`.
    ///
    /// Body properties and list style are kept. Each line of `text` becomes
    /// a paragraph carrying the first paragraph's `a:pPr`, and its run
    /// carries the first run's `a:rPr`, so the placeholder's formatting
    /// survives. A shape without a text frame gets a new one.
    pub fn replace_text(&self, text: &str) -> Result<String> {
        let layout = self.layout()?;
        let paragraphs = build_paragraphs(text, &layout);

        let mut out = String::with_capacity(self.xml.len() + paragraphs.len());
        match layout.body {
            Some(body) => {
                let head_end = body.first_paragraph.unwrap_or(body.close);
                out.push_str(&self.xml[..head_end]);
                out.push_str(&paragraphs);
                out.push_str(&self.xml[body.close..]);
            },
            None => {
                let close = self.xml.rfind("</").ok_or_else(|| {
                    OoxmlError::InvalidFormat("shape element has no end tag".to_string())
                })?;
                out.push_str(&self.xml[..close]);
                out.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
                out.push_str(&paragraphs);
                out.push_str("</p:txBody>");
                out.push_str(&self.xml[close..]);
            },
        }
        Ok(out)
    }

    /// Locate the pieces of the text body needed for a rewrite.
    fn layout(&self) -> Result<FrameLayout<'a>> {
        let xml = self.xml;
        let mut reader = Reader::from_str(xml);
        let mut layout = FrameLayout::default();
        let mut first_paragraph = None;
        let mut in_body = false;
        let mut paragraph_count = 0usize;
        let mut in_first = false;

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let after = reader.buffer_position() as usize;
            match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"txBody" if !in_body && layout.body.is_none() => in_body = true,
                    b"p" if in_body => {
                        paragraph_count += 1;
                        in_first = paragraph_count == 1;
                        first_paragraph.get_or_insert(before);
                    },
                    name if in_first => {
                        let slot = match name {
                            b"pPr" => &mut layout.paragraph_props,
                            b"rPr" => &mut layout.run_props,
                            b"endParaRPr" => &mut layout.end_props,
                            _ => continue,
                        };
                        let end = skip_subtree(&mut reader)?;
                        if slot.is_none() {
                            *slot = Some(&xml[before..end]);
                        }
                    },
                    _ => {},
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"p" if in_body => {
                        paragraph_count += 1;
                        first_paragraph.get_or_insert(before);
                    },
                    b"pPr" if in_first && layout.paragraph_props.is_none() => {
                        layout.paragraph_props = Some(&xml[before..after]);
                    },
                    b"rPr" if in_first && layout.run_props.is_none() => {
                        layout.run_props = Some(&xml[before..after]);
                    },
                    b"endParaRPr" if in_first && layout.end_props.is_none() => {
                        layout.end_props = Some(&xml[before..after]);
                    },
                    _ => {},
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"p" if in_body => in_first = false,
                    b"txBody" if in_body => {
                        layout.body = Some(BodySpan {
                            first_paragraph,
                            close: before,
                        });
                        break;
                    },
                    _ => {},
                },
                Event::Eof => break,
                _ => {},
            }
        }

        Ok(layout)
    }
}

#[derive(Default)]
struct FrameLayout<'a> {
    body: Option<BodySpan>,
    paragraph_props: Option<&'a str>,
    run_props: Option<&'a str>,
    end_props: Option<&'a str>,
}

struct BodySpan {
    /// Offset of the first `a:p`
    first_paragraph: Option<usize>,
    /// Offset of `</p:txBody>`
    close: usize,
}

fn build_paragraphs(text: &str, layout: &FrameLayout<'_>) -> String {
    let mut out = String::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        out.push_str("<a:p>");
        out.push_str(layout.paragraph_props.unwrap_or(""));
        if !line.is_empty() {
            out.push_str("<a:r>");
            out.push_str(layout.run_props.unwrap_or(""));
            out.push_str("<a:t>");
            out.push_str(&escape_xml(line));
            out.push_str("</a:t></a:r>");
        }
        out.push_str(layout.end_props.unwrap_or(""));
        out.push_str("</a:p>");
    }
    out
}

/// Resolve a predefined XML entity or a character reference (`#38`, `#x26`).
fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: &str = concat!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="4" name="TextBox 3"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
        r#"<p:spPr/><p:txBody><a:bodyPr wrap="none"/><a:lstStyle/>"#,
        r#"<a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" b="1"><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill></a:rPr><a:t>{a</a:t></a:r>"#,
        r#"<a:r><a:rPr lang="en-US"/><a:t>bc}</a:t></a:r></a:p>"#,
        r#"<a:p><a:r><a:t>second &amp; line</a:t></a:r></a:p>"#,
        r#"</p:txBody></p:sp>"#
    );

    #[test]
    fn test_text_joins_runs_and_paragraphs() {
        let text = TextFrame::new(SHAPE).text().unwrap();
        assert_eq!(text.as_deref(), Some("{abc}\nsecond & line"));
    }

    #[test]
    fn test_text_without_body() {
        let xml = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Rect"/></p:nvSpPr><p:spPr/></p:sp>"#;
        assert_eq!(TextFrame::new(xml).text().unwrap(), None);
    }

    #[test]
    fn test_text_preserves_whitespace_and_breaks() {
        let xml = r#"<p:sp><p:txBody><a:bodyPr/><a:p><a:r><a:t> a </a:t></a:r><a:br/><a:r><a:t>b&#x41;</a:t></a:r></a:p><a:p/></p:txBody></p:sp>"#;
        assert_eq!(
            TextFrame::new(xml).text().unwrap().as_deref(),
            Some(" a \nbA\n")
        );
    }

    #[test]
    fn test_replace_keeps_formatting() {
        let replaced = TextFrame::new(SHAPE).replace_text("Q3 <results>").unwrap();

        assert!(replaced.contains(r#"<a:bodyPr wrap="none"/><a:lstStyle/>"#));
        assert!(replaced.contains(r#"<a:pPr algn="ctr"/>"#));
        assert!(replaced.contains(r#"<a:srgbClr val="FF0000"/>"#));
        assert!(replaced.contains("Q3 &lt;results&gt;"));
        assert!(!replaced.contains("second"));
        assert!(replaced.ends_with("</p:txBody></p:sp>"));

        let text = TextFrame::new(&replaced).text().unwrap();
        assert_eq!(text.as_deref(), Some("Q3 <results>"));
    }

    #[test]
    fn test_replace_multiline() {
        let replaced = TextFrame::new(SHAPE).replace_text("one\n\nthree").unwrap();
        assert_eq!(replaced.matches("<a:p>").count(), 3);
        let text = TextFrame::new(&replaced).text().unwrap();
        assert_eq!(text.as_deref(), Some("one\n\nthree"));
    }

    #[test]
    fn test_replace_adds_missing_body() {
        let xml = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Rect"/></p:nvSpPr><p:spPr/></p:sp>"#;
        let replaced = TextFrame::new(xml).replace_text("hello").unwrap();
        assert!(replaced.ends_with("</a:p></p:txBody></p:sp>"));
        assert_eq!(
            TextFrame::new(&replaced).text().unwrap().as_deref(),
            Some("hello")
        );
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("amp"), Some('&'));
        assert_eq!(resolve_entity("#38"), Some('&'));
        assert_eq!(resolve_entity("#x263A"), Some('\u{263A}'));
        assert_eq!(resolve_entity("nbsp"), None);
    }
}
