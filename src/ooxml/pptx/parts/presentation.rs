/// Presentation part: the `ppt/presentation.xml` main document.
use crate::ooxml::error::Result;
use crate::ooxml::pptx::shapes::base::attr_string;
use quick_xml::Reader;
use quick_xml::events::Event;

/// The parts of `presentation.xml` the template filler needs.
#[derive(Debug, Clone, Default)]
pub struct PresentationPart {
    /// Relationship ids of the slides, in presentation order
    slide_r_ids: Vec<String>,
}

impl PresentationPart {
    /// Parse the presentation part.
    ///
    /// Slide order is the order of `p:sldIdLst/p:sldId`, which is not
    /// necessarily the order of the slide partnames.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut slide_r_ids = Vec::new();
        let mut in_list = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.local_name().as_ref() == b"sldIdLst" => in_list = true,
                Event::End(e) if e.local_name().as_ref() == b"sldIdLst" => in_list = false,
                Event::Empty(e) | Event::Start(e)
                    if in_list && e.local_name().as_ref() == b"sldId" =>
                {
                    // the plain `id` attribute is the slide id, `r:id` the relationship
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref().ends_with(b":id") {
                            slide_r_ids.push(attr_string(&attr, reader.decoder())?);
                        }
                    }
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(Self { slide_r_ids })
    }

    /// Relationship ids of the slides, in presentation order.
    #[inline]
    pub fn slide_r_ids(&self) -> &[String] {
        &self.slide_r_ids
    }

    /// Number of slides listed.
    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slide_r_ids.len()
    }
}
