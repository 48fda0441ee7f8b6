//! Placeholder labels: `"<slide>:<tag>"`.
//!
//! The slide part is a 1-based slide number or `*` for every slide. The tag
//! is everything after the first colon, taken verbatim, so tags may contain
//! colons and spaces of their own.

use crate::template::error::{Result, TemplateError};
use std::fmt;
use std::str::FromStr;

/// Which slides a label searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideSelector {
    /// `*`: every slide, in presentation order
    All,
    /// A 1-based slide number. Kept signed so that `0` and negative
    /// numbers parse and are rejected when resolved against a deck.
    Number(i64),
}

impl SlideSelector {
    /// Parse the part of a label before the colon.
    ///
    /// Surrounding whitespace around a number is accepted.
    pub fn parse(s: &str) -> Result<Self> {
        if s == "*" {
            return Ok(Self::All);
        }
        s.trim()
            .parse::<i64>()
            .map(Self::Number)
            .map_err(|_| TemplateError::InvalidSelector(s.to_string()))
    }

    /// 0-based slide indices selected in a deck of `slide_count` slides.
    pub fn indices(&self, slide_count: usize) -> Result<std::ops::Range<usize>> {
        match *self {
            Self::All => Ok(0..slide_count),
            Self::Number(number) => {
                let index = usize::try_from(number)
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .filter(|&i| i < slide_count)
                    .ok_or(TemplateError::SlideIndex {
                        number,
                        slide_count,
                    })?;
                Ok(index..index + 1)
            },
        }
    }
}

impl fmt::Display for SlideSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A parsed placeholder label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    selector: SlideSelector,
    tag: String,
}

impl Label {
    /// Parse a label of the form `"<slide>:<tag>"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pptx_blueprint::template::{Label, SlideSelector};
    ///
    /// let label = Label::parse("*:logo").unwrap();
    /// assert_eq!(label.selector(), SlideSelector::All);
    /// assert_eq!(label.placeholder_text(), "{logo}");
    /// ```
    pub fn parse(label: &str) -> Result<Self> {
        let (selector, tag) = label.split_once(':').ok_or_else(|| {
            TemplateError::MalformedLabel {
                label: label.to_string(),
                reason: "expected '<slide>:<tag>'",
            }
        })?;
        if tag.is_empty() {
            return Err(TemplateError::MalformedLabel {
                label: label.to_string(),
                reason: "tag is empty",
            });
        }
        Ok(Self {
            selector: SlideSelector::parse(selector)?,
            tag: tag.to_string(),
        })
    }

    #[inline]
    pub fn selector(&self) -> SlideSelector {
        self.selector
    }

    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Shape text that marks a placeholder for this label.
    pub fn placeholder_text(&self) -> String {
        format!("{{{}}}", self.tag)
    }
}

impl FromStr for Label {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.selector, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_and_wildcard() {
        let label = Label::parse("2:name").unwrap();
        assert_eq!(label.selector(), SlideSelector::Number(2));
        assert_eq!(label.tag(), "name");

        let label = Label::parse("*:logo").unwrap();
        assert_eq!(label.selector(), SlideSelector::All);
        assert_eq!(label.to_string(), "*:logo");
    }

    #[test]
    fn test_tag_is_verbatim_after_first_colon() {
        let label: Label = "1: a:b ".parse().unwrap();
        assert_eq!(label.tag(), " a:b ");
        assert_eq!(label.placeholder_text(), "{ a:b }");
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            Label::parse("title"),
            Err(TemplateError::MalformedLabel { .. })
        ));
        assert!(matches!(
            Label::parse("1:"),
            Err(TemplateError::MalformedLabel { .. })
        ));
        assert!(matches!(
            Label::parse(""),
            Err(TemplateError::MalformedLabel { .. })
        ));
    }

    #[test]
    fn test_invalid_selector() {
        for label in ["x:title", ":title", "1.5:title", "**:title", "99999999999999999999:t"] {
            assert!(
                matches!(Label::parse(label), Err(TemplateError::InvalidSelector(_))),
                "{label}"
            );
        }
    }

    #[test]
    fn test_zero_and_negative_parse() {
        assert_eq!(
            Label::parse("0:t").unwrap().selector(),
            SlideSelector::Number(0)
        );
        assert_eq!(
            Label::parse(" -3 :t").unwrap().selector(),
            SlideSelector::Number(-3)
        );
    }

    #[test]
    fn test_indices() {
        assert_eq!(SlideSelector::All.indices(3).unwrap(), 0..3);
        assert_eq!(SlideSelector::Number(3).indices(3).unwrap(), 2..3);

        for number in [0, -1, 4, i64::MIN] {
            match SlideSelector::Number(number).indices(3) {
                Err(TemplateError::SlideIndex {
                    number: n,
                    slide_count: 3,
                }) => assert_eq!(n, number),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_number_labels_round_trip(n in any::<i64>(), tag in ".+") {
                let label = Label::parse(&format!("{}:{}", n, tag)).unwrap();
                prop_assert_eq!(label.selector(), SlideSelector::Number(n));
                prop_assert_eq!(label.tag(), tag.as_str());
            }

            #[test]
            fn prop_no_colon_is_malformed(s in "[^:]*") {
                let is_malformed = matches!(
                    Label::parse(&s),
                    Err(TemplateError::MalformedLabel { .. })
                );
                prop_assert!(is_malformed);
            }

            #[test]
            fn prop_in_range_numbers_select_one_slide(count in 1usize..50, pick in 0usize..50) {
                let n = (pick % count) + 1;
                let range = SlideSelector::Number(n as i64).indices(count).unwrap();
                prop_assert_eq!(range, (n - 1)..n);
            }
        }
    }
}
