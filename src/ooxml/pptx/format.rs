//! Image formats that can be embedded in a slide.

use crate::ooxml::opc::constants::content_type;
use std::fmt;

/// Raster formats PowerPoint renders from a `p:pic` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Content type registered for media parts of this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => content_type::PNG,
            Self::Jpeg => content_type::JPEG,
            Self::Gif => content_type::GIF,
            Self::Bmp => content_type::BMP,
            Self::Tiff => content_type::TIFF,
        }
    }

    /// Extension used for media partnames.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Sniff the format from the leading bytes of an image.
    ///
    /// File extensions are never consulted: a mislabeled file is still
    /// embedded under its real format.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        const SIGNATURES: &[(&[u8], ImageFormat)] = &[
            (&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A], ImageFormat::Png),
            (&[0xFF, 0xD8, 0xFF], ImageFormat::Jpeg),
            (b"GIF87a", ImageFormat::Gif),
            (b"GIF89a", ImageFormat::Gif),
            (b"II*\0", ImageFormat::Tiff),
            (b"MM\0*", ImageFormat::Tiff),
        ];

        if let Some((_, format)) = SIGNATURES.iter().find(|(sig, _)| bytes.starts_with(sig)) {
            return Some(*format);
        }

        // BM followed by the file size; require a full file header.
        if bytes.len() >= 14 && bytes.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        None
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
