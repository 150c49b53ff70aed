use std::fmt;
use std::rc::Rc;

/// An encoded raster image. In the browser this is a PNG data URL.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage(Rc<str>);

impl EncodedImage {
    pub fn new(encoded: impl Into<Rc<str>>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for EncodedImage {
    // Data URLs run to hundreds of kilobytes; keep log lines readable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedImage({} bytes)", self.0.len())
    }
}

/// Full surface content at one point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Snapshot {
    Blank,
    Encoded(EncodedImage),
}

impl Snapshot {
    pub fn encoded(encoded: impl Into<Rc<str>>) -> Self {
        Snapshot::Encoded(EncodedImage::new(encoded))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Snapshot::Blank)
    }

    /// The image to hand to a decoder, if there is anything to decode.
    pub fn image(&self) -> Option<&EncodedImage> {
        match self {
            Snapshot::Encoded(image) if !image.is_empty() => Some(image),
            _ => None,
        }
    }
}
