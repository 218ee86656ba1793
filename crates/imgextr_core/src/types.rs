use crate::error::{CoreError, Result};
use serde::Serialize;
use std::str::FromStr;

/// Images that can be carved. The catalogue is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub const ALL: [ImageKind; 2] = [Self::Jpeg, Self::Png];

    #[must_use]
    pub fn descriptor(self) -> &'static ImageTypeDescriptor {
        match self {
            Self::Jpeg => &JPEG,
            Self::Png => &PNG,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
        }
    }
}

impl FromStr for ImageKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JPEG" | "JPG" => Ok(Self::Jpeg),
            "PNG" => Ok(Self::Png),
            _ => Err(CoreError::UnknownImageType(s.to_string())),
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Header/trailer signatures and output extension of one image type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTypeDescriptor {
    kind: ImageKind,
    header: &'static [u8],
    trailer: &'static [u8],
    extension: &'static str,
    description: &'static str,
}

impl ImageTypeDescriptor {
    const fn new(
        kind: ImageKind,
        header: &'static [u8],
        trailer: &'static [u8],
        extension: &'static str,
        description: &'static str,
    ) -> Self {
        assert!(!header.is_empty(), "header signature must not be empty");
        assert!(!trailer.is_empty(), "trailer signature must not be empty");
        Self {
            kind,
            header,
            trailer,
            extension,
            description,
        }
    }

    /// Case-insensitive lookup by type name (`jpeg`, `png`).
    pub fn lookup(name: &str) -> Result<&'static Self> {
        name.parse::<ImageKind>().map(ImageKind::descriptor)
    }

    #[must_use]
    pub fn catalogue() -> [&'static Self; 2] {
        ImageKind::ALL.map(ImageKind::descriptor)
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ImageKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub const fn header(&self) -> &'static [u8] {
        self.header
    }

    #[inline]
    #[must_use]
    pub const fn trailer(&self) -> &'static [u8] {
        self.trailer
    }

    #[inline]
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        self.extension
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }
}

pub static JPEG: ImageTypeDescriptor = ImageTypeDescriptor::new(
    ImageKind::Jpeg,
    &[0xFF, 0xD8, 0xFF],
    &[0xFF, 0xD9],
    "jpeg",
    "Joint Photographic Experts Group file, including standard JPEG/JFIF, JPG/EXIF and JPG/SPIFF",
);

pub static PNG: ImageTypeDescriptor = ImageTypeDescriptor::new(
    ImageKind::Png,
    &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
    &[0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82],
    "png",
    "Portable Network Graphics file",
);
