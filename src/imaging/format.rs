use clap::ValueEnum;

/// Extension used when neither the output nor the source format is recognized.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Target encoding for converted images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
    Avif,
}

impl OutputFormat {
    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Avif => "image/avif",
        }
    }

    pub fn extension(self) -> &'static str {
        pick_ext_from_mime(self.mime()).unwrap_or(DEFAULT_EXTENSION)
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match pick_ext_from_mime(mime)? {
            "jpg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::Webp),
            "avif" => Some(OutputFormat::Avif),
            _ => None,
        }
    }
}

/// Map a MIME type to a file extension by substring, so `image/jpeg`,
/// `jpeg` and `image/x-jpeg` all resolve to `jpg`.
pub fn pick_ext_from_mime(mime: &str) -> Option<&'static str> {
    if mime.is_empty() {
        return None;
    }
    if mime.contains("jpeg") {
        Some("jpg")
    } else if mime.contains("png") {
        Some("png")
    } else if mime.contains("webp") {
        Some("webp")
    } else if mime.contains("avif") {
        Some("avif")
    } else {
        None
    }
}

/// Extension for an archive entry: the output format's, else the source's, else `jpg`.
pub fn entry_extension(format_mime: &str, source_mime: Option<&str>) -> &'static str {
    pick_ext_from_mime(format_mime)
        .or_else(|| source_mime.and_then(pick_ext_from_mime))
        .unwrap_or(DEFAULT_EXTENSION)
}
