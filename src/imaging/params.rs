use super::format::OutputFormat;

/// Lossy encoding quality as a factor in `[0.1, 1.0]`. Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    pub const MIN: f32 = 0.1;
    pub const MAX: f32 = 1.0;

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1–100 scale used by the JPEG and AVIF encoders.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.8)
    }
}

/// Everything needed to turn one source image into one archive entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub format: OutputFormat,
    pub quality: Quality,
    /// Canvas dimensions in pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: Quality::default(),
            width: 1500,
            height: 1500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0.0).value(), 0.1);
        assert_eq!(Quality::new(0.5).value(), 0.5);
        assert_eq!(Quality::new(3.0).value(), 1.0);
        assert_eq!(Quality::new(f32::NAN), Quality::default());
    }

    #[test]
    fn quality_percent() {
        assert_eq!(Quality::default().percent(), 80);
        assert_eq!(Quality::new(0.1).percent(), 10);
        assert_eq!(Quality::new(1.0).percent(), 100);
    }

    #[test]
    fn render_defaults() {
        let params = RenderParams::default();
        assert_eq!((params.width, params.height), (1500, 1500));
        assert_eq!(params.format, OutputFormat::Jpeg);
    }
}
