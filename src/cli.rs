use clap::Parser;
use std::path::PathBuf;

use crate::batch::{BatchOptions, DEFAULT_CONCURRENCY};
use crate::imaging::{MAX_CANVAS_SIDE, OutputFormat, Quality, RenderParams};

#[derive(Parser, Debug)]
#[command(name = "cropzip")]
#[command(version)]
#[command(about = "Square-crop a batch of images and pack them into a ZIP archive", long_about = None)]
#[command(after_help = "Examples:\n  \
  cropzip *.jpg                          1500x1500 JPEGs at quality 0.8\n  \
  cropzip -f webp -W 800 -H 800 shots/*  800x800 WebPs\n  \
  cropzip -d out -v photos/*.png         write into out/ and list the result\n  \
  cropzip --list-archive batch.zip       list and test an existing archive")]
pub struct Cli {
    /// Images to convert (non-image files are skipped)
    #[arg(value_name = "IMAGES", required_unless_present = "list_archive")]
    pub inputs: Vec<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Jpeg)]
    pub format: OutputFormat,

    /// Encoding quality for JPEG and AVIF, 0.1 to 1.0
    #[arg(short = 'Q', long, default_value_t = 0.8, value_parser = parse_quality)]
    pub quality: f32,

    /// Canvas width in pixels, at most 16384
    #[arg(short = 'W', long, default_value_t = 1500, value_parser = clap::value_parser!(u32).range(1..=MAX_CANVAS_SIDE as i64))]
    pub width: u32,

    /// Canvas height in pixels, at most 16384
    #[arg(short = 'H', long, default_value_t = 1500, value_parser = clap::value_parser!(u32).range(1..=MAX_CANVAS_SIDE as i64))]
    pub height: u32,

    /// Images converted at the same time
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u32, value_parser = clap::value_parser!(u32).range(1..=64))]
    pub concurrency: u32,

    /// Write the archive into DIR
    #[arg(short = 'd', value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// List the archive contents (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List the archive contents verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Test the archive after writing it
    #[arg(short = 't')]
    pub test: bool,

    /// List and test an existing archive instead of converting images
    #[arg(long, value_name = "ZIP", conflicts_with = "inputs")]
    pub list_archive: Option<PathBuf>,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

fn parse_quality(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if !(Quality::MIN..=Quality::MAX).contains(&value) {
        return Err(format!(
            "quality must be between {} and {}",
            Quality::MIN,
            Quality::MAX
        ));
    }
    Ok(value)
}

impl Cli {
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            render: RenderParams {
                format: self.format,
                quality: Quality::new(self.quality),
                width: self.width,
                height: self.height,
            },
            concurrency: self.concurrency as usize,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["cropzip", "a.jpg", "b.png"]).unwrap();
        assert_eq!(cli.inputs.len(), 2);

        let options = cli.batch_options();
        assert_eq!(options.concurrency, 3);
        assert_eq!(options.render, RenderParams::default());
        assert_eq!(cli.output_dir, PathBuf::from("."));
    }

    #[test]
    fn parses_settings() {
        let cli = Cli::try_parse_from([
            "cropzip", "-f", "avif", "-Q", "0.5", "-W", "640", "-H", "480", "-c", "8", "-qq",
            "x.jpg",
        ])
        .unwrap();
        let options = cli.batch_options();
        assert_eq!(options.render.format, OutputFormat::Avif);
        assert_eq!(options.render.quality.value(), 0.5);
        assert_eq!((options.render.width, options.render.height), (640, 480));
        assert_eq!(options.concurrency, 8);
        assert!(cli.is_very_quiet());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Cli::try_parse_from(["cropzip", "-Q", "1.5", "a.jpg"]).is_err());
        assert!(Cli::try_parse_from(["cropzip", "-Q", "high", "a.jpg"]).is_err());
        assert!(Cli::try_parse_from(["cropzip", "-W", "0", "a.jpg"]).is_err());
        assert!(Cli::try_parse_from(["cropzip", "-W", "16385", "a.jpg"]).is_err());
        assert!(Cli::try_parse_from(["cropzip", "-H", "4294967295", "a.jpg"]).is_err());
        assert!(Cli::try_parse_from(["cropzip", "-W", "16384", "-H", "16384", "a.jpg"]).is_ok());
        assert!(Cli::try_parse_from(["cropzip", "-c", "0", "a.jpg"]).is_err());
        assert!(Cli::try_parse_from(["cropzip"]).is_err());
    }

    #[test]
    fn list_archive_needs_no_inputs() {
        let cli = Cli::try_parse_from(["cropzip", "--list-archive", "out.zip"]).unwrap();
        assert_eq!(cli.list_archive, Some(PathBuf::from("out.zip")));
        assert!(Cli::try_parse_from(["cropzip", "--list-archive", "out.zip", "a.jpg"]).is_err());
    }
}
