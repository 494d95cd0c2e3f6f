use super::ReadAt;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::Path;

/// Archive saved on the local filesystem.
pub struct LocalFileReader {
    file: std::fs::File,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if offset.saturating_add(buf.len() as u64) > self.size {
            bail!(
                "Read of {} bytes at offset {} is past the end ({} bytes)",
                buf.len(),
                offset,
                self.size
            );
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_exact_at(buf, offset)?;
        }

        #[cfg(windows)]
        {
            use std::os::windows::fs::FileExt;
            let mut filled = 0;
            while filled < buf.len() {
                let n = self.file.seek_read(&mut buf[filled..], offset + filled as u64)?;
                if n == 0 {
                    bail!("Unexpected end of file");
                }
                filled += n;
            }
        }

        #[cfg(not(any(unix, windows)))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(buf)?;
        }

        Ok(buf.len())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_file_ranges() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("data.bin");
        std::fs::write(&path, b"hello archive").unwrap();

        let reader = LocalFileReader::new(&path).unwrap();
        assert_eq!(reader.size(), 13);

        let mut buf = [0u8; 7];
        reader.read_at(6, &mut buf).await.unwrap();
        assert_eq!(&buf, b"archive");
        assert!(reader.read_at(7, &mut buf).await.is_err());
    }

    #[test]
    fn missing_file_errors() {
        assert!(LocalFileReader::new(Path::new("/nonexistent/archive.zip")).is_err());
    }
}
