use super::ReadAt;
use anyhow::{Result, bail};
use async_trait::async_trait;

/// Reader over an archive held in memory, such as the output of
/// [`ZipWriter::build`](crate::ZipWriter::build).
#[derive(Debug, Clone)]
pub struct MemoryReader {
    data: Vec<u8>,
}

impl MemoryReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

#[async_trait]
impl ReadAt for MemoryReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let start = offset as usize;
        let end = start.checked_add(buf.len());
        match end {
            Some(end) if offset <= self.size() && end <= self.data.len() => {
                buf.copy_from_slice(&self.data[start..end]);
                Ok(buf.len())
            }
            _ => bail!(
                "Read of {} bytes at offset {} is past the end ({} bytes)",
                buf.len(),
                offset,
                self.data.len()
            ),
        }
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
