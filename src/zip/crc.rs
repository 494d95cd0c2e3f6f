//! CRC-32 checksum used by ZIP headers.
//!
//! This is the reflected CRC-32 (polynomial `0xEDB88320`, initial value and
//! final XOR of `0xFFFFFFFF`), the same checksum produced by `cksum -o 3`,
//! zlib's `crc32()` and every conforming ZIP tool.

/// Reflected CRC-32 polynomial.
const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Byte-wise lookup table, computed at compile time.
static CRC_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut bit = 0;
        while bit < 8 {
            c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
            bit += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

/// Incremental CRC-32 hasher.
///
/// Feeding the same bytes in any number of [`update`](Crc32::update) calls
/// yields the same value as a single call to [`crc32`].
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        let mut c = self.state;
        for &byte in data {
            c = (c >> 8) ^ CRC_TABLE[((c ^ byte as u32) & 0xFF) as usize];
        }
        self.state = c;
        self
    }

    pub fn finalize(&self) -> u32 {
        self.state ^ 0xFFFF_FFFF
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the CRC-32 of a byte buffer.
pub fn crc32(data: &[u8]) -> u32 {
    Crc32::new().update(data).finalize()
}
