//! MS-DOS packed date/time fields.
//!
//! ZIP headers store the modification time as two 16-bit words:
//!
//! ```text
//! time: hhhhhmmm mmmsssss   (hour, minute, seconds / 2)
//! date: yyyyyyym mmmddddd   (year - 1980, month, day)
//! ```
//!
//! Seconds have a two-second resolution and years outside 1980..=2107 cannot
//! be represented. Instants outside that window are clamped to its edges.

use chrono::{Datelike, Local, Timelike};

const MIN_YEAR: i32 = 1980;
const MAX_YEAR: i32 = 1980 + 0x7F;

/// Packed DOS timestamp as written to local and central headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    /// 1980-01-01 00:00:00, the earliest representable instant.
    pub const MIN: DosDateTime = DosDateTime {
        time: 0,
        date: (1 << 5) | 1,
    };

    /// 2107-12-31 23:59:58, the latest representable instant.
    pub const MAX: DosDateTime = DosDateTime {
        time: (23 << 11) | (59 << 5) | 29,
        date: (0x7F << 9) | (12 << 5) | 31,
    };

    /// Encode the current local wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Encode any calendar instant (naive or zoned) using its wall-clock fields.
    pub fn from_datetime<T: Datelike + Timelike>(dt: &T) -> Self {
        let year = dt.year();
        if year < MIN_YEAR {
            return Self::MIN;
        }
        if year > MAX_YEAR {
            return Self::MAX;
        }

        let time = (dt.hour() << 11) | (dt.minute() << 5) | (dt.second() / 2);
        let date = (((year - MIN_YEAR) as u32) << 9) | (dt.month() << 5) | dt.day();

        Self {
            time: time as u16,
            date: date as u16,
        }
    }

    /// Unpack the date word to (year, month, day).
    pub fn year_month_day(&self) -> (u16, u8, u8) {
        let day = (self.date & 0x1F) as u8;
        let month = ((self.date >> 5) & 0x0F) as u8;
        let year = ((self.date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Unpack the time word to (hour, minute, second).
    pub fn hour_minute_second(&self) -> (u8, u8, u8) {
        let second = ((self.time & 0x1F) * 2) as u8;
        let minute = ((self.time >> 5) & 0x3F) as u8;
        let hour = ((self.time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}
