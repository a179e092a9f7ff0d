use chrono::{DateTime, Datelike, NaiveDate, Timelike};

/// Expands an MS-DOS timestamp (2-second resolution, epoch 1980) into
/// Unix seconds. Out-of-range fields collapse to 0.
pub fn dos_to_unix_time(dos: u32) -> i64 {
    let year = ((dos >> 25) & 0x7F) as i32 + 1980;
    let month = (dos >> 21) & 0xF;
    let day = (dos >> 16) & 0x1F;
    let hour = (dos >> 11) & 0x1F;
    let minute = (dos >> 5) & 0x3F;
    let second = (dos & 0x1F) * 2;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

/// Packs Unix seconds into an MS-DOS timestamp, truncating to the
/// format's 2-second resolution.
pub fn unix_time_to_dos(timestamp: i64) -> u32 {
    let dt = DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default();

    let mut dos = 0u32;
    dos |= (dt.year().saturating_sub(1980) as u32) << 25;
    dos |= dt.month() << 21;
    dos |= dt.day() << 16;
    dos |= dt.hour() << 11;
    dos |= dt.minute() << 5;
    dos |= dt.second() / 2;
    dos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_truncates_to_two_seconds() {
        // a Tuesday in 2021, odd second
        let t = 1_619_524_499i64;
        assert_eq!(dos_to_unix_time(unix_time_to_dos(t)), (t / 2) * 2);

        // DOS epoch floor
        let t = 315_532_800i64;
        assert_eq!(dos_to_unix_time(unix_time_to_dos(t)), t);
    }

    #[test]
    fn known_timestamp_unpacks() {
        // 2021-04-27 11:24:58 UTC
        let dos = (41u32 << 25) | (4 << 21) | (27 << 16) | (11 << 11) | (24 << 5) | 29;
        let unix = dos_to_unix_time(dos);
        let dt = DateTime::from_timestamp(unix, 0).unwrap();
        assert_eq!(
            (dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute(), dt.second()),
            (2021, 4, 27, 11, 24, 58)
        );
    }
}
