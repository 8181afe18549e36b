//! Entry → CSV row conversion

use crate::walker::EntryDescriptor;
use chrono::{DateTime, Utc};

/// Column names, in row order
pub const HEADER: [&str; 12] = [
    "Depth",
    "Mode",
    "Path",
    "Owner",
    "Group",
    "Last Access",
    "Last Modified",
    "Size",
    "Rounded Size",
    "Usage",
    "Rounded Usage",
    "File and Directory Count",
];

/// Binary units up to ZiB; anything larger is shown in YiB
const SIZE_UNITS: [&str; 8] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB"];

/// Human-readable size with one decimal, e.g. `1.5 KiB`
pub fn format_size(bytes: f64) -> String {
    let mut size = bytes;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{:3.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} YiB", size)
}

/// `YYYY-MM-DD HH:MM:SS[.ffffff]` in UTC
///
/// Sub-second digits are truncated to microseconds with trailing zeros
/// removed; the fraction is left out entirely when it is zero.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    let mut out = t.format("%Y-%m-%d %H:%M:%S").to_string();
    let micros = t.timestamp_subsec_micros() % 1_000_000;
    if micros > 0 {
        let frac = format!("{:06}", micros);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}

/// Render one entry as the twelve CSV fields
pub fn to_row(entry: &EntryDescriptor) -> Vec<String> {
    let status = entry.status();
    let summary = entry.summary();

    vec![
        entry.depth().to_string(),
        status.mode_string(),
        entry.path().to_string(),
        status.owner.clone(),
        status.group.clone(),
        format_timestamp(&status.access_time),
        format_timestamp(&status.modification_time),
        summary.length.to_string(),
        format_size(summary.length as f64),
        summary.space_consumed.to_string(),
        format_size(summary.space_consumed as f64),
        summary.entry_count().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdfs::{ContentSummary, EntryType, FileStatus, Permissions};
    use chrono::{NaiveDateTime, TimeZone};

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0.0), "0.0 B");
        assert_eq!(format_size(1023.0), "1023.0 B");
        assert_eq!(format_size(1024.0), "1.0 KiB");
        assert_eq!(format_size(1536.0), "1.5 KiB");
        assert_eq!(format_size(3.0 * 1024.0 * 1024.0 * 1024.0), "3.0 GiB");
        assert_eq!(format_size(1024f64.powi(8)), "1.0 YiB");
        assert_eq!(format_size(2048.0 * 1024f64.powi(8)), "2048.0 YiB");
    }

    #[test]
    fn test_format_timestamp() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&t), "2024-01-02 03:04:05");

        let t = t + chrono::Duration::milliseconds(120);
        assert_eq!(format_timestamp(&t), "2024-01-02 03:04:05.12");

        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::nanoseconds(1_234_567);
        assert_eq!(format_timestamp(&t), "2024-01-02 03:04:05.001234");
    }

    #[test]
    fn test_row_fields_reparse() {
        let mtime = Utc.with_ymd_and_hms(2023, 6, 30, 23, 59, 58).unwrap()
            + chrono::Duration::milliseconds(250);
        let atime = Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap();
        let status = FileStatus {
            name: "logs".into(),
            entry_type: EntryType::Directory,
            permissions: Permissions(0o1777),
            owner: "alice".into(),
            group: "analysts".into(),
            length: 0,
            replication: 0,
            access_time: atime,
            modification_time: mtime,
        };
        let summary = ContentSummary {
            length: 1536,
            space_consumed: 4608,
            directory_count: 2,
            file_count: 5,
        };
        let entry = EntryDescriptor::new("/tmp/logs".into(), 1, status, summary);

        let row = to_row(&entry);
        assert_eq!(row.len(), HEADER.len());
        assert_eq!(row[0].parse::<usize>().unwrap(), 1);
        assert_eq!(row[1], "drwxrwxrwx");
        assert_eq!(row[2], "/tmp/logs");
        assert_eq!(row[3], "alice");
        assert_eq!(row[4], "analysts");

        let parse = |s: &str| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .unwrap()
                .and_utc()
        };
        assert_eq!(parse(&row[5]), atime);
        assert_eq!(parse(&row[6]), mtime);

        assert_eq!(row[7].parse::<u64>().unwrap(), 1536);
        assert_eq!(row[8], "1.5 KiB");
        assert_eq!(row[9].parse::<u64>().unwrap(), 4608);
        assert_eq!(row[10], "4.5 KiB");
        assert_eq!(row[11].parse::<u64>().unwrap(), 7);
    }
}
