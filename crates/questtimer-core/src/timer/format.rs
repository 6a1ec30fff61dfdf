/// Render milliseconds as `MM:SS`.
///
/// There is no hour component: past 99 minutes the minute field just keeps
/// growing.
pub fn format_time(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(5_000), "00:05");
        assert_eq!(format_time(25 * 60_000), "25:00");
        assert_eq!(format_time(61_999), "01:01");
    }

    #[test]
    fn minutes_do_not_wrap() {
        assert_eq!(format_time(125 * 60_000 + 7_000), "125:07");
    }
}
