use chrono::NaiveDate;

/// Parse a DICOM DA value (`YYYYMMDD`) into a calendar date.
///
/// Returns `None` for anything that is not exactly eight ASCII digits
/// forming a valid date.
pub fn dicom_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
