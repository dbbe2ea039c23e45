use chrono::NaiveDate;

/// 解析遗留日期 `DD/MM/YYYY`（年份必须为 4 位）。无法解析时返回 `None`。
pub fn parse_legacy_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let year = value.rsplit('/').next()?;
    if value.matches('/').count() != 2 || year.len() != 4 {
        return None;
    }
    if !year.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%d/%m/%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_month_year() {
        assert_eq!(
            parse_legacy_date("03/11/2019"),
            NaiveDate::from_ymd_opt(2019, 11, 3)
        );
        assert_eq!(
            parse_legacy_date("3/1/2019"),
            NaiveDate::from_ymd_opt(2019, 1, 3)
        );
    }

    #[test]
    fn rejects_other_shapes() {
        assert_eq!(parse_legacy_date(""), None);
        assert_eq!(parse_legacy_date("31/02/2019"), None);
        assert_eq!(parse_legacy_date("03/11/19"), None);
        assert_eq!(parse_legacy_date("2019-11-03"), None);
        assert_eq!(parse_legacy_date("03/11/2019 10:00"), None);
    }
}
