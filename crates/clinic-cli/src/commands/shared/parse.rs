use anyhow::{Context, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// `YYYY-MM-DD` or `DD/MM/YYYY`.
pub fn parse_date(raw: &str, field: &str) -> anyhow::Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .with_context(|| format!("invalid {field} '{raw}': expected YYYY-MM-DD or DD/MM/YYYY"))
}

/// RFC 3339, `YYYY-MM-DD HH:MM` (UTC), or a bare date meaning midnight UTC.
pub fn parse_datetime(raw: &str, field: &str) -> anyhow::Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    bail!("invalid {field} '{raw}': expected RFC 3339, 'YYYY-MM-DD HH:MM' or YYYY-MM-DD")
}

/// A money amount such as `150`, `150.5` or `150,50`, in cents.
pub fn parse_money(raw: &str, field: &str) -> anyhow::Result<i64> {
    let trimmed = raw.trim().trim_start_matches("R$").trim();
    let invalid = || anyhow::anyhow!("invalid {field} '{raw}': expected an amount like 150.00");

    let (units, fraction) = match trimmed.split_once(|ch: char| ch == '.' || ch == ',') {
        Some((units, fraction)) => (units, fraction),
        None => (trimmed, ""),
    };
    if units.is_empty()
        || !units.chars().all(|ch| ch.is_ascii_digit())
        || fraction.len() > 2
        || !fraction.chars().all(|ch| ch.is_ascii_digit())
    {
        return Err(invalid());
    }

    let units: i64 = units.parse().map_err(|_| invalid())?;
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };
    units
        .checked_mul(100)
        .and_then(|value| value.checked_add(cents))
        .ok_or_else(invalid)
}

/// `YYYY-MM` or `MM/YYYY`.
pub fn parse_month(raw: &str) -> anyhow::Result<(i32, u32)> {
    let raw = raw.trim();
    let parsed = raw
        .split_once('-')
        .and_then(|(year, month)| Some((year.parse().ok()?, month.parse().ok()?)))
        .or_else(|| {
            raw.split_once('/')
                .and_then(|(month, year)| Some((year.parse().ok()?, month.parse().ok()?)))
        });
    match parsed {
        Some((year, month)) if (1..=12).contains(&month) => Ok((year, month)),
        _ => bail!("invalid month '{raw}': expected YYYY-MM"),
    }
}

/// An update flag for a nullable column: absent leaves it, `""` clears it.
#[must_use]
pub fn clearable(raw: Option<&String>) -> Option<Option<String>> {
    raw.map(|value| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use clinic_core::enums::{AppointmentStatus, ResourceCondition};

    use super::{clearable, parse_date, parse_datetime, parse_enum, parse_money, parse_month};

    #[test]
    fn parses_snake_case_enum() {
        let status: AppointmentStatus = parse_enum("completed", "status").expect("status");
        assert_eq!(status, AppointmentStatus::Completed);
    }

    #[test]
    fn parses_hyphenated_alias() {
        let status: AppointmentStatus = parse_enum("no-show", "status").expect("status");
        assert_eq!(status, AppointmentStatus::NoShow);
        let condition: ResourceCondition =
            parse_enum("needs-repair", "condition").expect("condition");
        assert_eq!(condition, ResourceCondition::NeedsRepair);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<AppointmentStatus>("done", "status").expect_err("should fail");
        assert!(err.to_string().contains("invalid status 'done'"));
    }

    #[test]
    fn dates_in_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2018, 4, 2).expect("date");
        assert_eq!(parse_date("2018-04-02", "birth date").expect("iso"), expected);
        assert_eq!(parse_date("02/04/2018", "birth date").expect("br"), expected);
        assert!(parse_date("2018-13-40", "birth date").is_err());
    }

    #[test]
    fn datetimes() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).single().expect("dt");
        assert_eq!(parse_datetime("2025-03-10T14:00:00Z", "start").expect("rfc"), expected);
        assert_eq!(
            parse_datetime("2025-03-10T11:00:00-03:00", "start").expect("offset"),
            expected
        );
        assert_eq!(parse_datetime("2025-03-10 14:00", "start").expect("plain"), expected);
        assert_eq!(
            parse_datetime("2025-03-10", "start").expect("date"),
            Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).single().expect("dt")
        );
        assert!(parse_datetime("tomorrow", "start").is_err());
    }

    #[test]
    fn money_to_cents() {
        assert_eq!(parse_money("150", "amount").expect("int"), 15_000);
        assert_eq!(parse_money("150.5", "amount").expect("one decimal"), 15_050);
        assert_eq!(parse_money("150,05", "amount").expect("comma"), 15_005);
        assert_eq!(parse_money("R$ 80.00", "amount").expect("symbol"), 8_000);
        assert!(parse_money("1.234,56", "amount").is_err());
        assert!(parse_money("-10", "amount").is_err());
        assert!(parse_money("10.999", "amount").is_err());
        assert!(parse_money("", "amount").is_err());
    }

    #[test]
    fn months() {
        assert_eq!(parse_month("2025-03").expect("iso"), (2025, 3));
        assert_eq!(parse_month("03/2025").expect("br"), (2025, 3));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("march").is_err());
    }

    #[test]
    fn empty_flag_clears() {
        assert_eq!(clearable(None), None);
        assert_eq!(clearable(Some(&String::new())), Some(None));
        assert_eq!(clearable(Some(&" Recife ".to_string())), Some(Some("Recife".to_string())));
    }
}
