//! Birth profiles and their validation.

use crate::error::EngineError;
use crate::timezone::parse_timezone;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Birth data a user has entered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BirthProfile {
    /// ISO date ("1990-05-17") or ISO datetime
    #[serde(default)]
    pub birth_date: Option<String>,
    /// "HH:MM"
    #[serde(default)]
    pub birth_time: Option<String>,
    /// IANA zone name
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub place_name: Option<String>,
}

impl BirthProfile {
    /// Names of the fields a chart cannot be cast without, in a fixed order.
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.birth_date.as_deref().map_or(true, |d| d.trim().is_empty()) {
            missing.push("birth_date".to_string());
        }
        if self.timezone.is_none() {
            missing.push("timezone".to_string());
        }
        if self.lat.is_none() {
            missing.push("lat".to_string());
        }
        if self.lon.is_none() {
            missing.push("lon".to_string());
        }
        missing
    }
}

/// Read access to stored birth profiles
pub trait BirthProfileStore {
    fn profile(&self, user_id: i64) -> Option<BirthProfile>;
}

impl BirthProfileStore for std::collections::HashMap<i64, BirthProfile> {
    fn profile(&self, user_id: i64) -> Option<BirthProfile> {
        self.get(&user_id).cloned()
    }
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y"];

/// Parse a time of day, defaulting to noon.
///
/// Accepts "HH" or "HH:MM"; out-of-range parts are clamped.
pub fn parse_time_of_day(value: Option<&str>) -> NaiveTime {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return noon;
    };
    let parts: Result<Vec<i64>, _> = value.split(':').take(2).map(|p| p.trim().parse::<i64>()).collect();
    let (hour, minute) = match parts.as_deref() {
        Ok([h, m]) => (*h, *m),
        Ok([h]) => (*h, 0),
        _ => return noon,
    };
    NaiveTime::from_hms_opt(hour.clamp(0, 23) as u32, minute.clamp(0, 59) as u32, 0).unwrap_or(noon)
}

/// Combine a birth date and optional time into a naive local instant.
///
/// ISO datetimes (fractional seconds and UTC offsets allowed) keep their
/// wall-clock date and have their time replaced by `time`.
pub fn parse_birth_datetime(date: &str, time: Option<&str>) -> Result<NaiveDateTime, EngineError> {
    let date = date.trim();
    let time_of_day = parse_time_of_day(time);

    let day = if date.contains('T') {
        DateTime::parse_from_rfc3339(date)
            .map(|dt| dt.naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f"))
            .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M"))
            .map(|dt| dt.date())
            .ok()
    } else {
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
    };

    day.map(|d| d.and_time(time_of_day))
        .ok_or_else(|| EngineError::InvalidDate {
            value: date.to_string(),
            message: "expected YYYY-MM-DD or DD.MM.YYYY".to_string(),
        })
}

/// Validate a user-entered birth date and normalize it to ISO.
pub fn validate_birth_date(value: &str) -> Result<String, EngineError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EngineError::MissingField {
            field: "birth_date".to_string(),
        });
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| EngineError::InvalidDate {
            value: value.to_string(),
            message: "use YYYY-MM-DD or DD.MM.YYYY".to_string(),
        })
}

/// Validate an optional "HH:MM" birth time.
pub fn validate_birth_time(value: Option<&str>) -> Result<Option<String>, EngineError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|t| Some(t.format("%H:%M").to_string()))
        .map_err(|_| EngineError::InvalidDate {
            value: value.to_string(),
            message: "use HH:MM".to_string(),
        })
}

/// Validate an optional IANA timezone name.
pub fn validate_timezone(value: Option<&str>) -> Result<Option<String>, EngineError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    parse_timezone(value)?;
    Ok(Some(value.to_string()))
}

/// Validate a latitude ("lat") or longitude ("lon").
pub fn validate_coordinate(name: &str, value: Option<f64>) -> Result<Option<f64>, EngineError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let limit = if name == "lat" { 90.0 } else { 180.0 };
    if !value.is_finite() || value.abs() > limit {
        return Err(EngineError::InvalidCoordinate {
            field: name.to_string(),
            value,
            limit,
        });
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_missing_fields_order() {
        let profile = BirthProfile {
            birth_date: Some("1990-05-17".into()),
            timezone: Some("Europe/Moscow".into()),
            ..Default::default()
        };
        assert_eq!(profile.missing_fields(), vec!["lat", "lon"]);
        assert_eq!(
            BirthProfile::default().missing_fields(),
            vec!["birth_date", "timezone", "lat", "lon"]
        );
    }

    #[test]
    fn test_parse_birth_datetime_variants() {
        assert_eq!(parse_birth_datetime("1990-05-17", None).unwrap(), dt(1990, 5, 17, 12, 0));
        assert_eq!(
            parse_birth_datetime("1990-05-17", Some("07:45")).unwrap(),
            dt(1990, 5, 17, 7, 45)
        );
        assert_eq!(
            parse_birth_datetime("1990-05-17T03:00:00", Some("9")).unwrap(),
            dt(1990, 5, 17, 9, 0)
        );
        assert_eq!(parse_birth_datetime("17.05.1990", None).unwrap(), dt(1990, 5, 17, 12, 0));
        assert_eq!(
            parse_birth_datetime("1990-05-17T03:00:00.250", None).unwrap(),
            dt(1990, 5, 17, 12, 0)
        );
        assert_eq!(
            parse_birth_datetime("1990-05-17T01:30:00+03:00", Some("01:30")).unwrap(),
            dt(1990, 5, 17, 1, 30)
        );
        assert_eq!(
            parse_birth_datetime("1990-05-17T23:10:00.5-05:00", None).unwrap(),
            dt(1990, 5, 17, 12, 0)
        );
        assert!(parse_birth_datetime("17 May 1990", None).is_err());
    }

    #[test]
    fn test_time_is_clamped_or_defaulted() {
        assert_eq!(parse_time_of_day(Some("25:70")), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
        assert_eq!(parse_time_of_day(Some("noon")), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(parse_time_of_day(None), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_validators() {
        assert_eq!(validate_birth_date("17/05/1990").unwrap(), "1990-05-17");
        assert!(validate_birth_date("").is_err());
        assert_eq!(validate_birth_time(Some("7:05")).unwrap(), Some("07:05".to_string()));
        assert!(validate_birth_time(Some("7pm")).is_err());
        assert_eq!(validate_timezone(Some(" Asia/Tokyo ")).unwrap(), Some("Asia/Tokyo".to_string()));
        assert!(validate_timezone(Some("Asia/Atlantis")).is_err());
        assert_eq!(
            validate_coordinate("lat", Some(91.0)),
            Err(EngineError::InvalidCoordinate {
                field: "lat".to_string(),
                value: 91.0,
                limit: 90.0,
            })
        );
        assert!(matches!(
            validate_coordinate("lon", Some(f64::NAN)),
            Err(EngineError::InvalidCoordinate { .. })
        ));
        assert_eq!(validate_coordinate("lon", Some(-179.5)).unwrap(), Some(-179.5));
    }
}
