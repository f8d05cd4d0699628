use crate::{Error, Result};

use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

/// Type-specific display options of a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOptions {
    #[serde(default)]
    pub number: NumberFormatting,

    #[serde(default)]
    pub date: DateFormatting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberFormatting {
    /// Number of decimal places shown.
    pub precision: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFormatting {
    #[serde(default)]
    pub date_preset: DatePreset,

    #[serde(default)]
    pub time_format: TimeFormat,

    /// IANA time zone name the field is displayed in.
    pub time_zone: String,
}

/// How the date portion of a date field is displayed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatePreset {
    /// Full year, month and day.
    #[default]
    Default,
    Year,
    YearMonth,
    Month,
    MonthDay,
    Day,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeFormat {
    /// Date only
    #[default]
    None,
    Hour12,
    Hour24,
}

/// Unit dates are truncated to before they are compared or grouped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DateGranularity {
    Year,
    Month,
    Day,
    Minute,
}

impl Default for NumberFormatting {
    fn default() -> Self {
        NumberFormatting { precision: 2 }
    }
}

impl Default for DateFormatting {
    fn default() -> Self {
        DateFormatting {
            date_preset: DatePreset::Default,
            time_format: TimeFormat::None,
            time_zone: "UTC".to_string(),
        }
    }
}

impl DateFormatting {
    pub fn new(time_zone: impl Into<String>) -> DateFormatting {
        DateFormatting {
            time_zone: time_zone.into(),
            ..DateFormatting::default()
        }
    }

    pub fn preset(mut self, preset: DatePreset) -> Self {
        self.date_preset = preset;
        self
    }

    pub fn time(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    pub fn has_time(&self) -> bool {
        self.time_format != TimeFormat::None
    }

    /// Resolves the configured zone against the time zone database.
    pub fn tz(&self) -> Result<TimeZone> {
        resolve_time_zone(&self.time_zone)
    }

    /// The unit the displayed value is precise to.
    pub fn granularity(&self) -> DateGranularity {
        match self.date_preset {
            DatePreset::Year => DateGranularity::Year,
            DatePreset::YearMonth | DatePreset::Month => DateGranularity::Month,
            DatePreset::Default | DatePreset::MonthDay | DatePreset::Day => {
                if self.has_time() {
                    DateGranularity::Minute
                } else {
                    DateGranularity::Day
                }
            }
        }
    }
}

impl FieldOptions {
    pub fn date_granularity(&self) -> DateGranularity {
        self.date.granularity()
    }
}

pub(crate) fn resolve_time_zone(name: &str) -> Result<TimeZone> {
    if name.eq_ignore_ascii_case("utc") {
        return Ok(TimeZone::UTC);
    }

    TimeZone::get(name).map_err(|_| Error::invalid_time_zone(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularity_follows_preset_and_time() {
        let formatting = DateFormatting::new("UTC");
        assert_eq!(formatting.granularity(), DateGranularity::Day);

        let formatting = formatting.time(TimeFormat::Hour24);
        assert_eq!(formatting.granularity(), DateGranularity::Minute);

        let formatting = formatting.preset(DatePreset::YearMonth);
        assert_eq!(formatting.granularity(), DateGranularity::Month);

        let formatting = formatting.preset(DatePreset::Year);
        assert_eq!(formatting.granularity(), DateGranularity::Year);
    }

    #[test]
    fn unknown_time_zone_is_rejected() {
        let err = DateFormatting::new("Mars/Olympus_Mons").tz().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn deserializes_with_defaults() {
        let options: FieldOptions =
            serde_json::from_str(r#"{"date": {"timeZone": "Asia/Tokyo"}}"#).unwrap();
        assert_eq!(options.number.precision, 2);
        assert_eq!(options.date.time_zone, "Asia/Tokyo");
        assert_eq!(options.date.date_preset, DatePreset::Default);
    }
}
