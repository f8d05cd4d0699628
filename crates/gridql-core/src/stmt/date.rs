use super::Operator;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The literal a date filter compares against.
///
/// Date filters never carry a bare instant: they name a mode ("today",
/// "pastNumberOfDays", ...) plus whatever inputs the mode needs. The
/// [`DateRange`](crate::DateRange) resolver turns it into concrete bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFilterValue {
    pub mode: DateMode,

    /// Zone the mode is evaluated in. Falls back to the field's zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_date: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_date_end: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_days: Option<i64>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateMode {
    Today,
    Tomorrow,
    Yesterday,
    OneWeekAgo,
    OneWeekFromNow,
    OneMonthAgo,
    OneMonthFromNow,
    #[serde(alias = "numberOfDaysAgo")]
    DaysAgo,
    #[serde(alias = "numberOfDaysFromNow")]
    DaysFromNow,
    ExactDate,
    ExactFormatDate,
    DateRange,
    CurrentWeek,
    CurrentMonth,
    CurrentYear,
    LastWeek,
    LastMonth,
    LastYear,
    NextWeek,
    NextMonth,
    NextYear,
    PastWeek,
    PastMonth,
    PastYear,
    ComingWeek,
    ComingMonth,
    ComingYear,
    PastNumberOfDays,
    NextNumberOfDays,
}

use DateMode::*;

/// Modes naming a point (a day, a calendar unit or an explicit range).
const POINT_MODES: &[DateMode] = &[
    Today,
    Tomorrow,
    Yesterday,
    OneWeekAgo,
    OneWeekFromNow,
    OneMonthAgo,
    OneMonthFromNow,
    DaysAgo,
    DaysFromNow,
    ExactDate,
    ExactFormatDate,
    DateRange,
    CurrentWeek,
    CurrentMonth,
    CurrentYear,
    LastWeek,
    LastMonth,
    LastYear,
    NextWeek,
    NextMonth,
    NextYear,
];

/// Modes naming a rolling window anchored at now.
const WINDOW_MODES: &[DateMode] = &[
    PastWeek,
    PastMonth,
    PastYear,
    ComingWeek,
    ComingMonth,
    ComingYear,
    PastNumberOfDays,
    NextNumberOfDays,
];

impl DateMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Today => "today",
            Tomorrow => "tomorrow",
            Yesterday => "yesterday",
            OneWeekAgo => "oneWeekAgo",
            OneWeekFromNow => "oneWeekFromNow",
            OneMonthAgo => "oneMonthAgo",
            OneMonthFromNow => "oneMonthFromNow",
            DaysAgo => "daysAgo",
            DaysFromNow => "daysFromNow",
            ExactDate => "exactDate",
            ExactFormatDate => "exactFormatDate",
            DateRange => "dateRange",
            CurrentWeek => "currentWeek",
            CurrentMonth => "currentMonth",
            CurrentYear => "currentYear",
            LastWeek => "lastWeek",
            LastMonth => "lastMonth",
            LastYear => "lastYear",
            NextWeek => "nextWeek",
            NextMonth => "nextMonth",
            NextYear => "nextYear",
            PastWeek => "pastWeek",
            PastMonth => "pastMonth",
            PastYear => "pastYear",
            ComingWeek => "comingWeek",
            ComingMonth => "comingMonth",
            ComingYear => "comingYear",
            PastNumberOfDays => "pastNumberOfDays",
            NextNumberOfDays => "nextNumberOfDays",
        }
    }

    /// Sub-modes a date operator accepts.
    pub const fn allowed_for(operator: Operator) -> &'static [DateMode] {
        match operator {
            Operator::IsWithin => WINDOW_MODES,
            _ => POINT_MODES,
        }
    }
}

impl fmt::Display for DateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DateFilterValue {
    pub fn new(mode: DateMode) -> DateFilterValue {
        DateFilterValue {
            mode,
            time_zone: None,
            exact_date: None,
            exact_date_end: None,
            number_of_days: None,
        }
    }

    pub fn exact(mode: DateMode, date: Timestamp) -> DateFilterValue {
        DateFilterValue {
            exact_date: Some(date),
            ..DateFilterValue::new(mode)
        }
    }

    pub fn range(start: Timestamp, end: Timestamp) -> DateFilterValue {
        DateFilterValue {
            exact_date: Some(start),
            exact_date_end: Some(end),
            ..DateFilterValue::new(DateMode::DateRange)
        }
    }

    pub fn days(mode: DateMode, number_of_days: i64) -> DateFilterValue {
        DateFilterValue {
            number_of_days: Some(number_of_days),
            ..DateFilterValue::new(mode)
        }
    }

    pub fn time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }
}
