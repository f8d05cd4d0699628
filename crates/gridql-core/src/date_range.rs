use crate::{
    schema::{resolve_time_zone, DateFormatting, DatePreset},
    stmt::{DateFilterValue, DateMode},
    Error, Result,
};

use jiff::{civil::Date, tz::TimeZone, SignedDuration, Span, Timestamp, ToSpan};

/// A closed range of instants, both ends inclusive.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

/// Calendar unit a relative mode moves by.
#[derive(Debug, Copy, Clone)]
enum Unit {
    Week,
    Month,
    Year,
}

#[derive(Debug, Copy, Clone)]
enum Direction {
    Forward,
    Back,
}

struct Resolver {
    tz: TimeZone,
    today: Date,
}

impl DateRange {
    /// Resolves a date filter value against the current clock.
    pub fn resolve(value: &DateFilterValue, formatting: &DateFormatting) -> Result<DateRange> {
        DateRange::resolve_at(value, formatting, Timestamp::now())
    }

    /// Resolves a date filter value as if the current instant were `now`.
    ///
    /// The mode is evaluated in the value's time zone, or in the field's zone
    /// when the value does not name one.
    pub fn resolve_at(
        value: &DateFilterValue,
        formatting: &DateFormatting,
        now: Timestamp,
    ) -> Result<DateRange> {
        let tz = resolve_time_zone(value.time_zone.as_deref().unwrap_or(&formatting.time_zone))?;
        let today = now.to_zoned(tz.clone()).date();
        let cx = Resolver { tz, today };

        let range = match value.mode {
            DateMode::Today => cx.day(cx.today)?,
            DateMode::Tomorrow => cx.day(cx.today.checked_add(1.day())?)?,
            DateMode::Yesterday => cx.day(cx.today.checked_sub(1.day())?)?,
            DateMode::OneWeekAgo => cx.day(cx.today.checked_sub(1.week())?)?,
            DateMode::OneWeekFromNow => cx.day(cx.today.checked_add(1.week())?)?,
            DateMode::OneMonthAgo => cx.day(cx.today.checked_sub(1.month())?)?,
            DateMode::OneMonthFromNow => cx.day(cx.today.checked_add(1.month())?)?,
            DateMode::DaysAgo => {
                let days = positive_days(value)?;
                cx.day(cx.days_from_today(value.mode, days, Direction::Back)?)?
            }
            DateMode::DaysFromNow => {
                let days = positive_days(value)?;
                cx.day(cx.days_from_today(value.mode, days, Direction::Forward)?)?
            }
            DateMode::ExactDate => {
                let exact = require(value.exact_date, value.mode, "exactDate")?;
                cx.day(cx.date_of(exact))?
            }
            DateMode::ExactFormatDate => {
                let exact = require(value.exact_date, value.mode, "exactDate")?;
                let date = cx.date_of(exact);
                match formatting.date_preset {
                    DatePreset::Year => cx.unit(date.first_of_year(), Unit::Year)?,
                    DatePreset::YearMonth | DatePreset::Month => {
                        cx.unit(date.first_of_month(), Unit::Month)?
                    }
                    DatePreset::Default | DatePreset::MonthDay | DatePreset::Day => cx.day(date)?,
                }
            }
            DateMode::DateRange => {
                let start = require(value.exact_date, value.mode, "exactDate")?;
                let end = require(value.exact_date_end, value.mode, "exactDateEnd")?;

                if start > end {
                    return Err(Error::date_range_reversed(start, end));
                }

                if formatting.has_time() {
                    DateRange { start, end }
                } else {
                    DateRange {
                        start: cx.start_of_day(cx.date_of(start))?,
                        end: cx.end_of_day(cx.date_of(end))?,
                    }
                }
            }
            DateMode::CurrentWeek => cx.calendar(Unit::Week, 0)?,
            DateMode::CurrentMonth => cx.calendar(Unit::Month, 0)?,
            DateMode::CurrentYear => cx.calendar(Unit::Year, 0)?,
            DateMode::LastWeek => cx.calendar(Unit::Week, -1)?,
            DateMode::LastMonth => cx.calendar(Unit::Month, -1)?,
            DateMode::LastYear => cx.calendar(Unit::Year, -1)?,
            DateMode::NextWeek => cx.calendar(Unit::Week, 1)?,
            DateMode::NextMonth => cx.calendar(Unit::Month, 1)?,
            DateMode::NextYear => cx.calendar(Unit::Year, 1)?,
            DateMode::PastWeek => cx.past(Unit::Week)?,
            DateMode::PastMonth => cx.past(Unit::Month)?,
            DateMode::PastYear => cx.past(Unit::Year)?,
            DateMode::ComingWeek => cx.coming(Unit::Week)?,
            DateMode::ComingMonth => cx.coming(Unit::Month)?,
            DateMode::ComingYear => cx.coming(Unit::Year)?,
            DateMode::PastNumberOfDays => {
                let days = require(value.number_of_days, value.mode, "numberOfDays")?;
                let first = cx.days_from_today(value.mode, days, Direction::Back)?;
                cx.between(first, cx.today)?
            }
            DateMode::NextNumberOfDays => {
                let days = require(value.number_of_days, value.mode, "numberOfDays")?;
                let last = cx.days_from_today(value.mode, days, Direction::Forward)?;
                cx.between(cx.today, last)?
            }
        };

        tracing::trace!(mode = %value.mode, start = %range.start, end = %range.end, "resolved date range");
        Ok(range)
    }

    pub fn contains(&self, instant: Timestamp) -> bool {
        self.start <= instant && instant <= self.end
    }
}

impl Resolver {
    fn date_of(&self, instant: Timestamp) -> Date {
        instant.to_zoned(self.tz.clone()).date()
    }

    fn start_of_day(&self, date: Date) -> Result<Timestamp> {
        Ok(date.to_zoned(self.tz.clone())?.start_of_day()?.timestamp())
    }

    /// Last representable instant of `date`: one nanosecond before the next
    /// day starts.
    fn end_of_day(&self, date: Date) -> Result<Timestamp> {
        let next = self.start_of_day(date.tomorrow()?)?;
        Ok(next.checked_sub(SignedDuration::from_nanos(1))?)
    }

    fn day(&self, date: Date) -> Result<DateRange> {
        Ok(DateRange {
            start: self.start_of_day(date)?,
            end: self.end_of_day(date)?,
        })
    }

    /// The unit of calendar time starting at `first`.
    fn unit(&self, first: Date, unit: Unit) -> Result<DateRange> {
        let last = first.checked_add(unit.span(1))?.yesterday()?;
        Ok(DateRange {
            start: self.start_of_day(first)?,
            end: self.end_of_day(last)?,
        })
    }

    /// The calendar unit containing today, moved by `offset` units.
    fn calendar(&self, unit: Unit, offset: i64) -> Result<DateRange> {
        let first = match unit {
            // Weeks start on Monday
            Unit::Week => self
                .today
                .checked_sub(i64::from(self.today.weekday().to_monday_zero_offset()).days())?,
            Unit::Month => self.today.first_of_month(),
            Unit::Year => self.today.first_of_year(),
        };

        self.unit(first.checked_add(unit.span(offset))?, unit)
    }

    /// Whole days from the start of `first` through the end of `last`.
    fn between(&self, first: Date, last: Date) -> Result<DateRange> {
        Ok(DateRange {
            start: self.start_of_day(first)?,
            end: self.end_of_day(last)?,
        })
    }

    fn past(&self, unit: Unit) -> Result<DateRange> {
        self.between(self.today.checked_sub(unit.span(1))?, self.today)
    }

    fn coming(&self, unit: Unit) -> Result<DateRange> {
        self.between(self.today, self.today.checked_add(unit.span(1))?)
    }

    /// Today moved by a user supplied number of days. Counts jiff cannot
    /// represent, or that leave its calendar, are validation errors.
    fn days_from_today(&self, mode: DateMode, days: i64, direction: Direction) -> Result<Date> {
        let out_of_range = |_: jiff::Error| Error::days_out_of_range(mode, days);
        let span = Span::new().try_days(days).map_err(out_of_range)?;

        let date = match direction {
            Direction::Forward => self.today.checked_add(span),
            Direction::Back => self.today.checked_sub(span),
        };
        date.map_err(out_of_range)
    }
}

impl Unit {
    fn span(self, n: i64) -> Span {
        match self {
            Unit::Week => n.weeks(),
            Unit::Month => n.months(),
            Unit::Year => n.years(),
        }
    }
}

fn require<T>(input: Option<T>, mode: DateMode, name: &'static str) -> Result<T> {
    input.ok_or_else(|| Error::missing_date_input(mode, name))
}

fn positive_days(value: &DateFilterValue) -> Result<i64> {
    let days = require(value.number_of_days, value.mode, "numberOfDays")?;
    if days <= 0 {
        return Err(Error::non_positive_days(value.mode, days));
    }
    Ok(days)
}
