use super::{Flavor, Formatter, Params, Quoted, ToSql};

use gridql_core::{
    schema::{DateGranularity, FieldSpec},
    Result,
};
use jiff::Timestamp;

/// A field's display time zone, validated and ready to embed.
///
/// SQLite has no time zone database; dates are shifted by the zone's UTC
/// offset at the instant the fragment is compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Zone {
    /// Canonical IANA name
    pub(crate) name: String,

    /// `+HH:MM` offset at compile time
    pub(crate) offset: String,

    /// Inverse of `offset`
    pub(crate) inverse: String,
}

/// Truncates a date to a granularity in a zone, for comparisons.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Truncate<'a, E> {
    pub(crate) expr: E,
    pub(crate) unit: DateGranularity,
    pub(crate) zone: &'a Zone,
}

/// Truncates a date in a zone and converts the result back to an instant, for
/// grouping.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Bucket<'a, E> {
    pub(crate) expr: E,
    pub(crate) unit: DateGranularity,
    pub(crate) zone: &'a Zone,
}

/// Formats a date as display text in a zone, for searching.
#[derive(Debug, Copy, Clone)]
pub(crate) struct DateText<'a, E> {
    pub(crate) expr: E,
    pub(crate) with_time: bool,
    pub(crate) zone: &'a Zone,
}

impl Zone {
    pub(crate) fn of(field: &FieldSpec, now: Timestamp) -> Result<Zone> {
        let tz = field.options.date.tz()?;
        let name = tz
            .iana_name()
            .map(str::to_string)
            .unwrap_or_else(|| field.options.date.time_zone.clone());
        let seconds = tz.to_offset(now).seconds();

        Ok(Zone {
            name,
            offset: format_offset(seconds),
            inverse: format_offset(-seconds),
        })
    }
}

fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

fn postgresql_unit(unit: DateGranularity) -> &'static str {
    match unit {
        DateGranularity::Year => "year",
        DateGranularity::Month => "month",
        DateGranularity::Day => "day",
        DateGranularity::Minute => "minute",
    }
}

/// `strftime` formats producing values `datetime()` accepts back.
fn sqlite_format(unit: DateGranularity) -> &'static str {
    match unit {
        DateGranularity::Year => "%Y-01-01",
        DateGranularity::Month => "%Y-%m-01",
        DateGranularity::Day => "%Y-%m-%d",
        DateGranularity::Minute => "%Y-%m-%d %H:%M",
    }
}

impl<E: ToSql> ToSql for Truncate<'_, E> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let zone = self.zone;

        match f.serializer.flavor {
            Flavor::Postgresql => fmt!(
                f,
                "date_trunc(" Quoted(postgresql_unit(self.unit)) ", " self.expr
                " AT TIME ZONE " Quoted(&zone.name) ")"
            ),
            Flavor::Sqlite => fmt!(
                f,
                "strftime(" Quoted(sqlite_format(self.unit)) ", " self.expr ", "
                Quoted(&zone.offset) ")"
            ),
        }
    }
}

impl<E: ToSql> ToSql for Bucket<'_, E> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let zone = self.zone;

        match f.serializer.flavor {
            Flavor::Postgresql => fmt!(
                f,
                "(" Truncate { expr: self.expr, unit: self.unit, zone }
                " AT TIME ZONE " Quoted(&zone.name) ")"
            ),
            Flavor::Sqlite => fmt!(
                f,
                "datetime(" Truncate { expr: self.expr, unit: self.unit, zone } ", "
                Quoted(&zone.inverse) ")"
            ),
        }
    }
}

impl<E: ToSql> ToSql for DateText<'_, E> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let zone = self.zone;

        match f.serializer.flavor {
            Flavor::Postgresql => {
                let pattern = if self.with_time {
                    "YYYY-MM-DD HH24:MI"
                } else {
                    "YYYY-MM-DD"
                };
                fmt!(
                    f,
                    "to_char(" self.expr " AT TIME ZONE " Quoted(&zone.name) ", "
                    Quoted(pattern) ")"
                )
            }
            Flavor::Sqlite => {
                let pattern = if self.with_time {
                    "%Y-%m-%d %H:%M"
                } else {
                    "%Y-%m-%d"
                };
                fmt!(
                    f,
                    "strftime(" Quoted(pattern) ", " self.expr ", " Quoted(&zone.offset) ")"
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridql_core::schema::{DateFormatting, FieldKind};

    #[test]
    fn offsets_follow_daylight_saving() {
        let field = FieldSpec::new("fld1", "Due", FieldKind::Date)
            .date_formatting(DateFormatting::new("America/New_York"));

        let winter = Zone::of(&field, "2024-01-15T12:00:00Z".parse().unwrap()).unwrap();
        assert_eq!(winter.name, "America/New_York");
        assert_eq!(winter.offset, "-05:00");
        assert_eq!(winter.inverse, "+05:00");

        let summer = Zone::of(&field, "2024-07-15T12:00:00Z".parse().unwrap()).unwrap();
        assert_eq!(summer.offset, "-04:00");
    }

    #[test]
    fn half_hour_offsets() {
        assert_eq!(format_offset(5 * 3600 + 1800), "+05:30");
        assert_eq!(format_offset(0), "+00:00");
    }
}
