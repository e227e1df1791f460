//! Utilities for handling time (interfacing with `std::time` and `chrono`).

use std::time::SystemTime;

use chrono::{DateTime, Datelike, TimeZone, Utc, Local};

/// The calendar year at an instant, as seen in a given time zone.
pub trait YearIn {
    fn year_in<Tz: TimeZone>(&self, zone: &Tz) -> i32;
}

impl<AnyTz: TimeZone> YearIn for DateTime<AnyTz> {
    fn year_in<Tz: TimeZone>(&self, zone: &Tz) -> i32 {
        self.with_timezone(zone).year()
    }
}

impl YearIn for SystemTime {
    fn year_in<Tz: TimeZone>(&self, zone: &Tz) -> i32 {
        let dt : DateTime<Utc> = DateTime::from(*self);
        dt.year_in(zone)
    }
}


// ------------------------------------------------------------------

/// Where "the current year" comes from. Asked anew on every use.
pub trait YearSource: Send + Sync {
    fn current_year(&self) -> i32;
}

/// The wall clock, in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemYear;

impl YearSource for SystemYear {
    fn current_year(&self) -> i32 {
        SystemTime::now().year_in(&Local)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedYear(pub i32);

impl YearSource for FixedYear {
    fn current_year(&self) -> i32 {
        self.0
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn t_year_in() {
        // 2023-12-31 23:30 UTC
        let t = Utc.timestamp_opt(1704065400, 0).unwrap();
        assert_eq!(t.year_in(&Utc), 2023);
        assert_eq!(t.year_in(&FixedOffset::east_opt(3600).unwrap()), 2024);
        let st = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1704065400);
        assert_eq!(st.year_in(&FixedOffset::west_opt(3600).unwrap()), 2023);
        assert_eq!(st.year_in(&FixedOffset::east_opt(3600).unwrap()), 2024);
    }

    #[test]
    fn t_system_year() {
        let y = SystemYear.current_year();
        assert!(y >= 2024);
        assert_eq!(y.to_string().len(), 4);
        assert_eq!(FixedYear(2031).current_year(), 2031);
    }
}
