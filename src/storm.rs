use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Bucket a route's last-pass timestamp into the raster observation date it
/// belongs with: passes after 11:00 count toward the next day's
/// observation. Returns `(storm_date, previous_date)`; the previous day is
/// joined alongside so pre-storm conditions travel with each record.
pub fn storm_dates(last_pass: NaiveDateTime) -> (NaiveDate, NaiveDate) {
    let storm = if last_pass.hour() > 11 {
        last_pass.date() + Duration::days(1)
    } else {
        last_pass.date()
    };
    (storm, storm - Duration::days(1))
}

/// Sorted, deduplicated union of storm dates and their previous days: the
/// set of raster dates worth fetching.
pub fn unique_storm_dates(pairs: &[(NaiveDate, NaiveDate)]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = pairs.iter().flat_map(|&(storm, prev)| [storm, prev]).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}
