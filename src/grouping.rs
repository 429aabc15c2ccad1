// Partitioning of logged sets into calendar buckets
use crate::model::{Granularity, SetRecord};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use std::collections::BTreeMap;

/// Return the first day of the bucket containing `timestamp`.
///
/// Daily buckets run midnight to midnight, weekly buckets start on
/// `week_start` and monthly buckets on the 1st.
pub fn bucket_key(
    timestamp: NaiveDateTime,
    granularity: Granularity,
    week_start: Weekday,
) -> NaiveDate {
    let day = timestamp.date();
    match granularity {
        Granularity::Daily => day,
        Granularity::Weekly => day.week(week_start).first_day(),
        Granularity::Monthly => day.with_day(1).unwrap_or(day),
    }
}

/// Group sets into buckets keyed by the bucket's first day.
///
/// Every input set ends up in exactly one bucket and sets keep their input
/// order inside a bucket. No filtering happens here, warm-ups included.
pub fn group<'a, I>(
    sets: I,
    granularity: Granularity,
    week_start: Weekday,
) -> BTreeMap<NaiveDate, Vec<&'a SetRecord>>
where
    I: IntoIterator<Item = &'a SetRecord>,
{
    let mut map: BTreeMap<NaiveDate, Vec<&SetRecord>> = BTreeMap::new();
    for s in sets {
        map.entry(bucket_key(s.timestamp, granularity, week_start))
            .or_default()
            .push(s);
    }
    map
}

/// Group only the working sets of `sets` (warm-ups dropped).
pub fn group_working<'a>(
    sets: &'a [SetRecord],
    granularity: Granularity,
    week_start: Weekday,
) -> BTreeMap<NaiveDate, Vec<&'a SetRecord>> {
    group(sets.iter().filter(|s| s.is_working()), granularity, week_start)
}
