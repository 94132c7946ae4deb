use crate::models::{
    CalendarDay, CalendarMonth, DailyPoint, DayDetail, DayPartBucket, DayParts, DayTotals,
    EntryType, LogEntry, Report, SummaryStats, TodaySummary, UserSettings,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::BTreeSet;

/// Date range plus a daily time-of-day window, all bounds inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

impl ReportWindow {
    /// Number of calendar days covered; zero or negative when inverted.
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// `days` back from `today` through `today`, all day long.
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        Self {
            start_date: today - Duration::days(days),
            end_date: today,
            start_time: "00:00".to_string(),
            end_time: "23:59".to_string(),
        }
    }
}

pub fn day_totals<Tz: TimeZone>(entries: &[LogEntry], date: NaiveDate, tz: &Tz) -> DayTotals {
    let mut totals = DayTotals::default();
    for entry in entries.iter().filter(|e| local(e, tz).date() == date) {
        match entry.entry_type {
            EntryType::Water => totals.intake += u64::from(entry.amount),
            EntryType::Urine => totals.output += u64::from(entry.amount),
            EntryType::Note => {}
        }
    }
    totals.net = totals.intake as i64 - totals.output as i64;
    totals
}

/// Net balance for `date`, ignoring urine voided before the first intake of that day.
pub fn net_volume_on<Tz: TimeZone>(entries: &[LogEntry], date: NaiveDate, tz: &Tz) -> i64 {
    let day: Vec<&LogEntry> = entries
        .iter()
        .filter(|e| local(e, tz).date() == date)
        .collect();

    let Some(first_intake) = day
        .iter()
        .filter(|e| e.entry_type == EntryType::Water)
        .map(|e| e.timestamp)
        .min()
    else {
        return 0;
    };

    let intake = sum_amounts(day.iter().copied(), EntryType::Water);
    let output = sum_amounts(
        day.iter().copied().filter(|e| e.timestamp >= first_intake),
        EntryType::Urine,
    );
    intake as i64 - output as i64
}

pub fn today_summary<Tz: TimeZone>(entries: &[LogEntry], today: NaiveDate, tz: &Tz) -> TodaySummary {
    let mut day: Vec<LogEntry> = entries
        .iter()
        .filter(|e| local(e, tz).date() == today)
        .cloned()
        .collect();
    day.sort_by_key(|e| e.timestamp);

    TodaySummary {
        date: today,
        intake_total: sum_amounts(day.iter(), EntryType::Water),
        intake_count: count_of(&day, EntryType::Water),
        urine_total: sum_amounts(day.iter(), EntryType::Urine),
        urine_count: count_of(&day, EntryType::Urine),
        net_volume: net_volume_on(&day, today, tz),
        entries: day,
    }
}

/// Entries inside the window, newest first. A start time after the end time
/// matches nothing; windows never wrap past midnight.
pub fn range_filter<Tz: TimeZone>(
    entries: &[LogEntry],
    window: &ReportWindow,
    tz: &Tz,
) -> Vec<LogEntry> {
    let mut filtered: Vec<LogEntry> = entries
        .iter()
        .filter(|e| {
            let at = local(e, tz);
            let date = at.date();
            if date < window.start_date || date > window.end_date {
                return false;
            }
            let time = time_key(at);
            time.as_str() >= window.start_time.as_str() && time.as_str() <= window.end_time.as_str()
        })
        .cloned()
        .collect();
    sort_newest_first(&mut filtered);
    filtered
}

/// Distinct calendar days holding intake or output, never less than one.
pub fn active_day_count<Tz: TimeZone>(entries: &[LogEntry], tz: &Tz) -> usize {
    let days: BTreeSet<NaiveDate> = entries
        .iter()
        .filter(|e| e.entry_type.is_volume())
        .map(|e| local(e, tz).date())
        .collect();
    days.len().max(1)
}

pub fn daily_trend_series<'a, Tz: TimeZone>(
    entries: &'a [LogEntry],
    start: NaiveDate,
    end: NaiveDate,
    tz: &'a Tz,
) -> impl Iterator<Item = DailyPoint> + Clone + 'a {
    let span = (end - start).num_days();
    (0..=span).filter_map(move |offset| {
        let date = start.checked_add_signed(Duration::days(offset))?;
        let totals = day_totals(entries, date, tz);
        Some(DailyPoint {
            date,
            intake: totals.intake,
            output: totals.output,
            net: totals.net,
        })
    })
}

pub fn day_part_buckets<Tz: TimeZone>(
    entries: &[LogEntry],
    day_parts: &DayParts,
    active_days: usize,
    tz: &Tz,
) -> Vec<DayPartBucket> {
    let parts = day_parts.ordered();
    let mut sums = [(0i64, 0i64); 4];

    for entry in entries.iter().filter(|e| e.entry_type.is_volume()) {
        let time = time_key(local(entry, tz));
        // Entries outside every window are dropped.
        let Some(index) = parts.iter().position(|(_, range)| range.contains(&time)) else {
            continue;
        };
        let amount = i64::from(entry.amount);
        match entry.entry_type {
            EntryType::Water => sums[index].0 += amount,
            _ => sums[index].1 += amount,
        }
    }

    let denom = active_days.max(1) as f64;
    parts
        .iter()
        .zip(sums)
        .map(|(&(name, _), (water, urine))| DayPartBucket {
            name,
            intake: round_half_up(water as f64 / denom),
            urine: round_half_up(urine as f64 / denom),
        })
        .collect()
}

pub fn summary_stats(entries: &[LogEntry], active_days: usize) -> SummaryStats {
    let days = active_days.max(1);
    let denom = days as f64;
    let water = sum_amounts(entries.iter(), EntryType::Water) as f64;
    let urine = sum_amounts(entries.iter(), EntryType::Urine) as f64;

    SummaryStats {
        avg_intake_per_day: round_half_up(water / denom),
        avg_urine_per_day: round_half_up(urine / denom),
        avg_net_per_day: round_half_up((water - urine) / denom),
        avg_intake_entries_per_day: tenths_half_up(count_of(entries, EntryType::Water), days),
        avg_urine_entries_per_day: tenths_half_up(count_of(entries, EntryType::Urine), days),
    }
}

pub fn build_report<Tz: TimeZone>(
    entries: &[LogEntry],
    settings: &UserSettings,
    window: &ReportWindow,
    tz: &Tz,
) -> Report {
    let filtered = range_filter(entries, window, tz);
    let active_days = active_day_count(&filtered, tz);

    Report {
        start_date: window.start_date,
        end_date: window.end_date,
        start_time: window.start_time.clone(),
        end_time: window.end_time.clone(),
        active_days,
        summary: summary_stats(&filtered, active_days),
        daily_trend: daily_trend_series(&filtered, window.start_date, window.end_date, tz).collect(),
        day_parts: day_part_buckets(&filtered, &settings.day_parts, active_days, tz),
        entries: filtered,
    }
}

/// Month grid from the Sunday on or before the 1st to the Saturday on or
/// after the last day. `None` for an invalid year/month.
pub fn calendar_month<Tz: TimeZone>(
    entries: &[LogEntry],
    year: i32,
    month: u32,
    tz: &Tz,
) -> Option<CalendarMonth> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next_month - Duration::days(1);

    let lead = i64::from(first.weekday().num_days_from_sunday());
    let trail = 6 - i64::from(last.weekday().num_days_from_sunday());
    let grid_start = first.checked_sub_signed(Duration::days(lead))?;
    let grid_end = last.checked_add_signed(Duration::days(trail))?;

    let days = grid_start
        .iter_days()
        .take_while(|date| *date <= grid_end)
        .map(|date| CalendarDay {
            date,
            in_month: date.month() == month,
            entry_count: entries.iter().filter(|e| local(e, tz).date() == date).count(),
            totals: day_totals(entries, date, tz),
        })
        .collect();

    Some(CalendarMonth { year, month, days })
}

pub fn entries_on_day<Tz: TimeZone>(entries: &[LogEntry], date: NaiveDate, tz: &Tz) -> DayDetail {
    let mut day: Vec<LogEntry> = entries
        .iter()
        .filter(|e| local(e, tz).date() == date)
        .cloned()
        .collect();
    sort_newest_first(&mut day);

    DayDetail {
        date,
        totals: day_totals(&day, date, tz),
        entries: day,
    }
}

pub fn sort_newest_first(entries: &mut [LogEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Wall-clock time of `at` in `tz`.
pub fn local_time<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> NaiveDateTime {
    at.with_timezone(tz).naive_local()
}

fn local<Tz: TimeZone>(entry: &LogEntry, tz: &Tz) -> NaiveDateTime {
    local_time(&entry.timestamp, tz)
}

fn time_key(at: NaiveDateTime) -> String {
    at.format("%H:%M").to_string()
}

fn sum_amounts<'a>(entries: impl Iterator<Item = &'a LogEntry>, kind: EntryType) -> u64 {
    entries
        .filter(|e| e.entry_type == kind)
        .map(|e| u64::from(e.amount))
        .sum()
}

fn count_of(entries: &[LogEntry], kind: EntryType) -> usize {
    entries.iter().filter(|e| e.entry_type == kind).count()
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// `count / days` to one decimal, rounding the exact ratio half-up.
fn tenths_half_up(count: usize, days: usize) -> f64 {
    let tenths = (count * 20 + days) / (2 * days);
    tenths as f64 / 10.0
}
