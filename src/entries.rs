use crate::models::{EntryDraft, EntryType, LogEntry, SAMPLE_NOTE, Urgency};
use crate::settings::NONE_CATEGORY;
use crate::stats::sort_newest_first;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("amount must be greater than zero")]
    MissingAmount,

    #[error("a note needs some text")]
    MissingNotes,

    #[error("entry not found: {0}")]
    NotFound(String),
}

pub fn validate_draft(draft: &EntryDraft) -> Result<(), EntryError> {
    match draft.entry_type {
        EntryType::Note if draft.notes.trim().is_empty() => Err(EntryError::MissingNotes),
        EntryType::Water | EntryType::Urine if draft.amount == 0 => Err(EntryError::MissingAmount),
        _ => Ok(()),
    }
}

/// Builds the stored form of a draft: the category only sticks to intake,
/// urgency only to urine, and notes carry no amount.
pub fn normalize_draft(id: String, draft: EntryDraft) -> LogEntry {
    let EntryDraft {
        entry_type,
        intake_type_id,
        amount,
        timestamp,
        notes,
        urgency,
    } = draft;

    LogEntry {
        id,
        entry_type,
        intake_type_id: match entry_type {
            EntryType::Water => Some(intake_type_id.unwrap_or_else(|| NONE_CATEGORY.to_string())),
            _ => None,
        },
        amount: if entry_type == EntryType::Note { 0 } else { amount },
        timestamp,
        notes,
        urgency: match entry_type {
            EntryType::Urine => Some(urgency.unwrap_or_default()),
            _ => None,
        },
    }
}

pub fn add_entry(entries: &mut Vec<LogEntry>, draft: EntryDraft) -> Result<LogEntry, EntryError> {
    validate_draft(&draft)?;
    let entry = normalize_draft(Uuid::new_v4().to_string(), draft);
    entries.insert(0, entry.clone());
    sort_newest_first(entries);
    Ok(entry)
}

/// Replaces the entry with `id` in place, keeping its id.
pub fn update_entry(
    entries: &mut [LogEntry],
    id: &str,
    draft: EntryDraft,
) -> Result<LogEntry, EntryError> {
    validate_draft(&draft)?;
    let slot = entries
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| EntryError::NotFound(id.to_string()))?;
    *slot = normalize_draft(id.to_string(), draft);
    Ok(slot.clone())
}

pub fn delete_entry(entries: &mut Vec<LogEntry>, id: &str) -> Result<LogEntry, EntryError> {
    let index = entries
        .iter()
        .position(|e| e.id == id)
        .ok_or_else(|| EntryError::NotFound(id.to_string()))?;
    Ok(entries.remove(index))
}

/// Merges imported entries, skipping known ids and anything matching an
/// existing entry on (timestamp, type, amount). Returns how many were added.
pub fn import_merge(existing: &mut Vec<LogEntry>, incoming: Vec<LogEntry>) -> usize {
    let mut seen_ids: HashSet<String> = existing.iter().map(|e| e.id.clone()).collect();
    let known_content: HashSet<(DateTime<Utc>, EntryType, u32)> = existing
        .iter()
        .map(|e| (e.timestamp, e.entry_type, e.amount))
        .collect();

    let mut merged: Vec<LogEntry> = incoming
        .into_iter()
        .filter(|e| !known_content.contains(&(e.timestamp, e.entry_type, e.amount)))
        .filter(|e| seen_ids.insert(e.id.clone()))
        .collect();

    let added = merged.len();
    merged.append(existing);
    sort_newest_first(&mut merged);
    *existing = merged;
    added
}

pub fn remove_sample_data(entries: &mut Vec<LogEntry>) -> usize {
    let before = entries.len();
    entries.retain(|e| e.notes != SAMPLE_NOTE);
    before - entries.len()
}

/// Synthetic history for `days` days ending on `today`, every entry tagged
/// with [`SAMPLE_NOTE`] so it can be removed again.
pub fn generate_sample_data<Tz: TimeZone>(
    today: NaiveDate,
    days: u32,
    tz: &Tz,
    seed: u64,
) -> Vec<LogEntry> {
    let mut rng = SampleRng::new(seed);
    let mut generated = Vec::new();

    for offset in 0..days {
        let day = today - Duration::days(i64::from(offset));

        for _ in 0..4 + rng.below(3) {
            let hour = 7 + rng.below(14);
            let minute = rng.below(60);
            if let Some(timestamp) = local_instant(day, hour, minute, tz) {
                generated.push(LogEntry {
                    id: Uuid::new_v4().to_string(),
                    entry_type: EntryType::Water,
                    intake_type_id: Some("water".to_string()),
                    amount: 200 + rng.below(300),
                    timestamp,
                    notes: SAMPLE_NOTE.to_string(),
                    urgency: None,
                });
            }
        }

        for _ in 0..3 + rng.below(3) {
            let hour = 8 + rng.below(15);
            let minute = rng.below(60);
            if let Some(timestamp) = local_instant(day, hour, minute, tz) {
                generated.push(LogEntry {
                    id: Uuid::new_v4().to_string(),
                    entry_type: EntryType::Urine,
                    intake_type_id: None,
                    amount: 150 + rng.below(400),
                    timestamp,
                    notes: SAMPLE_NOTE.to_string(),
                    urgency: Some(Urgency::Empty),
                });
            }
        }
    }

    generated
}

fn local_instant<Tz: TimeZone>(day: NaiveDate, hour: u32, minute: u32, tz: &Tz) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    tz.from_local_datetime(&day.and_time(time))
        .earliest()
        .map(|at| at.with_timezone(&Utc))
}

// splitmix64
struct SampleRng(u64);

impl SampleRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, bound: u32) -> u32 {
        (self.next() % u64::from(bound)) as u32
    }
}
