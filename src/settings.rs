use crate::models::{DayParts, EntryType, IntakeCategory, QuickButton, Sex, Theme, TimeRange, UserSettings};
use chrono::NaiveTime;
use thiserror::Error;
use uuid::Uuid;

pub const NONE_CATEGORY: &str = "none";
pub const OTHER_CATEGORY: &str = "other";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("label must not be empty")]
    BlankLabel,

    #[error("unknown intake category: {0}")]
    UnknownCategory(String),

    #[error("intake category '{0}' cannot be removed")]
    ProtectedCategory(String),

    #[error("unknown quick button: {0}")]
    UnknownQuickButton(String),

    #[error("cannot move item {from} to {to} in a list of {len}")]
    IndexOutOfRange { from: usize, to: usize, len: usize },

    #[error("invalid time '{0}', expected HH:mm")]
    InvalidTime(String),
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            default_water_amount: 250,
            default_urine_amount: 400,
            amount_increment: 50,
            quick_buttons: default_quick_buttons(),
            intake_categories: default_intake_categories(),
            theme: Theme::System,
            age: 30,
            sex: Sex::Unspecified,
            day_parts: DayParts::default(),
        }
    }
}

impl Default for DayParts {
    fn default() -> Self {
        Self {
            night: TimeRange::new("00:00", "05:59"),
            morning: TimeRange::new("06:00", "11:59"),
            afternoon: TimeRange::new("12:00", "17:59"),
            evening: TimeRange::new("18:00", "23:59"),
        }
    }
}

fn default_intake_categories() -> Vec<IntakeCategory> {
    [
        (NONE_CATEGORY, "None", false),
        ("water", "Water", true),
        ("coffee", "Coffee", true),
        ("tea", "Tea", true),
        ("juice", "Juice", true),
        ("milk", "Milk", true),
        ("soda", "Soda", true),
        ("beer", "Beer", true),
        ("wine", "Wine", true),
        ("spirits", "Spirits", true),
        (OTHER_CATEGORY, "Other", false),
    ]
    .into_iter()
    .map(|(id, label, is_deletable)| IntakeCategory {
        id: id.to_string(),
        label: label.to_string(),
        is_deletable,
    })
    .collect()
}

fn default_quick_buttons() -> Vec<QuickButton> {
    [
        ("1", EntryType::Water, "Glass", 250),
        ("2", EntryType::Water, "Big Glass", 350),
        ("3", EntryType::Water, "Bottle", 500),
        ("4", EntryType::Urine, "Small", 200),
        ("5", EntryType::Urine, "Medium", 400),
        ("6", EntryType::Urine, "Large", 600),
    ]
    .into_iter()
    .map(|(id, entry_type, label, amount)| QuickButton {
        id: id.to_string(),
        entry_type,
        label: label.to_string(),
        amount,
    })
    .collect()
}

/// Re-inserts the "none" and "other" sentinels if a stored list lost them.
pub fn ensure_sentinels(settings: &mut UserSettings) {
    let defaults = default_intake_categories();
    let categories = &mut settings.intake_categories;

    if !categories.iter().any(|c| c.id == NONE_CATEGORY) {
        if let Some(none) = defaults.iter().find(|c| c.id == NONE_CATEGORY) {
            categories.insert(0, none.clone());
        }
    }
    if !categories.iter().any(|c| c.id == OTHER_CATEGORY) {
        if let Some(other) = defaults.iter().find(|c| c.id == OTHER_CATEGORY) {
            categories.push(other.clone());
        }
    }
    for category in categories.iter_mut() {
        if category.id == NONE_CATEGORY || category.id == OTHER_CATEGORY {
            category.is_deletable = false;
        }
    }
}

/// Checks a settings object submitted for saving and restores the sentinels.
pub fn prepare_for_save(mut settings: UserSettings) -> Result<UserSettings, SettingsError> {
    validate_day_parts(&settings.day_parts)?;
    ensure_sentinels(&mut settings);
    Ok(settings)
}

/// Bounds must be zero-padded "HH:mm". Gaps and overlaps between windows are allowed.
pub fn validate_day_parts(parts: &DayParts) -> Result<(), SettingsError> {
    for (_, range) in parts.ordered() {
        for bound in [&range.start, &range.end] {
            let well_formed =
                bound.len() == 5 && NaiveTime::parse_from_str(bound, "%H:%M").is_ok();
            if !well_formed {
                return Err(SettingsError::InvalidTime(bound.clone()));
            }
        }
    }
    Ok(())
}

/// New categories go just before "other" so it stays last.
pub fn add_intake_category(
    settings: &mut UserSettings,
    label: &str,
) -> Result<IntakeCategory, SettingsError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(SettingsError::BlankLabel);
    }

    let category = IntakeCategory {
        id: Uuid::new_v4().to_string(),
        label: label.to_string(),
        is_deletable: true,
    };
    let categories = &mut settings.intake_categories;
    match categories.iter().position(|c| c.id == OTHER_CATEGORY) {
        Some(index) => categories.insert(index, category.clone()),
        None => categories.push(category.clone()),
    }
    Ok(category)
}

pub fn remove_intake_category(settings: &mut UserSettings, id: &str) -> Result<(), SettingsError> {
    let index = settings
        .intake_categories
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| SettingsError::UnknownCategory(id.to_string()))?;
    if !settings.intake_categories[index].is_deletable {
        return Err(SettingsError::ProtectedCategory(id.to_string()));
    }
    settings.intake_categories.remove(index);
    Ok(())
}

pub fn add_quick_button(
    settings: &mut UserSettings,
    entry_type: EntryType,
    label: &str,
    amount: u32,
) -> Result<QuickButton, SettingsError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(SettingsError::BlankLabel);
    }

    let button = QuickButton {
        id: Uuid::new_v4().to_string(),
        entry_type,
        label: label.to_string(),
        amount,
    };
    settings.quick_buttons.push(button.clone());
    Ok(button)
}

pub fn remove_quick_button(settings: &mut UserSettings, id: &str) -> Result<(), SettingsError> {
    let before = settings.quick_buttons.len();
    settings.quick_buttons.retain(|b| b.id != id);
    if settings.quick_buttons.len() == before {
        return Err(SettingsError::UnknownQuickButton(id.to_string()));
    }
    Ok(())
}

/// Moves the element at `from` to `to`, keeping the others in their relative order.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), SettingsError> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(SettingsError::IndexOutOfRange { from, to, len });
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_ids(settings: &UserSettings) -> Vec<&str> {
        settings.intake_categories.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn missing_fields_are_backfilled_from_defaults() {
        let stored = r#"{"defaultWaterAmount": 330, "age": 41, "dayParts": {"night": {"start": "00:00", "end": "06:59"}}}"#;
        let settings: UserSettings = serde_json::from_str(stored).unwrap();

        assert_eq!(settings.default_water_amount, 330);
        assert_eq!(settings.age, 41);
        assert_eq!(settings.default_urine_amount, 400);
        assert_eq!(settings.amount_increment, 50);
        assert_eq!(settings.quick_buttons.len(), 6);
        assert_eq!(settings.intake_categories.len(), 11);
        assert_eq!(settings.day_parts.night.end, "06:59");
        assert_eq!(settings.day_parts.evening, TimeRange::new("18:00", "23:59"));
    }

    #[test]
    fn sentinels_are_restored() {
        let mut settings = UserSettings {
            intake_categories: vec![IntakeCategory {
                id: "coffee".to_string(),
                label: "Coffee".to_string(),
                is_deletable: true,
            }],
            ..UserSettings::default()
        };

        ensure_sentinels(&mut settings);
        assert_eq!(category_ids(&settings), [NONE_CATEGORY, "coffee", OTHER_CATEGORY]);
    }

    #[test]
    fn new_category_lands_before_other() {
        let mut settings = UserSettings::default();
        let added = add_intake_category(&mut settings, "  Kombucha ").unwrap();

        assert_eq!(added.label, "Kombucha");
        assert!(added.is_deletable);
        let ids = category_ids(&settings);
        assert_eq!(ids[ids.len() - 1], OTHER_CATEGORY);
        assert_eq!(ids[ids.len() - 2], added.id);

        assert_eq!(add_intake_category(&mut settings, "   "), Err(SettingsError::BlankLabel));
    }

    #[test]
    fn sentinel_categories_cannot_be_removed() {
        let mut settings = UserSettings::default();

        assert_eq!(
            remove_intake_category(&mut settings, NONE_CATEGORY),
            Err(SettingsError::ProtectedCategory(NONE_CATEGORY.to_string()))
        );
        assert!(remove_intake_category(&mut settings, "coffee").is_ok());
        assert!(!category_ids(&settings).contains(&"coffee"));
        assert_eq!(
            remove_intake_category(&mut settings, "coffee"),
            Err(SettingsError::UnknownCategory("coffee".to_string()))
        );
    }

    #[test]
    fn quick_buttons_add_and_remove() {
        let mut settings = UserSettings::default();
        let button = add_quick_button(&mut settings, EntryType::Water, "Mug", 300).unwrap();
        assert_eq!(settings.quick_buttons.last(), Some(&button));

        remove_quick_button(&mut settings, &button.id).unwrap();
        assert_eq!(settings.quick_buttons.len(), 6);
        assert!(remove_quick_button(&mut settings, &button.id).is_err());
    }

    #[test]
    fn move_item_keeps_relative_order() {
        let mut items = vec!['a', 'b', 'c', 'd', 'e'];
        move_item(&mut items, 0, 3).unwrap();
        assert_eq!(items, ['b', 'c', 'd', 'a', 'e']);

        move_item(&mut items, 4, 0).unwrap();
        assert_eq!(items, ['e', 'b', 'c', 'd', 'a']);

        move_item(&mut items, 2, 2).unwrap();
        assert_eq!(items, ['e', 'b', 'c', 'd', 'a']);

        assert_eq!(
            move_item(&mut items, 1, 5),
            Err(SettingsError::IndexOutOfRange { from: 1, to: 5, len: 5 })
        );
    }

    #[test]
    fn day_parts_require_padded_times() {
        let mut parts = DayParts::default();
        assert!(validate_day_parts(&parts).is_ok());

        parts.morning.start = "6:00".to_string();
        assert_eq!(
            validate_day_parts(&parts),
            Err(SettingsError::InvalidTime("6:00".to_string()))
        );

        parts.morning.start = "25:00".to_string();
        assert!(validate_day_parts(&parts).is_err());
    }
}
