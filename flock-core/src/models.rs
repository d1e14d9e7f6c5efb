use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{OptionSetError, ValidationError};

/// Last id handed out by this process, so two ids issued in the same
/// millisecond still differ
static LAST_ISSUED_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque identifier of an option, stable across reorders
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct OptionId(pub u64);

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OptionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(OptionId)
    }
}

/// Issues a time-based id strictly greater than every id in `taken` and than
/// every id previously issued by this process.
///
/// When no greater id exists (a stored id at `u64::MAX`) the lowest id not
/// in `taken` is handed out instead.
pub fn next_time_id(taken: &[u64]) -> u64 {
    let floor = taken.iter().copied().max().unwrap_or(0);
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let mut last = LAST_ISSUED_ID.load(Ordering::Relaxed);
    loop {
        let candidate = match (last.checked_add(1), floor.checked_add(1)) {
            (Some(after_last), Some(after_floor)) => now.max(after_last).max(after_floor),
            _ => {
                log::warn!("Id space exhausted above {}; reusing a free id", floor);
                return lowest_free_id(taken);
            }
        };
        match LAST_ISSUED_ID.compare_exchange_weak(
            last,
            candidate,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

fn lowest_free_id(taken: &[u64]) -> u64 {
    let used: HashSet<u64> = taken.iter().copied().collect();
    (1..u64::MAX).find(|id| !used.contains(id)).unwrap_or(0)
}

/// One selectable choice within an option set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionItem {
    pub id: OptionId,
    pub label: String,
    pub value: String,
    /// Presentational tag (e.g. "sun"), never interpreted by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl OptionItem {
    /// Creates an option with the given id, label and value
    pub fn new(id: u64, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: OptionId(id),
            label: label.into(),
            value: value.into(),
            icon: None,
        }
    }

    /// Attaches an icon tag
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Shorthand for the common case where the label doubles as the value
    pub fn labelled(id: u64, text: &str) -> Self {
        Self::new(id, text, text)
    }
}

/// Input for adding a new option
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionDraft {
    pub label: String,
    pub value: String,
    pub icon: Option<String>,
}

impl OptionDraft {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            icon: None,
        }
    }

    /// Checks that both label and value are present
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_label_value(&self.label, &self.value)
    }
}

/// Mutable fields of an existing option
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionFields {
    pub label: String,
    pub value: String,
}

impl OptionFields {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_label_value(&self.label, &self.value)
    }
}

fn validate_label_value(label: &str, value: &str) -> Result<(), ValidationError> {
    if label.trim().is_empty() {
        return Err(ValidationError::EmptyLabel);
    }
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyValue);
    }
    Ok(())
}

// =========================================================================
// Sequence operations
//
// Each returns a fresh sequence; the input is never modified in place.
// =========================================================================

/// Returns `options` with a new entry built from `draft` appended at the end
pub fn appended(options: &[OptionItem], draft: OptionDraft) -> Result<Vec<OptionItem>, ValidationError> {
    draft.validate()?;
    let taken: Vec<u64> = options.iter().map(|o| o.id.0).collect();
    let mut next = options.to_vec();
    next.push(OptionItem {
        id: OptionId(next_time_id(&taken)),
        label: draft.label,
        value: draft.value,
        icon: draft.icon,
    });
    Ok(next)
}

/// Returns `options` with the entry matching `id` given new label/value.
/// The entry keeps its id, icon and position. An unknown id yields an
/// unchanged copy.
pub fn edited(
    options: &[OptionItem],
    id: OptionId,
    fields: OptionFields,
) -> Result<Vec<OptionItem>, ValidationError> {
    fields.validate()?;
    Ok(options
        .iter()
        .map(|o| {
            if o.id == id {
                OptionItem {
                    label: fields.label.clone(),
                    value: fields.value.clone(),
                    ..o.clone()
                }
            } else {
                o.clone()
            }
        })
        .collect())
}

/// Returns `options` without the entry matching `id`
pub fn removed(options: &[OptionItem], id: OptionId) -> Vec<OptionItem> {
    options.iter().filter(|o| o.id != id).cloned().collect()
}

/// Moves the entry at `from` to `to`. `to` indexes the sequence after the
/// entry has been taken out, so dragging forward lands one slot later than
/// the pre-removal position would suggest.
pub fn reordered(options: &[OptionItem], from: usize, to: usize) -> Result<Vec<OptionItem>, OptionSetError> {
    let len = options.len();
    for index in [from, to] {
        if index >= len {
            return Err(OptionSetError::IndexOutOfRange { index, len });
        }
    }

    let mut next = options.to_vec();
    if from != to {
        let item = next.remove(from);
        next.insert(to, item);
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn breeds() -> Vec<OptionItem> {
        vec![
            OptionItem::labelled(1, "黑羽土雞"),
            OptionItem::labelled(2, "白羽土雞"),
        ]
    }

    fn ids(options: &[OptionItem]) -> Vec<u64> {
        options.iter().map(|o| o.id.0).collect()
    }

    #[test]
    fn test_appended_assigns_fresh_ids() {
        let mut options = breeds();
        for i in 0..50 {
            options = appended(&options, OptionDraft::new(format!("L{}", i), "v")).unwrap();
        }

        let unique: HashSet<u64> = ids(&options).into_iter().collect();
        assert_eq!(unique.len(), options.len());
        assert_eq!(options.last().unwrap().label, "L49");
    }

    #[test]
    fn test_appended_after_max_id_picks_free_id() {
        let options = vec![OptionItem::labelled(u64::MAX, "X")];
        let next = appended(&options, OptionDraft::new("a", "a")).unwrap();
        assert_eq!(ids(&next), vec![u64::MAX, 1]);

        let next = appended(&next, OptionDraft::new("b", "b")).unwrap();
        assert_eq!(ids(&next), vec![u64::MAX, 1, 2]);
    }

    #[test]
    fn test_next_time_id_exceeds_taken() {
        let id = next_time_id(&[5, 9, 7]);
        assert!(id > 9);
        assert!(next_time_id(&[]) > id);
    }

    #[test]
    fn test_appended_rejects_empty_fields() {
        let options = breeds();
        assert_eq!(
            appended(&options, OptionDraft::new("  ", "x")),
            Err(ValidationError::EmptyLabel)
        );
        assert_eq!(
            appended(&options, OptionDraft::new("x", "")),
            Err(ValidationError::EmptyValue)
        );
    }

    #[test]
    fn test_id_not_reused_after_removal() {
        let options = appended(&breeds(), OptionDraft::new("紅羽土雞", "紅羽土雞")).unwrap();
        let last = options.last().unwrap().id;
        let options = removed(&options, last);
        let options = appended(&options, OptionDraft::new("花羽土雞", "花羽土雞")).unwrap();
        assert!(options.last().unwrap().id > last);
    }

    #[test]
    fn test_edited_preserves_position_and_icon() {
        let options = vec![
            OptionItem::labelled(1, "晴天").with_icon("sun"),
            OptionItem::labelled(2, "多雲").with_icon("cloud"),
            OptionItem::labelled(3, "雨天").with_icon("rain"),
        ];
        let next = edited(&options, OptionId(2), OptionFields::new("陰天", "陰天")).unwrap();

        assert_eq!(ids(&next), vec![1, 2, 3]);
        assert_eq!(next[1].label, "陰天");
        assert_eq!(next[1].icon.as_deref(), Some("cloud"));
    }

    #[test]
    fn test_edited_unknown_id_is_noop() {
        let options = breeds();
        let next = edited(&options, OptionId(99), OptionFields::new("a", "b")).unwrap();
        assert_eq!(next, options);
    }

    #[test]
    fn test_removed_absent_id_is_identity() {
        let options = breeds();
        assert_eq!(removed(&options, OptionId(42)), options);
    }

    #[test]
    fn test_reordered_uses_post_removal_index() {
        let options: Vec<OptionItem> = (1..=4).map(|i| OptionItem::labelled(i, "x")).collect();

        assert_eq!(ids(&reordered(&options, 0, 2).unwrap()), vec![2, 3, 1, 4]);
        assert_eq!(ids(&reordered(&options, 3, 0).unwrap()), vec![4, 1, 2, 3]);
        assert_eq!(ids(&reordered(&options, 1, 3).unwrap()), vec![1, 3, 4, 2]);
        assert_eq!(ids(&reordered(&options, 2, 2).unwrap()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reordered_keeps_relative_order_of_others() {
        let options: Vec<OptionItem> = (1..=6).map(|i| OptionItem::labelled(i, "x")).collect();
        for from in 0..6 {
            for to in 0..6 {
                let next = reordered(&options, from, to).unwrap();
                assert_eq!(next[to].id, options[from].id);

                let rest_before: Vec<u64> = ids(&options)
                    .into_iter()
                    .filter(|&id| id != options[from].id.0)
                    .collect();
                let rest_after: Vec<u64> = ids(&next)
                    .into_iter()
                    .filter(|&id| id != options[from].id.0)
                    .collect();
                assert_eq!(rest_before, rest_after);
            }
        }
    }

    #[test]
    fn test_reordered_out_of_range() {
        let options = breeds();
        assert_eq!(
            reordered(&options, 0, 2),
            Err(OptionSetError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_option_serialization_omits_missing_icon() {
        let json = serde_json::to_string(&OptionItem::labelled(1, "A")).unwrap();
        assert_eq!(json, r#"{"id":1,"label":"A","value":"A"}"#);

        let parsed: OptionItem =
            serde_json::from_str(r#"{"id":3,"label":"雨天","value":"雨天","icon":"rain"}"#).unwrap();
        assert_eq!(parsed.icon.as_deref(), Some("rain"));
    }
}
