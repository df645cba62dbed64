//! Per-slot value lists and their normalization to the feature count.

/// A per-slot assignment as callers supply it: nothing, a single value for the
/// first slot, or one value per slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SlotValues<T> {
    #[default]
    Absent,
    One(T),
    Many(Vec<Option<T>>),
}

impl<T> SlotValues<T> {
    /// Expand to a list of exactly `max(len, slots)` entries, padding with `None`.
    pub fn into_slots(self, slots: usize) -> Vec<Option<T>>
    where
        T: Clone,
    {
        let mut values = match self {
            SlotValues::Absent => Vec::new(),
            SlotValues::One(value) => vec![Some(value)],
            SlotValues::Many(values) => values,
        };
        pad_slots(&mut values, slots, None);
        values
    }
}

impl From<&str> for SlotValues<String> {
    fn from(value: &str) -> Self {
        SlotValues::One(value.to_string())
    }
}

impl From<String> for SlotValues<String> {
    fn from(value: String) -> Self {
        SlotValues::One(value)
    }
}

impl<T> From<Option<T>> for SlotValues<String>
where
    T: Into<SlotValues<String>>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<Vec<&str>> for SlotValues<String> {
    fn from(values: Vec<&str>) -> Self {
        SlotValues::Many(values.into_iter().map(|v| Some(v.to_string())).collect())
    }
}

impl From<Vec<String>> for SlotValues<String> {
    fn from(values: Vec<String>) -> Self {
        SlotValues::Many(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<String>>> for SlotValues<String> {
    fn from(values: Vec<Option<String>>) -> Self {
        SlotValues::Many(values)
    }
}

impl From<Vec<Option<&str>>> for SlotValues<String> {
    fn from(values: Vec<Option<&str>>) -> Self {
        SlotValues::Many(
            values
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect(),
        )
    }
}

/// Right-pad `values` with `fill` up to `len`. Longer lists are left untouched.
pub fn pad_slots<T: Clone>(values: &mut Vec<T>, len: usize, fill: T) {
    if values.len() < len {
        values.resize(len, fill);
    }
}
