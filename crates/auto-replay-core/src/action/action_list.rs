use crate::{CoreResult, action::{Action, clamp_delay}};

use std::{ops::Index, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};
use tracing::warn;

/// Ordered list of actions. List order is replay order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActionList(Vec<Action>);

impl ActionList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of actions. Malformed entries are skipped.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize as a pretty-printed JSON array.
    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no actions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Action at `index`.
    pub fn get(&self, index: usize) -> Option<&Action> {
        self.0.get(index)
    }

    /// Iterate in replay order.
    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.0.iter()
    }

    /// Borrow the actions as a slice.
    pub fn as_slice(&self) -> &[Action] {
        &self.0
    }

    /// Append an action.
    pub fn push(&mut self, action: Action) {
        self.0.push(action);
    }

    /// Insert at `index`, appending if `index` is past the end.
    pub fn insert(&mut self, index: usize, action: Action) {
        if index >= self.0.len() {
            self.0.push(action);
        } else {
            self.0.insert(index, action);
        }
    }

    /// Remove and return the action at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Action> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    /// Remove every action.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Set the delay of every action. Negative values become zero.
    pub fn set_all_delays(&mut self, delay_ms: i64) {
        let delay = clamp_delay(delay_ms);
        for action in &mut self.0 {
            action.delay = delay;
        }
    }

    /// Mark the action at `index` as the insertion point and unmark the rest.
    ///
    /// An index equal to the length marks nothing (insertion at the end).
    pub fn mark_insertion_point(&mut self, index: usize) {
        for (i, action) in self.0.iter_mut().enumerate() {
            action.is_insertion_point = i == index;
            action.is_visually_deselected = false;
        }
    }

    /// Clear every insertion marker.
    pub fn clear_insertion_markers(&mut self) {
        for action in &mut self.0 {
            action.is_insertion_point = false;
            action.is_visually_deselected = false;
        }
    }

    /// Hide insertion markers without clearing them.
    pub fn deselect_insertion_markers(&mut self) {
        for action in self.0.iter_mut().filter(|a| a.is_insertion_point) {
            action.is_visually_deselected = true;
        }
    }

    /// Immutable copy for a replay run.
    pub fn snapshot(&self) -> Arc<[Action]> {
        Arc::from(self.0.as_slice())
    }

    /// Consume the list.
    pub fn into_inner(self) -> Vec<Action> {
        self.0
    }
}

impl From<Vec<Action>> for ActionList {
    fn from(actions: Vec<Action>) -> Self {
        Self(actions)
    }
}

impl FromIterator<Action> for ActionList {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Index<usize> for ActionList {
    type Output = Action;

    fn index(&self, index: usize) -> &Action {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a ActionList {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientAction {
    Valid(Action),
    Invalid(IgnoredAny),
}

impl<'de> Deserialize<'de> for ActionList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<LenientAction>::deserialize(deserializer)?;
        let total = entries.len();
        let actions: Vec<Action> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                LenientAction::Valid(action) => Some(action),
                LenientAction::Invalid(_) => None,
            })
            .collect();

        if actions.len() < total {
            warn!(
                skipped = total - actions.len(),
                kept = actions.len(),
                "Skipped malformed actions"
            );
        }

        Ok(Self(actions))
    }
}
