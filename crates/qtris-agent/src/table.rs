use std::collections::HashMap;

use qtris_engine::Action;

use crate::encoding::StateKey;

/// Action-value table: `state -> action -> value`, with 0.0 for unseen pairs.
///
/// # Example
///
/// ```
/// use qtris_agent::{QTable, StateKey};
/// use qtris_engine::Action;
///
/// let mut table = QTable::new();
/// let state = StateKey::new(vec![1, 2, 3]);
/// let (a, b) = (Action::new(0, 0), Action::new(1, 4));
///
/// table.update(&state, b, 2.0, 0.5);
/// assert_eq!(table.get(&state, a), 0.0);
/// assert_eq!(table.get(&state, b), 1.0);
/// assert_eq!(table.best_action(&state, &[a, b]), Some(b));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    values: HashMap<StateKey, HashMap<Action, f32>>,
}

impl QTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of states with at least one stored value.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.values.len()
    }

    /// Number of stored `(state, action)` values.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn get(&self, state: &StateKey, action: Action) -> f32 {
        self.values
            .get(state)
            .and_then(|actions| actions.get(&action))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn set(&mut self, state: StateKey, action: Action, value: f32) {
        self.values.entry(state).or_default().insert(action, value);
    }

    /// Highest value among `actions` in `state`; 0.0 when `actions` is empty.
    #[must_use]
    pub fn max_value(&self, state: &StateKey, actions: &[Action]) -> f32 {
        actions
            .iter()
            .map(|&action| self.get(state, action))
            .reduce(f32::max)
            .unwrap_or(0.0)
    }

    /// Action with the highest value; the earliest one in `actions` wins ties.
    #[must_use]
    pub fn best_action(&self, state: &StateKey, actions: &[Action]) -> Option<Action> {
        let mut best: Option<(Action, f32)> = None;
        for &action in actions {
            let value = self.get(state, action);
            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((action, value));
            }
        }
        best.map(|(action, _)| action)
    }

    /// Moves the value of `(state, action)` toward `target` by the fraction `alpha`.
    pub fn update(&mut self, state: &StateKey, action: Action, target: f32, alpha: f32) {
        let value = self
            .values
            .entry(state.clone())
            .or_default()
            .entry(action)
            .or_insert(0.0);
        *value += alpha * (target - *value);
    }

    /// Iterates over every stored value.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, Action, f32)> {
        self.values.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(&action, &value)| (state, action, value))
        })
    }
}

impl FromIterator<(StateKey, Action, f32)> for QTable {
    fn from_iter<T: IntoIterator<Item = (StateKey, Action, f32)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (state, action, value) in iter {
            table.set(state, action, value);
        }
        table
    }
}
