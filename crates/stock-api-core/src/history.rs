use serde::{Deserialize, Serialize};

use crate::bar::Bar;

/// Daily bars for one symbol, strictly ascending by date.
///
/// Deserialization goes through `from_bars`, so the ordering holds for any input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct History(Vec<Bar>);

impl History {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a history from bars in any order.
    /// Bars are sorted by date; when a date repeats, the first bar seen wins.
    pub fn from_bars(mut bars: Vec<Bar>) -> Self {
        // stable sort keeps arrival order among equal dates
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self(bars)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Bar>> for History {
    fn from(bars: Vec<Bar>) -> Self {
        Self::from_bars(bars)
    }
}

impl From<History> for Vec<Bar> {
    fn from(history: History) -> Self {
        history.0
    }
}

impl IntoIterator for History {
    type Item = Bar;
    type IntoIter = std::vec::IntoIter<Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
