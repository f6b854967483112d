//! Composite security score derived from a [`SelectionState`].
//!
//! Scoring is a pure function and never fails: a selected id that does not
//! resolve in its catalog contributes a strength of 0.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::Category;
use super::selector::SelectionState;

/// Per-component strength label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Fair,
    Weak,
}

impl Label {
    /// Step function over a component strength. Lower bounds are inclusive.
    pub fn for_strength(strength: u8) -> Self {
        match strength {
            95.. => Label::Excellent,
            85..=94 => Label::VeryGood,
            75..=84 => Label::Good,
            65..=74 => Label::Fair,
            _ => Label::Weak,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Excellent => "Excellent",
            Label::VeryGood => "Very Good",
            Label::Good => "Good",
            Label::Fair => "Fair",
            Label::Weak => "Weak",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse banding of the overall percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    /// 90 and above.
    Strong,
    /// 70 to 89.
    Moderate,
    Weak,
}

impl ScoreTier {
    pub fn for_percent(percent: u8) -> Self {
        match percent {
            90.. => ScoreTier::Strong,
            70..=89 => ScoreTier::Moderate,
            _ => ScoreTier::Weak,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScoreTier::Strong => "strong",
            ScoreTier::Moderate => "moderate",
            ScoreTier::Weak => "weak",
        }
    }
}

/// Labels for each selected component; `None` where nothing is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentLabels {
    pub cipher: Option<Label>,
    pub key_exchange: Option<Label>,
    pub authentication: Option<Label>,
}

impl ComponentLabels {
    pub fn get(&self, category: Category) -> Option<Label> {
        match category {
            Category::Cipher => self.cipher,
            Category::KeyExchange => self.key_exchange,
            Category::Authentication => self.authentication,
        }
    }
}

/// Derived rating of a selection. Never stored; recompute on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeScore {
    /// Rounded mean of the selected strengths, 0 when nothing is selected.
    pub overall_percent: u8,
    pub per_component: ComponentLabels,
    /// Taken from the key-exchange entry only; `None` when no key exchange is selected.
    pub forward_secrecy: Option<bool>,
}

impl CompositeScore {
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::for_percent(self.overall_percent)
    }
}

/// Strength of the component selected for `category`.
///
/// `None` when unset, `Some(0)` when the id does not resolve.
pub fn component_strength(state: &SelectionState, category: Category) -> Option<u8> {
    state
        .get(category)
        .map(|id| category.lookup(id).map_or(0, |e| e.strength))
}

/// Compute the [`CompositeScore`] for `state`.
pub fn score(state: &SelectionState) -> CompositeScore {
    let mut labels = ComponentLabels::default();
    let mut total: u32 = 0;
    let mut count: u32 = 0;

    for category in Category::ALL {
        let Some(strength) = component_strength(state, category) else {
            continue;
        };
        total += u32::from(strength);
        count += 1;
        let label = Some(Label::for_strength(strength));
        match category {
            Category::Cipher => labels.cipher = label,
            Category::KeyExchange => labels.key_exchange = label,
            Category::Authentication => labels.authentication = label,
        }
    }

    let forward_secrecy = state.key_exchange.as_deref().map(|id| {
        Category::KeyExchange
            .lookup(id)
            .and_then(|e| e.forward_secrecy)
            .unwrap_or(false)
    });

    CompositeScore {
        overall_percent: rounded_mean(total, count),
        per_component: labels,
        forward_secrecy,
    }
}

/// Mean rounded to nearest with halves rounding up; 0 for an empty set.
fn rounded_mean(total: u32, count: u32) -> u8 {
    if count == 0 {
        return 0;
    }
    // Strengths are capped at 100, so the mean always fits.
    ((2 * total + count) / (2 * count)).min(100) as u8
}
