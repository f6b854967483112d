//! [`SuiteSelector`]: the sole mutator of a session's [`SelectionState`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{
    Category, RECOMMENDED_AUTHENTICATION, RECOMMENDED_CIPHER, RECOMMENDED_KEY_EXCHANGE,
};
use super::SuiteError;

/// Display text for a category with nothing selected.
pub const NOT_SELECTED: &str = "Not Selected";

/// Display text for a selected id with no catalog entry.
pub const UNKNOWN: &str = "Unknown";

/// At most one catalog id per category.
///
/// Values produced by [`SuiteSelector`] always resolve against the catalogs.
/// A state deserialised from elsewhere may not; scoring tolerates that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub cipher: Option<String>,
    pub key_exchange: Option<String>,
    pub authentication: Option<String>,
}

impl SelectionState {
    /// The id selected for `category`, if any.
    pub fn get(&self, category: Category) -> Option<&str> {
        match category {
            Category::Cipher => self.cipher.as_deref(),
            Category::KeyExchange => self.key_exchange.as_deref(),
            Category::Authentication => self.authentication.as_deref(),
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<String> {
        match category {
            Category::Cipher => &mut self.cipher,
            Category::KeyExchange => &mut self.key_exchange,
            Category::Authentication => &mut self.authentication,
        }
    }

    /// `true` iff every category has a selection.
    pub fn is_complete(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_some())
    }

    /// `true` iff no category has a selection.
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_none())
    }

    /// Summary-panel text for `category`.
    pub fn display_name(&self, category: Category) -> &'static str {
        match self.get(category) {
            None => NOT_SELECTED,
            Some(id) => category
                .lookup(id)
                .map(|e| e.display_name)
                .unwrap_or(UNKNOWN),
        }
    }
}

/// Owns a [`SelectionState`] and validates every mutation against the catalogs.
#[derive(Debug, Clone, Default)]
pub struct SuiteSelector {
    state: SelectionState,
}

impl SuiteSelector {
    /// An empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// A selector pre-populated with the recommended suite.
    pub fn recommended() -> Self {
        Self {
            state: SelectionState {
                cipher: Some(RECOMMENDED_CIPHER.to_owned()),
                key_exchange: Some(RECOMMENDED_KEY_EXCHANGE.to_owned()),
                authentication: Some(RECOMMENDED_AUTHENTICATION.to_owned()),
            },
        }
    }

    /// Build a selector from optional ids, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::UnknownCatalogId`] for the first id that does not
    /// resolve in its category.
    pub fn from_ids(
        cipher: Option<&str>,
        key_exchange: Option<&str>,
        authentication: Option<&str>,
    ) -> Result<Self, SuiteError> {
        let mut selector = Self::new();
        let ids = [cipher, key_exchange, authentication];
        for (category, id) in Category::ALL.into_iter().zip(ids) {
            if let Some(id) = id {
                selector.select(category, id)?;
            }
        }
        Ok(selector)
    }

    /// The current selection.
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Select `id` for `category`, leaving the other categories untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::UnknownCatalogId`] if `id` is not in the
    /// category's catalog. The state is unchanged in that case.
    pub fn select(&mut self, category: Category, id: &str) -> Result<&SelectionState, SuiteError> {
        let entry = category
            .lookup(id)
            .ok_or_else(|| SuiteError::UnknownCatalogId {
                category,
                id: id.to_owned(),
            })?;
        *self.state.slot_mut(category) = Some(entry.id.to_owned());
        debug!(%category, id = entry.id, "suite component selected");
        Ok(&self.state)
    }

    /// Clear all three categories. Idempotent.
    pub fn reset(&mut self) -> &SelectionState {
        self.state = SelectionState::default();
        debug!("suite selection reset");
        &self.state
    }

    /// `true` iff all three categories are selected.
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_selector_is_empty() {
        let s = SuiteSelector::new();
        assert!(s.state().is_empty());
        assert!(!s.is_complete());
    }

    #[test]
    fn select_overwrites_only_named_field() {
        let mut s = SuiteSelector::recommended();
        let state = s.select(Category::Cipher, "aes-128-gcm").unwrap().clone();
        assert_eq!(state.cipher.as_deref(), Some("aes-128-gcm"));
        assert_eq!(state.key_exchange.as_deref(), Some(RECOMMENDED_KEY_EXCHANGE));
        assert_eq!(
            state.authentication.as_deref(),
            Some(RECOMMENDED_AUTHENTICATION)
        );
    }

    #[test]
    fn select_rejects_unknown_id_without_mutation() {
        let mut s = SuiteSelector::recommended();
        let before = s.state().clone();
        let err = s.select(Category::Cipher, "rot13").unwrap_err();
        assert!(matches!(
            err,
            SuiteError::UnknownCatalogId { category: Category::Cipher, ref id } if id == "rot13"
        ));
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn select_rejects_id_from_another_catalog() {
        let mut s = SuiteSelector::new();
        assert!(s.select(Category::Authentication, "aes-256-gcm").is_err());
        assert!(s.state().is_empty());
    }

    #[test]
    fn reset_clears_everything_and_is_idempotent() {
        let mut s = SuiteSelector::recommended();
        assert!(s.is_complete());
        assert!(s.reset().is_empty());
        assert!(s.reset().is_empty());
        assert!(!s.is_complete());
    }

    #[test]
    fn complete_only_when_all_three_set() {
        let mut s = SuiteSelector::new();
        s.select(Category::Cipher, "aes-256-gcm").unwrap();
        s.select(Category::KeyExchange, "dhe-2048").unwrap();
        assert!(!s.is_complete());
        s.select(Category::Authentication, "ed25519").unwrap();
        assert!(s.is_complete());
    }

    #[test]
    fn from_ids_validates_each_id() {
        let s = SuiteSelector::from_ids(Some("chacha20-poly1305"), None, Some("ed25519")).unwrap();
        assert_eq!(s.state().cipher.as_deref(), Some("chacha20-poly1305"));
        assert!(s.state().key_exchange.is_none());

        let err = SuiteSelector::from_ids(None, Some("ecdhe-p521"), None).unwrap_err();
        assert!(matches!(
            err,
            SuiteError::UnknownCatalogId { category: Category::KeyExchange, .. }
        ));
    }

    #[test]
    fn display_names() {
        let state = SelectionState {
            cipher: Some("aes-256-cbc".into()),
            key_exchange: Some("made-up".into()),
            authentication: None,
        };
        assert_eq!(state.display_name(Category::Cipher), "AES-256-CBC");
        assert_eq!(state.display_name(Category::KeyExchange), UNKNOWN);
        assert_eq!(state.display_name(Category::Authentication), NOT_SELECTED);
    }

    #[test]
    fn state_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(SuiteSelector::recommended().state()).unwrap();
        assert_eq!(json["keyExchange"], "ecdhe-x25519");
    }
}
