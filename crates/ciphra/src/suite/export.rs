//! Portable snapshot of a suite selection and its security metrics.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::Category;
use super::score::CompositeScore;
use super::selector::SelectionState;

/// File name offered when an [`ExportRecord`] is downloaded.
pub const EXPORT_FILE_NAME: &str = "ciphra-cipher-suite-config.json";

/// Value of [`ExportRecord::generated_by`].
pub const GENERATED_BY: &str = "Ciphra Configuration Tool";

/// An algorithm reference inside an export.
///
/// Fields are absent (omitted from JSON) when the category is unset or the id
/// does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_secrecy: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedSuite {
    pub cipher: AlgorithmRef,
    pub key_exchange: AlgorithmRef,
    pub authentication: AlgorithmRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityMetrics {
    pub overall_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_strength: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_exchange_strength: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_strength: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_secrecy: Option<bool>,
}

/// Downloadable suite configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub cipher_suite: ExportedSuite,
    pub security_metrics: SecurityMetrics,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub exported_at: String,
    pub generated_by: String,
}

impl ExportRecord {
    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn algorithm_ref(state: &SelectionState, category: Category, with_fs: bool) -> AlgorithmRef {
    let id = state.get(category);
    let entry = id.and_then(|id| category.lookup(id));
    AlgorithmRef {
        algorithm: id.map(str::to_owned),
        name: entry.map(|e| e.display_name.to_owned()),
        forward_secrecy: if with_fs {
            entry.and_then(|e| e.forward_secrecy)
        } else {
            None
        },
    }
}

/// Assemble an [`ExportRecord`] from `state` and its `score`.
///
/// Strengths are only reported for ids that resolve. `state` is not modified.
pub fn build_export_record(state: &SelectionState, score: &CompositeScore) -> ExportRecord {
    let resolved_strength = |category: Category| {
        state
            .get(category)
            .and_then(|id| category.lookup(id))
            .map(|e| e.strength)
    };
    let kex_fs = state
        .get(Category::KeyExchange)
        .and_then(|id| Category::KeyExchange.lookup(id))
        .and_then(|e| e.forward_secrecy);

    ExportRecord {
        cipher_suite: ExportedSuite {
            cipher: algorithm_ref(state, Category::Cipher, false),
            key_exchange: algorithm_ref(state, Category::KeyExchange, true),
            authentication: algorithm_ref(state, Category::Authentication, false),
        },
        security_metrics: SecurityMetrics {
            overall_score: score.overall_percent,
            encryption_strength: resolved_strength(Category::Cipher),
            key_exchange_strength: resolved_strength(Category::KeyExchange),
            authentication_strength: resolved_strength(Category::Authentication),
            forward_secrecy: kex_fs,
        },
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        generated_by: GENERATED_BY.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::score::score;
    use crate::suite::selector::SuiteSelector;

    #[test]
    fn recommended_suite_export_shape() {
        let sel = SuiteSelector::recommended();
        let record = build_export_record(sel.state(), &score(sel.state()));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["cipherSuite"]["cipher"]["algorithm"], "aes-256-gcm");
        assert_eq!(json["cipherSuite"]["cipher"]["name"], "AES-256-GCM");
        assert!(json["cipherSuite"]["cipher"].get("forwardSecrecy").is_none());
        assert_eq!(json["cipherSuite"]["keyExchange"]["name"], "ECDHE-X25519");
        assert_eq!(json["cipherSuite"]["keyExchange"]["forwardSecrecy"], true);
        assert_eq!(json["cipherSuite"]["authentication"]["algorithm"], "ecdsa-p256");
        assert_eq!(json["securityMetrics"]["overallScore"], 95);
        assert_eq!(json["securityMetrics"]["encryptionStrength"], 95);
        assert_eq!(json["securityMetrics"]["keyExchangeStrength"], 95);
        assert_eq!(json["securityMetrics"]["authenticationStrength"], 95);
        assert_eq!(json["securityMetrics"]["forwardSecrecy"], true);
        assert_eq!(json["generatedBy"], GENERATED_BY);
    }

    #[test]
    fn exported_at_is_iso8601_utc() {
        let sel = SuiteSelector::recommended();
        let record = build_export_record(sel.state(), &score(sel.state()));
        let parsed = chrono::DateTime::parse_from_rfc3339(&record.exported_at).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert!(record.exported_at.ends_with('Z'));
    }

    #[test]
    fn export_does_not_mutate_state() {
        let sel = SuiteSelector::recommended();
        let before = sel.state().clone();
        let _ = build_export_record(sel.state(), &score(sel.state()));
        assert_eq!(sel.state(), &before);
    }

    #[test]
    fn weak_key_exchange_reports_no_forward_secrecy() {
        let mut sel = SuiteSelector::recommended();
        sel.select(Category::KeyExchange, "rsa-2048").unwrap();
        let record = build_export_record(sel.state(), &score(sel.state()));
        assert_eq!(record.cipher_suite.key_exchange.forward_secrecy, Some(false));
        assert_eq!(record.security_metrics.forward_secrecy, Some(false));
        assert_eq!(record.security_metrics.key_exchange_strength, Some(60));
        assert_eq!(record.security_metrics.overall_score, 83);
    }

    #[test]
    fn unset_components_are_omitted() {
        let sel = SuiteSelector::from_ids(None, None, Some("ed25519")).unwrap();
        let record = build_export_record(sel.state(), &score(sel.state()));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["cipherSuite"]["cipher"], serde_json::json!({}));
        assert!(json["securityMetrics"].get("encryptionStrength").is_none());
        assert_eq!(json["securityMetrics"]["overallScore"], 98);
    }

    #[test]
    fn pretty_json_round_trips() {
        let sel = SuiteSelector::recommended();
        let record = build_export_record(sel.state(), &score(sel.state()));
        let text = record.to_json_pretty().unwrap();
        assert!(text.contains("\n  \"cipherSuite\""));
        let back: ExportRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }
}
