//! Tests for framework configuration loading.

use crate::command::domain::ScopeId;
use crate::config::{ConfigError, FrameworkConfig};
use rstest::rstest;
use std::time::Duration;

#[rstest]
#[case::empty_document("{}", FrameworkConfig::default())]
#[case::partial_document(
    r#"{"prune_remote": false}"#,
    FrameworkConfig::default().with_prune_remote(false)
)]
#[case::numeric_scope_ids(
    r#"{"default_scopes": [42, "43"], "response_timeout_ms": 250}"#,
    FrameworkConfig {
        default_scopes: vec![ScopeId::new(42), ScopeId::new(43)],
        prune_remote: true,
        response_timeout_ms: 250,
    }
)]
fn documents_fill_missing_fields_with_defaults(
    #[case] document: &str,
    #[case] expected: FrameworkConfig,
) {
    let config = FrameworkConfig::from_json(document).expect("valid configuration");

    assert_eq!(config, expected);
}

#[rstest]
#[case::zero_timeout(r#"{"response_timeout_ms": 0}"#)]
#[case::malformed("{\"prune_remote\": ")]
#[case::wrong_type(r#"{"prune_remote": "yes"}"#)]
fn invalid_documents_are_rejected(#[case] document: &str) {
    assert!(FrameworkConfig::from_json(document).is_err());
}

#[rstest]
fn zero_timeout_documents_report_the_timeout() {
    assert!(matches!(
        FrameworkConfig::from_json(r#"{"response_timeout_ms": 0}"#),
        Err(ConfigError::ZeroTimeout)
    ));
}

#[rstest]
#[case::zero(Duration::ZERO)]
#[case::sub_millisecond(Duration::from_micros(999))]
fn builder_rejects_timeouts_below_a_millisecond(#[case] timeout: Duration) {
    assert!(matches!(
        FrameworkConfig::default().with_response_timeout(timeout),
        Err(ConfigError::ZeroTimeout)
    ));
}

#[rstest]
fn builder_keeps_positive_timeouts() {
    let config = FrameworkConfig::default()
        .with_response_timeout(Duration::from_millis(1500))
        .expect("positive timeout");

    assert_eq!(config.response_timeout(), Duration::from_millis(1500));
}
