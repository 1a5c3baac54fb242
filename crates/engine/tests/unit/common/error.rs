//! Error Reporting Tests.

use optsim_engine::common::ConfigError;
use optsim_engine::config::Config;

#[test]
fn messages_name_the_parameter() {
    assert_eq!(
        ConfigError::ZeroSize { what: "ways" }.to_string(),
        "ways must not be zero"
    );
    assert_eq!(
        ConfigError::UnevenSets {
            entries: 10,
            assoc: 4
        }
        .to_string(),
        "10 entries cannot be split into sets of 4 ways"
    );
    assert_eq!(
        ConfigError::PercentOutOfRange {
            what: "confidence_threshold",
            value: 120
        }
        .to_string(),
        "confidence_threshold must be a percentage in 0..=100, got 120"
    );
}

#[test]
fn parse_errors_convert_from_serde() {
    let err = Config::from_json("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("invalid configuration document"));
}
