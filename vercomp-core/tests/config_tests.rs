//! Config load error messages and validation rules.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use vercomp_core::{
    config::{self, PASSWORD_ENV},
    AuthConfig, ConfigError, Selection,
};

const VALID: &str = "\
base_url: http://localhost:8080
auth:
  method: basic
  user: jdoe
  password: hunter2
source_project: SRCPROJ
dest_project: DESTPROJ
components: all
versions:
  - \"1.0\"
  - \"1.1\"
unarchive: true
";

fn write_config(contents: &str) -> assert_fs::TempDir {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("config.yaml").write_str(contents).expect("write");
    dir
}

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

#[test]
fn load_valid_config() {
    let dir = write_config(VALID);
    let config = config::load_at(&dir.path().join("config.yaml")).expect("load");
    assert_eq!(config.source_project.as_str(), "SRCPROJ");
    assert_eq!(config.dest_project.as_str(), "DESTPROJ");
    assert_eq!(config.components, Selection::All);
    assert_eq!(config.versions, Selection::named(["1.0", "1.1"]));
    assert!(config.unarchive);
    assert!(matches!(config.auth, AuthConfig::Basic { .. }));
}

#[test]
fn load_missing_config_returns_not_found() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(&dir.path().join("config.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let dir = write_config(": : corrupt : yaml : !!!\n  - broken: [unclosed");
    let err = config::load_at(&dir.path().join("config.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn unknown_auth_method_is_a_parse_error() {
    let dir = write_config(&VALID.replace("method: basic", "method: kerberos"));
    let err = config::load_at(&dir.path().join("config.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn file_is_left_untouched_by_load() {
    let dir = write_config(VALID);
    config::load_at(&dir.path().join("config.yaml")).expect("load");
    dir.child("config.yaml").assert(predicate::str::contains("hunter2"));
}

// ---------------------------------------------------------------------------
// 2. Validation
// ---------------------------------------------------------------------------

#[rstest]
#[case::bad_url("base_url: http://localhost:8080", "base_url: localhost:8080", "base_url")]
#[case::empty_host("base_url: http://localhost:8080", "base_url: https://", "base_url")]
#[case::lowercase_key("source_project: SRCPROJ", "source_project: srcproj", "source_project")]
#[case::same_project("dest_project: DESTPROJ", "dest_project: SRCPROJ", "dest_project")]
#[case::empty_user("user: jdoe", "user: \"\"", "auth.user")]
#[case::empty_list("components: all", "components: []", "components")]
#[case::zero_timeout("unarchive: true", "unarchive: true\ntimeout_secs: 0", "timeout_secs")]
fn invalid_fields_are_named(#[case] from: &str, #[case] to: &str, #[case] field: &str) {
    let dir = write_config(&VALID.replace(from, to));
    let err = config::load_at(&dir.path().join("config.yaml")).unwrap_err();
    match err {
        ConfigError::Invalid { field: got, .. } => assert_eq!(got, field),
        other => panic!("expected Invalid({field}), got: {other}"),
    }
}

#[test]
fn nothing_to_copy_is_rejected() {
    let contents = VALID
        .replace("components: all\n", "")
        .replace("versions:\n  - \"1.0\"\n  - \"1.1\"\n", "versions: none\n");
    let config = config::parse(&contents, std::path::Path::new("c.yaml")).expect("parse");
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("nothing to copy"), "got: {err}");
}

#[test]
fn missing_password_mentions_env_var() {
    let contents = VALID.replace("  password: hunter2\n", "");
    let config = config::parse(&contents, std::path::Path::new("c.yaml")).expect("parse");
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains(PASSWORD_ENV), "got: {err}");
}

#[test]
fn token_auth_requires_token() {
    let contents = VALID.replace(
        "  method: basic\n  user: jdoe\n  password: hunter2\n",
        "  method: token\n",
    );
    let mut config = config::parse(&contents, std::path::Path::new("c.yaml")).expect("parse");
    config.fill_secrets(|_| None);
    let err = config.validate().unwrap_err();
    assert!(
        matches!(err, ConfigError::Invalid { field: "auth.token", .. }),
        "got: {err}"
    );
}
