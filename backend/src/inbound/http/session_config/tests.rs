//! Unit tests for session configuration parsing.

use super::parsing::parse_bool;
use super::*;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create key file");
    file.write_all(&vec![b'k'; len]).expect("write key bytes");
    file
}

#[fixture]
fn full_key() -> NamedTempFile {
    key_file(SESSION_KEY_MIN_LEN)
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn release_vars(key: &NamedTempFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key.path().to_string_lossy().into_owned()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

fn release_error(vars: HashMap<&'static str, String>) -> SessionConfigError {
    match session_settings_from_env(&mock_env(vars), BuildMode::Release) {
        Ok(settings) => panic!("expected release validation to fail, got {settings:?}"),
        Err(error) => error,
    }
}

#[rstest]
fn release_accepts_complete_configuration(full_key: NamedTempFile) {
    let settings = session_settings_from_env(&mock_env(release_vars(&full_key)), BuildMode::Release)
        .expect("valid settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_rejects_missing_toggles(full_key: NamedTempFile, #[case] missing: &'static str) {
    let mut vars = release_vars(&full_key);
    vars.remove(missing);
    let error = release_error(vars);
    assert!(
        matches!(error, SessionConfigError::MissingEnv { name } if name == missing),
        "unexpected error {error}"
    );
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(COOKIE_SECURE_ENV, "")]
#[case(SAMESITE_ENV, "sideways")]
#[case(ALLOW_EPHEMERAL_ENV, "perhaps")]
fn release_rejects_malformed_toggles(
    full_key: NamedTempFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let mut vars = release_vars(&full_key);
    vars.insert(name, value.to_owned());
    let error = release_error(vars);
    assert!(
        matches!(&error, SessionConfigError::InvalidEnv { name: actual, .. } if *actual == name),
        "unexpected error {error}"
    );
}

#[rstest]
fn release_rejects_ephemeral_keys(full_key: NamedTempFile) {
    let mut vars = release_vars(&full_key);
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());
    assert!(matches!(
        release_error(vars),
        SessionConfigError::EphemeralNotAllowed
    ));
}

#[rstest]
fn release_rejects_insecure_same_site_none(full_key: NamedTempFile) {
    let mut vars = release_vars(&full_key);
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());
    assert!(matches!(
        release_error(vars),
        SessionConfigError::InsecureSameSiteNone
    ));
}

#[rstest]
fn release_rejects_short_keys() {
    let short = key_file(SESSION_KEY_MIN_LEN - 1);
    let error = release_error(release_vars(&short));
    assert!(matches!(
        error,
        SessionConfigError::KeyTooShort { length, .. } if length == SESSION_KEY_MIN_LEN - 1
    ));
}

#[rstest]
fn release_rejects_unreadable_key_file(full_key: NamedTempFile) {
    let mut vars = release_vars(&full_key);
    let missing = full_key.path().with_extension("missing");
    vars.insert(KEY_FILE_ENV, missing.to_string_lossy().into_owned());
    assert!(matches!(
        release_error(vars),
        SessionConfigError::KeyRead { .. }
    ));
}

#[rstest]
fn debug_defaults_to_secure_lax_cookies() {
    let env = mock_env(HashMap::from([(
        KEY_FILE_ENV,
        "/nonexistent/registrar/session_key".to_owned(),
    )]));
    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_tolerates_malformed_values(full_key: NamedTempFile) {
    let mut vars = release_vars(&full_key);
    vars.insert(SAMESITE_ENV, "unexpected".to_owned());
    vars.insert(COOKIE_SECURE_ENV, "perhaps".to_owned());
    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug fallback");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_accepts_short_keys() {
    let short = key_file(8);
    let settings = session_settings_from_env(&mock_env(release_vars(&short)), BuildMode::Debug);
    assert!(settings.is_ok());
}

#[rstest]
fn same_key_file_derives_same_key(full_key: NamedTempFile) {
    let first = session_settings_from_env(&mock_env(release_vars(&full_key)), BuildMode::Release)
        .expect("first read");
    let second = session_settings_from_env(&mock_env(release_vars(&full_key)), BuildMode::Release)
        .expect("second read");
    assert_eq!(first.key.master(), second.key.master());
}

#[rstest]
#[case("1", Some(true))]
#[case(" Yes ", Some(true))]
#[case("n", Some(false))]
#[case("FALSE", Some(false))]
#[case("2", None)]
fn parses_boolean_toggles(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parse_bool(raw), expected);
}
