use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("site_settings_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("site.toml");
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn defaults_match_page_script_constants() {
    let settings = Settings::default();
    assert_eq!(settings.form_endpoint, "http://localhost:3000/send-email");
    assert_eq!(settings.toast_dismiss_delay(), Duration::from_millis(5000));
}

#[test]
fn reads_values_from_settings_file() {
    let path = temp_settings_file(
        "form_endpoint = \"https://mail.example.com/contact\"\ntoast_dismiss_ms = 2500\n",
    );

    let mut settings = Settings::default();
    apply_file(&mut settings, &fs::read_to_string(&path).expect("read"));
    assert_eq!(settings.form_endpoint, "https://mail.example.com/contact");
    assert_eq!(settings.toast_dismiss_ms, 2500);

    if let Some(dir) = path.parent() {
        fs::remove_dir_all(dir).expect("cleanup");
    }
}

#[test]
fn malformed_or_negative_values_are_ignored() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "form_endpoint = ");
    assert_eq!(settings, Settings::default());

    apply_file(&mut settings, "toast_dismiss_ms = -10");
    assert_eq!(settings.toast_dismiss_ms, DEFAULT_TOAST_DISMISS_MS);
}

#[test]
fn app_prefixed_environment_wins() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("FORM_ENDPOINT", "http://plain.example/send"),
        ("APP__FORM_ENDPOINT", "http://app.example/send"),
        ("APP__TOAST_DISMISS_MS", "750"),
    ]);

    let mut settings = Settings::default();
    apply_overrides(&mut settings, |key| env.get(key).map(|v| v.to_string()));
    assert_eq!(settings.form_endpoint, "http://app.example/send");
    assert_eq!(settings.toast_dismiss_ms, 750);
}

#[test]
fn endpoint_url_rejects_garbage_and_other_schemes() {
    let mut settings = Settings::default();
    assert!(settings.endpoint_url().is_ok());

    settings.form_endpoint = "not a url".into();
    assert!(matches!(
        settings.endpoint_url(),
        Err(ClientError::InvalidEndpoint { .. })
    ));

    settings.form_endpoint = "ftp://example.com/send".into();
    assert!(matches!(
        settings.endpoint_url(),
        Err(ClientError::UnsupportedScheme(scheme)) if scheme == "ftp"
    ));
}

#[test]
fn missing_settings_file_keeps_defaults() {
    let settings = load_settings_from(Path::new("/nonexistent/site.toml"));
    assert!(!settings.form_endpoint.is_empty());
}
