use super::*;

use std::{
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

fn temp_settings_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("vqa_proxy_settings_{suffix}.toml"));
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = load_settings_from(Path::new("/nonexistent/proxy.toml"), no_env);
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.backend_url, "http://localhost:8000/ask-question");
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        "bind_addr = \"0.0.0.0:9000\"\nbackend_url = \"http://vqa:5000/api/ask\"\n",
    );
    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.bind_addr, "0.0.0.0:9000");
    assert_eq!(settings.backend_url, "http://vqa:5000/api/ask");
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn env_overrides_file_and_blank_env_is_ignored() {
    let path = temp_settings_file("backend_url = \"http://from-file:5000/api/ask\"\n");
    let settings = load_settings_from(&path, |key| match key {
        "PYTHON_BACKEND_URL" => Some("http://from-env:5000/api/ask".into()),
        "PROXY_BIND" => Some("   ".into()),
        _ => None,
    });
    assert_eq!(settings.backend_url, "http://from-env:5000/api/ask");
    assert_eq!(settings.bind_addr, Settings::default().bind_addr);
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn asset_origin_strips_endpoint_path_and_query() {
    let backend = parse_backend_url("http://localhost:5000/api/ask?debug=1").expect("url");
    assert_eq!(asset_origin(&backend).as_str(), "http://localhost:5000/");
}

#[test]
fn rejects_unparseable_backend_url() {
    assert!(parse_backend_url("not a url").is_err());
}
