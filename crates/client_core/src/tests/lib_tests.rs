use super::*;

#[test]
fn ask_url_targets_proxy_route() {
    let config = ClientConfig::new(DEFAULT_SERVER_URL).expect("config");
    assert_eq!(
        config.ask_url().expect("url").as_str(),
        "http://localhost:3000/api/ask-question"
    );
}

#[test]
fn asset_url_joins_server_relative_path() {
    let config = ClientConfig::new("http://10.0.0.2:3000/").expect("config");
    assert_eq!(
        config
            .asset_url("/static/audio/answer.mp3")
            .expect("url")
            .as_str(),
        "http://10.0.0.2:3000/static/audio/answer.mp3"
    );
}

#[test]
fn rejects_invalid_base_url() {
    assert!(matches!(
        ClientConfig::new("localhost without scheme"),
        Err(ClientError::Url(_))
    ));
}
