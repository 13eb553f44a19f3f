use reqwest::Client;
use url::Url;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) http: Client,
    pub(crate) backend_url: Url,
    pub(crate) asset_origin: Url,
}

impl AppState {
    pub(crate) fn new(backend_url: Url) -> Self {
        let asset_origin = crate::config::asset_origin(&backend_url);
        Self {
            http: Client::new(),
            backend_url,
            asset_origin,
        }
    }
}
