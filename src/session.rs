use color_eyre::eyre::Result;
use reqwest::{
    Client, Response,
    cookie::Jar,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use std::sync::Arc;
use tracing::instrument;
use url::Url;

// The endpoints are private AJAX endpoints, so requests have to look like the
// game's own XHR calls or they get served the HTML login page instead.
const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
const SESSION_COOKIE_NAME: &str = "PHPSESSID";

/// Cookie-authenticated client scoped to one game base URL.
pub struct Session {
    http: Client,
    base_url: Url,
}

impl Session {
    pub fn new(base_url: &str, session_id: &str) -> Result<Self> {
        let base_url: Url = base_url.parse()?;

        let jar = Arc::new(Jar::default());
        jar.add_cookie_str(
            &format!("{SESSION_COOKIE_NAME}={session_id}"),
            &base_url,
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert(
            "X-Requested-With",
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let http = Client::builder()
            .cookie_provider(jar)
            .user_agent(USER_AGENT_VALUE)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url })
    }

    #[instrument(skip(self, query))]
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        let url = self.base_url.join(path)?;
        Ok(self.http.get(url).query(query).send().await?)
    }

    #[instrument(skip(self, form))]
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&'static str, String)],
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;
        Ok(self.http.post(url).form(form).send().await?)
    }
}
