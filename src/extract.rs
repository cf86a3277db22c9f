use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::config::Settings;
use crate::error::CfpError;

// ── Constants ────────────────────────────────────────────────────────────────

const ALLOWED_HOST: &str = "wikicfp.com";
const MAX_REDIRECTS: usize = 10;

// ── Lazy static selectors ────────────────────────────────────────────────────

/// WikiCFP event pages keep the call for papers in `<div class="cfp">`.
static CFP_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div.cfp").unwrap());

// ── Page source capability ───────────────────────────────────────────────────

/// Turns a URL into the plain call-for-papers text of that page.
#[async_trait]
pub trait PageSource {
    async fn page_text(&self, url: &str) -> Result<String, CfpError>;
}

/// Fetches the page over HTTP and extracts its CFP section.
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(settings: &Settings) -> Result<Self, CfpError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.9"),
        );

        let mut builder = reqwest::ClientBuilder::new()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers);

        if settings.insecure_ssl {
            tracing::warn!("TLS certificate validation is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| CfpError::Fetch(e.to_string()))?;
        Ok(Self { client })
    }

    async fn fetch_html(&self, url: &str) -> Result<String, CfpError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                CfpError::Fetch(format!("timed out: {}", e))
            } else if e.is_connect() {
                CfpError::Fetch(format!("connection failed: {}", e))
            } else {
                CfpError::Fetch(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CfpError::Fetch(format!("upstream returned {}", status)));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        if !content_type.contains("text/html") {
            return Err(CfpError::Fetch(format!(
                "expected an HTML page, got '{}'",
                content_type
            )));
        }

        response
            .text()
            .await
            .map_err(|e| CfpError::Fetch(e.to_string()))
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn page_text(&self, url: &str) -> Result<String, CfpError> {
        let html = self.fetch_html(url).await?;
        tracing::debug!(bytes = html.len(), "fetched page");
        extract_cfp_text(&html)
    }
}

// ── URL validation ───────────────────────────────────────────────────────────

/// Accept http(s) URLs on wikicfp.com or one of its subdomains.
pub fn validate_url(url: &str) -> Result<String, CfpError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(CfpError::InvalidUrl("URL is empty".to_string()));
    }
    let parsed = Url::parse(url)
        .map_err(|e| CfpError::InvalidUrl(format!("'{}' is not a URL ({})", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CfpError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }
    let host = parsed.host_str().unwrap_or("").to_lowercase();
    if host == ALLOWED_HOST || host.ends_with(&format!(".{}", ALLOWED_HOST)) {
        return Ok(parsed.to_string());
    }
    Err(CfpError::InvalidUrl(format!(
        "only {} pages are supported, got host '{}'",
        ALLOWED_HOST, host
    )))
}

// ── CFP text extraction ──────────────────────────────────────────────────────

/// Pull the call-for-papers block out of an event page as one ASCII line.
pub fn extract_cfp_text(html: &str) -> Result<String, CfpError> {
    let document = Html::parse_document(html);
    let cfp = document
        .select(&CFP_SELECTOR)
        .next()
        .ok_or_else(|| CfpError::EmptyContent("page has no call-for-papers section".to_string()))?;

    let joined = cfp.text().collect::<Vec<_>>().join(" ");
    let ascii: String = joined.chars().filter(char::is_ascii).collect();
    let text = normalize_text(&ascii);
    if text.is_empty() {
        return Err(CfpError::EmptyContent(
            "call-for-papers section is empty".to_string(),
        ));
    }
    Ok(text)
}

/// Collapse whitespace runs to single spaces and trim.
fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EVENT_PAGE: &str = r#"<html><head><title>ICML 2026</title></head><body>
        <div class="nav">Home | Login</div>
        <div class="cfp">
            <p>Call for Papers</p>
            <p>General Chair: <b>John Smith</b>,
               Stanford University</p>
            <p>Caf&eacute; talks&#8212;TBA</p>
        </div>
        </body></html>"#;

    #[test]
    fn accepts_wikicfp_urls() {
        for url in [
            "http://www.wikicfp.com/cfp/servlet/event.showcfp?eventid=1",
            "https://wikicfp.com/cfp/",
            "  http://WWW.WIKICFP.COM/cfp/call?conference=nlp  ",
        ] {
            assert!(validate_url(url).is_ok(), "{url}");
        }
    }

    #[test]
    fn rejects_other_urls() {
        for url in [
            "",
            "   ",
            "http://example.com",
            "wikicfp.com/cfp",
            "ftp://www.wikicfp.com/cfp",
            "http://wikicfp.com.evil.org/",
            "http://notwikicfp.com/",
        ] {
            assert!(
                matches!(validate_url(url), Err(CfpError::InvalidUrl(_))),
                "{url:?}"
            );
        }
    }

    #[test]
    fn extracts_only_the_cfp_block() {
        let text = extract_cfp_text(EVENT_PAGE).unwrap();
        assert!(text.starts_with("Call for Papers General Chair: John Smith , Stanford University"));
        assert!(!text.contains("Login"));
        assert!(!text.contains('\n'));
        assert!(text.is_ascii());
        assert!(text.contains("Caf talksTBA"));
    }

    #[test]
    fn missing_cfp_block_is_empty_content() {
        let err = extract_cfp_text("<html><body><p>Welcome</p></body></html>").unwrap_err();
        assert!(matches!(err, CfpError::EmptyContent(_)));
    }

    #[test]
    fn whitespace_only_cfp_block_is_empty_content() {
        let err = extract_cfp_text("<div class=\"cfp\">  \n\t </div>").unwrap_err();
        assert!(matches!(err, CfpError::EmptyContent(_)));
    }

    #[tokio::test]
    async fn fetches_and_extracts_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cfp/event"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(EVENT_PAGE, "text/html; charset=utf-8"))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpPageSource::new(&Settings::default()).unwrap();
        let text = source
            .page_text(&format!("{}/cfp/event", server.uri()))
            .await
            .unwrap();
        assert!(text.contains("John Smith"));
    }

    #[tokio::test]
    async fn upstream_error_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = HttpPageSource::new(&Settings::default()).unwrap();
        let err = source.page_text(&server.uri()).await.unwrap_err();
        assert!(matches!(err, CfpError::Fetch(_)));
    }

    #[tokio::test]
    async fn non_html_response_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let source = HttpPageSource::new(&Settings::default()).unwrap();
        let err = source.page_text(&server.uri()).await.unwrap_err();
        assert!(matches!(err, CfpError::Fetch(_)));
    }
}
