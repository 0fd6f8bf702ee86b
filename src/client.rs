// src/client.rs

use crate::{config::AppConfig, error::*, models::CrawlSession};
use log::debug;
use reqwest::{header, Response, StatusCode};
use url::Url;

/// A completed page fetch, reduced to what the engine consumes: status,
/// resolved final URL (after redirects) and body text.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: StatusCode,
    pub final_url: Url,
    pub body: String,
}

impl PageResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }
}

/// HTTP boundary: cookie-holding client with a stable identity header.
/// Every call stamps the session referer (or an explicit override) and
/// records the response's final URL back into the session, so referer state
/// flows through requests in causal order.
#[derive(Clone)]
pub struct SessionClient {
    client: reqwest::Client,
    page_timeout: std::time::Duration,
    file_timeout: std::time::Duration,
}

impl SessionClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .cookie_store(true)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self {
            client,
            page_timeout: config.page_timeout,
            file_timeout: config.file_timeout,
        })
    }

    fn referer_value<'a>(
        session: &'a CrawlSession,
        referer_override: Option<&'a Url>,
    ) -> Option<&'a Url> {
        referer_override.or(session.referer.as_ref())
    }

    pub async fn get_page(
        &self,
        session: &mut CrawlSession,
        url: &Url,
        referer_override: Option<&Url>,
    ) -> AppResult<PageResponse> {
        let mut request = self.client.get(url.clone()).timeout(self.page_timeout);
        if let Some(referer) = Self::referer_value(session, referer_override) {
            request = request.header(header::REFERER, referer.as_str());
        }
        debug!("GET {}", url);
        let response = request.send().await?;
        Self::into_page(session, response).await
    }

    pub async fn post_form(
        &self,
        session: &mut CrawlSession,
        url: &Url,
        form: &[(String, String)],
        referer_override: Option<&Url>,
    ) -> AppResult<PageResponse> {
        let mut request = self
            .client
            .post(url.clone())
            .timeout(self.page_timeout)
            .form(form);
        if let Some(referer) = Self::referer_value(session, referer_override) {
            request = request.header(header::REFERER, referer.as_str());
        }
        debug!("POST {}", url);
        let response = request.send().await?;
        Self::into_page(session, response).await
    }

    /// Fetch for streamed file transfer, with the larger file timeout. The
    /// raw response is handed back for chunked consumption; the referer is
    /// threaded the same way as for pages.
    pub async fn get_stream(
        &self,
        session: &mut CrawlSession,
        url: &Url,
        referer_override: Option<&Url>,
    ) -> AppResult<Response> {
        let mut request = self.client.get(url.clone()).timeout(self.file_timeout);
        if let Some(referer) = Self::referer_value(session, referer_override) {
            request = request.header(header::REFERER, referer.as_str());
        }
        debug!("GET (stream) {}", url);
        let response = request.send().await?;
        session.referer = Some(response.url().clone());
        Ok(response)
    }

    async fn into_page(session: &mut CrawlSession, response: Response) -> AppResult<PageResponse> {
        let status = response.status();
        let final_url = response.url().clone();
        session.referer = Some(final_url.clone());
        let body = response.text().await?;
        Ok(PageResponse { status, final_url, body })
    }
}
