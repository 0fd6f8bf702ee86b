// src/auth.rs
//
// Builds the login payload from the profile's field mapping, submits it and
// classifies the outcome with the ordered indicator lists. Success flips the
// session's authenticated flag and seeds the referer chain.

use crate::{
    client::{PageResponse, SessionClient},
    error::*,
    models::CrawlSession,
    profile::{Indicator, PlatformProfile},
    selector, symbols,
};
use log::{debug, info, warn};
use scraper::Html;
use url::Url;

pub struct Authenticator<'a> {
    profile: &'a PlatformProfile,
    client: &'a SessionClient,
}

impl<'a> Authenticator<'a> {
    pub fn new(profile: &'a PlatformProfile, client: &'a SessionClient) -> Self {
        Self { profile, client }
    }

    pub async fn login(
        &self,
        session: &mut CrawlSession,
        username: &str,
        password: &str,
    ) -> AppResult<bool> {
        let login = &self.profile.login;
        let page_url = Url::parse(&login.page_url)?;
        let action_url = Url::parse(login.action_url())?;
        let payload = build_payload(self.profile, username, password)?;

        info!("attempting login at {} (from {})", action_url, page_url);
        let response = match self
            .client
            .post_form(session, &action_url, &payload, Some(&page_url))
            .await
        {
            Ok(response) => response,
            Err(AppError::Network(e)) => {
                warn!("login failed: no response from server: {}", e);
                println!("{} Login failed: no response from the server.", *symbols::ERROR);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let success = login.success_indicators.iter().find(|indicator| {
            indicator_matches(indicator, &response, &login.page_url, login.action_url())
        });

        if let Some(indicator) = success {
            debug!("login success indicator matched: {:?}", indicator);
            session.authenticated = true;
            session.referer = Some(response.final_url.clone());
            Ok(true)
        } else {
            // Failure indicators are informational only; first match is
            // reported, none of them change the authenticated state.
            if let Some(indicator) = login.failure_indicators.iter().find(|indicator| {
                indicator_matches(indicator, &response, &login.page_url, login.action_url())
            }) {
                warn!("login failure indicator matched: {:?}", indicator);
                println!("{} Login failure indication found: {:?}", *symbols::WARN, indicator);
            }
            Ok(false)
        }
    }
}

fn build_payload(
    profile: &PlatformProfile,
    username: &str,
    password: &str,
) -> AppResult<Vec<(String, String)>> {
    let fields = &profile.login.payload_fields;
    let username_field = fields
        .get("username")
        .ok_or_else(|| AppError::Profile("payload_fields missing 'username'".into()))?;
    let password_field = fields
        .get("password")
        .ok_or_else(|| AppError::Profile("payload_fields missing 'password'".into()))?;

    let mut payload = vec![
        (username_field.clone(), username.to_string()),
        (password_field.clone(), password.to_string()),
    ];
    // Everything else (flags, CSRF placeholders) passes through verbatim.
    for (key, value) in fields {
        if key != "username" && key != "password" {
            payload.push((key.clone(), value.clone()));
        }
    }
    Ok(payload)
}

/// Evaluates one indicator against a completed response. `url_is_not` keeps
/// its compound condition: the final URL must differ from the configured
/// value and also contain neither the login page URL nor the action URL,
/// so a bounce-back redirect is never misread as success.
fn indicator_matches(
    indicator: &Indicator,
    response: &PageResponse,
    login_page_url: &str,
    login_action_url: &str,
) -> bool {
    let final_url = response.final_url.as_str();
    match indicator {
        Indicator::UrlContains { value } => final_url.contains(value),
        Indicator::UrlIsNot { value } => {
            final_url != value
                && !final_url.contains(login_page_url)
                && !final_url.contains(login_action_url)
        }
        Indicator::PageTextContains { value } => response.body.contains(value),
        Indicator::ElementExists { selector: spec } => {
            let doc = Html::parse_document(&response.body);
            selector::find_first(doc.root_element(), spec).is_some()
        }
    }
}
