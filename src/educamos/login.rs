//! Headless-browser login against the Educamos SSO.
//!
//! There is no credential API: the only way in is the interactive SSO form,
//! driven here with a short-lived headless Chromium. The deliverable is the
//! cookie jar after a successful redirect back to the school portal,
//! serialized into a [`SessionCookie`]. The browser is torn down on every
//! path, success or failure.

use std::time::Duration;

use anyhow::{Context, anyhow};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tracing::{debug, info, warn};

use super::session::SessionCookie;

/// Host the SSO flow bounces through. Still being on it after submitting the
/// form means the credentials were rejected.
const SSO_HOST: &str = "sso2.educamos.com";

/// Delay between keystrokes when filling the form. The SSO page attaches
/// client-side validation handlers that miss instantly-set values.
const TYPE_DELAY: Duration = Duration::from_millis(50);

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
const ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The SSO rejected the credentials; the message is whatever the form's
    /// validation summary said, if anything.
    #[error("Login rejected: {0}")]
    InvalidCredentials(String),
    /// Browser automation failed before a verdict could be reached.
    #[error(transparent)]
    Browser(#[from] anyhow::Error),
}

pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Deterministic document-store user id for an Educamos username:
/// `edu_` plus the username lowercased with non-alphanumerics collapsed
/// to underscores. Stable across logins so sessions re-attach to the same
/// stored user.
pub fn derive_user_id(username: &str) -> String {
    let slug: String = username
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("edu_{slug}")
}

/// Synthetic mailbox for the derived user record.
pub fn derive_email(username: &str) -> String {
    format!("{}@slackers.tech", username.to_lowercase())
}

/// Drive the full SSO login and capture the resulting session cookies.
pub async fn acquire_session(
    base_url: &str,
    credentials: &Credentials,
) -> Result<SessionCookie, LoginError> {
    let config = BrowserConfig::builder()
        .no_sandbox()
        .window_size(1280, 800)
        .build()
        .map_err(|e| anyhow!(e))
        .context("Failed to configure headless browser")?;

    let (mut browser, mut handler) = Browser::launch(config)
        .await
        .context("Failed to launch headless browser")?;

    // The handler stream must be pumped for the whole browser lifetime.
    let pump = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let result = drive_login(&browser, base_url, credentials).await;

    if let Err(e) = browser.close().await {
        warn!(error = %e, "Failed to close headless browser cleanly");
    }
    let _ = browser.wait().await;
    pump.abort();

    result
}

async fn drive_login(
    browser: &Browser,
    base_url: &str,
    credentials: &Credentials,
) -> Result<SessionCookie, LoginError> {
    let page = browser
        .new_page(base_url)
        .await
        .context("Failed to open login page")?;

    wait_for_host(&page, SSO_HOST)
        .await
        .context("Never redirected to the SSO host")?;
    debug!("Reached SSO login form");

    type_into(&page, "#NombreUsuario", &credentials.username).await?;
    type_into(&page, "#Clave", &credentials.password).await?;

    let submit = tokio::time::timeout(ELEMENT_TIMEOUT, page.find_element("#btnAcceder"))
        .await
        .map_err(|_| anyhow!("Timed out locating the submit button"))?
        .context("Login form has no submit button")?;
    submit.click().await.context("Failed to submit login form")?;

    tokio::time::timeout(NAVIGATION_TIMEOUT, page.wait_for_navigation())
        .await
        .map_err(|_| anyhow!("Timed out waiting for post-login navigation"))?
        .context("Post-login navigation failed")?;

    let landed_on = page.url().await.context("Failed to read page URL")?;
    if landed_on.as_deref().is_none_or(|url| url.contains(SSO_HOST)) {
        // Still on the SSO form: scrape whatever it complained about.
        let message = validation_message(&page).await;
        return Err(LoginError::InvalidCredentials(message));
    }

    let cookies = page
        .get_cookies()
        .await
        .context("Failed to read session cookies")?;
    let serialized = cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ");

    let cookie = SessionCookie::new(serialized);
    if cookie.is_empty() {
        return Err(LoginError::Browser(anyhow!(
            "Login succeeded but no cookies were captured"
        )));
    }

    info!(cookies = cookies.len(), "Captured Educamos session");
    Ok(cookie)
}

/// Poll until the page URL lands on `host`.
async fn wait_for_host(page: &Page, host: &str) -> anyhow::Result<()> {
    let deadline = tokio::time::Instant::now() + NAVIGATION_TIMEOUT;
    loop {
        if let Some(url) = page.url().await.context("Failed to read page URL")?
            && url.contains(host)
        {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("Timed out waiting for {host}");
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

/// Click a form field and type into it one keystroke at a time.
async fn type_into(page: &Page, selector: &str, text: &str) -> Result<(), LoginError> {
    let element = tokio::time::timeout(ELEMENT_TIMEOUT, page.find_element(selector))
        .await
        .map_err(|_| anyhow!("Timed out locating {selector}"))?
        .with_context(|| format!("Login form is missing {selector}"))?;

    element
        .click()
        .await
        .with_context(|| format!("Failed to focus {selector}"))?;

    for ch in text.chars() {
        element
            .press_key(ch.to_string())
            .await
            .with_context(|| format!("Failed to type into {selector}"))?;
        tokio::time::sleep(TYPE_DELAY).await;
    }
    Ok(())
}

/// Collect the SSO form's validation errors into one message.
async fn validation_message(page: &Page) -> String {
    let elements = match page
        .find_elements(".validation-summary-errors, .field-validation-error")
        .await
    {
        Ok(elements) => elements,
        Err(_) => return "Invalid credentials".to_string(),
    };

    let mut parts = Vec::new();
    for element in elements {
        if let Ok(Some(text)) = element.inner_text().await {
            let text = text.trim().to_string();
            if !text.is_empty() {
                parts.push(text);
            }
        }
    }

    if parts.is_empty() {
        "Invalid credentials".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_is_stable_and_sanitized() {
        assert_eq!(derive_user_id("maria.garcia"), "edu_maria_garcia");
        assert_eq!(derive_user_id("MARIA.GARCIA"), "edu_maria_garcia");
        assert_eq!(derive_user_id("núñez+2"), "edu_n__ez_2");
    }

    #[test]
    fn email_lowercases_the_username() {
        assert_eq!(derive_email("Maria.Garcia"), "maria.garcia@slackers.tech");
    }
}
