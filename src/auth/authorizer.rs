use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::error::AuthError;
use crate::state::SecretPrompt;

const AUTHORIZATION_WINDOW: Duration = Duration::from_secs(300);

/// Puts an authorization URL in front of a human and hands back the `code`
/// from the redirect.
#[async_trait]
pub trait InteractiveAuthorizer: Send + Sync {
    async fn authorize(&self, url: &str, state: &str) -> Result<String, AuthError>;
}

/// Pull `code` out of a redirect URL (or bare `/path?query`).
///
/// A `state` that disagrees with `expected_state` is rejected; a missing one
/// is tolerated since some providers drop it.
pub fn extract_code(redirect: &str, expected_state: Option<&str>) -> Result<String, AuthError> {
    let query = redirect
        .split_once('?')
        .map(|(_, q)| q)
        .unwrap_or_default();
    let query = query.split('#').next().unwrap_or_default();

    let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    if let Some(error) = params.get("error") {
        return Err(AuthError::Denied(error.clone()));
    }

    if let (Some(expected), Some(actual)) = (expected_state, params.get("state")) {
        if actual != expected {
            return Err(AuthError::StateMismatch);
        }
    }

    params
        .get("code")
        .filter(|code| !code.is_empty())
        .cloned()
        .ok_or(AuthError::MissingCode)
}

fn show_url(url: &str, launch_browser: bool) {
    println!("If your browser doesn't open, visit:\n{}\n", url);
    if launch_browser {
        if let Err(err) = open::that(url) {
            debug!("could not launch browser: {err}");
        }
    }
}

/// Waits for the provider to redirect to a local `http://127.0.0.1:<port>/<path>`.
pub struct LoopbackAuthorizer {
    bind_addr: String,
    callback_path: String,
    launch_browser: bool,
}

impl LoopbackAuthorizer {
    pub fn from_redirect_uri(redirect_uri: &str) -> anyhow::Result<Self> {
        let parsed = url::Url::parse(redirect_uri)
            .with_context(|| format!("Invalid redirect URI {redirect_uri}"))?;
        let host = parsed
            .host_str()
            .context("Redirect URI has no host")?
            .to_string();
        let port = parsed
            .port_or_known_default()
            .context("Redirect URI has no port")?;

        Ok(Self {
            bind_addr: format!("{host}:{port}"),
            callback_path: parsed.path().to_string(),
            launch_browser: true,
        })
    }

    async fn wait_for_callback(&self, state: &str) -> Result<String, AuthError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .with_context(|| {
                format!("Failed to bind to {}. Is another instance running?", self.bind_addr)
            })
            .map_err(AuthError::Flow)?;

        info!("waiting for authorization callback on {}", self.bind_addr);
        self.accept_callback(&listener, state).await
    }

    /// Serve requests until one carries a usable `code` or an `error`.
    /// Stray requests (favicon, prefetch, wrong state, no code) get an
    /// error page and the listener keeps waiting.
    async fn accept_callback(&self, listener: &TcpListener, state: &str) -> Result<String, AuthError> {
        loop {
            let (mut stream, _) = listener
                .accept()
                .await
                .context("Failed to accept callback connection")
                .map_err(AuthError::Flow)?;

            let (read_half, mut write_half) = stream.split();
            let mut reader = BufReader::new(read_half);
            let mut request_line = String::new();
            reader
                .read_line(&mut request_line)
                .await
                .context("Failed to read callback request")
                .map_err(AuthError::Flow)?;
            drain_headers(&mut reader).await;

            // GET /callback?code=xxx&state=yyy HTTP/1.1
            let path = request_line.split_whitespace().nth(1).unwrap_or_default();
            if !path.starts_with(&self.callback_path) || !path.contains('?') {
                send_response(&mut write_half, "404 Not Found", "Not Found").await;
                continue;
            }

            match extract_code(path, Some(state)) {
                Ok(code) => {
                    send_response(
                        &mut write_half,
                        "200 OK",
                        "<html><body><h1>Success!</h1><p>You can close this tab.</p></body></html>",
                    )
                    .await;
                    return Ok(code);
                }
                Err(err @ (AuthError::StateMismatch | AuthError::MissingCode)) => {
                    debug!("ignoring callback request: {err}");
                    send_response(&mut write_half, "400 Bad Request", &err.to_string()).await;
                }
                Err(err) => {
                    send_response(&mut write_half, "400 Bad Request", &err.to_string()).await;
                    return Err(err);
                }
            }
        }
    }
}

#[async_trait]
impl InteractiveAuthorizer for LoopbackAuthorizer {
    async fn authorize(&self, url: &str, state: &str) -> Result<String, AuthError> {
        show_url(url, self.launch_browser);

        tokio::time::timeout(AUTHORIZATION_WINDOW, self.wait_for_callback(state))
            .await
            .map_err(|_| {
                AuthError::Flow(anyhow::anyhow!(
                    "no callback received within {:?}",
                    AUTHORIZATION_WINDOW
                ))
            })?
    }
}

// Unread request bytes would turn our close into a reset
async fn drain_headers<R: AsyncBufRead + Unpin>(reader: &mut R) {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) if line.trim_end().is_empty() => break,
            Ok(_) => {}
        }
    }
}

async fn send_response<W: AsyncWrite + Unpin>(stream: &mut W, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    // the browser may already be gone, nothing to do about it
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.flush().await;
}

/// For redirect URIs nothing local can listen on: the operator pastes the
/// URL the browser ended up at.
pub struct PasteAuthorizer<'a> {
    prompt: &'a dyn SecretPrompt,
    launch_browser: bool,
}

impl<'a> PasteAuthorizer<'a> {
    pub fn new(prompt: &'a dyn SecretPrompt) -> Self {
        Self {
            prompt,
            launch_browser: true,
        }
    }
}

#[async_trait]
impl InteractiveAuthorizer for PasteAuthorizer<'_> {
    async fn authorize(&self, url: &str, state: &str) -> Result<String, AuthError> {
        show_url(url, self.launch_browser);

        let redirect = self
            .prompt
            .prompt(
                "redirect_url",
                "Paste the FULL redirected URL after logging in",
                false,
            )
            .map_err(AuthError::Flow)?
            .ok_or(AuthError::Cancelled)?;

        extract_code(redirect.trim(), Some(state))
    }
}
