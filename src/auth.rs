use crate::client::{DEFAULT_BASE_URL, PhotosClient};
use crate::config::Config;
use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Stored OAuth token, JSON in the configured token file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Token {
    pub(crate) access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) refresh_token: Option<String>,
    #[serde(default)]
    pub(crate) token_type: String,
}

pub(crate) fn has_stored_token(cfg: &Config) -> bool {
    load_token(cfg).is_ok()
}

pub(crate) fn load_token(cfg: &Config) -> Result<Token> {
    let p = Path::new(&cfg.token_file_location);
    let f = File::open(p).with_context(|| format!("Unable to open token file {p:?}"))?;
    let token: Token =
        serde_json::from_reader(f).with_context(|| format!("Unable to parse token file {p:?}"))?;
    Ok(token)
}

pub(crate) fn save_token(cfg: &Config, token: &Token) -> Result<()> {
    let p = Path::new(&cfg.token_file_location);
    if let Some(parent) = p.parent()
        && parent != Path::new("")
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Unable to create token dir {parent:?}"))?;
    }
    let f = File::create(p).with_context(|| format!("Unable to create token file {p:?}"))?;
    serde_json::to_writer(f, token).with_context(|| format!("Unable to write token file {p:?}"))?;
    Ok(())
}

/// Authenticated client for the remote library. Runs the interactive consent
/// flow when no token is stored, then trades the refresh token for a fresh
/// access token.
pub(crate) fn acquire_client(cfg: &Config) -> Result<PhotosClient> {
    let token = if has_stored_token(cfg) {
        load_token(cfg)?
    } else {
        debug!("No usable stored token, starting consent flow");
        let token = interactive_consent(cfg)?;
        save_token(cfg, &token)?;
        token
    };
    let token = match &token.refresh_token {
        Some(refresh_token) => {
            let mut fresh = refresh_access_token(cfg, refresh_token)?;
            if fresh.refresh_token.is_none() {
                fresh.refresh_token = token.refresh_token.clone();
            }
            save_token(cfg, &fresh)?;
            fresh
        }
        None => token,
    };
    Ok(PhotosClient::new(DEFAULT_BASE_URL, &token.access_token))
}

fn interactive_consent(cfg: &Config) -> Result<Token> {
    let url = build_auth_url(cfg)?;
    println!("Open your browser and authorize access:\n  {url}");
    if let Err(e) = std::process::Command::new("open").arg(url.as_str()).spawn() {
        debug!("Unable to open browser automatically: {e}");
    }
    let code = await_callback_code(cfg, CALLBACK_TIMEOUT)?;
    info!("Received authorization code");
    exchange_code(cfg, &code)
}

fn build_auth_url(cfg: &Config) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(&cfg.auth_url)
        .with_context(|| format!("Bad auth url {:?}", cfg.auth_url))?;
    url.query_pairs_mut()
        .append_pair("client_id", &cfg.client_id)
        .append_pair("redirect_uri", &cfg.redirect_url)
        .append_pair("response_type", "code")
        .append_pair("scope", &cfg.scopes.join(" "))
        .append_pair("access_type", "offline")
        .append_pair("state", "state");
    Ok(url)
}

/// Run a one-shot local listener on the redirect address and block until
/// exactly one browser redirect carrying a `code` arrives, or the timeout
/// elapses. Requests without a code (favicon probes and the like) are
/// answered and ignored.
fn await_callback_code(cfg: &Config, timeout: Duration) -> Result<String> {
    let redirect = reqwest::Url::parse(&cfg.redirect_url)
        .with_context(|| format!("Bad redirect url {:?}", cfg.redirect_url))?;
    let host = redirect.host_str().unwrap_or("localhost");
    let port = redirect.port_or_known_default().unwrap_or(8080);
    let server = tiny_http::Server::http((host, port))
        .map_err(|e| anyhow!("Unable to start callback listener on {host}:{port}: {e}"))?;

    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            bail!("Timed out waiting for the authorization callback");
        }
        let Some(request) = server
            .recv_timeout(remaining)
            .context("Callback listener failed")?
        else {
            continue;
        };
        let code = extract_code(request.url());
        let body = match &code {
            Some(_) => "Authorization complete, you can return to the CLI.",
            None => "Ok",
        };
        if let Err(e) = request.respond(tiny_http::Response::from_string(body)) {
            warn!("Unable to answer callback request: {e}");
        }
        if let Some(code) = code {
            return Ok(code);
        }
    }
}

fn extract_code(url: &str) -> Option<String> {
    let re = Regex::new(r"code=([^&]+)").ok()?;
    let captures = re.captures(url)?;
    Some(captures.get(1)?.as_str().to_string())
}

fn exchange_code(cfg: &Config, code: &str) -> Result<Token> {
    token_request(
        cfg,
        &[
            ("client_id", cfg.client_id.as_str()),
            ("client_secret", cfg.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", cfg.redirect_url.as_str()),
        ],
    )
}

fn refresh_access_token(cfg: &Config, refresh_token: &str) -> Result<Token> {
    token_request(
        cfg,
        &[
            ("client_id", cfg.client_id.as_str()),
            ("client_secret", cfg.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ],
    )
}

fn token_request(cfg: &Config, params: &[(&str, &str)]) -> Result<Token> {
    let client = reqwest::blocking::Client::new();
    let response = client
        .post(&cfg.token_url)
        .form(params)
        .send()
        .context("Token request failed")?;
    response.json::<Token>().context("Unable to decode token response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    fn test_config(dir: &Path) -> Config {
        Config {
            token_file_location: dir.join("token.json").to_string_lossy().to_string(),
            client_id: "cid".to_string(),
            client_secret: "csecret".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_extract_code() {
        assert_eq!(extract_code("/?code=abcdefg&scope=s").as_deref(), Some("abcdefg"));
        assert_eq!(extract_code("/?scope=s&code=abcdefg").as_deref(), Some("abcdefg"));
        assert!(extract_code("/?error=denied&scope=s").is_none());
    }

    #[test]
    fn test_token_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let cfg = test_config(dir.path());
        assert!(!has_stored_token(&cfg));

        let token = Token {
            access_token: "at".to_string(),
            refresh_token: Some("rt".to_string()),
            token_type: "Bearer".to_string(),
        };
        save_token(&cfg, &token)?;
        assert!(has_stored_token(&cfg));
        let loaded = load_token(&cfg)?;
        assert_eq!(loaded.access_token, "at");
        assert_eq!(loaded.refresh_token.as_deref(), Some("rt"));
        Ok(())
    }

    #[test]
    fn test_refresh_access_token() -> anyhow::Result<()> {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/token")
                .body_contains("grant_type=refresh_token")
                .body_contains("refresh_token=myrefresh");
            then.status(200)
                .json_body(json!({"access_token": "fresh", "token_type": "Bearer"}));
        });

        let dir = tempfile::tempdir()?;
        let mut cfg = test_config(dir.path());
        cfg.token_url = server.url("/token");
        let token = refresh_access_token(&cfg, "myrefresh")?;
        mock.assert();
        assert_eq!(token.access_token, "fresh");
        assert!(token.refresh_token.is_none());
        Ok(())
    }

    #[test]
    fn test_exchange_code() -> anyhow::Result<()> {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/token")
                .body_contains("grant_type=authorization_code")
                .body_contains("code=mycode");
            then.status(200).json_body(json!({
                "access_token": "at", "refresh_token": "rt", "token_type": "Bearer"
            }));
        });

        let dir = tempfile::tempdir()?;
        let mut cfg = test_config(dir.path());
        cfg.token_url = server.url("/token");
        let token = exchange_code(&cfg, "mycode")?;
        mock.assert();
        assert_eq!(token.refresh_token.as_deref(), Some("rt"));
        Ok(())
    }

    #[test]
    fn test_await_callback_code() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut cfg = test_config(dir.path());
        cfg.redirect_url = "http://localhost:18427/oauth/callback".to_string();

        let handle = std::thread::spawn(move || {
            await_callback_code(&cfg, Duration::from_secs(5))
        });
        // the listener needs a moment to bind
        std::thread::sleep(Duration::from_millis(200));
        let client = reqwest::blocking::Client::new();
        client
            .get("http://localhost:18427/oauth/callback?code=mycode&scope=s")
            .send()?;
        let code = handle.join().map_err(|_| anyhow!("listener panicked"))??;
        assert_eq!(code, "mycode");
        Ok(())
    }
}
