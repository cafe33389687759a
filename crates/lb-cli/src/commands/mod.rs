pub mod appointments;
pub mod leads;
pub mod login;
pub mod plans;
pub mod report;
pub mod users;

use std::path::PathBuf;

use serde::Serialize;

use lb_client::{ApiClient, ApiError};
use lb_core::api::LoginRequest;
use lb_core::config::Config;
use lb_core::forms;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub api_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub json: bool,
}

impl GlobalOpts {
    /// `--password`, else `LEADBOARD_PASSWORD`.
    pub fn password(&self) -> Option<String> {
        self.password
            .clone()
            .filter(|p| !p.is_empty())
            .or_else(Config::password_from_env)
    }
}

/// Config file plus env overrides, with command-line flags applied last.
pub fn load_config(opts: &GlobalOpts) -> anyhow::Result<Config> {
    let mut config = match &opts.config {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
        None => Config::load()?,
    };
    apply_flags(&mut config, opts);
    config.validate()?;
    Ok(config)
}

fn apply_flags(config: &mut Config, opts: &GlobalOpts) {
    if let Some(url) = opts.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
        config.backend.url = url.trim().to_string();
    }
    if let Some(user) = opts.username.as_deref().filter(|u| !u.trim().is_empty()) {
        config.auth.username = Some(user.trim().to_string());
    }
}

/// Build a client and sign in when both a username and a password are known.
pub async fn connect(config: &Config, opts: &GlobalOpts) -> anyhow::Result<ApiClient> {
    let mut client = ApiClient::from_config(config).map_err(friendly_error)?;
    match (config.auth.username.clone(), opts.password()) {
        (Some(username), Some(password)) => {
            client
                .login(&LoginRequest { username, password })
                .await
                .map_err(login_error)?;
        }
        (Some(username), None) => {
            tracing::debug!(%username, "no password given, continuing without a token");
        }
        _ => {}
    }
    Ok(client)
}

/// Map API errors to operator-facing messages.
pub fn friendly_error(err: ApiError) -> anyhow::Error {
    tracing::debug!(error = %err, "request failed");
    anyhow::anyhow!(err.friendly())
}

/// Login failures only ever show one of two fixed messages.
pub fn login_error(err: ApiError) -> anyhow::Error {
    tracing::warn!(error = %err, "login failed");
    anyhow::anyhow!(err.login_message())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// clap value parser for BRL amounts (`89.90` or `89,90`).
pub fn money_arg(raw: &str) -> Result<f64, String> {
    forms::parse_amount("amount", raw).map_err(|e| e.to_string())
}

/// clap value parser for yes/no style flags.
pub fn flag_arg(raw: &str) -> Result<bool, String> {
    forms::parse_flag("flag", raw).map_err(|e| e.to_string())
}

/// `yes` / `no` / `-`.
pub fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;

    use lb_client::ApiClient;

    pub async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub async fn client_for(app: Router) -> ApiClient {
        let base = serve(app).await;
        ApiClient::new(&base, None).unwrap()
    }
}
