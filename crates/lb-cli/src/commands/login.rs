use lb_client::ApiClient;
use lb_core::api::LoginRequest;
use lb_core::config::Config;

use super::{friendly_error, login_error, GlobalOpts};

/// Run the `login` subcommand: check the credentials and optionally remember
/// the username. The password is never written to disk.
pub async fn run(config: &Config, opts: &GlobalOpts, save: bool) -> anyhow::Result<()> {
    let username = verify(config, opts).await?;
    println!("Signed in to {} as {username}.", lb_client::api_base(&config.backend.url));

    if save {
        let path = opts.config.clone().unwrap_or_else(Config::default_path);
        let mut stored = if path.exists() { Config::load_from(&path)? } else { Config::default() };
        stored.auth.username = Some(username.clone());
        stored.save_to(&path)?;
        println!("Username saved to {}", path.display());
    }
    Ok(())
}

/// Log in once and return the username that worked.
pub async fn verify(config: &Config, opts: &GlobalOpts) -> anyhow::Result<String> {
    let Some(username) = config.auth.username.clone().filter(|u| !u.trim().is_empty()) else {
        anyhow::bail!("Username is required (--username or LEADBOARD_USERNAME)");
    };
    let Some(password) = opts.password() else {
        anyhow::bail!("Password is required (--password or LEADBOARD_PASSWORD)");
    };
    let mut client = ApiClient::from_config(config).map_err(friendly_error)?;
    client
        .login(&LoginRequest { username: username.clone(), password })
        .await
        .map_err(login_error)?;
    Ok(username)
}
