use std::fmt::Write;

use lb_client::ApiClient;
use lb_core::api::{User, UserCreate, UserRole, UserUpdate};

use super::{friendly_error, print_json, GlobalOpts};

/// Input for `users create`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: String,
}

/// Input for `users update`. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub active: Option<bool>,
    pub password: Option<String>,
}

fn parse_role(raw: &str) -> anyhow::Result<UserRole> {
    UserRole::parse(raw).ok_or_else(|| anyhow::anyhow!("Unknown role '{raw}'. Use admin or agent."))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl NewUser {
    fn into_request(self) -> anyhow::Result<UserCreate> {
        let username = self.username.trim().to_string();
        if username.is_empty() {
            anyhow::bail!("Username is required");
        }
        if self.password.is_empty() {
            anyhow::bail!("Password is required");
        }
        Ok(UserCreate {
            username,
            password: self.password,
            email: non_empty(self.email),
            full_name: non_empty(self.full_name),
            role: parse_role(&self.role)?,
        })
    }
}

impl UserChanges {
    fn into_request(self) -> anyhow::Result<UserUpdate> {
        let role = self.role.as_deref().map(parse_role).transpose()?;
        let update = UserUpdate {
            email: non_empty(self.email),
            full_name: non_empty(self.full_name),
            role,
            active: self.active,
            password: self.password.filter(|p| !p.is_empty()),
        };
        if update == UserUpdate::default() {
            anyhow::bail!("Nothing to update");
        }
        Ok(update)
    }
}

pub async fn list(client: &ApiClient, opts: &GlobalOpts) -> anyhow::Result<()> {
    let users = client.users().await.map_err(friendly_error)?;
    if opts.json {
        return print_json(&users);
    }
    print!("{}", render_users(&users));
    Ok(())
}

pub async fn create(client: &ApiClient, input: NewUser) -> anyhow::Result<()> {
    let request = input.into_request()?;
    client.create_user(&request).await.map_err(friendly_error)?;
    println!("User '{}' created ({}).", request.username, request.role.as_str());
    Ok(())
}

pub async fn update(client: &ApiClient, user_id: &str, changes: UserChanges) -> anyhow::Result<()> {
    let request = changes.into_request()?;
    client
        .update_user(user_id, &request)
        .await
        .map_err(friendly_error)?;
    println!("User {user_id} updated.");
    Ok(())
}

pub async fn delete(client: &ApiClient, user_id: &str) -> anyhow::Result<()> {
    client.delete_user(user_id).await.map_err(friendly_error)?;
    println!("User {user_id} deleted.");
    Ok(())
}

pub fn render_users(users: &[User]) -> String {
    if users.is_empty() {
        return "No users.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:<16} {:<24} {:<28} {:<6} {}",
        "ID", "USERNAME", "FULL NAME", "EMAIL", "ROLE", "ACTIVE"
    );
    for user in users {
        let _ = writeln!(
            out,
            "{:<8} {:<16} {:<24} {:<28} {:<6} {}",
            user.id,
            user.username,
            user.full_name.as_deref().unwrap_or("-"),
            user.email.as_deref().unwrap_or("-"),
            user.role.as_str(),
            if user.active { "yes" } else { "no" },
        );
    }
    out
}
