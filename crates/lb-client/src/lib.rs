//! Async HTTP client for the lead-management backend REST API.
//!
//! One [`ApiClient`] is built per process and carries the base URL, the
//! optional request timeout and the bearer token obtained from `/auth/login`.

pub mod error;
pub mod report;

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use lb_api_types::{
    Appointment, AppointmentCreate, AppointmentStatus, AppointmentStatusUpdate, AvailableSlots,
    Conversation, DashboardStats, HumanContactUpdate, LoginRequest, LoginResponse, Plan,
    PlanUpdate, ReportKind, SaleUpdate, User, UserCreate, UserUpdate,
};
use lb_core::config::Config;
use lb_core::leads::LeadList;

pub use error::ApiError;
pub use report::Report;

/// Reusable client + base URL (always ending in `/api`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: String,
    token: Option<String>,
}

/// `http://host:8001/` -> `http://host:8001/api`; a URL already ending in
/// `/api` is kept.
pub fn api_base(backend_url: &str) -> String {
    let trimmed = backend_url.trim().trim_end_matches('/');
    if trimmed.ends_with("/api") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/api")
    }
}

/// One URL path segment. Ids are opaque strings and may contain `/`, `?`
/// or `#`.
fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}

/// Public webhook address the WhatsApp Business account must call.
pub fn webhook_url(backend_url: &str) -> String {
    format!("{}/whatsapp/webhook", api_base(backend_url))
}

impl ApiClient {
    pub fn new(backend_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base = api_base(backend_url);
        let client = builder.build().map_err(|e| ApiError::Http {
            path: base.clone(),
            source: e,
        })?;
        Ok(Self {
            client,
            base,
            token: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.backend.url,
            config.backend.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    // ── plumbing ──

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base, path);
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, &self.base, path))?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "backend rejected credentials");
            return Err(ApiError::Unauthorized { path: path.to_string() });
        }
        if !status.is_success() {
            tracing::warn!(path, status = status.as_u16(), "backend returned an error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        tracing::debug!(path, status = status.as_u16(), "request ok");
        Ok(resp)
    }

    async fn json<T: DeserializeOwned>(&self, resp: Response, path: &str) -> Result<T, ApiError> {
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::from_reqwest(e, &self.base, path))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(self.request(Method::GET, path), path).await?;
        self.json(resp, path).await
    }

    /// Send a JSON body; the response body is ignored.
    async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.send(self.request(method, path).json(body), path).await?;
        Ok(())
    }

    // ── auth ──

    /// `POST /auth/login`; on success the token is kept for later requests.
    pub async fn login(&mut self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let path = "/auth/login";
        let resp = self
            .send(self.request(Method::POST, path).json(credentials), path)
            .await?;
        let login: LoginResponse = self.json(resp, path).await?;
        tracing::info!(username = %credentials.username, "logged in");
        self.set_token(login.access_token.clone());
        Ok(login)
    }

    // ── dashboard ──

    pub async fn fetch_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/dashboard/stats").await
    }

    /// `GET /leads`, coerced into a [`LeadList`]. A body that is valid JSON
    /// but not an array yields an empty list with a diagnostic.
    pub async fn fetch_leads(&self) -> Result<LeadList, ApiError> {
        let payload: Value = self.get("/leads").await?;
        Ok(LeadList::from_payload(payload))
    }

    /// Stats and leads, requested concurrently. Fails if either fails.
    pub async fn fetch_dashboard(&self) -> Result<(DashboardStats, LeadList), ApiError> {
        let (stats, leads) = tokio::join!(self.fetch_stats(), self.fetch_leads());
        Ok((stats?, leads?))
    }

    pub async fn fetch_conversation(&self, lead_id: &str) -> Result<Conversation, ApiError> {
        self.get(&format!("/leads/{}/conversation", segment(lead_id))).await
    }

    pub async fn set_human_contact(
        &self,
        lead_id: &str,
        update: &HumanContactUpdate,
    ) -> Result<(), ApiError> {
        tracing::info!(lead_id, contacted = update.human_contacted, "updating human contact");
        self.write(Method::PUT, &format!("/leads/{}/human-contact", segment(lead_id)), update)
            .await
    }

    pub async fn set_sale(&self, lead_id: &str, update: &SaleUpdate) -> Result<(), ApiError> {
        tracing::info!(lead_id, closed = update.sale_closed, "updating sale");
        self.write(Method::PUT, &format!("/leads/{}/sale", segment(lead_id)), update)
            .await
    }

    // ── plans ──

    pub async fn plans(&self) -> Result<Vec<Plan>, ApiError> {
        self.get("/plans").await
    }

    pub async fn update_plan(&self, plan_id: &str, update: &PlanUpdate) -> Result<(), ApiError> {
        self.write(Method::PUT, &format!("/plans/{}", segment(plan_id)), update)
            .await
    }

    // ── appointments ──

    pub async fn appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get("/appointments").await
    }

    pub async fn available_slots(&self, date: Option<NaiveDate>) -> Result<AvailableSlots, ApiError> {
        let path = "/appointments/available-slots";
        let mut builder = self.request(Method::GET, path);
        if let Some(date) = date {
            builder = builder.query(&[("date", date.format("%Y-%m-%d").to_string())]);
        }
        let resp = self.send(builder, path).await?;
        let value: Value = self.json(resp, path).await?;
        let mut slots = AvailableSlots::from_value(&value);
        if slots.date.is_none() {
            slots.date = date.map(|d| d.format("%Y-%m-%d").to_string());
        }
        Ok(slots)
    }

    pub async fn create_appointment(&self, appointment: &AppointmentCreate) -> Result<(), ApiError> {
        tracing::info!(lead_id = %appointment.lead_id, at = %appointment.scheduled_at, "booking appointment");
        self.write(Method::POST, "/appointments", appointment).await
    }

    pub async fn set_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<(), ApiError> {
        self.write(
            Method::PUT,
            &format!("/appointments/{}/status", segment(appointment_id)),
            &AppointmentStatusUpdate { status },
        )
        .await
    }

    // ── reports ──

    pub async fn download_report(&self, kind: ReportKind) -> Result<Report, ApiError> {
        let path = kind.path();
        let resp = self
            .send(
                self.request(Method::GET, path).header(
                    "Accept",
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                ),
                path,
            )
            .await?;
        let filename = resp
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(report::filename_from_disposition);
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(e, &self.base, path))?
            .to_vec();
        tracing::info!(kind = kind.as_str(), bytes = bytes.len(), "report downloaded");
        Ok(Report {
            kind,
            filename,
            bytes,
        })
    }

    // ── users ──

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/users").await
    }

    pub async fn create_user(&self, user: &UserCreate) -> Result<(), ApiError> {
        tracing::info!(username = %user.username, role = user.role.as_str(), "creating user");
        self.write(Method::POST, "/users", user).await
    }

    pub async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<(), ApiError> {
        self.write(Method::PUT, &format!("/users/{}", segment(user_id)), update)
            .await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        let path = format!("/users/{}", segment(user_id));
        tracing::info!(user_id, "deleting user");
        self.send(self.request(Method::DELETE, &path), &path).await?;
        Ok(())
    }
}
