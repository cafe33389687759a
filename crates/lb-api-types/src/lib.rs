//! Wire types for the lead-management backend.
//!
//! Every struct mirrors the JSON the backend sends or accepts. Response types
//! are lenient (`#[serde(default)]` everywhere) so a missing field degrades
//! to an empty value instead of failing the whole payload.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ── Identifiers ──

/// Accept either a JSON string or a JSON number and keep it as a string.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = de_id(deserializer)?;
    Ok(if id.is_empty() { None } else { Some(id) })
}

/// Treat an explicit `null` like a missing field.
fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Money as a JSON number or a decimal string such as `"1500.00"`.
fn de_opt_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => Ok(n.as_f64()),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid amount {s:?}"))),
        other => Err(D::Error::custom(format!("invalid amount {other}"))),
    }
}

fn de_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_opt_amount(deserializer)?.unwrap_or_default())
}

// ── Leads ──

/// Sales readiness of a lead.
///
/// Values outside hot/warm/cold are preserved verbatim in `Unknown` so the UI
/// can still show what the backend sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InterestLevel {
    Hot,
    Warm,
    Cold,
    Unknown(String),
}

impl InterestLevel {
    pub fn as_str(&self) -> &str {
        match self {
            InterestLevel::Hot => "hot",
            InterestLevel::Warm => "warm",
            InterestLevel::Cold => "cold",
            InterestLevel::Unknown(raw) => raw,
        }
    }
}

impl From<String> for InterestLevel {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "hot" => InterestLevel::Hot,
            "warm" => InterestLevel::Warm,
            "cold" => InterestLevel::Cold,
            _ => InterestLevel::Unknown(raw),
        }
    }
}

impl From<InterestLevel> for String {
    fn from(level: InterestLevel) -> Self {
        level.as_str().to_string()
    }
}

impl Default for InterestLevel {
    fn default() -> Self {
        InterestLevel::Unknown(String::new())
    }
}

impl fmt::Display for InterestLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub phone_number: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub interest_level: InterestLevel,
    #[serde(default)]
    pub plan_interest: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub created_at: String,
    #[serde(default)]
    pub human_contacted: Option<bool>,
    #[serde(default)]
    pub human_contact_date: Option<String>,
    #[serde(default)]
    pub human_contact_notes: Option<String>,
    #[serde(default)]
    pub sale_closed: Option<bool>,
    #[serde(default)]
    pub sale_date: Option<String>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub sale_amount: Option<f64>,
    #[serde(default)]
    pub sale_notes: Option<String>,
}

impl Lead {
    /// Name to show in lists: the lead's name, or `Lead 1234` built from the
    /// last four digits of the phone number.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let digits: Vec<char> = self.phone_number.chars().collect();
                let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
                format!("Lead {tail}")
            }
        }
    }

    pub fn is_contacted(&self) -> bool {
        self.human_contacted == Some(true)
    }

    pub fn is_sale_closed(&self) -> bool {
        self.sale_closed == Some(true)
    }
}

/// Server-computed counters shown verbatim on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_leads: u64,
    #[serde(default)]
    pub hot_leads: u64,
    #[serde(default)]
    pub warm_leads: u64,
    #[serde(default)]
    pub cold_leads: u64,
    #[serde(default)]
    pub today_leads: u64,
    #[serde(default)]
    pub human_contacted: u64,
    #[serde(default)]
    pub not_contacted: u64,
    #[serde(default)]
    pub sales_closed: u64,
    #[serde(default)]
    pub no_sale: u64,
}

// ── Conversations ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
    #[serde(other)]
    Other,
}

impl Default for Sender {
    fn default() -> Self {
        Sender::Other
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub sender: Sender,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

// ── Lead mutations ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanContactUpdate {
    pub human_contacted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleUpdate {
    pub sale_closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ── Plans ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub price: f64,
    #[serde(default)]
    pub coverage: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub coverage: Vec<String>,
    pub active: bool,
}

impl From<&Plan> for PlanUpdate {
    fn from(plan: &Plan) -> Self {
        Self {
            name: plan.name.clone(),
            description: plan.description.clone(),
            price: plan.price,
            coverage: plan.coverage.clone(),
            active: plan.active,
        }
    }
}

// ── Appointments ──

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
    #[serde(other)]
    Unknown,
}

impl AppointmentStatus {
    pub const SETTABLE: [AppointmentStatus; 5] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
            AppointmentStatus::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::SETTABLE.into_iter().find(|st| st.as_str() == s)
    }

    /// Single-character glyph used in calendar cells.
    pub fn glyph(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "o",
            AppointmentStatus::Confirmed => "@",
            AppointmentStatus::Completed => "*",
            AppointmentStatus::Cancelled => "x",
            AppointmentStatus::NoShow => "!",
            AppointmentStatus::Unknown => "?",
        }
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Scheduled
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub scheduled_at: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Appointment {
    pub fn display_name(&self) -> String {
        self.customer_name
            .clone()
            .or_else(|| self.phone_number.clone())
            .or_else(|| self.lead_id.as_ref().map(|id| format!("lead {id}")))
            .unwrap_or_else(|| format!("appointment {}", self.id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentCreate {
    pub lead_id: String,
    pub scheduled_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentStatusUpdate {
    pub status: AppointmentStatus,
}

/// Bookable slots. The backend answers either with a bare array or with an
/// object carrying `slots` / `available_slots`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailableSlots {
    pub date: Option<String>,
    pub slots: Vec<String>,
}

impl AvailableSlots {
    pub fn from_value(value: &serde_json::Value) -> Self {
        let date = value.get("date").and_then(|v| v.as_str()).map(str::to_string);
        let list = value
            .as_array()
            .or_else(|| value.get("slots").and_then(|v| v.as_array()))
            .or_else(|| value.get("available_slots").and_then(|v| v.as_array()));
        let slots = list
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        item.as_str()
                            .or_else(|| item.get("datetime").and_then(|v| v.as_str()))
                            .or_else(|| item.get("time").and_then(|v| v.as_str()))
                            .map(str::to_string)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { date, slots }
    }
}

// ── Users & auth ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Agent,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Agent => "agent",
            UserRole::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "agent" => Some(UserRole::Agent),
            _ => None,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Agent
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: UserRole,
}

/// Partial update; only fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

// ── Reports ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Leads,
    Appointments,
}

impl ReportKind {
    pub fn path(&self) -> &'static str {
        match self {
            ReportKind::Leads => "/reports/leads/excel",
            ReportKind::Appointments => "/reports/appointments/excel",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Leads => "leads",
            ReportKind::Appointments => "appointments",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lead_accepts_numeric_id_and_missing_flags() {
        let lead: Lead = serde_json::from_value(json!({
            "id": 7,
            "phone_number": "5511987654321",
            "interest_level": "hot",
            "created_at": "2024-05-01T10:00:00"
        }))
        .unwrap();
        assert_eq!(lead.id, "7");
        assert_eq!(lead.interest_level, InterestLevel::Hot);
        assert_eq!(lead.human_contacted, None);
        assert!(!lead.is_contacted());
        assert_eq!(lead.display_name(), "Lead 4321");
    }

    #[test]
    fn unexpected_interest_level_is_preserved() {
        let lead: Lead = serde_json::from_value(json!({
            "id": "a",
            "interest_level": "lukewarm"
        }))
        .unwrap();
        assert_eq!(lead.interest_level, InterestLevel::Unknown("lukewarm".into()));
        let back = serde_json::to_value(&lead).unwrap();
        assert_eq!(back["interest_level"], "lukewarm");
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let lead: Lead = serde_json::from_value(json!({
            "id": 3,
            "phone_number": null,
            "interest_level": null,
            "created_at": null,
            "sale_amount": null
        }))
        .unwrap();
        assert_eq!(lead.phone_number, "");
        assert_eq!(lead.interest_level, InterestLevel::Unknown(String::new()));
        assert_eq!(lead.created_at, "");
        assert_eq!(lead.sale_amount, None);
    }

    #[test]
    fn decimal_strings_are_amounts() {
        let lead: Lead = serde_json::from_value(json!({
            "id": 4,
            "sale_closed": true,
            "sale_amount": "1500.00"
        }))
        .unwrap();
        assert_eq!(lead.sale_amount, Some(1500.0));

        let plan: Plan = serde_json::from_value(json!({
            "id": 1,
            "name": "Dental Basic",
            "price": " 89.90 "
        }))
        .unwrap();
        assert_eq!(plan.price, 89.9);

        let bad = serde_json::from_value::<Lead>(json!({"id": 5, "sale_amount": "lots"}));
        assert!(bad.is_err());
    }

    #[test]
    fn display_name_prefers_name() {
        let lead = Lead {
            name: Some("Maria".into()),
            phone_number: "123".into(),
            ..Default::default()
        };
        assert_eq!(lead.display_name(), "Maria");

        let short = Lead { phone_number: "12".into(), ..Default::default() };
        assert_eq!(short.display_name(), "Lead 12");
    }

    #[test]
    fn stats_default_missing_counters() {
        let stats: DashboardStats =
            serde_json::from_value(json!({"total_leads": 3, "hot_leads": 1})).unwrap();
        assert_eq!(stats.total_leads, 3);
        assert_eq!(stats.sales_closed, 0);
    }

    #[test]
    fn unknown_sender_does_not_fail() {
        let conv: Conversation = serde_json::from_value(json!({
            "messages": [
                {"sender": "user", "content": "oi", "timestamp": "t1"},
                {"sender": "system", "content": "x", "timestamp": "t2"}
            ]
        }))
        .unwrap();
        assert_eq!(conv.messages[0].sender, Sender::User);
        assert_eq!(conv.messages[1].sender, Sender::Other);
    }

    #[test]
    fn sale_update_skips_empty_optionals() {
        let body = serde_json::to_value(SaleUpdate {
            sale_closed: true,
            sale_amount: None,
            notes: None,
        })
        .unwrap();
        assert_eq!(body, json!({"sale_closed": true}));
    }

    #[test]
    fn slots_from_array_or_object() {
        let bare = AvailableSlots::from_value(&json!(["09:00", "10:00"]));
        assert_eq!(bare.slots, vec!["09:00", "10:00"]);

        let wrapped = AvailableSlots::from_value(&json!({
            "date": "2024-05-02",
            "available_slots": [{"datetime": "2024-05-02T09:00:00"}]
        }));
        assert_eq!(wrapped.date.as_deref(), Some("2024-05-02"));
        assert_eq!(wrapped.slots, vec!["2024-05-02T09:00:00"]);

        assert!(AvailableSlots::from_value(&json!("nope")).slots.is_empty());
    }

    #[test]
    fn appointment_status_wire_names() {
        assert_eq!(serde_json::to_value(AppointmentStatus::NoShow).unwrap(), json!("no_show"));
        assert_eq!(AppointmentStatus::parse("cancelled"), Some(AppointmentStatus::Cancelled));
        assert_eq!(AppointmentStatus::parse("unknown"), None);
        let st: AppointmentStatus = serde_json::from_value(json!("rescheduled")).unwrap();
        assert_eq!(st, AppointmentStatus::Unknown);
    }
}
