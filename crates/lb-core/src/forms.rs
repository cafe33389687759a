//! Field-cursor form state for the CRUD screens.
//!
//! A [`Form`] is a list of text fields with one focused field. The typed
//! wrappers ([`LoginForm`], [`PlanForm`], [`AppointmentForm`], [`UserForm`],
//! [`SaleForm`]) know which field is which and validate into request bodies.

use chrono::NaiveDate;

use lb_api_types::{
    AppointmentCreate, LoginRequest, Plan, PlanUpdate, User, UserCreate, UserRole, UserUpdate,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// Generic form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub label: &'static str,
    pub value: String,
    pub secret: bool,
}

impl TextField {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into(), secret: false }
    }

    fn secret(label: &'static str) -> Self {
        Self { label, value: String::new(), secret: true }
    }

    /// What to draw: secrets are masked.
    pub fn display(&self) -> String {
        if self.secret {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub title: String,
    pub fields: Vec<TextField>,
    pub focus: usize,
}

impl Form {
    fn new(title: impl Into<String>, fields: Vec<TextField>) -> Self {
        Self { title: title.into(), fields, focus: 0 }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn input(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.value = value.into();
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.trim()).unwrap_or("")
    }

    fn required(&self, index: usize) -> Result<String, FormError> {
        let v = self.value(index);
        if v.is_empty() {
            Err(FormError::Required(self.fields[index].label))
        } else {
            Ok(v.to_string())
        }
    }

    fn optional(&self, index: usize) -> Option<String> {
        let v = self.value(index);
        (!v.is_empty()).then(|| v.to_string())
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse a money amount; accepts both `99.90` and `99,90`.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<f64, FormError> {
    let normalized = raw.trim().replace(',', ".");
    let value: f64 = normalized.parse().map_err(|_| FormError::Invalid {
        field,
        reason: format!("'{raw}' is not a number"),
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(FormError::Invalid {
            field,
            reason: "must be zero or positive".into(),
        });
    }
    Ok(value)
}

pub fn parse_flag(field: &'static str, raw: &str) -> Result<bool, FormError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" | "on" | "sim" | "s" => Ok(true),
        "n" | "no" | "false" | "0" | "off" | "nao" | "não" => Ok(false),
        other => Err(FormError::Invalid {
            field,
            reason: format!("'{other}' is not yes/no"),
        }),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub form: Form,
}

impl LoginForm {
    const USERNAME: usize = 0;
    const PASSWORD: usize = 1;

    pub fn new(username: Option<&str>) -> Self {
        let mut form = Form::new(
            "Sign in",
            vec![TextField::new("Username", username.unwrap_or("")), TextField::secret("Password")],
        );
        if username.is_some_and(|u| !u.is_empty()) {
            form.focus = Self::PASSWORD;
        }
        Self { form }
    }

    pub fn set_password(&mut self, password: &str) {
        self.form.set(Self::PASSWORD, password);
    }

    pub fn submit(&self) -> Result<LoginRequest, FormError> {
        Ok(LoginRequest {
            username: self.form.required(Self::USERNAME)?,
            // Passwords are not trimmed.
            password: match self.form.fields[Self::PASSWORD].value.as_str() {
                "" => return Err(FormError::Required("Password")),
                p => p.to_string(),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Plan editing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlanForm {
    pub form: Form,
    pub plan_id: String,
}

impl PlanForm {
    const NAME: usize = 0;
    const DESCRIPTION: usize = 1;
    const PRICE: usize = 2;
    const COVERAGE: usize = 3;
    const ACTIVE: usize = 4;

    pub fn edit(plan: &Plan) -> Self {
        let form = Form::new(
            format!("Edit plan {}", plan.name),
            vec![
                TextField::new("Name", plan.name.clone()),
                TextField::new("Description", plan.description.clone().unwrap_or_default()),
                TextField::new("Price", format!("{:.2}", plan.price)),
                TextField::new("Coverage (comma separated)", plan.coverage.join(", ")),
                TextField::new("Active (yes/no)", yes_no(plan.active)),
            ],
        );
        Self { form, plan_id: plan.id.clone() }
    }

    pub fn submit(&self) -> Result<(String, PlanUpdate), FormError> {
        let coverage = self
            .form
            .value(Self::COVERAGE)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let update = PlanUpdate {
            name: self.form.required(Self::NAME)?,
            description: self.form.optional(Self::DESCRIPTION),
            price: parse_amount("Price", &self.form.required(Self::PRICE)?)?,
            coverage,
            active: parse_flag("Active", &self.form.required(Self::ACTIVE)?)?,
        };
        Ok((self.plan_id.clone(), update))
    }
}

// ---------------------------------------------------------------------------
// Appointment booking
// ---------------------------------------------------------------------------

/// New-appointment form. The slot is picked from the list returned by
/// `/appointments/available-slots` rather than typed.
#[derive(Debug, Clone)]
pub struct AppointmentForm {
    pub form: Form,
    pub slots: Vec<String>,
    pub slot_index: usize,
}

impl AppointmentForm {
    const LEAD: usize = 0;
    const DATE: usize = 1;
    const NOTES: usize = 2;

    pub fn new(lead_id: Option<&str>, date: NaiveDate) -> Self {
        let form = Form::new(
            "New appointment",
            vec![
                TextField::new("Lead id", lead_id.unwrap_or("")),
                TextField::new("Date (YYYY-MM-DD)", date.format("%Y-%m-%d").to_string()),
                TextField::new("Notes", ""),
            ],
        );
        Self { form, slots: Vec::new(), slot_index: 0 }
    }

    pub fn date(&self) -> Result<NaiveDate, FormError> {
        let raw = self.form.required(Self::DATE)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| FormError::Invalid {
            field: "Date",
            reason: format!("'{raw}' is not YYYY-MM-DD"),
        })
    }

    /// Typing into the date field invalidates the fetched slots.
    pub fn input(&mut self, c: char) {
        self.form.input(c);
        self.invalidate_slots_if_date();
    }

    pub fn backspace(&mut self) {
        self.form.backspace();
        self.invalidate_slots_if_date();
    }

    fn invalidate_slots_if_date(&mut self) {
        if self.form.focus == Self::DATE {
            self.slots.clear();
            self.slot_index = 0;
        }
    }

    pub fn lead_id(&self) -> &str {
        self.form.value(Self::LEAD)
    }

    pub fn set_slots(&mut self, slots: Vec<String>) {
        self.slots = slots;
        self.slot_index = 0;
    }

    pub fn next_slot(&mut self) {
        if !self.slots.is_empty() {
            self.slot_index = (self.slot_index + 1) % self.slots.len();
        }
    }

    pub fn prev_slot(&mut self) {
        if !self.slots.is_empty() {
            self.slot_index = (self.slot_index + self.slots.len() - 1) % self.slots.len();
        }
    }

    pub fn selected_slot(&self) -> Option<&str> {
        self.slots.get(self.slot_index).map(String::as_str)
    }

    /// Build the request. See [`slot_timestamp`].
    pub fn submit(&self) -> Result<AppointmentCreate, FormError> {
        let lead_id = self.form.required(Self::LEAD)?;
        let date = self.date()?;
        let slot = self.selected_slot().ok_or(FormError::Required("Slot"))?;
        Ok(AppointmentCreate {
            lead_id,
            scheduled_at: slot_timestamp(slot, date),
            notes: self.form.optional(Self::NOTES),
        })
    }
}

/// Full timestamp for a slot. Full timestamps pass through; bare times
/// (`09:00`) are placed on `date`.
pub fn slot_timestamp(slot: &str, date: NaiveDate) -> String {
    let slot = slot.trim();
    if slot.contains('T') || slot.contains('-') {
        slot.to_string()
    } else {
        let time = if slot.len() == 5 { format!("{slot}:00") } else { slot.to_string() };
        format!("{}T{}", date.format("%Y-%m-%d"), time)
    }
}

// ---------------------------------------------------------------------------
// User administration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UserSubmission {
    Create(UserCreate),
    Update(String, UserUpdate),
}

#[derive(Debug, Clone)]
pub struct UserForm {
    pub form: Form,
    pub editing: Option<String>,
}

impl UserForm {
    const USERNAME: usize = 0;
    const EMAIL: usize = 1;
    const FULL_NAME: usize = 2;
    const ROLE: usize = 3;
    const ACTIVE: usize = 4;
    const PASSWORD: usize = 5;

    pub fn create() -> Self {
        Self {
            form: Form::new("New user", Self::fields("", "", "", UserRole::Agent, true)),
            editing: None,
        }
    }

    pub fn edit(user: &User) -> Self {
        Self {
            form: Form::new(
                format!("Edit user {}", user.username),
                Self::fields(
                    &user.username,
                    user.email.as_deref().unwrap_or(""),
                    user.full_name.as_deref().unwrap_or(""),
                    user.role.clone(),
                    user.active,
                ),
            ),
            editing: Some(user.id.clone()),
        }
    }

    fn fields(username: &str, email: &str, full_name: &str, role: UserRole, active: bool) -> Vec<TextField> {
        vec![
            TextField::new("Username", username),
            TextField::new("Email", email),
            TextField::new("Full name", full_name),
            TextField::new("Role (admin/agent)", role.as_str()),
            TextField::new("Active (yes/no)", yes_no(active)),
            TextField::secret("Password"),
        ]
    }

    fn email(&self) -> Result<Option<String>, FormError> {
        match self.form.optional(Self::EMAIL) {
            Some(email) if !email.contains('@') => Err(FormError::Invalid {
                field: "Email",
                reason: format!("'{email}' is not an email address"),
            }),
            other => Ok(other),
        }
    }

    fn role(&self) -> Result<UserRole, FormError> {
        let raw = self.form.required(Self::ROLE)?;
        UserRole::parse(&raw).ok_or_else(|| FormError::Invalid {
            field: "Role",
            reason: format!("'{raw}' is not admin or agent"),
        })
    }

    pub fn submit(&self) -> Result<UserSubmission, FormError> {
        let email = self.email()?;
        let full_name = self.form.optional(Self::FULL_NAME);
        let role = self.role()?;
        let password = self.form.fields[Self::PASSWORD].value.clone();

        match &self.editing {
            None => {
                if password.is_empty() {
                    return Err(FormError::Required("Password"));
                }
                Ok(UserSubmission::Create(UserCreate {
                    username: self.form.required(Self::USERNAME)?,
                    password,
                    email,
                    full_name,
                    role,
                }))
            }
            Some(id) => Ok(UserSubmission::Update(
                id.clone(),
                UserUpdate {
                    email,
                    full_name,
                    role: Some(role),
                    active: Some(parse_flag("Active", &self.form.required(Self::ACTIVE)?)?),
                    password: (!password.is_empty()).then_some(password),
                },
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Sale prompt
// ---------------------------------------------------------------------------

/// Prompt shown before closing a sale: optional amount and notes.
#[derive(Debug, Clone)]
pub struct SaleForm {
    pub form: Form,
    pub lead_id: String,
}

impl SaleForm {
    const AMOUNT: usize = 0;
    const NOTES: usize = 1;

    pub fn new(lead_id: impl Into<String>, lead_name: &str) -> Self {
        Self {
            form: Form::new(
                format!("Close sale for {lead_name}"),
                vec![TextField::new("Amount (optional)", ""), TextField::new("Notes", "")],
            ),
            lead_id: lead_id.into(),
        }
    }

    pub fn submit(&self) -> Result<(Option<f64>, Option<String>), FormError> {
        let amount = match self.form.optional(Self::AMOUNT) {
            Some(raw) => Some(parse_amount("Amount", &raw)?),
            None => None,
        };
        Ok((amount, self.form.optional(Self::NOTES)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.input(c);
        }
    }

    #[test]
    fn field_cursor_wraps() {
        let mut login = LoginForm::new(None);
        assert_eq!(login.form.focus, 0);
        login.form.next_field();
        login.form.next_field();
        assert_eq!(login.form.focus, 0);
        login.form.prev_field();
        assert_eq!(login.form.focus, 1);
    }

    #[test]
    fn login_requires_both_fields() {
        let mut login = LoginForm::new(Some("ana"));
        assert_eq!(login.form.focus, 1);
        assert_eq!(login.submit().unwrap_err(), FormError::Required("Password"));
        type_into(&mut login.form, "s3cret ");
        let req = login.submit().unwrap();
        assert_eq!(req.username, "ana");
        assert_eq!(req.password, "s3cret ");
        assert_eq!(login.form.fields[1].display(), "*******");
    }

    #[test]
    fn plan_form_round_trips_and_validates_price() {
        let plan = Plan {
            id: "p1".into(),
            name: "Odonto Basic".into(),
            description: None,
            price: 49.9,
            coverage: vec!["cleaning".into(), "x-ray".into()],
            active: true,
        };
        let mut form = PlanForm::edit(&plan);
        let (id, update) = form.submit().unwrap();
        assert_eq!(id, "p1");
        assert_eq!(update, PlanUpdate::from(&plan));

        form.form.set(PlanForm::PRICE, "59,90");
        assert_eq!(form.submit().unwrap().1.price, 59.9);

        form.form.set(PlanForm::PRICE, "cheap");
        assert!(matches!(form.submit(), Err(FormError::Invalid { field: "Price", .. })));
    }

    #[test]
    fn appointment_combines_date_and_time_slot() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let mut form = AppointmentForm::new(Some("42"), date);
        assert_eq!(form.submit().unwrap_err(), FormError::Required("Slot"));

        form.set_slots(vec!["09:00".into(), "2024-05-02T10:00:00".into()]);
        assert_eq!(form.submit().unwrap().scheduled_at, "2024-05-02T09:00:00");
        form.next_slot();
        assert_eq!(form.submit().unwrap().scheduled_at, "2024-05-02T10:00:00");
        form.next_slot();
        assert_eq!(form.selected_slot(), Some("09:00"));

        form.form.focus = AppointmentForm::DATE;
        form.backspace();
        assert!(form.slots.is_empty());

        form.form.set(AppointmentForm::DATE, "02/05/2024");
        assert!(form.date().is_err());
    }

    #[test]
    fn user_create_needs_password_update_does_not() {
        let mut form = UserForm::create();
        form.form.set(UserForm::USERNAME, "joao");
        assert_eq!(form.submit().unwrap_err(), FormError::Required("Password"));
        form.form.set(UserForm::PASSWORD, "pw");
        assert!(matches!(form.submit().unwrap(), UserSubmission::Create(u) if u.username == "joao"));

        let user = User { id: "u1".into(), username: "joao".into(), ..Default::default() };
        let mut edit = UserForm::edit(&user);
        edit.form.set(UserForm::ACTIVE, "no");
        match edit.submit().unwrap() {
            UserSubmission::Update(id, update) => {
                assert_eq!(id, "u1");
                assert_eq!(update.active, Some(false));
                assert_eq!(update.password, None);
            }
            other => panic!("unexpected {other:?}"),
        }

        edit.form.set(UserForm::EMAIL, "not-an-email");
        assert!(edit.submit().is_err());
        edit.form.set(UserForm::EMAIL, "");
        edit.form.set(UserForm::ROLE, "owner");
        assert!(edit.submit().is_err());
    }

    #[test]
    fn sale_form_amount_is_optional() {
        let mut form = SaleForm::new("7", "Maria");
        assert_eq!(form.submit().unwrap(), (None, None));
        form.form.set(SaleForm::AMOUNT, "120,50");
        form.form.set(SaleForm::NOTES, "annual plan");
        assert_eq!(form.submit().unwrap(), (Some(120.5), Some("annual plan".into())));
        form.form.set(SaleForm::AMOUNT, "-1");
        assert!(form.submit().is_err());
    }

    #[test]
    fn slot_timestamp_passes_full_timestamps_through() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(slot_timestamp("2024-05-03T11:00:00", date), "2024-05-03T11:00:00");
        assert_eq!(slot_timestamp(" 09:30 ", date), "2024-05-02T09:30:00");
        assert_eq!(slot_timestamp("09:30:15", date), "2024-05-02T09:30:15");
    }
}
