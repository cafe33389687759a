use std::path::PathBuf;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use lb_api_types::{
    Appointment, AppointmentStatus, AvailableSlots, Plan, ReportKind, SaleUpdate, User,
};
use lb_core::calendar;
use lb_core::config::Config;
use lb_core::dashboard::DashboardState;
use lb_core::filter::LeadFilter;
use lb_core::forms::{AppointmentForm, Form, LoginForm, PlanForm, SaleForm, UserForm};

use crate::widgets::toast::{Toast, ToastLevel, ToastStack};
use crate::worker::{Action, Request, Response};

/// Tab names displayed in the header.
pub const TAB_NAMES: &[&str] = &[
    "Dashboard",
    "Appointments",
    "Plans",
    "Reports",
    "Users",
    "WhatsApp",
];

pub const TAB_DASHBOARD: usize = 0;
pub const TAB_APPOINTMENTS: usize = 1;
pub const TAB_PLANS: usize = 2;
pub const TAB_REPORTS: usize = 3;
pub const TAB_USERS: usize = 4;
pub const TAB_WHATSAPP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Main,
}

/// Overlay that captures keys until closed.
#[derive(Debug, Clone)]
pub enum Modal {
    Plan(PlanForm),
    Appointment(AppointmentForm),
    User(UserForm),
    Sale(SaleForm),
    ConfirmDelete { user_id: String, username: String },
}

impl Modal {
    pub fn form(&self) -> Option<&Form> {
        match self {
            Modal::Plan(f) => Some(&f.form),
            Modal::Appointment(f) => Some(&f.form),
            Modal::User(f) => Some(&f.form),
            Modal::Sale(f) => Some(&f.form),
            Modal::ConfirmDelete { .. } => None,
        }
    }

    fn form_mut(&mut self) -> Option<&mut Form> {
        match self {
            Modal::Plan(f) => Some(&mut f.form),
            Modal::Appointment(f) => Some(&mut f.form),
            Modal::User(f) => Some(&mut f.form),
            Modal::Sale(f) => Some(&mut f.form),
            Modal::ConfirmDelete { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub screen: Screen,
    pub current_tab: usize,
    pub should_quit: bool,
    pub show_help: bool,

    pub backend_url: String,
    /// Set once `/auth/login` succeeded.
    pub username: Option<String>,
    pub login: LoginForm,
    pub login_error: Option<String>,
    pub login_pending: bool,

    // Data
    pub dashboard: DashboardState,
    pub appointments: Vec<Appointment>,
    pub appointment_cursor: usize,
    pub plans: Vec<Plan>,
    pub plan_cursor: usize,
    pub users: Vec<User>,
    pub user_cursor: usize,
    pub reports_dir: PathBuf,
    pub last_report: Option<PathBuf>,

    // Overlays
    pub modal: Option<Modal>,
    /// Blocking error message; dismissed with Enter or Esc.
    pub alert: Option<String>,
    pub toasts: ToastStack,

    /// Requests sent to the worker that have not been answered yet.
    pub pending: usize,
    outbox: Vec<Request>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            screen: Screen::Login,
            current_tab: TAB_DASHBOARD,
            should_quit: false,
            show_help: false,
            backend_url: config.backend.url.clone(),
            username: None,
            login: LoginForm::new(config.auth.username.as_deref()),
            login_error: None,
            login_pending: false,
            dashboard: DashboardState::new(config.ui.filter()),
            appointments: Vec::new(),
            appointment_cursor: 0,
            plans: Vec::new(),
            plan_cursor: 0,
            users: Vec::new(),
            user_cursor: 0,
            reports_dir: config.reports.dir(),
            last_report: None,
            modal: None,
            alert: None,
            toasts: ToastStack::default(),
            pending: 0,
            outbox: Vec::new(),
        }
    }

    /// Interactive start: sign in right away when a password came from the
    /// environment, otherwise wait on the login form.
    pub fn start(&mut self, password: Option<String>) {
        if let Some(password) = password {
            if !self.login.form.value(0).is_empty() {
                self.login.set_password(&password);
                self.submit_login();
            }
        }
    }

    /// Headless start: no login form. Signs in first when credentials are
    /// available, then loads the dashboard.
    pub fn start_headless(&mut self, password: Option<String>) {
        self.screen = Screen::Main;
        match (password, self.login.form.value(0).is_empty()) {
            (Some(password), false) => {
                self.login.set_password(&password);
                self.submit_login();
            }
            _ => self.reload_dashboard(),
        }
    }

    // -- Worker plumbing ------------------------------------------------

    fn request(&mut self, req: Request) {
        self.outbox.push(req);
    }

    /// Requests queued since the last call. Counted as pending.
    pub fn take_requests(&mut self) -> Vec<Request> {
        let reqs = std::mem::take(&mut self.outbox);
        self.pending += reqs.len();
        reqs
    }

    pub fn tick(&mut self) {
        self.toasts.tick();
    }

    pub fn toast(&mut self, message: impl Into<String>, level: ToastLevel) {
        self.toasts.push(Toast::new(message, level));
    }

    /// Fold a worker response into the state.
    pub fn apply(&mut self, resp: Response) {
        self.pending = self.pending.saturating_sub(1);
        match resp {
            Response::LoggedIn { username } => {
                self.login_pending = false;
                self.login_error = None;
                self.login.set_password("");
                self.screen = Screen::Main;
                self.toast(format!("Signed in as {username}"), ToastLevel::Success);
                self.username = Some(username);
                self.reload_dashboard();
            }
            Response::LoginFailed(message) => {
                self.login_pending = false;
                self.login.set_password("");
                // Headless sign-in failed: still try the dashboard, the
                // backend may not require auth.
                if self.screen == Screen::Main {
                    self.alert = Some(message.clone());
                    self.reload_dashboard();
                }
                self.login_error = Some(message);
            }
            Response::Dashboard(Ok((stats, leads))) => {
                self.dashboard.apply_snapshot(stats, leads);
            }
            Response::Dashboard(Err(message)) => {
                self.dashboard.load_failed(message.clone());
                self.alert = Some(message);
            }
            Response::Conversation { lead_id, result } => {
                let applied = match result {
                    Ok(conv) => self.dashboard.apply_conversation(&lead_id, conv),
                    Err(message) => self.dashboard.conversation_failed(&lead_id, message),
                };
                if !applied {
                    tracing::debug!(lead_id = %lead_id, "dropping stale conversation response");
                }
            }
            Response::Plans(result) => match result {
                Ok(plans) => {
                    self.plans = plans;
                    self.plan_cursor = clamp(self.plan_cursor, self.plans.len());
                }
                Err(message) => self.alert = Some(message),
            },
            Response::Appointments(result) => match result {
                Ok(appointments) => {
                    self.appointments = appointments;
                    self.appointment_cursor =
                        clamp(self.appointment_cursor, self.appointments.len());
                }
                Err(message) => self.alert = Some(message),
            },
            Response::Slots { date, result } => self.apply_slots(date, result),
            Response::ReportSaved(result) => match result {
                Ok(path) => {
                    self.toast(format!("Saved {}", path.display()), ToastLevel::Success);
                    self.last_report = Some(path);
                }
                Err(message) => self.alert = Some(message),
            },
            Response::Users(result) => match result {
                Ok(users) => {
                    self.users = users;
                    self.user_cursor = clamp(self.user_cursor, self.users.len());
                }
                Err(message) => self.alert = Some(message),
            },
            Response::Completed { action, result } => {
                match result {
                    Ok(()) => self.toast(action.label(), ToastLevel::Success),
                    Err(message) => self.alert = Some(message),
                }
                // Reload on success and on failure alike.
                match action {
                    Action::HumanContact | Action::Sale => self.reload_dashboard(),
                    Action::PlanSaved => self.request(Request::LoadPlans),
                    Action::AppointmentCreated | Action::AppointmentStatus => {
                        self.request(Request::LoadAppointments)
                    }
                    Action::UserSaved | Action::UserDeleted => self.request(Request::LoadUsers),
                }
            }
        }
    }

    fn apply_slots(&mut self, date: NaiveDate, result: Result<AvailableSlots, String>) {
        let Some(Modal::Appointment(form)) = self.modal.as_mut() else {
            return;
        };
        if form.date().ok() != Some(date) {
            return;
        }
        let notice = match result {
            Ok(slots) => {
                let empty = slots.slots.is_empty();
                form.set_slots(slots.slots);
                empty.then(|| (format!("No free slots on {date}"), ToastLevel::Warning))
            }
            Err(message) => Some((message, ToastLevel::Error)),
        };
        if let Some((message, level)) = notice {
            self.toast(message, level);
        }
    }

    // -- Actions shared by keys and headless commands --------------------

    pub fn submit_login(&mut self) {
        match self.login.submit() {
            Ok(credentials) => {
                self.login_pending = true;
                self.login_error = None;
                self.request(Request::Login(credentials));
            }
            Err(err) => self.login_error = Some(err.to_string()),
        }
    }

    /// Skip the login form for backends without authentication.
    pub fn continue_without_login(&mut self) {
        self.screen = Screen::Main;
        self.reload_dashboard();
    }

    pub fn reload_dashboard(&mut self) {
        self.dashboard.begin_load();
        self.request(Request::LoadDashboard);
    }

    pub fn switch_tab(&mut self, idx: usize) {
        if idx >= TAB_NAMES.len() {
            return;
        }
        self.current_tab = idx;
        self.reload_current_tab();
    }

    pub fn reload_current_tab(&mut self) {
        match self.current_tab {
            TAB_DASHBOARD => self.reload_dashboard(),
            TAB_APPOINTMENTS => self.request(Request::LoadAppointments),
            TAB_PLANS => self.request(Request::LoadPlans),
            TAB_USERS => self.request(Request::LoadUsers),
            _ => {}
        }
    }

    /// Move the cursor of whichever list the current tab shows.
    pub fn cursor_down(&mut self) {
        match self.current_tab {
            TAB_DASHBOARD => self.dashboard.cursor_down(),
            TAB_APPOINTMENTS => cursor_down(&mut self.appointment_cursor, self.appointments.len()),
            TAB_PLANS => cursor_down(&mut self.plan_cursor, self.plans.len()),
            TAB_USERS => cursor_down(&mut self.user_cursor, self.users.len()),
            _ => {}
        }
    }

    pub fn cursor_up(&mut self) {
        match self.current_tab {
            TAB_DASHBOARD => self.dashboard.cursor_up(),
            TAB_APPOINTMENTS => cursor_up(&mut self.appointment_cursor),
            TAB_PLANS => cursor_up(&mut self.plan_cursor),
            TAB_USERS => cursor_up(&mut self.user_cursor),
            _ => {}
        }
    }

    pub fn set_filter(&mut self, filter: LeadFilter) {
        self.dashboard.set_filter(filter);
    }

    /// Select a lead and fetch its conversation when the selection changed.
    pub fn select_lead(&mut self, id: &str) -> bool {
        if self.dashboard.select_lead(id) {
            self.request(Request::LoadConversation(id.to_string()));
            true
        } else {
            false
        }
    }

    pub fn select_at_cursor(&mut self) {
        if let Some(id) = self.dashboard.select_at_cursor() {
            self.request(Request::LoadConversation(id));
        }
    }

    pub fn toggle_contact(&mut self) -> bool {
        match self.dashboard.contact_toggle(None) {
            Some((id, body)) => {
                self.request(Request::SetHumanContact(id, body));
                true
            }
            None => false,
        }
    }

    /// Flip the sale flag directly, without the amount prompt.
    pub fn toggle_sale(&mut self, amount: Option<f64>, notes: Option<String>) -> bool {
        match self.dashboard.sale_toggle(amount, notes) {
            Some((id, body)) => {
                self.request(Request::SetSale(id, body));
                true
            }
            None => false,
        }
    }

    /// `S`: reopening a closed sale is immediate, closing one asks for an
    /// amount first.
    fn sale_key(&mut self) {
        let Some(lead) = self.dashboard.target_lead() else {
            return;
        };
        if lead.is_sale_closed() {
            self.toggle_sale(None, None);
        } else {
            self.modal = Some(Modal::Sale(SaleForm::new(lead.id.clone(), &lead.display_name())));
        }
    }

    /// Appointments in display order: by day and time, unscheduled last.
    pub fn appointment_rows(&self) -> Vec<&Appointment> {
        let cal = calendar::group_by_day(&self.appointments, self.dashboard.clock().offset);
        let mut rows: Vec<&Appointment> = cal.days().flat_map(|(_, day)| day.iter().copied()).collect();
        rows.extend(cal.unscheduled().iter().copied());
        rows
    }

    pub fn selected_appointment(&self) -> Option<&Appointment> {
        self.appointment_rows().get(self.appointment_cursor).copied()
    }

    fn set_appointment_status(&mut self, status: AppointmentStatus) {
        if let Some(id) = self.selected_appointment().map(|a| a.id.clone()) {
            self.request(Request::SetAppointmentStatus(id, status));
        }
    }

    fn open_appointment_form(&mut self) {
        let lead_id = self.dashboard.target_lead().map(|l| l.id.clone());
        self.dashboard.refresh_clock();
        let today = self.dashboard.clock().today;
        self.modal = Some(Modal::Appointment(AppointmentForm::new(lead_id.as_deref(), today)));
        self.request(Request::LoadSlots(today));
    }

    pub fn download_report(&mut self, kind: ReportKind) {
        self.toast(format!("Downloading {} report", kind.as_str()), ToastLevel::Info);
        self.request(Request::DownloadReport(kind));
    }

    // -- Keys -----------------------------------------------------------

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // The alert blocks everything else.
        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.alert = None;
            }
            return;
        }

        if self.screen == Screen::Login {
            self.on_login_key(key);
            return;
        }

        if self.modal.is_some() {
            self.on_modal_key(key);
            return;
        }

        // Help modal intercepts Esc and ?
        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return;
            }
            KeyCode::Char(c @ '1'..='9') => {
                self.switch_tab((c as usize) - ('1' as usize));
                return;
            }
            KeyCode::Tab => {
                self.switch_tab((self.current_tab + 1) % TAB_NAMES.len());
                return;
            }
            KeyCode::BackTab => {
                self.switch_tab((self.current_tab + TAB_NAMES.len() - 1) % TAB_NAMES.len());
                return;
            }
            _ => {}
        }

        match self.current_tab {
            TAB_DASHBOARD => self.on_dashboard_key(key),
            TAB_APPOINTMENTS => self.on_appointments_key(key),
            TAB_PLANS => self.on_plans_key(key),
            TAB_REPORTS => self.on_reports_key(key),
            TAB_USERS => self.on_users_key(key),
            _ => {}
        }
    }

    fn on_login_key(&mut self, key: KeyEvent) {
        if self.login_pending {
            return;
        }
        match key.code {
            KeyCode::Enter => self.submit_login(),
            KeyCode::Esc => self.continue_without_login(),
            KeyCode::Tab | KeyCode::Down => self.login.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.login.form.prev_field(),
            KeyCode::Backspace => self.login.form.backspace(),
            KeyCode::Char(c) => self.login.form.input(c),
            _ => {}
        }
    }

    fn on_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.cursor_down(),
            KeyCode::Char('k') | KeyCode::Up => self.cursor_up(),
            KeyCode::Char('f') => self.dashboard.next_filter(),
            KeyCode::Char('F') => self.dashboard.prev_filter(),
            KeyCode::Char(c) if filter_for_key(c).is_some() => {
                if let Some(filter) = filter_for_key(c) {
                    self.set_filter(filter);
                }
            }
            KeyCode::Enter => self.select_at_cursor(),
            KeyCode::Esc => self.dashboard.clear_selection(),
            KeyCode::Char('C') => {
                self.toggle_contact();
            }
            KeyCode::Char('S') => self.sale_key(),
            KeyCode::Char('r') => self.reload_dashboard(),
            _ => {}
        }
    }

    fn on_appointments_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.cursor_down(),
            KeyCode::Char('k') | KeyCode::Up => self.cursor_up(),
            KeyCode::Char('n') => self.open_appointment_form(),
            KeyCode::Char('c') => self.set_appointment_status(AppointmentStatus::Confirmed),
            KeyCode::Char('x') => self.set_appointment_status(AppointmentStatus::Cancelled),
            KeyCode::Char('d') => self.set_appointment_status(AppointmentStatus::Completed),
            KeyCode::Char('r') => self.request(Request::LoadAppointments),
            _ => {}
        }
    }

    fn on_plans_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.cursor_down(),
            KeyCode::Char('k') | KeyCode::Up => self.cursor_up(),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(plan) = self.plans.get(self.plan_cursor) {
                    self.modal = Some(Modal::Plan(PlanForm::edit(plan)));
                }
            }
            KeyCode::Char('r') => self.request(Request::LoadPlans),
            _ => {}
        }
    }

    fn on_reports_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('l') => self.download_report(ReportKind::Leads),
            KeyCode::Char('a') => self.download_report(ReportKind::Appointments),
            _ => {}
        }
    }

    fn on_users_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.cursor_down(),
            KeyCode::Char('k') | KeyCode::Up => self.cursor_up(),
            KeyCode::Char('n') => self.modal = Some(Modal::User(UserForm::create())),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(user) = self.users.get(self.user_cursor) {
                    self.modal = Some(Modal::User(UserForm::edit(user)));
                }
            }
            KeyCode::Char('D') => {
                if let Some(user) = self.users.get(self.user_cursor) {
                    self.modal = Some(Modal::ConfirmDelete {
                        user_id: user.id.clone(),
                        username: user.username.clone(),
                    });
                }
            }
            KeyCode::Char('r') => self.request(Request::LoadUsers),
            _ => {}
        }
    }

    fn on_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };

        if let Modal::ConfirmDelete { user_id, .. } = modal {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let id = user_id.clone();
                    self.modal = None;
                    self.request(Request::DeleteUser(id));
                }
                KeyCode::Char('n') | KeyCode::Esc => self.modal = None,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.modal = None,
            KeyCode::Enter => self.submit_modal(),
            KeyCode::Tab | KeyCode::Down => {
                if let Some(form) = modal.form_mut() {
                    form.next_field();
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if let Some(form) = modal.form_mut() {
                    form.prev_field();
                }
            }
            KeyCode::Left | KeyCode::Right => {
                if let Modal::Appointment(form) = modal {
                    if key.code == KeyCode::Left {
                        form.prev_slot();
                    } else {
                        form.next_slot();
                    }
                }
            }
            KeyCode::Backspace => match modal {
                Modal::Appointment(form) => form.backspace(),
                other => {
                    if let Some(form) = other.form_mut() {
                        form.backspace();
                    }
                }
            },
            KeyCode::Char(c) => match modal {
                Modal::Appointment(form) => form.input(c),
                other => {
                    if let Some(form) = other.form_mut() {
                        form.input(c);
                    }
                }
            },
            _ => {}
        }
    }

    fn submit_modal(&mut self) {
        let Some(modal) = self.modal.take() else {
            return;
        };

        // First Enter on a booking fetches slots for the typed date.
        if let Modal::Appointment(form) = &modal {
            if form.slots.is_empty() {
                match form.date() {
                    Ok(date) => {
                        self.toast(format!("Loading slots for {date}"), ToastLevel::Info);
                        self.request(Request::LoadSlots(date));
                    }
                    Err(err) => self.toast(err.to_string(), ToastLevel::Error),
                }
                self.modal = Some(modal);
                return;
            }
        }

        let outcome = match &modal {
            Modal::Plan(form) => form
                .submit()
                .map(|(id, update)| Some(Request::UpdatePlan(id, update))),
            Modal::User(form) => form.submit().map(|s| Some(Request::SaveUser(s))),
            Modal::Sale(form) => form.submit().map(|(sale_amount, notes)| {
                let body = SaleUpdate { sale_closed: true, sale_amount, notes };
                Some(Request::SetSale(form.lead_id.clone(), body))
            }),
            Modal::Appointment(form) => form
                .submit()
                .map(|body| Some(Request::CreateAppointment(body))),
            Modal::ConfirmDelete { .. } => Ok(None),
        };
        match outcome {
            Ok(Some(req)) => self.request(req),
            Ok(None) => {}
            Err(err) => {
                self.toast(err.to_string(), ToastLevel::Error);
                self.modal = Some(modal);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Direct filter keys on the dashboard.
pub fn filter_for_key(c: char) -> Option<LeadFilter> {
    Some(match c {
        'a' => LeadFilter::All,
        'h' => LeadFilter::Hot,
        'w' => LeadFilter::Warm,
        'c' => LeadFilter::Cold,
        't' => LeadFilter::Today,
        'o' => LeadFilter::Contacted,
        'n' => LeadFilter::NotContacted,
        's' => LeadFilter::SalesClosed,
        'x' => LeadFilter::NoSale,
        _ => return None,
    })
}

fn cursor_down(cursor: &mut usize, len: usize) {
    if len > 0 && *cursor < len - 1 {
        *cursor += 1;
    }
}

fn cursor_up(cursor: &mut usize) {
    *cursor = cursor.saturating_sub(1);
}

fn clamp(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}
