//! Background network worker.
//!
//! One `std::thread` owns a current-thread tokio runtime and the only
//! [`ApiClient`]. The UI sends [`Request`]s over a flume channel and gets one
//! [`Response`] back per request, in order.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use lb_api_types::{
    Appointment, AppointmentCreate, AppointmentStatus, AvailableSlots, Conversation,
    DashboardStats, HumanContactUpdate, LoginRequest, Plan, PlanUpdate, ReportKind, SaleUpdate,
    User,
};
use lb_client::{ApiClient, ApiError};
use lb_core::forms::UserSubmission;
use lb_core::leads::LeadList;

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Login(LoginRequest),
    LoadDashboard,
    LoadConversation(String),
    SetHumanContact(String, HumanContactUpdate),
    SetSale(String, SaleUpdate),
    LoadPlans,
    UpdatePlan(String, PlanUpdate),
    LoadAppointments,
    LoadSlots(NaiveDate),
    CreateAppointment(AppointmentCreate),
    SetAppointmentStatus(String, AppointmentStatus),
    DownloadReport(ReportKind),
    LoadUsers,
    SaveUser(UserSubmission),
    DeleteUser(String),
}

/// Mutations whose completion triggers a reload of the affected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    HumanContact,
    Sale,
    PlanSaved,
    AppointmentCreated,
    AppointmentStatus,
    UserSaved,
    UserDeleted,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::HumanContact => "Contact status updated",
            Action::Sale => "Sale status updated",
            Action::PlanSaved => "Plan saved",
            Action::AppointmentCreated => "Appointment booked",
            Action::AppointmentStatus => "Appointment updated",
            Action::UserSaved => "User saved",
            Action::UserDeleted => "User deleted",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Response {
    LoggedIn { username: String },
    /// Carries the operator-facing message only.
    LoginFailed(String),
    Dashboard(Result<(DashboardStats, LeadList), String>),
    Conversation {
        lead_id: String,
        result: Result<Conversation, String>,
    },
    Plans(Result<Vec<Plan>, String>),
    Appointments(Result<Vec<Appointment>, String>),
    Slots {
        date: NaiveDate,
        result: Result<AvailableSlots, String>,
    },
    ReportSaved(Result<PathBuf, String>),
    Users(Result<Vec<User>, String>),
    Completed {
        action: Action,
        result: Result<(), String>,
    },
}

/// Channel ends held by the UI thread.
pub struct WorkerHandle {
    pub tx: flume::Sender<Request>,
    pub rx: flume::Receiver<Response>,
}

/// Spawn the worker thread. It exits when the request sender is dropped.
pub fn spawn(client: ApiClient, reports_dir: PathBuf) -> std::io::Result<WorkerHandle> {
    let (req_tx, req_rx) = flume::unbounded::<Request>();
    let (resp_tx, resp_rx) = flume::unbounded::<Response>();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("lb-worker".into())
        .spawn(move || {
            let mut client = client;
            while let Ok(req) = req_rx.recv() {
                let resp = runtime.block_on(handle(&mut client, &reports_dir, req));
                if resp_tx.send(resp).is_err() {
                    break;
                }
            }
            tracing::debug!("worker stopped");
        })?;

    Ok(WorkerHandle {
        tx: req_tx,
        rx: resp_rx,
    })
}

fn describe(err: &ApiError, what: &str) -> String {
    tracing::warn!(error = %err, what, "request failed");
    err.friendly()
}

/// Execute one request against the backend.
pub async fn handle(client: &mut ApiClient, reports_dir: &Path, req: Request) -> Response {
    match req {
        Request::Login(credentials) => match client.login(&credentials).await {
            Ok(_) => Response::LoggedIn {
                username: credentials.username,
            },
            Err(err) => {
                tracing::warn!(error = %err, username = %credentials.username, "login failed");
                Response::LoginFailed(err.login_message().to_string())
            }
        },
        Request::LoadDashboard => Response::Dashboard(
            client
                .fetch_dashboard()
                .await
                .map_err(|e| describe(&e, "dashboard")),
        ),
        Request::LoadConversation(lead_id) => {
            let result = client
                .fetch_conversation(&lead_id)
                .await
                .map_err(|e| describe(&e, "conversation"));
            Response::Conversation { lead_id, result }
        }
        Request::SetHumanContact(lead_id, update) => Response::Completed {
            action: Action::HumanContact,
            result: client
                .set_human_contact(&lead_id, &update)
                .await
                .map_err(|e| describe(&e, "human contact")),
        },
        Request::SetSale(lead_id, update) => Response::Completed {
            action: Action::Sale,
            result: client
                .set_sale(&lead_id, &update)
                .await
                .map_err(|e| describe(&e, "sale")),
        },
        Request::LoadPlans => {
            Response::Plans(client.plans().await.map_err(|e| describe(&e, "plans")))
        }
        Request::UpdatePlan(plan_id, update) => Response::Completed {
            action: Action::PlanSaved,
            result: client
                .update_plan(&plan_id, &update)
                .await
                .map_err(|e| describe(&e, "plan update")),
        },
        Request::LoadAppointments => Response::Appointments(
            client
                .appointments()
                .await
                .map_err(|e| describe(&e, "appointments")),
        ),
        Request::LoadSlots(date) => Response::Slots {
            date,
            result: client
                .available_slots(Some(date))
                .await
                .map_err(|e| describe(&e, "available slots")),
        },
        Request::CreateAppointment(body) => Response::Completed {
            action: Action::AppointmentCreated,
            result: client
                .create_appointment(&body)
                .await
                .map_err(|e| describe(&e, "book appointment")),
        },
        Request::SetAppointmentStatus(id, status) => Response::Completed {
            action: Action::AppointmentStatus,
            result: client
                .set_appointment_status(&id, status)
                .await
                .map_err(|e| describe(&e, "appointment status")),
        },
        Request::DownloadReport(kind) => {
            let today = Local::now().date_naive();
            let result = match client.download_report(kind).await {
                Ok(report) => report
                    .save(reports_dir, today)
                    .map_err(|e| describe(&ApiError::Io(e), "save report")),
                Err(e) => Err(describe(&e, "report")),
            };
            Response::ReportSaved(result)
        }
        Request::LoadUsers => {
            Response::Users(client.users().await.map_err(|e| describe(&e, "users")))
        }
        Request::SaveUser(submission) => {
            let result = match &submission {
                UserSubmission::Create(body) => client.create_user(body).await,
                UserSubmission::Update(id, body) => client.update_user(id, body).await,
            };
            Response::Completed {
                action: Action::UserSaved,
                result: result.map_err(|e| describe(&e, "save user")),
            }
        }
        Request::DeleteUser(id) => Response::Completed {
            action: Action::UserDeleted,
            result: client
                .delete_user(&id)
                .await
                .map_err(|e| describe(&e, "delete user")),
        },
    }
}
