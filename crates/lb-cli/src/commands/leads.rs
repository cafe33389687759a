use std::fmt::Write;

use lb_client::{ApiClient, ApiError};
use lb_core::api::{Conversation, DashboardStats, HumanContactUpdate, Lead, SaleUpdate, Sender};
use lb_core::filter::{FilterClock, LeadFilter};
use lb_core::leads::LeadList;
use lb_core::money::format_brl;
use lb_core::timefmt;

use super::{flag, friendly_error, print_json, GlobalOpts};

/// Run the `stats` subcommand.
pub async fn stats(client: &ApiClient, opts: &GlobalOpts) -> anyhow::Result<()> {
    let stats = client.fetch_stats().await.map_err(friendly_error)?;
    if opts.json {
        return print_json(&stats);
    }
    print!("{}", render_stats(&stats));
    Ok(())
}

/// Run the `leads` subcommand.
pub async fn list(client: &ApiClient, opts: &GlobalOpts, filter: LeadFilter) -> anyhow::Result<()> {
    let leads = client.fetch_leads().await.map_err(friendly_error)?;
    let clock = FilterClock::local_now();
    if opts.json {
        return print_json(&leads.filtered(filter, &clock));
    }
    print!("{}", render_leads(&leads, filter, &clock));
    Ok(())
}

pub async fn conversation(client: &ApiClient, opts: &GlobalOpts, lead_id: &str) -> anyhow::Result<()> {
    let conversation = client.fetch_conversation(lead_id).await.map_err(friendly_error)?;
    if opts.json {
        return print_json(&conversation);
    }
    let offset = FilterClock::local_now().offset;
    print!("{}", render_conversation(lead_id, &conversation, offset));
    Ok(())
}

pub async fn contact(
    client: &ApiClient,
    opts: &GlobalOpts,
    lead_id: &str,
    contacted: bool,
    notes: Option<String>,
) -> anyhow::Result<()> {
    let update = HumanContactUpdate { human_contacted: contacted, notes };
    let result = client.set_human_contact(lead_id, &update).await;
    if result.is_ok() {
        if contacted {
            println!("Lead {lead_id} marked as contacted.");
        } else {
            println!("Lead {lead_id} marked as not contacted.");
        }
    }
    reload_after(client, opts, result).await
}

pub async fn sale(
    client: &ApiClient,
    opts: &GlobalOpts,
    lead_id: &str,
    closed: bool,
    amount: Option<f64>,
    notes: Option<String>,
) -> anyhow::Result<()> {
    let update = SaleUpdate {
        sale_closed: closed,
        sale_amount: if closed { amount } else { None },
        notes,
    };
    let result = client.set_sale(lead_id, &update).await;
    if result.is_ok() {
        match (closed, update.sale_amount) {
            (true, Some(amount)) => println!("Lead {lead_id}: sale closed ({}).", format_brl(amount)),
            (true, None) => println!("Lead {lead_id}: sale closed."),
            (false, _) => println!("Lead {lead_id}: sale reopened."),
        }
    }
    reload_after(client, opts, result).await
}

/// Print fresh stats whether or not the mutation went through. The
/// mutation's own error wins over a failed reload.
async fn reload_after<T>(
    client: &ApiClient,
    opts: &GlobalOpts,
    result: Result<T, ApiError>,
) -> anyhow::Result<()> {
    let reloaded = stats(client, opts).await;
    result.map_err(friendly_error)?;
    reloaded
}

pub fn render_stats(stats: &DashboardStats) -> String {
    let rows = [
        ("Total leads", stats.total_leads),
        ("Hot", stats.hot_leads),
        ("Warm", stats.warm_leads),
        ("Cold", stats.cold_leads),
        ("Today", stats.today_leads),
        ("Contacted", stats.human_contacted),
        ("Not contacted", stats.not_contacted),
        ("Sales closed", stats.sales_closed),
        ("No sale", stats.no_sale),
    ];
    let mut out = String::from("Dashboard\n");
    out.push_str(&"-".repeat(30));
    out.push('\n');
    for (label, value) in rows {
        let _ = writeln!(out, "{:<16}{value:>8}", format!("{label}:"));
    }
    out
}

pub fn render_leads(leads: &LeadList, filter: LeadFilter, clock: &FilterClock) -> String {
    let visible = leads.filtered(filter, clock);
    let mut out = String::new();
    let _ = writeln!(out, "Leads: {} ({} of {})", filter.label(), visible.len(), leads.len());

    if visible.is_empty() {
        if leads.is_empty() {
            out.push_str("No leads yet.\n");
            if let Some(diag) = &leads.diagnostic {
                let _ = writeln!(out, "({diag})");
            }
        } else {
            let _ = writeln!(out, "No leads match the '{}' filter.", filter.label());
        }
        return out;
    }

    let _ = writeln!(
        out,
        "{:<8} {:<20} {:<14} {:<8} {:<17} {:<9} {}",
        "ID", "NAME", "PHONE", "INTEREST", "CREATED", "CONTACTED", "SALE"
    );
    for lead in visible {
        let _ = writeln!(
            out,
            "{:<8} {:<20} {:<14} {:<8} {:<17} {:<9} {}",
            lead.id,
            lead.display_name(),
            lead.phone_number,
            lead.interest_level.as_str(),
            timefmt::format_short(&lead.created_at, clock.offset),
            flag(lead.human_contacted),
            sale_cell(lead),
        );
    }
    out
}

fn sale_cell(lead: &Lead) -> String {
    match (lead.sale_closed, lead.sale_amount) {
        (Some(true), Some(amount)) => format_brl(amount),
        (value, _) => flag(value).to_string(),
    }
}

pub fn render_conversation(
    lead_id: &str,
    conversation: &Conversation,
    offset: chrono::FixedOffset,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Conversation with lead {lead_id}");
    if conversation.messages.is_empty() {
        out.push_str("No messages.\n");
        return out;
    }
    for msg in &conversation.messages {
        let who = match msg.sender {
            Sender::User => "Customer",
            Sender::Agent => "Agent",
            Sender::Other => "System",
        };
        let _ = writeln!(
            out,
            "[{}] {who}: {}",
            timefmt::format_short(&msg.timestamp, offset),
            msg.content
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use chrono::{FixedOffset, NaiveDate};
    use serde_json::{json, Value};

    use super::super::test_support::client_for;
    use super::*;
    use lb_core::api::{InterestLevel, Message};

    type Bodies = Arc<Mutex<Vec<Value>>>;

    fn clock() -> FilterClock {
        FilterClock::fixed(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        )
    }

    fn backend(bodies: Bodies) -> Router {
        Router::new()
            .route(
                "/api/dashboard/stats",
                get(|| async { Json(json!({"total_leads": 2, "hot_leads": 1, "sales_closed": 1})) }),
            )
            .route(
                "/api/leads",
                get(|| async {
                    Json(json!([
                        {"id": 1, "phone_number": "5511999990001", "name": "Maria", "interest_level": "hot"},
                        {"id": 2, "phone_number": "5511999994321", "interest_level": "cold"}
                    ]))
                }),
            )
            .route(
                "/api/leads/{id}/conversation",
                get(|Path(id): Path<String>| async move {
                    if id == "1" {
                        Json(json!({"lead_id": 1, "messages": [
                            {"sender": "user", "content": "Oi", "timestamp": "2024-05-01T09:00:00"}
                        ]}))
                        .into_response()
                    } else {
                        StatusCode::NOT_FOUND.into_response()
                    }
                }),
            )
            .route(
                "/api/leads/{id}/human-contact",
                put(|State(bodies): State<Bodies>, Json(body): Json<Value>| async move {
                    bodies.lock().unwrap().push(body);
                    Json(json!({"ok": true}))
                }),
            )
            .route(
                "/api/leads/{id}/sale",
                put(|State(bodies): State<Bodies>, Json(body): Json<Value>| async move {
                    bodies.lock().unwrap().push(body);
                    Json(json!({"ok": true}))
                }),
            )
            .with_state(bodies)
    }

    #[tokio::test]
    async fn stats_and_leads_print() {
        let client = client_for(backend(Bodies::default())).await;
        let opts = GlobalOpts::default();
        assert!(stats(&client, &opts).await.is_ok());
        assert!(list(&client, &opts, LeadFilter::Hot).await.is_ok());
        let json = GlobalOpts { json: true, ..Default::default() };
        assert!(list(&client, &json, LeadFilter::All).await.is_ok());
    }

    #[tokio::test]
    async fn missing_conversation_is_an_error() {
        let client = client_for(backend(Bodies::default())).await;
        let opts = GlobalOpts::default();
        assert!(conversation(&client, &opts, "1").await.is_ok());
        assert!(conversation(&client, &opts, "99").await.is_err());
    }

    #[tokio::test]
    async fn contact_sends_flag_and_notes() {
        let bodies = Bodies::default();
        let client = client_for(backend(bodies.clone())).await;
        let result = contact(&client, &GlobalOpts::default(), "2", true, Some("ligou".into())).await;
        assert!(result.is_ok());
        let sent = bodies.lock().unwrap();
        assert_eq!(sent[0]["human_contacted"], true);
        assert_eq!(sent[0]["notes"], "ligou");
    }

    #[tokio::test]
    async fn reopening_a_sale_drops_the_amount() {
        let bodies = Bodies::default();
        let client = client_for(backend(bodies.clone())).await;
        let opts = GlobalOpts::default();
        assert!(sale(&client, &opts, "1", true, Some(150.0), None).await.is_ok());
        assert!(sale(&client, &opts, "1", false, Some(150.0), None).await.is_ok());
        let sent = bodies.lock().unwrap();
        assert_eq!(sent[0]["sale_closed"], true);
        assert_eq!(sent[0]["sale_amount"], 150.0);
        assert_eq!(sent[1]["sale_closed"], false);
        assert!(sent[1].get("sale_amount").map_or(true, Value::is_null));
    }

    #[tokio::test]
    async fn failed_update_still_reloads_stats() {
        let hits = Arc::new(Mutex::new(0usize));
        let app = Router::new()
            .route(
                "/api/dashboard/stats",
                get(|State(hits): State<Arc<Mutex<usize>>>| async move {
                    *hits.lock().unwrap() += 1;
                    Json(json!({"total_leads": 2}))
                }),
            )
            .route(
                "/api/leads/{id}/human-contact",
                put(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .route("/api/leads/{id}/sale", put(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .with_state(hits.clone());
        let client = client_for(app).await;
        let opts = GlobalOpts::default();

        assert!(contact(&client, &opts, "1", true, None).await.is_err());
        assert_eq!(*hits.lock().unwrap(), 1);
        assert!(sale(&client, &opts, "1", true, None, None).await.is_err());
        assert_eq!(*hits.lock().unwrap(), 2);
    }

    #[test]
    fn stats_render_every_counter() {
        let out = render_stats(&DashboardStats {
            total_leads: 42,
            not_contacted: 30,
            no_sale: 37,
            ..Default::default()
        });
        assert!(out.contains("Total leads:"));
        assert!(out.contains("42"));
        assert!(out.contains("Not contacted:"));
        assert!(out.contains("37"));
    }

    #[test]
    fn leads_render_fallback_name_and_amount() {
        let leads = LeadList::new(vec![
            Lead {
                id: "1".into(),
                phone_number: "5511999994321".into(),
                interest_level: InterestLevel::Hot,
                created_at: "2024-05-01T09:15:00".into(),
                sale_closed: Some(true),
                sale_amount: Some(1234.5),
                ..Default::default()
            },
            Lead {
                id: "2".into(),
                phone_number: "5511900000000".into(),
                interest_level: InterestLevel::Cold,
                ..Default::default()
            },
        ]);
        let out = render_leads(&leads, LeadFilter::Hot, &clock());
        assert!(out.contains("Leads: Hot (1 of 2)"));
        assert!(out.contains("Lead 4321"));
        assert!(out.contains("01/05/2024 09:15"));
        assert!(out.contains("R$ 1.234,50"));

        let out = render_leads(&leads, LeadFilter::Warm, &clock());
        assert!(out.contains("No leads match"));
    }

    #[test]
    fn empty_lead_list_shows_diagnostic() {
        let leads = LeadList::from_payload(json!({"detail": "oops"}));
        let out = render_leads(&leads, LeadFilter::All, &clock());
        assert!(out.contains("No leads yet."));
        let diag = leads.diagnostic.clone().unwrap();
        assert!(out.contains(&format!("({diag})")));
    }

    #[test]
    fn conversation_labels_senders() {
        let conv = Conversation {
            lead_id: Some("1".into()),
            messages: vec![
                Message { sender: Sender::User, content: "Oi".into(), timestamp: "2024-05-01T09:00:00".into() },
                Message { sender: Sender::Agent, content: "Olá!".into(), timestamp: "2024-05-01T09:00:05".into() },
            ],
        };
        let out = render_conversation("1", &conv, FixedOffset::east_opt(0).unwrap());
        assert!(out.contains("Customer: Oi"));
        assert!(out.contains("Agent: Olá!"));

        let empty = render_conversation("1", &Conversation::default(), FixedOffset::east_opt(0).unwrap());
        assert!(empty.contains("No messages."));
    }
}
