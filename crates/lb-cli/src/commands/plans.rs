use std::fmt::Write;

use lb_client::ApiClient;
use lb_core::api::{Plan, PlanUpdate};
use lb_core::money::format_brl;

use super::{friendly_error, print_json, GlobalOpts};

/// Field overrides for `plans update`. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct PlanChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub coverage: Option<String>,
    pub active: Option<bool>,
}

impl PlanChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.coverage.is_none()
            && self.active.is_none()
    }

    /// Start from the plan as stored and overlay the given fields.
    pub fn apply(self, plan: &Plan) -> PlanUpdate {
        let mut update = PlanUpdate::from(plan);
        if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
            update.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            let description = description.trim().to_string();
            update.description = (!description.is_empty()).then_some(description);
        }
        if let Some(price) = self.price {
            update.price = price;
        }
        if let Some(coverage) = self.coverage {
            update.coverage = split_coverage(&coverage);
        }
        if let Some(active) = self.active {
            update.active = active;
        }
        update
    }
}

fn split_coverage(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

pub async fn list(client: &ApiClient, opts: &GlobalOpts) -> anyhow::Result<()> {
    let plans = client.plans().await.map_err(friendly_error)?;
    if opts.json {
        return print_json(&plans);
    }
    print!("{}", render_plans(&plans));
    Ok(())
}

/// Run `plans update`: fetch the plan, overlay the changes and PUT it back.
pub async fn update(client: &ApiClient, plan_id: &str, changes: PlanChanges) -> anyhow::Result<()> {
    if changes.is_empty() {
        anyhow::bail!("Nothing to update. Pass at least one of --name, --description, --price, --coverage, --active.");
    }
    let plans = client.plans().await.map_err(friendly_error)?;
    let Some(plan) = plans.iter().find(|p| p.id == plan_id) else {
        anyhow::bail!("Plan '{plan_id}' not found");
    };
    let update = changes.apply(plan);
    client
        .update_plan(plan_id, &update)
        .await
        .map_err(friendly_error)?;
    println!("Plan '{}' updated ({}).", update.name, format_brl(update.price));
    Ok(())
}

pub fn render_plans(plans: &[Plan]) -> String {
    if plans.is_empty() {
        return "No plans loaded.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "{:<8} {:<24} {:>14} {:<6} {}", "ID", "NAME", "PRICE", "ACTIVE", "COVERAGE");
    for plan in plans {
        let _ = writeln!(
            out,
            "{:<8} {:<24} {:>14} {:<6} {}",
            plan.id,
            plan.name,
            format_brl(plan.price),
            if plan.active { "yes" } else { "no" },
            plan.coverage.join(", "),
        );
        if let Some(description) = plan.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "         {description}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::super::test_support::client_for;
    use super::*;

    type Bodies = Arc<Mutex<Vec<Value>>>;

    fn backend(bodies: Bodies) -> Router {
        Router::new()
            .route(
                "/api/plans",
                get(|| async {
                    Json(json!([{
                        "id": 3,
                        "name": "Dental Plus",
                        "description": "Cobertura completa",
                        "price": 89.9,
                        "coverage": ["limpeza", "canal"],
                        "active": true
                    }]))
                }),
            )
            .route(
                "/api/plans/{id}",
                put(|State(bodies): State<Bodies>, Json(body): Json<Value>| async move {
                    bodies.lock().unwrap().push(body);
                    Json(json!({"ok": true}))
                }),
            )
            .with_state(bodies)
    }

    #[tokio::test]
    async fn list_prints_plans() {
        let client = client_for(backend(Bodies::default())).await;
        assert!(list(&client, &GlobalOpts::default()).await.is_ok());
    }

    #[tokio::test]
    async fn update_keeps_unchanged_fields() {
        let bodies = Bodies::default();
        let client = client_for(backend(bodies.clone())).await;
        let changes = PlanChanges { price: Some(99.9), ..Default::default() };
        assert!(update(&client, "3", changes).await.is_ok());

        let sent = bodies.lock().unwrap();
        assert_eq!(sent[0]["name"], "Dental Plus");
        assert_eq!(sent[0]["price"], 99.9);
        assert_eq!(sent[0]["coverage"], json!(["limpeza", "canal"]));
        assert_eq!(sent[0]["active"], true);
    }

    #[tokio::test]
    async fn update_unknown_plan_fails() {
        let client = client_for(backend(Bodies::default())).await;
        let changes = PlanChanges { active: Some(false), ..Default::default() };
        let err = update(&client, "404", changes).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn update_without_changes_is_rejected() {
        let client = client_for(backend(Bodies::default())).await;
        assert!(update(&client, "3", PlanChanges::default()).await.is_err());
    }

    #[test]
    fn coverage_is_split_and_trimmed() {
        let plan = Plan { id: "1".into(), name: "Basic".into(), ..Default::default() };
        let changes = PlanChanges {
            coverage: Some(" limpeza, ,canal ".into()),
            description: Some("  ".into()),
            ..Default::default()
        };
        let update = changes.apply(&plan);
        assert_eq!(update.coverage, vec!["limpeza".to_string(), "canal".to_string()]);
        assert_eq!(update.description, None);
    }

    #[test]
    fn render_shows_brl_prices() {
        let out = render_plans(&[Plan {
            id: "1".into(),
            name: "Dental Plus".into(),
            price: 89.9,
            coverage: vec!["limpeza".into()],
            active: true,
            ..Default::default()
        }]);
        assert!(out.contains("R$ 89,90"));
        assert!(out.contains("limpeza"));
        assert_eq!(render_plans(&[]), "No plans loaded.\n");
    }
}
