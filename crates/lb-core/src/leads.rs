use std::collections::HashSet;

use serde_json::Value;

use lb_api_types::Lead;

use crate::filter::{filter_leads, FilterClock, LeadFilter};

/// The lead set from one `/leads` load.
///
/// `diagnostic` is set when the payload was not what we expected (not an
/// array, malformed records, duplicate ids). It is meant for the empty-state
/// view only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadList {
    leads: Vec<Lead>,
    pub diagnostic: Option<String>,
}

impl LeadList {
    pub fn new(leads: Vec<Lead>) -> Self {
        let mut list = Self::default();
        list.extend_unique(leads);
        list
    }

    /// Build a list from a raw `/leads` body. Never fails: anything that is
    /// not an array becomes an empty list with a diagnostic.
    pub fn from_payload(payload: Value) -> Self {
        let items = match payload {
            Value::Array(items) => items,
            other => {
                let diagnostic = format!(
                    "unexpected /leads payload: expected an array, got {}",
                    json_kind(&other)
                );
                tracing::warn!(%diagnostic, "discarding lead payload");
                return Self {
                    leads: Vec::new(),
                    diagnostic: Some(diagnostic),
                };
            }
        };

        let total = items.len();
        let mut parsed = Vec::with_capacity(total);
        let mut malformed = 0usize;
        for item in items {
            match serde_json::from_value::<Lead>(item) {
                Ok(lead) => parsed.push(lead),
                Err(err) => {
                    malformed += 1;
                    tracing::debug!(error = %err, "skipping malformed lead record");
                }
            }
        }

        let mut list = Self::default();
        let duplicates = list.extend_unique(parsed);

        let mut notes = Vec::new();
        if malformed > 0 {
            notes.push(format!("skipped {malformed} of {total} malformed lead record(s)"));
        }
        if duplicates > 0 {
            notes.push(format!("dropped {duplicates} duplicate lead id(s)"));
        }
        if !notes.is_empty() {
            let diagnostic = notes.join("; ");
            tracing::warn!(%diagnostic, "lead payload had problems");
            list.diagnostic = Some(diagnostic);
        }
        list
    }

    /// Appends leads whose id has not been seen yet; returns how many were
    /// dropped as duplicates.
    fn extend_unique(&mut self, leads: Vec<Lead>) -> usize {
        let mut seen: HashSet<String> = self.leads.iter().map(|l| l.id.clone()).collect();
        let mut dropped = 0;
        for lead in leads {
            if seen.insert(lead.id.clone()) {
                self.leads.push(lead);
            } else {
                dropped += 1;
            }
        }
        dropped
    }

    pub fn as_slice(&self) -> &[Lead] {
        &self.leads
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.leads.iter().position(|l| l.id == id)
    }

    pub fn filtered(&self, filter: LeadFilter, clock: &FilterClock) -> Vec<&Lead> {
        filter_leads(&self.leads, filter, clock)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_payload_becomes_empty_with_diagnostic() {
        let list = LeadList::from_payload(json!({"detail": "Internal Server Error"}));
        assert!(list.is_empty());
        assert!(list.diagnostic.as_deref().unwrap().contains("an object"));
    }

    #[test]
    fn null_payload_becomes_empty() {
        let list = LeadList::from_payload(Value::Null);
        assert!(list.is_empty());
        assert!(list.diagnostic.as_deref().unwrap().contains("null"));
    }

    #[test]
    fn malformed_records_are_skipped() {
        let list = LeadList::from_payload(json!([
            {"id": 1, "interest_level": "hot"},
            "not a lead",
            {"id": 2, "interest_level": "cold", "sale_amount": "lots"}
        ]));
        assert_eq!(list.len(), 1);
        assert_eq!(list.as_slice()[0].id, "1");
        assert!(list.diagnostic.as_deref().unwrap().contains("skipped 2 of 3"));
    }

    #[test]
    fn nulls_and_decimal_strings_are_kept() {
        let list = LeadList::from_payload(json!([
            {"id": 1, "interest_level": null, "phone_number": null, "created_at": null},
            {"id": 2, "sale_closed": true, "sale_amount": "1500.00"}
        ]));
        assert_eq!(list.len(), 2);
        assert!(list.diagnostic.is_none());
        assert_eq!(list.get("2").unwrap().sale_amount, Some(1500.0));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let list = LeadList::from_payload(json!([
            {"id": "a", "name": "first"},
            {"id": "a", "name": "second"}
        ]));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("a").unwrap().name.as_deref(), Some("first"));
        assert!(list.diagnostic.is_some());
    }

    #[test]
    fn clean_payload_has_no_diagnostic() {
        let list = LeadList::from_payload(json!([{"id": 1}, {"id": 2}]));
        assert_eq!(list.len(), 2);
        assert_eq!(list.position("2"), Some(1));
        assert!(list.diagnostic.is_none());
    }
}
