use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use lb_api_types::{InterestLevel, Lead};

use crate::timefmt;

// ---------------------------------------------------------------------------
// LeadFilter
// ---------------------------------------------------------------------------

/// The single active filter on the lead list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadFilter {
    #[default]
    All,
    Hot,
    Warm,
    Cold,
    Today,
    Contacted,
    NotContacted,
    SalesClosed,
    NoSale,
}

impl LeadFilter {
    /// Display order of the filter bar.
    pub const ALL: [LeadFilter; 9] = [
        LeadFilter::All,
        LeadFilter::Hot,
        LeadFilter::Warm,
        LeadFilter::Cold,
        LeadFilter::Today,
        LeadFilter::Contacted,
        LeadFilter::NotContacted,
        LeadFilter::SalesClosed,
        LeadFilter::NoSale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadFilter::All => "all",
            LeadFilter::Hot => "hot",
            LeadFilter::Warm => "warm",
            LeadFilter::Cold => "cold",
            LeadFilter::Today => "today",
            LeadFilter::Contacted => "contacted",
            LeadFilter::NotContacted => "not_contacted",
            LeadFilter::SalesClosed => "sales_closed",
            LeadFilter::NoSale => "no_sale",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LeadFilter::All => "All",
            LeadFilter::Hot => "Hot",
            LeadFilter::Warm => "Warm",
            LeadFilter::Cold => "Cold",
            LeadFilter::Today => "Today",
            LeadFilter::Contacted => "Contacted",
            LeadFilter::NotContacted => "Not contacted",
            LeadFilter::SalesClosed => "Sales closed",
            LeadFilter::NoSale => "No sale",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> LeadFilter {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> LeadFilter {
        let len = Self::ALL.len();
        Self::ALL[(self.index() + len - 1) % len]
    }

    /// Whether `lead` passes this filter.
    ///
    /// `not_contacted` and `no_sale` treat a flag that was never set the same
    /// as an explicit `false`.
    pub fn matches(&self, lead: &Lead, clock: &FilterClock) -> bool {
        match self {
            LeadFilter::All => true,
            LeadFilter::Hot => lead.interest_level == InterestLevel::Hot,
            LeadFilter::Warm => lead.interest_level == InterestLevel::Warm,
            LeadFilter::Cold => lead.interest_level == InterestLevel::Cold,
            LeadFilter::Today => clock.is_today(&lead.created_at),
            LeadFilter::Contacted => lead.is_contacted(),
            LeadFilter::NotContacted => !lead.is_contacted(),
            LeadFilter::SalesClosed => lead.is_sale_closed(),
            LeadFilter::NoSale => !lead.is_sale_closed(),
        }
    }

    pub fn count(&self, leads: &[Lead], clock: &FilterClock) -> usize {
        count_matching(leads, *self, clock)
    }
}

impl fmt::Display for LeadFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lead filter '{0}' (expected one of: all, hot, warm, cold, today, contacted, not_contacted, sales_closed, no_sale)")]
pub struct ParseFilterError(pub String);

impl FromStr for LeadFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| ParseFilterError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// FilterClock
// ---------------------------------------------------------------------------

/// "Today" as seen by the operator, plus the offset used to place backend
/// timestamps on the local calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterClock {
    pub today: NaiveDate,
    pub offset: FixedOffset,
}

impl FilterClock {
    pub fn local_now() -> Self {
        let now = Local::now();
        Self {
            today: now.date_naive(),
            offset: *now.offset(),
        }
    }

    pub fn fixed(today: NaiveDate, offset: FixedOffset) -> Self {
        Self { today, offset }
    }

    /// Timestamps that parse are compared by local calendar date; anything
    /// else falls back to a `YYYY-MM-DD` prefix match.
    pub fn is_today(&self, created_at: &str) -> bool {
        match timefmt::local_date(created_at, self.offset) {
            Some(date) => date == self.today,
            None => created_at.starts_with(&self.today.format("%Y-%m-%d").to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Leads matching `filter`, in input order.
pub fn filter_leads<'a>(leads: &'a [Lead], filter: LeadFilter, clock: &FilterClock) -> Vec<&'a Lead> {
    leads.iter().filter(|lead| filter.matches(lead, clock)).collect()
}

pub fn count_matching(leads: &[Lead], filter: LeadFilter, clock: &FilterClock) -> usize {
    leads.iter().filter(|lead| filter.matches(lead, clock)).count()
}
