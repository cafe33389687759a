//! Behavioural checks for the lead filter across the whole filter set.

use chrono::{FixedOffset, NaiveDate};
use lb_core::api::{DashboardStats, InterestLevel, Lead};
use lb_core::dashboard::DashboardState;
use lb_core::filter::{filter_leads, FilterClock, LeadFilter};
use lb_core::leads::LeadList;

fn clock() -> FilterClock {
    FilterClock::fixed(
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        FixedOffset::west_opt(3 * 3600).unwrap(),
    )
}

fn lead(id: &str, level: InterestLevel, created_at: &str) -> Lead {
    Lead {
        id: id.into(),
        phone_number: format!("551199990000{id}"),
        interest_level: level,
        created_at: created_at.into(),
        ..Default::default()
    }
}

fn sample() -> Vec<Lead> {
    let mut leads = vec![
        lead("1", InterestLevel::Hot, "2024-05-01T12:00:00"),
        lead("2", InterestLevel::Warm, "2024-04-30T12:00:00"),
        lead("3", InterestLevel::Cold, "2024-05-01T15:00:00"),
        lead("4", InterestLevel::Hot, "2024-04-01T09:00:00"),
        lead("5", InterestLevel::Unknown("".into()), "not a date"),
    ];
    leads[0].human_contacted = Some(true);
    leads[1].human_contacted = Some(false);
    leads[0].sale_closed = Some(true);
    leads[0].sale_amount = Some(89.9);
    leads[3].sale_closed = Some(false);
    leads
}

fn ids(leads: &[&Lead]) -> Vec<String> {
    leads.iter().map(|l| l.id.clone()).collect()
}

#[test]
fn all_is_identity() {
    let leads = sample();
    let out = filter_leads(&leads, LeadFilter::All, &clock());
    assert_eq!(out.len(), leads.len());
    assert!(out.iter().zip(&leads).all(|(a, b)| std::ptr::eq(*a, b)));
}

#[test]
fn every_filter_yields_an_ordered_subset() {
    let leads = sample();
    for filter in LeadFilter::ALL {
        let out = filter_leads(&leads, filter, &clock());
        let positions: Vec<usize> = out
            .iter()
            .map(|l| leads.iter().position(|x| x.id == l.id).expect("subset"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{filter} reordered");
        assert_eq!(out.len(), filter.count(&leads, &clock()));
    }
}

#[test]
fn worked_examples() {
    let leads = sample();
    let c = clock();
    assert_eq!(ids(&filter_leads(&leads, LeadFilter::Hot, &c)), ["1", "4"]);
    assert_eq!(ids(&filter_leads(&leads, LeadFilter::Warm, &c)), ["2"]);
    assert_eq!(ids(&filter_leads(&leads, LeadFilter::Cold, &c)), ["3"]);
    assert_eq!(ids(&filter_leads(&leads, LeadFilter::Today, &c)), ["1", "3"]);
    assert_eq!(ids(&filter_leads(&leads, LeadFilter::Contacted, &c)), ["1"]);
    assert_eq!(
        ids(&filter_leads(&leads, LeadFilter::NotContacted, &c)),
        ["2", "3", "4", "5"]
    );
    assert_eq!(ids(&filter_leads(&leads, LeadFilter::SalesClosed, &c)), ["1"]);
    assert_eq!(ids(&filter_leads(&leads, LeadFilter::NoSale, &c)), ["2", "3", "4", "5"]);
}

#[test]
fn complementary_filters_partition_the_list() {
    let leads = sample();
    let c = clock();
    let total = leads.len();
    assert_eq!(
        LeadFilter::Contacted.count(&leads, &c) + LeadFilter::NotContacted.count(&leads, &c),
        total
    );
    assert_eq!(
        LeadFilter::SalesClosed.count(&leads, &c) + LeadFilter::NoSale.count(&leads, &c),
        total
    );
}

#[test]
fn empty_input_gives_empty_output() {
    for filter in LeadFilter::ALL {
        assert!(filter_leads(&[], filter, &clock()).is_empty());
    }
}

#[test]
fn filtering_never_touches_server_stats() {
    let stats = DashboardStats {
        total_leads: 120,
        hot_leads: 40,
        today_leads: 7,
        ..Default::default()
    };
    let mut state = DashboardState::new(LeadFilter::All).with_clock(clock());
    state.apply_snapshot(stats.clone(), LeadList::new(sample()));
    for filter in LeadFilter::ALL {
        state.set_filter(filter);
        assert_eq!(state.stats, stats);
    }
}
