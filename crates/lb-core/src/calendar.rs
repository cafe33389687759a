use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate};

use lb_api_types::Appointment;

use crate::timefmt;

/// Appointments bucketed by local calendar day.
///
/// Within a day, appointments are ordered by time. Appointments whose
/// `scheduled_at` does not parse end up in `unscheduled`, in input order.
#[derive(Debug, Default)]
pub struct Calendar<'a> {
    days: BTreeMap<NaiveDate, Vec<&'a Appointment>>,
    unscheduled: Vec<&'a Appointment>,
}

pub fn group_by_day(appointments: &[Appointment], offset: FixedOffset) -> Calendar<'_> {
    let mut timed: Vec<(DateTime<FixedOffset>, &Appointment)> = Vec::new();
    let mut unscheduled = Vec::new();
    for appt in appointments {
        match timefmt::parse_timestamp(&appt.scheduled_at) {
            Some(at) => timed.push((at.with_timezone(&offset), appt)),
            None => unscheduled.push(appt),
        }
    }
    // Stable sort keeps input order for identical times.
    timed.sort_by_key(|(at, _)| *at);

    let mut days: BTreeMap<NaiveDate, Vec<&Appointment>> = BTreeMap::new();
    for (at, appt) in timed {
        days.entry(at.date_naive()).or_default().push(appt);
    }
    Calendar { days, unscheduled }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

impl<'a> Calendar<'a> {
    pub fn on(&self, date: NaiveDate) -> &[&'a Appointment] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The seven days (Monday first) of the week containing `date`.
    pub fn week_of(&self, date: NaiveDate) -> Vec<(NaiveDate, &[&'a Appointment])> {
        let start = week_start(date);
        (0..7u64)
            .filter_map(|i| start.checked_add_days(Days::new(i)))
            .map(|day| (day, self.on(day)))
            .collect()
    }

    pub fn days(&self) -> impl Iterator<Item = (&NaiveDate, &Vec<&'a Appointment>)> {
        self.days.iter()
    }

    pub fn unscheduled(&self) -> &[&'a Appointment] {
        &self.unscheduled
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum::<usize>() + self.unscheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
