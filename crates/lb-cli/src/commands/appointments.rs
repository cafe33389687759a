use std::fmt::Write;

use chrono::{FixedOffset, Local, NaiveDate};

use lb_client::ApiClient;
use lb_core::api::{Appointment, AppointmentCreate, AppointmentStatus, AvailableSlots};
use lb_core::calendar;
use lb_core::forms::slot_timestamp;
use lb_core::timefmt;

use super::{friendly_error, print_json, GlobalOpts};

pub async fn list(client: &ApiClient, opts: &GlobalOpts) -> anyhow::Result<()> {
    let appointments = client.appointments().await.map_err(friendly_error)?;
    if opts.json {
        return print_json(&appointments);
    }
    print!("{}", render_appointments(&appointments, *Local::now().offset()));
    Ok(())
}

pub async fn slots(client: &ApiClient, opts: &GlobalOpts, date: Option<NaiveDate>) -> anyhow::Result<()> {
    let slots = client.available_slots(date).await.map_err(friendly_error)?;
    if opts.json {
        return print_json(&slots);
    }
    print!("{}", render_slots(&slots));
    Ok(())
}

/// Run `appointments book`. A bare time slot is placed on `--date`, or on
/// today when no date is given.
pub async fn book(
    client: &ApiClient,
    lead_id: &str,
    slot: &str,
    date: Option<NaiveDate>,
    notes: Option<String>,
) -> anyhow::Result<()> {
    if lead_id.trim().is_empty() {
        anyhow::bail!("--lead is required");
    }
    if slot.trim().is_empty() {
        anyhow::bail!("--slot is required");
    }
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let appointment = AppointmentCreate {
        lead_id: lead_id.trim().to_string(),
        scheduled_at: slot_timestamp(slot, date),
        notes: notes.filter(|n| !n.trim().is_empty()),
    };
    client
        .create_appointment(&appointment)
        .await
        .map_err(friendly_error)?;
    println!(
        "Appointment booked for lead {} at {}.",
        appointment.lead_id, appointment.scheduled_at
    );
    Ok(())
}

pub async fn set_status(client: &ApiClient, appointment_id: &str, status: &str) -> anyhow::Result<()> {
    let Some(status) = AppointmentStatus::parse(status.trim()) else {
        let allowed: Vec<&str> = AppointmentStatus::SETTABLE.iter().map(|s| s.as_str()).collect();
        anyhow::bail!("Unknown status '{status}'. Use one of: {}", allowed.join(", "));
    };
    client
        .set_appointment_status(appointment_id, status.clone())
        .await
        .map_err(friendly_error)?;
    println!("Appointment {appointment_id} is now {status}.");
    Ok(())
}

/// Appointments grouped by local day, in time order.
pub fn render_appointments(appointments: &[Appointment], offset: FixedOffset) -> String {
    if appointments.is_empty() {
        return "No appointments.\n".to_string();
    }
    let cal = calendar::group_by_day(appointments, offset);
    let mut out = String::new();
    for (day, items) in cal.days() {
        let _ = writeln!(out, "{}", day.format("%a %d/%m/%Y"));
        for appt in items {
            let _ = writeln!(out, "{}", appointment_line(appt, &timefmt::format_time(&appt.scheduled_at, offset)));
        }
    }
    if !cal.unscheduled().is_empty() {
        out.push_str("Unscheduled\n");
        for appt in cal.unscheduled() {
            let _ = writeln!(out, "{}", appointment_line(appt, "--:--"));
        }
    }
    out
}

fn appointment_line(appt: &Appointment, time: &str) -> String {
    let mut line = format!(
        "  {} {time}  {:<24} {:<10} [{}]",
        appt.status.glyph(),
        appt.display_name(),
        appt.status.as_str(),
        appt.id
    );
    if let Some(notes) = appt.notes.as_deref().filter(|n| !n.is_empty()) {
        let _ = write!(line, "  {notes}");
    }
    line
}

pub fn render_slots(slots: &AvailableSlots) -> String {
    let mut out = String::new();
    let day = slots.date.as_deref().unwrap_or("(backend default)");
    if slots.slots.is_empty() {
        let _ = writeln!(out, "No free slots on {day}.");
        return out;
    }
    let _ = writeln!(out, "Free slots on {day}:");
    for slot in &slots.slots {
        let _ = writeln!(out, "  {slot}");
    }
    out
}
