use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::deadline::days_until;
use super::domain::{
    InfractionRecord, InspectionRecord, NotificationKind, NotificationRecord, RecordId,
};

/// How many law labels the dashboard ranking retains.
pub const LAW_RANKING_LIMIT: usize = 8;
/// How many companies the dashboard ranking retains.
pub const COMPANY_RANKING_LIMIT: usize = 5;

/// A hearing shows up as an alert from one day overdue to twelve days out.
const ALERT_WINDOW_DAYS: std::ops::RangeInclusive<i64> = -1..=12;

/// Count of notifications sharing one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindCount {
    pub kind: NotificationKind,
    pub kind_label: &'static str,
    pub count: usize,
}

/// Frequency-table entry for laws and companies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// An audience notification whose hearing is imminent or just missed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HearingAlert {
    pub id: RecordId,
    pub reference: String,
    pub company: String,
    pub hearing_date: NaiveDate,
    pub days_until: i64,
    pub overdue: bool,
}

/// Full dashboard aggregate, recomputed from the snapshot on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_notifications: usize,
    pub total_infractions: usize,
    pub total_inspections: usize,
    pub notifications_by_kind: Vec<KindCount>,
    pub ex_officio_inspections: usize,
    pub law_ranking: Vec<LabelCount>,
    pub top_companies: Vec<LabelCount>,
    pub upcoming_hearings: Vec<HearingAlert>,
}

pub fn dashboard(
    notifications: &[NotificationRecord],
    infractions: &[InfractionRecord],
    inspections: &[InspectionRecord],
    today: NaiveDate,
) -> DashboardStats {
    let notifications_by_kind = NotificationKind::ordered()
        .into_iter()
        .map(|kind| KindCount {
            kind,
            kind_label: kind.label(),
            count: notifications.iter().filter(|n| n.kind == kind).count(),
        })
        .collect();

    DashboardStats {
        total_notifications: notifications.len(),
        total_infractions: infractions.len(),
        total_inspections: inspections.len(),
        notifications_by_kind,
        ex_officio_inspections: inspections.iter().filter(|i| i.ex_officio).count(),
        law_ranking: law_frequency(infractions, LAW_RANKING_LIMIT),
        top_companies: company_frequency(notifications, COMPANY_RANKING_LIMIT),
        upcoming_hearings: upcoming_hearings(notifications, today),
    }
}

/// Frequency table of violated-law labels across infraction acts. Labels are
/// trimmed before bucketing so `"A"` and `"A "` aggregate together; ties
/// break on the label so the ranking is stable under input reordering.
pub fn law_frequency(infractions: &[InfractionRecord], limit: usize) -> Vec<LabelCount> {
    ranked(
        infractions.iter().flat_map(|record| record.laws.iter()),
        limit,
    )
}

/// Frequency table of target companies across notifications.
pub fn company_frequency(notifications: &[NotificationRecord], limit: usize) -> Vec<LabelCount> {
    ranked(notifications.iter().map(|record| &record.company), limit)
}

fn ranked<'a>(labels: impl Iterator<Item = &'a String>, limit: usize) -> Vec<LabelCount> {
    let mut buckets: HashMap<String, usize> = HashMap::new();
    for label in labels {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            continue;
        }
        *buckets.entry(trimmed.to_string()).or_insert(0) += 1;
    }

    let mut entries: Vec<LabelCount> = buckets
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries.truncate(limit);
    entries
}

/// Audience notifications with a hearing date, not yet marked notified, whose
/// hearing falls within the alert window relative to `today`.
pub fn upcoming_hearings(
    notifications: &[NotificationRecord],
    today: NaiveDate,
) -> Vec<HearingAlert> {
    let mut alerts: Vec<HearingAlert> = notifications
        .iter()
        .filter(|n| n.kind == NotificationKind::Audience && n.notified_on.is_none())
        .filter_map(|n| {
            let hearing_date = n.hearing_date?;
            let days = days_until(today, hearing_date);
            ALERT_WINDOW_DAYS.contains(&days).then(|| HearingAlert {
                id: n.id,
                reference: n.reference.clone(),
                company: n.company.clone(),
                hearing_date,
                days_until: days,
                overdue: days < 0,
            })
        })
        .collect();
    alerts.sort_by_key(|alert| (alert.hearing_date, alert.id));
    alerts
}
