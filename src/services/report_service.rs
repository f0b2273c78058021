// src/services/report_service.rs

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        equipment::{EquipmentStatus, LoanStatus},
        delivery::EventStatus,
        reports::{MonthlyReport, MonthlySummary, ReportSummary},
        street::REFERRAL_PENDING,
        visit::VisitStatus,
    },
};

/// Mês civil de referência (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// `None` usa o mês corrente; qualquer outro formato é `invalid_period`.
    pub fn parse(raw: Option<&str>, today: NaiveDate) -> Result<Self, AppError> {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(Self {
                year: today.year(),
                month: today.month(),
            });
        };

        if raw.len() != 7 || raw.as_bytes()[4] != b'-' {
            return Err(AppError::InvalidPeriod);
        }
        let first_day = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
            .map_err(|_| AppError::InvalidPeriod)?;

        Ok(Self {
            year: first_day.year(),
            month: first_day.month(),
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

pub async fn summary(state: &AppState) -> ReportSummary {
    let (families_total, dependents_total, children_total) = state.social_repo.counts().await;
    let people = state.street_repo.list_people().await;
    let referrals = state.street_repo.list_referrals().await;
    let events = state.delivery_repo.list_events().await;
    let withdrawals = state.delivery_repo.list_withdrawals().await;
    let equipment = state.equipment_repo.list_equipment().await;
    let loans = state.equipment_repo.list_loans().await;
    let pending_visits = state.visit_repo.list(Some(VisitStatus::Pendente)).await;

    ReportSummary {
        families_total,
        dependents_total,
        children_total,
        street_people_total: people.len() as u64,
        referrals_pending_total: referrals
            .iter()
            .filter(|r| r.status == REFERRAL_PENDING)
            .count() as u64,
        delivery_events_total: events.len() as u64,
        delivery_withdrawals_total: withdrawals.len() as u64,
        equipment_total: equipment.len() as u64,
        equipment_available_total: equipment
            .iter()
            .filter(|e| e.status == EquipmentStatus::Disponivel)
            .count() as u64,
        loans_open_total: loans.iter().filter(|l| l.status == LoanStatus::Aberto).count() as u64,
        visits_pending_total: pending_visits.len() as u64,
    }
}

pub async fn monthly(
    state: &AppState,
    period: Period,
    visit_status: Option<VisitStatus>,
) -> MonthlyReport {
    let events: Vec<_> = state
        .delivery_repo
        .list_events()
        .await
        .into_iter()
        .filter(|e| period.contains(e.event_date))
        .collect();
    let event_ids: BTreeSet<u64> = events.iter().map(|e| e.id).collect();

    let invites = state.delivery_repo.list_invites().await;
    let withdrawals = state.delivery_repo.list_withdrawals().await;

    let visits: Vec<_> = state
        .visit_repo
        .list(visit_status)
        .await
        .into_iter()
        .filter(|v| period.contains(v.scheduled_for.date()))
        .collect();

    let mut visits_by_status: BTreeMap<String, u64> = VisitStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for visit in &visits {
        *visits_by_status
            .entry(visit.status.as_str().to_string())
            .or_default() += 1;
    }

    MonthlyReport {
        period: period.label(),
        visit_status: visit_status.map(|s| s.as_str().to_string()),
        summary: MonthlySummary {
            delivery_events_total: events.len() as u64,
            delivery_events_published_total: events
                .iter()
                .filter(|e| e.status == EventStatus::Publicado)
                .count() as u64,
            delivery_invites_total: invites
                .iter()
                .filter(|i| event_ids.contains(&i.event_id))
                .count() as u64,
            delivery_withdrawals_total: withdrawals
                .iter()
                .filter(|w| event_ids.contains(&w.event_id))
                .count() as u64,
            visits_total: visits.len() as u64,
            visits_by_status,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn period_defaults_to_current_month() {
        let period = Period::parse(None, today()).unwrap();
        assert_eq!(period.label(), "2026-10");
        assert_eq!(Period::parse(Some("  "), today()).unwrap(), period);
    }

    #[test]
    fn period_rejects_malformed_values() {
        for raw in ["2026-13", "2026-4", "26-04", "abril", "2026/04", "2026-04-01"] {
            assert!(
                matches!(Period::parse(Some(raw), today()), Err(AppError::InvalidPeriod)),
                "{raw} should be rejected"
            );
        }
        assert_eq!(Period::parse(Some("2026-04"), today()).unwrap().label(), "2026-04");
    }
}
