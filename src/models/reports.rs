// src/models/reports.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::payload;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReportSummary {
    pub families_total: u64,
    pub dependents_total: u64,
    pub children_total: u64,
    pub street_people_total: u64,
    pub referrals_pending_total: u64,
    pub delivery_events_total: u64,
    pub delivery_withdrawals_total: u64,
    pub equipment_total: u64,
    pub equipment_available_total: u64,
    pub loans_open_total: u64,
    pub visits_pending_total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlySummary {
    pub delivery_events_total: u64,
    pub delivery_events_published_total: u64,
    pub delivery_invites_total: u64,
    pub delivery_withdrawals_total: u64,
    pub visits_total: u64,
    pub visits_by_status: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyReport {
    /// `YYYY-MM`
    pub period: String,
    pub visit_status: Option<String>,
    pub summary: MonthlySummary,
}

impl MonthlyReport {
    /// Linhas `(métrica, valor)` na ordem usada pelas exportações.
    pub fn metrics(&self) -> Vec<(String, u64)> {
        let s = &self.summary;
        let mut rows = vec![
            ("delivery_events_total".to_string(), s.delivery_events_total),
            (
                "delivery_events_published_total".to_string(),
                s.delivery_events_published_total,
            ),
            ("delivery_invites_total".to_string(), s.delivery_invites_total),
            ("delivery_withdrawals_total".to_string(), s.delivery_withdrawals_total),
            ("visits_total".to_string(), s.visits_total),
        ];
        rows.extend(
            s.visits_by_status
                .iter()
                .map(|(status, n)| (format!("visits_{status}_total"), *n)),
        );
        rows
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MonthlyQuery {
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub period: Option<String>,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub visit_status: Option<String>,
}
