// src/models/settings.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::payload;

/// Regras usadas pelo avaliador de elegibilidade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EligibilitySettings {
    pub max_deliveries_per_month: i64,
    pub min_months_since_last_delivery: i64,
    pub min_vulnerability_score: i64,
    pub require_documentation: bool,
}

impl Default for EligibilitySettings {
    fn default() -> Self {
        Self {
            max_deliveries_per_month: 1,
            min_months_since_last_delivery: 1,
            min_vulnerability_score: 1,
            require_documentation: false,
        }
    }
}

impl EligibilitySettings {
    /// Mescla apenas os campos presentes.
    pub fn merge(&mut self, patch: &EligibilitySettingsPatch) {
        if let Some(v) = patch.max_deliveries_per_month {
            self.max_deliveries_per_month = v;
        }
        if let Some(v) = patch.min_months_since_last_delivery {
            self.min_months_since_last_delivery = v;
        }
        if let Some(v) = patch.min_vulnerability_score {
            self.min_vulnerability_score = v;
        }
        if let Some(v) = patch.require_documentation {
            self.require_documentation = v;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EligibilitySettingsPatch {
    #[serde(default, deserialize_with = "payload::optional_count")]
    #[validate(range(min = 0, message = "Deve ser maior ou igual a zero."))]
    pub max_deliveries_per_month: Option<i64>,
    #[serde(default, deserialize_with = "payload::optional_count")]
    #[validate(range(min = 0, message = "Deve ser maior ou igual a zero."))]
    pub min_months_since_last_delivery: Option<i64>,
    #[serde(default, deserialize_with = "payload::optional_count")]
    #[validate(range(min = 0, message = "Deve ser maior ou igual a zero."))]
    pub min_vulnerability_score: Option<i64>,
    #[serde(default, deserialize_with = "payload::optional_flag")]
    pub require_documentation: Option<bool>,
}

// Fatos de uma família informados para a checagem.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EligibilityFacts {
    #[serde(default, deserialize_with = "payload::count")]
    pub deliveries_this_month: i64,
    #[serde(default, deserialize_with = "payload::count")]
    pub months_since_last_delivery: i64,
    #[serde(default, deserialize_with = "payload::count")]
    pub vulnerability_score: i64,
    #[serde(default, deserialize_with = "payload::flag")]
    pub has_documentation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IneligibilityReason {
    MaxDeliveriesPerMonthReached,
    MinMonthsSinceLastDeliveryNotMet,
    MinVulnerabilityScoreNotMet,
    DocumentationRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EligibilityResult {
    pub eligible: bool,
    pub reasons: Vec<IneligibilityReason>,
}
