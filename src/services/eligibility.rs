// src/services/eligibility.rs

use crate::models::settings::{
    EligibilityFacts, EligibilityResult, EligibilitySettings, IneligibilityReason,
};

/// Avalia todas as regras (sem curto-circuito) e lista os motivos em ordem fixa.
pub fn evaluate(facts: &EligibilityFacts, settings: &EligibilitySettings) -> EligibilityResult {
    let mut reasons = Vec::new();

    if facts.deliveries_this_month >= settings.max_deliveries_per_month {
        reasons.push(IneligibilityReason::MaxDeliveriesPerMonthReached);
    }
    if facts.months_since_last_delivery < settings.min_months_since_last_delivery {
        reasons.push(IneligibilityReason::MinMonthsSinceLastDeliveryNotMet);
    }
    if facts.vulnerability_score < settings.min_vulnerability_score {
        reasons.push(IneligibilityReason::MinVulnerabilityScoreNotMet);
    }
    if settings.require_documentation && !facts.has_documentation {
        reasons.push(IneligibilityReason::DocumentationRequired);
    }

    EligibilityResult {
        eligible: reasons.is_empty(),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn facts(dtm: i64, months: i64, score: i64, docs: bool) -> EligibilityFacts {
        EligibilityFacts {
            deliveries_this_month: dtm,
            months_since_last_delivery: months,
            vulnerability_score: score,
            has_documentation: docs,
        }
    }

    #[test]
    fn defaults_accept_a_fresh_family() {
        let result = evaluate(&facts(0, 2, 3, false), &EligibilitySettings::default());
        assert!(result.eligible);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn every_failing_rule_is_reported_in_order() {
        let settings = EligibilitySettings {
            require_documentation: true,
            ..Default::default()
        };
        let result = evaluate(&facts(1, 0, 0, false), &settings);

        assert!(!result.eligible);
        assert_eq!(
            result.reasons,
            vec![
                IneligibilityReason::MaxDeliveriesPerMonthReached,
                IneligibilityReason::MinMonthsSinceLastDeliveryNotMet,
                IneligibilityReason::MinVulnerabilityScoreNotMet,
                IneligibilityReason::DocumentationRequired,
            ]
        );
        assert_eq!(
            serde_json::to_value(&result.reasons[0]).unwrap(),
            "max_deliveries_per_month_reached"
        );
    }

    proptest! {
        #[test]
        fn eligible_iff_no_reasons(
            dtm in 0i64..5, months in 0i64..5, score in 0i64..5, docs: bool,
            max in 0i64..5, min_months in 0i64..5, min_score in 0i64..5, require: bool,
        ) {
            let settings = EligibilitySettings {
                max_deliveries_per_month: max,
                min_months_since_last_delivery: min_months,
                min_vulnerability_score: min_score,
                require_documentation: require,
            };
            let result = evaluate(&facts(dtm, months, score, docs), &settings);
            prop_assert_eq!(result.eligible, result.reasons.is_empty());
            prop_assert_eq!(
                result.reasons.contains(&IneligibilityReason::DocumentationRequired),
                require && !docs
            );
        }
    }
}
