//! Tariff calculation
//!
//! The total tariff of an item is the sum of the contributions of every active
//! policy, taken in the order the policies were created.

use chrono::Utc;

use super::error::{LedgerError, LedgerResult};
use super::record::{Measurement, PolicyUnit, TariffCalculation, TariffPolicy};

/// Contribution of a single policy to an item's tariff
pub fn policy_charge(policy: &TariffPolicy, measurement: &Measurement) -> f64 {
    match policy.unit {
        PolicyUnit::Weight => measurement.weight * policy.rate,
        PolicyUnit::Volume => measurement.volume() * policy.rate,
        PolicyUnit::Item => policy.rate,
    }
}

/// Sum the contributions of all active policies.
///
/// Fails with [`LedgerError::NoActivePolicies`] when none of `policies` is active.
pub fn calculate<'a, I>(
    measurement: &Measurement,
    organization_id: &str,
    policies: I,
) -> LedgerResult<TariffCalculation>
where
    I: IntoIterator<Item = &'a TariffPolicy>,
{
    let applied: Vec<TariffPolicy> = policies
        .into_iter()
        .filter(|policy| policy.active)
        .cloned()
        .collect();

    if applied.is_empty() {
        return Err(LedgerError::NoActivePolicies);
    }

    let total_tariff: f64 = applied
        .iter()
        .map(|policy| policy_charge(policy, measurement))
        .sum();

    Ok(TariffCalculation {
        item_id: measurement.id.clone(),
        organization_id: organization_id.to_string(),
        total_tariff,
        applied_policies: applied,
        calculated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement(length: f64, width: f64, height: f64, weight: f64) -> Measurement {
        Measurement {
            id: "X".to_string(),
            length,
            width,
            height,
            weight,
            organization_id: "org1".to_string(),
            timestamp: Utc::now(),
            transaction_id: "tx_test".to_string(),
            block_number: 1000,
        }
    }

    fn policy(id: &str, unit: PolicyUnit, rate: f64, active: bool) -> TariffPolicy {
        TariffPolicy {
            id: id.to_string(),
            name: format!("Policy {}", id),
            description: String::new(),
            rate,
            unit,
            category: "shipping".to_string(),
            active,
            created_by: "admin".to_string(),
            created_at: Utc::now(),
            transaction_id: "tx_test".to_string(),
            block_number: 1001,
        }
    }

    #[test]
    fn test_charge_per_unit() {
        let m = measurement(2.0, 3.0, 4.0, 10.0);
        assert_eq!(policy_charge(&policy("w", PolicyUnit::Weight, 0.5, true), &m), 5.0);
        assert_eq!(policy_charge(&policy("v", PolicyUnit::Volume, 0.5, true), &m), 12.0);
        assert_eq!(policy_charge(&policy("i", PolicyUnit::Item, 7.25, true), &m), 7.25);
    }

    #[test]
    fn test_volume_example() {
        let m = measurement(2.0, 3.0, 4.0, 10.0);
        let policies = vec![policy("tariff_v", PolicyUnit::Volume, 0.5, true)];

        let result = calculate(&m, "org1", &policies).unwrap();
        assert_eq!(result.total_tariff, 12.0);
        assert_eq!(result.item_id, "X");
        assert_eq!(result.applied_policies.len(), 1);
    }

    #[test]
    fn test_inactive_policies_are_skipped() {
        let m = measurement(1.0, 1.0, 1.0, 4.0);
        let policies = vec![
            policy("a", PolicyUnit::Weight, 2.0, true),
            policy("b", PolicyUnit::Item, 100.0, false),
            policy("c", PolicyUnit::Item, 1.5, true),
        ];

        let result = calculate(&m, "org2", &policies).unwrap();
        assert_eq!(result.total_tariff, 9.5);
        let ids: Vec<&str> = result.applied_policies.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(result.organization_id, "org2");
    }

    #[test]
    fn test_no_active_policies() {
        let m = measurement(1.0, 1.0, 1.0, 1.0);
        let policies = vec![policy("a", PolicyUnit::Weight, 2.0, false)];

        assert_eq!(calculate(&m, "org1", &policies), Err(LedgerError::NoActivePolicies));
        assert_eq!(calculate(&m, "org1", &Vec::<TariffPolicy>::new()), Err(LedgerError::NoActivePolicies));
    }
}
