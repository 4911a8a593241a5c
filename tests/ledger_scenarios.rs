//! Ledger scenarios driven through the `Ledger` trait object

use std::sync::Arc;

use warehouse_ledger::ledger::chain::GENESIS_HEIGHT;
use warehouse_ledger::ledger::{
    DisputeStatus, DisputeUpdate, InMemoryLedger, Ledger, LedgerError, NewDispute, NewMeasurement,
    NewTariffPolicy, PolicyUnit, RecordKind,
};

fn ledger() -> Arc<dyn Ledger> {
    Arc::new(InMemoryLedger::default())
}

fn measurement(id: &str, l: f64, w: f64, h: f64, weight: f64) -> NewMeasurement {
    NewMeasurement {
        id: id.to_string(),
        length: l,
        width: w,
        height: h,
        weight,
        organization_id: "org1".to_string(),
    }
}

fn policy(id: &str, unit: PolicyUnit, rate: f64, active: bool) -> NewTariffPolicy {
    NewTariffPolicy {
        id: id.to_string(),
        name: format!("{} policy", id),
        description: String::new(),
        rate,
        unit,
        category: "standard".to_string(),
        active,
        created_by: "admin".to_string(),
    }
}

fn dispute(id: &str, item_id: &str) -> NewDispute {
    NewDispute {
        id: id.to_string(),
        item_id: item_id.to_string(),
        dispute_type: "weight".to_string(),
        description: "scale reading off".to_string(),
        raised_by: "org2".to_string(),
    }
}

#[tokio::test]
async fn test_volume_tariff_for_recorded_item() -> anyhow::Result<()> {
    let ledger = ledger();
    ledger.record_measurement(measurement("X", 2.0, 3.0, 4.0, 10.0)).await?;
    ledger
        .create_tariff_policy(policy("vol", PolicyUnit::Volume, 0.5, true))
        .await?;

    let calc = ledger.calculate_tariff("X", "org1").await?;
    assert_eq!(calc.total_tariff, 12.0);
    assert_eq!(calc.item_id, "X");
    assert_eq!(calc.applied_policies.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_mixed_units_and_inactive_policies() -> anyhow::Result<()> {
    let ledger = ledger();
    ledger.record_measurement(measurement("box", 1.0, 2.0, 5.0, 4.0)).await?;
    ledger
        .create_tariff_policy(policy("w", PolicyUnit::Weight, 2.0, true))
        .await?;
    ledger
        .create_tariff_policy(policy("v", PolicyUnit::Volume, 1.0, true))
        .await?;
    ledger
        .create_tariff_policy(policy("flat", PolicyUnit::Item, 3.0, true))
        .await?;
    ledger
        .create_tariff_policy(policy("off", PolicyUnit::Weight, 100.0, false))
        .await?;

    let calc = ledger.calculate_tariff("box", "org1").await?;
    // 4*2 + 10*1 + 3
    assert_eq!(calc.total_tariff, 21.0);
    let applied: Vec<&str> = calc.applied_policies.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(applied, vec!["w", "v", "flat"]);
    Ok(())
}

#[tokio::test]
async fn test_tariff_needs_item_and_active_policy() -> anyhow::Result<()> {
    let ledger = ledger();

    let err = ledger.calculate_tariff("ghost", "org1").await.unwrap_err();
    assert_eq!(err, LedgerError::not_found(RecordKind::Measurement, "ghost"));

    ledger.record_measurement(measurement("X", 1.0, 1.0, 1.0, 1.0)).await?;
    ledger
        .create_tariff_policy(policy("off", PolicyUnit::Item, 1.0, false))
        .await?;
    let err = ledger.calculate_tariff("X", "org1").await.unwrap_err();
    assert_eq!(err, LedgerError::NoActivePolicies);
    Ok(())
}

#[tokio::test]
async fn test_resolve_dispute() -> anyhow::Result<()> {
    let ledger = ledger();

    let update = DisputeUpdate {
        status: DisputeStatus::Resolved,
        resolution: Some("reweighed".to_string()),
        assigned_to: None,
    };
    let err = ledger.update_dispute_status("D1", update.clone()).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { kind: RecordKind::Dispute, .. }));

    ledger.create_dispute(dispute("D1", "X")).await?;
    ledger.update_dispute_status("D1", update).await?;

    let d = ledger.get_dispute("D1").await?;
    assert_eq!(d.status, DisputeStatus::Resolved);
    assert_eq!(d.resolution, "reweighed");
    assert_eq!(d.assigned_to, "");
    assert!(d.updated_at > d.created_at);
    Ok(())
}

#[tokio::test]
async fn test_dispute_filter_keeps_insertion_order() -> anyhow::Result<()> {
    let ledger = ledger();
    for id in ["D3", "D1", "D2"] {
        ledger.create_dispute(dispute(id, "X")).await?;
    }
    ledger
        .update_dispute_status(
            "D1",
            DisputeUpdate {
                status: DisputeStatus::Investigating,
                resolution: None,
                assigned_to: Some("inspector".to_string()),
            },
        )
        .await?;

    let all: Vec<String> = ledger
        .get_all_disputes(None)
        .await?
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(all, vec!["D3", "D1", "D2"]);

    let open: Vec<String> = ledger
        .get_all_disputes(Some(DisputeStatus::Open))
        .await?
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(open, vec!["D3", "D2"]);

    assert!(ledger
        .get_all_disputes(Some(DisputeStatus::Closed))
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn test_every_write_gets_a_fresh_block() -> anyhow::Result<()> {
    let ledger = ledger();
    assert_eq!(ledger.ledger_height().await?, GENESIS_HEIGHT);

    let a = ledger.record_measurement(measurement("A", 1.0, 1.0, 1.0, 1.0)).await?;
    let b = ledger
        .create_tariff_policy(policy("p", PolicyUnit::Item, 1.0, true))
        .await?;
    let c = ledger.create_dispute(dispute("D", "A")).await?;

    assert!(a.block_number < b.block_number && b.block_number < c.block_number);
    assert_ne!(a.transaction_id, b.transaction_id);
    assert_eq!(ledger.ledger_height().await?, GENESIS_HEIGHT + 3);

    let block = ledger.get_block(b.block_number).await?;
    assert_eq!(block.transactions, vec![b.transaction_id]);

    let err = ledger.get_block(GENESIS_HEIGHT + 50).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { kind: RecordKind::Block, .. }));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_writers() -> anyhow::Result<()> {
    let ledger = ledger();

    let mut handles = Vec::new();
    for i in 0..32 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .record_measurement(measurement(&format!("item-{}", i), 1.0, 1.0, 1.0, 1.0))
                .await
        }));
    }

    let mut blocks = Vec::new();
    for handle in handles {
        blocks.push(handle.await??.block_number);
    }
    blocks.sort_unstable();
    blocks.dedup();
    assert_eq!(blocks.len(), 32);
    assert_eq!(ledger.stats().await?.measurements, 32);
    Ok(())
}

#[tokio::test]
async fn test_disconnected_ledger_refuses_calls() -> anyhow::Result<()> {
    let ledger = ledger();
    ledger.record_measurement(measurement("A", 1.0, 1.0, 1.0, 1.0)).await?;
    assert!(ledger.is_connected());

    ledger.disconnect();
    assert!(!ledger.is_connected());
    assert_eq!(ledger.get_measurement("A").await.unwrap_err(), LedgerError::Unavailable);
    assert_eq!(ledger.ledger_height().await.unwrap_err(), LedgerError::Unavailable);
    Ok(())
}
