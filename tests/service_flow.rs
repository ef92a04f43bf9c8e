use dispatch_gate::domain::decision::Decision;
use dispatch_gate::domain::outcome::{DeliveryStatus, Observation};
use dispatch_gate::domain::overrides::{OverrideStatus, UnlockStatus};
use dispatch_gate::domain::shipment::{AreaType, PaymentMode, RiskFactors, RoadAccessibility, WeatherSeverity};
use dispatch_gate::service::dispatch_service::{DispatchService, ShipmentDecision};
use dispatch_gate::store::memory::MemoryDecisionStore;
use dispatch_gate::store::DecisionStore;
use std::sync::Arc;
use std::time::Duration;

fn day() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

async fn service_with(store: MemoryDecisionStore) -> DispatchService {
    DispatchService::load(Arc::new(store)).await.unwrap()
}

fn failed_high_risk(shipment_id: &str) -> dispatch_gate::domain::outcome::OutcomeRecord {
    dispatch_gate::learning::reconciler::reconcile(&Observation {
        shipment_id: shipment_id.to_string(),
        cycle_date: day(),
        predicted_decision: Decision::Dispatch,
        predicted_risk_score: 80.0,
        actual_status: DeliveryStatus::FailedAttempt,
        delay_minutes: 0,
        override_flag: false,
    })
}

fn urban_cod(shipment_id: &str) -> RiskFactors {
    RiskFactors {
        shipment_id: shipment_id.to_string(),
        weight_kg: 1.0,
        volumetric_weight: 1.0,
        payment_mode: PaymentMode::Cod,
        priority: false,
        area_type: AreaType::Urban,
        road_accessibility: RoadAccessibility::Wide,
        address_confidence: 95.0,
        weather_severity: WeatherSeverity::Low,
        weather_impact: 0.0,
    }
}

#[tokio::test]
async fn locked_shipment_keeps_manager_decision() {
    let service = service_with(MemoryDecisionStore::new()).await;

    let first = service.evaluate_shipment("S1", 75.0, 70.0, 80.0).await.unwrap();
    assert_eq!(first.decision(), Decision::Delay);

    let out = service
        .apply_override("S1", "DELAY", "DISPATCH", "High priority customer")
        .await
        .unwrap();
    assert_eq!(out.status, OverrideStatus::Overridden);
    assert!(service.is_locked("S1").await);

    match service.evaluate_shipment("S1", 99.0, 99.0, 10.0).await.unwrap() {
        ShipmentDecision::Locked { decision, .. } => assert_eq!(decision, Decision::Dispatch),
        other => panic!("expected lock to hold, got {other:?}"),
    }

    let unlocked = service.unlock("S1").await.unwrap();
    assert_eq!(unlocked.status, UnlockStatus::Unlocked);
    let again = service.evaluate_shipment("S1", 99.0, 99.0, 10.0).await.unwrap();
    assert_eq!(again.decision(), Decision::Reschedule);

    assert_eq!(service.unlock("S1").await.unwrap().status, UnlockStatus::NotFound);
    assert_eq!(service.override_history(Some("S1")).await.len(), 1);
    assert_eq!(service.override_stats().await.total_overrides, 0);
}

#[tokio::test]
async fn ledger_survives_reload() {
    let store = MemoryDecisionStore::new();
    let service = service_with(store.clone()).await;
    service
        .apply_override("S2", "RESCHEDULE", "DELAY", "Local knowledge")
        .await
        .unwrap();
    service
        .apply_override("S3", "DELAY", "DISPATCH", "Weather cleared manually")
        .await
        .unwrap();
    service.unlock("S3").await.unwrap();

    let reloaded = service_with(store).await;
    assert!(reloaded.is_locked("S2").await);
    assert!(!reloaded.is_locked("S3").await);
    assert_eq!(reloaded.override_history(None).await.len(), 2);
}

#[tokio::test]
async fn rejected_override_is_not_persisted() {
    let store = MemoryDecisionStore::new();
    let service = service_with(store.clone()).await;
    let out = service
        .apply_override("S4", "DELAY", "DISPATCH", "because")
        .await
        .unwrap();
    assert_eq!(out.status, OverrideStatus::Error);
    assert!(store.load_overrides().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_outcome_keeps_first() {
    let service = service_with(MemoryDecisionStore::new()).await;
    let obs = Observation {
        shipment_id: "S5".to_string(),
        cycle_date: day(),
        predicted_decision: Decision::Dispatch,
        predicted_risk_score: 20.0,
        actual_status: DeliveryStatus::Delivered,
        delay_minutes: 0,
        override_flag: false,
    };
    assert!(service.reconcile_outcome(&obs).await.unwrap().recorded);

    let mut late = obs.clone();
    late.actual_status = DeliveryStatus::FailedAttempt;
    let second = service.reconcile_outcome(&late).await.unwrap();
    assert!(!second.recorded);

    let stats = service.outcome_statistics(day(), day()).await.unwrap();
    assert_eq!(stats.total_shipments, 1);
    assert_eq!(stats.successful_deliveries, 1);
}

#[tokio::test]
async fn end_of_day_uses_recorded_decision_and_override_flag() {
    let service = service_with(MemoryDecisionStore::new()).await;

    assert!(service
        .reconcile_shipment("ghost", DeliveryStatus::Delivered, 0, day())
        .await
        .unwrap()
        .is_none());

    service.evaluate_shipment("S6", 20.0, 10.0, 90.0).await.unwrap();
    let plain = service
        .reconcile_shipment("S6", DeliveryStatus::FailedAttempt, 60, day())
        .await
        .unwrap()
        .unwrap();
    assert!(plain.outcome.mismatch_flag);
    assert!(!plain.outcome.override_flag);

    service.evaluate_shipment("S7", 75.0, 70.0, 80.0).await.unwrap();
    service
        .apply_override("S7", "DELAY", "DISPATCH", "Manager experience")
        .await
        .unwrap();
    let covered = service
        .reconcile_shipment("S7", DeliveryStatus::FailedAttempt, 60, day())
        .await
        .unwrap()
        .unwrap();
    assert!(covered.outcome.override_flag);
    assert!(!covered.outcome.mismatch_flag);
    assert_eq!(covered.outcome.predicted_decision, Decision::Delay);
}

#[tokio::test]
async fn learning_cycle_publishes_new_weights() {
    let store = MemoryDecisionStore::new();
    let service = service_with(store.clone()).await;

    assert!(service.run_learning_for_range(day(), day()).await.unwrap().is_none());
    assert_eq!(service.weights().await.unwrap().update_count, 0);

    for i in 0..3 {
        service
            .reconcile_outcome(&Observation {
                shipment_id: format!("F{i}"),
                cycle_date: day(),
                predicted_decision: Decision::Dispatch,
                predicted_risk_score: 72.0,
                actual_status: DeliveryStatus::FailedAttempt,
                delay_minutes: 60,
                override_flag: false,
            })
            .await
            .unwrap();
    }

    let cycle = service.run_learning_for_range(day(), day()).await.unwrap().unwrap();
    assert_eq!(cycle.signals.high_risk_failures, 3);
    assert_eq!(cycle.signals.missed_risks, 3);

    let weights = service.weights().await.unwrap();
    assert_eq!(weights.update_count, 1);
    assert_eq!(weights.weights.address_risk, 18);
    assert_eq!(weights.weights.cod_risk, 18);
    assert_eq!(service.weight_evolution().await.unwrap().len(), 1);

    let stored = store.load_weights().await.unwrap().unwrap();
    assert_eq!(stored.update_count, 1);

    let factors = urban_cod("S8");
    let assessment = service.score_risk(&factors).await.unwrap();
    assert_eq!(assessment.score, 18);
    assert_eq!(assessment.weights_version, 1);
}

#[tokio::test]
async fn learning_builds_on_weights_written_elsewhere() {
    let store = MemoryDecisionStore::new();
    let service = service_with(store.clone()).await;
    let other = service_with(store.clone()).await;
    let window = vec![failed_high_risk("S9")];

    assert!(other.run_learning_cycle(&window).await.unwrap().is_some());
    let cycle = service.run_learning_cycle(&window).await.unwrap().unwrap();
    assert_eq!(cycle.new_weights.update_count, 2);
    assert_eq!(service.weights().await.unwrap().update_count, 2);
    assert_eq!(store.load_weights().await.unwrap().unwrap().update_count, 2);

    // A third run moves forward again instead of sticking on a stale version.
    assert!(service.run_learning_cycle(&window).await.unwrap().is_some());
    assert_eq!(store.load_weights().await.unwrap().unwrap().update_count, 3);
}

#[tokio::test]
async fn scoring_sees_weights_learned_by_another_service() {
    let store: Arc<MemoryDecisionStore> = Arc::new(MemoryDecisionStore::new());
    let api = DispatchService::load_with_refresh(store.clone(), Duration::ZERO).await.unwrap();
    let worker = DispatchService::load_with_refresh(store.clone(), Duration::ZERO).await.unwrap();

    let before = api.score_risk(&urban_cod("S10")).await.unwrap();
    assert_eq!(before.weights_version, 0);

    let window: Vec<_> = (0..3).map(|i| failed_high_risk(&format!("W{i}"))).collect();
    worker.run_learning_cycle(&window).await.unwrap().unwrap();

    let after = api.score_risk(&urban_cod("S10")).await.unwrap();
    assert_eq!(after.weights_version, 1);
    assert!(after.score > before.score);

    let recorded = api.evaluate_shipment("S10", 30.0, 10.0, 90.0).await.unwrap();
    assert_eq!(recorded.decision(), Decision::Dispatch);
}

#[tokio::test]
async fn cached_weights_hold_until_ttl() {
    let store: Arc<MemoryDecisionStore> = Arc::new(MemoryDecisionStore::new());
    let api = DispatchService::load_with_refresh(store.clone(), Duration::from_secs(3600))
        .await
        .unwrap();
    let worker = service_with((*store).clone()).await;

    worker.run_learning_cycle(&[failed_high_risk("S11")]).await.unwrap().unwrap();
    assert_eq!(api.weights().await.unwrap().update_count, 0);
}

#[tokio::test]
async fn explanation_follows_active_lock() {
    let service = service_with(MemoryDecisionStore::new()).await;
    assert!(service.explain_shipment("S12").await.unwrap().is_none());

    service.evaluate_shipment("S12", 75.0, 70.0, 80.0).await.unwrap();
    let gate = service.explain_shipment("S12").await.unwrap().unwrap();
    assert_eq!(gate.decision, Decision::Delay);
    assert!(!gate.should_dispatch);
    assert_eq!(gate.action_items[0], "Hold shipment at hub");

    service
        .apply_override("S12", "DELAY", "DISPATCH", "Weather cleared manually")
        .await
        .unwrap();
    let locked = service.explain_shipment("S12").await.unwrap().unwrap();
    assert!(locked.locked);
    assert_eq!(locked.decision, Decision::Dispatch);
    assert!(locked.should_dispatch);
    assert!(!locked.action_items.contains(&"Hold shipment at hub"));
    assert!(locked.explanation.starts_with("DISPATCH"));
    assert_eq!(locked.record.map(|r| r.decision), Some(Decision::Delay));

    service.unlock("S12").await.unwrap();
    assert!(!service.explain_shipment("S12").await.unwrap().unwrap().should_dispatch);
}

#[tokio::test]
async fn learned_on_tracks_the_cycle_day() {
    let store = MemoryDecisionStore::new();
    let service = service_with(store.clone()).await;
    let today = chrono::Utc::now().date_naive();
    assert!(!service.learned_on(today).await.unwrap());

    let worker = service_with(store).await;
    worker.run_learning_cycle(&[failed_high_risk("S13")]).await.unwrap().unwrap();

    assert!(service.learned_on(today).await.unwrap());
    assert!(!service.learned_on(today - chrono::Duration::days(1)).await.unwrap());
}

#[tokio::test]
async fn performance_and_recommendations_read_the_window() {
    let service = service_with(MemoryDecisionStore::new()).await;
    for i in 0..2 {
        service
            .reconcile_outcome(&Observation {
                shipment_id: format!("P{i}"),
                cycle_date: day(),
                predicted_decision: Decision::Dispatch,
                predicted_risk_score: 80.0,
                actual_status: DeliveryStatus::FailedAttempt,
                delay_minutes: 0,
                override_flag: false,
            })
            .await
            .unwrap();
    }

    let breakdown = service.performance_breakdown(day(), day()).await.unwrap();
    assert_eq!(breakdown.decisions[&Decision::Dispatch].shipments, 2);
    assert_eq!(breakdown.top_mismatches.len(), 1);
    assert_eq!(breakdown.top_mismatches[0].count, 2);

    let recs = service.learning_recommendations(day(), day()).await.unwrap();
    assert!(!recs.risk_engine.is_empty());
    assert!(!recs.address_intelligence.is_empty());

    let empty = service
        .learning_recommendations(day() - chrono::Duration::days(9), day() - chrono::Duration::days(8))
        .await
        .unwrap();
    assert!(empty.note.is_some());
}
