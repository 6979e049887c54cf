use dynui_engine::creators::{LOYALTY_CARD, MENU_RECOMMENDATIONS, ORDER_SUMMARY, PRODUCT_DETAIL};
use dynui_engine::{EngineConfig, EngineError, Orchestrator, ViewDescriptor};
use dynui_dedup::{Composite, DeduplicationStrategy, LimitByType, PerPlacementLimit};
use dynui_types::{ComponentDraft, FunctionResult, ManualClock, Placement, TypePolicy};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const MAX_AGE_MS: u64 = 60 * 60 * 1000;

fn bare_engine(clock: &ManualClock) -> Orchestrator {
    Orchestrator::new(EngineConfig::default(), Arc::new(clock.clone()))
}

fn builtin_engine(clock: &ManualClock) -> Orchestrator {
    Orchestrator::with_builtins(EngineConfig::default(), Arc::new(clock.clone())).unwrap()
}

fn sidebar(id: &str, component_type: &str, at: u64) -> ComponentDraft {
    ComponentDraft::new(id, component_type, Placement::Sidebar, json!({"name": id})).at(at)
}

fn visible(engine: &Orchestrator, placement: Placement) -> Vec<(String, u64)> {
    engine
        .instances_for_placement(placement)
        .into_iter()
        .map(|i| (i.id, i.updated_at.as_millis()))
        .collect()
}

// ── Documented scenarios ─────────────────────────────────────────

#[test]
fn unique_and_limited_types_share_a_placement() {
    let clock = ManualClock::new(0);
    let mut engine = bare_engine(&clock);
    engine.register_type(LOYALTY_CARD, TypePolicy::unique("Loyalty card"));
    engine.register_type(PRODUCT_DETAIL, TypePolicy::limited("Product", 2));

    for t in 1..=3 {
        engine
            .add_component(sidebar(&format!("loyalty-{t}"), LOYALTY_CARD, t))
            .unwrap();
    }
    engine.add_component(sidebar("A", PRODUCT_DETAIL, 1)).unwrap();
    engine.add_component(sidebar("B", PRODUCT_DETAIL, 2)).unwrap();
    engine.add_component(sidebar("C", PRODUCT_DETAIL, 3)).unwrap();

    let rendered = engine.get_for_placement(Placement::Sidebar);
    let summary: Vec<(&str, &str)> = rendered
        .iter()
        .map(|r| (r.component_type.as_str(), r.id.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (LOYALTY_CARD, "loyalty-3"),
            (PRODUCT_DETAIL, "C"),
            (PRODUCT_DETAIL, "B"),
        ]
    );
    // Non-visible instances stay in the store.
    assert_eq!(engine.len(), 6);
}

#[test]
fn evict_after_max_age_empties_store() {
    let clock = ManualClock::new(10_000);
    let mut engine = builtin_engine(&clock);
    engine
        .ingest_function_result("get_loyalty_points", &FunctionResult::ok(json!({"points": 3})))
        .unwrap();

    clock.advance(MAX_AGE_MS + 1);
    assert_eq!(engine.evict(MAX_AGE_MS), 1);
    assert!(engine.is_empty());
    assert!(engine.get_for_placement(Placement::Sidebar).is_empty());
}

// ── Ingestion ────────────────────────────────────────────────────

#[test]
fn unique_type_replaces_instead_of_duplicating() {
    let clock = ManualClock::new(100);
    let mut engine = builtin_engine(&clock);

    let first = engine
        .ingest_function_result("get_loyalty_points", &FunctionResult::ok(json!({"points": 10})))
        .unwrap()
        .unwrap();
    clock.advance(50);
    let second = engine
        .ingest_function_result("check_loyalty_balance", &FunctionResult::ok(json!({"points": 20})))
        .unwrap()
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(engine.len(), 1);
    let stored = engine.get(&second.id).unwrap();
    assert_eq!(stored.get_number("/points"), Some(20.0));
    assert_eq!(stored.updated_at.as_millis(), 150);
}

#[test]
fn updated_at_is_stamped_at_ingestion() {
    let clock = ManualClock::new(500);
    let mut engine = builtin_engine(&clock);
    let result = FunctionResult::ok(json!({"name": "Flat white"}));

    clock.set(900);
    let stored = engine
        .ingest_function_result("get_product_details", &result)
        .unwrap()
        .unwrap();
    assert_eq!(stored.updated_at.as_millis(), 900);
}

#[test]
fn ingested_ids_use_the_engine_clock() {
    let clock = ManualClock::new(7_777);
    let mut engine = builtin_engine(&clock);
    let stored = engine
        .ingest_function_result("get_product_details", &FunctionResult::ok(json!({"name": "Mocha"})))
        .unwrap()
        .unwrap();
    assert_eq!(stored.id.split('-').nth(2), Some("7777"));
    assert_eq!(stored.updated_at.as_millis(), 7_777);
}

#[test]
fn limited_type_keeps_newest_products() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);
    for name in ["a", "b", "c", "d"] {
        clock.advance(10);
        engine
            .ingest_function_result("get_product_details", &FunctionResult::ok(json!({"name": name})))
            .unwrap();
    }

    assert_eq!(engine.len(), 4);
    let names: Vec<String> = engine
        .instances_for_placement(Placement::Sidebar)
        .into_iter()
        .filter_map(|i| i.get_str("/name").map(str::to_string))
        .collect();
    assert_eq!(names, vec!["d", "c", "b"]);
}

#[test]
fn failed_and_unknown_results_are_ignored() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);

    let failed = engine
        .ingest_function_result("get_cart", &FunctionResult::failed("timeout"))
        .unwrap();
    let unknown = engine
        .ingest_function_result("get_weather", &FunctionResult::ok(json!({})))
        .unwrap();

    assert!(failed.is_none());
    assert!(unknown.is_none());
    assert!(engine.is_empty());
    assert_eq!(engine.version(), 0);
}

#[test]
fn builtin_types_land_in_their_placements() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);
    engine
        .ingest_function_result("get_cart", &FunctionResult::ok(json!({"items": []})))
        .unwrap();
    engine
        .ingest_function_result("get_menu_recommendations", &FunctionResult::ok(json!([])))
        .unwrap();

    let bottom = engine.get_for_placement(Placement::Bottom);
    assert_eq!(bottom.len(), 1);
    assert_eq!(bottom[0].component_type, ORDER_SUMMARY);
    let inline = engine.get_for_placement(Placement::Inline);
    assert_eq!(inline[0].component_type, MENU_RECOMMENDATIONS);
    assert!(engine.get_for_placement(Placement::Sidebar).is_empty());
}

// ── Placement policy ─────────────────────────────────────────────

#[test]
fn disallowed_placement_is_rejected() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);
    let draft = ComponentDraft::new("cart", ORDER_SUMMARY, Placement::Sidebar, json!({}));

    let err = engine.add_component(draft).unwrap_err();
    assert!(matches!(
        err,
        EngineError::PlacementNotAllowed { placement: Placement::Sidebar, .. }
    ));
    assert!(engine.is_empty());
    assert_eq!(engine.version(), 0);
}

#[test]
fn batch_add_is_partially_tolerant() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);

    let results = engine.add_components(vec![
        sidebar("p1", PRODUCT_DETAIL, 1),
        ComponentDraft::new("", PRODUCT_DETAIL, Placement::Sidebar, json!({})),
        ComponentDraft::new("cart", ORDER_SUMMARY, Placement::Inline, json!({})),
        sidebar("p2", PRODUCT_DETAIL, 2),
    ]);

    assert_eq!(results.len(), 4);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(EngineError::InvalidComponent(_))));
    assert!(matches!(results[2], Err(EngineError::PlacementNotAllowed { .. })));
    assert!(results[3].is_ok());
    assert_eq!(engine.len(), 2);
    assert_eq!(engine.version(), 2);
}

// ── Version counter ──────────────────────────────────────────────

#[test]
fn version_tracks_state_changes() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);
    assert_eq!(engine.version(), 0);

    engine.add_component(sidebar("p1", PRODUCT_DETAIL, 0)).unwrap();
    assert_eq!(engine.version(), 1);

    // Nothing old enough: no change, no bump.
    assert_eq!(engine.evict(MAX_AGE_MS), 0);
    assert_eq!(engine.version(), 1);

    clock.advance(MAX_AGE_MS + 1);
    assert_eq!(engine.evict_expired(), 1);
    assert_eq!(engine.version(), 2);

    engine.add_component(sidebar("p2", PRODUCT_DETAIL, 0)).unwrap();
    assert_eq!(engine.clear_all(), 1);
    assert_eq!(engine.version(), 4);
}

#[test]
fn evict_is_idempotent() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);
    assert_eq!(engine.evict_expired(), 0);
    engine.add_component(sidebar("p1", PRODUCT_DETAIL, 0)).unwrap();
    clock.advance(MAX_AGE_MS + 1);
    assert_eq!(engine.evict_expired(), 1);
    assert_eq!(engine.evict_expired(), 0);
    assert_eq!(engine.version(), 2);
}

#[test]
fn queries_do_not_bump_version() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);
    engine.add_component(sidebar("p1", PRODUCT_DETAIL, 0)).unwrap();
    let before = engine.version();

    let _ = engine.get_for_placement(Placement::Sidebar);
    let _ = engine.all_components();
    let _ = engine.get("p1");
    assert_eq!(engine.version(), before);
}

// ── Rendering ────────────────────────────────────────────────────

#[test]
fn unknown_type_renders_placeholder_in_placement() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);
    engine.add_component(sidebar("w1", "weatherCard", 1)).unwrap();

    let rendered = engine.get_for_placement(Placement::Sidebar);
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].view.is_unsupported());
}

#[test]
fn rendered_component_serializes_type_field() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);
    engine
        .ingest_function_result("get_loyalty_points", &FunctionResult::ok(json!({"points": 1})))
        .unwrap();

    let rendered = engine.get_for_placement(Placement::Sidebar);
    let value = serde_json::to_value(&rendered[0]).unwrap();
    assert_eq!(value["type"], LOYALTY_CARD);
    assert_eq!(value["view"]["kind"], "widget");
    assert!(matches!(rendered[0].view, ViewDescriptor::Widget { .. }));
}

// ── Extension points ─────────────────────────────────────────────

#[test]
fn runtime_rule_overrides_policy_strategy() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);
    engine
        .register_deduplication_rule(PRODUCT_DETAIL, "unique")
        .unwrap();
    for t in 1..=3 {
        engine
            .add_component(sidebar(&format!("p{t}"), PRODUCT_DETAIL, t))
            .unwrap();
    }
    assert_eq!(visible(&engine, Placement::Sidebar), vec![("p3".to_string(), 3)]);
}

#[test]
fn custom_strategy_registered_by_name() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);
    let layers: Vec<Arc<dyn DeduplicationStrategy>> =
        vec![Arc::new(LimitByType::new(3)), Arc::new(PerPlacementLimit::new(1))];
    engine
        .register_strategy("one-per-placement", Arc::new(Composite::new("one-per-placement", layers)))
        .unwrap();
    engine
        .register_deduplication_rule("banner", "one-per-placement")
        .unwrap();

    engine.add_component(sidebar("b1", "banner", 1)).unwrap();
    engine.add_component(sidebar("b2", "banner", 2)).unwrap();
    assert_eq!(visible(&engine, Placement::Sidebar), vec![("b2".to_string(), 2)]);
}

#[test]
fn unknown_rule_strategy_is_rejected() {
    let clock = ManualClock::new(0);
    let mut engine = builtin_engine(&clock);
    let err = engine
        .register_deduplication_rule(PRODUCT_DETAIL, "nope")
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownStrategy { .. }));
}

#[test]
fn builtins_register_policies_and_rules() {
    let clock = ManualClock::new(0);
    let engine = builtin_engine(&clock);
    assert_eq!(engine.types().list_unique_types(), vec![
        LOYALTY_CARD,
        MENU_RECOMMENDATIONS,
        ORDER_SUMMARY
    ]);
    assert_eq!(engine.types().effective_limit(PRODUCT_DETAIL), 3);
    assert_eq!(engine.deduplicator().rule_for(MENU_RECOMMENDATIONS), Some("latest"));
    assert_eq!(engine.deduplicator().rule_for(LOYALTY_CARD), Some("unique"));
    assert!(engine.deduplicator().rule_for(PRODUCT_DETAIL).is_none());
    assert_eq!(engine.creators().len(), 4);
}

// ── Configuration ────────────────────────────────────────────────

#[test]
fn config_overrides_builtin_policies() {
    let config = EngineConfig::from_toml_str(
        r#"
max_age_ms = 1000

[types.productDetail]
limit = 2

[rules]
orderSummary = "latest"
"#,
    )
    .unwrap();
    let clock = ManualClock::new(0);
    let mut engine = Orchestrator::with_builtins(config, Arc::new(clock.clone())).unwrap();

    assert_eq!(engine.types().effective_limit(PRODUCT_DETAIL), 2);
    assert_eq!(engine.deduplicator().rule_for(ORDER_SUMMARY), Some("latest"));

    for t in 1..=3 {
        engine
            .add_component(sidebar(&format!("p{t}"), PRODUCT_DETAIL, t))
            .unwrap();
    }
    assert_eq!(engine.instances_for_placement(Placement::Sidebar).len(), 2);

    clock.set(1_003);
    assert_eq!(engine.evict_expired(), 2);
    assert_eq!(engine.len(), 1);
}

#[test]
fn config_with_unknown_rule_fails_construction() {
    let config = EngineConfig::from_toml_str("[rules]\nloyaltyCard = \"sometimes\"").unwrap();
    let clock = ManualClock::new(0);
    let result = Orchestrator::with_builtins(config, Arc::new(clock));
    assert!(matches!(result, Err(EngineError::UnknownStrategy { .. })));
}
