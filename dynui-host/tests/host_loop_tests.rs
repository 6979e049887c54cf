use dynui_engine::creators::{LOYALTY_CARD, ORDER_SUMMARY, PRODUCT_DETAIL};
use dynui_engine::{EngineConfig, Orchestrator};
use dynui_host::{HostError, HostHandle, parse_script, replay};
use dynui_types::{FunctionResult, ManualClock, Placement};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_test::{assert_err, assert_ok};

const MAX_AGE_MS: u64 = 60 * 60 * 1000;

fn spawn_host(clock: &ManualClock) -> (HostHandle, JoinHandle<Orchestrator>) {
    let engine =
        Orchestrator::with_builtins(EngineConfig::default(), Arc::new(clock.clone())).unwrap();
    dynui_host::spawn(engine)
}

fn product(name: &str) -> FunctionResult {
    FunctionResult::ok(json!({"product": {"name": name, "price": 3.5}}))
}

// ── Event loop ───────────────────────────────────────────────────

#[tokio::test]
async fn completions_are_stamped_in_arrival_order() {
    let clock = ManualClock::new(100);
    let (handle, _task) = spawn_host(&clock);

    for name in ["first", "second", "third", "fourth"] {
        handle.submit("get_product_details", product(name)).await.unwrap();
        // Wait until the loop has applied it before moving the clock.
        handle.snapshot().await.unwrap();
        clock.advance(10);
    }

    let snapshot = handle.snapshot().await.unwrap();
    let names: Vec<&str> = snapshot
        .placement(Placement::Sidebar)
        .iter()
        .filter(|r| r.component_type == PRODUCT_DETAIL)
        .filter_map(|r| match &r.view {
            dynui_engine::ViewDescriptor::Widget { props, .. } => props["name"].as_str(),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["fourth", "third", "second"]);
}

#[tokio::test]
async fn version_is_published_on_change() {
    let clock = ManualClock::new(0);
    let (handle, _task) = spawn_host(&clock);
    let mut updates = handle.subscribe();
    assert_eq!(handle.version(), 0);

    handle
        .submit("get_loyalty_points", FunctionResult::ok(json!({"points": 5})))
        .await
        .unwrap();
    assert_ok!(updates.changed().await);
    assert_eq!(*updates.borrow(), 1);
    assert_eq!(handle.version(), 1);
}

#[tokio::test]
async fn ignored_results_do_not_change_version() {
    let clock = ManualClock::new(0);
    let (handle, _task) = spawn_host(&clock);

    handle
        .submit("get_cart", FunctionResult::failed("cart service down"))
        .await
        .unwrap();
    handle
        .submit("get_weather", FunctionResult::ok(json!({"temp": 21})))
        .await
        .unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.version, 0);
    assert!(snapshot.placements.values().all(Vec::is_empty));
}

#[tokio::test]
async fn sweep_evicts_expired_components() {
    let clock = ManualClock::new(0);
    let (handle, _task) = spawn_host(&clock);

    handle
        .submit("get_cart", FunctionResult::ok(json!({"items": [{"name": "Tea", "price": 2}]})))
        .await
        .unwrap();
    let before = handle.snapshot().await.unwrap();
    assert_eq!(before.placement(Placement::Bottom)[0].component_type, ORDER_SUMMARY);

    clock.advance(MAX_AGE_MS + 1);
    handle.sweep().await.unwrap();
    let after = handle.snapshot().await.unwrap();
    assert!(after.placement(Placement::Bottom).is_empty());
    assert_eq!(after.version, 2);

    // A second sweep has nothing to do.
    handle.sweep().await.unwrap();
    assert_eq!(handle.snapshot().await.unwrap().version, 2);
}

#[tokio::test(start_paused = true)]
async fn sweep_timer_evicts_expired_components() {
    let clock = ManualClock::new(0);
    let (handle, _task) = spawn_host(&clock);
    let mut updates = handle.subscribe();
    let period = EngineConfig::default().sweep_interval();

    handle
        .submit("get_loyalty_points", FunctionResult::ok(json!({"points": 30})))
        .await
        .unwrap();
    assert_ok!(updates.changed().await);
    assert_eq!(*updates.borrow_and_update(), 1);

    clock.advance(MAX_AGE_MS + 1);
    tokio::time::advance(period).await;
    assert_ok!(updates.changed().await);
    assert_eq!(*updates.borrow_and_update(), 2);
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.placement(Placement::Sidebar).is_empty());
    assert_eq!(snapshot.version, 2);

    // The next tick finds nothing to remove.
    tokio::time::advance(period).await;
    tokio::task::yield_now().await;
    assert_eq!(handle.snapshot().await.unwrap().version, 2);
    assert_eq!(handle.version(), 2);
}

#[tokio::test]
async fn clear_removes_everything() {
    let clock = ManualClock::new(0);
    let (handle, task) = spawn_host(&clock);
    handle
        .submit("get_loyalty_points", FunctionResult::ok(json!({"points": 1})))
        .await
        .unwrap();
    handle.clear().await.unwrap();
    handle.shutdown().await.unwrap();

    let engine = task.await.unwrap();
    assert!(engine.is_empty());
    assert_eq!(engine.version(), 2);
}

#[tokio::test]
async fn dropping_every_handle_stops_the_loop() {
    let clock = ManualClock::new(0);
    let (handle, task) = spawn_host(&clock);
    handle
        .submit("get_loyalty_points", FunctionResult::ok(json!({"points": 1})))
        .await
        .unwrap();
    drop(handle);

    let engine = task.await.unwrap();
    assert_eq!(engine.len(), 1);
}

#[tokio::test]
async fn commands_after_shutdown_fail() {
    let clock = ManualClock::new(0);
    let (handle, task) = spawn_host(&clock);
    handle.shutdown().await.unwrap();
    task.await.unwrap();

    let err = assert_err!(handle.snapshot().await);
    assert!(matches!(err, HostError::Closed));
}

#[tokio::test]
async fn snapshot_serializes_every_placement() {
    let clock = ManualClock::new(0);
    let (handle, _task) = spawn_host(&clock);
    handle
        .submit("check_loyalty_balance", FunctionResult::ok(json!({"points": 42})))
        .await
        .unwrap();

    let value = serde_json::to_value(handle.snapshot().await.unwrap()).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["placements"]["inline"], json!([]));
    assert_eq!(value["placements"]["bottom"], json!([]));
    assert_eq!(value["placements"]["sidebar"][0]["type"], LOYALTY_CARD);
}

// ── Scripts ──────────────────────────────────────────────────────

#[test]
fn parse_skips_blank_and_comment_lines() {
    let script = r#"
# warm up
{"function": "get_loyalty_points", "result": {"success": true, "data": {"points": 3}}}

{"function": "get_cart", "result": {"success": false, "error": "down"}, "delay_ms": 5}
"#;
    let lines = parse_script(script).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].function, "get_loyalty_points");
    assert_eq!(lines[0].delay_ms, 0);
    assert!(!lines[1].result.success);
    assert_eq!(lines[1].delay_ms, 5);
}

#[test]
fn parse_reports_line_number() {
    let script = "{\"function\": \"a\", \"result\": {\"success\": true}}\nnot json\n";
    match parse_script(script) {
        Err(HostError::Script { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected script error, got {other:?}"),
    }
}

#[tokio::test]
async fn replay_submits_every_line() {
    let clock = ManualClock::new(0);
    let (handle, _task) = spawn_host(&clock);
    let lines = parse_script(
        r#"{"function": "get_product_info", "result": {"success": true, "data": {"name": "Scone"}}}
{"function": "get_order_summary", "result": {"success": true, "data": {"data": {"items": []}}}, "delay_ms": 1}
{"function": "get_menu_recommendations", "result": {"success": true, "data": [{"name": "Chai"}]}}"#,
    )
    .unwrap();

    let submitted = replay(&handle, &lines).await.unwrap();
    assert_eq!(submitted, 3);

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.version, 3);
    for placement in Placement::ALL {
        assert_eq!(snapshot.placement(placement).len(), 1, "{placement}");
    }
}
