use std::sync::Arc;

use easel_core::tracker::{ForwardHandler, LogHandler};
use easel_core::{
    install, use_tracker, AppContext, EaselError, EventData, EventType, HandlerRegistry,
    Router, TrackConfig, UserInfo,
};
use serde_json::json;

fn config() -> TrackConfig {
    TrackConfig {
        user_info: UserInfo {
            name: None,
            email: "a@x.com".into(),
            uid: "u1".into(),
        },
    }
}

#[test]
fn retrieving_tracker_before_install_fails() {
    let ctx = AppContext::new();
    let err = use_tracker(&ctx).expect_err("not installed");
    assert!(matches!(err, EaselError::NotProvided));
    assert!(err.is_configuration());
}

#[tokio::test]
async fn installed_tracker_forwards_enriched_events() {
    let ctx = AppContext::new();
    let forward = Arc::new(ForwardHandler::new());
    let mut rx = forward.subscribe();
    let registry = HandlerRegistry::new()
        .with(EventType::ButtonClick, forward.clone())
        .with(EventType::RouteChange, Arc::new(LogHandler));
    install(&ctx, config(), registry).expect("install");

    let tracker = use_tracker(&ctx).expect("tracker provided");
    tracker
        .track(&EventData::button_click("save"))
        .expect("track click");

    let received = rx.recv().await.expect("forwarded event");
    assert_eq!(
        serde_json::to_value(&received).expect("serialize"),
        json!({
            "eventType": "BUTTON_CLICK",
            "eventName": "save",
            "email": "a@x.com",
            "uid": "u1",
        })
    );
}

#[tokio::test]
async fn navigation_events_reach_route_handler() {
    let ctx = AppContext::new();
    let forward = Arc::new(ForwardHandler::new());
    let mut rx = forward.subscribe();
    install(&ctx, config(), HandlerRegistry::uniform(forward.clone())).expect("install");

    let router = Router::new();
    let tracker = use_tracker(&ctx).expect("tracker provided");
    tracker
        .track(&router.route_change("/", "/new-canvas"))
        .expect("track navigation");

    let received = rx.recv().await.expect("forwarded event");
    let json = serde_json::to_value(&received).expect("serialize");
    assert_eq!(json["eventType"], "ROUTE_CHANGE");
    assert_eq!(json["route"], "/new-canvas");
    assert_eq!(json["enteredFrom"], "/");
    assert_eq!(json["email"], "a@x.com");
    assert_eq!(forward.forwarded(), 1);
}
