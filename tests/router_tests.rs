//! # Conversation Router Tests
//!
//! Tests driving the router with inbound events and asserting on the
//! produced effects and session transitions.

use ovozbot::config::{FallbackMode, RouterConfig};
use ovozbot::localization::init_localization;
use ovozbot::router::{ButtonSpec, ConversationRouter, EventKind, InboundEvent, OutboundEffect};
use ovozbot::session::VotingStage;

const USER: i64 = 100;

fn setup_router(config: RouterConfig) -> ConversationRouter {
    init_localization().expect("Failed to initialize localization");
    ConversationRouter::new(config)
}

fn event(kind: EventKind) -> InboundEvent {
    InboundEvent {
        user_id: USER,
        display_name: "Test User".to_string(),
        username: Some("testuser".to_string()),
        language_code: Some("en".to_string()),
        kind,
    }
}

fn command(name: &str, args: &[&str]) -> EventKind {
    EventKind::Command {
        name: name.to_string(),
        args: args.iter().map(|s| s.to_string()).collect(),
    }
}

fn text(text: &str) -> EventKind {
    EventKind::Text {
        text: text.to_string(),
    }
}

fn admin_notifications(effects: &[OutboundEffect]) -> Vec<&str> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            OutboundEffect::NotifyAdmin { text } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// The full happy path: entry trigger with tag, phone number, screenshot
#[test]
fn test_voting_sequence() {
    let router = setup_router(RouterConfig::default());

    // Entry trigger with a recognized campaign tag
    let effects = router.handle_event(event(command("start", &["05ABC"])));
    assert_eq!(effects.len(), 1);
    assert!(matches!(
        &effects[0],
        OutboundEffect::SendText { buttons: None, .. }
    ));
    assert_eq!(router.sessions().stage_of(USER), VotingStage::AwaitingPhone);

    // A valid phone number: admin notified exactly once, confirmation with
    // three buttons sent
    let effects = router.handle_event(event(text("+998901234567")));
    let notifications = admin_notifications(&effects);
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].contains("+998901234567"));
    assert!(notifications[0].contains("@testuser"));
    assert!(notifications[0].contains(&USER.to_string()));

    let confirmation = effects
        .iter()
        .find_map(|effect| match effect {
            OutboundEffect::SendText {
                buttons: Some(rows),
                ..
            } => Some(rows),
            _ => None,
        })
        .expect("Confirmation message with buttons");
    assert_eq!(confirmation.len(), 3);
    assert!(matches!(&confirmation[0][0], ButtonSpec::Link { .. }));
    assert!(matches!(&confirmation[1][0], ButtonSpec::Link { .. }));
    assert!(matches!(
        &confirmation[2][0],
        ButtonSpec::Callback { data, .. } if data == "voted"
    ));
    assert_eq!(
        router.sessions().stage_of(USER),
        VotingStage::AwaitingScreenshot
    );

    // Screenshot arrives: acknowledged, session completed
    let effects = router.handle_event(event(EventKind::Photo));
    assert_eq!(effects.len(), 1);
    assert!(matches!(&effects[0], OutboundEffect::SendText { .. }));
    assert_eq!(router.sessions().stage_of(USER), VotingStage::Completed);
}

/// The entry command without a tag also enters the voting flow
#[test]
fn test_entry_command_without_tag() {
    let router = setup_router(RouterConfig::default());

    let effects = router.handle_event(event(command("ovoz_berish", &[])));
    assert_eq!(effects.len(), 1);
    assert_eq!(router.sessions().stage_of(USER), VotingStage::AwaitingPhone);
}

/// A plain /start is a welcome, not an entry trigger
#[test]
fn test_plain_start_is_not_an_entry_trigger() {
    let router = setup_router(RouterConfig::default());

    let effects = router.handle_event(event(command("start", &[])));
    assert_eq!(router.sessions().stage_of(USER), VotingStage::Idle);

    // Welcome keyboard: help, info, GitHub link
    match &effects[0] {
        OutboundEffect::SendText {
            buttons: Some(rows),
            ..
        } => {
            assert_eq!(rows.len(), 3);
            assert!(matches!(&rows[2][0], ButtonSpec::Link { .. }));
        }
        other => panic!("Expected welcome message with keyboard, got {other:?}"),
    }

    // A start parameter without the campaign prefix is not a tag either
    router.handle_event(event(command("start", &["99XYZ"])));
    assert_eq!(router.sessions().stage_of(USER), VotingStage::Idle);
}

/// Instructions are sent as a photo when an image is configured
#[test]
fn test_instructions_image() {
    let config = RouterConfig {
        instructions_image: Some("AgACAgIAAxkBAAIB".to_string()),
        ..RouterConfig::default()
    };
    let router = setup_router(config);

    let effects = router.handle_event(event(command("start", &["05ABC"])));
    assert!(matches!(
        &effects[0],
        OutboundEffect::SendPhoto { photo_ref, .. } if photo_ref == "AgACAgIAAxkBAAIB"
    ));
}

/// An invalid phone number gets format guidance and leaves the stage alone
#[test]
fn test_invalid_phone_keeps_stage() {
    let router = setup_router(RouterConfig::default());
    router.handle_event(event(command("ovoz_berish", &[])));

    let effects = router.handle_event(event(text("12345")));
    assert!(admin_notifications(&effects).is_empty());
    assert!(matches!(
        &effects[0],
        OutboundEffect::SendText { text, .. } if text.contains("+998901234567")
    ));
    assert_eq!(router.sessions().stage_of(USER), VotingStage::AwaitingPhone);
}

/// A phone-shaped message is accepted even without an entry trigger
#[test]
fn test_phone_shaped_text_from_idle() {
    let router = setup_router(RouterConfig::default());

    let effects = router.handle_event(event(text("90 123 45 67")));
    assert_eq!(admin_notifications(&effects).len(), 1);
    assert_eq!(
        router.sessions().stage_of(USER),
        VotingStage::AwaitingScreenshot
    );
}

/// Unrelated text at Idle: FAQ reply, and never an admin notification
#[test]
fn test_faq_fallback() {
    let router = setup_router(RouterConfig::default());

    let effects = router.handle_event(event(text("hello")));
    assert_eq!(effects.len(), 1);
    assert!(admin_notifications(&effects).is_empty());
    assert!(matches!(
        &effects[0],
        OutboundEffect::SendText { text, .. } if text.contains("Test User")
    ));
    assert_eq!(router.sessions().stage_of(USER), VotingStage::Idle);
}

/// The strictest deployment variant stays silent on unrelated text
#[test]
fn test_silent_fallback() {
    let config = RouterConfig {
        fallback: FallbackMode::Silent,
        ..RouterConfig::default()
    };
    let router = setup_router(config);

    let effects = router.handle_event(event(text("hello")));
    assert!(effects.is_empty());
}

/// Screenshot gating is a configuration flag
#[test]
fn test_screenshot_gating() {
    // Lenient (default): any photo is acknowledged
    let router = setup_router(RouterConfig::default());
    let effects = router.handle_event(event(EventKind::Photo));
    assert_eq!(effects.len(), 1);
    assert_eq!(router.sessions().stage_of(USER), VotingStage::Idle);

    // Gated: a photo outside the flow gets a hint instead
    let config = RouterConfig {
        gate_screenshot: true,
        ..RouterConfig::default()
    };
    let router = setup_router(config);
    let effects = router.handle_event(event(EventKind::Photo));
    assert!(matches!(
        &effects[0],
        OutboundEffect::SendText { text, .. } if text.contains("/ovoz_berish")
    ));

    router.handle_event(event(command("ovoz_berish", &[])));
    router.handle_event(event(text("+998901234567")));
    let effects = router.handle_event(event(EventKind::Photo));
    assert_eq!(effects.len(), 1);
    assert_eq!(router.sessions().stage_of(USER), VotingStage::Completed);
}

/// Button presses: acknowledgment for "voted", rejection for unknown data
#[test]
fn test_button_presses() {
    let router = setup_router(RouterConfig::default());

    let effects = router.handle_event(event(EventKind::ButtonPress {
        data: "voted".to_string(),
    }));
    assert!(matches!(&effects[0], OutboundEffect::EditMessage { .. }));

    let effects = router.handle_event(event(EventKind::ButtonPress {
        data: "bogus".to_string(),
    }));
    assert!(matches!(&effects[0], OutboundEffect::EditMessage { .. }));
    assert_eq!(router.sessions().stage_of(USER), VotingStage::Idle);

    // Keyboard callbacks reuse the static texts
    let effects = router.handle_event(event(EventKind::ButtonPress {
        data: "info".to_string(),
    }));
    assert!(matches!(&effects[0], OutboundEffect::SendText { .. }));
}

/// Unknown commands are ignored, mirroring the original deployments
#[test]
fn test_unknown_command_is_ignored() {
    let router = setup_router(RouterConfig::default());

    let effects = router.handle_event(event(command("frobnicate", &[])));
    assert!(effects.is_empty());
}

/// The echo command repeats its arguments
#[test]
fn test_echo_command() {
    let router = setup_router(RouterConfig::default());

    let effects = router.handle_event(event(command("echo", &["salom", "dunyo"])));
    assert!(matches!(
        &effects[0],
        OutboundEffect::SendText { text, .. } if text.contains("salom dunyo")
    ));
}
