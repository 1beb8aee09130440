//! View interaction tests
//!
//! Menu, tabs, host commands, rejected input and lifecycle.

use tokio::sync::mpsc;
use tokio::time::timeout;

use startpage_app::config::Settings;
use startpage_app::{Engine, EngineEvent, Message, ViewFlow, ViewPhase};
use startpage_channel::test_utils::send_setting_line;
use startpage_channel::{DropReason, Transport};
use startpage_core::{HostCommand, TransportEvent};

use super::mock_host::MockHost;
use crate::{drain_events, mounted_engine, TIMEOUT};

// ─────────────────────────────────────────────────────────
// Local State
// ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_toggle_menu_stays_local() {
    let (mut engine, mut host, mut events) = mounted_engine(&Settings::default());
    assert!(engine.snapshot().menu_expanded);

    engine.process_message(Message::ToggleMenu);

    assert!(!engine.snapshot().menu_expanded);
    assert!(host.drain().is_empty());
    assert_eq!(drain_events(&mut events).len(), 1);
}

#[tokio::test]
async fn test_no_python_flow_starts_collapsed() {
    let mut settings = Settings::default();
    settings.view.flow = ViewFlow::NoPython;

    let (engine, _host, _events) = mounted_engine(&settings);

    assert!(!engine.snapshot().menu_expanded);
}

#[tokio::test]
async fn test_out_of_range_tab_is_ignored() {
    let (mut engine, _host, mut events) = mounted_engine(&Settings::default());
    engine.process_message(Message::SelectTab(2));
    drain_events(&mut events);

    engine.process_message(Message::SelectTab(4));
    engine.process_message(Message::SelectTab(usize::MAX));

    assert_eq!(engine.snapshot().active_tab, 2);
    assert!(drain_events(&mut events).is_empty());
}

#[tokio::test]
async fn test_configured_tab_count_bounds_selection() {
    let mut settings = Settings::default();
    settings.view.tab_count = 2;
    let (mut engine, _host, _events) = mounted_engine(&settings);

    engine.process_message(Message::SelectTab(1));
    engine.process_message(Message::SelectTab(2));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.tab_count, 2);
    assert_eq!(snapshot.active_tab, 1);
}

// ─────────────────────────────────────────────────────────
// Host Commands
// ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_each_command_sends_exactly_one_message() {
    let (mut engine, mut host, mut events) = mounted_engine(&Settings::default());
    let before = engine.snapshot();

    for command in HostCommand::ALL {
        engine.process_message(Message::Command(command));

        let sent = host.drain();
        assert_eq!(sent.len(), 1, "{:?}", command);
        assert_eq!(
            sent[0],
            format!(r#"{{"kind":"{}"}}"#, command.kind().as_str())
        );
    }

    assert_eq!(engine.snapshot(), before);
    assert!(drain_events(&mut events).is_empty());
}

// ─────────────────────────────────────────────────────────
// Rejected Input
// ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_kind_pushed_over_tcp_is_dropped() {
    let (host, addr) = MockHost::bind(false).await;
    let host = host.with_push(r#"{"kind":"NotARealKind","payload":{"x":1}}"#);
    let host_task = tokio::spawn(host.serve());

    let transport = Transport::connect_tcp(&addr).await.unwrap();
    let engine = Engine::new(&Settings::default(), transport);
    let mut events = engine.subscribe();
    let (input_tx, input_rx) = mpsc::channel(8);

    let script = async {
        let reason = timeout(TIMEOUT, async {
            loop {
                match events.recv().await {
                    Ok(EngineEvent::MessageDropped { reason }) => return reason,
                    Ok(_) => continue,
                    Err(e) => panic!("engine events ended early: {}", e),
                }
            }
        })
        .await
        .unwrap();
        input_tx.send(Message::Unmount).await.unwrap();
        reason
    };
    let ((), reason) = tokio::join!(engine.run(input_rx), script);

    assert_eq!(reason, DropReason::UnknownKind("NotARealKind".to_string()));
    timeout(TIMEOUT, host_task).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_bad_lines_leave_state_untouched() {
    let (mut engine, _host, mut events) = mounted_engine(&Settings::default());
    let before = engine.snapshot();

    for line in [
        "not json",
        r#"{"payload":true}"#,
        r#"{"kind":"SendSetting","payload":{"showAgainSetting":"yes"}}"#,
        r#"{"kind":"SendSetting"}"#,
    ] {
        engine.handle_transport_event(TransportEvent::Line(line.to_string()));
    }

    assert_eq!(engine.snapshot(), before);
    let events = drain_events(&mut events);
    assert_eq!(events.len(), 4);
    assert!(events
        .iter()
        .all(|event| matches!(event, EngineEvent::MessageDropped { .. })));
}

// ─────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_host_close_ends_run() {
    let (transport, host) = Transport::in_memory();
    let engine = Engine::new(&Settings::default(), transport);
    let mut events = engine.subscribe();
    let (_input_tx, input_rx) = mpsc::channel(8);

    host.close().await.unwrap();
    timeout(TIMEOUT, engine.run(input_rx)).await.unwrap();

    let events = drain_events(&mut events);
    assert_eq!(events.first().map(EngineEvent::event_type), Some("mounted"));
    assert_eq!(events.last(), Some(&EngineEvent::Shutdown));
}

#[tokio::test]
async fn test_messages_after_unmount_are_ignored() {
    let (mut engine, mut host, _events) = mounted_engine(&Settings::default());

    engine.process_message(Message::Unmount);
    engine.handle_transport_event(TransportEvent::Line(send_setting_line(true)));
    engine.process_message(Message::Command(HostCommand::OpenFolder));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, ViewPhase::Unmounted);
    assert!(!snapshot.show_again_setting);
    assert!(host.drain().is_empty());
}
