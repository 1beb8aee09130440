//! Show-again setting synchronization tests
//!
//! Handshake, host pushes and user toggles, end to end.

use tokio::sync::mpsc;
use tokio::time::timeout;

use startpage_app::config::Settings;
use startpage_app::{Engine, EngineEvent, Message};
use startpage_channel::test_utils::{id_of, kinds_of, send_setting_line, send_setting_line_with_id};
use startpage_channel::Transport;
use startpage_core::TransportEvent;

use super::mock_host::MockHost;
use crate::{drain_events, mounted_engine, wait_for_state, TIMEOUT};

// ─────────────────────────────────────────────────────────
// Over TCP
// ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_mount_handshake_over_tcp() {
    let (host, addr) = MockHost::bind(true).await;
    let host_task = tokio::spawn(host.serve());

    let transport = Transport::connect_tcp(&addr).await.unwrap();
    let engine = Engine::new(&Settings::default(), transport);
    let mut events = engine.subscribe();
    let (input_tx, input_rx) = mpsc::channel(8);

    let script = async {
        let snapshot = wait_for_state(&mut events, |s| s.setting_confirmed).await;
        input_tx.send(Message::Unmount).await.unwrap();
        snapshot
    };
    let ((), snapshot) = tokio::join!(engine.run(input_rx), script);

    assert!(snapshot.show_again_setting);
    assert!(!snapshot.checkbox_checked);

    let log = timeout(TIMEOUT, host_task).await.unwrap().unwrap();
    assert_eq!(log.kinds(), vec!["started", "RequestShowAgainSetting"]);
}

#[tokio::test]
async fn test_toggle_is_persisted_by_host() {
    let (host, addr) = MockHost::bind(true).await;
    let host_task = tokio::spawn(host.serve());

    let transport = Transport::connect_tcp(&addr).await.unwrap();
    let engine = Engine::new(&Settings::default(), transport);
    let mut events = engine.subscribe();
    let (input_tx, input_rx) = mpsc::channel(8);

    let script = async {
        wait_for_state(&mut events, |s| s.setting_confirmed).await;
        input_tx.send(Message::ToggleShowAgain).await.unwrap();
        let toggled = wait_for_state(&mut events, |s| !s.show_again_setting).await;
        input_tx.send(Message::Unmount).await.unwrap();
        toggled
    };
    let ((), toggled) = tokio::join!(engine.run(input_rx), script);

    assert!(toggled.checkbox_checked);
    assert!(!toggled.setting_confirmed);

    let log = timeout(TIMEOUT, host_task).await.unwrap().unwrap();
    assert_eq!(
        log.kinds(),
        vec!["started", "RequestShowAgainSetting", "update_settings"]
    );
    assert!(!log.show_again);
}

#[tokio::test]
async fn test_toggle_twice_restores_host_value() {
    let (host, addr) = MockHost::bind(false).await;
    let host_task = tokio::spawn(host.serve());

    let transport = Transport::connect_tcp(&addr).await.unwrap();
    let engine = Engine::new(&Settings::default(), transport);
    let mut events = engine.subscribe();
    let (input_tx, input_rx) = mpsc::channel(8);

    let script = async {
        wait_for_state(&mut events, |s| s.setting_confirmed).await;
        input_tx.send(Message::ToggleShowAgain).await.unwrap();
        input_tx.send(Message::ToggleShowAgain).await.unwrap();
        input_tx.send(Message::Unmount).await.unwrap();
    };
    tokio::join!(engine.run(input_rx), script);

    let log = timeout(TIMEOUT, host_task).await.unwrap().unwrap();
    let updates: Vec<&String> = log
        .received
        .iter()
        .filter(|line| line.contains("update_settings"))
        .collect();
    assert_eq!(
        updates,
        vec![
            r#"{"kind":"update_settings","payload":true}"#,
            r#"{"kind":"update_settings","payload":false}"#,
        ]
    );
    assert!(!log.show_again);
}

#[tokio::test]
async fn test_correlated_handshake_echoes_id() {
    let (host, addr) = MockHost::bind(true).await;
    let host_task = tokio::spawn(host.serve());

    let mut settings = Settings::default();
    settings.protocol.correlate_requests = true;
    let transport = Transport::connect_tcp(&addr).await.unwrap();
    let engine = Engine::new(&settings, transport);
    let mut events = engine.subscribe();
    let (input_tx, input_rx) = mpsc::channel(8);

    let script = async {
        let snapshot = wait_for_state(&mut events, |s| s.setting_confirmed).await;
        input_tx.send(Message::Unmount).await.unwrap();
        snapshot
    };
    let ((), snapshot) = tokio::join!(engine.run(input_rx), script);

    assert!(snapshot.show_again_setting);

    let log = timeout(TIMEOUT, host_task).await.unwrap().unwrap();
    assert_eq!(id_of(&log.received[0]), None);
    assert!(id_of(&log.received[1]).is_some());
}

// ─────────────────────────────────────────────────────────
// In memory
// ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_last_host_push_wins() {
    let (mut engine, _host, _events) = mounted_engine(&Settings::default());

    for value in [true, true, false, true, false] {
        engine.handle_transport_event(TransportEvent::Line(send_setting_line(value)));
    }

    let snapshot = engine.snapshot();
    assert!(!snapshot.show_again_setting);
    assert!(snapshot.checkbox_checked);
}

#[tokio::test]
async fn test_repeated_push_changes_state_once() {
    let (mut engine, _host, mut events) = mounted_engine(&Settings::default());

    engine.handle_transport_event(TransportEvent::Line(send_setting_line(true)));
    let once = engine.snapshot();
    engine.handle_transport_event(TransportEvent::Line(send_setting_line(true)));

    assert_eq!(engine.snapshot(), once);
    let changes = drain_events(&mut events)
        .into_iter()
        .filter(|event| matches!(event, EngineEvent::StateChanged(_)))
        .count();
    assert_eq!(changes, 1);
}

#[tokio::test]
async fn test_host_push_overrides_unconfirmed_toggle() {
    let (mut engine, mut host, _events) = mounted_engine(&Settings::default());
    engine.handle_transport_event(TransportEvent::Line(send_setting_line(false)));

    engine.process_message(Message::ToggleShowAgain);
    assert!(engine.snapshot().show_again_setting);
    assert_eq!(kinds_of(&host.drain()), vec!["update_settings"]);

    engine.handle_transport_event(TransportEvent::Line(send_setting_line(false)));

    let snapshot = engine.snapshot();
    assert!(!snapshot.show_again_setting);
    assert!(snapshot.setting_confirmed);
}

#[tokio::test]
async fn test_superseded_answer_is_ignored() {
    let mut settings = Settings::default();
    settings.protocol.correlate_requests = true;
    let (transport, mut host) = Transport::in_memory();
    let mut engine = Engine::new(&settings, transport);

    engine.mount();
    let mount_lines = host.drain();
    assert_eq!(kinds_of(&mount_lines), vec!["started", "RequestShowAgainSetting"]);
    let first = id_of(&mount_lines[1]).unwrap();

    engine.process_message(Message::RequestSetting);
    let second = id_of(&host.drain()[0]).unwrap();
    assert_ne!(first, second);

    engine.handle_transport_event(TransportEvent::Line(send_setting_line_with_id(true, first)));
    assert!(!engine.snapshot().setting_confirmed);

    engine.handle_transport_event(TransportEvent::Line(send_setting_line_with_id(false, second)));
    let snapshot = engine.snapshot();
    assert!(snapshot.setting_confirmed);
    assert!(!snapshot.show_again_setting);
}
