
use chill_pulse::gui::{DashboardApp, LOAD_FAILED_MESSAGE};
use chill_pulse::host::{
    DesktopNotifier, HostBridge, HostEvent, HostLink, HostService, PlatformApi, StaticClipboard,
};
use chill_pulse::settings::SettingsDocument;
use chill_pulse::store::{JsonFileStore, MemoryStore};
use chill_pulse::sync::{LoadOutcome, SettingsSync, SyncState};
use harness::harness;
use serde_json::json;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn wait_event(sync: &SettingsSync) -> Option<HostEvent> {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(event) = sync.next_event() {
            return Some(event);
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    None
}

fn doc_with_background(name: &str) -> SettingsDocument {
    let mut doc = SettingsDocument::default();
    doc.background_file = name.into();
    doc
}

#[test]
fn broadcast_replaces_local_edits() {
    let mut h = harness(Some(doc_with_background("a.mp4")));
    h.dashboard.start();
    let mut older = h.dashboard.document().clone();
    older.weather.location = "Oslo".into();

    h.dashboard
        .save_settings_with(|d| d.welcome_message = "edited locally".into());
    assert_eq!(h.dashboard.sync_state(), SyncState::Saving);

    h.link.push_event(HostEvent::SettingsUpdated(older.clone()));
    let notices = h.dashboard.process_host_events();

    assert!(notices.is_empty());
    assert_eq!(h.dashboard.document(), &older);
    assert_eq!(
        h.dashboard.appearance().welcome_message,
        SettingsDocument::default().welcome_message
    );
    // The broadcast came from elsewhere; this window's own save is still out.
    assert_eq!(h.dashboard.sync_state(), SyncState::Saving);

    let own = h.link.saves()[0].clone();
    h.link.push_event(HostEvent::SettingsUpdated(own));
    h.dashboard.process_host_events();
    assert_eq!(h.dashboard.sync_state(), SyncState::Synced);
    assert_eq!(h.dashboard.appearance().welcome_message, "edited locally");
}

#[test]
fn notifications_are_returned_for_display() {
    let mut h = harness(Some(doc_with_background("a.mp4")));
    h.dashboard.start();
    h.link.push_event(HostEvent::Notification {
        title: "Break Complete!".into(),
        body: "Time to work!".into(),
    });
    let notices = h.dashboard.process_host_events();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Break Complete!");
}

#[test]
fn unknown_background_falls_back_without_saving() {
    let mut h = harness(Some(doc_with_background("nonexistent.mp4")));
    h.dashboard.start();

    assert_eq!(h.dashboard.document().background_file, "a.mp4");
    let applied = h.dashboard.appearance().background.as_ref().unwrap();
    assert_eq!(applied.entry.name, "a.mp4");
    assert!(h.link.saves().is_empty());
}

#[test]
fn empty_background_means_none() {
    let mut h = harness(Some(doc_with_background("")));
    h.dashboard.start();
    assert!(h.dashboard.appearance().background.is_none());
    assert_eq!(h.dashboard.document().background_file, "");
}

#[test]
fn load_failure_falls_back_to_defaults_and_alerts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();
    let host = HostService::new(
        Box::new(JsonFileStore::new(&path)),
        Box::new(StaticClipboard(None)),
        Box::new(DesktopNotifier),
    )
    .spawn()
    .unwrap();

    let mut sync = SettingsSync::new(Box::new(host.connect().unwrap()));
    assert!(matches!(sync.initialize(), LoadOutcome::FellBack { .. }));
    assert_eq!(sync.document(), &SettingsDocument::default());

    let h = harness(None);
    let app = DashboardApp::new(h.dashboard, false);
    assert!(app.alert().is_open());
    assert_eq!(app.alert().message(), LOAD_FAILED_MESSAGE);
    host.shutdown();
}

#[test]
fn saves_are_broadcast_to_every_window() {
    let host = HostService::new(
        Box::new(MemoryStore::new()),
        Box::new(StaticClipboard(Some("clip".into()))),
        Box::new(DesktopNotifier),
    )
    .spawn()
    .unwrap();
    let mut first = SettingsSync::new(Box::new(host.connect().unwrap()));
    let mut second = SettingsSync::new(Box::new(host.connect().unwrap()));
    first.initialize();
    second.initialize();

    first.update_and_save(|d| d.welcome_message = "from the first window".into());

    for sync in [&mut first, &mut second] {
        match wait_event(sync) {
            Some(HostEvent::SettingsUpdated(doc)) => sync.receive_broadcast(doc),
            other => panic!("expected settings broadcast, got {other:?}"),
        }
        assert_eq!(sync.document().welcome_message, "from the first window");
    }
    assert_eq!(first.state(), SyncState::Synced);
    host.shutdown();
}

#[test]
fn saved_settings_survive_a_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("config.json");
    let spawn = || {
        HostService::new(
            Box::new(JsonFileStore::new(&path)),
            Box::new(StaticClipboard(None)),
            Box::new(DesktopNotifier),
        )
        .spawn()
        .unwrap()
    };

    let host = spawn();
    let bridge = host.connect().unwrap();
    let mut doc = SettingsDocument::from_stored(&json!({
        "activeWidgets": [{"id": "w1", "type": "todo", "config": {}}],
        "widgets": {"w1": {"todos": [{"text": "stretch", "completed": true}]}},
        "futureFlag": 3
    }));
    doc.weather.api_key = "k".into();
    bridge.save_settings(doc.clone()).unwrap();
    host.shutdown();

    let host = spawn();
    let bridge = host.connect().unwrap();
    assert_eq!(bridge.load_settings().unwrap(), doc);
    assert_eq!(bridge.load_todos().unwrap(), json!([]));
    host.shutdown();
}

#[test]
fn open_settings_form_follows_broadcasts() {
    let h = harness(Some(doc_with_background("a.mp4")));
    let link = h.link.clone();
    let mut app = DashboardApp::new(h.dashboard, false);
    app.open_settings();

    let mut newer = app.dashboard().document().clone();
    newer.weather.location = "Oslo".into();
    newer.background_file = "b.jpg".into();
    link.push_event(HostEvent::SettingsUpdated(newer));
    app.sync_from_host();

    let form = app.settings_panel().form().unwrap();
    assert_eq!(form.location, "Oslo");
    assert_eq!(form.background_file, "b.jpg");
}

#[test]
fn each_window_waits_for_its_own_save() {
    let host = HostService::new(
        Box::new(MemoryStore::new()),
        Box::new(StaticClipboard(None)),
        Box::new(DesktopNotifier),
    )
    .spawn()
    .unwrap();
    let mut first = SettingsSync::new(Box::new(host.connect().unwrap()));
    let mut second = SettingsSync::new(Box::new(host.connect().unwrap()));
    first.initialize();
    second.initialize();

    first.update_and_save(|d| d.welcome_message = "first".into());
    second.update_and_save(|d| d.welcome_message = "second".into());

    let deliver = |sync: &mut SettingsSync| match wait_event(sync) {
        Some(HostEvent::SettingsUpdated(doc)) => sync.receive_broadcast(doc),
        other => panic!("expected settings broadcast, got {other:?}"),
    };

    // Saves reach the host in order: "first" is broadcast before "second".
    deliver(&mut second);
    assert_eq!(second.state(), SyncState::Saving);
    deliver(&mut second);
    assert_eq!(second.state(), SyncState::Synced);

    deliver(&mut first);
    assert_eq!(first.state(), SyncState::Synced);
    deliver(&mut first);
    assert_eq!(first.state(), SyncState::Synced);
    assert_eq!(first.document().welcome_message, "second");
    host.shutdown();
}

fn next_from(bridge: &HostBridge) -> Option<HostEvent> {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(event) = bridge.next_event() {
            return Some(event);
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    None
}

#[test]
fn notifications_stay_in_the_window_that_raised_them() {
    let host = HostService::new(
        Box::new(MemoryStore::new()),
        Box::new(StaticClipboard(None)),
        Box::new(DesktopNotifier),
    )
    .spawn()
    .unwrap();
    let first = host.connect().unwrap();
    let second = host.connect().unwrap();

    first
        .platform()
        .show_notification("Pomodoro Complete!", "Start your short break.");
    assert_eq!(
        next_from(&first),
        Some(HostEvent::Notification {
            title: "Pomodoro Complete!".into(),
            body: "Start your short break.".into(),
        })
    );

    // Requests are handled in order, so a leaked notice would arrive first.
    second.save_settings(SettingsDocument::default()).unwrap();
    assert_eq!(
        next_from(&second),
        Some(HostEvent::SettingsUpdated(SettingsDocument::default()))
    );
    host.shutdown();
}
