
use chill_pulse::dashboard::widgets::{
    PomodoroEvent, PomodoroInput, PomodoroPhase, PomodoroTimer, WidgetInput,
};
use chill_pulse::settings::SettingsDocument;
use harness::harness;
use std::time::{Duration, Instant};

fn finish_session(timer: &mut PomodoroTimer) -> Option<PomodoroEvent> {
    let mut event = None;
    while event.is_none() && timer.is_running() {
        event = timer.tick_second();
    }
    event
}

#[test]
fn fourth_work_session_leads_to_long_break() {
    let mut timer = PomodoroTimer::new();
    for _ in 0..3 {
        timer.start();
        assert_eq!(
            finish_session(&mut timer),
            Some(PomodoroEvent::WorkComplete {
                long_break_next: false
            })
        );
        assert_eq!(timer.phase(), PomodoroPhase::ShortBreak);
        assert_eq!(finish_session(&mut timer), Some(PomodoroEvent::BreakComplete));
    }
    assert_eq!(timer.completed_cycles(), 3);

    timer.start();
    let event = finish_session(&mut timer);

    assert_eq!(
        event,
        Some(PomodoroEvent::WorkComplete {
            long_break_next: true
        })
    );
    assert_eq!(timer.completed_cycles(), 4);
    assert_eq!(timer.phase(), PomodoroPhase::LongBreak);
    assert_eq!(timer.time_left(), 15 * 60);
    assert!(timer.is_running());
    assert_eq!(timer.status(), "Long Break");
}

#[test]
fn widget_notifies_through_the_platform() {
    let mut h = harness(Some(SettingsDocument::default()));
    h.dashboard.start();
    let id = h
        .dashboard
        .add_widget("pomodoro", None)
        .map(|w| w.id().clone())
        .unwrap();
    assert_eq!(
        h.dashboard.text_content(&id),
        Some(vec!["25:00".to_string(), "Ready".to_string()])
    );

    for cycle in 0..4 {
        let t = Instant::now();
        h.dashboard
            .dispatch(&id, WidgetInput::Pomodoro(PomodoroInput::Start));
        h.dashboard.tick(t + Duration::from_secs(25 * 60 + 1));
        if cycle < 3 {
            h.dashboard.tick(t + Duration::from_secs(30 * 60 + 1));
            assert_eq!(
                h.dashboard.text_content(&id),
                Some(vec!["25:00".to_string(), "Ready".to_string()])
            );
        }
    }

    let notes = h.platform.notifications();
    assert_eq!(notes.len(), 7);
    assert_eq!(
        notes[0],
        ("Pomodoro Complete!".to_string(), "Start your short break.".to_string())
    );
    assert_eq!(
        notes[1],
        ("Break Complete!".to_string(), "Time to work!".to_string())
    );
    assert_eq!(
        notes[6],
        ("Pomodoro Complete!".to_string(), "Start your long break.".to_string())
    );
    assert_eq!(
        h.dashboard.text_content(&id),
        Some(vec!["15:00".to_string(), "Long Break".to_string()])
    );
}

#[test]
fn pause_stops_the_countdown() {
    let mut h = harness(Some(SettingsDocument::default()));
    h.dashboard.start();
    let id = h
        .dashboard
        .add_widget("pomodoro", None)
        .map(|w| w.id().clone())
        .unwrap();

    h.dashboard
        .dispatch(&id, WidgetInput::Pomodoro(PomodoroInput::Start));
    h.dashboard
        .dispatch(&id, WidgetInput::Pomodoro(PomodoroInput::Pause));
    h.dashboard.tick(Instant::now() + Duration::from_secs(600));

    assert_eq!(
        h.dashboard.text_content(&id),
        Some(vec!["25:00".to_string(), "Paused Work".to_string()])
    );

    h.dashboard
        .dispatch(&id, WidgetInput::Pomodoro(PomodoroInput::Reset));
    assert_eq!(
        h.dashboard.text_content(&id),
        Some(vec!["25:00".to_string(), "Ready".to_string()])
    );
    assert!(h.platform.notifications().is_empty());
}
