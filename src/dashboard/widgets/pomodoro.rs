use super::{PomodoroInput, WidgetContext, WidgetHandle, WidgetInput};
use crate::common::Ticker;
use crate::settings::SettingsDocument;
use eframe::egui;
use std::time::Duration;

const WORK_SECS: u32 = 25 * 60;
const SHORT_BREAK_SECS: u32 = 5 * 60;
const LONG_BREAK_SECS: u32 = 15 * 60;
const CYCLES_UNTIL_LONG_BREAK: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PomodoroPhase {
    Work,
    ShortBreak,
    LongBreak,
}

impl PomodoroPhase {
    pub fn duration_secs(&self) -> u32 {
        match self {
            PomodoroPhase::Work => WORK_SECS,
            PomodoroPhase::ShortBreak => SHORT_BREAK_SECS,
            PomodoroPhase::LongBreak => LONG_BREAK_SECS,
        }
    }
}

/// What happened when a countdown reached zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PomodoroEvent {
    WorkComplete { long_break_next: bool },
    BreakComplete,
}

impl PomodoroEvent {
    pub fn title(&self) -> &'static str {
        match self {
            PomodoroEvent::WorkComplete { .. } => "Pomodoro Complete!",
            PomodoroEvent::BreakComplete => "Break Complete!",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            PomodoroEvent::WorkComplete {
                long_break_next: true,
            } => "Start your long break.",
            PomodoroEvent::WorkComplete {
                long_break_next: false,
            } => "Start your short break.",
            PomodoroEvent::BreakComplete => "Time to work!",
        }
    }
}

/// Work/break cycle counted down one second at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomodoroTimer {
    phase: PomodoroPhase,
    time_left: u32,
    running: bool,
    paused: bool,
    completed_cycles: u32,
    reset_enabled: bool,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self {
            phase: PomodoroPhase::Work,
            time_left: WORK_SECS,
            running: false,
            paused: false,
            completed_cycles: 0,
            reset_enabled: false,
        }
    }
}

impl PomodoroTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PomodoroPhase {
        self.phase
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    pub fn can_start(&self) -> bool {
        !self.running
    }

    pub fn can_pause(&self) -> bool {
        self.running
    }

    pub fn can_reset(&self) -> bool {
        self.reset_enabled
    }

    /// Start or resume. Returns `false` if already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.paused = false;
        self.reset_enabled = true;
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.paused = true;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// One second elapsed. Returns the completion event when the countdown
    /// hits zero.
    pub fn tick_second(&mut self) -> Option<PomodoroEvent> {
        if !self.running {
            return None;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return None;
        }
        self.running = false;
        Some(self.finish())
    }

    fn finish(&mut self) -> PomodoroEvent {
        match self.phase {
            PomodoroPhase::Work => {
                let long_break_next =
                    self.completed_cycles % CYCLES_UNTIL_LONG_BREAK == CYCLES_UNTIL_LONG_BREAK - 1;
                self.completed_cycles += 1;
                self.phase = if self.completed_cycles % CYCLES_UNTIL_LONG_BREAK == 0 {
                    PomodoroPhase::LongBreak
                } else {
                    PomodoroPhase::ShortBreak
                };
                self.time_left = self.phase.duration_secs();
                self.start();
                PomodoroEvent::WorkComplete { long_break_next }
            }
            PomodoroPhase::ShortBreak | PomodoroPhase::LongBreak => {
                self.phase = PomodoroPhase::Work;
                self.time_left = WORK_SECS;
                self.paused = false;
                self.reset_enabled = true;
                PomodoroEvent::BreakComplete
            }
        }
    }

    pub fn status(&self) -> &'static str {
        match (self.running, self.paused, self.phase) {
            (true, _, PomodoroPhase::Work) => "Working",
            (true, _, PomodoroPhase::ShortBreak) => "Short Break",
            (true, _, PomodoroPhase::LongBreak) => "Long Break",
            (false, true, PomodoroPhase::Work) => "Paused Work",
            (false, true, _) => "Paused Break",
            (false, false, _) => "Ready",
        }
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.time_left / 60, self.time_left % 60)
    }
}

pub struct PomodoroWidget {
    timer: PomodoroTimer,
    ticker: Ticker,
}

impl PomodoroWidget {
    pub fn init(_ctx: &mut WidgetContext<'_>) -> Self {
        Self {
            timer: PomodoroTimer::new(),
            ticker: Ticker::stopped(Duration::from_secs(1)),
        }
    }

    fn apply(&mut self, input: PomodoroInput, ctx: &mut WidgetContext<'_>) {
        match input {
            PomodoroInput::Start => {
                if self.timer.start() {
                    self.ticker.restart(ctx.now());
                }
            }
            PomodoroInput::Pause => {
                if self.timer.pause() {
                    self.ticker.cancel();
                }
            }
            PomodoroInput::Reset => {
                self.timer.reset();
                self.ticker.cancel();
            }
        }
    }
}

impl WidgetHandle for PomodoroWidget {
    fn cleanup(&mut self) {
        self.ticker.cancel();
    }

    fn tick(&mut self, ctx: &mut WidgetContext<'_>) {
        for _ in 0..self.ticker.due_ticks(ctx.now()) {
            if let Some(event) = self.timer.tick_second() {
                tracing::info!(widget = %ctx.id(), ?event, "pomodoro session ended");
                ctx.platform().show_notification(event.title(), event.body());
            }
            if !self.timer.is_running() {
                self.ticker.cancel();
                break;
            }
        }
    }

    fn handle_input(&mut self, input: WidgetInput, ctx: &mut WidgetContext<'_>) {
        if let WidgetInput::Pomodoro(input) = input {
            self.apply(input, ctx);
        }
    }

    fn text_content(&self, _doc: &SettingsDocument) -> Vec<String> {
        vec![self.timer.display(), self.timer.status().to_string()]
    }

    fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut WidgetContext<'_>) {
        ui.label(egui::RichText::new(self.timer.display()).size(32.0).monospace());
        ui.label(self.timer.status());
        let mut input = None;
        ui.horizontal(|ui| {
            if ui.add_enabled(self.timer.can_start(), egui::Button::new("Start")).clicked() {
                input = Some(PomodoroInput::Start);
            }
            if ui.add_enabled(self.timer.can_pause(), egui::Button::new("Pause")).clicked() {
                input = Some(PomodoroInput::Pause);
            }
            if ui.add_enabled(self.timer.can_reset(), egui::Button::new("Reset")).clicked() {
                input = Some(PomodoroInput::Reset);
            }
        });
        if let Some(input) = input {
            self.apply(input, ctx);
        }
        if self.timer.is_running() {
            ui.ctx().request_repaint_after(Duration::from_millis(250));
        }
    }
}
