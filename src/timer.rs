/// One of the three phases of the pomodoro cycle. Every phase has its
/// own configured duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::ShortBreak => "Short break",
            Phase::LongBreak => "Long break",
        }
    }
}

/// The number of seconds assigned to each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDurations {
    pub focus: u64,
    pub short_break: u64,
    pub long_break: u64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        PhaseDurations {
            focus: 25 * 60,
            short_break: 5 * 60,
            long_break: 15 * 60,
        }
    }
}

impl PhaseDurations {
    pub fn get(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus,
            Phase::ShortBreak => self.short_break,
            Phase::LongBreak => self.long_break,
        }
    }

    pub fn set(&mut self, phase: Phase, seconds: u64) {
        match phase {
            Phase::Focus => self.focus = seconds,
            Phase::ShortBreak => self.short_break = seconds,
            Phase::LongBreak => self.long_break = seconds,
        }
    }
}

/// A phase that was just run down to zero, and the phase lined up
/// after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseEnd {
    pub finished: Phase,
    pub next: Phase,
}

/// A single pomodoro session: the current phase, its countdown, and
/// the running tally of completed focus phases. Every fourth completed
/// focus phase leads into a long break, the others into a short one.
///
/// The timer never crosses a phase boundary on its own clock: when a
/// phase completes the next one is loaded but left stopped, so the
/// user decides when it starts.
#[derive(Debug)]
pub struct Timer {
    phase: Phase,
    remaining_seconds: u64,
    running: bool,
    completed_focus_count: u64,
    durations: PhaseDurations,
}

impl Timer {
    pub fn new(durations: PhaseDurations) -> Self {
        Timer {
            phase: Phase::Focus,
            remaining_seconds: durations.focus,
            running: false,
            completed_focus_count: 0,
            durations,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_focus_count(&self) -> u64 {
        self.completed_focus_count
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    /// Start the countdown. Does nothing if it is already running.
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stop the countdown and refill the current phase.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_seconds = self.durations.get(self.phase);
    }

    /// Jump to another phase. Valid at any time; a running session is
    /// interrupted without being credited.
    pub fn switch_phase(&mut self, target: Phase) {
        self.running = false;
        self.phase = target;
        self.remaining_seconds = self.durations.get(target);
    }

    /// Advance the countdown by one second. Returns the completed
    /// transition when this tick ran the phase down to zero, so the
    /// caller can raise the attention pulse.
    pub fn tick(&mut self) -> Option<PhaseEnd> {
        if !self.running {
            return None;
        }
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
        if self.remaining_seconds == 0 {
            Some(self.complete_phase())
        } else {
            None
        }
    }

    fn complete_phase(&mut self) -> PhaseEnd {
        let finished = self.phase;
        let next = match finished {
            Phase::Focus => {
                self.completed_focus_count += 1;
                if self.completed_focus_count % 4 == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        };
        self.phase = next;
        self.remaining_seconds = self.durations.get(next);
        self.running = false;
        PhaseEnd { finished, next }
    }

    /// Change the duration of a phase. Editing the current phase while
    /// idle refills the countdown with the new value; while running the
    /// countdown is only clamped so it never exceeds the new duration.
    pub fn set_duration(&mut self, phase: Phase, seconds: u64) {
        self.durations.set(phase, seconds);
        if phase == self.phase {
            if !self.running {
                self.remaining_seconds = seconds;
            } else if self.remaining_seconds > seconds {
                self.remaining_seconds = seconds;
            }
        }
    }

    /// How far into the current phase we are, from 0.0 (full) to 1.0
    /// (done). A zero-length phase reports 0.0.
    pub fn progress(&self) -> f64 {
        let duration = self.durations.get(self.phase);
        if duration == 0 {
            return 0.0;
        }
        (duration - self.remaining_seconds) as f64 / duration as f64
    }
}

/// Render a number of seconds as a zero-padded MM:SS clock. Minutes
/// are not clamped, so an hour and a quarter shows as 75:00.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
