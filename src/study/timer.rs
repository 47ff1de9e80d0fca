use std::future::Future;
use std::time::Duration;

pub const PRESET_MINUTES: [u32; 3] = [25, 45, 60];
pub const DEFAULT_MINUTES: u32 = 25;

/// Pomodoro countdown. Local state only; nothing here is persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerOutcome {
    Finished,
    Stopped { remaining: u32 },
}

impl Countdown {
    pub fn from_minutes(minutes: u32) -> Self {
        Self::from_secs(minutes.saturating_mul(60))
    }

    pub fn from_secs(secs: u32) -> Self {
        Self { remaining: secs }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Advance one second. Returns false once the countdown has reached zero.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        !self.is_finished()
    }

    pub fn clock(&self) -> String {
        format_clock(self.remaining)
    }
}

pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Tick `countdown` every `period` until it finishes or `stop` resolves.
pub async fn run<S, F>(
    mut countdown: Countdown,
    period: Duration,
    stop: S,
    mut on_tick: F,
) -> TimerOutcome
where
    S: Future,
    F: FnMut(&Countdown),
{
    if countdown.is_finished() {
        return TimerOutcome::Finished;
    }
    let mut interval = tokio::time::interval(period);
    // The first tick of a tokio interval completes immediately.
    interval.tick().await;
    tokio::pin!(stop);
    loop {
        tokio::select! {
            _ = &mut stop => {
                return TimerOutcome::Stopped { remaining: countdown.remaining() };
            }
            _ = interval.tick() => {
                let running = countdown.tick();
                on_tick(&countdown);
                if !running {
                    return TimerOutcome::Finished;
                }
            }
        }
    }
}
