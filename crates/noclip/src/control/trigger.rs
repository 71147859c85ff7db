use tracing::debug;

use crate::config::TriggerMethod;

use super::timers::TimerQueue;

pub(crate) const QUINTUPLE_ACTIVATION_COUNT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TriggerTimer {
    DisablePriming,
    ResetActivationCount,
}

/// Turns activation edges into toggle requests according to the trigger method.
#[derive(Debug, Clone)]
pub(crate) struct TriggerMachine {
    method: TriggerMethod,
    threshold_seconds: f32,
    primed: bool,
    consecutive_count: u32,
    timers: TimerQueue<TriggerTimer>,
    fired_scratch: Vec<TriggerTimer>,
}

impl TriggerMachine {
    pub(crate) fn new(method: TriggerMethod, threshold_seconds: f32) -> Self {
        Self {
            method,
            threshold_seconds,
            primed: false,
            consecutive_count: 0,
            timers: TimerQueue::default(),
            fired_scratch: Vec::new(),
        }
    }

    pub(crate) fn method(&self) -> TriggerMethod {
        self.method
    }

    pub(crate) fn is_primed(&self) -> bool {
        self.primed
    }

    pub(crate) fn consecutive_count(&self) -> u32 {
        self.consecutive_count
    }

    /// Registers one rising edge at `now` and returns true when noclip should toggle.
    pub(crate) fn on_activation_edge(&mut self, now: f64) -> bool {
        let fire_at = now + f64::from(self.threshold_seconds);
        match self.method {
            TriggerMethod::DoubleActivation => {
                if self.primed {
                    self.primed = false;
                    return true;
                }
                self.primed = true;
                self.timers.schedule(TriggerTimer::DisablePriming, fire_at);
                false
            }
            TriggerMethod::QuintupleActivation => {
                self.consecutive_count = self.consecutive_count.saturating_add(1);
                self.timers
                    .schedule(TriggerTimer::ResetActivationCount, fire_at);
                if self.consecutive_count >= QUINTUPLE_ACTIVATION_COUNT {
                    self.consecutive_count = 0;
                    return true;
                }
                false
            }
        }
    }

    /// Fires every delayed action due at `now`.
    pub(crate) fn advance_to(&mut self, now: f64) {
        self.fired_scratch.clear();
        self.timers.drain_due_into(now, &mut self.fired_scratch);
        for timer in self.fired_scratch.drain(..) {
            match timer {
                TriggerTimer::DisablePriming => {
                    if self.primed {
                        debug!(now, "activation_priming_expired");
                    }
                    self.primed = false;
                }
                TriggerTimer::ResetActivationCount => {
                    if self.consecutive_count > 0 {
                        debug!(
                            now,
                            count = self.consecutive_count,
                            "activation_count_expired"
                        );
                    }
                    self.consecutive_count = 0;
                }
            }
        }
    }
}
