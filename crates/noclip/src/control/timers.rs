/// Cooperative delayed actions, drained from the owning session's tick.
///
/// Each action kind has its own generation counter. Scheduling an action again
/// supersedes every earlier entry of the same kind: those entries are still
/// drained when due but are reported as stale and never returned as fired.
#[derive(Debug, Clone)]
pub(crate) struct TimerQueue<A> {
    entries: Vec<TimerEntry<A>>,
    generations: Vec<(A, u64)>,
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry<A> {
    fire_at: f64,
    action: A,
    generation: u64,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
        }
    }
}

impl<A: Copy + PartialEq> TimerQueue<A> {
    pub(crate) fn schedule(&mut self, action: A, fire_at: f64) {
        let generation = self.bump_generation(action);
        self.entries.push(TimerEntry {
            fire_at,
            action,
            generation,
        });
    }

    /// Removes every entry due at `now` and appends the still-current ones to
    /// `fired` in firing order.
    pub(crate) fn drain_due_into(&mut self, now: f64, fired: &mut Vec<A>) {
        if self.entries.iter().all(|entry| entry.fire_at > now) {
            return;
        }

        let mut due = Vec::new();
        self.entries.retain(|entry| {
            if entry.fire_at <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at));

        for entry in due {
            if self.current_generation(entry.action) == Some(entry.generation) {
                fired.push(entry.action);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.entries.len()
    }

    fn bump_generation(&mut self, action: A) -> u64 {
        if let Some((_, generation)) = self
            .generations
            .iter_mut()
            .find(|(known, _)| *known == action)
        {
            *generation = generation.saturating_add(1);
            return *generation;
        }
        self.generations.push((action, 0));
        0
    }

    fn current_generation(&self, action: A) -> Option<u64> {
        self.generations
            .iter()
            .find(|(known, _)| *known == action)
            .map(|(_, generation)| *generation)
    }
}
