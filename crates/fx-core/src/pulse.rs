//! Self-expiring perturbations of a single effect parameter.
//!
//! A channel captures the field's baseline when its first pulse begins and
//! keeps a stack of the pulses still in flight. The field always shows the
//! newest live pulse applied to that baseline, and lands back on the exact
//! baseline once the stack empties. Overlapping pulses therefore cannot
//! restore each other to a stale value.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PulseId(pub(crate) u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Perturbation {
    /// Replace the value outright.
    Set(f32),
    /// Add `by`, never exceeding `ceiling`.
    Raise { by: f32, ceiling: f32 },
    /// Multiply the baseline.
    Scale(f32),
}

impl Perturbation {
    #[inline]
    pub fn apply(self, baseline: f32) -> f32 {
        match self {
            Perturbation::Set(v) => v,
            Perturbation::Raise { by, ceiling } => (baseline + by).min(ceiling),
            Perturbation::Scale(k) => baseline * k,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PulseChannel {
    baseline: f32,
    anchor: Option<f32>,
    active: Vec<(PulseId, Perturbation)>,
}

impl PulseChannel {
    /// Channel whose rest value is always `rest`, whatever the field held
    /// when the first pulse began.
    pub fn anchored(rest: f32) -> Self {
        Self {
            baseline: rest,
            anchor: Some(rest),
            active: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Baseline the field returns to, if any pulse is in flight.
    pub fn baseline(&self) -> Option<f32> {
        self.is_active().then_some(self.baseline)
    }

    /// Start a pulse; returns the value the field should now hold.
    pub fn begin(&mut self, id: PulseId, current: f32, perturbation: Perturbation) -> f32 {
        if self.active.is_empty() {
            self.baseline = self.anchor.unwrap_or(current);
        }
        self.active.push((id, perturbation));
        perturbation.apply(self.baseline)
    }

    /// End a pulse. Returns the value the field should now hold, or `None`
    /// when the id is unknown (already ended or cleared).
    pub fn end(&mut self, id: PulseId) -> Option<f32> {
        let idx = self.active.iter().position(|(pid, _)| *pid == id)?;
        self.active.remove(idx);
        Some(self.current())
    }

    /// Replace the baseline from an external settings update. Returns the
    /// value the field should now hold.
    pub fn rebase(&mut self, baseline: f32) -> f32 {
        self.baseline = baseline;
        self.current()
    }

    /// Drop every pulse; returns the baseline to restore if any were live.
    pub fn clear(&mut self) -> Option<f32> {
        let live = self.baseline();
        self.active.clear();
        live
    }

    fn current(&self) -> f32 {
        match self.active.last() {
            Some((_, p)) => p.apply(self.baseline),
            None => self.baseline,
        }
    }
}
