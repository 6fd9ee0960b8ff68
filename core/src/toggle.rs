//! Deferred toggle side-effect runs.
//!
//! A phase mark kicks off a run over every registered handle: the first
//! handle flips immediately, each following flip waits a fixed real-time
//! pause. The run makes progress whenever the owner reports elapsed time, so
//! flips keep draining even after the phase timer itself has stopped.

use crate::constants::FLIP_SPACING_SECS;

/// Something whose on/off state a phase mark can flip.
pub trait ToggleHandle: Send + Sync {
    fn is_on(&self) -> bool;
    fn set_on(&mut self, on: bool);

    fn flip(&mut self) {
        let next = !self.is_on();
        self.set_on(next);
    }
}

/// Toggle that tracks its own state and logs flips under a name.
///
/// The daemon registers one of these per configured scene object.
pub struct NamedToggle {
    name: String,
    on: bool,
}

impl NamedToggle {
    pub fn new(name: impl Into<String>, initially_on: bool) -> Self {
        Self {
            name: name.into(),
            on: initially_on,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ToggleHandle for NamedToggle {
    fn is_on(&self) -> bool {
        self.on
    }

    fn set_on(&mut self, on: bool) {
        self.on = on;
        log::info!(
            "toggle '{}' switched {}",
            self.name,
            if on { "on" } else { "off" }
        );
    }
}

struct ActiveRun {
    next_index: usize,
    wait_secs: f64,
}

/// Ordered set of toggle handles plus the state of the current run.
///
/// Overlapping [`begin`](Self::begin) calls queue up and execute one run
/// after another; flips within and across runs stay one pause apart.
pub struct ToggleSequence {
    handles: Vec<Box<dyn ToggleHandle>>,
    run: Option<ActiveRun>,
    queued_runs: u32,
    spacing_secs: f64,
}

impl ToggleSequence {
    pub fn new(handles: Vec<Box<dyn ToggleHandle>>) -> Self {
        Self {
            handles,
            run: None,
            queued_runs: 0,
            spacing_secs: FLIP_SPACING_SECS,
        }
    }

    /// Sequence with no handles; runs complete immediately.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    /// True when no run is active or queued.
    pub fn is_idle(&self) -> bool {
        self.run.is_none() && self.queued_runs == 0
    }

    /// Current on/off state of every handle, in registration order.
    pub fn states(&self) -> Vec<bool> {
        self.handles.iter().map(|h| h.is_on()).collect()
    }

    /// Start a run: flip the first handle now, space out the rest.
    ///
    /// With no handles this completes immediately. While a run is active
    /// another request queues up and starts one pause after the active run
    /// finishes.
    pub fn begin(&mut self) {
        if self.handles.is_empty() {
            log::debug!("toggle run requested with no handles registered");
            return;
        }
        if self.run.is_some() {
            self.queued_runs += 1;
            log::debug!(
                "toggle run already active; queued another ({} pending)",
                self.queued_runs
            );
            return;
        }
        self.flip_at(0);
        if self.handles.len() > 1 {
            self.run = Some(ActiveRun {
                next_index: 1,
                wait_secs: self.spacing_secs,
            });
        }
    }

    /// Drain every flip that `delta_secs` of elapsed time makes due.
    pub fn advance(&mut self, delta_secs: f64) {
        if !(delta_secs > 0.0) || !delta_secs.is_finite() {
            return;
        }
        let mut remaining = delta_secs;
        loop {
            let Some(run) = self.run.as_mut() else { return };
            if run.wait_secs > remaining {
                run.wait_secs -= remaining;
                return;
            }
            remaining -= run.wait_secs;
            let index = run.next_index;
            self.run = None;
            self.flip_at(index);
            if index + 1 < self.handles.len() {
                self.run = Some(ActiveRun {
                    next_index: index + 1,
                    wait_secs: self.spacing_secs,
                });
            } else if self.queued_runs > 0 {
                self.queued_runs -= 1;
                self.run = Some(ActiveRun {
                    next_index: 0,
                    wait_secs: self.spacing_secs,
                });
            }
        }
    }

    fn flip_at(&mut self, index: usize) {
        if let Some(handle) = self.handles.get_mut(index) {
            handle.flip();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct TestToggle {
        id: usize,
        on: bool,
        flips: Arc<Mutex<Vec<usize>>>,
    }

    impl ToggleHandle for TestToggle {
        fn is_on(&self) -> bool {
            self.on
        }

        fn set_on(&mut self, on: bool) {
            self.on = on;
            self.flips.lock().push(self.id);
        }
    }

    fn sequence(count: usize) -> (ToggleSequence, Arc<Mutex<Vec<usize>>>) {
        let flips = Arc::new(Mutex::new(Vec::new()));
        let handles = (0..count)
            .map(|id| {
                Box::new(TestToggle {
                    id,
                    on: false,
                    flips: Arc::clone(&flips),
                }) as Box<dyn ToggleHandle>
            })
            .collect();
        (ToggleSequence::new(handles), flips)
    }

    #[test]
    fn test_begin_flips_first_handle_immediately() {
        let (mut seq, flips) = sequence(3);
        seq.begin();
        assert_eq!(*flips.lock(), vec![0]);
        assert_eq!(seq.states(), vec![true, false, false]);
    }

    #[test]
    fn test_flips_are_spaced_by_pause() {
        let (mut seq, flips) = sequence(2);
        seq.begin();
        seq.advance(0.4);
        assert_eq!(*flips.lock(), vec![0]);
        seq.advance(0.1);
        assert_eq!(*flips.lock(), vec![0, 1]);
        assert!(seq.is_idle());
    }

    #[test]
    fn test_large_advance_drains_every_due_flip() {
        let (mut seq, flips) = sequence(4);
        seq.begin();
        seq.advance(10.0);
        assert_eq!(*flips.lock(), vec![0, 1, 2, 3]);
        assert!(seq.is_idle());
    }

    #[test]
    fn test_empty_sequence_completes_immediately() {
        let mut seq = ToggleSequence::empty();
        seq.begin();
        seq.advance(1.0);
        assert!(seq.is_idle());
        assert_eq!(seq.handle_count(), 0);
    }

    #[test]
    fn test_overlapping_begin_queues_serialized_run() {
        let (mut seq, flips) = sequence(2);
        seq.begin();
        seq.advance(0.25);
        seq.begin();
        assert!(!seq.is_idle());

        // first run finishes, second starts one pause later
        seq.advance(0.25);
        assert_eq!(*flips.lock(), vec![0, 1]);
        seq.advance(0.5);
        assert_eq!(*flips.lock(), vec![0, 1, 0]);
        seq.advance(0.5);
        assert_eq!(*flips.lock(), vec![0, 1, 0, 1]);
        assert!(seq.is_idle());
    }

    #[test]
    fn test_flip_inverts_state_each_run() {
        let (mut seq, _) = sequence(1);
        seq.begin();
        assert_eq!(seq.states(), vec![true]);
        seq.begin();
        assert_eq!(seq.states(), vec![false]);
    }

    #[test]
    fn test_single_handle_run_is_immediately_idle() {
        let (mut seq, flips) = sequence(1);
        seq.begin();
        assert!(seq.is_idle());
        assert_eq!(*flips.lock(), vec![0]);
    }
}
