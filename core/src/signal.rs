//! Phase-mark signals and their synchronous subscriber hub.
//!
//! Handlers run inline during [`SignalHub::emit`], in registration order,
//! before the emitting tick returns. Subscribers that need to go away must
//! unsubscribe explicitly with the [`Subscription`] they got back.

use std::fmt;

/// One-shot signals raised by the phase timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseSignal {
    /// The first phase mark was reached.
    FirstMark,
    /// The second phase mark was reached; the timer has stopped.
    SecondMark,
}

impl fmt::Display for PhaseSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseSignal::FirstMark => write!(f, "first mark"),
            PhaseSignal::SecondMark => write!(f, "second mark"),
        }
    }
}

/// Token identifying a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Handler = Box<dyn FnMut(PhaseSignal) + Send + Sync>;

/// Registry of signal handlers owned by the phase timer.
#[derive(Default)]
pub struct SignalHub {
    handlers: Vec<(Subscription, Handler)>,
    next_id: u64,
}

impl SignalHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        handler: impl FnMut(PhaseSignal) + Send + Sync + 'static,
    ) -> Subscription {
        let subscription = Subscription(self.next_id);
        self.next_id += 1;
        self.handlers.push((subscription, Box::new(handler)));
        subscription
    }

    /// Returns `false` when the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(id, _)| *id != subscription);
        self.handlers.len() != before
    }

    /// Invoke every handler with `signal`, in registration order.
    pub fn emit(&mut self, signal: PhaseSignal) {
        for (_, handler) in self.handlers.iter_mut() {
            handler(signal);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_emit_invokes_subscribers_in_order() {
        let (tx, rx) = mpsc::channel();
        let mut hub = SignalHub::new();

        let first = tx.clone();
        hub.subscribe(move |signal| first.send((1, signal)).unwrap());
        let second = tx;
        hub.subscribe(move |signal| second.send((2, signal)).unwrap());

        hub.emit(PhaseSignal::FirstMark);

        assert_eq!(rx.try_recv().unwrap(), (1, PhaseSignal::FirstMark));
        assert_eq!(rx.try_recv().unwrap(), (2, PhaseSignal::FirstMark));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let (tx, rx) = mpsc::channel();
        let mut hub = SignalHub::new();
        let subscription = hub.subscribe(move |signal| tx.send(signal).unwrap());

        assert!(hub.unsubscribe(subscription));
        hub.emit(PhaseSignal::SecondMark);

        assert!(rx.try_recv().is_err());
        assert_eq!(hub.subscriber_count(), 0);
        // a second unsubscribe is a no-op
        assert!(!hub.unsubscribe(subscription));
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let mut hub = SignalHub::new();
        hub.emit(PhaseSignal::FirstMark);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
