//! Observer hooks for tabulation runs.
//!
//! The tabulation core has no side effects of its own. Callers that want logging or metrics
//! attach a [`TabulationObserver`] to a [`crate::tabulation::TabulationEngine`]; the engine
//! reports each run's start, outcome and basic stats to it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Which engine operation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Cross-tabulation of a group attribute against outcome attributes.
    Tabulate,
    /// Single-attribute frequency table.
    Frequency,
}

/// Minimal stats reported when a run succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabulationStats {
    /// Number of records read.
    pub rows: usize,
    /// Number of distinct groups (rows of the output).
    pub groups: usize,
    /// Number of non-zero cells across all outcome tables.
    pub cells: usize,
}

impl fmt::Display for TabulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows={}, groups={}, cells={}",
            self.rows, self.groups, self.cells
        )
    }
}

/// Events emitted by the engine.
#[derive(Debug, Clone)]
pub enum TabulationEvent {
    Started {
        operation: Operation,
        attribute: String,
        rows: usize,
    },
    Finished {
        operation: Operation,
        attribute: String,
        elapsed: Duration,
        stats: TabulationStats,
    },
    Failed {
        operation: Operation,
        attribute: String,
        error: String,
    },
}

/// Observer hook for tabulation events.
pub trait TabulationObserver: Send + Sync {
    fn on_event(&self, event: &TabulationEvent);
}

/// Logs tabulation events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl TabulationObserver for StdErrObserver {
    fn on_event(&self, event: &TabulationEvent) {
        match event {
            TabulationEvent::Started {
                operation,
                attribute,
                rows,
            } => eprintln!("[tabulate][start] op={operation:?} attribute={attribute} rows={rows}"),
            TabulationEvent::Finished {
                operation,
                attribute,
                elapsed,
                stats,
            } => eprintln!(
                "[tabulate][ok] op={operation:?} attribute={attribute} {stats} elapsed={elapsed:?}"
            ),
            TabulationEvent::Failed {
                operation,
                attribute,
                error,
            } => eprintln!("[tabulate][fail] op={operation:?} attribute={attribute} err={error}"),
        }
    }
}

/// An observer that fans out events to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn TabulationObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn TabulationObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl TabulationObserver for CompositeObserver {
    fn on_event(&self, event: &TabulationEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::{
        CompositeObserver, Operation, TabulationEvent, TabulationObserver, TabulationStats,
    };

    #[derive(Default)]
    struct CountingObserver {
        seen: AtomicUsize,
    }

    impl TabulationObserver for CountingObserver {
        fn on_event(&self, _event: &TabulationEvent) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn composite_forwards_to_every_observer() {
        let a = Arc::new(CountingObserver::default());
        let b = Arc::new(CountingObserver::default());
        let composite = CompositeObserver::new(vec![
            a.clone() as Arc<dyn TabulationObserver>,
            b.clone() as Arc<dyn TabulationObserver>,
        ]);

        composite.on_event(&TabulationEvent::Started {
            operation: Operation::Tabulate,
            attribute: "sex".to_string(),
            rows: 3,
        });

        assert_eq!(a.seen.load(Ordering::SeqCst), 1);
        assert_eq!(b.seen.load(Ordering::SeqCst), 1);
        assert!(format!("{composite:?}").contains("observers_len: 2"));
    }

    #[test]
    fn stats_display() {
        let stats = TabulationStats {
            rows: 4,
            groups: 2,
            cells: 4,
        };
        assert_eq!(stats.to_string(), "rows=4, groups=2, cells=4");
    }
}
