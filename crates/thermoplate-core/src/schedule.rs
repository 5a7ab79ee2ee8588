//! Time gating of the two power sources.
//!
//! A source is on exactly while `start <= t < stop`. The predicate carries
//! no state and no hysteresis: it is re-evaluated every step from the
//! current simulated time, and `start == stop` means never on.

/// Half-open simulated-time interval `[start_s, stop_s)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveWindow {
    /// First simulated second at which the source is on.
    pub start_s: f64,
    /// First simulated second at which the source is off again.
    pub stop_s: f64,
}

impl ActiveWindow {
    /// Create a window. Ordering is checked by parameter validation, not here.
    pub const fn new(start_s: f64, stop_s: f64) -> Self {
        Self { start_s, stop_s }
    }

    /// An empty window.
    pub const fn never() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Whether the source is on at simulated time `t`.
    #[inline]
    pub fn is_active(&self, t: f64) -> bool {
        self.start_s <= t && t < self.stop_s
    }

    /// Whether the window can never be active.
    pub fn is_empty(&self) -> bool {
        self.stop_s <= self.start_s
    }

    /// Length of the window in simulated seconds (zero when empty).
    pub fn duration(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.stop_s - self.start_s
        }
    }
}

/// On/off state of both sources for one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceActivity {
    /// Whether the heater injects power this step.
    pub heater: bool,
    /// Whether the perturbation injects power this step.
    pub perturbation: bool,
}

/// The pair of windows evaluated independently every step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceSchedule {
    /// Heater window.
    pub heater: ActiveWindow,
    /// Perturbation window.
    pub perturbation: ActiveWindow,
}

impl SourceSchedule {
    /// Evaluate both windows at simulated time `t`.
    #[inline]
    pub fn at(&self, t: f64) -> SourceActivity {
        SourceActivity {
            heater: self.heater.is_active(t),
            perturbation: self.perturbation.is_active(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn start_is_inclusive_stop_is_exclusive() {
        let w = ActiveWindow::new(10.0, 1027.0);
        assert!(!w.is_active(9.999));
        assert!(w.is_active(10.0));
        assert!(w.is_active(1026.999));
        assert!(!w.is_active(1027.0));
    }

    #[test]
    fn degenerate_window_is_never_active() {
        let w = ActiveWindow::new(5.0, 5.0);
        assert!(w.is_empty());
        assert!(!w.is_active(5.0));
        assert_eq!(w.duration(), 0.0);
        assert!(!ActiveWindow::never().is_active(0.0));
    }

    #[test]
    fn schedule_evaluates_sources_independently() {
        let s = SourceSchedule {
            heater: ActiveWindow::new(0.0, 10.0),
            perturbation: ActiveWindow::new(5.0, 20.0),
        };
        assert_eq!(
            s.at(2.0),
            SourceActivity {
                heater: true,
                perturbation: false
            }
        );
        assert_eq!(
            s.at(7.0),
            SourceActivity {
                heater: true,
                perturbation: true
            }
        );
        assert_eq!(
            s.at(15.0),
            SourceActivity {
                heater: false,
                perturbation: true
            }
        );
        assert_eq!(s.at(25.0), SourceActivity::default());
    }

    proptest! {
        #[test]
        fn active_matches_half_open_interval(
            start in 0.0f64..100.0,
            len in 0.0f64..100.0,
            t in -10.0f64..250.0,
        ) {
            let w = ActiveWindow::new(start, start + len);
            prop_assert_eq!(w.is_active(t), start <= t && t < start + len);
        }

        #[test]
        fn empty_windows_never_fire(at in 0.0f64..100.0, t in -10.0f64..250.0) {
            let w = ActiveWindow::new(at, at);
            prop_assert!(!w.is_active(t));
        }
    }
}
