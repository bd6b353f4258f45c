/// Round-owned periodic ticks.
///
/// A `Schedule` lives inside a `RoundState`; it is created when the
/// round starts and dropped with it. Nothing global fires ticks: the
/// host feeds wall-clock time in with `advance`, and the schedule hands
/// back due ticks one at a time, in chronological order. Cancelling
/// (round ended, or exited) makes every later query return nothing.
///
/// Ties at the same instant fire in registration order: enemy, then clock.

use std::time::Duration;

use crate::domain::variant::Variant;

use super::level::LevelSettings;

/// Shortest enemy interval accepted; keeps absurd speeds from spinning.
const MIN_INTERVAL: Duration = Duration::from_millis(1);
/// Longest enemy interval; near-zero speeds clamp here instead of overflowing.
const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickKind {
    Enemy,
    Clock,
}

/// One periodic task: fires every `interval` of accumulated time.
#[derive(Clone, Debug)]
pub struct Cadence {
    kind: TickKind,
    interval: Duration,
    elapsed: Duration,
    active: bool,
}

impl Cadence {
    pub fn new(kind: TickKind, interval: Duration) -> Self {
        Cadence { kind, interval: interval.max(MIN_INTERVAL), elapsed: Duration::ZERO, active: true }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    fn until_due(&self) -> Duration {
        self.interval.saturating_sub(self.elapsed)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Schedule {
    cadences: Vec<Cadence>,
    budget: Duration,
}

impl Schedule {
    /// Enemy cadence every `1 / enemy_speed` seconds and a one-second
    /// clock, for rule-sets that have them.
    pub fn for_round(variant: Variant, settings: &LevelSettings) -> Self {
        let mut cadences = Vec::with_capacity(2);
        if variant.has_enemies() {
            cadences.push(Cadence::new(TickKind::Enemy, enemy_interval(settings.enemy_speed)));
        }
        if variant.has_timer() {
            cadences.push(Cadence::new(TickKind::Clock, CLOCK_INTERVAL));
        }
        Schedule { cadences, budget: Duration::ZERO }
    }

    pub fn cadence(&self, kind: TickKind) -> Option<&Cadence> {
        self.cadences.iter().find(|c| c.kind == kind)
    }

    pub fn is_active(&self) -> bool {
        self.cadences.iter().any(|c| c.active)
    }

    pub fn cancel_all(&mut self) {
        for c in &mut self.cadences {
            c.cancel();
        }
        self.budget = Duration::ZERO;
    }

    /// Add wall-clock time to be consumed by `next_due`.
    pub fn feed(&mut self, elapsed: Duration) {
        if self.is_active() {
            self.budget += elapsed;
        }
    }

    /// The next tick due within the fed time, if any. Consumes time up to
    /// that tick; when nothing more is due the remaining time is credited
    /// to every cadence.
    pub fn next_due(&mut self) -> Option<TickKind> {
        let (idx, wait) = self
            .cadences
            .iter()
            .enumerate()
            .filter(|(_, c)| c.active)
            .map(|(i, c)| (i, c.until_due()))
            .min_by_key(|&(i, wait)| (wait, i))?;

        if wait > self.budget {
            let budget = std::mem::take(&mut self.budget);
            for c in self.cadences.iter_mut().filter(|c| c.active) {
                c.elapsed += budget;
            }
            return None;
        }

        self.budget -= wait;
        for c in self.cadences.iter_mut().filter(|c| c.active) {
            c.elapsed += wait;
        }
        let fired = &mut self.cadences[idx];
        fired.elapsed = Duration::ZERO;
        Some(fired.kind)
    }
}

/// Milliseconds between enemy steps: `1000 / enemy_speed`.
pub fn enemy_interval(enemy_speed: f64) -> Duration {
    if enemy_speed.is_finite() && enemy_speed > 0.0 {
        Duration::try_from_secs_f64(1.0 / enemy_speed)
            .map_or(MAX_INTERVAL, |d| d.clamp(MIN_INTERVAL, MAX_INTERVAL))
    } else {
        CLOCK_INTERVAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(speed: f64) -> LevelSettings {
        LevelSettings { enemy_speed: speed, time_limit: 30 }
    }

    fn drain(s: &mut Schedule, elapsed: Duration) -> Vec<TickKind> {
        s.feed(elapsed);
        let mut fired = vec![];
        while let Some(k) = s.next_due() {
            fired.push(k);
        }
        fired
    }

    #[test]
    fn interval_from_speed() {
        assert_eq!(enemy_interval(2.0), Duration::from_millis(500));
        assert_eq!(enemy_interval(4.0), Duration::from_millis(250));
        assert_eq!(enemy_interval(0.0), CLOCK_INTERVAL);
        assert_eq!(enemy_interval(1e12), MIN_INTERVAL);
    }

    #[test]
    fn near_zero_speed_clamps_to_longest_interval() {
        assert_eq!(enemy_interval(1e-20), MAX_INTERVAL);
        assert_eq!(enemy_interval(f64::MIN_POSITIVE), MAX_INTERVAL);
        assert_eq!(enemy_interval(1e-6), MAX_INTERVAL);

        let mut s = Schedule::for_round(Variant::Pursuit, &settings(1e-20));
        assert_eq!(drain(&mut s, Duration::from_secs(2)), vec![TickKind::Clock, TickKind::Clock]);
    }

    #[test]
    fn classic_has_no_cadences() {
        let mut s = Schedule::for_round(Variant::Classic, &settings(2.0));
        assert!(!s.is_active());
        assert!(drain(&mut s, Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn fires_in_chronological_order() {
        let mut s = Schedule::for_round(Variant::Pursuit, &settings(2.0));
        let fired = drain(&mut s, Duration::from_millis(1000));
        // 500ms enemy, then 1000ms: enemy and clock tie, enemy first.
        assert_eq!(fired, vec![TickKind::Enemy, TickKind::Enemy, TickKind::Clock]);
    }

    #[test]
    fn partial_time_carries_over() {
        let mut s = Schedule::for_round(Variant::Pursuit, &settings(2.0));
        assert!(drain(&mut s, Duration::from_millis(300)).is_empty());
        assert_eq!(drain(&mut s, Duration::from_millis(300)), vec![TickKind::Enemy]);
        assert_eq!(drain(&mut s, Duration::from_millis(400)), vec![TickKind::Enemy, TickKind::Clock]);
    }

    #[test]
    fn cancelled_schedule_never_fires() {
        let mut s = Schedule::for_round(Variant::Pursuit, &settings(2.0));
        s.feed(Duration::from_secs(5));
        s.cancel_all();
        assert_eq!(s.next_due(), None);
        assert!(drain(&mut s, Duration::from_secs(5)).is_empty());
        assert!(!s.cadence(TickKind::Enemy).map_or(true, |c| c.is_active()));
    }
}
