use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTrigger {
    Manual,
    Periodic { trigger_id: u64 },
}

#[derive(Debug, Clone, PartialEq)]
struct PeriodicTrigger {
    id: u64,
    interval: Duration,
    next_fire: Instant,
}

/// Owns the single periodic trigger. Enabling always replaces whatever was
/// running, so there is never more than one firing interval.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureScheduler {
    trigger: Option<PeriodicTrigger>,
    next_id: u64,
}

impl CaptureScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_auto(&mut self, now: Instant, interval: Duration) -> u64 {
        self.disable_auto();

        let id = self.next_id;
        self.next_id += 1;
        self.trigger = Some(PeriodicTrigger {
            id,
            interval,
            next_fire: now + interval,
        });
        id
    }

    /// Returns the id of the cancelled trigger, if there was one.
    pub fn disable_auto(&mut self) -> Option<u64> {
        self.trigger.take().map(|trigger| trigger.id)
    }

    pub fn is_active(&self) -> bool {
        self.trigger.is_some()
    }

    #[allow(dead_code)]
    pub fn active_trigger(&self) -> Option<u64> {
        self.trigger.as_ref().map(|trigger| trigger.id)
    }

    /// Fires at most once per call. Intervals missed while the loop was busy
    /// are dropped rather than replayed.
    pub fn poll(&mut self, now: Instant) -> Option<CaptureTrigger> {
        let trigger = self.trigger.as_mut()?;

        if now < trigger.next_fire {
            return None;
        }

        if trigger.interval.is_zero() {
            trigger.next_fire = now;
        } else {
            while trigger.next_fire <= now {
                trigger.next_fire += trigger.interval;
            }
        }

        Some(CaptureTrigger::Periodic {
            trigger_id: trigger.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(2000);
    const TICK: Duration = Duration::from_millis(50);

    fn count_fires(scheduler: &mut CaptureScheduler, from: Instant, until: Instant) -> usize {
        let mut now = from;
        let mut fires = 0;
        while now <= until {
            if scheduler.poll(now).is_some() {
                fires += 1;
            }
            now += TICK;
        }
        fires
    }

    #[test]
    fn test_fires_every_interval() {
        let start = Instant::now();
        let mut scheduler = CaptureScheduler::new();
        let id = scheduler.enable_auto(start, INTERVAL);

        assert_eq!(scheduler.poll(start + Duration::from_millis(1999)), None);
        assert_eq!(
            scheduler.poll(start + INTERVAL),
            Some(CaptureTrigger::Periodic { trigger_id: id })
        );
        assert_eq!(scheduler.poll(start + INTERVAL), None);
    }

    #[test]
    fn test_enabling_twice_keeps_one_interval() {
        let start = Instant::now();
        let mut scheduler = CaptureScheduler::new();
        let first = scheduler.enable_auto(start, INTERVAL);
        let second = scheduler.enable_auto(start + Duration::from_millis(500), INTERVAL);

        assert_ne!(first, second);
        assert_eq!(scheduler.active_trigger(), Some(second));
        assert_eq!(
            count_fires(&mut scheduler, start, start + Duration::from_millis(5000)),
            2
        );
    }

    #[test]
    fn test_disable_cancels_and_tolerates_nothing_active() {
        let start = Instant::now();
        let mut scheduler = CaptureScheduler::new();

        assert_eq!(scheduler.disable_auto(), None);

        let id = scheduler.enable_auto(start, INTERVAL);
        assert_eq!(scheduler.disable_auto(), Some(id));
        assert!(!scheduler.is_active());
        assert_eq!(
            count_fires(&mut scheduler, start, start + Duration::from_millis(5000)),
            0
        );
    }

    #[test]
    fn test_missed_intervals_do_not_burst() {
        let start = Instant::now();
        let mut scheduler = CaptureScheduler::new();
        scheduler.enable_auto(start, INTERVAL);

        assert!(scheduler.poll(start + Duration::from_millis(7000)).is_some());
        assert!(scheduler.poll(start + Duration::from_millis(7050)).is_none());
        assert!(scheduler.poll(start + Duration::from_millis(8000)).is_some());
    }

    #[test]
    fn test_rapid_toggling_never_doubles_up() {
        let start = Instant::now();
        let mut scheduler = CaptureScheduler::new();
        for step in 0..10 {
            let now = start + Duration::from_millis(step * 10);
            scheduler.enable_auto(now, INTERVAL);
            if step % 2 == 0 {
                scheduler.disable_auto();
            }
        }

        assert_eq!(
            count_fires(&mut scheduler, start, start + Duration::from_millis(5000)),
            2
        );
    }
}
