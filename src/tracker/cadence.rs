/// Frame counter and the periodic decisions derived from it.
#[derive(Debug, Clone)]
pub struct Cadence {
    ticks_per_second: u32,
    query_period: u64,
    cleanup_period: u64,
    next: u64,
}

impl Cadence {
    pub fn new(ticks_per_second: u32, seconds_per_query: u32, seconds_per_cleanup: u32) -> Self {
        let tps = u64::from(ticks_per_second.max(1));
        Self {
            ticks_per_second: ticks_per_second.max(1),
            query_period: tps * u64::from(seconds_per_query.max(1)),
            cleanup_period: tps * u64::from(seconds_per_cleanup.max(1)),
            next: 0,
        }
    }

    /// Index of the tick being run. The first call returns 0.
    pub fn advance(&mut self) -> u64 {
        let tick = self.next;
        self.next += 1;
        tick
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.next
    }

    pub fn is_query_tick(&self, tick: u64) -> bool {
        tick % self.query_period == 0
    }

    pub fn is_cleanup_tick(&self, tick: u64) -> bool {
        tick % self.cleanup_period == 0
    }

    pub fn tick_seconds(&self) -> f64 {
        1.0 / f64::from(self.ticks_per_second)
    }
}
