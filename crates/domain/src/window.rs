/// The range of reminder timestamps that are candidates for delivery in
/// a single poll cycle. Both edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    pub from: i64,
    pub to: i64,
}

const MINUTE_MILLIS: i64 = 60 * 1000;

impl DueWindow {
    /// `[now - grace, now + look_ahead]`
    pub fn around(now: i64, grace_minutes: i64, look_ahead_minutes: i64) -> Self {
        Self {
            from: now.saturating_sub(grace_minutes.saturating_mul(MINUTE_MILLIS)),
            to: now.saturating_add(look_ahead_minutes.saturating_mul(MINUTE_MILLIS)),
        }
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.from <= ts && ts <= self.to
    }
}
