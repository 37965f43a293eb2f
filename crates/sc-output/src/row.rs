//! Plain data row types written by output backends.

/// The `resource` value of the row carrying a tick's overall reward.
pub const TOTAL: &str = "total";

/// One tick's reward, either overall (`resource == TOTAL`) or the share of
/// one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardRow {
    pub tick:          u64,
    /// Wall-clock time at the end of the tick, `YYYY-MM-DD HH:MM:SS`.
    pub date_time:     String,
    pub resource:      String,
    pub timestep:      f64,
    /// Episode total so far; repeated on the per-resource rows.
    pub episode_total: f64,
}

/// On-hand stock of one resource at one inventory-holding node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRow {
    pub tick:     u64,
    pub node:     String,
    pub resource: String,
    pub on_hand:  i64,
}
