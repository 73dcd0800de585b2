//! Region-based leader selection.
//!
//! Leaders bias where the population moves next. Instead of taking the
//! three "best" archive members, which tend to cluster at one end of the
//! front, [`LeaderManager`] picks one representative per objective-space
//! [`Zone`]: spread-dominant, fairness-dominant and balanced. An optional
//! fourth explorer leader comes from a sparse part of the balanced zone.

mod manager;
mod region;

pub use manager::{LeaderManager, ZONE_LEADERS};
pub use region::{normalize_front, RegionRule, Zone};
