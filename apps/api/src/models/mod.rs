pub mod goal;
pub mod stats;
pub mod user;
pub mod water_log;

pub use goal::DailyGoal;
pub use stats::UserBehaviorStats;
pub use user::{Session, User};
pub use water_log::{TimeRange, WaterLog};
