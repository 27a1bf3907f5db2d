//! Domain model: tasks, crews, wells and plans.

pub mod plan;
pub mod task;
pub mod team;
pub mod well;

pub use plan::{meta, monthly_dates, monthly_to_yearly, Plan, ScheduleEntry, WellPlanContext};
pub use task::{TaskCodeError, TaskKind};
pub use team::{Team, TeamPool};
pub use well::Well;
