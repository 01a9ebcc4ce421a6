pub mod domain;
pub mod memory;
pub mod ports;
pub mod service;

pub use domain::{
    CompletionOutcome, EndedSession, Goal, GoalPatch, GoalTimeSummary, GoalWithSubtasks, Profile,
    ProfilePatch, SubTask, SubTaskPatch, TimeSession, TimeSessionDetail, TimeSummary, User,
    UserCredentials, MAX_GOALS_PER_DAY, MAX_SUBTASKS_PER_GOAL, MAX_TIME_SPENT_SECONDS,
};
pub use memory::MemoryStore;
pub use ports::{Clock, PortError, PortResult, ResetScheduler, SystemClock, TrackerStore};
pub use service::{DayReset, TrackerService};
