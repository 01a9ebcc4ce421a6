pub mod db;
pub mod scheduler;

pub use db::DbAdapter;
pub use scheduler::TokioResetScheduler;
