pub mod router;
pub mod startup;
pub mod supervisor;
pub mod sweeper;

pub use router::MessageRouter;
pub use startup::{load_access, start_bot};
pub use supervisor::spawn_supervised_listener;
pub use sweeper::ExpirySweeper;
