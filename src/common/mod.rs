pub mod pending;
pub mod ticker;

pub use pending::{Liveness, Pending, PendingState};
pub use ticker::Ticker;
