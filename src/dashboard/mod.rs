//! Dashboard module
//!
//! Session state, the gated read model and action feedback.

pub mod feedback;
pub mod session;
pub mod view;

pub use feedback::{Accepted, Feedback};
pub use session::{DashboardSession, WalletListener};
pub use view::DashboardView;
