//! Remote access to the task board API and a local mirror of one board.
//!
//! [`BoardApi`] speaks HTTP. [`BoardState`] holds what a UI renders and
//! changes only through pure transitions, so it can be driven without a
//! network. [`BoardStore`] ties the two together with optimistic updates.

pub mod api;
pub mod state;
pub mod store;

pub use api::{BoardApi, ClientError, Deleted};
pub use state::{Action, BoardState, BoardSummary, Confirmation, Mutation};
pub use store::BoardStore;
