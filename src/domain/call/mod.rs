//! Call bounded context - one connection and the actions valid around it

pub mod action;
pub mod entity;
pub mod value_object;

pub use action::{Action, ActionSet};
pub use entity::CallConnection;
pub use value_object::{CallDirection, SessionState};
