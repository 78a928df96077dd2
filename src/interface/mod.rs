//! Interface layer - How the popup is hosted and shown
//!
//! This layer handles:
//! - The popup host object (settings restore, command dispatch, event loop)
//! - The presenter port and a console renderer
//! - Console command parsing for the demo binary

pub mod console;
pub mod popup;
pub mod presenter;

pub use popup::{Popup, PopupCommand};
pub use presenter::{ActionPresenter, ConsolePresenter};
