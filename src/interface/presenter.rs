//! Presentation port and the console renderer

use std::io::Write;

use tracing::warn;

use crate::application::SessionNotification;
use crate::domain::call::{Action, ActionSet};
use crate::domain::log::LogEntry;
use crate::domain::shared::value_objects::ProviderCallId;

/// One call-control button as the popup lays it out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonSpec {
    pub action: Action,
    pub label: &'static str,
    pub class_name: &'static str,
}

pub static BUTTONS: [ButtonSpec; 5] = [
    ButtonSpec {
        action: Action::Call,
        label: "Call",
        class_name: "call-btn",
    },
    ButtonSpec {
        action: Action::Hangup,
        label: "Hangup",
        class_name: "hangup-btn",
    },
    ButtonSpec {
        action: Action::Accept,
        label: "Accept",
        class_name: "accept-btn",
    },
    ButtonSpec {
        action: Action::Reject,
        label: "Reject",
        class_name: "reject-btn",
    },
    ButtonSpec {
        action: Action::Ignore,
        label: "Ignore",
        class_name: "ignore-btn",
    },
];

/// Buttons to show for an action set, in layout order
pub fn visible_buttons(actions: &ActionSet) -> impl Iterator<Item = &'static ButtonSpec> + '_ {
    BUTTONS.iter().filter(move |b| actions.contains(b.action))
}

/// Renders controller output. Implementations only display; they never
/// decide which actions are valid.
pub trait ActionPresenter: Send {
    fn present_actions(&mut self, actions: &ActionSet);

    /// Show or hide the standalone "Setup device" control
    fn present_setup(&mut self, offered: bool);

    fn present_identity(&mut self, identity: &str);

    fn present_call_id(&mut self, call_id: Option<&ProviderCallId>);

    fn append_log(&mut self, entry: &LogEntry);

    fn notify(&mut self, notification: &SessionNotification) {
        match notification {
            SessionNotification::LogEmitted { entry } => self.append_log(entry),
            SessionNotification::ActionSetChanged { actions } => self.present_actions(actions),
            SessionNotification::IdentityResolved { identity } => self.present_identity(identity),
            SessionNotification::CallIdChanged { call_id } => {
                self.present_call_id(call_id.as_ref())
            }
        }
    }
}

/// Line-oriented presenter for terminals
pub struct ConsolePresenter<W: Write + Send> {
    out: W,
    setup_offered: Option<bool>,
}

impl ConsolePresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            setup_offered: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            warn!("Console output failed: {}", e);
        }
    }
}

impl<W: Write + Send> ActionPresenter for ConsolePresenter<W> {
    fn present_actions(&mut self, actions: &ActionSet) {
        let labels: Vec<String> = visible_buttons(actions)
            .map(|b| format!("[{}]", b.label))
            .collect();
        let text = if labels.is_empty() {
            "Buttons: (none)".to_string()
        } else {
            format!("Buttons: {}", labels.join(" "))
        };
        self.line(&text);
    }

    fn present_setup(&mut self, offered: bool) {
        // Only report changes
        if self.setup_offered == Some(offered) {
            return;
        }
        self.setup_offered = Some(offered);
        if offered {
            self.line("Setup device: available (type `setup`)");
        } else {
            self.line("Setup device: done");
        }
    }

    fn present_identity(&mut self, identity: &str) {
        self.line(&format!("Identity: {}", identity));
    }

    fn present_call_id(&mut self, call_id: Option<&ProviderCallId>) {
        match call_id {
            Some(id) => self.line(&format!("Call SID: {}", id)),
            None => self.line("Call SID:"),
        }
    }

    fn append_log(&mut self, entry: &LogEntry) {
        self.line(&entry.to_string());
    }
}
