//! Console command parsing for the demo binary

use crate::domain::call::Action;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::infrastructure::provider::LoopbackProvider;

use super::popup::PopupCommand;

pub const HELP: &str = "\
commands:
  call | hangup | accept | reject | ignore
  setup                 set the device up without dialing
  number <n>            set (and save) the number to dial
  url <u>               set (and save) the token endpoint
  sim incoming <from>   remote party calls in
  sim ringing | sim answer | sim hangup | sim cancel
  sim offline | sim error <code> <message>
  help | quit";

/// Scripted remote-side behaviour for the loopback provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Simulation {
    Incoming { from: String },
    Ringing,
    Answer,
    Hangup,
    Cancel,
    Offline,
    Error { code: u32, message: String },
}

impl Simulation {
    pub fn apply(&self, provider: &LoopbackProvider) {
        match self {
            Simulation::Incoming { from } => {
                provider.ring_in(from);
            }
            Simulation::Ringing => {
                provider.remote_ringing();
            }
            Simulation::Answer => {
                provider.remote_answer();
            }
            Simulation::Hangup => {
                provider.remote_hangup();
            }
            Simulation::Cancel => {
                provider.remote_cancel();
            }
            Simulation::Offline => {
                provider.go_offline();
            }
            Simulation::Error { code, message } => {
                provider.fail(message.clone(), *code);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Popup(PopupCommand),
    Simulate(Simulation),
    Help,
    Quit,
}

/// Parse one input line; blank lines yield `None`
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "call" => perform(Action::Call),
        "hangup" => perform(Action::Hangup),
        "accept" => perform(Action::Accept),
        "reject" => perform(Action::Reject),
        "ignore" => perform(Action::Ignore),
        "setup" => ConsoleCommand::Popup(PopupCommand::SetupDevice),
        "number" => ConsoleCommand::Popup(PopupCommand::SetNumber(rest.to_string())),
        "url" => ConsoleCommand::Popup(PopupCommand::SetTokenUrl(rest.to_string())),
        "sim" => ConsoleCommand::Simulate(parse_simulation(rest)?),
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => {
            return Err(DomainError::ValidationError(format!(
                "Unknown command '{}' (try `help`)",
                other
            )))
        }
    };
    Ok(Some(command))
}

fn perform(action: Action) -> ConsoleCommand {
    ConsoleCommand::Popup(PopupCommand::Perform(action))
}

fn parse_simulation(args: &str) -> Result<Simulation> {
    let (word, rest) = match args.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (args, ""),
    };

    match word {
        "incoming" if !rest.is_empty() => Ok(Simulation::Incoming {
            from: rest.to_string(),
        }),
        "incoming" => Err(DomainError::ValidationError(
            "sim incoming needs a caller id".to_string(),
        )),
        "ringing" => Ok(Simulation::Ringing),
        "answer" => Ok(Simulation::Answer),
        "hangup" => Ok(Simulation::Hangup),
        "cancel" => Ok(Simulation::Cancel),
        "offline" => Ok(Simulation::Offline),
        "error" => {
            let (code, message) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let code = code.parse().map_err(|_| {
                DomainError::ValidationError(format!("'{}' is not an error code", code))
            })?;
            Ok(Simulation::Error {
                code,
                message: message.trim().to_string(),
            })
        }
        other => Err(DomainError::ValidationError(format!(
            "Unknown simulation '{}'",
            other
        ))),
    }
}
