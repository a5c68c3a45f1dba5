//! Line commands read from stdin

use anyhow::{bail, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Save(Option<String>),
    Discard,
    Mark(Option<String>),
    Photo(Option<String>),
    Sos,
    Notify,
    Cancel,
    Say(String),
    Reload,
    Status,
    /// Connect or disconnect the simulated wearable
    Device(bool),
    Help,
    Quit,
}

pub const HELP: &str = "commands: start | stop | save [name] | discard | mark [note] \
| photo [note] | sos | notify | cancel | say <text> | reload | status \
| device on|off | help | quit";

fn rest(arg: &str) -> Option<String> {
    let arg = arg.trim();
    (!arg.is_empty()).then(|| arg.to_string())
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, arg) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let command = match word.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "stop" => Command::Stop,
            "save" => Command::Save(rest(arg)),
            "discard" => Command::Discard,
            "mark" => Command::Mark(rest(arg)),
            "photo" => Command::Photo(rest(arg)),
            "sos" => Command::Sos,
            "notify" => Command::Notify,
            "cancel" => Command::Cancel,
            "say" => match rest(arg) {
                Some(text) => Command::Say(text),
                None => bail!("say needs a message"),
            },
            "reload" => Command::Reload,
            "status" => Command::Status,
            "device" => match arg.trim() {
                "on" => Command::Device(true),
                "off" => Command::Device(false),
                other => bail!("device expects on or off, got '{}'", other),
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command '{}'", other),
        };
        Ok(command)
    }
}
