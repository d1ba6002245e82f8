pub mod dashboard;
pub mod invoices;

use crate::models::Tab;

pub const HELP: &str = "\
Commands:
  tab <unflagged|flagged|vendors>   switch tab (or 1, 2, 3)
  open <row>                        expand/collapse a row (invoice id, or vendor number)
  unflag <invoice id>               acknowledge a flagged invoice
  retry | refresh                   reload data from the API
  help                              show this message
  quit | exit                       leave the dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    SwitchTab(Tab),
    Toggle(String),
    Unflag(String),
    Refresh,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "" => Ok(Command::Show),
        "1" | "2" | "3" if arg.is_empty() => Tab::parse(verb)
            .map(Command::SwitchTab)
            .ok_or_else(|| format!("Unknown tab `{}`", verb)),
        "tab" => Tab::parse(arg)
            .map(Command::SwitchTab)
            .ok_or_else(|| format!("Unknown tab `{}`. Try unflagged, flagged or vendors.", arg)),
        "open" | "toggle" => required(arg, "open").map(Command::Toggle),
        "unflag" => required(arg, "unflag").map(Command::Unflag),
        "retry" | "refresh" => Ok(Command::Refresh),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("Unknown command `{}`. Type `help` for a list.", other)),
    }
}

fn required(arg: &str, verb: &str) -> Result<String, String> {
    if arg.is_empty() {
        Err(format!("`{}` needs a row id", verb))
    } else {
        Ok(arg.to_string())
    }
}
