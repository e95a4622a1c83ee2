/// One line typed at the console prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Reconnect,
    Export,
    Clear,
    Ping,
    Jobs,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  reconnect  drop the stream session and connect again
  export     write collected jobs to a CSV file
  clear      clear collected jobs and the activity log
  ping       check backend health
  jobs       list collected jobs, newest first
  status     show connection, run and backend status
  help       show this text
  quit       exit";

pub fn parse_command(line: &str) -> ConsoleCommand {
    let word = line.trim().to_ascii_lowercase();
    match word.as_str() {
        "" => ConsoleCommand::Empty,
        "reconnect" | "r" => ConsoleCommand::Reconnect,
        "export" | "e" => ConsoleCommand::Export,
        "clear" => ConsoleCommand::Clear,
        "ping" => ConsoleCommand::Ping,
        "jobs" | "j" => ConsoleCommand::Jobs,
        "status" | "s" => ConsoleCommand::Status,
        "help" | "h" | "?" => ConsoleCommand::Help,
        "quit" | "q" | "exit" => ConsoleCommand::Quit,
        _ => ConsoleCommand::Unknown(line.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, ConsoleCommand};

    #[test]
    fn commands_are_case_insensitive_and_trimmed() {
        assert_eq!(parse_command("  Export \n"), ConsoleCommand::Export);
        assert_eq!(parse_command("RECONNECT"), ConsoleCommand::Reconnect);
        assert_eq!(parse_command("q"), ConsoleCommand::Quit);
        assert_eq!(parse_command("   "), ConsoleCommand::Empty);
    }

    #[test]
    fn unknown_input_is_kept_for_the_hint() {
        assert_eq!(
            parse_command(" launch rockets "),
            ConsoleCommand::Unknown("launch rockets".into())
        );
    }
}
