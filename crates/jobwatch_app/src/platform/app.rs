use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use jobwatch_core::{update, AppState, Msg};
use jobwatch_logging::{watch_info, watch_warn};

use super::config::{Args, ConsoleConfig};
use super::effects::EffectRunner;
use super::ui::input::{parse_command, ConsoleCommand, HELP_TEXT};
use super::ui::render::{job_table, notice_line, status_line, ConsoleRenderer};

/// Everything the console loop reacts to.
pub(crate) enum AppEvent {
    Core(Msg),
    Console(ConsoleCommand),
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let args = Args::parse();
    let (mut config, config_error) = match ConsoleConfig::load(&args.config) {
        Ok(config) => (config, None),
        Err(err) => (ConsoleConfig::default(), Some(err)),
    };
    config.apply_args(&args);

    jobwatch_logging::initialize(&config.log_settings());
    if let Some(err) = config_error {
        watch_warn!("{}; using defaults", err);
        eprintln!("Warning: {err}; using defaults");
    }
    let engine_config = config
        .engine_config()
        .with_context(|| format!("invalid backend origin {:?}", config.origin))?;
    watch_info!("Starting console for {}", config.origin);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let effects = EffectRunner::new(engine_config, config.export_prefix.clone(), event_tx.clone());
    spawn_input_reader(event_tx);

    let mut console = Console::new(effects, io::stdout());
    console.print(&[
        format!("jobwatch: watching {}", config.origin),
        "Type 'help' for commands.".to_string(),
    ]);
    console.dispatch_msg(Msg::ConnectRequested);
    console.dispatch_msg(Msg::PingClicked);

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Core(msg) => console.dispatch_msg(msg),
            AppEvent::Console(command) => {
                if !console.handle_command(command) {
                    break;
                }
            }
            AppEvent::InputClosed => break,
        }
    }

    console.effects.shutdown();
    watch_info!("Console stopped");
    Ok(())
}

fn spawn_input_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(AppEvent::Console(parse_command(&line))).is_err() {
                return;
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}

/// Core message for a console command, if it has one.
fn command_msg(command: &ConsoleCommand, at: DateTime<Utc>) -> Option<Msg> {
    match command {
        ConsoleCommand::Reconnect => Some(Msg::ReconnectClicked { at }),
        ConsoleCommand::Export => Some(Msg::ExportClicked { at }),
        ConsoleCommand::Clear => Some(Msg::ClearClicked),
        ConsoleCommand::Ping => Some(Msg::PingClicked),
        _ => None,
    }
}

struct Console<W: Write> {
    state: AppState,
    renderer: ConsoleRenderer,
    effects: EffectRunner,
    out: W,
}

impl<W: Write> Console<W> {
    fn new(effects: EffectRunner, out: W) -> Self {
        Self {
            state: AppState::new(),
            renderer: ConsoleRenderer::new(),
            effects,
            out,
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let notice = state.take_notice();
        let was_dirty = state.consume_dirty();
        self.state = state;

        if was_dirty {
            let lines = self.renderer.render(&self.state);
            self.print(&lines);
        }
        if let Some(notice) = notice {
            self.print(&[notice_line(&notice)]);
        }
        self.effects.enqueue(effects);
    }

    /// Returns `false` when the console should exit.
    fn handle_command(&mut self, command: ConsoleCommand) -> bool {
        if let Some(msg) = command_msg(&command, Utc::now()) {
            self.dispatch_msg(msg);
            return true;
        }
        match command {
            ConsoleCommand::Jobs => {
                let lines = job_table(&self.state.view());
                self.print(&lines);
            }
            ConsoleCommand::Status => {
                let line = status_line(&self.state);
                self.print(&[line]);
            }
            ConsoleCommand::Help => self.print(&[HELP_TEXT.to_string()]),
            ConsoleCommand::Unknown(text) => self.print(&[format!(
                "Unknown command '{text}'. Type 'help' for commands."
            )]),
            ConsoleCommand::Quit => return false,
            _ => {}
        }
        true
    }

    fn print(&mut self, lines: &[String]) {
        for line in lines {
            if writeln!(self.out, "{line}").is_err() {
                return;
            }
        }
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::command_msg;
    use super::ConsoleCommand;
    use chrono::Utc;
    use jobwatch_core::Msg;

    #[test]
    fn state_changing_commands_map_to_messages() {
        let at = Utc::now();
        assert_eq!(
            command_msg(&ConsoleCommand::Reconnect, at),
            Some(Msg::ReconnectClicked { at })
        );
        assert_eq!(
            command_msg(&ConsoleCommand::Export, at),
            Some(Msg::ExportClicked { at })
        );
        assert_eq!(command_msg(&ConsoleCommand::Clear, at), Some(Msg::ClearClicked));
        assert_eq!(command_msg(&ConsoleCommand::Ping, at), Some(Msg::PingClicked));
    }

    #[test]
    fn view_only_commands_stay_local() {
        let at = Utc::now();
        for command in [
            ConsoleCommand::Jobs,
            ConsoleCommand::Status,
            ConsoleCommand::Help,
            ConsoleCommand::Quit,
            ConsoleCommand::Empty,
        ] {
            assert_eq!(command_msg(&command, at), None);
        }
    }
}
