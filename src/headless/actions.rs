//! User action lines for headless runs
//!
//! One action per line:
//!
//! ```text
//! toggle-menu
//! tab 2
//! toggle-show-again
//! open folder
//! quit
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use startpage_app::Message;
use startpage_core::HostCommand;

/// Parse one action line.
///
/// `Ok(None)` for lines with nothing to do, `Err` with a description for
/// lines that are not actions.
pub fn parse_action(line: &str) -> Result<Option<Message>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default();
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments: {}", line));
    }

    let message = match (verb, arg) {
        ("toggle-menu", None) => Message::ToggleMenu,
        ("toggle-show-again", None) => Message::ToggleShowAgain,
        ("quit", None) => Message::Unmount,
        ("tab", Some(index)) => {
            let index = index
                .parse::<usize>()
                .map_err(|_| format!("invalid tab index: {}", index))?;
            Message::SelectTab(index)
        }
        ("open", Some(target)) => Message::Command(parse_command(target)?),
        _ => return Err(format!("unknown action: {}", line)),
    };

    Ok(Some(message))
}

fn parse_command(target: &str) -> Result<HostCommand, String> {
    let command = match target {
        "blank-notebook" => HostCommand::OpenBlankNotebook,
        "python-file" => HostCommand::OpenBlankPythonFile,
        "interactive-window" => HostCommand::OpenInteractiveWindow,
        "command-palette" => HostCommand::OpenCommandPalette,
        "command-palette-nb" => HostCommand::OpenCommandPaletteWithSelection,
        "sample-notebook" => HostCommand::OpenSampleNotebook,
        "file-browser" => HostCommand::OpenFileBrowser,
        "folder" => HostCommand::OpenFolder,
        "workspace" => HostCommand::OpenWorkspace,
        "clone-repo" => HostCommand::CloneRepo,
        other => return Err(format!("unknown open target: {}", other)),
    };
    Ok(command)
}

/// Feed actions from `reader` to the engine until input ends or `quit`.
///
/// Blocking; run it on its own thread. With `quit_at_eof` the end of input
/// counts as `quit`.
pub fn read_actions_blocking<R>(reader: R, tx: mpsc::Sender<Message>, quit_at_eof: bool)
where
    R: std::io::BufRead,
{
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read actions: {}", e);
                break;
            }
        };

        match parse_action(&line) {
            Ok(Some(message)) => {
                let quit = message == Message::Unmount;
                if tx.blocking_send(message).is_err() {
                    return;
                }
                if quit {
                    info!("Actions: quit requested");
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring action line: {}", e),
        }
    }

    if quit_at_eof {
        info!("Actions: end of input");
        let _ = tx.blocking_send(Message::Unmount);
    }
    info!("Action reader exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(rx: &mut mpsc::Receiver<Message>) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Ok(message) = rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    #[test]
    fn test_parse_simple_actions() {
        assert_eq!(parse_action("toggle-menu"), Ok(Some(Message::ToggleMenu)));
        assert_eq!(
            parse_action("  toggle-show-again "),
            Ok(Some(Message::ToggleShowAgain))
        );
        assert_eq!(parse_action("quit"), Ok(Some(Message::Unmount)));
        assert_eq!(parse_action("tab 3"), Ok(Some(Message::SelectTab(3))));
    }

    #[test]
    fn test_parse_open_targets() {
        let targets = [
            "blank-notebook",
            "python-file",
            "interactive-window",
            "command-palette",
            "command-palette-nb",
            "sample-notebook",
            "file-browser",
            "folder",
            "workspace",
            "clone-repo",
        ];

        let commands: Vec<HostCommand> = targets
            .iter()
            .map(|target| match parse_action(&format!("open {}", target)) {
                Ok(Some(Message::Command(command))) => command,
                other => panic!("open {} parsed as {:?}", target, other),
            })
            .collect();

        assert_eq!(commands, HostCommand::ALL.to_vec());
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert_eq!(parse_action(""), Ok(None));
        assert_eq!(parse_action("   "), Ok(None));
        assert_eq!(parse_action("# open the folder next"), Ok(None));
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(parse_action("reload").is_err());
        assert!(parse_action("tab").is_err());
        assert!(parse_action("tab two").is_err());
        assert!(parse_action("tab -1").is_err());
        assert!(parse_action("open settings").is_err());
        assert!(parse_action("toggle-menu now").is_err());
        assert!(parse_action("open folder twice").is_err());
    }

    #[test]
    fn test_reader_stops_at_quit() {
        let input = std::io::Cursor::new("toggle-menu\nbogus\ntab 1\nquit\nopen folder\n");
        let (tx, mut rx) = mpsc::channel(8);

        read_actions_blocking(input, tx, false);

        assert_eq!(
            collect(&mut rx),
            vec![Message::ToggleMenu, Message::SelectTab(1), Message::Unmount]
        );
    }

    #[test]
    fn test_reader_quits_at_eof_when_asked() {
        let input = std::io::Cursor::new("open folder\n");
        let (tx, mut rx) = mpsc::channel(8);

        read_actions_blocking(input, tx, true);

        assert_eq!(
            collect(&mut rx),
            vec![
                Message::Command(HostCommand::OpenFolder),
                Message::Unmount
            ]
        );
    }

    #[test]
    fn test_reader_keeps_running_at_eof_by_default() {
        let input = std::io::Cursor::new("toggle-show-again\n");
        let (tx, mut rx) = mpsc::channel(8);

        read_actions_blocking(input, tx, false);

        assert_eq!(collect(&mut rx), vec![Message::ToggleShowAgain]);
    }
}
