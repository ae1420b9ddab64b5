//! Line-oriented command parser for the interactive prompt.
//!
//! Commands map 1:1 onto operations. While the chat view is active,
//! any line that is not a known command is treated as a chat message.

use thiserror::Error;

/// A parsed user command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `rooms` — list/refresh the user's rooms
    Rooms,
    /// `enter <room>` — select a room by id or name
    Enter(String),
    /// `topics` — refresh the selected room's topics
    Topics,
    /// `open <topic>` — open a topic's chat
    Open(String),
    /// `send <text>` or bare text in chat
    Send(String),
    /// `create-room <name> [password]`
    CreateRoom { name: String, password: String },
    /// `join <room-id> [password]`
    Join { room_id: String, password: String },
    /// `leave` — leave the selected room
    Leave,
    /// `delete-room` — delete the selected room
    DeleteRoom,
    /// `create-topic <title> [description...]`
    CreateTopic { title: String, description: String },
    /// `delete-topic <topic>`
    DeleteTopic(String),
    /// `delete-chat` — clear the open topic's history
    DeleteChat,
    /// `promote <email>` — make a member admin
    Promote(String),
    /// `remove <email>` — remove a member
    Remove(String),
    /// `password` — reveal the selected room's password
    Password,
    /// `back` — go up one view
    Back,
    /// `quit`
    Quit,
    /// `help`
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command: {0} (try 'help')")]
    Unknown(String),
    #[error("'{command}' requires {usage}")]
    MissingArgument {
        command: &'static str,
        usage: &'static str,
    },
}

/// One-line usage summary printed by `help`
pub const HELP: &str = "\
rooms | enter <room> | topics | open <topic> | send <text>
create-room <name> [password] | join <room-id> [password] | leave | delete-room
create-topic <title> [description] | delete-topic <topic> | delete-chat
promote <email> | remove <email> | password | back | quit";

/// Parse one input line.
///
/// `in_chat` controls the fallback: in the chat view an unrecognized
/// line is a message, elsewhere it is an error.
pub fn parse(line: &str, in_chat: bool) -> Result<Command, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let require = |usage: &'static str, command: &'static str| {
        if rest.is_empty() {
            Err(ParseError::MissingArgument { command, usage })
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match word {
        "rooms" => Command::Rooms,
        "enter" => Command::Enter(require("a room id or name", "enter")?),
        "topics" => Command::Topics,
        "open" => Command::Open(require("a topic id or title", "open")?),
        "send" => Command::Send(require("message text", "send")?),
        "create-room" => {
            let args = require("a room name", "create-room")?;
            let (name, password) = split_first_word(&args);
            Command::CreateRoom { name, password }
        }
        "join" => {
            let args = require("a room id", "join")?;
            let (room_id, password) = split_first_word(&args);
            Command::Join { room_id, password }
        }
        "leave" => Command::Leave,
        "delete-room" => Command::DeleteRoom,
        "create-topic" => {
            let args = require("a topic title", "create-topic")?;
            let (title, description) = split_first_word(&args);
            Command::CreateTopic { title, description }
        }
        "delete-topic" => Command::DeleteTopic(require("a topic id or title", "delete-topic")?),
        "delete-chat" => Command::DeleteChat,
        "promote" => Command::Promote(require("a member email", "promote")?),
        "remove" => Command::Remove(require("a member email", "remove")?),
        "password" => Command::Password,
        "back" => Command::Back,
        "quit" | "exit" => Command::Quit,
        "help" => Command::Help,
        _ if in_chat => Command::Send(line.to_string()),
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn split_first_word(args: &str) -> (String, String) {
    match args.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (args.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        // テスト項目: 引数なしコマンドをパースできる
        assert_eq!(parse("rooms", false).unwrap(), Command::Rooms);
        assert_eq!(parse("  back  ", false).unwrap(), Command::Back);
        assert_eq!(parse("quit", false).unwrap(), Command::Quit);
        assert_eq!(parse("exit", false).unwrap(), Command::Quit);
        assert_eq!(parse("delete-chat", true).unwrap(), Command::DeleteChat);
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        // テスト項目: 引数付きコマンドをパースできる
        assert_eq!(
            parse("enter room-1", false).unwrap(),
            Command::Enter("room-1".to_string())
        );
        assert_eq!(
            parse("send hello there", true).unwrap(),
            Command::Send("hello there".to_string())
        );
        assert_eq!(
            parse("create-topic Homework weekly tasks", false).unwrap(),
            Command::CreateTopic {
                title: "Homework".to_string(),
                description: "weekly tasks".to_string(),
            }
        );
        assert_eq!(
            parse("join room-1 s3cret", false).unwrap(),
            Command::Join {
                room_id: "room-1".to_string(),
                password: "s3cret".to_string(),
            }
        );
        assert_eq!(
            parse("create-room study", false).unwrap(),
            Command::CreateRoom {
                name: "study".to_string(),
                password: String::new(),
            }
        );
    }

    #[test]
    fn test_missing_argument_is_reported() {
        // テスト項目: 必須引数の欠落はエラーになる
        assert_eq!(
            parse("enter", false).unwrap_err(),
            ParseError::MissingArgument {
                command: "enter",
                usage: "a room id or name",
            }
        );
        assert!(matches!(
            parse("send", true),
            Err(ParseError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_bare_text_is_a_message_only_in_chat() {
        // テスト項目: コマンドでない行はチャット中のみメッセージ扱い
        // when (操作):
        let in_chat = parse("hello @chatbot", true);
        let outside = parse("hello @chatbot", false);

        // then (期待する結果):
        assert_eq!(in_chat.unwrap(), Command::Send("hello @chatbot".to_string()));
        assert_eq!(
            outside.unwrap_err(),
            ParseError::Unknown("hello".to_string())
        );
    }

    #[test]
    fn test_empty_line_is_empty_error() {
        // テスト項目: 空行は Empty エラーになる
        assert_eq!(parse("   ", true).unwrap_err(), ParseError::Empty);
    }
}
