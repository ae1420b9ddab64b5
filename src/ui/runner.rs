//! Interactive CLI runner.
//!
//! Owns the single logical writer: all cache/flow/channel mutation
//! happens on this task. Input lines arrive from a rustyline loop on a
//! blocking thread; channel events arrive from the connection driver.
//! Both feed one `select!` loop.

use std::sync::Arc;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use crate::{
    cache::{PendingOp, PendingOps, RoomCache},
    channel::{ChannelEvent, ChatChannel, Dispatch, ReconnectPolicy, dispatch_frame},
    config::Config,
    domain::{ChatMessage, RoomId, TopicId},
    infrastructure::{HttpApiClient, RoomApi},
    notice::Notice,
    session::{Session, SessionStore},
    time,
    ui::{
        command::{self, Command},
        flow::{FlowEffect, View, ViewFlow},
    },
    usecase::{
        FetchTopicsUseCase, RoomActionsUseCase, SendChatUseCase, SyncRoomsUseCase,
        TopicActionsUseCase, UseCaseError,
    },
};

const PROMPT: &str = "airoom> ";

struct App {
    session: Arc<SessionStore>,
    cache: RoomCache,
    flow: ViewFlow,
    pending: PendingOps,
    channel: ChatChannel,
    sync_rooms: SyncRoomsUseCase,
    fetch_topics: FetchTopicsUseCase,
    room_actions: RoomActionsUseCase,
    topic_actions: TopicActionsUseCase,
    send_chat: SendChatUseCase,
}

/// Run the interactive client until the user quits or input ends.
pub async fn run(config: Config) {
    let session = Arc::new(SessionStore::new());
    session.login(Session {
        user_id: uuid::Uuid::new_v4().to_string(),
        name: config.name.clone(),
        email: config.email.clone(),
        token: config.token.clone(),
    });

    let api: Arc<dyn RoomApi> =
        Arc::new(HttpApiClient::new(&config.api_url, session.clone()));
    let (channel, mut events) = ChatChannel::new(&config.api_url, ReconnectPolicy::default());

    let mut app = App {
        session: session.clone(),
        cache: RoomCache::new(),
        flow: ViewFlow::new(),
        pending: PendingOps::default(),
        channel,
        sync_rooms: SyncRoomsUseCase::new(api.clone()),
        fetch_topics: FetchTopicsUseCase::new(api.clone()),
        room_actions: RoomActionsUseCase::new(api.clone(), session.clone()),
        topic_actions: TopicActionsUseCase::new(api.clone(), session.clone()),
        send_chat: SendChatUseCase::new(session),
    };

    let mut lines = spawn_readline();

    println!("Connected as {} <{}>", config.name, config.email);
    println!("{}", command::HELP);
    app.refresh_rooms().await;

    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(line) => {
                    if !app.handle_line(&line).await {
                        break;
                    }
                }
                None => break,
            },
            event = events.recv() => match event {
                Some(event) => app.handle_channel_event(event),
                None => break,
            },
        }
    }

    app.channel.close().await;
}

/// Read lines with rustyline on a blocking thread; the channel closes
/// on EOF or Ctrl-C.
fn spawn_readline() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                tracing::error!("Failed to initialize line editor: {}", e);
                return;
            }
        };
        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Readline error: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

impl App {
    /// Handle one input line. Returns `false` when the user quits.
    async fn handle_line(&mut self, line: &str) -> bool {
        let in_chat = self.flow.view() == View::Chat;
        let command = match command::parse(line, in_chat) {
            Ok(command) => command,
            Err(command::ParseError::Empty) => return true,
            Err(e) => {
                print_notice(&Notice::warning(e.to_string()));
                return true;
            }
        };

        match command {
            Command::Rooms => self.refresh_rooms().await,
            Command::Enter(key) => self.enter_room(&key).await,
            Command::Topics => self.refresh_topics().await,
            Command::Open(key) => self.open_topic(&key).await,
            Command::Send(text) => self.send_message(&text).await,
            Command::CreateRoom { name, password } => self.create_room(&name, &password).await,
            Command::Join { room_id, password } => self.join_room(&room_id, &password).await,
            Command::Leave => self.leave_room().await,
            Command::DeleteRoom => self.delete_room().await,
            Command::CreateTopic { title, description } => {
                self.create_topic(&title, &description).await
            }
            Command::DeleteTopic(key) => self.delete_topic(&key).await,
            Command::DeleteChat => self.delete_chat().await,
            Command::Promote(email) => self.promote(&email).await,
            Command::Remove(email) => self.remove_member(&email).await,
            Command::Password => self.reveal_password().await,
            Command::Back => {
                let effects = self.flow.back();
                self.apply_effects(effects).await;
                self.print_location();
            }
            Command::Quit => return false,
            Command::Help => println!("{}", command::HELP),
        }
        true
    }

    /// Apply events from the connection driver to the cache and screen
    fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened => {
                print_notice(&Notice::success("Connected to chat"));
            }
            ChannelEvent::Frame(frame) => match dispatch_frame(frame, time::now_millis()) {
                Dispatch::Append(message) => {
                    if let Some(topic_id) = self.flow.topic().cloned() {
                        print_message(&message);
                        self.cache.append_message(&topic_id, message);
                    }
                }
                Dispatch::Notify(notice) => print_notice(&notice),
                Dispatch::Ignore => {}
            },
            ChannelEvent::Reconnecting { delay } => {
                print_notice(&Notice::warning(format!(
                    "Connection lost. Reconnecting in {}s...",
                    delay.as_secs()
                )));
            }
            ChannelEvent::GaveUp => {
                print_notice(&Notice::error(
                    "Could not reconnect to chat. Use 'open' to try again.",
                ));
            }
            ChannelEvent::Closed => {
                tracing::debug!("Chat channel closed");
            }
        }
    }

    async fn apply_effects(&mut self, effects: Vec<FlowEffect>) {
        for effect in effects {
            match effect {
                FlowEffect::CloseChannel => {
                    self.channel.close().await;
                    self.cache.clear_topic_selection();
                }
                FlowEffect::FetchTopics(room_id) => {
                    self.cache.select_room(room_id.clone());
                    self.fetch_and_print_topics(&room_id).await;
                }
                FlowEffect::OpenChannel { room, topic } => {
                    self.open_channel(room, topic).await;
                }
            }
        }
    }

    async fn open_channel(&mut self, room: RoomId, topic: TopicId) {
        let title = self
            .cache
            .room(&room)
            .and_then(|r| r.topic(&topic))
            .map(|t| t.title.clone())
            .unwrap_or_default();
        self.cache.select_topic(topic.clone());
        self.cache.init_log(&topic, &title);

        let token = self.session.token().unwrap_or_default();
        match self.channel.open(room, topic.clone(), &token).await {
            Ok(()) => {
                println!("--- {} ---", title);
                if let Some(log) = self.cache.log(&topic) {
                    for message in log.messages() {
                        print_message(message);
                    }
                }
            }
            Err(e) => {
                print_notice(&Notice::error(e.to_string()));
                let effects = self.flow.back();
                // Channel never opened; only selection needs unwinding
                debug_assert_eq!(effects, vec![FlowEffect::CloseChannel]);
                self.cache.clear_topic_selection();
            }
        }
    }

    async fn refresh_rooms(&mut self) {
        if !self.pending.begin(PendingOp::SyncRooms) {
            return;
        }
        match self.sync_rooms.execute(&mut self.cache).await {
            Ok(count) => {
                println!("You are in {count} room(s):");
                for room in self.cache.rooms() {
                    let marker = if room.is_private { " (private)" } else { "" };
                    println!(
                        "  {} — {}{} [{} member(s)]",
                        room.id,
                        room.name,
                        marker,
                        room.member_count()
                    );
                }
            }
            Err(e) => print_notice(&Notice::error(e.to_string())),
        }
        self.pending.finish(PendingOp::SyncRooms);
    }

    async fn enter_room(&mut self, key: &str) {
        let Some(room) = self.cache.find_room(key) else {
            print_notice(&Notice::warning(format!("No room matches '{key}'")));
            return;
        };
        let room_id = room.id.clone();
        let effects = self.flow.enter_room(room_id);
        self.apply_effects(effects).await;
    }

    async fn refresh_topics(&mut self) {
        let Some(room_id) = self.flow.room().cloned() else {
            print_notice(&Notice::warning("Enter a room first"));
            return;
        };
        self.fetch_and_print_topics(&room_id).await;
    }

    async fn fetch_and_print_topics(&mut self, room_id: &RoomId) {
        if !self.pending.begin(PendingOp::FetchTopics) {
            return;
        }
        match self.fetch_topics.execute(&mut self.cache, room_id).await {
            Ok(true) => self.print_topics(room_id),
            Ok(false) => {}
            Err(e) => print_notice(&Notice::error(e.to_string())),
        }
        self.pending.finish(PendingOp::FetchTopics);
    }

    fn print_topics(&self, room_id: &RoomId) {
        let Some(room) = self.cache.room(room_id) else {
            return;
        };
        println!("Topics in {}:", room.name);
        for topic in &room.topics {
            println!("  {} — {} (by {})", topic.id, topic.title, topic.created_by);
        }
    }

    async fn open_topic(&mut self, key: &str) {
        let Some(topic_id) = self.resolve_topic(key) else {
            print_notice(&Notice::warning(format!("No topic matches '{key}'")));
            return;
        };
        match self.flow.open_topic(topic_id) {
            Ok(effects) => self.apply_effects(effects).await,
            Err(e) => print_notice(&Notice::warning(e.to_string())),
        }
    }

    async fn send_message(&mut self, text: &str) {
        let Some(topic_id) = self.flow.topic().cloned() else {
            print_notice(&Notice::warning("Open a topic first"));
            return;
        };
        let result = self
            .send_chat
            .execute(&mut self.cache, &self.channel, &topic_id, text)
            .await;
        match result {
            Ok(()) => {
                if let Some(message) = self
                    .cache
                    .log(&topic_id)
                    .and_then(|log| log.messages().last())
                {
                    print_message(message);
                }
            }
            Err(e) => print_notice(&Notice::error(e.to_string())),
        }
    }

    async fn create_room(&mut self, name: &str, password: &str) {
        if !self.pending.begin(PendingOp::CreateRoom) {
            return;
        }
        match self.room_actions.create(&mut self.cache, name, password).await {
            Ok(id) => print_notice(&Notice::success(format!("Created room {id}"))),
            Err(e) => print_notice(&notice_for(&e)),
        }
        self.pending.finish(PendingOp::CreateRoom);
    }

    async fn join_room(&mut self, room_id: &str, password: &str) {
        let room_id = match RoomId::new(room_id) {
            Ok(id) => id,
            Err(e) => {
                print_notice(&Notice::warning(e.to_string()));
                return;
            }
        };
        if !self.pending.begin(PendingOp::JoinRoom) {
            return;
        }
        match self
            .room_actions
            .join(&mut self.cache, &room_id, password)
            .await
        {
            Ok(()) => {
                print_notice(&Notice::success(format!("Joined room {room_id}")));
                self.pending.finish(PendingOp::JoinRoom);
                self.refresh_rooms().await;
                return;
            }
            Err(e) => print_notice(&notice_for(&e)),
        }
        self.pending.finish(PendingOp::JoinRoom);
    }

    async fn leave_room(&mut self) {
        let Some(room_id) = self.flow.room().cloned() else {
            print_notice(&Notice::warning("Enter a room first"));
            return;
        };
        if !self.pending.begin(PendingOp::LeaveRoom) {
            return;
        }
        match self.room_actions.leave(&mut self.cache, &room_id).await {
            Ok(()) => {
                let effects = self.flow.reset();
                self.apply_effects(effects).await;
                print_notice(&Notice::success("Left the room"));
            }
            Err(e) => print_notice(&notice_for(&e)),
        }
        self.pending.finish(PendingOp::LeaveRoom);
    }

    async fn delete_room(&mut self) {
        let Some(room_id) = self.flow.room().cloned() else {
            print_notice(&Notice::warning("Enter a room first"));
            return;
        };
        if !self.pending.begin(PendingOp::DeleteRoom) {
            return;
        }
        match self.room_actions.delete(&mut self.cache, &room_id).await {
            Ok(()) => {
                let effects = self.flow.reset();
                self.apply_effects(effects).await;
                print_notice(&Notice::success("Room deleted"));
            }
            Err(e) => print_notice(&notice_for(&e)),
        }
        self.pending.finish(PendingOp::DeleteRoom);
    }

    async fn create_topic(&mut self, title: &str, description: &str) {
        let Some(room_id) = self.flow.room().cloned() else {
            print_notice(&Notice::warning("Enter a room first"));
            return;
        };
        if !self.pending.begin(PendingOp::CreateTopic) {
            return;
        }
        match self
            .topic_actions
            .create(&mut self.cache, &room_id, title, description)
            .await
        {
            Ok(id) => print_notice(&Notice::success(format!("Created topic {id}"))),
            Err(e) => print_notice(&notice_for(&e)),
        }
        self.pending.finish(PendingOp::CreateTopic);
    }

    async fn delete_topic(&mut self, key: &str) {
        let Some(room_id) = self.flow.room().cloned() else {
            print_notice(&Notice::warning("Enter a room first"));
            return;
        };
        let Some(topic_id) = self.resolve_topic(key) else {
            print_notice(&Notice::warning(format!("No topic matches '{key}'")));
            return;
        };
        if !self.pending.begin(PendingOp::DeleteTopic) {
            return;
        }
        let was_open = self.flow.topic() == Some(&topic_id);
        match self
            .topic_actions
            .delete(&mut self.cache, &room_id, &topic_id)
            .await
        {
            Ok(()) => {
                if was_open {
                    let effects = self.flow.back();
                    self.apply_effects(effects).await;
                }
                print_notice(&Notice::success("Topic deleted"));
            }
            Err(e) => print_notice(&notice_for(&e)),
        }
        self.pending.finish(PendingOp::DeleteTopic);
    }

    async fn delete_chat(&mut self) {
        let (Some(room_id), Some(topic_id)) =
            (self.flow.room().cloned(), self.flow.topic().cloned())
        else {
            print_notice(&Notice::warning("Open a topic first"));
            return;
        };
        if !self.pending.begin(PendingOp::DeleteChat) {
            return;
        }
        match self
            .topic_actions
            .delete_chat(&mut self.cache, &room_id, &topic_id)
            .await
        {
            Ok(()) => print_notice(&Notice::success("Chat history cleared")),
            Err(e) => print_notice(&notice_for(&e)),
        }
        self.pending.finish(PendingOp::DeleteChat);
    }

    async fn promote(&mut self, email: &str) {
        let Some(room_id) = self.flow.room().cloned() else {
            print_notice(&Notice::warning("Enter a room first"));
            return;
        };
        if !self.pending.begin(PendingOp::MakeAdmin) {
            return;
        }
        match self
            .room_actions
            .make_admin(&mut self.cache, &room_id, email)
            .await
        {
            Ok(()) => print_notice(&Notice::success(format!("{email} is now an admin"))),
            Err(e) => print_notice(&notice_for(&e)),
        }
        self.pending.finish(PendingOp::MakeAdmin);
    }

    async fn remove_member(&mut self, email: &str) {
        let Some(room_id) = self.flow.room().cloned() else {
            print_notice(&Notice::warning("Enter a room first"));
            return;
        };
        if !self.pending.begin(PendingOp::RemoveUser) {
            return;
        }
        match self
            .room_actions
            .remove_user(&mut self.cache, &room_id, email)
            .await
        {
            Ok(()) => print_notice(&Notice::success(format!("Removed {email} from the room"))),
            Err(e) => print_notice(&notice_for(&e)),
        }
        self.pending.finish(PendingOp::RemoveUser);
    }

    async fn reveal_password(&mut self) {
        let Some(room_id) = self.flow.room().cloned() else {
            print_notice(&Notice::warning("Enter a room first"));
            return;
        };
        if !self.pending.begin(PendingOp::RevealPassword) {
            return;
        }
        match self.room_actions.reveal_password(&self.cache, &room_id).await {
            Ok(password) => print_notice(&Notice::info(format!("Room password: {password}"))),
            Err(e) => print_notice(&notice_for(&e)),
        }
        self.pending.finish(PendingOp::RevealPassword);
    }

    fn resolve_topic(&self, key: &str) -> Option<TopicId> {
        let room = self.cache.room(self.flow.room()?)?;
        room.topics
            .iter()
            .find(|t| t.id.as_str() == key || t.title.eq_ignore_ascii_case(key))
            .map(|t| t.id.clone())
    }

    fn print_location(&self) {
        match self.flow.view() {
            View::RoomsList => println!("(rooms list)"),
            View::TopicsList => {
                if let Some(room_id) = self.flow.room() {
                    self.print_topics(room_id);
                }
            }
            View::Chat => {}
        }
    }
}

fn print_notice(notice: &Notice) {
    println!("{notice}");
}

fn print_message(message: &ChatMessage) {
    println!(
        "[{}] {}: {}",
        time::format_clock(message.timestamp),
        message.sender,
        message.text
    );
}

/// Pick the notice level matching the error taxonomy: guard blocks are
/// warnings, everything else an error.
fn notice_for(error: &UseCaseError) -> Notice {
    match error {
        UseCaseError::Blocked(_)
        | UseCaseError::Domain(_)
        | UseCaseError::Invalid(_)
        | UseCaseError::UnknownRoom(_)
        | UseCaseError::UnknownTopic(_) => Notice::warning(error.to_string()),
        _ => Notice::error(error.to_string()),
    }
}
