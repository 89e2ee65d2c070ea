use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::{io, time::Duration};
use textwrap::wrap;
use tui_input::{backend::crossterm::EventHandler, Input};

use socialnetwork::format::{attachment_label, format_date_time};
use socialnetwork::views::{ChatListView, ChatView, ProfileDirectory};

// Export types needed by main module
pub use ratatui::backend::CrosstermBackend;
pub use ratatui::Terminal;

/// What the user asked for; the main loop carries it out against the views
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Quit,
    SelectNext,
    SelectPrevious,
    OpenSelected,
    Send(String),
    Accept,
    DeleteConfirmed,
    ShowProfiles,
    RequestChat,
    Reload,
    CycleSort,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Focus {
    Chats,
    Messages,
}

pub struct ChatUI {
    input: Input,
    focus: Focus,
    status: Option<String>,
    help_dialog: bool,
    delete_dialog: bool,
    profile_dialog: bool,
}

impl ChatUI {
    pub fn new() -> Self {
        ChatUI {
            input: Input::default(),
            focus: Focus::Chats,
            status: None,
            help_dialog: false,
            delete_dialog: false,
            profile_dialog: false,
        }
    }

    pub fn clear_input(&mut self) {
        self.input.reset();
    }

    pub fn focus_messages(&mut self) {
        self.focus = Focus::Messages;
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = Some(status.to_string());
    }

    pub fn show_profiles(&mut self) {
        self.profile_dialog = true;
    }

    pub fn close_profiles(&mut self) {
        self.profile_dialog = false;
    }

    /// Up/Down go to the profile list while it is shown
    pub fn is_profiles_open(&self) -> bool {
        self.profile_dialog
    }

    pub fn handle_input(&mut self) -> Result<Option<UiAction>> {
        if !event::poll(Duration::from_millis(50))? {
            return Ok(None);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(None);
        }

        // Dialogs swallow every key they don't handle
        if self.help_dialog {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.help_dialog = false;
            }
            return Ok(None);
        }
        if self.delete_dialog {
            return Ok(self.handle_delete_dialog(key));
        }
        if self.profile_dialog {
            return Ok(self.handle_profile_dialog(key));
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Esc => Some(UiAction::Quit),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Chats => Focus::Messages,
                    Focus::Messages => Focus::Chats,
                };
                None
            }
            KeyCode::Char('a') if ctrl => Some(UiAction::Accept),
            KeyCode::Char('d') if ctrl => {
                self.delete_dialog = true;
                None
            }
            KeyCode::Char('p') if ctrl => Some(UiAction::ShowProfiles),
            KeyCode::Char('r') if ctrl => Some(UiAction::Reload),
            KeyCode::Char('s') if ctrl => Some(UiAction::CycleSort),
            KeyCode::Char('h') if ctrl => {
                self.help_dialog = true;
                None
            }
            KeyCode::Up if self.focus == Focus::Chats => Some(UiAction::SelectPrevious),
            KeyCode::Down if self.focus == Focus::Chats => Some(UiAction::SelectNext),
            KeyCode::Enter => match self.focus {
                Focus::Chats => Some(UiAction::OpenSelected),
                Focus::Messages => {
                    let text = self.input.value().trim().to_string();
                    (!text.is_empty()).then_some(UiAction::Send(text))
                }
            },
            _ => {
                if self.focus == Focus::Messages {
                    self.input.handle_event(&Event::Key(key));
                }
                None
            }
        };

        if let Some(action) = &action {
            debug!("UI action: {:?}", action);
            self.status = None;
        }
        Ok(action)
    }

    fn handle_delete_dialog(&mut self, key: KeyEvent) -> Option<UiAction> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.delete_dialog = false;
                Some(UiAction::DeleteConfirmed)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.delete_dialog = false;
                None
            }
            _ => None,
        }
    }

    fn handle_profile_dialog(&mut self, key: KeyEvent) -> Option<UiAction> {
        match key.code {
            KeyCode::Esc => {
                self.profile_dialog = false;
                None
            }
            KeyCode::Up => Some(UiAction::SelectPrevious),
            KeyCode::Down => Some(UiAction::SelectNext),
            KeyCode::Enter => Some(UiAction::RequestChat),
            _ => None,
        }
    }

    pub fn draw<B: Backend>(
        &self,
        frame: &mut Frame<B>,
        chats: &ChatListView,
        open: Option<&ChatView>,
        profiles: &ProfileDirectory,
    ) {
        let size = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25), // Chat list
                Constraint::Percentage(75), // Open chat
            ])
            .split(size);

        let chat_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),    // Messages area
                Constraint::Length(3), // Input box
                Constraint::Length(1), // Help line
            ])
            .split(chunks[1]);

        draw_chat_list(frame, chats, open, chunks[0], self.focus == Focus::Chats);

        match open {
            Some(view) => draw_messages(frame, view, chat_chunks[0]),
            None => {
                let hint = Paragraph::new("Select a chat and press Enter")
                    .style(Style::default().fg(Color::Gray))
                    .block(Block::default().borders(Borders::ALL).title("Messages"));
                frame.render_widget(hint, chat_chunks[0]);
            }
        }

        let input_block = Block::default()
            .title("Message")
            .borders(Borders::ALL)
            .border_style(focus_style(self.focus == Focus::Messages));
        let input_widget = Paragraph::new(self.input.value()).block(input_block);
        frame.render_widget(input_widget, chat_chunks[1]);

        let help = match &self.status {
            Some(status) => Line::from(Span::styled(status.as_str(), Style::default().fg(Color::Yellow))),
            None => Line::from(Span::styled(
                "ESC quit | TAB switch | Enter open/send | Ctrl+A accept | Ctrl+D delete | Ctrl+P profiles | Ctrl+H help",
                Style::default().fg(Color::Gray),
            )),
        };
        frame.render_widget(Paragraph::new(help), chat_chunks[2]);

        if self.focus == Focus::Messages {
            frame.set_cursor(
                chat_chunks[1].x + self.input.cursor() as u16 + 1,
                chat_chunks[1].y + 1,
            );
        }

        if self.delete_dialog {
            let label = chats
                .selected_chat()
                .map(|c| c.label())
                .unwrap_or_else(|| "nothing selected".to_string());
            draw_delete_dialog(frame, &label, size);
        }
        if self.profile_dialog {
            draw_profile_dialog(frame, profiles, size);
        }
        if self.help_dialog {
            draw_help_dialog(frame, size);
        }
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_chat_list<B: Backend>(
    f: &mut Frame<B>,
    view: &ChatListView,
    open: Option<&ChatView>,
    area: Rect,
    focused: bool,
) {
    let open_id = open.map(|v| v.chat_id());
    let items: Vec<ListItem> = view
        .chats()
        .iter()
        .enumerate()
        .map(|(i, chat)| {
            let cursor = if i == view.selected_index() { ">" } else { " " };
            let marker = if chat.is_accepted() { "✓" } else { "…" };
            let style = if chat.id.is_some() && chat.id == open_id {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{} {} {}", cursor, marker, chat.label())).style(style)
        })
        .collect();

    let title = format!("Chats [{}]", view.sort_state());
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(focus_style(focused)),
    );
    f.render_widget(list, area);
}

fn draw_messages<B: Backend>(f: &mut Frame<B>, view: &ChatView, area: Rect) {
    let wrap_width = area.width.saturating_sub(2).max(1) as usize; // Account for borders

    let items: Vec<ListItem> = view
        .messages()
        .iter()
        .flat_map(|m| {
            let own = view.is_own_message(m);
            let time = m.time.as_ref().map(format_date_time).unwrap_or_default();
            let sender = if own {
                "You"
            } else {
                m.sender_name.as_deref().unwrap_or("?")
            };
            let full_content = format!("[{}] {}: {}", time, sender, m.content.as_deref().unwrap_or(""));

            let wrapped: Vec<String> = wrap(&full_content, wrap_width)
                .into_iter()
                .map(|l| l.into_owned())
                .collect();

            let style = if own {
                Style::default().fg(Color::Blue)
            } else {
                Style::default()
            };
            wrapped
                .into_iter()
                .map(move |line| ListItem::new(Text::from(line)).style(style))
        })
        .collect();

    let mut title = view.chat().label();
    if view.can_accept() {
        title.push_str(" (pending, Ctrl+A to accept)");
    } else if !view.chat().is_accepted() {
        title.push_str(" (waiting for acceptance)");
    }
    let stats = view.poll_stats();
    if stats.failed > 0 {
        title.push_str(&format!(" [{} of {} refreshes failed]", stats.failed, stats.issued));
    }

    // Keep the newest message in view
    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(items.len() - 1));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default());
    f.render_stateful_widget(list, area, &mut list_state);
}

// Centered popup area, clamped to the frame
fn popup_area(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

fn draw_popup<B: Backend>(f: &mut Frame<B>, title: &str, color: Color, popup: Rect, lines: Vec<ListItem>) {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    f.render_widget(Clear, popup);
    f.render_widget(block, popup);

    let inner = popup.inner(&Margin {
        vertical: 1,
        horizontal: 2,
    });
    f.render_widget(List::new(lines), inner);
}

fn draw_delete_dialog<B: Backend>(f: &mut Frame<B>, label: &str, area: Rect) {
    let lines = vec![
        ListItem::new(format!("Delete chat {}?", label)),
        ListItem::new(""),
        ListItem::new("Its messages are deleted with it."),
        ListItem::new(""),
        ListItem::new("Press [Y] to confirm or [N]/[ESC] to cancel"),
    ];
    draw_popup(f, "Confirm Delete", Color::Red, popup_area(60, 9, area), lines);
}

fn draw_profile_dialog<B: Backend>(f: &mut Frame<B>, directory: &ProfileDirectory, area: Rect) {
    let mut lines: Vec<ListItem> = directory
        .profiles()
        .iter()
        .enumerate()
        .map(|(i, profile)| {
            let cursor = if i == directory.selected_index() { ">" } else { " " };
            let friend = if directory.is_friend(profile) { " (friend)" } else { "" };
            let status = profile.status.as_deref().unwrap_or("");
            let picture = attachment_label(profile.picture.as_deref(), profile.picture_content_type.as_deref())
                .map(|label| format!("  [picture: {}]", label))
                .unwrap_or_default();
            ListItem::new(format!(
                "{} {}{}  {}{}",
                cursor,
                profile.display_name(),
                friend,
                status,
                picture
            ))
        })
        .collect();
    if lines.is_empty() {
        lines.push(ListItem::new("No other profiles yet"));
    }
    lines.push(ListItem::new(""));
    lines.push(ListItem::new("[Enter] request a chat  [ESC] close").style(Style::default().fg(Color::Gray)));

    draw_popup(f, "Profiles", Color::Cyan, popup_area(70, 20, area), lines);
}

fn draw_help_dialog<B: Backend>(f: &mut Frame<B>, area: Rect) {
    let lines = [
        "Navigation",
        "  TAB        switch between chat list and message input",
        "  Up/Down    select a chat",
        "  Enter      open the selected chat / send the message",
        "  ESC        quit",
        "",
        "Chats",
        "  Ctrl+A     accept the selected chat request",
        "  Ctrl+D     delete the selected chat",
        "  Ctrl+P     browse profiles and request a chat",
        "  Ctrl+R     reload the chat list",
        "  Ctrl+S     change the sort order",
        "",
        "Press ESC or Enter to close",
    ]
    .iter()
    .map(|s| ListItem::new(*s))
    .collect();

    draw_popup(f, "Help", Color::Green, popup_area(70, 18, area), lines);
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
