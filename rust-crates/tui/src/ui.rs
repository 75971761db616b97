use crate::{
    client::{
        AppSnapshot,
        Tone,
    },
    contract::Approval,
    game::Move,
    provider::Unlock,
};
use color_eyre::eyre::{
    Result,
    eyre,
};
use crossterm::{
    event::{
        Event,
        EventStream,
        KeyCode,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use futures::StreamExt;
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::{
    fmt,
    io::stdout,
};

pub type InputEvents = EventStream;

#[derive(Debug, Eq, PartialEq)]
pub enum UserEvent {
    Quit,
    Redraw,
    RequestConnect,
    Connect(Unlock),
    RefreshHistory,
    NextMove,
    PrevMove,
    ChooseMove(Move),
    SubmitMove { mv: Move, approval: Approval },
    Reload,
}

#[derive(Debug)]
pub struct UiState {
    mode: Mode,
    selected_move: Move,
    loading: bool,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            mode: Mode::Normal,
            selected_move: Move::Rock,
            loading: false,
            terminal: None,
        }
    }
}

impl UiState {
    /// Forget modals and cached state; the terminal stays.
    pub fn reset(&mut self) {
        self.mode = Mode::Normal;
        self.selected_move = Move::Rock;
        self.loading = false;
    }
}

#[derive(Clone, Debug, Default)]
enum Mode {
    #[default]
    Normal,
    UnlockPrompt(PasswordInput),
    ConfirmMove(Move),
    QuitModal,
}

#[derive(Clone, Default)]
struct PasswordInput {
    buffer: String,
}

impl fmt::Debug for PasswordInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordInput({} chars)", self.buffer.chars().count())
    }
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn input_event_stream() -> InputEvents {
    EventStream::new()
}

pub async fn next_raw_event(events: &mut InputEvents) -> Result<Event> {
    match events.next().await {
        Some(event) => Ok(event?),
        None => Err(eyre!("terminal input stream closed")),
    }
}

pub fn open_unlock_prompt(state: &mut UiState) {
    state.mode = Mode::UnlockPrompt(PasswordInput::default());
}

pub fn open_move_confirmation(state: &mut UiState, mv: Move) {
    state.mode = Mode::ConfirmMove(mv);
    state.loading = true;
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    state.selected_move = snap.selected_move;
    state.loading = snap.loading;
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

/// Turns a raw terminal event into an action. Modals get the key first;
/// outside them everything is ignored while a move is pending.
pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    let k = match event {
        Event::Key(k) => k,
        Event::Resize(..) => return Some(UserEvent::Redraw),
        _ => return None,
    };
    if k.kind != KeyEventKind::Press {
        return None;
    }
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return Some(UserEvent::Quit);
    }

    match &mut state.mode {
        Mode::UnlockPrompt(input) => {
            return match k.code {
                KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Connect(Unlock::Declined))
                }
                KeyCode::Enter => {
                    let password = std::mem::take(&mut input.buffer);
                    state.mode = Mode::Normal;
                    Some(UserEvent::Connect(Unlock::Password(password)))
                }
                KeyCode::Backspace => {
                    input.buffer.pop();
                    Some(UserEvent::Redraw)
                }
                KeyCode::Char(c) => {
                    input.buffer.push(c);
                    Some(UserEvent::Redraw)
                }
                _ => None,
            };
        }
        Mode::ConfirmMove(mv) => {
            let mv = *mv;
            let approval = match k.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    Approval::Granted
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    Approval::Declined
                }
                _ => return None,
            };
            state.mode = Mode::Normal;
            return Some(UserEvent::SubmitMove { mv, approval });
        }
        Mode::QuitModal => {
            return match k.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                _ => None,
            };
        }
        Mode::Normal => {}
    }

    if state.loading {
        return None;
    }
    let ev = match k.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.mode = Mode::QuitModal;
            UserEvent::Redraw
        }
        KeyCode::Char('c') => UserEvent::RequestConnect,
        KeyCode::Char('r') => UserEvent::RefreshHistory,
        KeyCode::Char('R') => UserEvent::Reload,
        KeyCode::Right | KeyCode::Char('l') => UserEvent::NextMove,
        KeyCode::Left | KeyCode::Char('h') => UserEvent::PrevMove,
        KeyCode::Char('1') => UserEvent::ChooseMove(Move::Rock),
        KeyCode::Char('2') => UserEvent::ChooseMove(Move::Paper),
        KeyCode::Char('3') => UserEvent::ChooseMove(Move::Scissors),
        KeyCode::Enter => UserEvent::ChooseMove(state.selected_move),
        _ => return None,
    };
    Some(ev)
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header
            Constraint::Length(3), // wallet
            Constraint::Length(3), // notice
            Constraint::Length(5), // moves
            Constraint::Min(5),    // history
            Constraint::Length(3), // help
        ])
        .split(f.area());

    draw_header(f, chunks[0], snap);
    draw_wallet_panel(f, chunks[1], snap);
    draw_notice(f, chunks[2], snap);
    draw_moves(f, chunks[3], snap);
    draw_history(f, chunks[4], snap);
    draw_help(f, chunks[5], snap);
    draw_modals(f, state);
}

fn draw_header(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let lines = vec![
        Line::from(format!("Network: {}", snap.network)),
        Line::from(format!("Contract: {}", snap.contract_id)),
    ];
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Rock Paper Scissors on Fuel"),
    );
    f.render_widget(widget, area);
}

fn draw_wallet_panel(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let text = match (&snap.wallet_label, &snap.account) {
        (None, _) => "No wallet found (create one with forc-wallet, then press R)".to_string(),
        (Some(label), None) => format!("Wallet: {label} | not connected (press c)"),
        (Some(label), Some(account)) => format!("Wallet: {label} | Account: {account}"),
    };
    let widget = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Wallet"));
    f.render_widget(widget, area);
}

fn draw_notice(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let (text, style) = match &snap.notice {
        Some(notice) => (
            notice.to_string(),
            Style::default().fg(tone_color(notice.tone())),
        ),
        None => ("Ready".to_string(), Style::default()),
    };
    let title = if snap.loading { "Status (pending)" } else { "Status" };
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(style);
    f.render_widget(widget, area);
}

fn draw_moves(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);
    for (i, mv) in Move::ALL.iter().enumerate() {
        let selected = *mv == snap.selected_move;
        let mut border = Style::default();
        if snap.loading {
            border = border.fg(Color::DarkGray);
        } else if selected {
            border = border.fg(Color::Cyan).add_modifier(Modifier::BOLD);
        }
        let marker = if selected { ">" } else { " " };
        let widget = Paragraph::new(vec![
            Line::from(format!("{marker} {mv}")),
            Line::from(format!("key {}", i + 1)),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border));
        f.render_widget(widget, cols[i]);
    }
}

fn draw_history(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let title = format!("History ({})", snap.history.len());
    let widget = Paragraph::new(history_lines(snap))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(widget, area);
}

fn history_lines(snap: &AppSnapshot) -> Vec<Line<'static>> {
    if snap.account.is_none() {
        return vec![Line::from("Connect a wallet to see your games.")];
    }
    if snap.history.is_empty() {
        return vec![Line::from("No games played yet.")];
    }
    snap.history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let mut text = format!(
                "#{} {} | {}",
                snap.history.len() - i,
                entry.move_label(),
                entry.result
            );
            if let Some(at) = entry.played_at_local() {
                text.push_str(&format!(" | {at}"));
            }
            Line::from(text)
        })
        .collect()
}

fn draw_help(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let text = if snap.loading {
        "Waiting for the transaction..."
    } else {
        "c connect | 1/2/3 play | ←/→ + Enter play selected | r refresh | R reload | q quit"
    };
    let help =
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    let (title, body) = match &state.mode {
        Mode::UnlockPrompt(input) => (
            "Unlock Wallet",
            format!(
                "Password: {}\nEnter=approve Esc=decline",
                masked(&input.buffer)
            ),
        ),
        Mode::ConfirmMove(mv) => (
            "Confirm Transaction",
            format!("Play {mv} (selector {})?\ny=approve n/Esc=decline", mv.selector()),
        ),
        Mode::QuitModal => ("Confirm Quit", "Quit the game? (Y/N)".to_string()),
        Mode::Normal => return,
    };
    let area = centered_rect(50, 25, f.area());
    let block = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(Clear, area);
    f.render_widget(block.clone(), area);
    f.render_widget(Paragraph::new(body), block.inner(area));
}

fn masked(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Info => Color::Yellow,
        Tone::Success => Color::Green,
        Tone::Declined => Color::Magenta,
        Tone::Error => Color::Red,
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1])[1]
}
