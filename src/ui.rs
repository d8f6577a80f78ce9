use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use crossterm::{
    event::{
        self,
        Event,
        KeyCode,
        KeyEventKind,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use monster_arena::{
    character::CharacterNft,
    machine::{
        Phase,
        View,
    },
    surface::UiSurface,
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::{
    io::stdout,
    sync::{
        Arc,
        atomic::{
            AtomicBool,
            Ordering,
        },
    },
    time::{
        Duration,
        Instant,
    },
};
use tokio::sync::mpsc;

const INPUT_POLL: Duration = Duration::from_millis(50);
const PARK_TIMEOUT: Duration = Duration::from_millis(200);

#[derive(Debug, PartialEq, Eq)]
pub enum UserEvent {
    Connect,
    DismissAlert,
    Quit,
    Redraw,
}

pub type InputEventReceiver = mpsc::UnboundedReceiver<std::io::Result<Event>>;

#[derive(Debug, Default)]
struct GateState {
    paused: AtomicBool,
    parked: AtomicBool,
    reader: AtomicBool,
}

/// Shared switch that hands the terminal to a password prompt. While paused
/// the input thread stops reading keys and `draw` does nothing.
#[derive(Clone, Debug, Default)]
pub struct InputGate(Arc<GateState>);

impl InputGate {
    /// Returns once the input thread has stopped polling stdin, so every
    /// keystroke after this reaches the prompt.
    pub fn pause(&self) -> PausedInput {
        self.0.paused.store(true, Ordering::SeqCst);
        let deadline = Instant::now() + PARK_TIMEOUT;
        while self.0.reader.load(Ordering::SeqCst)
            && !self.0.parked.load(Ordering::SeqCst)
            && Instant::now() < deadline
        {
            std::thread::sleep(Duration::from_millis(1));
        }
        PausedInput(self.clone())
    }

    pub fn is_paused(&self) -> bool {
        self.0.paused.load(Ordering::SeqCst)
    }

    fn register_reader(&self, active: bool) {
        self.0.reader.store(active, Ordering::SeqCst);
    }

    /// Reader side: parks for one poll interval while paused. `parked` is
    /// cleared before `paused` is read so `pause` never sees a stale park.
    fn hold_if_paused(&self) -> bool {
        self.0.parked.store(false, Ordering::SeqCst);
        if !self.is_paused() {
            return false;
        }
        self.0.parked.store(true, Ordering::SeqCst);
        std::thread::sleep(INPUT_POLL);
        true
    }
}

pub struct PausedInput(InputGate);

impl Drop for PausedInput {
    fn drop(&mut self) {
        self.0.0.paused.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct UiState {
    mode: Mode,
    network: String,
    gate: InputGate,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl UiState {
    pub fn new(network: impl Into<String>, gate: InputGate) -> Self {
        Self {
            mode: Mode::Normal,
            network: network.into(),
            gate,
            terminal: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    QuitModal,
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    suspend()?;
    Ok(())
}

/// Leaves raw mode and the alternate screen so a line prompt can run.
pub fn suspend() -> std::io::Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::event::DisableMouseCapture,
        crossterm::terminal::LeaveAlternateScreen
    )
}

pub fn resume() -> std::io::Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )
}

/// Forces a full repaint on the next draw.
pub fn terminal_clear(state: &mut UiState) -> Result<()> {
    if let Some(term) = state.terminal.as_mut() {
        term.clear()?;
    }
    Ok(())
}

/// Reads terminal events on a dedicated thread so the async loop never blocks
/// on stdin.
pub fn input_event_stream(gate: InputGate) -> InputEventReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    gate.register_reader(true);
    std::thread::spawn(move || {
        loop {
            if gate.hold_if_paused() {
                continue;
            }
            match event::poll(INPUT_POLL) {
                Ok(false) => continue,
                Ok(true) if gate.is_paused() => continue,
                Ok(true) => {
                    if tx.send(event::read()).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                }
            }
        }
        gate.register_reader(false);
    });
    rx
}

pub async fn next_raw_event(events: &mut InputEventReceiver) -> Result<Event> {
    let event = events
        .recv()
        .await
        .ok_or_else(|| eyre!("terminal input closed"))?;
    event.wrap_err("failed to read terminal input")
}

pub fn interpret_event(state: &mut UiState, view: &View, event: Event) -> Option<UserEvent> {
    let Event::Key(key) = event else {
        return matches!(event, Event::Resize(..)).then_some(UserEvent::Redraw);
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if state.mode == Mode::QuitModal {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        };
    }
    if view.alert.is_some() {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc => Some(UserEvent::DismissAlert),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.mode = Mode::QuitModal;
            Some(UserEvent::Redraw)
        }
        KeyCode::Char('c') if view.surface == UiSurface::ConnectPrompt => {
            Some(UserEvent::Connect)
        }
        _ => None,
    }
}

pub fn draw(state: &mut UiState, view: &View) -> Result<()> {
    if state.gate.is_paused() {
        return Ok(());
    }
    if let Some(mut term) = state.terminal.take() {
        let drawn = term.draw(|f| ui(f, state, view)).map(|_| ());
        state.terminal = Some(term);
        drawn?;
    }
    Ok(())
}

fn ui(f: &mut Frame, state: &UiState, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_header(f, chunks[0], state, view);
    match view.surface {
        UiSurface::Loading => draw_loading(f, chunks[1]),
        UiSurface::ConnectPrompt => draw_connect(f, chunks[1]),
        UiSurface::CharacterSelect => draw_character_select(f, chunks[1], view),
        UiSurface::Arena => draw_arena(f, chunks[1], view),
    }
    draw_footer(f, chunks[2], view);
    draw_modals(f, state, view);
}

fn draw_header(f: &mut Frame, area: Rect, state: &UiState, view: &View) {
    let title = Line::from(vec![
        Span::styled("Monster Arena", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}  ", view.surface.title())),
        Span::styled(state.network.clone(), Style::default().fg(Color::DarkGray)),
    ]);
    let block = Block::default().borders(Borders::ALL);
    f.render_widget(Paragraph::new(title).block(block), area);
}

fn draw_loading(f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Loading");
    let p = Paragraph::new("Looking for an authorized wallet...")
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(p, area);
}

fn draw_connect(f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Wallet");
    let lines = vec![
        Line::from("Connect a wallet to enter the arena."),
        Line::from(""),
        Line::styled("Press c to connect", Style::default().fg(Color::Yellow)),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(block);
    f.render_widget(p, area);
}

fn draw_character_select(f: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().borders(Borders::ALL).title("Choose a character");
    let line = if view.phase == Phase::Resolving {
        Line::styled(
            "Checking the arena for your character...",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Line::from("This account has no character yet.")
    };
    let p = Paragraph::new(line).alignment(Alignment::Center).block(block);
    f.render_widget(p, area);
}

fn draw_arena(f: &mut Frame, area: Rect, view: &View) {
    let Some(character) = view.character.as_ref() else {
        return;
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Arena: {}", character.name));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let details = vec![
        Line::from(format!("#{} {}", character.id, character.name)),
        Line::styled(character.image_uri.clone(), Style::default().fg(Color::DarkGray)),
        Line::from(format!("Attack damage: {}", character.attack_damage)),
    ];
    f.render_widget(Paragraph::new(details), rows[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("HP"))
        .gauge_style(Style::default().fg(hp_color(character)))
        .ratio(hp_ratio(character))
        .label(format!("{}/{}", character.hp, character.max_hp));
    f.render_widget(gauge, rows[1]);
}

fn hp_ratio(character: &CharacterNft) -> f64 {
    if character.max_hp == 0 {
        return 0.0;
    }
    (f64::from(character.hp) / f64::from(character.max_hp)).clamp(0.0, 1.0)
}

fn hp_color(character: &CharacterNft) -> Color {
    match hp_ratio(character) {
        r if r > 0.5 => Color::Green,
        r if r > 0.2 => Color::Yellow,
        _ => Color::Red,
    }
}

fn draw_footer(f: &mut Frame, area: Rect, view: &View) {
    let account = view
        .account
        .as_ref()
        .map(|a| a.short())
        .unwrap_or_else(|| "not connected".to_string());
    let character = view
        .character
        .as_ref()
        .map(|c| format!("{} ({}/{} HP)", c.name, c.hp, c.max_hp))
        .unwrap_or_else(|| "-".to_string());
    let help = match view.surface {
        UiSurface::ConnectPrompt => "c connect  q quit",
        _ => "q quit",
    };
    let line = Line::from(vec![
        Span::styled(format!("{:?}", view.phase), Style::default().fg(Color::Cyan)),
        Span::raw(format!("  account: {account}  character: {character}  ")),
        Span::styled(help, Style::default().fg(Color::DarkGray)),
    ]);
    let block = Block::default().borders(Borders::ALL).title("Status");
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_modals(f: &mut Frame, state: &UiState, view: &View) {
    if let Some(alert) = view.alert.as_deref() {
        let area = centered_rect(50, 25, f.area());
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Wallet")
            .border_style(Style::default().fg(Color::Red));
        let lines = vec![
            Line::from(alert.to_string()),
            Line::from(""),
            Line::styled("Enter to dismiss", Style::default().fg(Color::DarkGray)),
        ];
        f.render_widget(Clear, area);
        f.render_widget(block.clone(), area);
        f.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }),
            block.inner(area),
        );
    }
    if state.mode == Mode::QuitModal {
        let area = centered_rect(40, 20, f.area());
        let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
        let p = Paragraph::new("Leave the arena? (Y/N)");
        f.render_widget(Clear, area);
        f.render_widget(block.clone(), area);
        f.render_widget(p, block.inner(area));
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

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crossterm::event::{
        KeyEvent,
        KeyModifiers,
    };

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn view(surface: UiSurface, alert: Option<&str>) -> View {
        View {
            surface,
            phase: Phase::ConnectPrompt,
            account: None,
            character: None,
            alert: alert.map(str::to_owned),
        }
    }

    #[test]
    fn interpret_event__connect_only_on_connect_prompt() {
        let mut state = UiState::default();

        assert_eq!(
            interpret_event(&mut state, &view(UiSurface::ConnectPrompt, None), key(KeyCode::Char('c'))),
            Some(UserEvent::Connect)
        );
        assert_eq!(
            interpret_event(&mut state, &view(UiSurface::Arena, None), key(KeyCode::Char('c'))),
            None
        );
    }

    #[test]
    fn interpret_event__alert_swallows_keys_until_dismissed() {
        let mut state = UiState::default();
        let alerted = view(UiSurface::ConnectPrompt, Some("No wallet found"));

        assert_eq!(interpret_event(&mut state, &alerted, key(KeyCode::Char('c'))), None);
        assert_eq!(
            interpret_event(&mut state, &alerted, key(KeyCode::Enter)),
            Some(UserEvent::DismissAlert)
        );
    }

    #[test]
    fn interpret_event__quit_requires_confirmation() {
        // given
        let mut state = UiState::default();
        let v = view(UiSurface::ConnectPrompt, None);

        // when
        let opened = interpret_event(&mut state, &v, key(KeyCode::Char('q')));
        let declined = interpret_event(&mut state, &v, key(KeyCode::Char('n')));
        interpret_event(&mut state, &v, key(KeyCode::Char('q')));
        let confirmed = interpret_event(&mut state, &v, key(KeyCode::Char('y')));

        // then
        assert_eq!(opened, Some(UserEvent::Redraw));
        assert_eq!(declined, Some(UserEvent::Redraw));
        assert_eq!(confirmed, Some(UserEvent::Quit));
    }

    #[test]
    fn input_gate__resumes_when_pause_guard_drops() {
        let gate = InputGate::default();
        {
            let _paused = gate.pause();
            assert!(gate.is_paused());
        }
        assert!(!gate.is_paused());
    }

    #[test]
    fn input_gate__pause_waits_for_reader_to_park() {
        // given: a reader thread that is between polls when the pause lands
        let gate = InputGate::default();
        gate.register_reader(true);
        let reader = gate.clone();
        let handle = std::thread::spawn(move || {
            while !reader.hold_if_paused() {
                std::thread::sleep(Duration::from_millis(20));
            }
        });

        // when
        let paused = gate.pause();

        // then
        assert!(gate.0.parked.load(Ordering::SeqCst));
        drop(paused);
        handle.join().unwrap();
        assert!(!gate.is_paused());
    }
}
