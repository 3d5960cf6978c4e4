use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use fincalc::keypad::{self, KeyFace};
use fincalc::numeric::format_number;
use fincalc::{Calculator, InputMode, Key, Operator, Register, UiSettings};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};

const BEZEL_GOLD: Color = Color::Rgb(0xD4, 0xAF, 0x37);
const LCD_GREY: Color = Color::Rgb(0xC0, 0xC7, 0xC1);
const KEY_BLACK: Color = Color::Rgb(0x26, 0x26, 0x26);
const FACE_ORANGE: Color = Color::Rgb(0xF9, 0x73, 0x16);
const FACE_BLUE: Color = Color::Rgb(0x60, 0xA5, 0xFA);
const SHIFT_GOLD: Color = Color::Rgb(0xD4, 0x80, 0x4D);
const SHIFT_TEAL: Color = Color::Rgb(0x4D, 0x8B, 0x9E);

pub struct App {
    pub calculator: Calculator,
    settings: UiSettings,
    /// Where the keypad was last drawn, for mouse hit-testing.
    keypad_area: Rect,
    last_key: Option<Key>,
}

impl App {
    pub fn new(settings: UiSettings) -> Self {
        Self {
            calculator: Calculator::new(),
            settings,
            keypad_area: Rect::default(),
            last_key: None,
        }
    }

    fn press(&mut self, key: Key) {
        self.calculator.press(key);
        self.last_key = Some(key);
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, &mut app))?;

        match event::read()? {
            Event::Key(key) => {
                if handle_key_input(&mut app, key) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => handle_mouse_input(&mut app, mouse),
            _ => {}
        }
    }
}

/// Returns true when the user asked to quit.
fn handle_key_input(app: &mut App, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        _ => {}
    }
    if let Some(calc_key) = keyboard_key(key) {
        app.press(calc_key);
    }
    false
}

fn handle_mouse_input(app: &mut App, mouse: MouseEvent) {
    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
        if let Some(key) = keypad::hit_test(app.keypad_area, mouse.column, mouse.row) {
            app.press(key);
        }
    }
}

/// Keyboard shortcuts for the wired keys.
fn keyboard_key(key: KeyEvent) -> Option<Key> {
    let calc_key = match key.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(c) => match c {
            '0'..='9' => Key::digit(c.to_digit(10)? as u8)?,
            '.' => Key::Decimal,
            '+' => Key::Operator(Operator::Add),
            '-' => Key::Operator(Operator::Subtract),
            '*' | 'x' => Key::Operator(Operator::Multiply),
            '/' => Key::Operator(Operator::Divide),
            'n' => Key::Financial(Register::N),
            'i' => Key::Financial(Register::I),
            'p' => Key::Financial(Register::Pv),
            'm' => Key::Financial(Register::Pmt),
            'v' => Key::Financial(Register::Fv),
            _ => return None,
        },
        _ => return None,
    };
    Some(calc_key)
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(5),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    render_bezel(f, app, chunks[0]);

    let show_side = app.settings.show_stack || app.settings.show_registers;
    if show_side {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(30)].as_ref())
            .split(chunks[1]);
        render_keypad(f, app, body[0]);
        render_side_panel(f, app, body[1]);
    } else {
        render_keypad(f, app, chunks[1]);
    }

    render_help(f, app, chunks[2]);
}

fn render_bezel(f: &mut Frame, app: &App, area: Rect) {
    let bezel = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", app.settings.title),
            Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Right)
        .style(Style::default().bg(BEZEL_GOLD).fg(Color::Black));
    let inner = bezel.inner(area);
    f.render_widget(bezel, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(12),
                Constraint::Percentage(75),
                Constraint::Percentage(13),
            ]
            .as_ref(),
        )
        .split(inner);

    let display = Paragraph::new(app.calculator.display().to_string())
        .style(
            Style::default()
                .bg(LCD_GREY)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(display, columns[1]);
}

fn render_keypad(f: &mut Frame, app: &mut App, area: Rect) {
    let frame_block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Rgb(0xE5, 0xE5, 0xE5)));
    let inner = frame_block.inner(area);
    f.render_widget(frame_block, area);
    app.keypad_area = inner;

    for (key, rect) in keypad::key_areas(inner) {
        let pressed = app.last_key == Some(key);
        let cap = Paragraph::new(key.label())
            .style(key_style(key, pressed))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(cap, rect);
    }
}

fn key_style(key: Key, pressed: bool) -> Style {
    let style = match keypad::face(key) {
        KeyFace::Plain => Style::default().bg(KEY_BLACK).fg(Color::White),
        KeyFace::Orange => Style::default().bg(KEY_BLACK).fg(FACE_ORANGE),
        KeyFace::Blue => Style::default().bg(KEY_BLACK).fg(FACE_BLUE),
        KeyFace::Gold => Style::default().bg(SHIFT_GOLD).fg(Color::White),
        KeyFace::Teal => Style::default().bg(SHIFT_TEAL).fg(Color::White),
    };
    let style = if key.is_wired() {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    };
    if pressed {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

fn render_side_panel(f: &mut Frame, app: &App, area: Rect) {
    let constraints = match (app.settings.show_stack, app.settings.show_registers) {
        (true, true) => vec![Constraint::Percentage(45), Constraint::Percentage(55)],
        _ => vec![Constraint::Percentage(100)],
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut next = 0;
    if app.settings.show_stack {
        render_stack(f, app, chunks[next]);
        next += 1;
    }
    if app.settings.show_registers {
        render_registers(f, app, chunks[next]);
    }
}

fn render_stack(f: &mut Frame, app: &App, area: Rect) {
    let stack = app.calculator.stack();
    let lines: Vec<Line> = if stack.is_empty() {
        vec![Line::from("(empty)").style(Style::default().fg(Color::DarkGray))]
    } else {
        stack
            .iter()
            .enumerate()
            .map(|(depth, value)| {
                Line::from(vec![
                    Span::styled(format!("{:>2}: ", depth + 1), Style::default().fg(Color::DarkGray)),
                    Span::raw(format_number(*value)),
                ])
            })
            .collect()
    };

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("Stack"));
    f.render_widget(widget, area);
}

fn render_registers(f: &mut Frame, app: &App, area: Rect) {
    let awaiting = match app.calculator.input_mode() {
        InputMode::Awaiting(target) => Some(target.register()),
        InputMode::Idle => None,
    };
    let registers = app.calculator.registers();

    let rows = Register::ALL.into_iter().map(|register| {
        let marker = if awaiting == Some(register) { "◀" } else { "" };
        let style = if awaiting == Some(register) {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(register.name()),
            Cell::from(format_number(registers.get(register))),
            Cell::from(marker),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(4),
        Constraint::Min(12),
        Constraint::Length(2),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["reg", "value", ""])
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Registers"));
    f.render_widget(table, area);
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.calculator.input_mode() {
        InputMode::Awaiting(target) => format!(
            "{} ({}) selected: type a value and press Enter to store it | q: quit",
            target.register(),
            target.register().description()
        ),
        InputMode::Idle => "0-9 .: digits | Enter: ENTER | + - * /: operators | n i p(PV) m(PMT) v(FV) | click a key | q: quit".to_string(),
    };
    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, area);
}
