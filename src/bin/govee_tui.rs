//! Interactive terminal front end for the lamp registry.
//!
//! Renders discovered lamps as a selectable list and toggles the
//! highlighted one. Keys: `q`/`ctrl+c` quit, `up`/`k` and `down`/`j`
//! move the selection, `enter`/space toggles power, `r` re-fetches the
//! selected lamp's status.

use std::io::{Stdout, stdout};
use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    ExecutableCommand,
    cursor,
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use govee_lights_rs::{Device, LanClient, LanController, LanEndpoints};

#[derive(Parser)]
#[command(name = "govee-tui")]
#[command(about = "Discover and control Govee lamps on the local network", long_about = None)]
struct Cli {
    /// Seconds to wait for scan replies before opening the list
    #[arg(short, long, default_value = "3")]
    window: u64,
}

/// Terminal wrapper that handles setup, teardown, and panic recovery.
struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    fn enter() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(cursor::Hide)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        terminal.clear()?;
        Ok(Self { terminal })
    }

    fn restore() {
        // Best-effort restoration on every exit path
        let _ = stdout().execute(cursor::Show);
        let _ = stdout().execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        Self::restore();
    }
}

struct App {
    controller: LanController,
    cursor: usize,
    message: String,
}

impl App {
    fn selected_ip(&self) -> Option<Ipv4Addr> {
        self.controller
            .registry()
            .all()
            .nth(self.cursor)
            .map(Device::ip)
    }

    fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_down(&mut self) {
        let last = self.controller.registry().len().saturating_sub(1);
        if self.cursor < last {
            self.cursor += 1;
        }
    }

    async fn toggle_selected(&mut self) {
        let Some(ip) = self.selected_ip() else { return };
        match self.controller.toggle_power(ip).await {
            Ok(state) => self.message = format!("{ip} turned {state}"),
            Err(err) => self.message = format!("toggle failed: {err}"),
        }
    }

    async fn refresh_selected(&mut self) {
        let Some(ip) = self.selected_ip() else { return };
        match self.controller.refresh_status(ip).await {
            Ok(()) => self.message = format!("{ip} status refreshed"),
            Err(err) => self.message = format!("refresh failed: {err}"),
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        let [list_area, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(2)]).areas(frame.area());

        let items: Vec<ListItem> = self
            .controller
            .registry()
            .all()
            .map(|device| {
                let state = device.state();
                let mode = match state.temp {
                    Some(temp) => format!("{}K", temp.kelvin()),
                    None => format!(
                        "rgb({},{},{})",
                        state.color.red(),
                        state.color.green(),
                        state.color.blue()
                    ),
                };
                ListItem::new(format!(
                    "{:15}  {:18}  {:6}  {:3}  {:3}%  {}",
                    device.ip().to_string(),
                    device.name(),
                    device.sku(),
                    state.power.to_string(),
                    state.brightness.value(),
                    mode,
                ))
            })
            .collect();

        let mut list_state = ListState::default().with_selected(Some(self.cursor));
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" Lamps "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut list_state);

        let status = Paragraph::new(vec![
            Line::from(self.message.clone()),
            Line::from("j/k move   enter toggle   r refresh   q quit"),
        ]);
        frame.render_widget(status, status_area);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    println!("Scanning for lamps ({}s window)...", cli.window);
    let client = LanClient::bind(LanEndpoints::default()).await?;
    let mut controller = LanController::new(client);
    let found = controller
        .discover(Duration::from_secs(cli.window))
        .await?;

    if found == 0 {
        println!("No lamps answered the scan. Is LAN control enabled in the Govee app?");
        return Ok(());
    }

    let mut app = App {
        controller,
        cursor: 0,
        message: format!("found {found} lamp(s)"),
    };

    let mut tui = Tui::enter()?;
    let mut events = EventStream::new();

    loop {
        tui.terminal.draw(|frame| app.draw(frame))?;

        let Some(event) = events.next().await else { break };
        let Event::Key(key) = event? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('q') => break,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
            KeyCode::Up | KeyCode::Char('k') => app.move_up(),
            KeyCode::Down | KeyCode::Char('j') => app.move_down(),
            KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected().await,
            KeyCode::Char('r') => app.refresh_selected().await,
            _ => {}
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            Tui::restore();
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
