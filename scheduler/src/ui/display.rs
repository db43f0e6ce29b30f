use super::runner::RunnerEvent;
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use scheduling_simulator::{EngineState, GanttSlot, ProcessId, SchedulingEngine};
use std::{
    io::{self, Stdout},
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};
use tui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
    Terminal,
};

pub enum DisplayEvent {
    Input(KeyEvent),
    Tick,
}

const PALETTE: [Color; 6] = [
    Color::LightBlue,
    Color::LightGreen,
    Color::LightMagenta,
    Color::LightYellow,
    Color::LightCyan,
    Color::LightRed,
];

fn process_color(id: ProcessId) -> Color {
    PALETTE[id as usize % PALETTE.len()]
}

pub struct DisplayTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    input_rx: Receiver<DisplayEvent>,
}

impl DisplayTerminal {
    pub fn new(tick_rate: Duration) -> Result<Self, io::Error> {
        crossterm::terminal::enable_raw_mode()?;

        // Input and pacing share one channel: key presses as they come, and a
        // tick every `tick_rate` to advance the simulation.
        let (input_tx, input_rx) = mpsc::channel();
        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);

                match event::poll(timeout) {
                    Ok(true) => {
                        if let Ok(Event::Key(key)) = event::read() {
                            if input_tx.send(DisplayEvent::Input(key)).is_err() {
                                return;
                            }
                        }
                    }
                    Ok(false) => {}
                    Err(_) => return,
                }

                if last_tick.elapsed() >= tick_rate {
                    if input_tx.send(DisplayEvent::Tick).is_err() {
                        return;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal, input_rx })
    }

    pub fn draw(&mut self, engine: &SchedulingEngine, status: &str) -> io::Result<()> {
        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(5),
                    Constraint::Length(3),
                    Constraint::Length(4),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let state = match engine.state() {
                EngineState::Idle => "idle",
                EngineState::Running => "running",
                EngineState::Paused => "paused",
                EngineState::Completed => "completed",
            };
            let current = Paragraph::new(match engine.running() {
                Some(process) => format!(
                    "t={} | {} | {} | remaining {}",
                    engine.current_time(),
                    process.id(),
                    process.name(),
                    process.remaining_time()
                ),
                None => format!("t={} | CPU idle", engine.current_time()),
            })
            .style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::LightBlue),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} ({state})", engine.algorithm().name()))
                    .border_type(BorderType::Rounded),
            );
            f.render_widget(current, chunks[0]);

            let items = engine.processes().iter().map(|process| {
                let level = engine
                    .queue_level(process.id())
                    .map_or_else(|| "-".to_owned(), |level| level.to_string());
                let finish = process
                    .completion_time()
                    .map_or_else(|| "-".to_owned(), |t| t.to_string());
                Row::new(vec![
                    Cell::from(process.id().to_string())
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                    Cell::from(process.name().to_owned()),
                    Cell::from(process.arrival_time().to_string()),
                    Cell::from(process.burst_time().to_string()),
                    Cell::from(process.remaining_time().to_string()),
                    Cell::from(
                        process
                            .priority()
                            .map_or_else(|| "-".to_owned(), |p| p.to_string()),
                    ),
                    Cell::from(level),
                    Cell::from(process.state().to_string()),
                    Cell::from(finish),
                ])
                .style(Style::default().fg(process_color(process.id())))
            });

            let table = Table::new(items)
                .header(
                    Row::new(vec![
                        "PID", "Name", "Arrival", "Burst", "Left", "Prio", "Level", "State",
                        "Done",
                    ])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .widths(&[
                    Constraint::Length(4),
                    Constraint::Length(12),
                    Constraint::Length(7),
                    Constraint::Length(5),
                    Constraint::Length(4),
                    Constraint::Length(4),
                    Constraint::Length(5),
                    Constraint::Length(9),
                    Constraint::Length(4),
                ])
                .block(Block::default().title("Processes").borders(Borders::ALL))
                .column_spacing(1);
            f.render_widget(table, chunks[1]);

            // Newest ticks win when the timeline is wider than the screen.
            let width = chunks[2].width.saturating_sub(2) as usize;
            let mut cells: Vec<Span> = Vec::new();
            for entry in engine.gantt() {
                for _ in entry.start..entry.end {
                    cells.push(match entry.slot {
                        GanttSlot::Idle => Span::styled("·", Style::default().fg(Color::DarkGray)),
                        GanttSlot::Process(id) => {
                            Span::styled("█", Style::default().fg(process_color(id)))
                        }
                    });
                }
            }
            let skip = cells.len().saturating_sub(width);
            let gantt = Paragraph::new(Spans::from(cells.split_off(skip)))
                .block(Block::default().title("Gantt").borders(Borders::ALL));
            f.render_widget(gantt, chunks[2]);

            let m = engine.metrics();
            let metrics = Paragraph::new(vec![
                Spans::from(format!(
                    "avg wait {:.2} | avg turnaround {:.2} | avg response {:.2}",
                    m.avg_waiting_time, m.avg_turnaround_time, m.avg_response_time
                )),
                Spans::from(format!(
                    "cpu {:.1}% | context switches {} | throughput {:.2}/tick",
                    m.cpu_utilization * 100.0,
                    m.context_switches,
                    m.throughput
                )),
            ])
            .block(Block::default().title("Metrics").borders(Borders::ALL));
            f.render_widget(metrics, chunks[3]);

            let help = Paragraph::new(format!(
                "{status}  [p]ause [r]esume [s]tep [x] restart [q]uit"
            ))
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(help, chunks[4]);
        })?;
        Ok(())
    }

    pub fn get_input(&self) -> RunnerEvent {
        let Ok(event) = self.input_rx.recv() else {
            return RunnerEvent::Quit;
        };
        match event {
            DisplayEvent::Input(key) => {
                if key.modifiers.is_empty() {
                    match key.code {
                        KeyCode::Char('q') => return RunnerEvent::Quit,
                        KeyCode::Char('p') => return RunnerEvent::Pause,
                        KeyCode::Char('r') => return RunnerEvent::Resume,
                        KeyCode::Char('s') => return RunnerEvent::Step,
                        KeyCode::Char('x') => return RunnerEvent::Restart,
                        _ => {}
                    };
                }
                RunnerEvent::None
            }
            DisplayEvent::Tick => RunnerEvent::Tick,
        }
    }
}

impl Drop for DisplayTerminal {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}
