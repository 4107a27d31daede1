/// Terminal frontend: a character-cell surface, input mapping and demo loop
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use wire3d_core::{RenderStats, Surface};

pub mod config;
pub mod demo;
pub mod noise;
pub mod renderer;

pub use config::{AppConfig, DemoKind};
pub use demo::Demo;
pub use renderer::TerminalSurface;

/// Radians per key press
const ROTATE_STEP: f32 = 0.1;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    demo: Demo,
    surface: TerminalSurface,
    stats: RenderStats,
    target_fps: u32,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: &AppConfig) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        let surface = TerminalSurface::new(cols, rows);
        let demo = Demo::new(config, surface.width(), surface.height());

        Ok(Self {
            demo,
            surface,
            stats: RenderStats::new(),
            target_fps: config.fps.max(1),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide, EnableMouseCapture)?;

        let result = self.main_loop();

        // Cleanup
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_secs(1) / self.target_fps;
        let mut prev_time = Instant::now();

        while self.running {
            let frame_start = Instant::now();
            let delta_time = (frame_start - prev_time).as_secs_f32();
            prev_time = frame_start;

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            self.demo.update(delta_time);
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        info!(demo = ?self.demo.kind(), "exiting");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => {
                let ndc = cell_to_ndc(column, row, self.surface.width(), self.surface.height());
                debug!(column, row, ?ndc, "click");
                self.demo.click(ndc);
            }
            Event::Resize(cols, rows) => {
                self.surface.resize(cols, rows);
                self.demo.resize(self.surface.width(), self.surface.height());
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') | KeyCode::Up => self.demo.rotate(-ROTATE_STEP, 0.0),
            KeyCode::Char('s') | KeyCode::Down => self.demo.rotate(ROTATE_STEP, 0.0),
            KeyCode::Char('a') | KeyCode::Left => self.demo.rotate(0.0, -ROTATE_STEP),
            KeyCode::Char('d') | KeyCode::Right => self.demo.rotate(0.0, ROTATE_STEP),
            KeyCode::Char('o') => self.demo.toggle_projection(),
            _ => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.surface.clear(self.demo.clear_color());
        self.stats.reset();
        self.demo.scene.render_with_stats(&mut self.surface, Some(&mut self.stats));
        if let Some(flash) = self.demo.flash_color() {
            self.surface.clear_additive(flash);
        }

        let mut stdout = stdout();
        self.surface.draw(&mut stdout)?;

        // Draw UI overlay
        let projection = if self.demo.scene.camera.orthographic {
            "ortho"
        } else {
            "persp"
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(TermColor::Yellow),
            SetBackgroundColor(TermColor::Black),
            Print(format!(
                "wire3d {:?} | FPS: {:.1} | {} polys {:.1}ms | {} | WASD/Arrows=Rotate O=Projection Q=Quit",
                self.demo.kind(),
                self.fps,
                self.stats.polygons,
                self.stats.total_time().as_secs_f32() * 1000.0,
                projection,
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Normalized device coordinates of the centre of the upper pixel of a cell
fn cell_to_ndc(column: u16, row: u16, width: u32, height: u32) -> (f32, f32) {
    let x = column as f32 + 0.5;
    let y = row as f32 * 2.0 + 0.5;
    (x / width as f32 * 2.0 - 1.0, 1.0 - y / height as f32 * 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_ndc() {
        let (x, y) = cell_to_ndc(0, 0, 80, 48);
        assert!((x + 1.0).abs() < 0.05);
        assert!((y - 1.0).abs() < 0.05);

        let (x, y) = cell_to_ndc(40, 12, 80, 48);
        assert!(x.abs() < 0.05);
        assert!(y.abs() < 0.05);

        // a row higher up is above the centre
        assert!(cell_to_ndc(40, 11, 80, 48).1 > 0.0);
    }
}
