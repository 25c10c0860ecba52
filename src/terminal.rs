// SPDX-License-Identifier: GPL-3.0-only

//! Terminal front-end for the capture screen
//!
//! Draws whichever view the model selects, using Unicode half-block
//! characters for the camera feed and the captured overlay.

use crate::app::{CaptureCallbacks, DualCaptureModel, Mount, UserAction, View};
use crate::backends::camera::VirtualCameraBackend;
use crate::backends::permission::{PermissionState, VirtualPermission};
use crate::config::Config;
use crate::constants::{TERMINAL_FRAME_INTERVAL, spinner_frame};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::RgbaImage;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};
use std::io::{self, stdout};
use std::sync::{Arc, mpsc};
use std::time::Duration;
use tracing::info;

/// Simulated time the user takes to answer the permission prompt
const PROMPT_DELAY: Duration = Duration::from_millis(300);

/// Run the terminal capture screen
pub fn run(config: Config, deny_permission: bool) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = runtime.block_on(run_app(&mut terminal, config, deny_permission));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
    deny_permission: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = Arc::new(VirtualCameraBackend::new(config.virtual_camera()));
    let permissions = Arc::new(
        VirtualPermission::new(PermissionState::Unknown, !deny_permission)
            .with_prompt_delay(PROMPT_DELAY),
    );

    let (notes, note_receiver) = mpsc::channel::<String>();
    let back_notes = notes.clone();
    let front_notes = notes.clone();
    let error_notes = notes;
    let callbacks = CaptureCallbacks::new(
        move |photo| {
            let _ = back_notes.send(format!("First photo saved: {}", photo.uri));
        },
        move |photo| {
            let _ = front_notes.send(format!("Second photo saved: {}", photo.uri));
        },
    )
    .with_capture_error(move |err| {
        let _ = error_notes.send(format!("Error: {}", err));
    });

    let model = DualCaptureModel::new(config, backend, permissions, callbacks);
    let mut mount = Mount::new(model);

    let mut status_message = String::new();
    let mut tick: u64 = 0;

    loop {
        // Let pending tasks make progress for one frame
        if let Ok(false) = tokio::time::timeout(TERMINAL_FRAME_INTERVAL, mount.step()).await {
            tokio::time::sleep(TERMINAL_FRAME_INTERVAL).await;
        }
        while let Ok(note) = note_receiver.try_recv() {
            info!(%note, "Capture screen update");
            status_message = note;
        }
        tick = tick.wrapping_add(1);

        let view = mount.view();
        let preview = mount
            .model()
            .camera_handle()
            .and_then(|handle| handle.preview());

        terminal.draw(|f| {
            let (content_area, status_area) = split_status_line(f.area());

            let status = build_status_message(&view, &status_message, tick);
            match &view {
                View::PermissionGate { .. } => {
                    let text = view.permission_message().unwrap_or_default();
                    f.render_widget(CenteredText { lines: &[text, "Press 'g' to grant permission"] }, content_area);
                }
                View::PrimaryCapture { .. } => {
                    f.render_widget(&FrameWidget::new(preview.clone()), content_area);
                }
                View::SecondaryCapture { overlay, busy, .. } => {
                    f.render_widget(&FrameWidget::new(overlay.pixels.clone()), content_area);
                    if *busy {
                        let spinner = spinner_frame(tick / 4).to_string();
                        f.render_widget(CenteredText { lines: &[spinner.as_str()] }, content_area);
                    }
                }
            }
            f.render_widget(StatusBar { message: &status }, status_area);
        })?;

        // Handle input without blocking the task loop
        if event::poll(Duration::ZERO)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // Ctrl+C to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            if key.code == KeyCode::Char('q') || key.code == KeyCode::Esc {
                break;
            }

            let action = match key.code {
                KeyCode::Char('g') => Some(UserAction::RequestPermission),
                KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Enter => Some(UserAction::Shutter),
                KeyCode::Char('f') | KeyCode::Char('s') => Some(UserAction::Flip),
                _ => None,
            };
            if let Some(action) = action
                && view.offers(action)
            {
                mount.dispatch(action.message());
            }
        }
    }

    mount.teardown();
    Ok(())
}

/// Reserve the bottom line of `area` for the status bar
fn split_status_line(area: Rect) -> (Rect, Rect) {
    let content = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height.saturating_sub(1),
    };
    let status = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };
    (content, status)
}

fn build_status_message(view: &View, last_note: &str, tick: u64) -> String {
    let mut msg = match view.facing() {
        Some(facing) => format!("[{}] ", facing),
        None => String::new(),
    };
    match view {
        View::PermissionGate { .. } => msg.push_str("'g' grant permission"),
        View::PrimaryCapture { ready, .. } => {
            let state = if *ready { "ready" } else { "starting" };
            msg.push_str(&format!("{} | space shutter | 'f' flip", state));
        }
        View::SecondaryCapture { busy: true, .. } => {
            msg.push_str(&format!("capturing {}", spinner_frame(tick / 4)));
        }
        View::SecondaryCapture { .. } => msg.push_str("done"),
    }
    msg.push_str(" | 'q' quit");
    if !last_note.is_empty() {
        msg.push_str(" | ");
        msg.push_str(last_note);
    }
    msg
}

/// Widget that renders an RGBA image using half-block characters
struct FrameWidget {
    image: Option<Arc<RgbaImage>>,
}

impl FrameWidget {
    fn new(image: Option<Arc<RgbaImage>>) -> Self {
        Self { image }
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(image) = &self.image else {
            // No frame yet - show placeholder
            CenteredText {
                lines: &["Waiting for camera..."],
            }
            .render(area, buf);
            return;
        };
        if image.width() == 0 || image.height() == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Calculate display dimensions maintaining aspect ratio
        // Each terminal cell displays 2 vertical pixels using half-block characters
        let frame_aspect = image.width() as f64 / image.height() as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = image.width() as f64 / display_width as f64;
        let y_scale = image.height() as f64 / (display_height * 2) as f64;

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let top_color = sample_pixel(image, src_x, src_y_top);
                let bottom_color = sample_pixel(image, src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(top_color);
                    cell.set_bg(bottom_color);
                }
            }
        }
    }
}

fn sample_pixel(image: &RgbaImage, x: u32, y: u32) -> Color {
    let x = x.min(image.width() - 1);
    let y = y.min(image.height() - 1);
    let [r, g, b, _] = image.get_pixel(x, y).0;
    Color::Rgb(r, g, b)
}

/// Lines of text centered in the area
struct CenteredText<'a> {
    lines: &'a [&'a str],
}

impl Widget for CenteredText<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let top = area.y + (area.height.saturating_sub(self.lines.len() as u16)) / 2;
        for (i, line) in self.lines.iter().enumerate() {
            let y = top + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let width = line.chars().count() as u16;
            let x = area.x + (area.width.saturating_sub(width)) / 2;
            buf.set_stringn(x, y, line, area.width as usize, Style::default());
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        buf.set_stringn(
            area.x,
            area.y,
            self.message,
            area.width as usize,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}
