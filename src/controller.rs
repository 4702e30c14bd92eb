use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode, MouseButton, MouseEvent, MouseEventKind};

use crate::domain::{Message, TableConfig, ViewError};
use crate::layout::{Hit, TableLayout};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
    cell_px: u16,
}

impl Controller {
    pub fn new(cfg: &TableConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
            cell_px: cfg.cell_px,
        }
    }

    pub fn handle_event(
        &self,
        model: &Model,
        layout: &TableLayout,
    ) -> Result<Option<Message>, ViewError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            let event = event::read()?;
            return Ok(self.map_event(event, model, layout));
        }
        Ok(None)
    }

    pub fn map_event(&self, event: Event, model: &Model, layout: &TableLayout) -> Option<Message> {
        match event {
            // crossterm also emits key release and repeat events on Windows
            Event::Key(key) if key.kind == event::KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse, model, layout),
            // A release outside the terminal is never reported, losing focus ends the gesture too
            Event::FocusLost if model.state().resizing().is_some() => Some(Message::EndResize),
            Event::Resize(width, height) => {
                Some(Message::Resize(usize::from(width), usize::from(height)))
            }
            _ => None,
        }
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::PageUp => Some(Message::MovePageUp),
            KeyCode::PageDown => Some(Message::MovePageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::MoveBeginning),
            KeyCode::End | KeyCode::Char('G') => Some(Message::MoveEnd),
            KeyCode::Left => Some(Message::MoveLeft),
            KeyCode::Right => Some(Message::MoveRight),
            KeyCode::Char('h') => Some(Message::ScrollLeft),
            KeyCode::Char('l') => Some(Message::ScrollRight),
            KeyCode::Char('s') | KeyCode::Enter => Some(Message::ToggleSortSelected),
            KeyCode::Char(' ') => Some(Message::ToggleVisibilitySelected),
            KeyCode::Char(c @ '1'..='9') => c
                .to_digit(10)
                .map(|n| Message::ToggleVisibilityNth(n as usize - 1)),
            KeyCode::Char('<') => Some(Message::NarrowSelected),
            KeyCode::Char('>') => Some(Message::WidenSelected),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    fn handle_mouse(&self, mouse: MouseEvent, model: &Model, layout: &TableLayout) -> Option<Message> {
        let resizing = model.state().resizing().is_some();
        let message = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if !model.show_popup() => {
                match layout.hit(mouse.column, mouse.row) {
                    Some(Hit::Handle(key)) => {
                        Some(Message::BeginResize(key, self.pointer_px(mouse.column)))
                    }
                    Some(Hit::Header(key)) => Some(Message::ToggleSort(key)),
                    Some(Hit::Checkbox(key)) => Some(Message::ToggleVisibility(key)),
                    None => None,
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if resizing => {
                Some(Message::UpdateResize(self.pointer_px(mouse.column)))
            }
            // Released anywhere, not only over the handle
            MouseEventKind::Up(MouseButton::Left) if resizing => Some(Message::EndResize),
            MouseEventKind::ScrollDown if !model.show_popup() => Some(Message::MoveDown),
            MouseEventKind::ScrollUp if !model.show_popup() => Some(Message::MoveUp),
            _ => None,
        };
        if message.is_some() {
            trace!("Mapped: {mouse:?} => {message:?}");
        }
        message
    }

    fn pointer_px(&self, column: u16) -> i32 {
        i32::from(column) * i32::from(self.cell_px)
    }
}
