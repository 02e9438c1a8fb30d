//! Keyboard input for the play screens.

use std::collections::VecDeque;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use qtris_engine::Intent;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::From)]
pub enum InputAction {
    Move(Intent),
    TogglePause,
    Quit,
}

impl InputAction {
    /// Maps a terminal event to an action. Key releases are ignored.
    pub fn from_event(event: &Event) -> Option<Self> {
        event.as_key_event().and_then(Self::from_key)
    }

    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let action = match key.code {
            KeyCode::Left => Intent::MoveLeft.into(),
            KeyCode::Right => Intent::MoveRight.into(),
            KeyCode::Down => Intent::SoftDrop.into(),
            KeyCode::Up => Intent::Rotate.into(),
            KeyCode::Char('p') => InputAction::TogglePause,
            KeyCode::Char('q') | KeyCode::Esc => InputAction::Quit,
            _ => return None,
        };
        Some(action)
    }
}

/// Pending intents, handed to the game one per tick.
///
/// Keys can arrive faster than ticks (key repeat, pasted input); the queue keeps
/// their order and drops the newest ones once it is full.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pending: VecDeque<Intent>,
}

impl InputQueue {
    pub const CAPACITY: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an intent, returning `false` if the queue was full.
    pub fn push(&mut self, intent: Intent) -> bool {
        if self.pending.len() >= Self::CAPACITY {
            return false;
        }
        self.pending.push_back(intent);
        true
    }

    /// Takes the intent for the current tick.
    pub fn pop(&mut self) -> Option<Intent> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
