//! Keyboard input
//!
//! Key events may arrive from any thread. They are queued on a channel and
//! folded into an [`InputIntent`] once per frame, at the top of the tick, so
//! the simulation always sees a consistent snapshot.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::sim::{Direction, TickInput};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Fire,
}

impl Key {
    pub const LEFT_CODE: u32 = 37;
    pub const RIGHT_CODE: u32 = 39;
    pub const SPACE_CODE: u32 = 32;

    /// Map a classic DOM key code (arrow keys and space)
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            Self::LEFT_CODE => Some(Key::Left),
            Self::RIGHT_CODE => Some(Key::Right),
            Self::SPACE_CODE => Some(Key::Fire),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
}

/// Accumulated player intent between two ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputIntent {
    pub direction: Option<Direction>,
    /// Latched until the next tick consumes it
    pub fire: bool,
}

impl InputIntent {
    pub fn apply(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Down(Key::Left) => self.direction = Some(Direction::Left),
            KeyEvent::Down(Key::Right) => self.direction = Some(Direction::Right),
            KeyEvent::Down(Key::Fire) => self.fire = true,
            // Any release stops the paddle, fire included
            KeyEvent::Up(_) => self.direction = None,
        }
    }

    /// Snapshot for one tick. Clears the one-shot fire request; the held
    /// direction carries over.
    pub fn take_tick_input(&mut self, idle_mode: bool) -> TickInput {
        let input = TickInput {
            direction: self.direction,
            fire: self.fire,
            idle_mode,
        };
        self.fire = false;
        input
    }
}

/// Producer side, cheap to clone and `Send`
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: Sender<KeyEvent>,
}

impl InputSender {
    /// Queue an event. Returns `false` once the game loop has gone away.
    pub fn send(&self, event: KeyEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.send(KeyEvent::Down(key))
    }

    pub fn key_up(&self, key: Key) -> bool {
        self.send(KeyEvent::Up(key))
    }
}

/// Consumer side, owned by the game loop
#[derive(Debug)]
pub struct InputReader {
    rx: Receiver<KeyEvent>,
    intent: InputIntent,
}

impl InputReader {
    /// Drain every pending event and produce this tick's input
    pub fn poll(&mut self, idle_mode: bool) -> TickInput {
        for event in self.rx.try_iter() {
            self.intent.apply(event);
        }
        self.intent.take_tick_input(idle_mode)
    }
}

/// Single-consumer input queue
pub fn input_channel() -> (InputSender, InputReader) {
    let (tx, rx) = mpsc::channel();
    (
        InputSender { tx },
        InputReader {
            rx,
            intent: InputIntent::default(),
        },
    )
}
