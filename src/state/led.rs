use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    On,
    Off,
}

impl LedState {
    pub fn is_on(self) -> bool {
        self == LedState::On
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LedState::On => "on",
            LedState::Off => "off",
        }
    }
}

impl From<bool> for LedState {
    fn from(on: bool) -> Self {
        if on {
            LedState::On
        } else {
            LedState::Off
        }
    }
}

/// LED status as last decided by the actuation task. Written by that task only.
#[derive(Debug, Default)]
pub struct LedStatus {
    on: AtomicBool,
}

impl LedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, state: LedState) {
        self.on.store(state.is_on(), Ordering::Release);
    }

    pub fn get(&self) -> LedState {
        LedState::from(self.on.load(Ordering::Acquire))
    }
}
