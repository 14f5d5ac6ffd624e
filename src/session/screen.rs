//! Screen state machine.
//!
//! A pure `(current, event, gate) -> next` function so it can be tested
//! without any agent traffic. The only guard: the report screen needs the
//! finale gate (all three experiences done, or replay mode).

use serde::{Deserialize, Serialize};

use crate::error::NavigationError;

/// The five screens of the experience.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Dashboard,
    Analyst,
    Duelist,
    Creator,
    Report,
}

/// User or engine intent affecting the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    Navigate(Screen),
    /// Back arrow: every screen returns to the dashboard.
    Back,
    /// The finale report was accepted.
    ReportReady,
}

/// Whether the report screen may be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinaleGate {
    pub completed: usize,
    pub replay: bool,
}

impl FinaleGate {
    pub fn is_open(&self) -> bool {
        self.replay || self.completed == 3
    }
}

pub fn transition(
    current: Screen,
    event: ScreenEvent,
    gate: FinaleGate,
) -> Result<Screen, NavigationError> {
    let target = match event {
        ScreenEvent::Navigate(target) => target,
        ScreenEvent::Back => Screen::Dashboard,
        ScreenEvent::ReportReady => Screen::Report,
    };

    if target == Screen::Report && current != Screen::Report && !gate.is_open() {
        return Err(NavigationError::Locked {
            target,
            completed: gate.completed,
        });
    }

    Ok(target)
}
