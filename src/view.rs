//! Game Detail view state machine.
//!
//! The detail view moves `preview → live → final`, driven solely by the
//! canonical status of the most recent fetch. Each phase has its own set of
//! meaningful tabs, so a phase transition must reset a tab selection that
//! the new phase cannot show — naive persistence would leave the view on a
//! now-invalid tab.

use crate::model::GameStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Preview,
    Live,
    Final,
}

impl GamePhase {
    pub fn from_status(status: GameStatus) -> GamePhase {
        match status {
            GameStatus::Scheduled | GameStatus::Postponed => GamePhase::Preview,
            GameStatus::Live | GameStatus::Halftime => GamePhase::Live,
            GameStatus::Final => GamePhase::Final,
        }
    }

    fn default_tab(self) -> DetailTab {
        match self {
            GamePhase::Preview => DetailTab::Preview,
            GamePhase::Live => DetailTab::Gamecast,
            GamePhase::Final => DetailTab::BoxScore,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Preview,
    Gamecast,
    PlayByPlay,
    BoxScore,
    TeamStats,
}

/// Current phase plus the selected tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabState {
    phase: GamePhase,
    tab: DetailTab,
}

impl TabState {
    pub fn new(status: GameStatus) -> Self {
        let phase = GamePhase::from_status(status);
        TabState {
            phase,
            tab: phase.default_tab(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn tab(&self) -> DetailTab {
        self.tab
    }

    pub fn select(&mut self, tab: DetailTab) {
        self.tab = tab;
    }

    /// Apply the status of the latest fetch. There is no transition out of
    /// `final`; entering a new phase resets a tab that phase cannot show.
    pub fn on_status(&mut self, status: GameStatus) {
        let next = GamePhase::from_status(status);
        if self.phase == GamePhase::Final || next == self.phase {
            return;
        }
        match next {
            GamePhase::Preview => self.tab = DetailTab::Preview,
            GamePhase::Live => {
                if self.tab == DetailTab::Preview {
                    self.tab = DetailTab::Gamecast;
                }
            }
            GamePhase::Final => {
                if matches!(
                    self.tab,
                    DetailTab::Preview | DetailTab::Gamecast | DetailTab::PlayByPlay
                ) {
                    self.tab = DetailTab::BoxScore;
                }
            }
        }
        self.phase = next;
    }
}
