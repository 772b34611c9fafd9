//! Request sequencing: one in-flight request per action, latest wins.
//!
//! Every request is issued with a [`Ticket`]. A completion is applied only
//! when its ticket still carries the newest generation for its action;
//! anything older (superseded, or issued before a reset) is dropped.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Health,
    Fetch,
    Upload,
    Train,
    Evaluate,
    Backtest,
    Predict,
    ValidateData,
    ValidateFixtures,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Health => "Health check",
            Action::Fetch => "Fetch",
            Action::Upload => "Upload",
            Action::Train => "Training",
            Action::Evaluate => "Evaluation",
            Action::Backtest => "Backtest",
            Action::Predict => "Prediction",
            Action::ValidateData => "Data file check",
            Action::ValidateFixtures => "Fixtures file check",
        }
    }

    /// File checks may be re-issued at any time; the newest selection wins.
    fn replaceable(self) -> bool {
        matches!(self, Action::ValidateData | Action::ValidateFixtures)
    }

    /// Actions writing the same piece of view state as this one.
    fn rivals(self) -> &'static [Action] {
        match self {
            Action::Fetch => &[Action::Upload],
            Action::Upload => &[Action::Fetch],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub action: Action,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct Requests {
    latest: HashMap<Action, u64>,
    in_flight: HashSet<Action>,
}

impl Requests {
    /// Issue a ticket, or `None` while the same action is still pending.
    pub fn begin(&mut self, action: Action) -> Option<Ticket> {
        if self.in_flight.contains(&action) && !action.replaceable() {
            return None;
        }
        let generation = self.bump(action);
        for rival in action.rivals() {
            if self.in_flight.remove(rival) {
                self.bump(*rival);
            }
        }
        self.in_flight.insert(action);
        Some(Ticket { action, generation })
    }

    /// Settle a completion. True when it is current and should be applied.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        let current = self.latest.get(&ticket.action) == Some(&ticket.generation);
        if current {
            self.in_flight.remove(&ticket.action);
        } else {
            tracing::debug!(action = ?ticket.action, generation = ticket.generation, "dropping stale completion");
        }
        current
    }

    pub fn is_pending(&self, action: Action) -> bool {
        self.in_flight.contains(&action)
    }

    pub fn any_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Forget everything in flight; their completions will be dropped.
    pub fn invalidate_all(&mut self) {
        let pending: Vec<Action> = self.in_flight.drain().collect();
        for action in pending {
            self.bump(action);
        }
    }

    fn bump(&mut self, action: Action) -> u64 {
        let generation = self.latest.entry(action).or_insert(0);
        *generation += 1;
        *generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_action_is_not_reissued() {
        let mut req = Requests::default();
        let t = req.begin(Action::Train).unwrap();
        assert!(req.begin(Action::Train).is_none());
        assert!(req.is_pending(Action::Train));
        assert!(req.finish(t));
        assert!(!req.is_pending(Action::Train));
        assert!(req.begin(Action::Train).is_some());
    }

    #[test]
    fn actions_are_independent() {
        let mut req = Requests::default();
        let train = req.begin(Action::Train).unwrap();
        let predict = req.begin(Action::Predict).unwrap();
        assert!(req.finish(predict));
        assert!(req.finish(train));
    }

    #[test]
    fn newer_file_check_supersedes_older() {
        let mut req = Requests::default();
        let first = req.begin(Action::ValidateData).unwrap();
        let second = req.begin(Action::ValidateData).unwrap();
        assert!(!req.finish(first));
        assert!(req.is_pending(Action::ValidateData));
        assert!(req.finish(second));
    }

    #[test]
    fn fetch_and_upload_supersede_each_other() {
        let mut req = Requests::default();
        let upload = req.begin(Action::Upload).unwrap();
        let fetch = req.begin(Action::Fetch).unwrap();
        assert!(!req.is_pending(Action::Upload));
        assert!(!req.finish(upload));
        assert!(req.finish(fetch));
    }

    #[test]
    fn invalidate_drops_everything_in_flight() {
        let mut req = Requests::default();
        let t = req.begin(Action::Backtest).unwrap();
        req.invalidate_all();
        assert!(!req.any_pending());
        assert!(!req.finish(t));
        let again = req.begin(Action::Backtest).unwrap();
        assert!(again.generation > t.generation);
    }
}
