//! Reduce parsed events to an [`Outcome`].
//!
//! Only WORKING-class statuses count as a change. Compose prints `Running`,
//! `Healthy` and friends for containers it did not touch, so DONE-class events
//! are confirmations, not evidence of mutation.

use crate::types::{ActionRecord, Event, Outcome};
use crate::warning::{Warning, WarningSink};

/// True iff any event carries a WORKING-class status.
pub fn has_changes(events: &[Event]) -> bool {
    events
        .iter()
        .any(|event| event.status().is_some_and(|status| status.is_working()))
}

/// One action per WORKING-class event, in the order Compose reported them.
pub fn extract_actions(events: &[Event]) -> Vec<ActionRecord> {
    events
        .iter()
        .filter_map(|event| {
            let status = event.status().filter(|status| status.is_working())?;
            Some(ActionRecord {
                what: event.kind,
                id: event.id.clone(),
                status,
            })
        })
        .collect()
}

/// Surface message events (a trailing field that was not a status) as warnings.
pub fn emit_warnings(events: &[Event], sink: &mut dyn WarningSink) {
    for event in events {
        if let Some(message) = event.message() {
            sink.warn(Warning::StatusAsMessage {
                resource: event.kind,
                id: event.id.clone(),
                message: message.to_string(),
            });
        }
    }
}

/// Mark the outcome failed if any event carries an ERROR-class status.
///
/// Existing failure lines on the outcome are kept; new ones are appended.
pub fn update_failed(outcome: &mut Outcome, events: &[Event]) {
    let errors: Vec<String> = events
        .iter()
        .filter_map(|event| {
            let status = event.status().filter(|status| status.is_error())?;
            Some(format!(
                "Error when processing {} {}: {}",
                event.kind, event.id, status
            ))
        })
        .collect();

    if errors.is_empty() {
        return;
    }

    outcome.failed = true;
    outcome.msg = Some(match outcome.msg.take() {
        Some(previous) => format!("{previous}\n{}", errors.join("\n")),
        None => errors.join("\n"),
    });
}

impl Outcome {
    /// Reconcile the events of one invocation.
    pub fn from_events(events: &[Event]) -> Self {
        let mut outcome = Self {
            changed: has_changes(events),
            actions: extract_actions(events),
            failed: false,
            msg: None,
        };
        update_failed(&mut outcome, events);
        outcome
    }

    /// Combine the outcomes of two sequential invocations.
    pub fn merge(self, other: Self) -> Self {
        let mut actions = self.actions;
        actions.extend(other.actions);

        let msg = match (self.msg, other.msg) {
            (Some(first), Some(second)) => Some(format!("{first}\n{second}")),
            (first, second) => first.or(second),
        };

        Self {
            changed: self.changed || other.changed,
            actions,
            failed: self.failed || other.failed,
            msg,
        }
    }

    /// Number of actions that were taken.
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::parse_events;
    use crate::types::{ResourceKind, Status};

    fn events(stderr: &str) -> Vec<Event> {
        parse_events(stderr, false).unwrap().events
    }

    #[test]
    fn test_done_only_events_are_not_changes() {
        let events = events(
            "Container flask_web_1 Started\nContainer flask_db_1 Running\nContainer flask_db_1 Healthy\n",
        );
        assert!(!has_changes(&events));
        assert!(extract_actions(&events).is_empty());

        let outcome = Outcome::from_events(&events);
        assert!(!outcome.changed);
        assert!(!outcome.failed);
        assert_eq!(outcome.msg, None);
    }

    #[test]
    fn test_working_event_is_a_change_and_an_action() {
        let events = events("Container flask_web_1 Creating\n");
        assert!(has_changes(&events));
        assert_eq!(
            extract_actions(&events),
            vec![ActionRecord {
                what: ResourceKind::Container,
                id: "flask_web_1".to_string(),
                status: Status::Creating,
            }]
        );
    }

    #[test]
    fn test_actions_keep_order_and_skip_non_working() {
        let events = events(
            "\
Network flask_default Creating
Network flask_default Created
Container flask_db_1 Recreate
Container flask_db_1 Recreated
Container flask_web_1 Starting
Container flask_web_1 Started
",
        );
        let actions: Vec<_> = extract_actions(&events)
            .into_iter()
            .map(|a| (a.what, a.id, a.status))
            .collect();
        assert_eq!(
            actions,
            vec![
                (ResourceKind::Network, "flask_default".to_string(), Status::Creating),
                (ResourceKind::Container, "flask_db_1".to_string(), Status::Recreate),
                (ResourceKind::Container, "flask_web_1".to_string(), Status::Starting),
            ]
        );
    }

    #[test]
    fn test_message_events_warn_once_each() {
        let events = events(
            "Container flask_web_1 Some explanatory text\nContainer flask_db_1 Started\n",
        );
        let mut sink: Vec<Warning> = Vec::new();
        emit_warnings(&events, &mut sink);
        assert_eq!(sink.len(), 1);
        assert!(sink[0].to_string().contains("flask_web_1"));
        assert!(!has_changes(&events));
    }

    #[test]
    fn test_error_event_fails_outcome() {
        let events = events("Container flask_web_1 Error\n");
        let mut outcome = Outcome::default();
        update_failed(&mut outcome, &events);
        assert!(outcome.failed);
        assert_eq!(
            outcome.msg.as_deref(),
            Some("Error when processing container flask_web_1: Error")
        );
    }

    #[test]
    fn test_errors_do_not_hide_other_events() {
        let events = events(
            "Container flask_db_1 Creating\nContainer flask_web_1 Error\nVolume data Error\n",
        );
        let outcome = Outcome::from_events(&events);
        assert!(outcome.changed);
        assert_eq!(outcome.action_count(), 1);
        assert!(outcome.failed);
        assert_eq!(
            outcome.msg.as_deref(),
            Some(
                "Error when processing container flask_web_1: Error\nError when processing volume data: Error"
            )
        );
    }

    #[test]
    fn test_no_errors_leaves_outcome_untouched() {
        let mut outcome = Outcome::default();
        update_failed(&mut outcome, &events("Container web Stopping\n"));
        assert!(!outcome.failed);
        assert!(outcome.msg.is_none());
    }

    #[test]
    fn test_merge_combines_outcomes() {
        let first = Outcome::from_events(&events("Container db Created\nContainer db Error\n"));
        let second = Outcome::from_events(&events(
            "Container web Stopping\nContainer web Stopped\nContainer api Error\n",
        ));
        let merged = first.merge(second);
        assert!(merged.changed);
        assert_eq!(merged.actions.len(), 1);
        assert_eq!(merged.actions[0].status, Status::Stopping);
        assert!(merged.failed);
        assert_eq!(
            merged.msg.as_deref(),
            Some(
                "Error when processing container db: Error\nError when processing container api: Error"
            )
        );
    }

    #[test]
    fn test_merge_with_empty_outcome_is_identity() {
        let outcome = Outcome::from_events(&events("Network n Creating\n"));
        assert_eq!(outcome.clone().merge(Outcome::default()), outcome);
        assert_eq!(Outcome::default().merge(outcome.clone()), outcome);
    }
}
