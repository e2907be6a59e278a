//! View-model helpers for the ticket board: status labels, assignee names,
//! list filtering and the rows shown by the list and details views.

use crate::model::{Ticket, TicketId, User, UserId};
use crate::tickets::TicketState;
use std::str::FromStr;

/// Label shown for a ticket without an assignee
pub const UNASSIGNED: &str = "Unassigned";

/// Label shown for an assignee id that matches no known user
pub const UNKNOWN_USER: &str = "Unknown";

/// Completion state of a ticket as presented to users
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketStatus {
    /// Completed
    Complete,
    /// Not completed yet
    Incomplete,
}

impl TicketStatus {
    /// Status for a completion flag
    #[must_use]
    pub const fn of(completed: bool) -> Self {
        if completed { Self::Complete } else { Self::Incomplete }
    }

    /// Machine value, as used by filters
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Complete => "completed",
            Self::Incomplete => "incomplete",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Complete => "Complete",
            Self::Incomplete => "Incomplete",
        }
    }
}

/// Status filter of the ticket list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every ticket
    #[default]
    All,
    /// Completed tickets only
    Completed,
    /// Incomplete tickets only
    Incomplete,
}

impl StatusFilter {
    /// Whether a ticket with this completion flag passes the filter
    #[must_use]
    pub const fn matches(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Completed => completed,
            Self::Incomplete => !completed,
        }
    }
}

/// Unrecognised status filter value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown status filter \"{0}\" (expected all, completed or incomplete)")]
pub struct ParseStatusFilterError(String);

impl FromStr for StatusFilter {
    type Err = ParseStatusFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            "incomplete" => Ok(Self::Incomplete),
            _ => Err(ParseStatusFilterError(s.to_string())),
        }
    }
}

/// Name to show for an assignee
///
/// Unresolved ids are labeled rather than treated as errors; assignee ids
/// are only a soft reference to the user list.
#[must_use]
pub fn assignee_name(assignee_id: Option<UserId>, users: &[User]) -> &str {
    let Some(id) = assignee_id else {
        return UNASSIGNED;
    };
    users
        .iter()
        .find(|user| user.id == id)
        .map_or(UNKNOWN_USER, |user| user.name.as_str())
}

/// Filters of the ticket list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Completion filter
    pub status: StatusFilter,
    /// Case-insensitive description search; empty matches everything
    pub description: String,
    /// Only tickets assigned to this user
    pub assignee: Option<UserId>,
}

impl TicketFilter {
    /// Filter that lets every ticket through
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status filter
    #[must_use]
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Sets the description search
    #[must_use]
    pub fn with_description(mut self, search: impl Into<String>) -> Self {
        self.description = search.into();
        self
    }

    /// Restricts to one assignee; `None` lifts the restriction
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<Option<UserId>>) -> Self {
        self.assignee = assignee.into();
        self
    }

    /// Whether `ticket` passes every filter
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        let search = self.description.trim().to_lowercase();
        self.status.matches(ticket.completed)
            && (search.is_empty() || ticket.description.to_lowercase().contains(&search))
            && self.assignee.is_none_or(|id| ticket.assignee_id == Some(id))
    }

    /// Matching tickets, in their original order
    #[must_use]
    pub fn apply<'a>(&self, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
        tickets.iter().filter(|ticket| self.matches(ticket)).collect()
    }
}

/// One row of the ticket list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketSummary {
    /// Ticket id
    pub id: TicketId,
    /// Description
    pub description: String,
    /// Completion state
    pub status: TicketStatus,
    /// Assignee label
    pub assignee: String,
}

impl TicketSummary {
    /// Row for `ticket`, resolving its assignee against `users`
    #[must_use]
    pub fn new(ticket: &Ticket, users: &[User]) -> Self {
        Self {
            id: ticket.id,
            description: ticket.description.clone(),
            status: TicketStatus::of(ticket.completed),
            assignee: assignee_name(ticket.assignee_id, users).to_string(),
        }
    }
}

impl std::fmt::Display for TicketSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{:<4} {:<10} {:<12} {}",
            self.id,
            self.status.label(),
            self.assignee,
            self.description
        )
    }
}

/// Rows of the list view after filtering
#[must_use]
pub fn summaries(tickets: &[Ticket], users: &[User], filter: &TicketFilter) -> Vec<TicketSummary> {
    filter
        .apply(tickets)
        .into_iter()
        .map(|ticket| TicketSummary::new(ticket, users))
        .collect()
}

/// The details view of the selected ticket
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketDetail {
    /// Row data
    pub summary: TicketSummary,
    /// Assignee id, if any
    pub assignee_id: Option<UserId>,
    /// An assignment or status change is in flight; controls are disabled
    pub busy: bool,
}

impl TicketDetail {
    /// Details of the selected ticket, if there is one
    #[must_use]
    pub fn from_state(state: &TicketState, users: &[User]) -> Option<Self> {
        state.selected_ticket.as_ref().map(|ticket| Self {
            summary: TicketSummary::new(ticket, users),
            assignee_id: ticket.assignee_id,
            busy: state.assigning || state.status_updating,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn users() -> Vec<User> {
        vec![User::new(UserId::new(1), "Alice"), User::new(UserId::new(2), "Bob")]
    }

    fn tickets() -> Vec<Ticket> {
        vec![
            Ticket::new(TicketId::new(1), "Fix monitor arm").assigned_to(UserId::new(1)),
            Ticket::new(TicketId::new(2), "Move the desk").with_completed(true),
            Ticket::new(TicketId::new(3), "Replace MONITOR cable").assigned_to(UserId::new(7)),
        ]
    }

    #[test]
    fn status_labels_and_values() {
        assert_eq!(TicketStatus::of(true).label(), "Complete");
        assert_eq!(TicketStatus::of(false).label(), "Incomplete");
        assert_eq!(TicketStatus::of(true).value(), "completed");
        assert_eq!(TicketStatus::of(false).value(), "incomplete");
    }

    #[test]
    fn status_filter_parses_case_insensitively() {
        assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(" Completed".parse::<StatusFilter>().unwrap(), StatusFilter::Completed);
        assert_eq!("incomplete".parse::<StatusFilter>().unwrap(), StatusFilter::Incomplete);
        assert!("done".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn assignee_names_tolerate_missing_users() {
        let users = users();
        assert_eq!(assignee_name(None, &users), "Unassigned");
        assert_eq!(assignee_name(Some(UserId::new(2)), &users), "Bob");
        assert_eq!(assignee_name(Some(UserId::new(99)), &users), "Unknown");
    }

    #[test]
    fn filter_combines_status_search_and_assignee() {
        let tickets = tickets();

        let by_search = TicketFilter::new().with_description("monitor");
        let ids: Vec<_> = by_search.apply(&tickets).iter().map(|t| t.id.get()).collect();
        assert_eq!(ids, vec![1, 3]);

        let incomplete_for_alice = TicketFilter::new()
            .with_status(StatusFilter::Incomplete)
            .with_description("monitor")
            .with_assignee(UserId::new(1));
        let ids: Vec<_> = incomplete_for_alice
            .apply(&tickets)
            .iter()
            .map(|t| t.id.get())
            .collect();
        assert_eq!(ids, vec![1]);

        let completed = TicketFilter::new().with_status(StatusFilter::Completed);
        assert_eq!(completed.apply(&tickets).len(), 1);
    }

    #[test]
    fn optional_assignee_only_restricts_when_present() {
        let tickets = tickets();

        let anyone = TicketFilter::new().with_assignee(None::<UserId>);
        assert_eq!(anyone, TicketFilter::new());
        assert_eq!(anyone.apply(&tickets).len(), tickets.len());

        let alice = TicketFilter::new().with_assignee(Some(UserId::new(1)));
        assert_eq!(alice, TicketFilter::new().with_assignee(UserId::new(1)));
        assert!(alice.apply(&tickets).iter().all(|t| t.assignee_id == Some(UserId::new(1))));
    }

    #[test]
    fn summaries_resolve_assignees() {
        let rows = summaries(&tickets(), &users(), &TicketFilter::new());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].assignee, "Alice");
        assert_eq!(rows[1].assignee, "Unassigned");
        assert_eq!(rows[1].status, TicketStatus::Complete);
        assert_eq!(rows[2].assignee, "Unknown");
    }

    #[test]
    fn detail_is_busy_while_mutating() {
        let mut state = TicketState {
            selected_ticket: Some(tickets()[0].clone()),
            ..TicketState::new()
        };
        assert!(!TicketDetail::from_state(&state, &users()).unwrap().busy);

        state.status_updating = true;
        let detail = TicketDetail::from_state(&state, &users()).unwrap();
        assert!(detail.busy);
        assert_eq!(detail.summary.assignee, "Alice");

        // Loading does not lock the details controls
        state.status_updating = false;
        state.loading = true;
        assert!(!TicketDetail::from_state(&state, &users()).unwrap().busy);
    }

    #[test]
    fn no_selection_no_detail() {
        assert_eq!(TicketDetail::from_state(&TicketState::new(), &users()), None);
    }
}
