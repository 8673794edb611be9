//! Navigation state machine states and outcomes.

use crate::error::AbortReason;
use crate::resolver::RouteSnapshot;
use std::fmt;

/// Where the router is in handling a navigation.
///
/// ```text
/// idle --navigate--> resolving --resolved--> committing --done--> idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationPhase {
	/// No navigation in flight.
	#[default]
	Idle,
	/// Looking up the route for a request.
	Resolving,
	/// Running guards and applying the navigation.
	Committing,
}

impl NavigationPhase {
	/// Returns whether a navigation is in flight.
	pub fn is_busy(self) -> bool {
		!matches!(self, Self::Idle)
	}
}

impl fmt::Display for NavigationPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Idle => "idle",
			Self::Resolving => "resolving",
			Self::Committing => "committing",
		})
	}
}

/// How a navigation request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
	/// The route became current.
	Committed(RouteSnapshot),
	/// A guard or the prerequisite check declined.
	Aborted(AbortReason),
	/// Another navigation was in flight and this one was not forced.
	Rejected,
	/// An unexpected error occurred.
	Failed {
		/// The error message.
		error: String,
		/// Whether the router reached the error route afterwards.
		recovered: bool,
	},
}

impl NavigationOutcome {
	/// Returns `true` only for [`NavigationOutcome::Committed`].
	pub fn succeeded(&self) -> bool {
		matches!(self, Self::Committed(_))
	}

	/// Returns the committed route, if any.
	pub fn route(&self) -> Option<&RouteSnapshot> {
		match self {
			Self::Committed(route) => Some(route),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(NavigationPhase::Idle, false, "idle")]
	#[case(NavigationPhase::Resolving, true, "resolving")]
	#[case(NavigationPhase::Committing, true, "committing")]
	fn test_phase(#[case] phase: NavigationPhase, #[case] busy: bool, #[case] display: &str) {
		assert_eq!(phase.is_busy(), busy);
		assert_eq!(phase.to_string(), display);
	}

	#[rstest]
	fn test_only_committed_succeeds() {
		assert!(!NavigationOutcome::Rejected.succeeded());
		assert!(
			!NavigationOutcome::Aborted(AbortReason::GuardRejected { hook: 1 }).succeeded()
		);
		assert!(
			!NavigationOutcome::Failed {
				error: "boom".to_string(),
				recovered: true
			}
			.succeeded()
		);
	}
}
