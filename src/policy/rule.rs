use serde::Serialize;

use crate::auth::PrincipalContext;
use crate::policy::row::{OwnerIndex, ProtectedRow};
use crate::types::PolicyCommand;

/// A single condition in a policy's precedence chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "guard", rename_all = "snake_case")]
pub enum Guard {
    /// Non-production deployments see everything
    DevEnvironment,
    /// Staff, managers and admins
    Staff,
    AdminOrManager,
    /// `row.<field>` equals the principal's user id
    OwnerField { field: &'static str },
    /// `row.<field>` names a customer whose `user_id` is the principal
    OwnerViaCustomer { field: &'static str },
    /// `row.<field>` is literally `true`
    VisibilityFlag { field: &'static str },
}

impl Guard {
    pub fn matches(&self, ctx: &PrincipalContext, row: &ProtectedRow, owners: &OwnerIndex) -> bool {
        match *self {
            Guard::DevEnvironment => ctx.is_dev_environment(),
            Guard::Staff => ctx.is_staff(),
            Guard::AdminOrManager => ctx.is_admin() || ctx.is_manager(),
            Guard::OwnerField { field } => match (ctx.user_id(), row.uuid_field(field)) {
                (Some(user_id), Some(owner)) => user_id == owner,
                _ => false,
            },
            Guard::OwnerViaCustomer { field } => {
                let owner = row
                    .uuid_field(field)
                    .and_then(|customer_id| owners.owner_of(customer_id));
                match (ctx.user_id(), owner) {
                    (Some(user_id), Some(owner)) => user_id == owner,
                    _ => false,
                }
            }
            Guard::VisibilityFlag { field } => row.bool_field(field) == Some(true),
        }
    }

    /// Guards that depend on who owns the row rather than on who the principal is
    pub fn is_row_dependent(&self) -> bool {
        matches!(
            self,
            Guard::OwnerField { .. } | Guard::OwnerViaCustomer { .. } | Guard::VisibilityFlag { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Admit,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub guard: Guard,
    pub verdict: Verdict,
}

/// One consolidated policy: an ordered guard chain where the first match decides
/// and falling off the end denies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyPredicate {
    pub name: String,
    pub command: PolicyCommand,
    pub steps: Vec<Step>,
}

impl PolicyPredicate {
    pub fn new(name: impl Into<String>, command: PolicyCommand) -> Self {
        Self {
            name: name.into(),
            command,
            steps: Vec::new(),
        }
    }

    pub fn admit_if(mut self, guard: Guard) -> Self {
        self.steps.push(Step { guard, verdict: Verdict::Admit });
        self
    }

    pub fn deny_if(mut self, guard: Guard) -> Self {
        self.steps.push(Step { guard, verdict: Verdict::Deny });
        self
    }

    pub fn evaluate(&self, ctx: &PrincipalContext, row: &ProtectedRow, owners: &OwnerIndex) -> bool {
        self.steps
            .iter()
            .find(|step| step.guard.matches(ctx, row, owners))
            .map(|step| step.verdict == Verdict::Admit)
            .unwrap_or(false)
    }

    /// Decide from the principal alone when the chain allows it.
    ///
    /// Walks the steps until the first row-dependent guard. Returns `None` when the
    /// answer depends on row contents, so callers fall back to [`Self::evaluate`].
    pub fn principal_verdict(&self, ctx: &PrincipalContext) -> Option<bool> {
        let empty_row = ProtectedRow::default();
        let no_owners = OwnerIndex::new();
        for step in &self.steps {
            if step.guard.is_row_dependent() {
                return None;
            }
            if step.guard.matches(ctx, &empty_row, &no_owners) {
                return Some(step.verdict == Verdict::Admit);
            }
        }
        Some(false)
    }

    /// Guards in precedence order
    pub fn guards(&self) -> impl Iterator<Item = &Guard> {
        self.steps.iter().map(|step| &step.guard)
    }

    /// Whether the chain can admit anything at all
    pub fn has_admitting_step(&self) -> bool {
        self.steps.iter().any(|step| step.verdict == Verdict::Admit)
    }
}
