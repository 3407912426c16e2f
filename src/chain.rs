use tracing::trace;

use crate::truthy::Truthy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BranchState {
    #[default]
    NoBranchTaken,
    BranchTaken,
}

impl BranchState {
    pub fn is_taken(self) -> bool {
        matches!(self, BranchState::BranchTaken)
    }
}

impl From<bool> for BranchState {
    fn from(value: bool) -> Self {
        if value {
            BranchState::BranchTaken
        } else {
            BranchState::NoBranchTaken
        }
    }
}

#[derive(Debug, Clone)]
enum Gate<S> {
    Active(S),
    Suppressed(S),
}

/// A false gate turns the chain into a sink that absorbs exactly one
/// forwarded call.
///
/// ```
/// use sea_orm_conditioner::Conditional;
///
/// let steps = Vec::<&str>::new()
///     .when(false)
///     .apply(|mut v| { v.push("skipped"); v })
///     .otherwise()
///     .apply(|mut v| { v.push("fallback"); v })
///     .into_inner();
///
/// assert_eq!(steps, ["fallback"]);
/// ```
#[derive(Debug, Clone)]
pub struct Chain<S> {
    gate: Gate<S>,
    last: BranchState,
}

impl<S> Chain<S> {
    pub fn new(subject: S) -> Self {
        Self {
            gate: Gate::Active(subject),
            last: BranchState::NoBranchTaken,
        }
    }

    pub fn when<C: Truthy>(self, condition: C) -> Self {
        let condition = condition.truthy();
        let subject = self.into_inner();
        Self::gated(subject, condition.into(), condition)
    }

    pub fn when_with<C, F>(self, condition: C, block: F) -> Self
    where
        C: Truthy,
        F: FnOnce(S) -> S,
    {
        let condition = condition.truthy();
        let subject = self.into_inner();
        Self::evaluated(subject, condition.into(), condition, block)
    }

    pub fn unless<C: Truthy>(self, condition: C) -> Self {
        self.when(!condition.truthy())
    }

    pub fn unless_with<C, F>(self, condition: C, block: F) -> Self
    where
        C: Truthy,
        F: FnOnce(S) -> S,
    {
        self.when_with(!condition.truthy(), block)
    }

    pub fn elsif<C: Truthy>(self, condition: C) -> Self {
        let condition = condition.truthy();
        let effective = !self.last.is_taken() && condition;
        let subject = self.into_inner();
        Self::gated(subject, condition.into(), effective)
    }

    pub fn elsif_with<C, F>(self, condition: C, block: F) -> Self
    where
        C: Truthy,
        F: FnOnce(S) -> S,
    {
        let condition = condition.truthy();
        let effective = !self.last.is_taken() && condition;
        let subject = self.into_inner();
        Self::evaluated(subject, condition.into(), effective, block)
    }

    pub fn otherwise(self) -> Self {
        let last = self.last;
        let subject = self.into_inner();
        Self::gated(subject, last, !last.is_taken())
    }

    pub fn otherwise_with<F>(self, block: F) -> Self
    where
        F: FnOnce(S) -> S,
    {
        let last = self.last;
        let subject = self.into_inner();
        Self::evaluated(subject, last, !last.is_taken(), block)
    }

    pub fn apply<F>(self, f: F) -> Self
    where
        F: FnOnce(S) -> S,
    {
        let subject = match self.gate {
            Gate::Active(subject) => f(subject),
            Gate::Suppressed(subject) => {
                trace!("suppressed call absorbed");
                subject
            }
        };

        Self {
            gate: Gate::Active(subject),
            last: self.last,
        }
    }

    pub fn try_apply<F, E>(self, f: F) -> Result<Self, E>
    where
        F: FnOnce(S) -> Result<S, E>,
    {
        let subject = match self.gate {
            Gate::Active(subject) => f(subject)?,
            Gate::Suppressed(subject) => {
                trace!("suppressed call absorbed");
                subject
            }
        };

        Ok(Self {
            gate: Gate::Active(subject),
            last: self.last,
        })
    }

    pub fn subject(&self) -> &S {
        match &self.gate {
            Gate::Active(subject) | Gate::Suppressed(subject) => subject,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self.gate, Gate::Suppressed(_))
    }

    pub fn branch_state(&self) -> BranchState {
        self.last
    }

    pub fn into_inner(self) -> S {
        match self.gate {
            Gate::Active(subject) | Gate::Suppressed(subject) => subject,
        }
    }

    fn gated(subject: S, last: BranchState, condition: bool) -> Self {
        trace!(condition, taken = last.is_taken(), "gate evaluated");

        let gate = if condition {
            Gate::Active(subject)
        } else {
            Gate::Suppressed(subject)
        };

        Self { gate, last }
    }

    fn evaluated<F>(subject: S, last: BranchState, condition: bool, block: F) -> Self
    where
        F: FnOnce(S) -> S,
    {
        trace!(condition, taken = last.is_taken(), "block gate evaluated");

        let subject = if condition { block(subject) } else { subject };

        Self {
            gate: Gate::Active(subject),
            last,
        }
    }
}

pub trait Conditional: Sized {
    fn when<C: Truthy>(self, condition: C) -> Chain<Self> {
        Chain::new(self).when(condition)
    }

    fn when_with<C, F>(self, condition: C, block: F) -> Chain<Self>
    where
        C: Truthy,
        F: FnOnce(Self) -> Self,
    {
        Chain::new(self).when_with(condition, block)
    }

    fn unless<C: Truthy>(self, condition: C) -> Chain<Self> {
        Chain::new(self).unless(condition)
    }

    fn unless_with<C, F>(self, condition: C, block: F) -> Chain<Self>
    where
        C: Truthy,
        F: FnOnce(Self) -> Self,
    {
        Chain::new(self).unless_with(condition, block)
    }
}

impl<T> Conditional for T {}
