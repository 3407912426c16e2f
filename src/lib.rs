mod chain;
#[cfg(test)]
mod entity;
mod ext;
mod filter;
mod presence;
mod truthy;

pub use chain::{BranchState, Chain, Conditional};
pub use ext::{BackendQuery, ConditionExt, QueryFilterExt};
pub use filter::{Where, WhereIfPresent};
pub use presence::{compact, is_present, WhereArgs};
pub use truthy::Truthy;
