//! The closed set of operations a resource exposes.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A CRUD-style operation on a stored resource.
///
/// Names serialize in camelCase (`findUnique`, `deleteMany`, ...) so they
/// line up with the wire names callers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    FindUnique,
    FindUniqueOrThrow,
    FindFirst,
    FindFirstOrThrow,
    FindMany,
    Create,
    CreateMany,
    Update,
    UpdateMany,
    Delete,
    DeleteMany,
    Aggregate,
    GroupBy,
    Count,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 14] = [
        Operation::FindUnique,
        Operation::FindUniqueOrThrow,
        Operation::FindFirst,
        Operation::FindFirstOrThrow,
        Operation::FindMany,
        Operation::Create,
        Operation::CreateMany,
        Operation::Update,
        Operation::UpdateMany,
        Operation::Delete,
        Operation::DeleteMany,
        Operation::Aggregate,
        Operation::GroupBy,
        Operation::Count,
    ];

    /// The camelCase wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::FindUnique => "findUnique",
            Operation::FindUniqueOrThrow => "findUniqueOrThrow",
            Operation::FindFirst => "findFirst",
            Operation::FindFirstOrThrow => "findFirstOrThrow",
            Operation::FindMany => "findMany",
            Operation::Create => "create",
            Operation::CreateMany => "createMany",
            Operation::Update => "update",
            Operation::UpdateMany => "updateMany",
            Operation::Delete => "delete",
            Operation::DeleteMany => "deleteMany",
            Operation::Aggregate => "aggregate",
            Operation::GroupBy => "groupBy",
            Operation::Count => "count",
        }
    }

    /// Record lookups whose results may be served from cache.
    pub const fn is_read(&self) -> bool {
        matches!(
            self,
            Operation::FindUnique
                | Operation::FindUniqueOrThrow
                | Operation::FindFirst
                | Operation::FindFirstOrThrow
                | Operation::FindMany
        )
    }

    /// Operations that change stored state.
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Operation::Create
                | Operation::CreateMany
                | Operation::Update
                | Operation::UpdateMany
                | Operation::Delete
                | Operation::DeleteMany
        )
    }

    /// `delete` and `deleteMany`.
    pub const fn is_delete(&self) -> bool {
        matches!(self, Operation::Delete | Operation::DeleteMany)
    }

    /// Lookups that must fail when nothing matches.
    pub const fn requires_match(&self) -> bool {
        matches!(self, Operation::FindUniqueOrThrow | Operation::FindFirstOrThrow)
    }

    /// Whether the operation takes a `where` clause at all.
    pub const fn accepts_where(&self) -> bool {
        !matches!(self, Operation::Create | Operation::CreateMany)
    }

    /// Whether the operation writes a `data` payload.
    pub const fn accepts_data(&self) -> bool {
        matches!(
            self,
            Operation::Create | Operation::CreateMany | Operation::Update | Operation::UpdateMany
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}
