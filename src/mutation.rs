use serde::{Deserialize, Serialize};

use crate::models::{Record, RecordId};

/// A confirmed backend result to fold into the in-memory list.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<R> {
    Create(R),
    Update(R),
    Delete(RecordId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl<R: Record> Mutation<R> {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create(_) => MutationKind::Create,
            Mutation::Update(_) => MutationKind::Update,
            Mutation::Delete(_) => MutationKind::Delete,
        }
    }

    pub fn id(&self) -> RecordId {
        match self {
            Mutation::Create(r) | Mutation::Update(r) => r.id(),
            Mutation::Delete(id) => *id,
        }
    }
}

/// Where a freshly created record lands in the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    Prepend,
    #[default]
    Append,
}

/// Fold one mutation into `list`.
///
/// Unknown ids make update and delete no-ops. A create whose id is
/// already present replaces that entry so ids stay unique.
pub fn apply_mutation<R: Record>(
    mut list: Vec<R>,
    mutation: Mutation<R>,
    position: InsertPosition,
) -> Vec<R> {
    match mutation {
        Mutation::Create(record) => {
            if let Some(slot) = list.iter_mut().find(|r| r.id() == record.id()) {
                *slot = record;
            } else {
                match position {
                    InsertPosition::Append => list.push(record),
                    InsertPosition::Prepend => list.insert(0, record),
                }
            }
        }
        Mutation::Update(record) => {
            if let Some(slot) = list.iter_mut().find(|r| r.id() == record.id()) {
                *slot = record;
            }
        }
        Mutation::Delete(id) => list.retain(|r| r.id() != id),
    }
    list
}
