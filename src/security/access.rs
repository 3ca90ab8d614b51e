use crate::error::AccessError;
use crate::session::UserId;
use arc_swap::ArcSwap;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Both access lists as persisted on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessLists {
    pub admins: BTreeSet<UserId>,
    pub allowed: BTreeSet<UserId>,
}

/// Gate deciding who may talk to the bot and who may administer it.
///
/// The admin list is fixed at construction. The allow-list is an `arc-swap`
/// snapshot: reads never block, writes publish a new set. Read-modify-write
/// sequences that also persist the list are serialised by the caller
/// (see `commands::CommandDispatcher`).
pub struct AccessController {
    admins: BTreeSet<UserId>,
    allowed: ArcSwap<BTreeSet<UserId>>,
}

impl AccessController {
    pub fn new(lists: AccessLists) -> Self {
        Self {
            admins: lists.admins,
            allowed: ArcSwap::from_pointee(lists.allowed),
        }
    }

    pub fn is_admin(&self, id: UserId) -> bool {
        self.admins.contains(&id)
    }

    /// An empty allow-list means open access.
    pub fn is_allowed(&self, id: UserId) -> bool {
        let allowed = self.allowed.load();
        allowed.is_empty() || allowed.contains(&id)
    }

    /// Gate for every inbound event.
    pub fn authorize(&self, id: UserId) -> Result<(), AccessError> {
        if self.is_allowed(id) {
            Ok(())
        } else {
            Err(AccessError::Unauthorized(id))
        }
    }

    /// Idempotent. Returns whether the list changed.
    pub fn add_allowed(&self, id: UserId) -> bool {
        let previous = self.allowed.rcu(|current| {
            let mut next = BTreeSet::clone(current);
            next.insert(id);
            next
        });
        !previous.contains(&id)
    }

    /// Admins can never be de-listed through this path, whatever the
    /// allow-list holds.
    pub fn remove_allowed(&self, id: UserId) -> Result<(), AccessError> {
        if self.is_admin(id) {
            return Err(AccessError::Forbidden(format!("user {id} is an admin")));
        }
        if self.discard_allowed(id) {
            Ok(())
        } else {
            Err(AccessError::NotFound(id))
        }
    }

    /// Removal without the admin check, used to undo an unsaved `add_allowed`.
    pub(crate) fn discard_allowed(&self, id: UserId) -> bool {
        let previous = self.allowed.rcu(|current| {
            let mut next = BTreeSet::clone(current);
            next.remove(&id);
            next
        });
        previous.contains(&id)
    }

    pub fn allowed(&self) -> Arc<BTreeSet<UserId>> {
        self.allowed.load_full()
    }

    pub fn admins(&self) -> &BTreeSet<UserId> {
        &self.admins
    }

    pub fn snapshot(&self) -> AccessLists {
        AccessLists {
            admins: self.admins.clone(),
            allowed: BTreeSet::clone(&self.allowed.load()),
        }
    }
}
