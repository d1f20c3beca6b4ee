//! Channel entity and the membership/mode model.

use std::collections::HashSet;

use crate::error::ChannelError;
use crate::state::ClientId;

/// Channel topic with metadata.
#[derive(Debug, Clone)]
pub struct Topic {
    pub text: String,
    pub set_by: String,
    pub set_at: i64,
}

/// Outcome of removing a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRemoval {
    /// The channel has no members left and must be dropped from the registry.
    pub empty: bool,
    /// Member promoted to operator because the last one left.
    pub promoted: Option<ClientId>,
}

/// A named multi-party group.
///
/// Invariants: the operator set is a subset of the membership set, and an
/// invitation is consumed by the join that uses it. An empty channel never
/// survives - the registry drops it on the removal that emptied it.
#[derive(Debug)]
pub struct Channel {
    pub name: String,
    members: HashSet<ClientId>,
    operators: HashSet<ClientId>,
    invited: HashSet<ClientId>,
    pub topic: Option<Topic>,
    /// Join key (+k); `None` means no key is required.
    pub key: Option<String>,
    /// Member cap (+l); `None` means unlimited.
    pub limit: Option<u32>,
    /// Invite-only flag (+i).
    pub invite_only: bool,
    /// Topic changes restricted to operators (+t).
    pub topic_restricted: bool,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: HashSet::new(),
            operators: HashSet::new(),
            invited: HashSet::new(),
            topic: None,
            key: None,
            limit: None,
            invite_only: false,
            topic_restricted: false,
        }
    }

    pub fn members(&self) -> &HashSet<ClientId> {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, id: ClientId) -> bool {
        self.members.contains(&id)
    }

    pub fn is_operator(&self, id: ClientId) -> bool {
        self.operators.contains(&id)
    }

    pub fn is_invited(&self, id: ClientId) -> bool {
        self.invited.contains(&id)
    }

    /// Pre-authorize a client to bypass invite-only.
    pub fn invite(&mut self, id: ClientId) {
        self.invited.insert(id);
    }

    /// Burn the client's invitation, if any.
    pub fn consume_invitation(&mut self, id: ClientId) {
        self.invited.remove(&id);
    }

    /// The invite-only and key gates, in that order.
    ///
    /// The capacity gate is separate ([`Self::check_capacity`]) because the
    /// invitation is consumed between the two: a join turned away at the
    /// limit has still burned its invitation.
    pub fn check_access(&self, id: ClientId, key: Option<&str>) -> Result<(), ChannelError> {
        if self.invite_only && !self.is_invited(id) {
            return Err(ChannelError::InviteOnlyChan(self.name.clone()));
        }
        if let Some(required) = &self.key {
            if key != Some(required.as_str()) {
                return Err(ChannelError::BadChannelKey(self.name.clone()));
            }
        }
        Ok(())
    }

    /// The user-limit gate.
    pub fn check_capacity(&self) -> Result<(), ChannelError> {
        if let Some(limit) = self.limit {
            if self.members.len() >= limit as usize {
                return Err(ChannelError::ChannelIsFull(self.name.clone()));
            }
        }
        Ok(())
    }

    /// Add a member, optionally granting operator status (channel creator).
    pub fn insert_member(&mut self, id: ClientId, operator: bool) {
        self.members.insert(id);
        if operator {
            self.operators.insert(id);
        }
    }

    pub fn grant_operator(&mut self, id: ClientId) {
        if self.members.contains(&id) {
            self.operators.insert(id);
        }
    }

    pub fn revoke_operator(&mut self, id: ClientId) {
        self.operators.remove(&id);
    }

    /// Remove a member, maintaining the operator invariant.
    ///
    /// If the removal leaves members but no operator, the member with the
    /// lowest connection identity is promoted.
    pub fn remove_member(&mut self, id: ClientId) -> MemberRemoval {
        self.members.remove(&id);
        self.operators.remove(&id);

        if self.members.is_empty() {
            return MemberRemoval {
                empty: true,
                promoted: None,
            };
        }

        let promoted = if self.operators.is_empty() {
            let lowest = self.members.iter().min().copied();
            if let Some(id) = lowest {
                self.operators.insert(id);
            }
            lowest
        } else {
            None
        };

        MemberRemoval {
            empty: false,
            promoted,
        }
    }
}
