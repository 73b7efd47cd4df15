//! Room registry — membership bookkeeping for broadcast audiences.
//!
//! Membership is in-memory only and exists for the connection's
//! lifetime; [`RoomRegistry::leave_all`] is invoked on disconnect.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

/// Registry of room memberships.
///
/// Keeps a forward map (room → members) for broadcast address
/// resolution and a reverse index (connection → rooms) so disconnect
/// cleanup does not scan every room.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name → member connection IDs.
    rooms: DashMap<String, HashSet<ConnectionId>>,
    /// Connection ID → room names (reverse index).
    memberships: DashMap<ConnectionId, HashSet<String>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room. Idempotent.
    pub fn join(&self, conn_id: ConnectionId, room: &str) {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn_id);
        self.memberships
            .entry(conn_id)
            .or_default()
            .insert(room.to_string());
    }

    /// Remove a connection from a room. Empty rooms are dropped.
    pub fn leave(&self, conn_id: ConnectionId, room: &str) {
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.remove(&conn_id);
            if members.is_empty() {
                drop(members);
                self.rooms.remove(room);
            }
        }
        if let Some(mut rooms) = self.memberships.get_mut(&conn_id) {
            rooms.remove(room);
        }
    }

    /// Remove a connection from every room it joined.
    pub fn leave_all(&self, conn_id: ConnectionId) {
        let rooms = self
            .memberships
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default();
        for room in &rooms {
            if let Some(mut members) = self.rooms.get_mut(room) {
                members.remove(&conn_id);
                if members.is_empty() {
                    drop(members);
                    self.rooms.remove(room);
                }
            }
        }
    }

    /// Snapshot of a room's members.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a connection is in a room.
    pub fn is_member(&self, conn_id: ConnectionId, room: &str) -> bool {
        self.rooms
            .get(room)
            .map(|members| members.contains(&conn_id))
            .unwrap_or(false)
    }

    /// Number of rooms a connection has joined.
    pub fn membership_count(&self, conn_id: ConnectionId) -> usize {
        self.memberships
            .get(&conn_id)
            .map(|rooms| rooms.len())
            .unwrap_or(0)
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_join_and_leave() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();

        registry.join(conn, "police");
        assert!(registry.is_member(conn, "police"));
        assert_eq!(registry.members("police"), vec![conn]);

        registry.leave(conn, "police");
        assert!(!registry.is_member(conn, "police"));
        // Empty rooms are dropped entirely.
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn test_join_is_idempotent() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();

        registry.join(conn, "police");
        registry.join(conn, "police");
        assert_eq!(registry.members("police").len(), 1);
        assert_eq!(registry.membership_count(conn), 1);
    }

    #[test]
    fn test_leave_all_clears_every_room() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();
        let other = Uuid::new_v4();

        registry.join(conn, "police");
        registry.join(conn, "dispatch");
        registry.join(other, "police");

        registry.leave_all(conn);
        assert_eq!(registry.membership_count(conn), 0);
        assert!(!registry.is_member(conn, "police"));
        assert!(registry.is_member(other, "police"));
    }
}
