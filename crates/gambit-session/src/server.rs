//! The server's view of the match: who holds which seat.
//!
//! The server doesn't know the rules. It hands out teams in connection
//! order, says when both seats are filled, and relays moves and captures
//! to everyone unchanged. Clients validate and apply them.

use std::collections::HashMap;

use gambit_protocol::{ConnectionId, NetMessage, Recipient, Team, Welcome};

use crate::SessionError;

/// Seat assignment for one match.
///
/// `player_count` only ever goes up: a player who disconnects keeps their
/// ordinal and no later connection can claim it.
#[derive(Debug, Default)]
pub struct ServerSession {
    player_count: usize,
    assigned: HashMap<ConnectionId, Team>,
}

impl ServerSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many seats have been handed out.
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// The team assigned to `conn`, if any.
    pub fn team_of(&self, conn: ConnectionId) -> Option<Team> {
        self.assigned.get(&conn).copied()
    }

    /// Returns `true` once every playable seat is taken.
    pub fn is_full(&self) -> bool {
        self.player_count >= Team::PLAYABLE.len()
    }

    /// Handles a Welcome request from `origin`.
    ///
    /// Assigns the next team and answers `origin` alone. When this fills
    /// the last seat, a StartGame for everyone follows. A connection that
    /// already holds a team just gets its Welcome again.
    ///
    /// # Errors
    /// [`SessionError::Capacity`] when every team is taken. Nothing is
    /// assigned in that case.
    pub fn on_welcome(
        &mut self,
        origin: ConnectionId,
    ) -> Result<Vec<(Recipient, NetMessage)>, SessionError> {
        if let Some(&team) = self.assigned.get(&origin) {
            tracing::debug!(conn_id = %origin, %team, "repeated welcome");
            return Ok(vec![(Recipient::Connection(origin), welcome_for(team))]);
        }

        let ordinal = self.player_count + 1;
        let team = Team::PLAYABLE
            .get(self.player_count)
            .copied()
            .ok_or(SessionError::Capacity {
                ordinal: ordinal as i32,
                capacity: Team::PLAYABLE.len(),
            })?;

        self.player_count = ordinal;
        self.assigned.insert(origin, team);
        tracing::info!(conn_id = %origin, %team, ordinal, "team assigned");

        let mut out = vec![(Recipient::Connection(origin), welcome_for(team))];
        if self.player_count == Team::PLAYABLE.len() {
            tracing::info!("all seats taken, starting game");
            out.push((Recipient::All, NetMessage::StartGame));
        }
        Ok(out)
    }

    /// Sends a move or capture back out to every connection, the sender
    /// included.
    pub fn relay(&self, message: NetMessage) -> Vec<(Recipient, NetMessage)> {
        tracing::debug!(code = %message.code(), "relaying");
        vec![(Recipient::All, message)]
    }
}

fn welcome_for(team: Team) -> NetMessage {
    NetMessage::Welcome(Welcome {
        assigned_int_team: team.ordinal(),
        team,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_protocol::{Coord, MoveData};

    fn conn(n: u64) -> ConnectionId {
        ConnectionId::new(n)
    }

    #[test]
    fn test_first_player_gets_white() {
        let mut session = ServerSession::new();
        let out = session.on_welcome(conn(1)).unwrap();

        assert_eq!(
            out,
            vec![(
                Recipient::Connection(conn(1)),
                NetMessage::Welcome(Welcome {
                    assigned_int_team: 1,
                    team: Team::White,
                }),
            )]
        );
        assert_eq!(session.player_count(), 1);
        assert!(!session.is_full());
    }

    #[test]
    fn test_second_player_gets_black_and_starts_game() {
        let mut session = ServerSession::new();
        session.on_welcome(conn(1)).unwrap();
        let out = session.on_welcome(conn(2)).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(
            out[0].1,
            NetMessage::Welcome(Welcome {
                assigned_int_team: 2,
                team: Team::Black,
            })
        );
        assert_eq!(out[1], (Recipient::All, NetMessage::StartGame));
        assert_eq!(session.team_of(conn(2)), Some(Team::Black));
        assert!(session.is_full());
    }

    #[test]
    fn test_third_player_is_a_capacity_error() {
        let mut session = ServerSession::new();
        session.on_welcome(conn(1)).unwrap();
        session.on_welcome(conn(2)).unwrap();

        let err = session.on_welcome(conn(3)).unwrap_err();

        assert_eq!(
            err,
            SessionError::Capacity {
                ordinal: 3,
                capacity: 2,
            }
        );
        assert_eq!(session.player_count(), 2);
        assert_eq!(session.team_of(conn(3)), None);
    }

    #[test]
    fn test_repeated_welcome_resends_without_minting() {
        let mut session = ServerSession::new();
        session.on_welcome(conn(7)).unwrap();

        let out = session.on_welcome(conn(7)).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(session.player_count(), 1);
        assert_eq!(session.team_of(conn(7)), Some(Team::White));
    }

    #[test]
    fn test_start_game_sent_exactly_once() {
        let mut session = ServerSession::new();
        let mut starts = 0;
        for n in 1..=2 {
            starts += session
                .on_welcome(conn(n))
                .unwrap()
                .iter()
                .filter(|(_, m)| *m == NetMessage::StartGame)
                .count();
        }
        // A repeat from a seated player mustn't start it again.
        starts += session
            .on_welcome(conn(2))
            .unwrap()
            .iter()
            .filter(|(_, m)| *m == NetMessage::StartGame)
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_relay_broadcasts_unchanged() {
        let session = ServerSession::new();
        let mv = NetMessage::MakeMove(MoveData {
            team: Team::White,
            original_coord: Coord::new(2, 2),
            target_coord: Coord::new(2, 3),
        });

        assert_eq!(session.relay(mv), vec![(Recipient::All, mv)]);
    }
}
