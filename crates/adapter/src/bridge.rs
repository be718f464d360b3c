//! Game-loop side of the adapter: applies inbound commands to a session and
//! produces the replies and observation broadcasts.

use crate::core::{GameSnapshot, PieceSource};
use crate::engine::Session;
use crate::protocol::{build_observation, create_ack};
use crate::runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};

#[derive(Debug, Default)]
pub struct GameLink {
    obs_seq: u64,
    last_broadcast: Option<GameSnapshot>,
    scratch: GameSnapshot,
}

impl GameLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&mut self) -> u64 {
        self.obs_seq += 1;
        self.obs_seq
    }

    /// Apply one inbound command. Action batches are applied in order and
    /// acknowledged with the command's `seq`.
    pub fn handle<S: PieceSource>(
        &mut self,
        session: &mut Session<S>,
        cmd: InboundCommand,
    ) -> OutboundMessage {
        match cmd.payload {
            InboundPayload::SnapshotRequest => {
                session.snapshot_into(&mut self.scratch);
                let seq = self.next_seq();
                OutboundMessage::ToClientObservation {
                    client_id: cmd.client_id,
                    obs: build_observation(&self.scratch, seq),
                }
            }
            InboundPayload::Actions(actions) => {
                for action in actions {
                    session.apply(action);
                }
                OutboundMessage::ToClientAck {
                    client_id: cmd.client_id,
                    ack: create_ack(cmd.seq),
                }
            }
        }
    }

    /// Broadcast for streaming clients, if anything changed since the last one.
    pub fn poll_changed<S: PieceSource>(&mut self, session: &Session<S>) -> Option<OutboundMessage> {
        session.snapshot_into(&mut self.scratch);
        if self.last_broadcast.as_ref() == Some(&self.scratch) {
            return None;
        }
        let seq = self.next_seq();
        let obs = build_observation(&self.scratch, seq);
        match self.last_broadcast.as_mut() {
            Some(last) => last.clone_from(&self.scratch),
            None => self.last_broadcast = Some(self.scratch.clone()),
        }
        Some(OutboundMessage::BroadcastObservation { obs })
    }

    /// Drain pending commands, reply to each, then broadcast any change.
    pub fn pump<S: PieceSource>(&mut self, adapter: &mut Adapter, session: &mut Session<S>) {
        while let Some(cmd) = adapter.try_recv() {
            let reply = self.handle(session, cmd);
            adapter.send(reply);
        }
        if let Some(msg) = self.poll_changed(session) {
            adapter.send(msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptedPieces;
    use crate::engine::SessionConfig;
    use crate::types::{GameAction, GamePhase, PieceKind};
    use arrayvec::ArrayVec;

    fn session() -> Session<ScriptedPieces> {
        Session::with_source(SessionConfig::default(), ScriptedPieces::repeat(PieceKind::O)).unwrap()
    }

    #[test]
    fn actions_are_applied_and_acked() {
        let mut s = session();
        let mut link = GameLink::new();
        let mut actions = ArrayVec::new();
        actions.push(GameAction::Start);
        actions.push(GameAction::MoveLeft);

        let reply = link.handle(
            &mut s,
            InboundCommand {
                client_id: 3,
                seq: 11,
                payload: InboundPayload::Actions(actions),
            },
        );
        match reply {
            OutboundMessage::ToClientAck { client_id, ack } => {
                assert_eq!(client_id, 3);
                assert_eq!(ack.seq, 11);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(s.phase(), GamePhase::Running);
        assert_eq!(s.game().active().unwrap().x, 3);
    }

    #[test]
    fn broadcast_only_on_change() {
        let mut s = session();
        let mut link = GameLink::new();

        assert!(link.poll_changed(&s).is_some());
        assert!(link.poll_changed(&s).is_none());

        s.apply(GameAction::Start);
        let Some(OutboundMessage::BroadcastObservation { obs }) = link.poll_changed(&s) else {
            panic!("expected broadcast");
        };
        assert_eq!(obs.seq, 2);
        assert!(obs.active.is_some());
        assert!(link.poll_changed(&s).is_none());
    }
}
