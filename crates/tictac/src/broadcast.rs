//! Fan-out of notifications to connected players.
//!
//! Every connection owns an unbounded outbound queue drained by its own
//! writer task. Pushing into a queue never waits on the socket, so one
//! slow or dead client cannot stall delivery to the rest.

use std::collections::HashMap;

use tictac_protocol::{PlayerId, ServerMessage};
use tokio::sync::{Mutex, mpsc};

/// The sending half of a player's outbound queue.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Routes notifications to one player, a table's players, or everyone.
#[derive(Debug, Default)]
pub struct Broadcaster {
    senders: Mutex<HashMap<PlayerId, PlayerSender>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player's queue, replacing any previous one.
    pub async fn register(&self, player_id: PlayerId, sender: PlayerSender) {
        self.senders.lock().await.insert(player_id, sender);
    }

    /// Drops a player's queue. Its writer task ends once the queue drains.
    pub async fn unregister(&self, player_id: PlayerId) {
        self.senders.lock().await.remove(&player_id);
    }

    pub async fn send_to(&self, player_id: PlayerId, msg: ServerMessage) {
        let senders = self.senders.lock().await;
        deliver(&senders, player_id, msg);
    }

    /// Sends `msg` to each listed player that is still connected.
    pub async fn send_to_players(&self, players: &[PlayerId], msg: &ServerMessage) {
        let senders = self.senders.lock().await;
        for player_id in players {
            deliver(&senders, *player_id, msg.clone());
        }
    }

    /// Sends `msg` to every connected player.
    pub async fn broadcast(&self, msg: &ServerMessage) {
        let senders = self.senders.lock().await;
        for (player_id, sender) in senders.iter() {
            if sender.send(msg.clone()).is_err() {
                tracing::trace!(%player_id, "broadcast to closed receiver dropped");
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.senders.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.senders.lock().await.is_empty()
    }
}

fn deliver(senders: &HashMap<PlayerId, PlayerSender>, player_id: PlayerId, msg: ServerMessage) {
    match senders.get(&player_id) {
        Some(sender) => {
            if sender.send(msg).is_err() {
                tracing::trace!(%player_id, "send to closed receiver dropped");
            }
        }
        None => tracing::trace!(%player_id, "send to unknown player dropped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_to_reaches_only_target() {
        let b = Broadcaster::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        b.register(PlayerId(1), tx1).await;
        b.register(PlayerId(2), tx2).await;

        b.send_to(PlayerId(1), ServerMessage::error("hi")).await;

        assert_eq!(rx1.try_recv().unwrap(), ServerMessage::error("hi"));
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_skips_closed_receivers() {
        let b = Broadcaster::new();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        b.register(PlayerId(1), tx1).await;
        b.register(PlayerId(2), tx2).await;
        drop(rx1);

        b.broadcast(&ServerMessage::error("all")).await;

        assert_eq!(rx2.try_recv().unwrap(), ServerMessage::error("all"));
    }

    #[tokio::test]
    async fn test_send_to_players_ignores_unknown_ids() {
        let b = Broadcaster::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        b.register(PlayerId(1), tx).await;

        b.send_to_players(&[PlayerId(1), PlayerId(7)], &ServerMessage::error("x"))
            .await;

        assert_eq!(rx.try_recv().unwrap(), ServerMessage::error("x"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery() {
        let b = Broadcaster::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        b.register(PlayerId(1), tx).await;
        b.unregister(PlayerId(1)).await;
        assert!(b.is_empty().await);

        b.broadcast(&ServerMessage::error("late")).await;
        // Sender dropped on unregister, so the queue is closed and empty.
        assert!(rx.recv().await.is_none());
    }
}
