//! Managed network (C8): the address book, node selection, and backoff
//! bookkeeping shared across concurrent requests.

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::Mutex;

use crate::node::NodeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    RoundRobin,
    LeastBusy,
    Randomized,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::RoundRobin
    }
}

struct NetworkState {
    nodes: Vec<NodeRecord>,
    round_robin_cursor: usize,
}

/// Shared, mutex-guarded node health and the selection policy over it. A
/// single short critical section around pick/update is sufficient at this
/// component's traffic scale; see the design notes on multi-node
/// contention.
pub struct Network {
    state: Mutex<NetworkState>,
    policy: SelectionPolicy,
    min_backoff: Duration,
    max_backoff: Duration,
}

impl Network {
    pub fn new(nodes: Vec<NodeRecord>, policy: SelectionPolicy, min_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            state: Mutex::new(NetworkState {
                nodes,
                round_robin_cursor: 0,
            }),
            policy,
            min_backoff,
            max_backoff,
        }
    }

    pub async fn node_count(&self) -> usize {
        self.state.lock().await.nodes.len()
    }

    /// Picks a node index for the next attempt. Nodes in cooldown are
    /// skipped unless every node is in cooldown, in which case the node
    /// with the earliest `backoff_until` is used immediately (fail-open).
    pub async fn pick(&self, now: Instant, rng: &mut impl Rng) -> usize {
        let mut state = self.state.lock().await;
        let healthy: Vec<usize> = (0..state.nodes.len())
            .filter(|&i| state.nodes[i].is_healthy(now))
            .collect();

        if healthy.is_empty() {
            return state
                .nodes
                .iter()
                .enumerate()
                .min_by_key(|(_, n)| n.backoff_until.unwrap_or(now))
                .map(|(i, _)| i)
                .expect("network has at least one node");
        }

        match self.policy {
            SelectionPolicy::RoundRobin => {
                let cursor = state.round_robin_cursor % healthy.len();
                state.round_robin_cursor = state.round_robin_cursor.wrapping_add(1);
                healthy[cursor]
            }
            SelectionPolicy::LeastBusy => *healthy
                .iter()
                .min_by_key(|&&i| {
                    let node = &state.nodes[i];
                    (node.in_flight_count, node.last_used_at.unwrap_or(now))
                })
                .expect("healthy is non-empty"),
            SelectionPolicy::Randomized => {
                let idx = rng.random_range(0..healthy.len());
                healthy[idx]
            }
        }
    }

    pub async fn mark_success(&self, index: usize, now: Instant) {
        let mut state = self.state.lock().await;
        state.nodes[index].mark_success(now, self.min_backoff);
    }

    pub async fn mark_failure(&self, index: usize, now: Instant, rng: &mut impl Rng) {
        let mut state = self.state.lock().await;
        let max_backoff = self.max_backoff;
        state.nodes[index].mark_failure(now, max_backoff, rng);
    }

    pub async fn backoff_wait(&self, index: usize, now: Instant) -> Duration {
        self.state.lock().await.nodes[index].backoff_wait(now)
    }

    pub async fn node_account_id(&self, index: usize) -> hashgraph_common::EntityId {
        self.state.lock().await.nodes[index].node_account_id.clone()
    }

    /// The node's first configured endpoint, used to open a lazy transport
    /// connection on first send.
    pub async fn node_endpoint(&self, index: usize) -> Option<std::net::SocketAddr> {
        self.state.lock().await.nodes[index].endpoints.first().copied()
    }

    /// Reloads the address book from a caller-supplied list, replacing the
    /// prior node set wholesale. Exposed for the "refresh from a designated
    /// system file" operation; parsing that file is the caller's concern.
    pub async fn refresh(&self, nodes: Vec<NodeRecord>) {
        let mut state = self.state.lock().await;
        state.nodes = nodes;
        state.round_robin_cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashgraph_common::EntityId;

    fn node(num: u64) -> NodeRecord {
        NodeRecord::new(EntityId::new(0, 0, num), vec![], Duration::from_millis(250))
    }

    #[tokio::test]
    async fn round_robin_rotates_through_healthy_nodes() {
        let network = Network::new(
            vec![node(3), node(4), node(5)],
            SelectionPolicy::RoundRobin,
            Duration::from_millis(250),
            Duration::from_secs(8),
        );
        let mut rng = rand::rng();
        let now = Instant::now();
        let first = network.pick(now, &mut rng).await;
        let second = network.pick(now, &mut rng).await;
        let third = network.pick(now, &mut rng).await;
        assert_ne!(first, second);
        assert_ne!(second, third);
    }

    #[tokio::test]
    async fn failure_rotates_node_out_and_success_resets_backoff() {
        let network = Network::new(
            vec![node(3), node(4)],
            SelectionPolicy::RoundRobin,
            Duration::from_millis(250),
            Duration::from_secs(8),
        );
        let mut rng = rand::rng();
        let now = Instant::now();
        network.mark_failure(0, now, &mut rng).await;

        let picked = network.pick(now, &mut rng).await;
        assert_eq!(picked, 1, "node 0 is cooling down, node 1 must be picked");

        network.mark_success(0, now + Duration::from_secs(60)).await;
        let wait = network
            .backoff_wait(0, now + Duration::from_secs(60))
            .await;
        assert_eq!(wait, Duration::ZERO);
    }

    #[tokio::test]
    async fn fail_open_when_every_node_is_cooling_down() {
        let network = Network::new(
            vec![node(3), node(4)],
            SelectionPolicy::RoundRobin,
            Duration::from_millis(250),
            Duration::from_secs(8),
        );
        let mut rng = rand::rng();
        let now = Instant::now();
        network.mark_failure(0, now, &mut rng).await;
        network.mark_failure(1, now, &mut rng).await;

        // Both nodes are in cooldown; pick must still return a node index
        // rather than stalling.
        let picked = network.pick(now, &mut rng).await;
        assert!(picked == 0 || picked == 1);
    }
}
