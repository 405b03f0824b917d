//! A single node's address-book entry: endpoints, health, and backoff.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use hashgraph_common::EntityId;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
    CoolingDown,
}

#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub node_account_id: EntityId,
    pub endpoints: Vec<SocketAddr>,
    pub cert_hash: Option<Vec<u8>>,
    pub health_state: HealthState,
    pub last_used_at: Option<Instant>,
    pub backoff_until: Option<Instant>,
    pub in_flight_count: u32,
    current_backoff: Duration,
}

impl NodeRecord {
    pub fn new(node_account_id: EntityId, endpoints: Vec<SocketAddr>, min_backoff: Duration) -> Self {
        Self {
            node_account_id,
            endpoints,
            cert_hash: None,
            health_state: HealthState::Healthy,
            last_used_at: None,
            backoff_until: None,
            in_flight_count: 0,
            current_backoff: min_backoff,
        }
    }

    pub fn is_healthy(&self, now: Instant) -> bool {
        match self.backoff_until {
            Some(until) => now >= until,
            None => true,
        }
    }

    /// Doubles the backoff (capped at `max_backoff`), applies uniform
    /// ±25% jitter, and schedules the node's cooldown window.
    pub fn mark_failure(&mut self, now: Instant, max_backoff: Duration, rng: &mut impl Rng) {
        self.health_state = HealthState::Unhealthy;
        self.current_backoff = (self.current_backoff * 2).min(max_backoff);
        let jitter_fraction = rng.random_range(-0.25..=0.25);
        let jittered_nanos =
            (self.current_backoff.as_nanos() as f64 * (1.0 + jitter_fraction)).max(0.0);
        let wait = Duration::from_nanos(jittered_nanos as u64);
        self.backoff_until = Some(now + wait);
    }

    pub fn mark_success(&mut self, now: Instant, min_backoff: Duration) {
        self.health_state = HealthState::Healthy;
        self.current_backoff = min_backoff;
        self.backoff_until = None;
        self.last_used_at = Some(now);
    }

    pub fn backoff_wait(&self, now: Instant) -> Duration {
        match self.backoff_until {
            Some(until) if until > now => until - now,
            _ => Duration::ZERO,
        }
    }
}
