// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use crate::error::GossipError;

/// Default ACK-wait timeout, kept for parity with the reference implementation's hard-coded
/// value. Unlike the reference, it is an overridable setting here (see REDESIGN FLAGS).
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(3);

/// Default mean gossip round interval.
pub const DEFAULT_GOSSIP_INTERVAL: Duration = Duration::from_secs(2);

/// Default jitter factor applied to the mean interval.
pub const DEFAULT_JITTER_FACTOR: f64 = 0.2;

/// How a [`crate::actors::shell::GossipShell`] discovers its peers.
///
/// Chosen once from [`Settings`] at startup; the three modes are mutually exclusive.
#[derive(Clone, Debug, Default)]
pub enum DiscoveryMode {
    /// Peers only ever arrive via [`crate::control::GossipControl::introduce`].
    #[default]
    Manual,

    /// Peers are derived from cluster membership events at or above a status floor.
    ClusterEvents { status_floor: crate::discovery::MemberStatus },

    /// Peers are derived from receptionist listings registered under a shared key.
    Receptionist { key: String },
}

/// Immutable configuration for one [`crate::actors::shell::GossipShell`].
///
/// Mirrors the teacher crate's `Config`/`ApplicationArguments` split: construct with
/// [`SettingsBuilder`], which validates before handing back a `Settings` value.
#[derive(Clone, Debug)]
pub struct Settings {
    pub gossip_interval: Duration,
    pub jitter_factor: f64,
    pub ack_timeout: Duration,
    pub discovery_mode: DiscoveryMode,
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Samples this round's effective interval: `mean * (1 + uniform(-f, +f))`.
    pub fn sample_interval(&self, rng: &mut impl rand::Rng) -> Duration {
        let jitter = rng.random_range(-self.jitter_factor..=self.jitter_factor);
        let factor = (1.0 + jitter).max(0.0);
        self.gossip_interval.mul_f64(factor)
    }
}

#[derive(Debug)]
pub struct SettingsBuilder {
    gossip_interval: Duration,
    jitter_factor: f64,
    ack_timeout: Duration,
    discovery_mode: DiscoveryMode,
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self {
            gossip_interval: DEFAULT_GOSSIP_INTERVAL,
            jitter_factor: DEFAULT_JITTER_FACTOR,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            discovery_mode: DiscoveryMode::Manual,
        }
    }
}

impl SettingsBuilder {
    pub fn with_gossip_interval(mut self, interval: Duration) -> Self {
        self.gossip_interval = interval;
        self
    }

    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor;
        self
    }

    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    pub fn with_discovery_mode(mut self, mode: DiscoveryMode) -> Self {
        self.discovery_mode = mode;
        self
    }

    pub fn build(self) -> Result<Settings, GossipError> {
        if self.gossip_interval.is_zero() {
            return Err(GossipError::InvalidSettings(
                "gossip_interval must be non-zero".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(GossipError::InvalidSettings(format!(
                "jitter_factor must be within [0, 1], got {}",
                self.jitter_factor
            )));
        }

        if self.ack_timeout.is_zero() {
            return Err(GossipError::InvalidSettings(
                "ack_timeout must be non-zero".to_string(),
            ));
        }

        Ok(Settings {
            gossip_interval: self.gossip_interval,
            jitter_factor: self.jitter_factor,
            ack_timeout: self.ack_timeout,
            discovery_mode: self.discovery_mode,
        })
    }
}
