//! Active liveness polling.
//!
//! # Responsibilities
//! - Periodically probe the monitored server
//! - Feed samples into the flap filter
//! - Announce confirmed transitions and publish the current state

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::{self, MissedTickBehavior};

use crate::config::MonitorConfig;
use crate::discord::Notifier;
use crate::health::state::{ConfirmationState, FlapFilter, LivenessSample, Transition};
use crate::observability::metrics;
use crate::probe::{ProbeError, ServerAddress, StatusProbe};

/// Drives a `StatusProbe` on a fixed interval and owns the server's `FlapFilter`.
pub struct PollLoop {
    address: ServerAddress,
    probe: Arc<dyn StatusProbe>,
    notifier: Arc<dyn Notifier>,
    filter: FlapFilter,
    interval: Duration,
    probe_timeout: Duration,
    state_tx: watch::Sender<ConfirmationState>,
}

impl PollLoop {
    pub fn new(
        address: ServerAddress,
        probe: Arc<dyn StatusProbe>,
        notifier: Arc<dyn Notifier>,
        config: &MonitorConfig,
    ) -> Self {
        let filter = FlapFilter::new(config.stability_threshold);
        let (state_tx, _) = watch::channel(filter.state());

        Self {
            address,
            probe,
            notifier,
            filter,
            interval: Duration::from_millis(config.interval_ms),
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
            state_tx,
        }
    }

    /// Receiver that observes the filter state after every tick.
    pub fn subscribe(&self) -> watch::Receiver<ConfirmationState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> ConfirmationState {
        self.filter.state()
    }

    /// Run until shutdown. Ticks never overlap: a slow tick delays the next
    /// one and missed ticks are skipped.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            address = %self.address,
            interval_ms = self.interval.as_millis() as u64,
            threshold = self.filter.threshold(),
            "Starting server monitor"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Server monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Take one sample.
    ///
    /// An unreachable server or unreadable status reply is a down sample.
    /// A probe that runs out of time leaves the filter untouched.
    pub async fn tick(&mut self) -> Option<Transition> {
        let outcome = time::timeout(self.probe_timeout, self.probe.query(&self.address))
            .await
            .unwrap_or_else(|_| Err(ProbeError::Timeout(self.probe_timeout.as_millis() as u64)));

        let sample = match outcome {
            Ok(result) => LivenessSample::new(result.online),
            Err(e @ ProbeError::Timeout(_)) => {
                tracing::warn!(address = %self.address, error = %e, "Server status poll timed out");
                metrics::record_probe("timeout");
                return None;
            }
            Err(e) => {
                tracing::warn!(address = %self.address, error = %e, "Error polling server status");
                LivenessSample::new(false)
            }
        };

        let observed = sample.classify();
        metrics::record_probe(observed.as_str());

        let transition = self.filter.observe(sample);
        let state = self.filter.state();
        self.state_tx.send_replace(state);

        tracing::debug!(
            address = %self.address,
            observed = %observed,
            consecutive = state.consecutive,
            confirmed = %state.last_confirmed,
            "Poll tick"
        );

        if let Some(transition) = transition {
            tracing::info!(
                address = %self.address,
                from = %transition.from,
                to = %transition.to,
                "Server confirmed {}",
                transition.to
            );
            metrics::record_transition(transition.to);

            if let Some(message) = transition.to.announcement() {
                self.notifier.deliver(message).await;
            }
        }

        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::state::{ServerState, OFFLINE_MESSAGE, ONLINE_MESSAGE};
    use crate::probe::{LivenessResult, McStatusProbe};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted outcomes; `None` hangs past any timeout.
    struct ScriptedProbe {
        script: Mutex<VecDeque<Option<Result<bool, ()>>>>,
        calls: AtomicUsize,
    }

    impl ScriptedProbe {
        fn new(script: Vec<Option<Result<bool, ()>>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl StatusProbe for ScriptedProbe {
        async fn query(&self, _address: &ServerAddress) -> Result<LivenessResult, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front().flatten();
            match next {
                Some(Ok(online)) => Ok(LivenessResult { online, ..Default::default() }),
                Some(Err(())) => Err(ProbeError::Payload("garbage".into())),
                None => {
                    time::sleep(Duration::from_secs(3600)).await;
                    Ok(LivenessResult::offline())
                }
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, text: &str) {
            self.sent.lock().unwrap().push(text.to_string());
        }
    }

    fn poll_loop(probe: Arc<ScriptedProbe>, notifier: Arc<RecordingNotifier>) -> PollLoop {
        PollLoop::new(
            ServerAddress::new("mc.test", 25565),
            probe,
            notifier,
            &MonitorConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_down_then_up_announces_each_once() {
        let probe = ScriptedProbe::new(
            [false, false, false, true, true, true].map(|b| Some(Ok(b))).to_vec(),
        );
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poll = poll_loop(probe, notifier.clone());

        let mut fired = Vec::new();
        for _ in 0..6 {
            fired.push(poll.tick().await.map(|t| t.to));
        }

        assert_eq!(
            fired,
            vec![None, Some(ServerState::Down), None, None, Some(ServerState::Up), None]
        );
        assert_eq!(*notifier.sent.lock().unwrap(), vec![OFFLINE_MESSAGE, ONLINE_MESSAGE]);
    }

    #[tokio::test]
    async fn test_query_error_counts_as_down_sample() {
        let api = ScriptedProbe::new(vec![Some(Ok(true)), Some(Err(())), Some(Ok(true))]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poll = poll_loop(api, notifier.clone());

        poll.tick().await;
        assert!(poll.tick().await.is_none());
        assert_eq!(
            poll.state(),
            ConfirmationState {
                last_observed: ServerState::Down,
                last_confirmed: ServerState::Unknown,
                consecutive: 1,
            }
        );

        // The error broke the run of Up samples.
        assert!(poll.tick().await.is_none());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_status_api_confirms_down() {
        // Bind and drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = Arc::new(
            McStatusProbe::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap(),
        );
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poll = PollLoop::new(
            ServerAddress::new("mc.test", 25565),
            api,
            notifier.clone(),
            &MonitorConfig::default(),
        );

        assert!(poll.tick().await.is_none());
        assert_eq!(poll.tick().await.map(|t| t.to), Some(ServerState::Down));
        assert_eq!(poll.state().last_confirmed, ServerState::Down);
        assert_eq!(*notifier.sent.lock().unwrap(), vec![OFFLINE_MESSAGE]);
    }

    #[tokio::test]
    async fn test_query_timeout_error_is_a_noop_tick() {
        struct SlowApi;

        #[async_trait]
        impl StatusProbe for SlowApi {
            async fn query(&self, _address: &ServerAddress) -> Result<LivenessResult, ProbeError> {
                Err(ProbeError::Timeout(4000))
            }
        }

        let notifier = Arc::new(RecordingNotifier::default());
        let mut poll = PollLoop::new(
            ServerAddress::new("mc.test", 25565),
            Arc::new(SlowApi),
            notifier.clone(),
            &MonitorConfig::default(),
        );

        for _ in 0..3 {
            assert!(poll.tick().await.is_none());
        }
        assert_eq!(poll.state(), ConfirmationState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_timeout_is_a_noop_tick() {
        let probe = ScriptedProbe::new(vec![Some(Ok(false)), None, Some(Ok(false))]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poll = poll_loop(probe, notifier.clone());

        poll.tick().await;
        let before = poll.state();
        assert!(poll.tick().await.is_none());
        assert_eq!(poll.state(), before);
        assert_eq!(poll.tick().await.map(|t| t.to), Some(ServerState::Down));
    }

    #[tokio::test]
    async fn test_state_is_published() {
        let probe = ScriptedProbe::new(vec![Some(Ok(true)), Some(Ok(true))]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poll = poll_loop(probe, notifier);
        let rx = poll.subscribe();

        poll.tick().await;
        poll.tick().await;

        let published = *rx.borrow();
        assert_eq!(published.last_confirmed, ServerState::Up);
        assert_eq!(published.consecutive, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_on_interval_until_shutdown() {
        let probe = ScriptedProbe::new(vec![Some(Ok(true)); 10]);
        let notifier = Arc::new(RecordingNotifier::default());
        let poll = poll_loop(probe.clone(), notifier.clone());
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(poll.run(rx));
        // Immediate first tick, then one every 5s.
        time::sleep(Duration::from_millis(10_500)).await;
        tx.send(()).unwrap();
        handle.await.unwrap();

        assert_eq!(probe.calls.load(Ordering::SeqCst), 3);
        assert_eq!(*notifier.sent.lock().unwrap(), vec![ONLINE_MESSAGE]);
    }
}
