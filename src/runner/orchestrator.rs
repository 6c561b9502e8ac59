use super::RunError;
use super::processor::{FailureStage, ProcessOptions, SongOutcome, process_song};
use super::report::{RunReport, RunSummary};
use crate::app::config::{RunMode, RunSettings};
use crate::catalog::{CatalogConnector, RemoteActionClient};
use crate::domain::{EgressPath, SongRecord};
use crate::egress::{PortProbe, ProxyCandidate, ProxyListProvider, RelayServiceController};
use crate::reliability::{PROBE_INTERVAL, RelayState, wait_for_port};
use tracing::{debug, error, info, warn};

/// Keep the first `limit` candidates; 0 keeps all of them.
pub fn select_candidates(mut candidates: Vec<ProxyCandidate>, limit: usize) -> Vec<ProxyCandidate> {
    if limit > 0 {
        candidates.truncate(limit);
    }
    candidates
}

/// Drives the song list across egress paths according to the run mode.
///
/// Everything runs strictly in sequence. Each (egress path, song) unit gets
/// its own client, released before the next unit starts, except in the
/// direct mode where a single client serves the whole pass.
pub struct Orchestrator<C, L, S, P> {
    settings: RunSettings,
    options: ProcessOptions,
    connector: C,
    proxies: L,
    relay: S,
    probe: P,
}

impl<C, L, S, P> Orchestrator<C, L, S, P>
where
    C: CatalogConnector,
    L: ProxyListProvider,
    S: RelayServiceController,
    P: PortProbe,
{
    pub fn new(settings: RunSettings, connector: C, proxies: L, relay: S, probe: P) -> Self {
        let options = ProcessOptions::from_settings(&settings);
        Self {
            settings,
            options,
            connector,
            proxies,
            relay,
            probe,
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Run the configured mode over `songs`. The summary holds one report
    /// per completed pass and the error of an aborted one.
    pub async fn run(&self, songs: &[SongRecord]) -> RunSummary {
        if songs.is_empty() {
            info!("No songs configured, nothing to do");
            return RunSummary::default();
        }

        info!(mode = ?self.settings.mode, songs = songs.len(), "Run starting");
        match self.settings.mode {
            RunMode::None => RunSummary::completed(vec![self.run_local(songs).await]),
            RunMode::Proxy => match self.run_with_proxy(songs).await {
                Ok(report) => RunSummary::completed(vec![report]),
                Err(e) => RunSummary::aborted(Vec::new(), e),
            },
            RunMode::Tor => RunSummary::completed(vec![self.run_with_tor(songs).await]),
            RunMode::All => {
                let proxy = self.run_with_proxy(songs).await;
                if let Err(e) = &proxy {
                    error!(error = %e, "Proxy pass aborted, continuing with Tor rounds");
                }
                let tor = self.run_with_tor(songs).await;
                match proxy {
                    Ok(proxy) => RunSummary::completed(vec![proxy, tor]),
                    Err(e) => RunSummary::aborted(vec![tor], e),
                }
            }
            RunMode::Other => {
                warn!("Unrecognized run mode, falling back to a single direct pass");
                RunSummary::completed(vec![self.run_local(songs).await])
            }
        }
    }

    /// One pass over the songs on a single direct client.
    pub async fn run_local(&self, songs: &[SongRecord]) -> RunReport {
        let mut report = RunReport::start("none");
        let egress = EgressPath::Direct;

        let client = match self.connector.connect(&egress) {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "Could not build direct catalog client");
                for _ in songs {
                    report.record(&SongOutcome::Failed {
                        stage: FailureStage::Connect,
                    });
                }
                return report.finish();
            }
        };

        for (i, song) in songs.iter().enumerate() {
            info!(song = i + 1, songs = songs.len(), %song, "Processing song directly");
            let outcome = process_song(&client, song, &self.options).await;
            report.record(&outcome);
            self.settings.delay_ms.pause().await;
        }
        client.release().await;

        report.finish()
    }

    /// Every song through every selected proxy, proxy in the outer loop.
    pub async fn run_with_proxy(&self, songs: &[SongRecord]) -> Result<RunReport, RunError> {
        let proxy = &self.settings.proxy;

        let candidates = self
            .proxies
            .fetch_candidates(proxy.proxy_type)
            .await
            .map_err(|e| {
                error!(proxy_type = %proxy.proxy_type, error = %e, "Proxy list fetch failed");
                RunError::ProxyFetch(e)
            })?;
        info!(count = candidates.len(), proxy_type = %proxy.proxy_type, "Proxy list fetched");

        let selected = select_candidates(candidates, proxy.limit);
        if selected.is_empty() {
            error!(proxy_type = %proxy.proxy_type, "No proxy candidates to use");
            return Err(RunError::NoCandidates {
                proxy_type: proxy.proxy_type,
            });
        }

        let mut report = RunReport::start("proxy");
        for (p, candidate) in selected.iter().enumerate() {
            let egress = EgressPath::from_candidate(&candidate.endpoint, proxy.proxy_type);
            for (s, song) in songs.iter().enumerate() {
                info!(
                    proxy = p + 1,
                    proxies = selected.len(),
                    song = s + 1,
                    songs = songs.len(),
                    %song,
                    %egress,
                    "Processing song via proxy"
                );
                let outcome = self.process_unit(&egress, song).await;
                report.record(&outcome);
                self.settings.delay_ms.pause().await;
            }
        }

        Ok(report.finish())
    }

    /// Song passes over the local relay, rotating the circuit between rounds.
    pub async fn run_with_tor(&self, songs: &[SongRecord]) -> RunReport {
        let tor = &self.settings.tor;
        let egress = tor.egress();
        let platform = self.relay.platform();

        let mut manage = tor.manage_service;
        if manage && !platform.supports_service_control() {
            warn!(
                %platform,
                "Relay service control unsupported on this platform, start the relay manually"
            );
            manage = false;
        }

        let mut state = RelayState::NotStarted;
        if manage {
            transition(&mut state, RelayState::Starting);
            if !self.relay.start(&tor.service_name) {
                warn!(service = %tor.service_name, "Could not start relay service, continuing");
            }
            let ready = self.await_relay().await;
            transition(&mut state, ready);
        }

        let rounds = self.settings.effective_rounds();
        let mut report = RunReport::start("tor");
        for round in 1..=rounds {
            if manage && round > 1 {
                transition(&mut state, RelayState::Starting);
                if !self.relay.restart(&tor.service_name) {
                    warn!(service = %tor.service_name, round, "Could not restart relay service, continuing");
                }
                let ready = self.await_relay().await;
                transition(&mut state, ready);
            }

            for (s, song) in songs.iter().enumerate() {
                info!(
                    round,
                    rounds,
                    song = s + 1,
                    songs = songs.len(),
                    %song,
                    relay = %state,
                    "Processing song via relay"
                );
                let outcome = self.process_unit(&egress, song).await;
                report.record(&outcome);
                self.settings.delay_ms.pause().await;
            }
        }

        report.finish()
    }

    async fn await_relay(&self) -> RelayState {
        let tor = &self.settings.tor;
        let readiness = wait_for_port(
            &self.probe,
            &tor.socks_host,
            tor.socks_port,
            tor.wait_port(),
            PROBE_INTERVAL,
        )
        .await;
        RelayState::after_wait(readiness)
    }

    /// Fresh client for one song on one egress path, released afterwards.
    async fn process_unit(&self, egress: &EgressPath, song: &SongRecord) -> SongOutcome {
        let client = match self.connector.connect(egress) {
            Ok(client) => client,
            Err(e) => {
                warn!(%egress, %song, error = %e, "Could not build catalog client");
                return SongOutcome::Failed {
                    stage: FailureStage::Connect,
                };
            }
        };

        let outcome = process_song(&client, song, &self.options).await;
        client.release().await;
        debug!(%egress, %song, %outcome, "Unit finished");
        outcome
    }
}

fn transition(state: &mut RelayState, next: RelayState) {
    debug!(from = %state, to = %next, "Relay state");
    *state = next;
}
