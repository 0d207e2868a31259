//! Boucle de rafraîchissement des sources et des métadonnées
//!
//! Les ticks sont séquencés: le suivant ne démarre qu'une fois le précédent
//! terminé, une réponse lente ne peut donc pas écraser un état plus récent.
//! Un endpoint en échec garde sa dernière valeur valide.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use plowmap::{MapView, MetadataCell, MetadataLookup, MetadataReader, SourceId};

use crate::feed::{Endpoint, Feed, FeedError};
use crate::report::{Outcome, TickReport};

/// Digest blake3 du dernier payload appliqué
type Digest = [u8; 32];

/// Boucle de rafraîchissement; seul écrivain des sources et du cache de métadonnées
pub struct RefreshLoop<M: MapView, F: Feed> {
    map: Arc<M>,
    feed: Arc<F>,
    metadata: MetadataCell,
    interval: Duration,
    sequence: u64,
    applied: HashMap<Endpoint, Digest>,
}

impl<M, F> RefreshLoop<M, F>
where
    M: MapView + 'static,
    F: Feed + 'static,
{
    pub fn new(map: Arc<M>, feed: Arc<F>, metadata: MetadataCell, interval: Duration) -> Self {
        Self {
            map,
            feed,
            metadata,
            interval,
            sequence: 0,
            applied: HashMap::new(),
        }
    }

    /// Lecteur du cache de métadonnées alimenté par cette boucle
    pub fn metadata(&self) -> MetadataReader {
        self.metadata.reader()
    }

    /// Nombre de ticks exécutés
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Exécute un tick: les trois fetchs en parallèle, puis application
    pub async fn tick(&mut self) -> TickReport {
        self.sequence += 1;
        let mut report = TickReport::new(self.sequence);
        let started = std::time::Instant::now();

        let (routes, vehicles, metadata) = futures::future::join3(
            self.feed.fetch(Endpoint::Routes),
            self.feed.fetch(Endpoint::Vehicles),
            self.feed.fetch(Endpoint::Metadata),
        )
        .await;

        let outcome = self.apply_features(Endpoint::Routes, SourceId::PlowRoutes, routes);
        report.record(Endpoint::Routes, outcome);
        let outcome = self.apply_features(Endpoint::Vehicles, SourceId::Plows, vehicles);
        report.record(Endpoint::Vehicles, outcome);
        let outcome = self.apply_metadata(metadata);
        report.record(Endpoint::Metadata, outcome);

        report.set_duration(started.elapsed());
        report.finalize();
        info!(sequence = report.sequence, "{}", report.summary());
        report
    }

    fn apply_features(
        &mut self,
        endpoint: Endpoint,
        source: SourceId,
        fetched: Result<Bytes, FeedError>,
    ) -> Outcome {
        let body = match self.fresh_body(endpoint, fetched) {
            Ok(Some(body)) => body,
            Ok(None) => return Outcome::Unchanged,
            Err(outcome) => return outcome,
        };

        match plowmap::decode_bytes(&body) {
            Ok(set) => {
                let features = set.len();
                let skipped = set.errors.len();
                self.map.set_source_data(source, set);
                self.remember(endpoint, &body);
                Outcome::Updated { features, skipped }
            }
            Err(e) => self.failed(FeedError::Decode {
                endpoint,
                reason: e.to_string(),
            }),
        }
    }

    fn apply_metadata(&mut self, fetched: Result<Bytes, FeedError>) -> Outcome {
        let endpoint = Endpoint::Metadata;
        let body = match self.fresh_body(endpoint, fetched) {
            Ok(Some(body)) => body,
            Ok(None) => return Outcome::Unchanged,
            Err(outcome) => return outcome,
        };

        match serde_json::from_slice::<MetadataLookup>(&body) {
            Ok(lookup) => {
                debug!(
                    streets = lookup.filter_values.streets.len(),
                    priorities = lookup.filter_values.priorities.len(),
                    "Metadata replaced"
                );
                self.metadata.replace(lookup);
                self.remember(endpoint, &body);
                Outcome::Updated {
                    features: 0,
                    skipped: 0,
                }
            }
            Err(e) => self.failed(FeedError::Decode {
                endpoint,
                reason: e.to_string(),
            }),
        }
    }

    /// `Ok(None)` si le payload est identique au dernier appliqué
    fn fresh_body(
        &self,
        endpoint: Endpoint,
        fetched: Result<Bytes, FeedError>,
    ) -> Result<Option<Bytes>, Outcome> {
        let body = fetched.map_err(|e| self.failed(e))?;
        let digest = blake3::hash(&body);
        if self.applied.get(&endpoint) == Some(digest.as_bytes()) {
            debug!(
                endpoint = %endpoint,
                digest = %hex::encode(&digest.as_bytes()[..8]),
                "Payload unchanged"
            );
            return Ok(None);
        }
        Ok(Some(body))
    }

    fn remember(&mut self, endpoint: Endpoint, body: &Bytes) {
        self.applied
            .insert(endpoint, *blake3::hash(body).as_bytes());
    }

    fn failed(&self, error: FeedError) -> Outcome {
        warn!(error = %error, "Refresh failed, keeping last known data");
        Outcome::Failed {
            message: error.to_string(),
        }
    }

    /// Lance la boucle en tâche de fond; le premier tick a lieu après un intervalle
    pub fn spawn(mut self) -> RefreshHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let (report_tx, report_rx) = watch::channel(None);
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_ms = period.as_millis() as u64, "Refresh loop started");

            loop {
                tokio::select! {
                    biased;
                    // Signal explicite ou handle abandonné
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let report = self.tick().await;
                        report_tx.send_replace(Some(report));
                    }
                }
            }

            info!(ticks = self.sequence, "Refresh loop stopped");
            self.sequence
        });

        RefreshHandle {
            shutdown: shutdown_tx,
            task,
            reports: report_rx,
        }
    }
}

/// Handle de la boucle lancée; l'abandonner arrête aussi la boucle
pub struct RefreshHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<u64>,
    reports: watch::Receiver<Option<TickReport>>,
}

impl RefreshHandle {
    /// Dernier rapport de tick publié
    pub fn reports(&self) -> watch::Receiver<Option<TickReport>> {
        self.reports.clone()
    }

    /// Arrête la boucle après le tick en cours; retourne le nombre de ticks exécutés
    pub async fn shutdown(self) -> Result<u64, JoinError> {
        let _ = self.shutdown.send(());
        self.task.await
    }
}
