//! SOS session manager — the state machine governing one citizen's
//! alert lifecycle (new → active → updated → deactivated).

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{error, info};

use citywatch_core::alert::SosAlert;
use citywatch_core::error::AppError;
use citywatch_core::result::AppResult;
use citywatch_core::traits::AlertStore;
use citywatch_core::types::ack::SosAck;
use citywatch_core::types::id::CitizenId;

use crate::connection::handle::ConnectionId;
use crate::event::types::{OutboundEvent, SosRequest};
use crate::room::POLICE_ROOM;
use crate::transport::AlertTransport;

/// Drives the SOS alert lifecycle over the store and transport seams.
///
/// Events for the same citizen are serialized through a keyed async
/// lock, so the find-active/write sequence cannot interleave with a
/// concurrent event from the same citizen and violate the
/// one-active-alert invariant.
pub struct SosSessionManager {
    store: Arc<dyn AlertStore>,
    transport: Arc<dyn AlertTransport>,
    /// Per-citizen serialization points. Entries live only while an
    /// event for the citizen is in flight; uncontended entries are
    /// reclaimed so the map stays proportional to concurrent events.
    citizen_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for SosSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SosSessionManager").finish()
    }
}

impl SosSessionManager {
    /// Create a session manager over its two collaborators.
    pub fn new(store: Arc<dyn AlertStore>, transport: Arc<dyn AlertTransport>) -> Self {
        Self {
            store,
            transport,
            citizen_locks: DashMap::new(),
        }
    }

    /// Handle one `sos_triggered` event.
    ///
    /// Infallible toward the caller: store and transport failures are
    /// logged here and converted into an error acknowledgement. At
    /// most one persistence write and one broadcast per invocation.
    ///
    /// `sender` is the originating connection, excluded from the
    /// `sos_alert` broadcast; `None` for REST-originated events.
    pub async fn handle_sos_event(
        &self,
        sender: Option<ConnectionId>,
        request: SosRequest,
    ) -> SosAck {
        match self.submit(sender, request).await {
            Ok(ack) => ack,
            Err(e) => {
                error!(kind = %e.kind, error = %e, "SOS event failed");
                SosAck::error(e.message)
            }
        }
    }

    /// Handle one SOS event, propagating failures to the caller.
    ///
    /// The REST surface uses this directly so validation failures can
    /// carry an HTTP status; the gateway goes through
    /// [`Self::handle_sos_event`], which folds errors into the ack.
    pub async fn submit(
        &self,
        sender: Option<ConnectionId>,
        request: SosRequest,
    ) -> AppResult<SosAck> {
        let citizen_id = match request.citizen_id.clone() {
            Some(id) => id,
            // A deactivation for an unknown citizen would flip nothing
            // and still alarm the police consoles.
            None if request.is_deactivation() => {
                return Err(AppError::validation(
                    "citizenId is required to deactivate an SOS",
                ))
            }
            None => CitizenId::generate(),
        };

        let lock = self.lock_for(&citizen_id);
        let result = {
            let _guard = lock.lock().await;
            self.process(sender, request, &citizen_id).await
        };
        drop(lock);
        self.reclaim_lock(&citizen_id);
        result
    }

    async fn process(
        &self,
        sender: Option<ConnectionId>,
        request: SosRequest,
        citizen_id: &CitizenId,
    ) -> AppResult<SosAck> {
        if request.is_deactivation() {
            return self.deactivate(citizen_id).await;
        }

        let location = request
            .location
            .ok_or_else(|| AppError::validation("location is required for an SOS alert"))?;
        let timestamp = request.timestamp.unwrap_or_else(Utc::now);

        if let Some(existing) = self.store.find_active(citizen_id).await? {
            let id = existing
                .id
                .ok_or_else(|| AppError::internal("stored alert has no id"))?;
            self.store.update_location(&id, location, timestamp).await?;
            // Only the initial alert is pushed; re-broadcasting every
            // GPS tick would flood the police consoles.
            return Ok(SosAck::success("Location updated"));
        }

        let mut alert = SosAlert::new_active(citizen_id.clone(), location, timestamp);
        let id = self.store.insert(&alert).await?;
        alert.id = Some(id);

        self.transport
            .emit_to_room(
                POLICE_ROOM,
                &OutboundEvent::SosAlert {
                    alert: alert.clone(),
                },
                sender,
            )
            .await?;

        info!(citizen_id = %citizen_id, alert_id = %id, "New SOS alert broadcast");
        Ok(SosAck::success_with("SOS alert sent", alert))
    }

    async fn deactivate(&self, citizen_id: &CitizenId) -> AppResult<SosAck> {
        let count = self.store.deactivate_all(citizen_id).await?;
        self.transport
            .emit_to_room(
                POLICE_ROOM,
                &OutboundEvent::SosDeactivated {
                    citizen_id: citizen_id.clone(),
                },
                None,
            )
            .await?;

        info!(citizen_id = %citizen_id, count, "SOS deactivated");
        Ok(SosAck::success("SOS deactivated"))
    }

    fn lock_for(&self, citizen_id: &CitizenId) -> Arc<Mutex<()>> {
        self.citizen_locks
            .entry(citizen_id.as_str().to_string())
            .or_default()
            .clone()
    }

    /// Drop the citizen's lock entry once no in-flight event holds it.
    ///
    /// `remove_if` serializes against `lock_for` on the shard, so an
    /// entry a concurrent event just cloned survives the check.
    fn reclaim_lock(&self, citizen_id: &CitizenId) {
        self.citizen_locks
            .remove_if(citizen_id.as_str(), |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use citywatch_core::alert::{AlertStatus, GeoPoint};
    use citywatch_core::types::ack::AckStatus;
    use citywatch_core::types::id::AlertId;
    use citywatch_store::MemoryAlertStore;

    /// Transport double that records every emission.
    #[derive(Default)]
    struct RecordingTransport {
        emitted: std::sync::Mutex<Vec<(String, OutboundEvent, Option<ConnectionId>)>>,
    }

    impl RecordingTransport {
        fn events(&self) -> Vec<(String, OutboundEvent, Option<ConnectionId>)> {
            self.emitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AlertTransport for RecordingTransport {
        async fn emit_to_room(
            &self,
            room: &str,
            event: &OutboundEvent,
            exclude: Option<ConnectionId>,
        ) -> AppResult<usize> {
            self.emitted
                .lock()
                .unwrap()
                .push((room.to_string(), event.clone(), exclude));
            Ok(1)
        }
    }

    /// Transport double whose every emission fails.
    struct FailingTransport;

    #[async_trait]
    impl AlertTransport for FailingTransport {
        async fn emit_to_room(
            &self,
            _room: &str,
            _event: &OutboundEvent,
            _exclude: Option<ConnectionId>,
        ) -> AppResult<usize> {
            Err(AppError::transport("broadcast channel down"))
        }
    }

    /// Store double whose every operation fails.
    struct FailingStore;

    #[async_trait]
    impl AlertStore for FailingStore {
        async fn insert(&self, _alert: &SosAlert) -> AppResult<AlertId> {
            Err(AppError::database("store unreachable"))
        }
        async fn find_active(&self, _citizen_id: &CitizenId) -> AppResult<Option<SosAlert>> {
            Err(AppError::database("store unreachable"))
        }
        async fn update_location(
            &self,
            _id: &AlertId,
            _location: GeoPoint,
            _timestamp: DateTime<Utc>,
        ) -> AppResult<bool> {
            Err(AppError::database("store unreachable"))
        }
        async fn deactivate_all(&self, _citizen_id: &CitizenId) -> AppResult<u64> {
            Err(AppError::database("store unreachable"))
        }
        async fn list_active(&self) -> AppResult<Vec<SosAlert>> {
            Err(AppError::database("store unreachable"))
        }
    }

    fn manager() -> (
        Arc<MemoryAlertStore>,
        Arc<RecordingTransport>,
        SosSessionManager,
    ) {
        let store = Arc::new(MemoryAlertStore::new());
        let transport = Arc::new(RecordingTransport::default());
        let manager = SosSessionManager::new(store.clone(), transport.clone());
        (store, transport, manager)
    }

    fn request(citizen: &str, latitude: f64, longitude: f64) -> SosRequest {
        SosRequest {
            citizen_id: Some(CitizenId::new(citizen)),
            location: Some(GeoPoint {
                latitude,
                longitude,
            }),
            ..SosRequest::default()
        }
    }

    #[tokio::test]
    async fn test_first_event_creates_alert_and_broadcasts_excluding_sender() {
        let (store, transport, manager) = manager();
        let sender = uuid::Uuid::new_v4();

        let ack = manager
            .handle_sos_event(Some(sender), request("c1", 19.07, 72.88))
            .await;

        assert_eq!(ack.status, AckStatus::Success);
        let data = ack.data.expect("ack carries the record");
        assert!(data.id.is_some());
        assert_eq!(data.status, AlertStatus::Active);

        let events = transport.events();
        assert_eq!(events.len(), 1);
        let (room, event, exclude) = &events[0];
        assert_eq!(room, "police");
        assert!(matches!(event, OutboundEvent::SosAlert { .. }));
        assert_eq!(*exclude, Some(sender));

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_second_event_updates_in_place_without_broadcast() {
        let (store, transport, manager) = manager();

        let first = manager.handle_sos_event(None, request("c1", 19.07, 72.88)).await;
        let first_id = first.data.expect("record").id;

        let ack = manager.handle_sos_event(None, request("c1", 19.08, 72.89)).await;
        assert_eq!(ack.status, AckStatus::Success);
        assert_eq!(ack.message, "Location updated");
        assert!(ack.data.is_none());

        // Still exactly one record, same id, new location.
        assert_eq!(store.len(), 1);
        let active = store
            .find_active(&CitizenId::new("c1"))
            .await
            .expect("find")
            .expect("active");
        assert_eq!(active.id, first_id);
        assert_eq!(active.location.latitude, 19.08);

        // Only the initial alert was broadcast.
        assert_eq!(transport.events().len(), 1);
    }

    #[tokio::test]
    async fn test_deactivation_flips_records_and_emits_once() {
        let (store, transport, manager) = manager();
        manager.handle_sos_event(None, request("c1", 19.07, 72.88)).await;

        let ack = manager
            .handle_sos_event(
                None,
                SosRequest {
                    citizen_id: Some(CitizenId::new("c1")),
                    status: Some("deactivated".to_string()),
                    ..SosRequest::default()
                },
            )
            .await;

        assert_eq!(ack.status, AckStatus::Success);
        assert_eq!(ack.message, "SOS deactivated");
        assert!(store
            .find_active(&CitizenId::new("c1"))
            .await
            .expect("find")
            .is_none());

        let events = transport.events();
        assert_eq!(events.len(), 2);
        match &events[1].1 {
            OutboundEvent::SosDeactivated { citizen_id } => {
                assert_eq!(citizen_id, &CitizenId::new("c1"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        // No sender exclusion on deactivation.
        assert_eq!(events[1].2, None);
    }

    #[tokio::test]
    async fn test_missing_location_yields_validation_error_and_no_write() {
        let (store, transport, manager) = manager();

        let ack = manager
            .handle_sos_event(
                None,
                SosRequest {
                    citizen_id: Some(CitizenId::new("c1")),
                    ..SosRequest::default()
                },
            )
            .await;

        assert_eq!(ack.status, AckStatus::Error);
        assert!(store.is_empty());
        assert!(transport.events().is_empty());
    }

    #[tokio::test]
    async fn test_missing_citizen_id_generates_one() {
        let (_store, _transport, manager) = manager();

        let ack = manager
            .handle_sos_event(
                None,
                SosRequest {
                    location: Some(GeoPoint {
                        latitude: 1.0,
                        longitude: 2.0,
                    }),
                    ..SosRequest::default()
                },
            )
            .await;

        let data = ack.data.expect("record");
        assert!(!data.citizen_id.as_str().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_becomes_error_ack() {
        let transport = Arc::new(RecordingTransport::default());
        let manager = SosSessionManager::new(Arc::new(FailingStore), transport.clone());

        let ack = manager.handle_sos_event(None, request("c1", 1.0, 2.0)).await;
        assert_eq!(ack.status, AckStatus::Error);
        assert!(transport.events().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_error_ack_after_insert() {
        let store = Arc::new(MemoryAlertStore::new());
        let manager = SosSessionManager::new(store.clone(), Arc::new(FailingTransport));

        let ack = manager.handle_sos_event(None, request("c1", 1.0, 2.0)).await;
        assert_eq!(ack.status, AckStatus::Error);
        // The insert lands before the emit, so the record survives a
        // failed broadcast and remains visible to the REST listing.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_deactivation_without_citizen_id_is_rejected() {
        let (store, transport, manager) = manager();

        let ack = manager
            .handle_sos_event(
                None,
                SosRequest {
                    status: Some("deactivated".to_string()),
                    ..SosRequest::default()
                },
            )
            .await;

        assert_eq!(ack.status, AckStatus::Error);
        assert!(store.is_empty());
        assert!(transport.events().is_empty());
    }

    #[tokio::test]
    async fn test_idle_lock_entries_are_reclaimed() {
        let (_store, _transport, manager) = manager();

        // Anonymous requests mint a fresh citizen id each; none of
        // them may leave a lock entry behind.
        for _ in 0..100 {
            manager
                .handle_sos_event(
                    None,
                    SosRequest {
                        location: Some(GeoPoint {
                            latitude: 1.0,
                            longitude: 2.0,
                        }),
                        ..SosRequest::default()
                    },
                )
                .await;
        }
        assert!(manager.citizen_locks.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_first_events_create_single_active_record() {
        let (store, transport, manager) = manager();
        let manager = Arc::new(manager);

        let mut tasks = Vec::new();
        for i in 0..8 {
            let manager = manager.clone();
            tasks.push(tokio::spawn(async move {
                manager
                    .handle_sos_event(None, request("c1", 19.0 + i as f64 * 0.01, 72.88))
                    .await
            }));
        }
        for task in tasks {
            let ack = task.await.expect("join");
            assert_eq!(ack.status, AckStatus::Success);
        }

        // One insert, seven in-place updates, one broadcast.
        assert_eq!(store.len(), 1);
        assert_eq!(transport.events().len(), 1);
    }
}
