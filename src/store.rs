use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::StoreError;
use crate::models::{GameType, Location, NewGameType, NewSession, Session, UserId};

/// What a completed fetch did to the in-memory list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// List replaced with this many records
    Applied(usize),
    /// A newer fetch was issued while this one was in flight
    Superseded,
}

#[derive(Debug)]
struct StoreState {
    sessions: Vec<Session>,
    locations: Vec<Location>,
    game_types: Vec<GameType>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            sessions: Vec::new(),
            locations: Vec::new(),
            game_types: GameType::defaults(),
        }
    }
}

/// Monotonic request ids for one list
#[derive(Debug, Default)]
struct Sequence(AtomicU64);

impl Sequence {
    fn issue(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }

    fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory view of the player's sessions, locations and game types.
///
/// A fetch replaces a whole list, an add appends the record the backend
/// stored. Only the most recently issued fetch for a list may replace it;
/// responses to older requests are dropped when they land. Adds begun
/// before a `reset` persist remotely but are not appended locally.
pub struct SessionStore<B> {
    backend: Arc<B>,
    state: RwLock<StoreState>,
    generation: AtomicU64,
    session_seq: Sequence,
    location_seq: Sequence,
    game_type_seq: Sequence,
}

impl<B: Backend> SessionStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: RwLock::new(StoreState::default()),
            generation: AtomicU64::new(0),
            session_seq: Sequence::default(),
            location_seq: Sequence::default(),
            game_type_seq: Sequence::default(),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub async fn sessions(&self) -> Vec<Session> {
        self.state.read().await.sessions.clone()
    }

    pub async fn locations(&self) -> Vec<Location> {
        self.state.read().await.locations.clone()
    }

    pub async fn game_types(&self) -> Vec<GameType> {
        self.state.read().await.game_types.clone()
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn require_user(&self) -> Result<UserId, StoreError> {
        match self.backend.current_user().await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(StoreError::AuthRequired),
            Err(e) => {
                warn!(error = %e, "identity lookup failed");
                Err(e.into())
            }
        }
    }

    pub async fn fetch_sessions(&self) -> Result<FetchOutcome, StoreError> {
        let ticket = self.session_seq.issue();
        let rows = self.backend.select_sessions().await.map_err(|e| {
            warn!(ticket, error = %e, "error fetching sessions");
            StoreError::from(e)
        })?;

        let mut state = self.state.write().await;
        if !self.session_seq.is_latest(ticket) {
            debug!(ticket, "discarding superseded session fetch");
            return Ok(FetchOutcome::Superseded);
        }
        state.sessions = rows.into_iter().map(Session::from).collect();
        debug!(ticket, count = state.sessions.len(), "sessions replaced");
        Ok(FetchOutcome::Applied(state.sessions.len()))
    }

    /// Persist a session for the signed-in player and append the stored record.
    pub async fn add_session(&self, session: NewSession) -> Result<Session, StoreError> {
        let generation = self.current_generation();
        let user = self.require_user().await?;
        let row = self
            .backend
            .insert_session(&user, &session.to_row())
            .await
            .map_err(|e| {
                warn!(error = %e, "error adding session");
                StoreError::from(e)
            })?;

        let stored = Session::from(row);
        info!(id = %stored.id, profit = stored.profit(), "session recorded");
        let mut state = self.state.write().await;
        if self.current_generation() == generation {
            state.sessions.push(stored.clone());
        } else {
            debug!(id = %stored.id, "store reset during add, session not appended");
        }
        Ok(stored)
    }

    pub async fn fetch_locations(&self) -> Result<FetchOutcome, StoreError> {
        let ticket = self.location_seq.issue();
        let locations = self.backend.select_locations().await.map_err(|e| {
            warn!(ticket, error = %e, "error fetching locations");
            StoreError::from(e)
        })?;

        let mut state = self.state.write().await;
        if !self.location_seq.is_latest(ticket) {
            debug!(ticket, "discarding superseded location fetch");
            return Ok(FetchOutcome::Superseded);
        }
        state.locations = locations;
        Ok(FetchOutcome::Applied(state.locations.len()))
    }

    pub async fn add_location(&self, name: &str) -> Result<Location, StoreError> {
        let generation = self.current_generation();
        let user = self.require_user().await?;
        let location = self.backend.insert_location(&user, name).await.map_err(|e| {
            warn!(error = %e, "error adding location");
            StoreError::from(e)
        })?;

        info!(id = %location.id, name = %location.name, "location added");
        let mut state = self.state.write().await;
        if self.current_generation() == generation {
            state.locations.push(location.clone());
        } else {
            debug!(id = %location.id, "store reset during add, location not appended");
        }
        Ok(location)
    }

    /// Fetched game types are listed after the seeded defaults, which a
    /// fetch never removes.
    pub async fn fetch_game_types(&self) -> Result<FetchOutcome, StoreError> {
        let ticket = self.game_type_seq.issue();
        let fetched = self.backend.select_game_types().await.map_err(|e| {
            warn!(ticket, error = %e, "error fetching game types");
            StoreError::from(e)
        })?;

        let mut state = self.state.write().await;
        if !self.game_type_seq.is_latest(ticket) {
            debug!(ticket, "discarding superseded game type fetch");
            return Ok(FetchOutcome::Superseded);
        }
        let mut game_types = GameType::defaults();
        game_types.extend(fetched);
        state.game_types = game_types;
        Ok(FetchOutcome::Applied(state.game_types.len()))
    }

    pub async fn add_game_type(&self, game_type: NewGameType) -> Result<GameType, StoreError> {
        let generation = self.current_generation();
        let user = self.require_user().await?;
        let stored = self
            .backend
            .insert_game_type(&user, &game_type)
            .await
            .map_err(|e| {
                warn!(error = %e, "error adding game type");
                StoreError::from(e)
            })?;

        info!(id = %stored.id, stake = %stored.label(), "game type added");
        let mut state = self.state.write().await;
        if self.current_generation() == generation {
            state.game_types.push(stored.clone());
        } else {
            debug!(id = %stored.id, "store reset during add, game type not appended");
        }
        Ok(stored)
    }

    /// Sign-out teardown: back to the seeded state, in-flight fetches and
    /// adds dropped.
    pub async fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.session_seq.invalidate();
        self.location_seq.invalidate();
        self.game_type_seq.invalidate();
        *self.state.write().await = StoreState::default();
        debug!("store reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::models::{NewSessionRow, SessionRow};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type Gates<T> = Mutex<VecDeque<oneshot::Receiver<T>>>;

    /// In-memory backend whose calls can be held open by the test
    #[derive(Default)]
    struct FakeBackend {
        user: Mutex<Option<UserId>>,
        rows: Mutex<Vec<SessionRow>>,
        locations: Mutex<Vec<Location>>,
        game_types: Mutex<Vec<GameType>>,
        gates: Gates<Vec<SessionRow>>,
        location_gates: Gates<Vec<Location>>,
        game_type_gates: Gates<Vec<GameType>>,
        insert_gates: Gates<()>,
        fail_selects: Mutex<bool>,
        inserts: Mutex<usize>,
        select_calls: Mutex<usize>,
    }

    impl FakeBackend {
        fn signed_in(user: &str) -> Self {
            let backend = Self::default();
            *backend.user.lock().unwrap() = Some(user.to_string());
            backend
        }

        fn gate(&self) -> oneshot::Sender<Vec<SessionRow>> {
            push_gate(&self.gates)
        }

        fn set_user(&self, user: &str) {
            *self.user.lock().unwrap() = Some(user.to_string());
        }

        fn select_calls(&self) -> usize {
            *self.select_calls.lock().unwrap()
        }

        fn fail_selects(&self) {
            *self.fail_selects.lock().unwrap() = true;
        }

        fn check_failure(&self) -> Result<(), BackendError> {
            if *self.fail_selects.lock().unwrap() {
                return Err(BackendError::Corrupt("connection reset".to_string()));
            }
            Ok(())
        }
    }

    fn push_gate<T>(gates: &Gates<T>) -> oneshot::Sender<T> {
        let (tx, rx) = oneshot::channel();
        gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Waits on the next queued gate, if any
    async fn pass_gate<T>(gates: &Gates<T>) -> Result<Option<T>, BackendError> {
        let gate = gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx
                .await
                .map(Some)
                .map_err(|_| BackendError::Corrupt("gate dropped".to_string())),
            None => Ok(None),
        }
    }

    async fn wait_until_drained<T>(gates: &Gates<T>) {
        while !gates.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn current_user(&self) -> Result<Option<UserId>, BackendError> {
            Ok(self.user.lock().unwrap().clone())
        }

        async fn select_sessions(&self) -> Result<Vec<SessionRow>, BackendError> {
            *self.select_calls.lock().unwrap() += 1;
            self.check_failure()?;
            if let Some(rows) = pass_gate(&self.gates).await? {
                return Ok(rows);
            }
            let rows = self.rows.lock().unwrap().clone();
            Ok(rows)
        }

        async fn insert_session(&self, user: &UserId, row: &NewSessionRow) -> Result<SessionRow, BackendError> {
            pass_gate(&self.insert_gates).await?;
            let mut inserts = self.inserts.lock().unwrap();
            *inserts += 1;
            let stored = SessionRow {
                id: format!("srv-{}", *inserts),
                user_id: user.clone(),
                date: row.date,
                location: row.location.clone(),
                buy_in: row.buy_in,
                cash_out: row.cash_out,
                duration: row.duration.clone(),
                game_type: row.game_type.clone(),
                notes: Some(row.notes.clone()),
                created_at: "2024-06-15T00:00:00Z".to_string(),
            };
            self.rows.lock().unwrap().push(stored.clone());
            Ok(stored)
        }

        async fn select_locations(&self) -> Result<Vec<Location>, BackendError> {
            self.check_failure()?;
            if let Some(locations) = pass_gate(&self.location_gates).await? {
                return Ok(locations);
            }
            let locations = self.locations.lock().unwrap().clone();
            Ok(locations)
        }

        async fn insert_location(&self, _user: &UserId, name: &str) -> Result<Location, BackendError> {
            pass_gate(&self.insert_gates).await?;
            *self.inserts.lock().unwrap() += 1;
            let location = Location { id: format!("loc-{name}"), name: name.to_string() };
            self.locations.lock().unwrap().push(location.clone());
            Ok(location)
        }

        async fn select_game_types(&self) -> Result<Vec<GameType>, BackendError> {
            self.check_failure()?;
            if let Some(game_types) = pass_gate(&self.game_type_gates).await? {
                return Ok(game_types);
            }
            let game_types = self.game_types.lock().unwrap().clone();
            Ok(game_types)
        }

        async fn insert_game_type(&self, _user: &UserId, gt: &NewGameType) -> Result<GameType, BackendError> {
            pass_gate(&self.insert_gates).await?;
            *self.inserts.lock().unwrap() += 1;
            let stored = GameType { id: "gt-1".to_string(), sb: gt.sb, bb: gt.bb, str: gt.str };
            self.game_types.lock().unwrap().push(stored.clone());
            Ok(stored)
        }
    }

    fn row(id: &str, day: u32) -> SessionRow {
        SessionRow {
            id: id.to_string(),
            user_id: "player-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            location: "Bellagio".to_string(),
            buy_in: 1000,
            cash_out: 1450,
            duration: "4h".to_string(),
            game_type: "2/5".to_string(),
            notes: None,
            created_at: "2024-02-20T00:00:00Z".to_string(),
        }
    }

    fn new_session() -> NewSession {
        NewSession {
            date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            location: "Aria".to_string(),
            buy_in: 500,
            cash_out: 850,
            duration: "3h".to_string(),
            game_type: "1/2".to_string(),
            notes: Some("deep stacked".to_string()),
        }
    }

    fn ids(sessions: &[Session]) -> Vec<String> {
        sessions.iter().map(|s| s.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_add_session_requires_identity() {
        let backend = Arc::new(FakeBackend::default());
        let store = SessionStore::new(backend.clone());

        let result = store.add_session(new_session()).await;

        assert!(matches!(result, Err(StoreError::AuthRequired)));
        assert_eq!(*backend.inserts.lock().unwrap(), 0);
        assert!(store.sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_session_appends_server_record() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        let store = SessionStore::new(backend.clone());

        let stored = store.add_session(new_session()).await.unwrap();

        assert_eq!(stored.id, "srv-1");
        assert_eq!(stored.notes.as_deref(), Some("deep stacked"));
        assert_eq!(store.sessions().await, vec![stored]);
    }

    #[tokio::test]
    async fn test_fetch_replaces_sessions() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        let store = SessionStore::new(backend.clone());
        store.add_session(new_session()).await.unwrap();
        assert_eq!(store.sessions().await.len(), 1);

        *backend.rows.lock().unwrap() = vec![row("a", 20), row("b", 18)];
        let outcome = store.fetch_sessions().await.unwrap();

        assert_eq!(outcome, FetchOutcome::Applied(2));
        assert_eq!(ids(&store.sessions().await), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_prior_list() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        *backend.rows.lock().unwrap() = vec![row("a", 20)];
        let store = SessionStore::new(backend.clone());
        store.fetch_sessions().await.unwrap();

        backend.fail_selects();
        let result = store.fetch_sessions().await;

        assert!(matches!(result, Err(StoreError::Remote(msg)) if msg.contains("connection reset")));
        assert_eq!(ids(&store.sessions().await), vec!["a"]);
    }

    #[tokio::test]
    async fn test_latest_issued_fetch_wins() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        let first_gate = backend.gate();
        let second_gate = backend.gate();
        let store = Arc::new(SessionStore::new(backend.clone()));

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_sessions().await }
        });
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_sessions().await }
        });
        while backend.select_calls() < 2 {
            tokio::task::yield_now().await;
        }

        // Newer request resolves first, the older one lands afterwards.
        second_gate.send(vec![row("new", 20)]).unwrap();
        while ids(&store.sessions().await) != vec!["new"] {
            tokio::task::yield_now().await;
        }
        first_gate.send(vec![row("stale", 1)]).unwrap();

        let mut outcomes = vec![first.await.unwrap().unwrap(), second.await.unwrap().unwrap()];
        outcomes.sort_by_key(|o| matches!(o, FetchOutcome::Superseded));

        assert_eq!(outcomes, vec![FetchOutcome::Applied(1), FetchOutcome::Superseded]);
        assert_eq!(ids(&store.sessions().await), vec!["new"]);
    }

    #[tokio::test]
    async fn test_reset_drops_in_flight_fetch() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        let gate = backend.gate();
        let store = Arc::new(SessionStore::new(backend.clone()));

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_sessions().await }
        });
        while backend.select_calls() < 1 {
            tokio::task::yield_now().await;
        }
        store.reset().await;
        gate.send(vec![row("old-user", 3)]).unwrap();

        assert_eq!(pending.await.unwrap().unwrap(), FetchOutcome::Superseded);
        assert!(store.sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_locations_replace_and_append() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        *backend.locations.lock().unwrap() = vec![Location { id: "1".to_string(), name: "Aria".to_string() }];
        let store = SessionStore::new(backend.clone());

        assert_eq!(store.fetch_locations().await.unwrap(), FetchOutcome::Applied(1));
        let added = store.add_location("Wynn").await.unwrap();

        assert_eq!(added.id, "loc-Wynn");
        let names: Vec<_> = store.locations().await.into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Aria", "Wynn"]);
    }

    #[tokio::test]
    async fn test_add_location_requires_identity() {
        let backend = Arc::new(FakeBackend::default());
        let store = SessionStore::new(backend.clone());

        assert!(matches!(store.add_location("Wynn").await, Err(StoreError::AuthRequired)));
        assert!(store.locations().await.is_empty());
        assert_eq!(*backend.inserts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_game_types_merge_with_defaults() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        *backend.game_types.lock().unwrap() =
            vec![GameType { id: "x".to_string(), sb: 25.0, bb: 50.0, str: None }];
        let store = SessionStore::new(backend.clone());

        assert_eq!(store.game_types().await.len(), 4);
        assert_eq!(store.fetch_game_types().await.unwrap(), FetchOutcome::Applied(5));
        // A second fetch does not stack another copy on top
        assert_eq!(store.fetch_game_types().await.unwrap(), FetchOutcome::Applied(5));

        let labels: Vec<_> = store.game_types().await.iter().map(GameType::label).collect();
        assert_eq!(labels, vec!["1/2", "2/5", "5/10", "10/20", "25/50"]);
    }

    #[tokio::test]
    async fn test_add_game_type_appends_stored_record() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        let store = SessionStore::new(backend.clone());

        let stored = store
            .add_game_type(NewGameType { sb: 1.0, bb: 3.0, str: Some(6.0) })
            .await
            .unwrap();

        assert_eq!(stored.id, "gt-1");
        let game_types = store.game_types().await;
        assert_eq!(game_types.len(), 5);
        assert_eq!(game_types[4].label(), "1/3/6");
    }

    #[tokio::test]
    async fn test_reset_restores_seeded_state() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        let store = SessionStore::new(backend.clone());
        store.add_session(new_session()).await.unwrap();
        store.add_location("Aria").await.unwrap();
        store.add_game_type(NewGameType { sb: 1.0, bb: 3.0, str: None }).await.unwrap();

        store.reset().await;

        assert!(store.sessions().await.is_empty());
        assert!(store.locations().await.is_empty());
        assert_eq!(store.game_types().await, GameType::defaults());
    }

    #[tokio::test]
    async fn test_add_in_flight_during_reset_is_not_appended() {
        let backend = Arc::new(FakeBackend::signed_in("alice"));
        let gate = push_gate(&backend.insert_gates);
        let store = Arc::new(SessionStore::new(backend.clone()));

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.add_session(new_session()).await }
        });
        wait_until_drained(&backend.insert_gates).await;

        backend.set_user("bob");
        store.reset().await;
        gate.send(()).unwrap();

        let stored = pending.await.unwrap().unwrap();
        assert_eq!(stored.id, "srv-1");
        assert!(store.sessions().await.is_empty());

        // Adds issued after the reset still append
        store.add_session(new_session()).await.unwrap();
        assert_eq!(ids(&store.sessions().await), vec!["srv-2"]);
    }

    #[tokio::test]
    async fn test_location_and_game_type_adds_dropped_by_reset() {
        let backend = Arc::new(FakeBackend::signed_in("alice"));
        let store = Arc::new(SessionStore::new(backend.clone()));

        let gate = push_gate(&backend.insert_gates);
        let location = tokio::spawn({
            let store = store.clone();
            async move { store.add_location("Wynn").await }
        });
        wait_until_drained(&backend.insert_gates).await;
        store.reset().await;
        gate.send(()).unwrap();
        assert!(location.await.unwrap().is_ok());
        assert!(store.locations().await.is_empty());

        let gate = push_gate(&backend.insert_gates);
        let game_type = tokio::spawn({
            let store = store.clone();
            async move { store.add_game_type(NewGameType { sb: 1.0, bb: 3.0, str: None }).await }
        });
        wait_until_drained(&backend.insert_gates).await;
        store.reset().await;
        gate.send(()).unwrap();
        assert!(game_type.await.unwrap().is_ok());
        assert_eq!(store.game_types().await, GameType::defaults());
    }

    #[tokio::test]
    async fn test_superseded_location_fetch_is_dropped() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        let gate = push_gate(&backend.location_gates);
        let store = Arc::new(SessionStore::new(backend.clone()));

        let older = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_locations().await }
        });
        wait_until_drained(&backend.location_gates).await;

        *backend.locations.lock().unwrap() = vec![Location { id: "2".to_string(), name: "Wynn".to_string() }];
        assert_eq!(store.fetch_locations().await.unwrap(), FetchOutcome::Applied(1));

        gate.send(vec![Location { id: "1".to_string(), name: "Stale".to_string() }]).unwrap();
        assert_eq!(older.await.unwrap().unwrap(), FetchOutcome::Superseded);

        let names: Vec<_> = store.locations().await.into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Wynn"]);
    }

    #[tokio::test]
    async fn test_superseded_game_type_fetch_is_dropped() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        let gate = push_gate(&backend.game_type_gates);
        let store = Arc::new(SessionStore::new(backend.clone()));

        let older = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_game_types().await }
        });
        wait_until_drained(&backend.game_type_gates).await;

        *backend.game_types.lock().unwrap() =
            vec![GameType { id: "new".to_string(), sb: 25.0, bb: 50.0, str: None }];
        assert_eq!(store.fetch_game_types().await.unwrap(), FetchOutcome::Applied(5));

        gate.send(vec![GameType { id: "old".to_string(), sb: 3.0, bb: 6.0, str: None }])
            .unwrap();
        assert_eq!(older.await.unwrap().unwrap(), FetchOutcome::Superseded);

        let labels: Vec<_> = store.game_types().await.iter().map(GameType::label).collect();
        assert_eq!(labels, vec!["1/2", "2/5", "5/10", "10/20", "25/50"]);
    }

    #[tokio::test]
    async fn test_location_fetch_failure_keeps_prior_list() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        *backend.locations.lock().unwrap() = vec![Location { id: "1".to_string(), name: "Aria".to_string() }];
        let store = SessionStore::new(backend.clone());
        store.fetch_locations().await.unwrap();

        backend.fail_selects();
        assert!(matches!(store.fetch_locations().await, Err(StoreError::Remote(_))));

        let names: Vec<_> = store.locations().await.into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Aria"]);
    }

    #[tokio::test]
    async fn test_game_type_fetch_failure_keeps_prior_list() {
        let backend = Arc::new(FakeBackend::signed_in("player-1"));
        *backend.game_types.lock().unwrap() =
            vec![GameType { id: "x".to_string(), sb: 25.0, bb: 50.0, str: None }];
        let store = SessionStore::new(backend.clone());
        store.fetch_game_types().await.unwrap();

        backend.fail_selects();
        assert!(matches!(store.fetch_game_types().await, Err(StoreError::Remote(_))));
        assert_eq!(store.game_types().await.len(), 5);
    }
}
