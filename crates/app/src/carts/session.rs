//! Cart session.
//!
//! Keeps the locally persisted cart identifier consistent with the cart held
//! by the remote store. Every mutation runs against a validated cart and ends
//! with a fetch, so the snapshot converges on the server's view.
//!
//! A stored identifier goes through `Validating -> {Valid, Lost}`. A lost
//! identifier is recreated once and the fetch retried once; a second loss is
//! reported rather than retried.
//!
//! Fetches that overlap are ordered by ticket: each fetch draws the next value
//! from a monotonic counter and its result is only applied when that ticket is
//! newer than the one behind the current snapshot.

use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use tracing::{Span, debug, field, info, instrument, warn};

use crate::{
    carts::{
        errors::{CartSessionError, CartStoreError},
        models::{CartId, CartLineItem, CartSnapshot, LineId, Quantity},
        store::CartStore,
    },
    products::models::ProductId,
    storage::KeyValueStore,
};

/// Storage key holding the active cart identifier.
pub const CART_ID_KEY: &str = "cartId";

#[derive(Debug, Default)]
struct SessionState {
    identifier: Option<CartId>,
    snapshot: Option<CartSnapshot>,
    last_error: Option<String>,
    loading: usize,
    applied_ticket: u64,
}

enum Validation {
    Valid,
    Lost,
}

enum Fetch {
    Applied,
    Lost,
}

/// Owns the durable cart identifier and the last fetched snapshot.
///
/// All cart mutation goes through this type. Operations take `&self` and
/// never hold the state lock across an `.await`, so they may be interleaved.
pub struct CartSession {
    store: Arc<dyn CartStore>,
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<SessionState>,
    tickets: AtomicU64,
}

impl CartSession {
    /// Build a session, picking up any identifier left in storage by a
    /// previous run.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn restore(
        store: Arc<dyn CartStore>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CartSessionError> {
        let identifier = storage.get(CART_ID_KEY).await?.map(CartId::new);

        if let Some(cart) = &identifier {
            debug!(cart_id = %cart, "restored cart identifier");
        }

        Ok(Self {
            store,
            storage,
            state: Mutex::new(SessionState {
                identifier,
                ..SessionState::default()
            }),
            tickets: AtomicU64::new(0),
        })
    }

    /// The active cart identifier, if one has been created or restored.
    #[must_use]
    pub fn identifier(&self) -> Option<CartId> {
        self.state().identifier.clone()
    }

    /// The last applied snapshot. May be stale while a mutation is in flight.
    #[must_use]
    pub fn snapshot(&self) -> Option<CartSnapshot> {
        self.state().snapshot.clone()
    }

    /// Whether a refresh is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading > 0
    }

    /// Message of the most recent recorded failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    /// Return a cart identifier the store currently recognises, creating a
    /// cart when there is none or the stored one has been lost.
    ///
    /// # Errors
    ///
    /// Returns transport and storage failures. A lost cart is not an error.
    #[instrument(name = "cart_session.ensure", skip(self), err)]
    pub async fn ensure_session(&self) -> Result<CartId, CartSessionError> {
        let result = self.validate_or_create().await;

        self.recorded(result)
    }

    /// Fetch the cart and replace the snapshot.
    ///
    /// On failure the previous snapshot is kept and the error is also
    /// recorded in [`last_error`](Self::last_error).
    ///
    /// # Errors
    ///
    /// Returns the fetch failure, or [`CartSessionError::SessionLost`] when
    /// the replacement cart is not found either.
    #[instrument(name = "cart_session.refresh", skip(self), fields(ticket = field::Empty), err)]
    pub async fn refresh(&self) -> Result<(), CartSessionError> {
        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed) + 1;

        Span::current().record("ticket", ticket);

        let _loading = self.begin_loading();

        let result = self.fetch(ticket).await;

        if let Err(error) = &result {
            self.record_fetch_error(ticket, error);
        }

        result
    }

    /// Add `quantity` of a product. The store merges quantities when the
    /// product already has a line.
    ///
    /// # Errors
    ///
    /// Returns session, mutation or refresh failures.
    #[instrument(name = "cart_session.add_item", skip(self), fields(cart_id = field::Empty), err)]
    pub async fn add_item(
        &self,
        product: &ProductId,
        quantity: Quantity,
    ) -> Result<(), CartSessionError> {
        let cart = self.ensure_session().await?;

        Span::current().record("cart_id", field::display(&cart));

        let result = self.store.add_line_item(&cart, product, quantity).await;

        self.recorded(result.map_err(CartSessionError::from))?;

        self.refresh().await
    }

    /// Set the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns session, mutation or refresh failures.
    #[instrument(name = "cart_session.update_item", skip(self), fields(cart_id = field::Empty), err)]
    pub async fn update_item(
        &self,
        line: &LineId,
        quantity: Quantity,
    ) -> Result<(), CartSessionError> {
        let cart = self.ensure_session().await?;

        Span::current().record("cart_id", field::display(&cart));

        let result = self.store.update_line_item(&cart, line, quantity).await;

        self.recorded(result.map_err(CartSessionError::from))?;

        self.refresh().await
    }

    /// Raise a line's quantity by one. Lines missing from the snapshot are
    /// left alone.
    ///
    /// # Errors
    ///
    /// See [`update_item`](Self::update_item).
    pub async fn increment_item(&self, line: &LineId) -> Result<(), CartSessionError> {
        match self.line_quantity(line) {
            Some(quantity) => self.update_item(line, quantity.increment()).await,
            None => Ok(()),
        }
    }

    /// Lower a line's quantity by one, never below one. Removing a line is
    /// [`remove_item`](Self::remove_item)'s job.
    ///
    /// # Errors
    ///
    /// See [`update_item`](Self::update_item).
    pub async fn decrement_item(&self, line: &LineId) -> Result<(), CartSessionError> {
        match self.line_quantity(line) {
            Some(quantity) => self.update_item(line, quantity.decrement()).await,
            None => Ok(()),
        }
    }

    /// Delete a line.
    ///
    /// # Errors
    ///
    /// Returns session, mutation or refresh failures.
    #[instrument(name = "cart_session.remove_item", skip(self), fields(cart_id = field::Empty), err)]
    pub async fn remove_item(&self, line: &LineId) -> Result<(), CartSessionError> {
        let cart = self.ensure_session().await?;

        Span::current().record("cart_id", field::display(&cart));

        let result = self.store.delete_line_item(&cart, line).await;

        self.recorded(result.map_err(CartSessionError::from))?;

        self.refresh().await
    }

    /// Look up the snapshot line holding a product.
    #[must_use]
    pub fn find_line_by_product(&self, product: &ProductId) -> Option<CartLineItem> {
        self.state()
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.find_line_by_product(product))
            .cloned()
    }

    /// Whether the snapshot has a line for `product`.
    #[must_use]
    pub fn has_product(&self, product: &ProductId) -> bool {
        self.find_line_by_product(product).is_some()
    }

    /// Remove the line holding a product, if there is one.
    ///
    /// # Errors
    ///
    /// See [`remove_item`](Self::remove_item).
    pub async fn remove_by_product(&self, product: &ProductId) -> Result<(), CartSessionError> {
        match self.find_line_by_product(product) {
            Some(line) => self.remove_item(&line.id).await,
            None => Ok(()),
        }
    }

    /// Forget the cart without telling the store.
    ///
    /// Called after checkout, once the server has consumed the cart. Fetches
    /// still in flight are invalidated so they cannot bring the old cart back.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier cannot be removed from storage. The
    /// in-memory session is cleared regardless.
    #[instrument(name = "cart_session.discard", skip(self), err)]
    pub async fn discard_session_locally(&self) -> Result<(), CartSessionError> {
        {
            let mut state = self.state();

            if let Some(cart) = state.identifier.take() {
                info!(cart_id = %cart, "discarding cart session");
            }

            state.snapshot = None;
            state.last_error = None;
            state.applied_ticket = self.tickets.load(Ordering::Relaxed);
        }

        let result = self.storage.remove(CART_ID_KEY).await;

        self.recorded(result.map_err(CartSessionError::from))
    }

    async fn validate_or_create(&self) -> Result<CartId, CartSessionError> {
        if let Some(cart) = self.identifier() {
            match self.validate(&cart).await? {
                Validation::Valid => return Ok(cart),
                Validation::Lost => warn!(cart_id = %cart, "stored cart no longer exists"),
            }
        }

        self.create().await
    }

    async fn validate(&self, cart: &CartId) -> Result<Validation, CartStoreError> {
        match self.store.get_cart(cart).await {
            Ok(_) => Ok(Validation::Valid),
            Err(CartStoreError::NotFound) => Ok(Validation::Lost),
            Err(error) => Err(error),
        }
    }

    async fn create(&self) -> Result<CartId, CartSessionError> {
        let cart = self.store.create_cart().await?;

        self.storage.set(CART_ID_KEY, cart.as_str()).await?;

        self.state().identifier = Some(cart.clone());

        info!(cart_id = %cart, "created cart");

        Ok(cart)
    }

    async fn fetch(&self, ticket: u64) -> Result<(), CartSessionError> {
        let cart = match self.identifier() {
            Some(cart) => cart,
            None => self.validate_or_create().await?,
        };

        if let Fetch::Applied = self.fetch_once(ticket, &cart).await? {
            return Ok(());
        }

        warn!(cart_id = %cart, "cart session lost, creating a replacement");

        let replacement = self.create().await?;

        match self.fetch_once(ticket, &replacement).await? {
            Fetch::Applied => Ok(()),
            Fetch::Lost => Err(CartSessionError::SessionLost),
        }
    }

    async fn fetch_once(&self, ticket: u64, cart: &CartId) -> Result<Fetch, CartStoreError> {
        match self.store.get_cart(cart).await {
            Ok(snapshot) => {
                self.apply(ticket, snapshot);

                Ok(Fetch::Applied)
            }
            Err(CartStoreError::NotFound) => Ok(Fetch::Lost),
            Err(error) => Err(error),
        }
    }

    fn apply(&self, ticket: u64, snapshot: CartSnapshot) {
        let mut state = self.state();

        if ticket <= state.applied_ticket {
            debug!(ticket, applied = state.applied_ticket, "discarding stale cart response");

            return;
        }

        state.snapshot = Some(snapshot);
        state.last_error = None;
        state.applied_ticket = ticket;
    }

    fn record_fetch_error(&self, ticket: u64, error: &CartSessionError) {
        let mut state = self.state();

        if ticket <= state.applied_ticket {
            debug!(ticket, applied = state.applied_ticket, "discarding stale cart error");

            return;
        }

        state.last_error = Some(error.to_string());
        state.applied_ticket = ticket;
    }

    fn recorded<T>(&self, result: Result<T, CartSessionError>) -> Result<T, CartSessionError> {
        if let Err(error) = &result {
            self.state().last_error = Some(error.to_string());
        }

        result
    }

    fn line_quantity(&self, line: &LineId) -> Option<Quantity> {
        self.state()
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.find_line(line))
            .map(|item| item.quantity)
    }

    fn begin_loading(&self) -> LoadingGuard<'_> {
        {
            let mut state = self.state();

            state.loading += 1;
            state.last_error = None;
        }

        LoadingGuard { session: self }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CartSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSession")
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}

/// Clears the loading flag however a refresh exits.
struct LoadingGuard<'a> {
    session: &'a CartSession,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.session.state();

        state.loading = state.loading.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        carts::MockCartStore,
        storage::MemoryKeyValueStore,
        test::{FakeCartStore, snapshot, transport_error},
    };

    use super::*;

    async fn session_with(
        store: Arc<dyn CartStore>,
        storage: Arc<MemoryKeyValueStore>,
    ) -> Result<CartSession, CartSessionError> {
        CartSession::restore(store, storage).await
    }

    fn stored(cart: &str) -> Arc<MemoryKeyValueStore> {
        Arc::new(MemoryKeyValueStore::with_entries([(CART_ID_KEY, cart)]))
    }

    #[tokio::test]
    async fn restore_reads_identifier_from_storage() -> TestResult {
        let session = session_with(Arc::new(MockCartStore::new()), stored("abc")).await?;

        assert_eq!(session.identifier(), Some(CartId::from("abc")));
        assert!(session.snapshot().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn ensure_session_reuses_a_valid_identifier() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let cart = store.seed_cart();
        let session = session_with(store.clone(), stored(cart.as_str())).await?;

        assert_eq!(session.ensure_session().await?, cart);
        assert_eq!(session.ensure_session().await?, cart);
        assert_eq!(store.created(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn ensure_session_creates_a_cart_when_none_is_stored() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let storage = Arc::new(MemoryKeyValueStore::new());
        let session = session_with(store.clone(), storage.clone()).await?;

        let cart = session.ensure_session().await?;

        assert_eq!(store.created(), 1);
        assert_eq!(session.identifier(), Some(cart.clone()));
        assert_eq!(storage.get(CART_ID_KEY).await?.as_deref(), Some(cart.as_str()));

        Ok(())
    }

    #[tokio::test]
    async fn ensure_session_replaces_a_lost_identifier() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let storage = stored("abc");
        let session = session_with(store.clone(), storage.clone()).await?;

        let cart = session.ensure_session().await?;

        assert_ne!(cart.as_str(), "abc");
        assert_eq!(storage.get(CART_ID_KEY).await?.as_deref(), Some(cart.as_str()));
        assert!(session.last_error().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn ensure_session_propagates_transport_failures() -> TestResult {
        let mut store = MockCartStore::new();

        store
            .expect_get_cart()
            .once()
            .returning(|_| Err(transport_error()));

        store.expect_create_cart().never();

        let session = session_with(Arc::new(store), stored("abc")).await?;

        let result = session.ensure_session().await;

        assert!(
            matches!(result, Err(CartSessionError::Store(CartStoreError::Transport(_)))),
            "expected transport failure, got {result:?}"
        );
        assert_eq!(session.identifier(), Some(CartId::from("abc")));
        assert!(session.last_error().is_some());

        Ok(())
    }

    #[tokio::test]
    async fn refresh_recovers_from_a_lost_cart() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let storage = stored("abc");
        let session = session_with(store.clone(), storage.clone()).await?;

        session.refresh().await?;

        let cart = session.identifier().ok_or("identifier missing")?;
        let snapshot = session.snapshot().ok_or("snapshot missing")?;

        assert_ne!(cart.as_str(), "abc");
        assert_eq!(snapshot.id, cart);
        assert_eq!(storage.get(CART_ID_KEY).await?.as_deref(), Some(cart.as_str()));
        assert_eq!(store.created(), 1);
        assert!(session.last_error().is_none());
        assert!(!session.is_loading());

        Ok(())
    }

    #[tokio::test]
    async fn refresh_without_identifier_creates_one() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let session = session_with(store.clone(), Arc::new(MemoryKeyValueStore::new())).await?;

        session.refresh().await?;

        assert_eq!(store.created(), 1);
        assert!(session.snapshot().ok_or("snapshot missing")?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn refresh_retries_only_once() -> TestResult {
        let mut store = MockCartStore::new();

        store
            .expect_get_cart()
            .times(2)
            .returning(|_| Err(CartStoreError::NotFound));

        store
            .expect_create_cart()
            .once()
            .returning(|| Ok(CartId::from("fresh")));

        let storage = stored("abc");
        let session = session_with(Arc::new(store), storage.clone()).await?;

        let result = session.refresh().await;

        assert!(
            matches!(result, Err(CartSessionError::SessionLost)),
            "expected SessionLost, got {result:?}"
        );
        assert!(session.last_error().is_some());
        assert!(session.snapshot().is_none());
        assert_eq!(storage.get(CART_ID_KEY).await?.as_deref(), Some("fresh"));
        assert!(!session.is_loading());

        Ok(())
    }

    #[tokio::test]
    async fn refresh_surfaces_create_failure_during_recovery() -> TestResult {
        let mut store = MockCartStore::new();

        store
            .expect_get_cart()
            .once()
            .returning(|_| Err(CartStoreError::NotFound));

        store
            .expect_create_cart()
            .once()
            .returning(|| Err(transport_error()));

        let session = session_with(Arc::new(store), stored("abc")).await?;

        let result = session.refresh().await;

        assert!(
            matches!(result, Err(CartSessionError::Store(CartStoreError::Transport(_)))),
            "expected transport failure, got {result:?}"
        );
        assert_eq!(
            session.last_error(),
            Some(transport_error().to_string()),
            "transport failure should be surfaced verbatim"
        );

        Ok(())
    }

    #[tokio::test]
    async fn refresh_keeps_stale_snapshot_on_transport_failure() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let product = store.seed_product("p1", "Mug", Decimal::new(750, 2));
        let session = session_with(store.clone(), Arc::new(MemoryKeyValueStore::new())).await?;

        session.add_item(&product, Quantity::ONE).await?;

        let before = session.snapshot();

        store.fail_next_get(transport_error());

        let result = session.refresh().await;

        assert!(result.is_err());
        assert_eq!(session.snapshot(), before);
        assert!(session.last_error().is_some_and(|error| !error.is_empty()));
        assert!(!session.is_loading());

        Ok(())
    }

    #[tokio::test]
    async fn successful_refresh_clears_previous_error() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let session = session_with(store.clone(), Arc::new(MemoryKeyValueStore::new())).await?;

        session.refresh().await?;

        store.fail_next_get(transport_error());

        assert!(session.refresh().await.is_err());
        assert!(session.last_error().is_some());

        session.refresh().await?;

        assert!(session.last_error().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn add_item_converges_on_server_view() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let product = store.seed_product("p1", "Mug", Decimal::new(750, 2));
        let session = session_with(store.clone(), Arc::new(MemoryKeyValueStore::new())).await?;

        session.add_item(&product, Quantity::new(2)?).await?;

        let snapshot = session.snapshot().ok_or("snapshot missing")?;
        let [line] = snapshot.items.as_slice() else {
            return Err(format!("expected one line, got {:?}", snapshot.items).into());
        };

        assert_eq!(line.product.id, product);
        assert_eq!(line.quantity, Quantity::new(2)?);
        assert_eq!(line.subtotal, Decimal::new(1500, 2));
        assert_eq!(snapshot.grand_total, line.subtotal);

        Ok(())
    }

    #[tokio::test]
    async fn adding_a_product_twice_merges_server_side() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let product = store.seed_product("p1", "Mug", Decimal::new(750, 2));
        let session = session_with(store.clone(), Arc::new(MemoryKeyValueStore::new())).await?;

        session.add_item(&product, Quantity::ONE).await?;
        session.add_item(&product, Quantity::new(2)?).await?;

        let snapshot = session.snapshot().ok_or("snapshot missing")?;

        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.item_count(), 3);
        assert_eq!(store.created(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn decrement_never_drops_below_one() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let product = store.seed_product("p1", "Mug", Decimal::new(750, 2));
        let session = session_with(store.clone(), Arc::new(MemoryKeyValueStore::new())).await?;

        session.add_item(&product, Quantity::ONE).await?;

        let line = session.find_line_by_product(&product).ok_or("line missing")?;

        session.decrement_item(&line.id).await?;

        let line = session.find_line_by_product(&product).ok_or("line removed")?;

        assert_eq!(line.quantity, Quantity::ONE);

        Ok(())
    }

    #[tokio::test]
    async fn increment_and_decrement_adjust_by_one() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let product = store.seed_product("p1", "Mug", Decimal::new(750, 2));
        let session = session_with(store.clone(), Arc::new(MemoryKeyValueStore::new())).await?;

        session.add_item(&product, Quantity::new(2)?).await?;

        let line = session.find_line_by_product(&product).ok_or("line missing")?;

        session.increment_item(&line.id).await?;

        assert_eq!(
            session.find_line_by_product(&product).map(|line| line.quantity),
            Some(Quantity::new(3)?)
        );

        session.decrement_item(&line.id).await?;

        assert_eq!(
            session.find_line_by_product(&product).map(|line| line.quantity),
            Some(Quantity::new(2)?)
        );

        Ok(())
    }

    #[tokio::test]
    async fn adjusting_an_unknown_line_is_a_no_op() -> TestResult {
        let mut store = MockCartStore::new();

        store.expect_get_cart().never();
        store.expect_update_line_item().never();

        let session = session_with(Arc::new(store), stored("abc")).await?;

        session.increment_item(&LineId::from("9")).await?;
        session.decrement_item(&LineId::from("9")).await?;

        Ok(())
    }

    #[tokio::test]
    async fn update_item_sends_quantity_then_refreshes() -> TestResult {
        let mut store = MockCartStore::new();
        let quantity = Quantity::new(4)?;

        store
            .expect_get_cart()
            .times(2)
            .returning(|cart| Ok(snapshot(cart.as_str(), &[])));

        store
            .expect_update_line_item()
            .once()
            .with(eq(CartId::from("abc")), eq(LineId::from("7")), eq(quantity))
            .returning(|_, _, _| Ok(()));

        store.expect_create_cart().never();

        let session = session_with(Arc::new(store), stored("abc")).await?;

        session.update_item(&LineId::from("7"), quantity).await?;

        assert!(session.snapshot().is_some());

        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_records_error_without_refreshing() -> TestResult {
        let mut store = MockCartStore::new();

        store
            .expect_get_cart()
            .once()
            .returning(|cart| Ok(snapshot(cart.as_str(), &[])));

        store
            .expect_add_line_item()
            .once()
            .returning(|_, _, _| {
                Err(CartStoreError::Invalid(
                    "no valid product id try again".to_string(),
                ))
            });

        let session = session_with(Arc::new(store), stored("abc")).await?;

        let result = session.add_item(&ProductId::from("nope"), Quantity::ONE).await;

        assert!(result.is_err());
        assert_eq!(
            session.last_error().as_deref(),
            Some("no valid product id try again")
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_by_product_removes_the_line() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let mug = store.seed_product("p1", "Mug", Decimal::new(750, 2));
        let tea = store.seed_product("p2", "Tea", Decimal::new(300, 2));
        let session = session_with(store.clone(), Arc::new(MemoryKeyValueStore::new())).await?;

        session.add_item(&mug, Quantity::ONE).await?;
        session.add_item(&tea, Quantity::ONE).await?;

        assert!(session.has_product(&mug));

        session.remove_by_product(&mug).await?;

        assert!(!session.has_product(&mug));
        assert!(session.has_product(&tea));

        Ok(())
    }

    #[tokio::test]
    async fn remove_by_product_without_line_is_a_no_op() -> TestResult {
        let mut store = MockCartStore::new();

        store.expect_get_cart().never();
        store.expect_delete_line_item().never();

        let session = session_with(Arc::new(store), stored("abc")).await?;

        session.remove_by_product(&ProductId::from("p1")).await?;

        assert!(session.last_error().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn discard_clears_memory_and_storage() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let product = store.seed_product("p1", "Mug", Decimal::new(750, 2));
        let storage = Arc::new(MemoryKeyValueStore::new());
        let session = session_with(store.clone(), storage.clone()).await?;

        session.add_item(&product, Quantity::ONE).await?;

        let discarded = session.identifier().ok_or("identifier missing")?;

        session.discard_session_locally().await?;

        assert!(session.identifier().is_none());
        assert!(session.snapshot().is_none());
        assert_eq!(storage.get(CART_ID_KEY).await?, None);

        session.add_item(&product, Quantity::ONE).await?;

        let fresh = session.identifier().ok_or("identifier missing")?;

        assert_ne!(fresh, discarded);
        assert_eq!(store.created(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn older_fetch_cannot_overwrite_newer_snapshot() -> TestResult {
        let session = session_with(Arc::new(MockCartStore::new()), stored("abc")).await?;

        session.apply(2, snapshot("abc", &[("1", "p2", 1)]));
        session.apply(1, snapshot("abc", &[("1", "p1", 1)]));

        let snapshot = session.snapshot().ok_or("snapshot missing")?;

        assert!(snapshot.find_line_by_product(&ProductId::from("p2")).is_some());

        Ok(())
    }

    #[tokio::test]
    async fn discard_invalidates_in_flight_fetches() -> TestResult {
        let session = session_with(Arc::new(MockCartStore::new()), stored("abc")).await?;

        let ticket = session.tickets.fetch_add(1, Ordering::Relaxed) + 1;

        session.discard_session_locally().await?;
        session.apply(ticket, snapshot("abc", &[]));

        assert!(session.snapshot().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn interleaved_refreshes_settle_on_a_snapshot() -> TestResult {
        let store = Arc::new(FakeCartStore::new());
        let product = store.seed_product("p1", "Mug", Decimal::new(750, 2));
        let session = session_with(store.clone(), Arc::new(MemoryKeyValueStore::new())).await?;

        session.ensure_session().await?;

        let (added, refreshed) = tokio::join!(
            session.add_item(&product, Quantity::ONE),
            session.refresh()
        );

        added?;
        refreshed?;

        assert!(session.snapshot().is_some());
        assert!(!session.is_loading());
        assert_eq!(store.created(), 1);

        Ok(())
    }
}
