mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{memory_db, product, FakeApi};
use storefront_client::{CartSynchronizer, ClientError, SessionGate, StorefrontApi};
use storefront_core::{CartLine, CoreError, Credentials, Money};

async fn setup(api: &Arc<FakeApi>) -> (Arc<SessionGate>, Arc<CartSynchronizer>) {
    let db = memory_db().await;
    let dyn_api: Arc<dyn StorefrontApi> = api.clone();
    let session = Arc::new(
        SessionGate::load(Arc::clone(&dyn_api), db.preferences())
            .await
            .unwrap(),
    );
    let cart = Arc::new(CartSynchronizer::new(dyn_api, Arc::clone(&session)));
    (session, cart)
}

async fn login(session: &SessionGate) {
    session
        .login(Credentials::new("shopper@example.com", "secret"))
        .await
        .unwrap();
}

fn quantities(lines: &[CartLine]) -> Vec<(&str, u32)> {
    lines.iter().map(|l| (l.product_id(), l.quantity)).collect()
}

// =============================================================================
// Anonymous mode
// =============================================================================

#[tokio::test]
async fn test_anonymous_total_follows_lines() {
    let api = FakeApi::new();
    let (_session, cart) = setup(&api).await;
    let p1 = product("p1", 100.0);
    let p2 = product("p2", 50.0);

    cart.add_item(&p1, 2).await.unwrap();
    cart.add_item(&p2, 1).await.unwrap();
    assert_eq!(cart.total(), Money::from_major(250.0));

    cart.decrement("p1").await.unwrap();
    cart.decrement("p1").await.unwrap();
    assert_eq!(cart.total(), Money::from_major(50.0));
    assert_eq!(quantities(&cart.lines()), [("p2", 1)]);

    // Nothing went over the wire.
    assert!(api.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_anonymous_add_merges_and_remove_filters() {
    let api = FakeApi::new();
    let (_session, cart) = setup(&api).await;
    let p1 = product("p1", 10.0);

    cart.add_item(&p1, 1).await.unwrap();
    cart.add_item(&p1, 3).await.unwrap();
    cart.increment("p1").await.unwrap();
    assert_eq!(quantities(&cart.lines()), [("p1", 5)]);

    cart.remove("p1").await.unwrap();
    assert!(cart.lines().is_empty());
    assert_eq!(cart.total(), Money::zero());
}

#[tokio::test]
async fn test_anonymous_rejects_zero_quantity_and_unknown_line() {
    let api = FakeApi::new();
    let (_session, cart) = setup(&api).await;

    assert!(cart.add_item(&product("p1", 10.0), 0).await.is_err());
    assert!(matches!(
        cart.increment("missing").await,
        Err(ClientError::Core(CoreError::ProductNotInCart(_)))
    ));
    assert!(cart.lines().is_empty());
}

#[tokio::test]
async fn test_total_is_published_to_subscribers() {
    let api = FakeApi::new();
    let (_session, cart) = setup(&api).await;
    let mut total = cart.subscribe_total();

    cart.add_item(&product("p1", 19.99), 3).await.unwrap();
    assert!(total.has_changed().unwrap());
    assert_eq!(*total.borrow_and_update(), Money::from_cents(5997));
}

// =============================================================================
// Authenticated mode
// =============================================================================

#[tokio::test]
async fn test_authenticated_mutations_go_through_the_server() {
    let p1 = product("p1", 100.0);
    let api = FakeApi::with_catalog(vec![p1.clone()]);
    let (session, cart) = setup(&api).await;
    login(&session).await;

    cart.add_item(&p1, 2).await.unwrap();
    assert_eq!(quantities(&cart.lines()), [("p1", 2)]);

    cart.increment("p1").await.unwrap();
    assert_eq!(quantities(&cart.lines()), [("p1", 3)]);

    cart.decrement("p1").await.unwrap();
    assert_eq!(cart.total(), Money::from_major(200.0));

    assert_eq!(api.count("add_to_cart"), 1);
    assert_eq!(api.count("update_cart_item"), 2);
    // One refetch after every mutation.
    assert_eq!(api.count("cart"), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments_apply_in_turn() {
    let p1 = product("p1", 100.0);
    let api = FakeApi::with_catalog(vec![p1.clone()]);
    api.set_remote_cart(vec![(p1, 1)]);
    let (session, cart) = setup(&api).await;
    login(&session).await;
    cart.refresh_for_session_change().await.unwrap();

    let taps: Vec<_> = (0..10)
        .map(|_| {
            let cart = Arc::clone(&cart);
            tokio::spawn(async move { cart.increment("p1").await })
        })
        .collect();
    for tap in taps {
        tap.await.unwrap().unwrap();
    }

    assert_eq!(quantities(&cart.lines()), [("p1", 11)]);
    assert_eq!(cart.total(), Money::from_major(1100.0));
    assert_eq!(api.count("update_cart_item"), 10);
}

#[tokio::test]
async fn test_authenticated_decrement_at_one_removes_remotely() {
    let p1 = product("p1", 100.0);
    let api = FakeApi::with_catalog(vec![p1.clone()]);
    api.set_remote_cart(vec![(p1, 1)]);
    let (session, cart) = setup(&api).await;
    login(&session).await;
    cart.refresh_for_session_change().await.unwrap();

    cart.decrement("p1").await.unwrap();

    assert_eq!(api.count("remove_cart_item"), 1);
    assert_eq!(api.count("update_cart_item"), 0);
    assert!(cart.lines().is_empty());
}

#[tokio::test]
async fn test_failed_remote_mutation_leaves_lines_untouched() {
    let p1 = product("p1", 100.0);
    let p2 = product("p2", 50.0);
    let api = FakeApi::with_catalog(vec![p1.clone(), p2.clone()]);
    api.set_remote_cart(vec![(p1, 2)]);
    let (session, cart) = setup(&api).await;
    login(&session).await;
    cart.refresh_for_session_change().await.unwrap();
    let before = cart.lines();

    api.fail("add_to_cart");
    let result = cart.add_item(&p2, 1).await;

    assert!(matches!(result, Err(ClientError::Api { status: 500, .. })));
    assert_eq!(cart.lines(), before);
    assert_eq!(cart.total(), Money::from_major(200.0));
    // No retry, no refetch.
    assert_eq!(api.count("add_to_cart"), 1);
    assert_eq!(api.count("cart"), 1);
}

#[tokio::test]
async fn test_failed_refetch_leaves_lines_untouched() {
    let p1 = product("p1", 100.0);
    let api = FakeApi::with_catalog(vec![p1.clone()]);
    api.set_remote_cart(vec![(p1, 2)]);
    let (session, cart) = setup(&api).await;
    login(&session).await;
    cart.refresh_for_session_change().await.unwrap();

    api.fail("cart");
    assert!(cart.increment("p1").await.is_err());
    assert_eq!(quantities(&cart.lines()), [("p1", 2)]);
}

// =============================================================================
// Session transitions
// =============================================================================

#[tokio::test]
async fn test_login_triggers_exactly_one_fetch_and_replaces_local_cart() {
    let remote = product("r1", 30.0);
    let api = FakeApi::with_catalog(vec![remote.clone()]);
    api.set_remote_cart(vec![(remote, 2)]);
    let (session, cart) = setup(&api).await;
    let _listener = cart.spawn_session_listener();

    cart.add_item(&product("local", 5.0), 1).await.unwrap();

    let mut lines = cart.subscribe();
    login(&session).await;
    tokio::time::timeout(
        Duration::from_secs(1),
        lines.wait_for(|l| l.iter().any(|line| line.product_id() == "r1")),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(api.count("cart"), 1);
    assert_eq!(quantities(&cart.lines()), [("r1", 2)]);
    assert_eq!(cart.total(), Money::from_major(60.0));
}

#[tokio::test]
async fn test_logout_clears_cart() {
    let p1 = product("p1", 100.0);
    let api = FakeApi::with_catalog(vec![p1.clone()]);
    api.set_remote_cart(vec![(p1, 1)]);
    let (session, cart) = setup(&api).await;
    login(&session).await;
    cart.refresh_for_session_change().await.unwrap();
    assert_eq!(cart.lines().len(), 1);

    session.logout().await.unwrap();
    cart.refresh_for_session_change().await.unwrap();

    assert!(cart.lines().is_empty());
    assert_eq!(cart.total(), Money::zero());
}

#[tokio::test]
async fn test_language_change_refetches_only_when_logged_in() {
    let api = FakeApi::new();
    let (session, cart) = setup(&api).await;

    cart.refresh_for_language_change().await.unwrap();
    assert_eq!(api.count("cart"), 0);

    login(&session).await;
    cart.refresh_for_language_change().await.unwrap();
    assert_eq!(api.count("cart"), 1);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_place_order_requires_session() {
    let api = FakeApi::new();
    let (_session, cart) = setup(&api).await;
    cart.add_item(&product("p1", 10.0), 1).await.unwrap();

    assert!(matches!(
        cart.place_order().await,
        Err(ClientError::NotAuthenticated)
    ));
    assert_eq!(api.count("place_order"), 0);
}

#[tokio::test]
async fn test_place_order_rejects_empty_cart() {
    let api = FakeApi::new();
    let (session, cart) = setup(&api).await;
    login(&session).await;

    assert!(matches!(
        cart.place_order().await,
        Err(ClientError::Core(CoreError::EmptyCart))
    ));
}

#[tokio::test]
async fn test_place_order_refreshes_cart() {
    let p1 = product("p1", 100.0);
    let api = FakeApi::with_catalog(vec![p1.clone()]);
    api.set_remote_cart(vec![(p1, 3)]);
    let (session, cart) = setup(&api).await;
    login(&session).await;
    cart.refresh_for_session_change().await.unwrap();

    let order = cart.place_order().await.unwrap();

    assert_eq!(order.total_amount, Money::from_major(300.0));
    assert_eq!(order.items.len(), 1);
    assert!(cart.lines().is_empty());
}
