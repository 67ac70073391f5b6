//! Whole-session scenarios against a mocked inventory service

use storefront::{prelude::*, remote::MockInventoryRemote};
use testresult::TestResult;

fn widget() -> Product {
    Product {
        id: ProductId::from("1"),
        name: "Widget".to_string(),
        image: String::new(),
        price: 5000,
        stock: 2,
    }
}

fn listed_remote() -> MockInventoryRemote {
    let mut remote = MockInventoryRemote::new();

    remote
        .expect_fetch_products()
        .once()
        .return_once(|| Ok(vec![widget()]));

    remote
}

#[tokio::test]
async fn optimistic_session_from_load_to_rejected_checkout() -> TestResult {
    let mut remote = listed_remote();

    remote.expect_reserve().never();
    remote.expect_commit().never();

    let engine = ReconciliationEngine::new(remote, ReconciliationPolicy::OptimisticLocal);

    assert_eq!(engine.load().await?, 1);

    let first = engine.add_to_cart("1").await?;
    engine.add_to_cart("1").await?;

    assert_eq!(engine.cart_entries().len(), 2);
    assert_eq!(engine.product("1").map(|p| p.stock), Some(0));
    assert!((engine.points_total() - 10.0).abs() < 1e-9);

    assert!(engine.add_to_cart("1").await.is_err());
    assert_eq!(engine.cart_entries().len(), 2);

    engine.remove_from_cart(first.id())?;

    assert_eq!(engine.cart_entries().len(), 1);
    assert_eq!(engine.product("1").map(|p| p.stock), Some(1));
    assert!((engine.points_total() - 5.0).abs() < 1e-9);

    let rejected = engine.checkout("").await;

    assert!(
        matches!(
            rejected,
            Err(CheckoutError::Validation(ValidationError::MissingBuyerName))
        ),
        "expected MissingBuyerName, got {rejected:?}"
    );
    assert_eq!(engine.cart_entries().len(), 1);
    assert_eq!(engine.cart_total(), 5000);

    Ok(())
}

#[tokio::test]
async fn failed_load_leaves_nothing_to_buy() {
    let mut remote = MockInventoryRemote::new();

    remote
        .expect_fetch_products()
        .once()
        .return_once(|| Err(RemoteError::UnexpectedStatus(503)));
    remote.expect_reserve().never();
    remote.expect_commit().never();

    let engine = ReconciliationEngine::new(remote, ReconciliationPolicy::OptimisticLocal);

    let loaded = engine.load().await;

    assert!(
        matches!(loaded, Err(LoadError::Unavailable(_))),
        "expected Unavailable, got {loaded:?}"
    );
    assert!(engine.products().is_empty());

    let added = engine.add_to_cart("1").await;

    assert!(
        matches!(added, Err(AddError::UnknownProduct(_))),
        "expected UnknownProduct, got {added:?}"
    );
}

#[tokio::test]
async fn authoritative_session_commits_each_unit_as_it_is_added() -> TestResult {
    let mut remote = listed_remote();

    remote.expect_commit().never();
    remote
        .expect_reserve()
        .times(2)
        .withf(|adjustment| adjustment.id.as_str() == "1" && adjustment.quantity == 1)
        .returning(|_| {
            Ok(Reservation {
                success: true,
                new_stock: None,
            })
        });

    let engine = ReconciliationEngine::new(remote, ReconciliationPolicy::ServerAuthoritative);

    engine.load().await?;

    let first = engine.add_to_cart("1").await?;
    engine.add_to_cart("1").await?;
    engine.remove_from_cart(first.id())?;

    assert_eq!(engine.product("1").map(|p| p.stock), Some(0));

    let summary = engine.checkout("Ada").await?;

    assert_eq!(summary.receipt.lines().len(), 1);
    assert_eq!(summary.receipt.points_display(), "5");
    assert!(engine.cart_entries().is_empty());

    Ok(())
}
