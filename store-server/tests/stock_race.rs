//! 并发下单与库存竞争测试
//!
//! 库存扣减走条件更新，同一商品上的并发订单最多只能有
//! 库存允许的那几单成功；失败的一单必须回滚它已经拿到的
//! 其它商品预留。

mod support;

use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use rand::Rng;
use store_server::db::models::UserRole;
use support::{TestServer, body_json, checkout_form, one_line_cart};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_buyers_one_unit_short() {
    let server = TestServer::start().await;
    let alice = server.seed_user("Alice", "alice@example.com", UserRole::User).await;
    let bob = server.seed_user("Bob", "bob@example.com", UserRole::User).await;
    // 库存 3，两人各要 2：只够一单
    let product = server.seed_product("Rose Bouquet", 90.0, 3).await;

    let (first, second) = tokio::join!(
        server.checkout(
            Some(&alice.token),
            checkout_form("cod", &one_line_cart(&product, 2)),
        ),
        server.checkout(
            Some(&bob.token),
            checkout_form("cod", &one_line_cart(&product, 2)),
        ),
    );

    let statuses = [first.status(), second.status()];
    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let rejected = statuses
        .iter()
        .filter(|s| **s == StatusCode::BAD_REQUEST)
        .count();
    assert_eq!(created, 1, "exactly one checkout wins, got {:?}", statuses);
    assert_eq!(rejected, 1, "the loser gets a clean rejection, got {:?}", statuses);

    // 失败的那单报的是缺货
    for response in [first, second] {
        if response.status() == StatusCode::BAD_REQUEST {
            let body = body_json(response).await;
            assert_eq!(body["code"], 6003);
        }
    }

    assert_eq!(server.product_stock(&product).await, 1);
    assert_eq!(server.order_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_oversubscribed_product() {
    let server = Arc::new(TestServer::start().await);
    // 库存 10，8 个买家各要 2：恰好 5 单能成
    let product = server.seed_product("Tulip Crate", 40.0, 10).await;

    let mut buyers = Vec::new();
    for i in 0..8 {
        let buyer = server
            .seed_user(&format!("Buyer{}", i), &format!("buyer{}@example.com", i), UserRole::User)
            .await;
        buyers.push(buyer);
    }

    let mut handles = Vec::new();
    for buyer in buyers {
        let server = Arc::clone(&server);
        let product = product.clone();
        let token = buyer.token;
        // 随机错开出发时间，扩大交错面
        let jitter = rand::thread_rng().gen_range(0..5u64);
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(jitter)).await;
            let form = checkout_form("cod", &one_line_cart(&product, 2));
            server.checkout(Some(&token), form).await.status()
        }));
    }

    let mut created = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.expect("checkout task") {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => rejected += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    // 每单扣 2，库存 10 只养得起 5 单；扣减是条件更新，
    // 不可能超卖，也不可能少卖
    assert_eq!(created, 5);
    assert_eq!(rejected, 3);
    assert_eq!(server.product_stock(&product).await, 0);
    assert_eq!(server.order_count().await, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_line_rolls_back_earlier_lines() {
    let server = TestServer::start().await;
    let alice = server.seed_user("Alice", "alice@example.com", UserRole::User).await;
    let bob = server.seed_user("Bob", "bob@example.com", UserRole::User).await;
    // A 充足，B 紧缺：两人都买 [A x1, B x2]，B 只够一单
    let ample = server.seed_product("Baby's Breath", 15.0, 10).await;
    let scarce = server.seed_product("Blue Orchid", 200.0, 3).await;

    let cart = format!(
        r#"[{{"product":"{}","quantity":1}},{{"product":"{}","quantity":2}}]"#,
        ample, scarce
    );

    let (first, second) = tokio::join!(
        server.checkout(Some(&alice.token), checkout_form("cod", &cart)),
        server.checkout(Some(&bob.token), checkout_form("cod", &cart)),
    );

    let statuses = [first.status(), second.status()];
    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    assert_eq!(created, 1, "exactly one checkout wins, got {:?}", statuses);

    // 赢家扣走 A x1 / B x2；输家要么在校验时被挡下，
    // 要么预留了 A 之后在 B 上失败并退回 A
    assert_eq!(server.product_stock(&ample).await, 9);
    assert_eq!(server.product_stock(&scarce).await, 1);
    assert_eq!(server.order_count().await, 1);
}
