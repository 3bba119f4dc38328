//! 下单流程集成测试
//!
//! 走完整的 HTTP 栈：multipart 表单 → 认证中间件 → checkout 管线 →
//! 嵌入式 SurrealDB。覆盖 COD 与转账两种支付方式、库存校验和
//! 金额计算。

mod support;

use http::StatusCode;
use store_server::db::models::UserRole;
use support::{TestServer, body_json, checkout_form, one_line_cart};

#[tokio::test]
async fn test_cod_checkout_happy_path() {
    let server = TestServer::start().await;
    let buyer = server.seed_user("Alice", "alice@example.com", UserRole::User).await;
    let product = server.seed_product("Rose Bouquet", 120.0, 5).await;

    let form = checkout_form("cod", &one_line_cart(&product, 2));
    let response = server.checkout(Some(&buyer.token), form).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Order created successfully");

    let order = &body["order"];
    assert_eq!(order["status"], "pending");
    assert_eq!(order["paymentMethod"], "cod");
    assert_eq!(order["user"], buyer.id.as_str());
    assert_eq!(order["name"], "Jane Doe");
    assert_eq!(order["city"], "Bogota");

    // 订单行是商品快照
    let items = order["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product"], product.as_str());
    assert_eq!(items[0]["name"], "Rose Bouquet");
    assert_eq!(items[0]["price"].as_f64().unwrap(), 120.0);
    assert_eq!(items[0]["quantity"], 2);

    // 总价 = 商品小计 + 固定运费，客户端提交的价格被忽略
    let expected_total = 2.0 * 120.0 + server.state.config.shipping_fee;
    let total = order["totalAmount"].as_f64().expect("totalAmount");
    assert!((total - expected_total).abs() < 1e-9);

    // 库存已扣减，订单已落库
    assert_eq!(server.product_stock(&product).await, 3);
    assert_eq!(server.order_count().await, 1);
}

#[tokio::test]
async fn test_checkout_insufficient_stock() {
    let server = TestServer::start().await;
    let buyer = server.seed_user("Bob", "bob@example.com", UserRole::User).await;
    let product = server.seed_product("Tulip Mix", 45.0, 1).await;

    let form = checkout_form("cod", &one_line_cart(&product, 3));
    let response = server.checkout(Some(&buyer.token), form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], 6003);
    assert_eq!(body["details"]["product"], "Tulip Mix");
    assert_eq!(body["details"]["available"], 1);
    assert_eq!(body["details"]["requested"], 3);

    // 库存不动，订单不落库
    assert_eq!(server.product_stock(&product).await, 1);
    assert_eq!(server.order_count().await, 0);
}

#[tokio::test]
async fn test_checkout_unknown_product() {
    let server = TestServer::start().await;
    let buyer = server.seed_user("Carol", "carol@example.com", UserRole::User).await;

    let form = checkout_form("cod", &one_line_cart("product:doesnotexist", 1));
    let response = server.checkout(Some(&buyer.token), form).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["code"], 6001);
    assert_eq!(server.order_count().await, 0);
}

#[tokio::test]
async fn test_transfer_requires_payment_proof() {
    let server = TestServer::start().await;
    let buyer = server.seed_user("Dave", "dave@example.com", UserRole::User).await;
    let product = server.seed_product("Lily Basket", 80.0, 4).await;

    // 转账但没有上传凭证
    let form = checkout_form("transfer", &one_line_cart(&product, 1));
    let response = server.checkout(Some(&buyer.token), form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], 5002);

    // 校验阶段就被拒绝，库存未被预留
    assert_eq!(server.product_stock(&product).await, 4);
    assert_eq!(server.order_count().await, 0);
}

#[tokio::test]
async fn test_transfer_with_pdf_proof() {
    let server = TestServer::start().await;
    let buyer = server.seed_user("Eve", "eve@example.com", UserRole::User).await;
    let product = server.seed_product("Orchid Pot", 150.0, 2).await;

    let form = checkout_form("transfer", &one_line_cart(&product, 1)).file(
        "paymentProof",
        "receipt.pdf",
        "application/pdf",
        b"%PDF-1.4 fake transfer receipt",
    );
    let response = server.checkout(Some(&buyer.token), form).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let proof_url = body["order"]["paymentProof"]
        .as_str()
        .expect("paymentProof url");
    assert!(proof_url.starts_with("/uploads/"));
    assert!(proof_url.ends_with("-payment.pdf"));

    // 文件确实写到了磁盘
    let filename = proof_url.strip_prefix("/uploads/").unwrap();
    assert!(server.state.file_store.disk_path(filename).exists());

    // 并且可以通过静态路由取回
    let fetched = server.get(proof_url, None).await;
    assert_eq!(fetched.status(), StatusCode::OK);

    assert_eq!(server.product_stock(&product).await, 1);
}

#[tokio::test]
async fn test_checkout_empty_cart() {
    let server = TestServer::start().await;
    let buyer = server.seed_user("Frank", "frank@example.com", UserRole::User).await;

    let form = checkout_form("cod", "[]");
    let response = server.checkout(Some(&buyer.token), form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], 4002);
}

#[tokio::test]
async fn test_checkout_multi_line_totals() {
    let server = TestServer::start().await;
    let buyer = server.seed_user("Grace", "grace@example.com", UserRole::User).await;
    let roses = server.seed_product("Red Roses", 100.0, 10).await;
    let vase = server.seed_product("Glass Vase", 35.5, 6).await;

    let items = format!(
        r#"[{{"product":"{}","quantity":3}},{{"product":"{}","quantity":1}}]"#,
        roses, vase
    );
    let form = checkout_form("cod", &items);
    let response = server.checkout(Some(&buyer.token), form).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let expected_total = 3.0 * 100.0 + 35.5 + server.state.config.shipping_fee;
    let total = body["order"]["totalAmount"].as_f64().expect("totalAmount");
    assert!((total - expected_total).abs() < 1e-9);

    // 两条订单行各自扣减
    assert_eq!(server.product_stock(&roses).await, 7);
    assert_eq!(server.product_stock(&vase).await, 5);
}

#[tokio::test]
async fn test_checkout_requires_auth() {
    let server = TestServer::start().await;
    let product = server.seed_product("Sunflowers", 25.0, 9).await;

    let form = checkout_form("cod", &one_line_cart(&product, 1));
    let response = server.checkout(None, form).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], 1001);
    assert_eq!(server.product_stock(&product).await, 9);
}
