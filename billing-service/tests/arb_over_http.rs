//! ARB client against a local stand-in for the gateway endpoint

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::routing::post;
use axum::Router;
use billing_service::*;
use config_engine::{GatewaySettings, ResourceLimit, SubscriptionLevel};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

const CREATED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ARBCreateSubscriptionResponse xmlns="AnetApi/xml/v1/schema/AnetApiSchema.xsd">
  <messages>
    <resultCode>Ok</resultCode>
    <message><code>I00001</code><text>Successful.</text></message>
  </messages>
  <subscriptionId>100748</subscriptionId>
</ARBCreateSubscriptionResponse>"#;

const REJECTED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ErrorResponse xmlns="AnetApi/xml/v1/schema/AnetApiSchema.xsd">
  <messages>
    <resultCode>Error</resultCode>
    <message><code>E00003</code><text>The element 'subscription' has invalid child element.</text></message>
  </messages>
</ErrorResponse>"#;

async fn serve(reply: &'static str, delay: Duration) -> (GatewaySettings, Arc<Mutex<Vec<String>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();
    let app = Router::new().route(
        "/xml/v1/request.api",
        post(move |body: String| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(body);
                tokio::time::sleep(delay).await;
                reply
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let settings = GatewaySettings {
        url: format!("http://{addr}/xml/v1/request.api"),
        login: "merchant".to_string(),
        transaction_key: "secret".to_string(),
        timeout_secs: 1,
        ..GatewaySettings::default()
    };
    (settings, received)
}

fn silver() -> SubscriptionLevel {
    SubscriptionLevel {
        handle: "silver".to_string(),
        name: "Silver".to_string(),
        description: String::new(),
        price: Decimal::new(100, 0),
        period: 1,
        trial_periods: 1,
        resources: [("people".to_string(), ResourceLimit::Limited(10))].into(),
    }
}

fn card() -> CardDetails {
    CardDetails {
        first_name: "Test".to_string(),
        last_name: "Testerson".to_string(),
        number: "4111111111111111".to_string(),
        expires: CardExpiry::new(2030, 8),
    }
}

#[tokio::test]
async fn test_open_records_masked_card_and_gateway_token() {
    let (settings, received) = serve(CREATED, Duration::ZERO).await;
    let billing = BillingService::new(
        Arc::new(ArbGateway::new(settings)),
        Arc::new(InMemoryPaymentRepository::new()),
    );
    let account_id = Uuid::new_v4();

    let payment = assert_ok!(billing.open(account_id, &silver(), &card(), None).await);
    assert_eq!(payment.gateway_token, "100748");
    assert_eq!(payment.number, "************1111");
    assert_eq!(payment.name, "Test Testerson");
    assert_eq!(payment.token, account_id.to_string());
    assert_eq!(payment.amount, Decimal::new(100, 0));

    // Built, not stored
    assert!(billing.current(account_id).await.unwrap().is_none());

    let bodies = received.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].contains("<ARBCreateSubscriptionRequest"));
    assert!(bodies[0].contains(&format!("<refId>{account_id}</refId>")));
    assert!(bodies[0].contains("<amount>100.00</amount>"));
}

#[tokio::test]
async fn test_rejection_is_a_request_error() {
    let (settings, _) = serve(REJECTED, Duration::ZERO).await;
    let gateway = ArbGateway::new(settings);

    let err = gateway.cancel("100748").await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Request {
            messages: vec![GatewayMessage::new(
                "E00003",
                "The element 'subscription' has invalid child element."
            )]
        }
    );
}

#[tokio::test]
async fn test_start_without_subscription_id_is_a_response_error() {
    let (settings, _) = serve(
        "<ARBCreateSubscriptionResponse><messages><resultCode>Ok</resultCode></messages></ARBCreateSubscriptionResponse>",
        Duration::ZERO,
    )
    .await;
    let billing = BillingService::new(
        Arc::new(ArbGateway::new(settings)),
        Arc::new(InMemoryPaymentRepository::new()),
    );

    let err = billing
        .open(Uuid::new_v4(), &silver(), &card(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::Gateway(GatewayError::Response { .. })));
}

#[tokio::test]
async fn test_timeout_is_a_response_error_and_not_retried() {
    let (settings, received) = serve(CREATED, Duration::from_secs(3)).await;
    let gateway = ArbGateway::new(settings);

    let err = gateway.change("100748", Decimal::new(200, 0)).await.unwrap_err();
    assert!(err.is_response());
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unreachable_gateway_is_a_response_error() {
    let settings = GatewaySettings {
        url: "http://127.0.0.1:9/xml/v1/request.api".to_string(),
        timeout_secs: 2,
        ..GatewaySettings::default()
    };
    let err = ArbGateway::new(settings).cancel("1").await.unwrap_err();
    assert!(err.is_response());
}

#[tokio::test]
async fn test_invalid_card_never_reaches_the_gateway() {
    let (settings, received) = serve(CREATED, Duration::ZERO).await;
    let billing = BillingService::new(
        Arc::new(ArbGateway::new(settings)),
        Arc::new(InMemoryPaymentRepository::new()),
    );
    let mut bad = card();
    bad.number = "1234".to_string();

    let err = assert_err!(billing.open(Uuid::new_v4(), &silver(), &bad, None).await);
    assert!(matches!(err, BillingError::Validation(_)));
    assert!(received.lock().unwrap().is_empty());
}
