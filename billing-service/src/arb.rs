use crate::error::{GatewayError, GatewayMessage, GatewayResult};
use crate::gateway::PaymentGateway;
use crate::models::StartSubscription;
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use config_engine::GatewaySettings;
use logger_redacted::PiiRedactor;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use rust_decimal::Decimal;
use std::time::Duration;

const NAMESPACE: &str = "AnetApi/xml/v1/schema/AnetApiSchema.xsd";

/// Successful interpretation of a gateway reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArbReply {
    Subscription(String),
    Acknowledged,
}

/// Authorize.net Automated Recurring Billing over XML
pub struct ArbGateway {
    client: reqwest::Client,
    settings: GatewaySettings,
    redactor: PiiRedactor,
}

impl ArbGateway {
    pub fn new(settings: GatewaySettings) -> Self {
        Self::with_client(reqwest::Client::new(), settings)
    }

    pub fn with_client(client: reqwest::Client, settings: GatewaySettings) -> Self {
        Self {
            client,
            settings,
            redactor: PiiRedactor::default(),
        }
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    async fn call(&self, operation: &'static str, body: String) -> GatewayResult<ArbReply> {
        tracing::debug!(
            operation = operation,
            payload = %self.redactor.redact(&body),
            "sending gateway request"
        );

        let deadline = Duration::from_secs(self.settings.timeout_secs);
        let exchange = async {
            let response = self
                .client
                .post(&self.settings.url)
                .header(reqwest::header::CONTENT_TYPE, "text/xml")
                .body(body)
                .send()
                .await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        let (status, payload) = match tokio::time::timeout(deadline, exchange).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                tracing::warn!(operation = operation, error = %err, "gateway transport failure");
                return Err(GatewayError::response(format!("transport failure: {err}")));
            }
            Err(_) => {
                tracing::warn!(
                    operation = operation,
                    timeout_secs = self.settings.timeout_secs,
                    "gateway call timed out"
                );
                return Err(GatewayError::response(format!(
                    "no reply within {}s",
                    self.settings.timeout_secs
                )));
            }
        };

        if !status.is_success() {
            tracing::warn!(operation = operation, status = %status, "gateway returned HTTP error");
            return Err(GatewayError::response(payload));
        }

        let reply = parse_response(&payload);
        if let Err(err) = &reply {
            tracing::warn!(
                operation = operation,
                error_code = err.code(),
                payload = %self.redactor.redact(&payload),
                "gateway call failed"
            );
        }
        reply
    }
}

#[async_trait]
impl PaymentGateway for ArbGateway {
    async fn start(&self, request: &StartSubscription) -> GatewayResult<String> {
        let today = Utc::now().date_naive();
        let body = render_start(&self.settings, request, today);
        match self.call("ARBCreateSubscription", body).await? {
            ArbReply::Subscription(id) => {
                tracing::info!(reference = %request.reference, gateway_token = %id, "subscription started");
                Ok(id)
            }
            // A start without an id leaves us unable to manage the subscription
            ArbReply::Acknowledged => Err(GatewayError::response(
                "subscription created without subscriptionId",
            )),
        }
    }

    async fn change(&self, gateway_token: &str, amount: Decimal) -> GatewayResult<()> {
        let body = render_change(&self.settings, gateway_token, amount);
        self.call("ARBUpdateSubscription", body).await?;
        tracing::info!(gateway_token = gateway_token, amount = %amount, "subscription amount changed");
        Ok(())
    }

    async fn cancel(&self, gateway_token: &str) -> GatewayResult<()> {
        let body = render_cancel(&self.settings, gateway_token);
        self.call("ARBCancelSubscription", body).await?;
        tracing::info!(gateway_token = gateway_token, "subscription cancelled");
        Ok(())
    }
}

/// Two decimal places, as the gateway expects
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn authentication(settings: &GatewaySettings) -> String {
    format!(
        "<merchantAuthentication><name>{}</name><transactionKey>{}</transactionKey></merchantAuthentication>",
        escape(&settings.login),
        escape(&settings.transaction_key)
    )
}

pub fn render_start(settings: &GatewaySettings, request: &StartSubscription, today: NaiveDate) -> String {
    // The gateway rejects start dates earlier than its own "today"
    let start_date = request
        .start_date
        .unwrap_or_else(|| today.checked_add_days(Days::new(1)).unwrap_or(today));

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<ARBCreateSubscriptionRequest xmlns="{ns}">"#,
            "{auth}",
            "<refId>{reference}</refId>",
            "<subscription>",
            "<paymentSchedule>",
            "<interval><length>{period}</length><unit>months</unit></interval>",
            "<startDate>{start}</startDate>",
            "<totalOccurrences>{total}</totalOccurrences>",
            "<trialOccurrences>{trial}</trialOccurrences>",
            "</paymentSchedule>",
            "<amount>{amount}</amount>",
            "<trialAmount>0.00</trialAmount>",
            "<payment><creditCard>",
            "<cardNumber>{number}</cardNumber>",
            "<expirationDate>{expires}</expirationDate>",
            "</creditCard></payment>",
            "<billTo><firstName>{first}</firstName><lastName>{last}</lastName></billTo>",
            "</subscription>",
            "</ARBCreateSubscriptionRequest>"
        ),
        ns = NAMESPACE,
        auth = authentication(settings),
        reference = escape(&request.reference),
        period = request.period.max(1),
        start = start_date.format("%Y-%m-%d"),
        total = settings.total_occurrences,
        trial = request.trial_periods,
        amount = format_amount(request.amount),
        number = escape(&request.card.number),
        expires = request.card.expires.to_gateway_format(),
        first = escape(&request.card.first_name),
        last = escape(&request.card.last_name),
    )
}

pub fn render_change(settings: &GatewaySettings, gateway_token: &str, amount: Decimal) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<ARBUpdateSubscriptionRequest xmlns="{ns}">"#,
            "{auth}",
            "<subscriptionId>{token}</subscriptionId>",
            "<subscription><amount>{amount}</amount></subscription>",
            "</ARBUpdateSubscriptionRequest>"
        ),
        ns = NAMESPACE,
        auth = authentication(settings),
        token = escape(gateway_token),
        amount = format_amount(amount),
    )
}

pub fn render_cancel(settings: &GatewaySettings, gateway_token: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<ARBCancelSubscriptionRequest xmlns="{ns}">"#,
            "{auth}",
            "<subscriptionId>{token}</subscriptionId>",
            "</ARBCancelSubscriptionRequest>"
        ),
        ns = NAMESPACE,
        auth = authentication(settings),
        token = escape(gateway_token),
    )
}

#[derive(Clone, Copy)]
enum Field {
    ResultCode,
    SubscriptionId,
    Code,
    Text,
}

/// Interpret a gateway reply by its first `resultCode`
///
/// `Ok` yields the subscription id when present, `Error` the reported
/// `(code, text)` pairs. Anything else, including unparseable XML, is a
/// response error carrying the raw payload.
pub fn parse_response(payload: &str) -> GatewayResult<ArbReply> {
    let malformed = || GatewayError::response(payload);

    let mut reader = Reader::from_str(payload.trim_start_matches('\u{feff}'));
    reader.trim_text(true);

    let mut current: Option<Field> = None;
    let mut result_code: Option<String> = None;
    let mut subscription_id: Option<String> = None;
    let mut codes = Vec::new();
    let mut texts = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                current = match element.local_name().as_ref() {
                    b"resultCode" => Some(Field::ResultCode),
                    b"subscriptionId" => Some(Field::SubscriptionId),
                    b"code" => Some(Field::Code),
                    b"text" => Some(Field::Text),
                    _ => None,
                };
            }
            Ok(Event::Text(text)) => {
                let Some(field) = current else { continue };
                let value = text.unescape().map_err(|_| malformed())?.trim().to_string();
                match field {
                    Field::ResultCode => {
                        result_code.get_or_insert(value);
                    }
                    Field::SubscriptionId => {
                        subscription_id.get_or_insert(value);
                    }
                    Field::Code => codes.push(value),
                    Field::Text => texts.push(value),
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return Err(malformed()),
        }
    }

    match result_code.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("ok") => Ok(subscription_id
            .filter(|id| !id.is_empty())
            .map_or(ArbReply::Acknowledged, ArbReply::Subscription)),
        Some("error") => Err(GatewayError::Request {
            messages: codes
                .into_iter()
                .zip(texts)
                .map(|(code, text)| GatewayMessage::new(code, text))
                .collect(),
        }),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardDetails, CardExpiry};

    fn settings() -> GatewaySettings {
        GatewaySettings {
            login: "merchant".to_string(),
            transaction_key: "k3y&<".to_string(),
            ..GatewaySettings::default()
        }
    }

    fn request() -> StartSubscription {
        StartSubscription {
            reference: "acct-1".to_string(),
            amount: Decimal::new(2995, 2),
            card: CardDetails {
                first_name: "Test".to_string(),
                last_name: "O'Brien & Sons".to_string(),
                number: "4111111111111111".to_string(),
                expires: CardExpiry::new(2030, 8),
            },
            period: 1,
            trial_periods: 1,
            start_date: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2007, 3, 18).unwrap()
    }

    #[test]
    fn test_render_start() {
        let xml = render_start(&settings(), &request(), today());

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?><ARBCreateSubscriptionRequest xmlns="AnetApi/xml/v1/schema/AnetApiSchema.xsd">"#));
        assert!(xml.contains("<name>merchant</name>"));
        assert!(xml.contains("<transactionKey>k3y&amp;&lt;</transactionKey>"));
        assert!(xml.contains("<refId>acct-1</refId>"));
        assert!(xml.contains("<length>1</length><unit>months</unit>"));
        assert!(xml.contains("<startDate>2007-03-19</startDate>"));
        assert!(xml.contains("<totalOccurrences>36</totalOccurrences>"));
        assert!(xml.contains("<trialOccurrences>1</trialOccurrences>"));
        assert!(xml.contains("<amount>29.95</amount>"));
        assert!(xml.contains("<cardNumber>4111111111111111</cardNumber>"));
        assert!(xml.contains("<expirationDate>2030-08</expirationDate>"));
        assert!(xml.contains("<lastName>O&apos;Brien &amp; Sons</lastName>"));
    }

    #[test]
    fn test_render_start_with_explicit_date() {
        let mut request = request();
        request.start_date = NaiveDate::from_ymd_opt(2007, 10, 19);
        let xml = render_start(&settings(), &request, today());
        assert!(xml.contains("<startDate>2007-10-19</startDate>"));
    }

    #[test]
    fn test_render_change_and_cancel() {
        let change = render_change(&settings(), "100748", Decimal::new(200, 0));
        assert!(change.contains("<ARBUpdateSubscriptionRequest"));
        assert!(change.contains("<subscriptionId>100748</subscriptionId>"));
        assert!(change.contains("<subscription><amount>200.00</amount></subscription>"));

        let cancel = render_cancel(&settings(), "100748");
        assert!(cancel.contains("<ARBCancelSubscriptionRequest"));
        assert!(cancel.contains("<subscriptionId>100748</subscriptionId>"));
        assert!(!cancel.contains("<amount>"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(100, 0)), "100.00");
        assert_eq!(format_amount(Decimal::new(29995, 3)), "30.00");
        assert_eq!(format_amount(Decimal::new(5, 1)), "0.50");
    }

    #[test]
    fn test_parse_ok_with_subscription_id() {
        let payload = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\
            <ARBCreateSubscriptionResponse xmlns=\"AnetApi/xml/v1/schema/AnetApiSchema.xsd\">\
            <refId>acct-1</refId>\
            <messages><resultCode> Ok </resultCode>\
            <message><code>I00001</code><text>Successful.</text></message></messages>\
            <subscriptionId>100748</subscriptionId>\
            </ARBCreateSubscriptionResponse>";
        assert_eq!(
            parse_response(payload),
            Ok(ArbReply::Subscription("100748".to_string()))
        );
    }

    #[test]
    fn test_parse_ok_acknowledgement() {
        let payload = "<ARBCancelSubscriptionResponse><messages><resultCode>OK</resultCode>\
            <message><code>I00001</code><text>Successful.</text></message></messages>\
            </ARBCancelSubscriptionResponse>";
        assert_eq!(parse_response(payload), Ok(ArbReply::Acknowledged));
    }

    #[test]
    fn test_parse_error_messages() {
        let payload = "<ErrorResponse><messages><resultCode>Error</resultCode>\
            <message><code>E00012</code><text>A duplicate subscription already exists.</text></message>\
            <message><code>E00013</code><text>Card number is invalid.</text></message>\
            </messages></ErrorResponse>";
        assert_eq!(
            parse_response(payload),
            Err(GatewayError::Request {
                messages: vec![
                    GatewayMessage::new("E00012", "A duplicate subscription already exists."),
                    GatewayMessage::new("E00013", "Card number is invalid."),
                ]
            })
        );
    }

    #[test]
    fn test_parse_unexpected_payloads() {
        for payload in [
            "",
            "<html><body>Service Unavailable</body></html>",
            "<messages><resultCode>Pending</resultCode></messages>",
            "<messages><resultCode>Ok</messages>",
        ] {
            assert_eq!(
                parse_response(payload),
                Err(GatewayError::response(payload)),
                "payload {payload:?}"
            );
        }
    }
}
