use crate::cli::{Cli, Command};
use anyhow::{ensure, Context};
use billing_service::{PaymentState, RecurringPayment};
use chrono::{DateTime, NaiveDate, Utc};
use config_engine::PlatformConfig;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigReport {
    pub domains: Vec<String>,
    /// Level handles in catalogue order, cheapest first
    pub levels: Vec<String>,
    pub gateway_url: String,
    pub operators: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolesReport {
    pub expression: String,
    pub roles: Vec<String>,
    pub allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleReport {
    pub anchor: NaiveDate,
    pub period: u32,
    pub at: DateTime<Utc>,
    pub next_payment: DateTime<Utc>,
    pub final_payment: Option<DateTime<Utc>>,
    pub state: PaymentState,
}

/// Load a configuration file the way the services do
///
/// `SAAS_` environment variables still apply on top of the file.
pub fn check_config(file: &Path) -> anyhow::Result<ConfigReport> {
    // A missing file would silently fall back to defaults
    ensure!(file.is_file(), "configuration file {} not found", file.display());
    let config = PlatformConfig::load(Some(file))
        .with_context(|| format!("invalid configuration in {}", file.display()))?;

    Ok(ConfigReport {
        domains: config.domains.clone(),
        levels: config
            .subscription_levels
            .levels()
            .iter()
            .map(|level| level.handle.clone())
            .collect(),
        gateway_url: config.gateway.url.clone(),
        operators: config.mail.operators.len(),
    })
}

pub fn check_roles(expression: &str, roles: &[String]) -> anyhow::Result<RolesReport> {
    let allowed = auth_roles::evaluate(Some(expression), roles)
        .with_context(|| format!("cannot evaluate {expression:?}"))?;
    Ok(RolesReport {
        expression: expression.to_string(),
        roles: roles.to_vec(),
        allowed,
    })
}

/// Billing schedule of a payment anchored on `anchor`
pub fn schedule(
    anchor: NaiveDate,
    period: u32,
    cancelled_at: Option<DateTime<Utc>>,
    at: DateTime<Utc>,
) -> ScheduleReport {
    let payment = RecurringPayment {
        id: Uuid::nil(),
        account_id: Uuid::nil(),
        name: String::new(),
        number: String::new(),
        amount: Decimal::ZERO,
        period,
        token: String::new(),
        gateway_token: String::new(),
        active_on: anchor,
        cancelled_at,
        created_on: anchor,
    };

    ScheduleReport {
        anchor,
        period,
        at,
        next_payment: payment.next_payment(at),
        final_payment: payment.final_payment(),
        state: payment.state(at),
    }
}

/// Run a parsed command and render its report
pub fn run(cli: &Cli) -> anyhow::Result<String> {
    tracing::debug!(command = ?cli.command, "running operator command");
    match &cli.command {
        Command::CheckConfig { file } => cli.format.render(&check_config(file)?),
        Command::Roles { expression, roles } => cli.format.render(&check_roles(expression, roles)?),
        Command::Schedule {
            anchor,
            period,
            cancelled_at,
            at,
        } => {
            let at = at.unwrap_or_else(Utc::now);
            cli.format.render(&schedule(*anchor, *period, *cancelled_at, at))
        }
    }
}
