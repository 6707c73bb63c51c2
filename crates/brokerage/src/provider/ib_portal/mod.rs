//! Interactive Brokers Client Portal gateway provider.
//!
//! Talks to a locally running Client Portal gateway. The gateway only
//! exposes live balances, so historical portfolio values are not supported;
//! the scheduled same-day NAV run is the intended consumer.

mod models;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::debug;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::time::Duration;

use crate::errors::BrokerageError;
use crate::models::{Position, RawTransaction};
use crate::provider::BrokerageProvider;
use crate::SOURCE_IB_PORTAL;

use models::{AccountSummary, IbPosition, TransactionsResponse};

const DEFAULT_BASE_URL: &str = "https://localhost:5000/v1/api";

pub struct IbPortalProvider {
    client: Client,
    base_url: String,
    account_id: String,
}

impl IbPortalProvider {
    pub fn new(account_id: String, base_url: Option<String>) -> Result<Self, BrokerageError> {
        // The gateway serves a self-signed certificate on localhost.
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| BrokerageError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            account_id,
        })
    }

    /// Builds a provider from `IB_ACCOUNT_ID` (optionally `IB_GATEWAY_URL`).
    pub fn from_env() -> Result<Self, BrokerageError> {
        let account_id = std::env::var("IB_ACCOUNT_ID")
            .map_err(|_| BrokerageError::MissingCredentials("IB_ACCOUNT_ID".to_string()))?;
        let base_url = std::env::var("IB_GATEWAY_URL").ok();
        Self::new(account_id, base_url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, BrokerageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| BrokerageError::Http {
                provider: SOURCE_IB_PORTAL,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BrokerageError::Api {
                provider: SOURCE_IB_PORTAL,
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BrokerageError::Decode {
                provider: SOURCE_IB_PORTAL,
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl BrokerageProvider for IbPortalProvider {
    fn id(&self) -> &'static str {
        SOURCE_IB_PORTAL
    }

    async fn get_portfolio_value(&self, date: NaiveDate) -> Result<Decimal, BrokerageError> {
        if date != Utc::now().date_naive() {
            return Err(BrokerageError::NotSupported {
                operation: format!("portfolio value as of {date}"),
                provider: SOURCE_IB_PORTAL,
            });
        }

        let url = format!("{}/portfolio/{}/summary", self.base_url, self.account_id);
        let summary: AccountSummary = self.get_json(&url).await?;

        summary
            .get("netliquidation")
            .and_then(|v| v.amount)
            .and_then(Decimal::from_f64)
            .ok_or_else(|| BrokerageError::NoData {
                provider: SOURCE_IB_PORTAL,
                context: "netliquidation in account summary".to_string(),
            })
    }

    async fn get_positions(&self, date: NaiveDate) -> Result<Vec<Position>, BrokerageError> {
        if date != Utc::now().date_naive() {
            return Err(BrokerageError::NotSupported {
                operation: format!("positions as of {date}"),
                provider: SOURCE_IB_PORTAL,
            });
        }

        let url = format!(
            "{}/portfolio/{}/positions/0",
            self.base_url, self.account_id
        );
        let positions: Vec<IbPosition> = self.get_json(&url).await?;

        Ok(positions
            .into_iter()
            .filter(|p| p.position != 0.0)
            .map(|p| Position {
                quantity: p.quantity_decimal(),
                market_value: p.market_value_decimal(),
                cost_basis: p.cost_basis_decimal(),
                currency: p.currency.clone().unwrap_or_else(|| "USD".to_string()),
                symbol: p.contract_desc,
            })
            .collect())
    }

    async fn get_raw_transactions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawTransaction>, BrokerageError> {
        // The gateway takes a trailing-days window, not a date range; fetch
        // enough days to cover `start` and filter client-side.
        let today = Utc::now().date_naive();
        let days = (today - start).num_days().max(1);

        let url = format!(
            "{}/pa/transactions?acctIds={}&days={}",
            self.base_url, self.account_id, days
        );
        let response: TransactionsResponse = self.get_json(&url).await?;
        debug!(
            "Fetched {} IB transactions over {} days",
            response.transactions.len(),
            days
        );

        let mut transactions = Vec::new();
        for record in response.transactions {
            let transacted_on = record
                .get("date")
                .and_then(|v| v.as_str())
                .and_then(|s| s.get(..10))
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

            if let Some(on) = transacted_on {
                if on < start || on > end {
                    continue;
                }
            }

            // The gateway has no stable transaction id; compose one from the
            // fields that identify a transaction to IB's own statements.
            let external_id = match record.get("transaction_id").and_then(|v| v.as_str()) {
                Some(id) => id.to_string(),
                None => {
                    let date = record.get("date").and_then(|v| v.as_str()).unwrap_or("");
                    let amount = record
                        .get("amt")
                        .map(|v| v.to_string())
                        .unwrap_or_default();
                    let desc = record.get("desc").and_then(|v| v.as_str()).unwrap_or("");
                    format!("{date}:{amount}:{desc}")
                }
            };

            transactions.push(RawTransaction {
                external_id,
                transacted_on,
                payload: record,
            });
        }

        Ok(transactions)
    }
}
