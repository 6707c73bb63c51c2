//! Alpaca trading API provider.

mod models;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use reqwest::{header, Client};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::time::Duration;

use crate::errors::BrokerageError;
use crate::models::{Position, RawTransaction};
use crate::provider::BrokerageProvider;
use crate::SOURCE_ALPACA;

use models::{AlpacaAccount, AlpacaPosition, PortfolioHistory};

const DEFAULT_BASE_URL: &str = "https://api.alpaca.markets";
const ACTIVITIES_PAGE_SIZE: u32 = 100;

pub struct AlpacaProvider {
    client: Client,
    base_url: String,
    api_key: String,
    secret_key: String,
}

impl AlpacaProvider {
    pub fn new(
        api_key: String,
        secret_key: String,
        base_url: Option<String>,
    ) -> Result<Self, BrokerageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BrokerageError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            secret_key,
        })
    }

    /// Builds a provider from `APCA_API_KEY_ID` / `APCA_API_SECRET_KEY`
    /// (optionally `APCA_API_BASE_URL`).
    pub fn from_env() -> Result<Self, BrokerageError> {
        let api_key = std::env::var("APCA_API_KEY_ID")
            .map_err(|_| BrokerageError::MissingCredentials("APCA_API_KEY_ID".to_string()))?;
        let secret_key = std::env::var("APCA_API_SECRET_KEY")
            .map_err(|_| BrokerageError::MissingCredentials("APCA_API_SECRET_KEY".to_string()))?;
        let base_url = std::env::var("APCA_API_BASE_URL").ok();
        Self::new(api_key, secret_key, base_url)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, BrokerageError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(&self.api_key).map_err(|_| {
                BrokerageError::MissingCredentials("API key is not a valid header value".to_string())
            })?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(&self.secret_key).map_err(|_| {
                BrokerageError::MissingCredentials(
                    "Secret key is not a valid header value".to_string(),
                )
            })?,
        );
        Ok(headers)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, BrokerageError> {
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .query(query)
            .send()
            .await
            .map_err(|source| BrokerageError::Http {
                provider: SOURCE_ALPACA,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BrokerageError::Api {
                provider: SOURCE_ALPACA,
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BrokerageError::Decode {
                provider: SOURCE_ALPACA,
                message: e.to_string(),
            })
    }

    async fn current_portfolio_value(&self) -> Result<Decimal, BrokerageError> {
        let url = format!("{}/v2/account", self.base_url);
        let account: AlpacaAccount = self.get_json(&url, &[]).await?;
        account
            .portfolio_value_decimal()
            .ok_or_else(|| BrokerageError::Decode {
                provider: SOURCE_ALPACA,
                message: format!(
                    "account portfolio_value '{}' is not a number",
                    account.portfolio_value
                ),
            })
    }

    async fn historical_portfolio_value(&self, date: NaiveDate) -> Result<Decimal, BrokerageError> {
        let url = format!("{}/v2/account/portfolio/history", self.base_url);
        let query = [
            ("timeframe", "1D".to_string()),
            ("date_start", date.format("%Y-%m-%d").to_string()),
            ("date_end", date.format("%Y-%m-%d").to_string()),
        ];
        let history: PortfolioHistory = self.get_json(&url, &query).await?;

        for (ts, equity) in history.timestamp.iter().zip(history.equity.iter()) {
            let bucket_date = DateTime::<Utc>::from_timestamp(*ts, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| BrokerageError::Decode {
                    provider: SOURCE_ALPACA,
                    message: format!("invalid history timestamp {ts}"),
                })?;
            if bucket_date == date {
                if let Some(value) = (*equity).and_then(Decimal::from_f64) {
                    return Ok(value);
                }
            }
        }

        Err(BrokerageError::NoData {
            provider: SOURCE_ALPACA,
            context: format!("portfolio value on {date}"),
        })
    }
}

#[async_trait]
impl BrokerageProvider for AlpacaProvider {
    fn id(&self) -> &'static str {
        SOURCE_ALPACA
    }

    async fn get_portfolio_value(&self, date: NaiveDate) -> Result<Decimal, BrokerageError> {
        if date == Utc::now().date_naive() {
            self.current_portfolio_value().await
        } else {
            self.historical_portfolio_value(date).await
        }
    }

    async fn get_positions(&self, date: NaiveDate) -> Result<Vec<Position>, BrokerageError> {
        // The positions endpoint is a live snapshot; Alpaca keeps no
        // per-date position history.
        if date != Utc::now().date_naive() {
            return Err(BrokerageError::NotSupported {
                operation: format!("positions as of {date}"),
                provider: SOURCE_ALPACA,
            });
        }

        let url = format!("{}/v2/positions", self.base_url);
        let positions: Vec<AlpacaPosition> = self.get_json(&url, &[]).await?;

        Ok(positions
            .into_iter()
            .map(|p| Position {
                quantity: p.qty_decimal(),
                market_value: p.market_value_decimal(),
                cost_basis: p.cost_basis_decimal(),
                currency: p.currency.clone().unwrap_or_else(|| "USD".to_string()),
                symbol: p.symbol,
            })
            .collect())
    }

    async fn get_raw_transactions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawTransaction>, BrokerageError> {
        let url = format!("{}/v2/account/activities", self.base_url);
        let after = format!("{}T00:00:00Z", start.format("%Y-%m-%d"));
        let until = format!("{}T23:59:59Z", end.format("%Y-%m-%d"));

        let mut transactions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("after", after.clone()),
                ("until", until.clone()),
                ("page_size", ACTIVITIES_PAGE_SIZE.to_string()),
                ("direction", "asc".to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("page_token", token.clone()));
            }

            let page: Vec<serde_json::Value> = self.get_json(&url, &query).await?;
            let page_len = page.len();
            debug!("Fetched {} Alpaca activities (after={})", page_len, after);

            for activity in page {
                let external_id = activity
                    .get("id")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| BrokerageError::Decode {
                        provider: SOURCE_ALPACA,
                        message: "activity record has no id".to_string(),
                    })?
                    .to_string();

                let transacted_on = activity
                    .get("date")
                    .or_else(|| activity.get("transaction_time"))
                    .and_then(|v| v.as_str())
                    .and_then(|s| s.get(..10))
                    .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

                transactions.push(RawTransaction {
                    external_id,
                    transacted_on,
                    payload: activity,
                });
            }

            if page_len < ACTIVITIES_PAGE_SIZE as usize {
                break;
            }
            // Activities paginate on the last seen id.
            page_token = transactions.last().map(|t| t.external_id.clone());
        }

        Ok(transactions)
    }
}
