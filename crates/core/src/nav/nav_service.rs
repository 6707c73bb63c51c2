use async_trait::async_trait;
use chrono::NaiveDate;
use fundledger_brokerage::BrokerageProvider;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::nav_calculator::build_nav_record;
use super::nav_errors::NavError;
use super::nav_model::NavRecord;
use super::nav_traits::{NavRepositoryTrait, NavServiceTrait};
use crate::investors::InvestorRepositoryTrait;
use crate::Result;

/// Service that publishes one NAV record per trading day.
pub struct NavService {
    nav_repository: Arc<dyn NavRepositoryTrait>,
    investor_repository: Arc<dyn InvestorRepositoryTrait>,
    provider: Arc<dyn BrokerageProvider>,
}

impl NavService {
    pub fn new(
        nav_repository: Arc<dyn NavRepositoryTrait>,
        investor_repository: Arc<dyn InvestorRepositoryTrait>,
        provider: Arc<dyn BrokerageProvider>,
    ) -> Self {
        Self {
            nav_repository,
            investor_repository,
            provider,
        }
    }

    /// Captures the brokerage's position list next to the published record.
    /// Failure here must never unwind a publication, so errors are logged
    /// and swallowed.
    async fn refresh_position_snapshots(&self, date: NaiveDate) {
        match self.provider.get_positions(date).await {
            Ok(positions) => {
                if let Err(e) = self
                    .nav_repository
                    .save_position_snapshots(date, self.provider.id(), &positions)
                    .await
                {
                    warn!("Failed to save position snapshots for {}: {}", date, e);
                }
            }
            Err(e) => {
                warn!(
                    "Position snapshot fetch from {} failed for {}: {}",
                    self.provider.id(),
                    date,
                    e
                );
            }
        }
    }
}

#[async_trait]
impl NavServiceTrait for NavService {
    async fn calculate_nav(&self, date: NaiveDate) -> Result<NavRecord> {
        if self.nav_repository.get_by_date(date)?.is_some() {
            return Err(NavError::AlreadyPublished(date).into());
        }

        let portfolio_value = self.provider.get_portfolio_value(date).await?;
        let total_shares = self.investor_repository.sum_outstanding_shares()?;
        debug!(
            "Computing NAV for {}: portfolio value {}, {} shares outstanding",
            date, portfolio_value, total_shares
        );

        let previous = self.nav_repository.get_as_of(date)?;
        let record = build_nav_record(date, portfolio_value, total_shares, previous.as_ref())?;
        let saved = self.nav_repository.insert(record).await?;

        // Decoupled from the publication itself.
        self.refresh_position_snapshots(date).await;

        Ok(saved)
    }

    async fn correct_nav(&self, date: NaiveDate, portfolio_value: Decimal) -> Result<NavRecord> {
        let existing = self
            .nav_repository
            .get_by_date(date)?
            .ok_or(NavError::NotAvailable(date))?;

        let previous = self
            .nav_repository
            .get_history(None, Some(date))?
            .into_iter()
            .filter(|r| r.nav_date < date)
            .next_back();

        let corrected =
            build_nav_record(date, portfolio_value, existing.total_shares, previous.as_ref())?;
        debug!(
            "Restating NAV for {}: {} -> {}",
            date, existing.nav_per_share, corrected.nav_per_share
        );
        self.nav_repository.update(corrected).await
    }

    fn get_nav_as_of(&self, date: NaiveDate) -> Result<NavRecord> {
        self.nav_repository
            .get_as_of(date)?
            .ok_or_else(|| NavError::NotAvailable(date).into())
    }

    fn get_latest_nav(&self) -> Result<Option<NavRecord>> {
        self.nav_repository.get_latest()
    }

    fn get_nav_history(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<NavRecord>> {
        self.nav_repository.get_history(start, end)
    }

    fn verify_fund_share_equality(&self) -> Result<()> {
        let Some(latest) = self.nav_repository.get_latest()? else {
            return Ok(());
        };
        let ledger_total = self.investor_repository.sum_outstanding_shares()?;
        if ledger_total != latest.total_shares {
            return Err(NavError::ShareMismatch {
                nav_total: latest.total_shares,
                ledger_total,
            }
            .into());
        }
        Ok(())
    }
}
