use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use std::sync::Arc;

use super::investors_model::{Investor, InvestorUpdate, InvestorValuation, NewInvestor};
use super::investors_traits::{InvestorRepositoryTrait, InvestorServiceTrait};
use crate::nav::NavServiceTrait;
use crate::tax::{eligible_withdrawal, TaxConfig};
use crate::utils::round_money;
use crate::Result;

/// Service for managing investors and valuing their positions.
pub struct InvestorService {
    investor_repository: Arc<dyn InvestorRepositoryTrait>,
    nav_service: Arc<dyn NavServiceTrait>,
    tax_config: TaxConfig,
}

impl InvestorService {
    pub fn new(
        investor_repository: Arc<dyn InvestorRepositoryTrait>,
        nav_service: Arc<dyn NavServiceTrait>,
        tax_config: TaxConfig,
    ) -> Self {
        Self {
            investor_repository,
            nav_service,
            tax_config,
        }
    }
}

#[async_trait]
impl InvestorServiceTrait for InvestorService {
    fn get_investor(&self, investor_id: &str) -> Result<Investor> {
        self.investor_repository.get_investor(investor_id)
    }

    fn list_investors(&self, active_only: bool) -> Result<Vec<Investor>> {
        self.investor_repository.list_investors(active_only)
    }

    async fn create_investor(&self, new_investor: NewInvestor) -> Result<Investor> {
        new_investor.validate()?;
        debug!("Creating investor '{}'", new_investor.name);
        self.investor_repository.create_investor(new_investor).await
    }

    async fn update_investor(&self, update: InvestorUpdate) -> Result<Investor> {
        update.validate()?;
        self.investor_repository.update_investor(update).await
    }

    async fn deactivate_investor(&self, investor_id: &str) -> Result<Investor> {
        let investor = self.investor_repository.get_investor(investor_id)?;
        let update = InvestorUpdate {
            id: investor.id,
            name: investor.name,
            email: investor.email,
            is_active: false,
        };
        self.investor_repository.update_investor(update).await
    }

    fn get_valuation(&self, investor_id: &str, as_of: NaiveDate) -> Result<InvestorValuation> {
        let investor = self.investor_repository.get_investor(investor_id)?;
        let nav = self.nav_service.get_nav_as_of(as_of)?;

        let current_value = round_money(investor.current_shares * nav.nav_per_share);
        let unrealized_gain = current_value - investor.net_investment;

        Ok(InvestorValuation {
            investor_id: investor.id,
            as_of,
            nav_per_share: nav.nav_per_share,
            current_shares: investor.current_shares,
            net_investment: investor.net_investment,
            current_value,
            unrealized_gain,
            eligible_withdrawal: eligible_withdrawal(
                &self.tax_config,
                current_value,
                investor.net_investment,
            ),
        })
    }
}
