//! Account provider contract and the simulated wallet behind it.

pub mod endpoints;

use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

use crate::battle::BattleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Currency {
    /// Stakes and payouts.
    Eth,
    /// Loot box cost and rewards.
    Supra,
}

/// Identity and balances of the connected account.
pub trait AccountProvider: Send {
    fn connect(&mut self);
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
    fn address(&self) -> Option<String>;
    fn balance(&self, currency: Currency) -> f64;
    fn credit(&mut self, currency: Currency, amount: f64);

    /// Withdraw `amount`, failing without change when the balance is short.
    fn debit(&mut self, currency: Currency, amount: f64) -> Result<f64, BattleError>;
}

/// Serializable view of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct AccountView {
    pub connected: bool,
    pub address: Option<String>,
    pub eth_balance: f64,
    pub supra_balance: f64,
}

impl AccountView {
    pub fn of(account: &dyn AccountProvider) -> Self {
        AccountView {
            connected: account.is_connected(),
            address: account.address(),
            eth_balance: account.balance(Currency::Eth),
            supra_balance: account.balance(Currency::Supra),
        }
    }
}

pub const DEMO_ADDRESS: &str = "0x742d35Cc6635C0532925a3b8D0A7C4e7C8d5A9f8";
pub const DEMO_SUPRA: f64 = 147.25;
pub const DEMO_ETH: f64 = 2.34;

/// In-memory wallet that connects instantly to a fixed demo account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulatedWallet {
    address: Option<String>,
    eth: f64,
    supra: f64,
}

impl SimulatedWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// An already-connected wallet with the given balances.
    pub fn funded(eth: f64, supra: f64) -> Self {
        SimulatedWallet {
            address: Some(DEMO_ADDRESS.to_string()),
            eth,
            supra,
        }
    }

    fn slot(&mut self, currency: Currency) -> &mut f64 {
        match currency {
            Currency::Eth => &mut self.eth,
            Currency::Supra => &mut self.supra,
        }
    }
}

impl AccountProvider for SimulatedWallet {
    fn connect(&mut self) {
        if self.address.is_none() {
            *self = SimulatedWallet::funded(DEMO_ETH, DEMO_SUPRA);
        }
    }

    fn disconnect(&mut self) {
        *self = SimulatedWallet::default();
    }

    fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    fn address(&self) -> Option<String> {
        self.address.clone()
    }

    fn balance(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Eth => self.eth,
            Currency::Supra => self.supra,
        }
    }

    fn credit(&mut self, currency: Currency, amount: f64) {
        *self.slot(currency) += amount;
    }

    fn debit(&mut self, currency: Currency, amount: f64) -> Result<f64, BattleError> {
        let slot = self.slot(currency);
        if *slot < amount {
            return Err(BattleError::InsufficientBalance {
                needed: amount,
                available: *slot,
            });
        }
        *slot -= amount;
        Ok(*slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_loads_demo_account() {
        let mut wallet = SimulatedWallet::new();
        assert!(!wallet.is_connected());
        wallet.connect();
        assert_eq!(wallet.address().as_deref(), Some(DEMO_ADDRESS));
        assert_eq!(wallet.balance(Currency::Supra), DEMO_SUPRA);
        assert_eq!(wallet.balance(Currency::Eth), DEMO_ETH);
    }

    #[test]
    fn reconnect_keeps_balances() {
        let mut wallet = SimulatedWallet::funded(1.0, 3.0);
        wallet.connect();
        assert_eq!(wallet.balance(Currency::Eth), 1.0);
    }

    #[test]
    fn disconnect_clears_everything() {
        let mut wallet = SimulatedWallet::funded(1.0, 3.0);
        wallet.disconnect();
        assert_eq!(AccountView::of(&wallet), AccountView {
            connected: false,
            address: None,
            eth_balance: 0.0,
            supra_balance: 0.0,
        });
    }

    #[test]
    fn debit_refuses_overdraft() {
        let mut wallet = SimulatedWallet::funded(0.0, 9.0);
        assert_eq!(
            wallet.debit(Currency::Supra, 10.0),
            Err(BattleError::InsufficientBalance {
                needed: 10.0,
                available: 9.0
            })
        );
        assert_eq!(wallet.balance(Currency::Supra), 9.0);
        assert_eq!(wallet.debit(Currency::Supra, 4.0), Ok(5.0));
    }
}
