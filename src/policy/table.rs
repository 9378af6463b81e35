use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::policy::error::PolicyError;

/// Business tables carrying row-level policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Customers,
    Mailboxes,
    Packages,
    Notifications,
    LoyaltyPoints,
    RewardRedemptions,
    WebhookEventLog,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Customers,
        Table::Mailboxes,
        Table::Packages,
        Table::Notifications,
        Table::LoyaltyPoints,
        Table::RewardRedemptions,
        Table::WebhookEventLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Customers => "customers",
            Table::Mailboxes => "mailboxes",
            Table::Packages => "packages",
            Table::Notifications => "notifications",
            Table::LoyaltyPoints => "loyalty_points",
            Table::RewardRedemptions => "reward_redemptions",
            Table::WebhookEventLog => "webhook_event_log",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PolicyError::UnknownTable(s.to_string()))
    }
}
