//! Messages between the background worker and page contexts

use serde::{Deserialize, Serialize};

/// Paid plan offered in the upgrade prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Monthly,
    Lifetime,
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Plan::Monthly => f.write_str("monthly"),
            Plan::Lifetime => f.write_str("lifetime"),
        }
    }
}

/// Runtime message, tagged by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RuntimeMessage {
    /// Background → page: paid flag changed, re-read it
    PaymentUpdated,
    /// Background → page: trial started, re-read it
    TrialStarted,
    /// Background → page: is a Trimless content script here?
    Ping,
    /// Page/options → background
    #[serde(rename = "extpay-open-trial")]
    OpenTrial,
    /// Page/options → background
    #[serde(rename = "extpay-open-payment")]
    OpenPayment,
    /// Upgrade prompt → background
    #[serde(rename = "extpay-open-plan")]
    OpenPlan { plan: Plan },
}

/// Reply to a message that expects one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub trimless: bool,
}
