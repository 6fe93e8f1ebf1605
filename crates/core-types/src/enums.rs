use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar granularity used when compounding daily returns into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationPeriod {
    Monthly,
    Quarterly,
    Yearly,
}

impl Default for AggregationPeriod {
    fn default() -> Self {
        AggregationPeriod::Monthly
    }
}

impl fmt::Display for AggregationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregationPeriod::Monthly => "Monthly",
            AggregationPeriod::Quarterly => "Quarterly",
            AggregationPeriod::Yearly => "Yearly",
        };
        write!(f, "{name}")
    }
}

impl FromStr for AggregationPeriod {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "monthly" => Ok(AggregationPeriod::Monthly),
            "quarterly" => Ok(AggregationPeriod::Quarterly),
            "yearly" => Ok(AggregationPeriod::Yearly),
            _ => Err(CoreError::InvalidInput(
                "aggregation period".to_string(),
                value.to_string(),
            )),
        }
    }
}
