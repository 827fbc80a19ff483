use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Integer,
    Float,
}

/// The customer attributes accepted by `/predict`, in training column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    TotalUnsuccessfulCalls,
    CustomerServiceInteractionRatio,
    MinutesOverUsage,
    TotalRevenueGenerated,
    TotalCallFeaturesUsed,
    RetentionCalls,
    RetentionOffersAccepted,
    MadeCallToRetentionTeam,
    AdjustmentsToCreditRating,
    MonthlyRevenue,
    TotalRecurringCharge,
    OverageMinutes,
    MonthsInService,
    PercChangeMinutes,
    PercChangeRevenues,
    HandsetPrice,
    CreditRating,
    IncomeGroup,
    AgeHh1,
    AgeHh2,
    ChildrenInHh,
}

impl Field {
    pub const ALL: [Field; 21] = [
        Field::TotalUnsuccessfulCalls,
        Field::CustomerServiceInteractionRatio,
        Field::MinutesOverUsage,
        Field::TotalRevenueGenerated,
        Field::TotalCallFeaturesUsed,
        Field::RetentionCalls,
        Field::RetentionOffersAccepted,
        Field::MadeCallToRetentionTeam,
        Field::AdjustmentsToCreditRating,
        Field::MonthlyRevenue,
        Field::TotalRecurringCharge,
        Field::OverageMinutes,
        Field::MonthsInService,
        Field::PercChangeMinutes,
        Field::PercChangeRevenues,
        Field::HandsetPrice,
        Field::CreditRating,
        Field::IncomeGroup,
        Field::AgeHh1,
        Field::AgeHh2,
        Field::ChildrenInHh,
    ];

    /// Name used on the wire, in the audit table and in artifact metadata.
    pub fn name(self) -> &'static str {
        match self {
            Field::TotalUnsuccessfulCalls => "total_unsuccessful_calls",
            Field::CustomerServiceInteractionRatio => "CustomerServiceInteractionRatio",
            Field::MinutesOverUsage => "MinutesOverUsage",
            Field::TotalRevenueGenerated => "TotalRevenueGenerated",
            Field::TotalCallFeaturesUsed => "TotalCallFeaturesUsed",
            Field::RetentionCalls => "RetentionCalls",
            Field::RetentionOffersAccepted => "RetentionOffersAccepted",
            Field::MadeCallToRetentionTeam => "MadeCallToRetentionTeam",
            Field::AdjustmentsToCreditRating => "AdjustmentsToCreditRating",
            Field::MonthlyRevenue => "MonthlyRevenue",
            Field::TotalRecurringCharge => "TotalRecurringCharge",
            Field::OverageMinutes => "OverageMinutes",
            Field::MonthsInService => "MonthsInService",
            Field::PercChangeMinutes => "PercChangeMinutes",
            Field::PercChangeRevenues => "PercChangeRevenues",
            Field::HandsetPrice => "HandsetPrice",
            Field::CreditRating => "CreditRating",
            Field::IncomeGroup => "IncomeGroup",
            Field::AgeHh1 => "AgeHH1",
            Field::AgeHh2 => "AgeHH2",
            Field::ChildrenInHh => "ChildrenInHH",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::CustomerServiceInteractionRatio
            | Field::MinutesOverUsage
            | Field::TotalRevenueGenerated
            | Field::MonthlyRevenue
            | Field::TotalRecurringCharge
            | Field::OverageMinutes
            | Field::PercChangeMinutes
            | Field::PercChangeRevenues
            | Field::HandsetPrice => FieldKind::Float,
            _ => FieldKind::Integer,
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_names_are_unique() {
        let names: HashSet<_> = Field::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), Field::ALL.len());
    }

    #[test]
    fn test_from_name_round_trips() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("agehh1"), None);
    }

    #[test]
    fn test_kind_counts() {
        let floats = Field::ALL
            .iter()
            .filter(|f| f.kind() == FieldKind::Float)
            .count();
        assert_eq!(floats, 9);
        assert_eq!(Field::ALL.len() - floats, 12);
    }
}
