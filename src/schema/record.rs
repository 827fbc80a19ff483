use super::Field;
use serde::{Deserialize, Serialize};

/// A validated snapshot of one customer's account and usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub total_unsuccessful_calls: i64,
    #[serde(rename = "CustomerServiceInteractionRatio")]
    pub customer_service_interaction_ratio: f64,
    #[serde(rename = "MinutesOverUsage")]
    pub minutes_over_usage: f64,
    #[serde(rename = "TotalRevenueGenerated")]
    pub total_revenue_generated: f64,
    #[serde(rename = "TotalCallFeaturesUsed")]
    pub total_call_features_used: i64,
    #[serde(rename = "RetentionCalls")]
    pub retention_calls: i64,
    #[serde(rename = "RetentionOffersAccepted")]
    pub retention_offers_accepted: i64,
    #[serde(rename = "MadeCallToRetentionTeam")]
    pub made_call_to_retention_team: i64,
    #[serde(rename = "AdjustmentsToCreditRating")]
    pub adjustments_to_credit_rating: i64,
    #[serde(rename = "MonthlyRevenue")]
    pub monthly_revenue: f64,
    #[serde(rename = "TotalRecurringCharge")]
    pub total_recurring_charge: f64,
    #[serde(rename = "OverageMinutes")]
    pub overage_minutes: f64,
    #[serde(rename = "MonthsInService")]
    pub months_in_service: i64,
    #[serde(rename = "PercChangeMinutes")]
    pub perc_change_minutes: f64,
    #[serde(rename = "PercChangeRevenues")]
    pub perc_change_revenues: f64,
    #[serde(rename = "HandsetPrice")]
    pub handset_price: f64,
    #[serde(rename = "CreditRating")]
    pub credit_rating: i64,
    #[serde(rename = "IncomeGroup")]
    pub income_group: i64,
    #[serde(rename = "AgeHH1")]
    pub age_hh1: i64,
    #[serde(rename = "AgeHH2")]
    pub age_hh2: i64,
    #[serde(rename = "ChildrenInHH")]
    pub children_in_hh: i64,
}

/// A single typed field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Integer(v) => v as f64,
            FieldValue::Float(v) => v,
        }
    }
}

impl CustomerRecord {
    pub fn value(&self, field: Field) -> FieldValue {
        use FieldValue::{Float, Integer};
        match field {
            Field::TotalUnsuccessfulCalls => Integer(self.total_unsuccessful_calls),
            Field::CustomerServiceInteractionRatio => {
                Float(self.customer_service_interaction_ratio)
            }
            Field::MinutesOverUsage => Float(self.minutes_over_usage),
            Field::TotalRevenueGenerated => Float(self.total_revenue_generated),
            Field::TotalCallFeaturesUsed => Integer(self.total_call_features_used),
            Field::RetentionCalls => Integer(self.retention_calls),
            Field::RetentionOffersAccepted => Integer(self.retention_offers_accepted),
            Field::MadeCallToRetentionTeam => Integer(self.made_call_to_retention_team),
            Field::AdjustmentsToCreditRating => Integer(self.adjustments_to_credit_rating),
            Field::MonthlyRevenue => Float(self.monthly_revenue),
            Field::TotalRecurringCharge => Float(self.total_recurring_charge),
            Field::OverageMinutes => Float(self.overage_minutes),
            Field::MonthsInService => Integer(self.months_in_service),
            Field::PercChangeMinutes => Float(self.perc_change_minutes),
            Field::PercChangeRevenues => Float(self.perc_change_revenues),
            Field::HandsetPrice => Float(self.handset_price),
            Field::CreditRating => Integer(self.credit_rating),
            Field::IncomeGroup => Integer(self.income_group),
            Field::AgeHh1 => Integer(self.age_hh1),
            Field::AgeHh2 => Integer(self.age_hh2),
            Field::ChildrenInHh => Integer(self.children_in_hh),
        }
    }

    /// Numeric value of `field` as fed to the scaler and classifier.
    pub fn get(&self, field: Field) -> f64 {
        self.value(field).as_f64()
    }
}

/// Incrementally populated record used by the validator.
#[derive(Debug, Default)]
pub(crate) struct RecordBuilder {
    integers: [Option<i64>; 21],
    floats: [Option<f64>; 21],
}

impl RecordBuilder {
    pub(crate) fn set(&mut self, field: Field, value: FieldValue) {
        let idx = field as usize;
        match value {
            FieldValue::Integer(v) => self.integers[idx] = Some(v),
            FieldValue::Float(v) => self.floats[idx] = Some(v),
        }
    }

    fn int(&self, field: Field) -> Option<i64> {
        self.integers[field as usize]
    }

    fn float(&self, field: Field) -> Option<f64> {
        self.floats[field as usize]
    }

    /// Returns `None` if any field was never set.
    pub(crate) fn build(self) -> Option<CustomerRecord> {
        Some(CustomerRecord {
            total_unsuccessful_calls: self.int(Field::TotalUnsuccessfulCalls)?,
            customer_service_interaction_ratio: self
                .float(Field::CustomerServiceInteractionRatio)?,
            minutes_over_usage: self.float(Field::MinutesOverUsage)?,
            total_revenue_generated: self.float(Field::TotalRevenueGenerated)?,
            total_call_features_used: self.int(Field::TotalCallFeaturesUsed)?,
            retention_calls: self.int(Field::RetentionCalls)?,
            retention_offers_accepted: self.int(Field::RetentionOffersAccepted)?,
            made_call_to_retention_team: self.int(Field::MadeCallToRetentionTeam)?,
            adjustments_to_credit_rating: self.int(Field::AdjustmentsToCreditRating)?,
            monthly_revenue: self.float(Field::MonthlyRevenue)?,
            total_recurring_charge: self.float(Field::TotalRecurringCharge)?,
            overage_minutes: self.float(Field::OverageMinutes)?,
            months_in_service: self.int(Field::MonthsInService)?,
            perc_change_minutes: self.float(Field::PercChangeMinutes)?,
            perc_change_revenues: self.float(Field::PercChangeRevenues)?,
            handset_price: self.float(Field::HandsetPrice)?,
            credit_rating: self.int(Field::CreditRating)?,
            income_group: self.int(Field::IncomeGroup)?,
            age_hh1: self.int(Field::AgeHh1)?,
            age_hh2: self.int(Field::AgeHh2)?,
            children_in_hh: self.int(Field::ChildrenInHh)?,
        })
    }
}
