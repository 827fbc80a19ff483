//! Maps a validated [`CustomerRecord`] onto the column layout the artifacts
//! were fitted on. Column order is load-bearing: a permuted vector is still a
//! valid vector, it just produces wrong predictions.

use crate::schema::{CustomerRecord, Field};

/// Continuous columns, scaled.
pub const NUMERIC_FEATURES: [Field; 12] = [
    Field::TotalUnsuccessfulCalls,
    Field::CustomerServiceInteractionRatio,
    Field::MinutesOverUsage,
    Field::TotalRevenueGenerated,
    Field::TotalCallFeaturesUsed,
    Field::MonthlyRevenue,
    Field::TotalRecurringCharge,
    Field::OverageMinutes,
    Field::MonthsInService,
    Field::PercChangeMinutes,
    Field::PercChangeRevenues,
    Field::HandsetPrice,
];

/// Label-encoded ordinal columns, scaled alongside the numeric block.
pub const ORDINAL_FEATURES: [Field; 5] = [
    Field::CreditRating,
    Field::IncomeGroup,
    Field::AgeHh1,
    Field::AgeHh2,
    Field::ChildrenInHh,
];

/// Binary flags, passed through unscaled after the scaled block.
pub const BINARY_FEATURES: [Field; 4] = [
    Field::RetentionCalls,
    Field::RetentionOffersAccepted,
    Field::MadeCallToRetentionTeam,
    Field::AdjustmentsToCreditRating,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureLayout {
    /// All fields in declared order, no preprocessing.
    Flat,
    /// Numeric and ordinal block for the scaler, then the binary block.
    Grouped,
}

/// A record split into the block that goes through the scaler and the block
/// that does not. For [`FeatureLayout::Flat`] the passthrough block is empty
/// and `scalable` holds every column.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledFeatures {
    pub scalable: Vec<f64>,
    pub passthrough: Vec<f64>,
}

impl AssembledFeatures {
    /// Concatenates both blocks in classifier order.
    pub fn concat(self) -> Vec<f64> {
        let mut columns = self.scalable;
        columns.extend(self.passthrough);
        columns
    }
}

impl FeatureLayout {
    pub fn scalable_fields(self) -> Vec<Field> {
        match self {
            FeatureLayout::Flat => Field::ALL.to_vec(),
            FeatureLayout::Grouped => NUMERIC_FEATURES
                .iter()
                .chain(ORDINAL_FEATURES.iter())
                .copied()
                .collect(),
        }
    }

    pub fn passthrough_fields(self) -> Vec<Field> {
        match self {
            FeatureLayout::Flat => Vec::new(),
            FeatureLayout::Grouped => BINARY_FEATURES.to_vec(),
        }
    }

    /// Column order of the vector handed to the classifier.
    pub fn columns(self) -> Vec<Field> {
        let mut columns = self.scalable_fields();
        columns.extend(self.passthrough_fields());
        columns
    }

    pub fn column_names(self) -> Vec<&'static str> {
        self.columns().into_iter().map(Field::name).collect()
    }

    pub fn width(self) -> usize {
        Field::ALL.len()
    }

    pub fn assemble(self, record: &CustomerRecord) -> AssembledFeatures {
        AssembledFeatures {
            scalable: self
                .scalable_fields()
                .into_iter()
                .map(|f| record.get(f))
                .collect(),
            passthrough: self
                .passthrough_fields()
                .into_iter()
                .map(|f| record.get(f))
                .collect(),
        }
    }
}
