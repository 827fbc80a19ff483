mod scaler;

pub use scaler::MinMaxScaler;
