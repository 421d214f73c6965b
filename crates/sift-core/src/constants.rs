/// sift system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Statistic keys recorded on an iteration.
pub mod stats {
    /// Fraction of the corpus predicted positive by the iteration's model.
    pub const POSITIVE_FRACTION: &str = "positive_fraction";
    /// Fraction of predictions that flipped relative to the previous ready model.
    pub const CHANGED_FRACTION: &str = "changed_fraction";
    /// Precision estimated from a labeled sample of positive predictions.
    pub const ESTIMATED_PRECISION: &str = "estimated_precision";
    /// Size of the sample behind `estimated_precision`.
    pub const ESTIMATED_PRECISION_NUM_ELEMENTS: &str = "estimated_precision_num_elements";
}
