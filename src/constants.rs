/// Constants describing the raw survey encoding.
pub mod survey {
    /// Marker written by the survey export for unanswered fields.
    pub const NOT_ANSWERED: &str = "NA";
    /// Catch-all language answer that carries no usable language.
    pub const OTHER_LANGUAGES: &str = "Other(s):";
    /// Field name used in domain errors for respondent age.
    pub const FIELD_AGE: &str = "Age";
    /// Field name used in domain errors for converted compensation.
    pub const FIELD_COMPENSATION: &str = "ConvertedComp";
}

/// Filter dimension names used in error reports and CLI arguments.
pub mod filters {
    /// Age range filter.
    pub const AGE: &str = "age";
    /// Compensation range filter.
    pub const COMPENSATION: &str = "compensation";
}

/// Default scale settings used by the built-in view models.
pub mod scales {
    /// Lower padding applied to the scatterplot x axis (average years coding).
    pub const SCATTER_X_PADDING_LOW: f64 = 0.9;
    /// Upper padding applied to the scatterplot x axis.
    pub const SCATTER_X_PADDING_HIGH: f64 = 1.0;
    /// Lower padding applied to the scatterplot y axis (median compensation).
    pub const SCATTER_Y_PADDING_LOW: f64 = 1.0;
    /// Upper padding applied to the scatterplot y axis.
    pub const SCATTER_Y_PADDING_HIGH: f64 = 1.2;
    /// Smallest bubble radius in pixels.
    pub const RADIUS_PX_MIN: f64 = 5.0;
    /// Largest bubble radius in pixels.
    pub const RADIUS_PX_MAX: f64 = 15.0;
    /// Multiplier applied to the mean median compensation for the colour domain ceiling.
    pub const COLOR_MEAN_MULTIPLIER: f64 = 2.0;
    /// Bar heights are expressed as a share of this total.
    pub const BAR_PERCENT_SCALE: f64 = 100.0;
}
