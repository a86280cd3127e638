use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Upper bound of every percentage the engine produces
pub const PERCENT_MAX: Decimal = dec!(100);

/// Decimal precision for money amounts produced by the engine
pub const DECIMAL_PRECISION: u32 = 6;

/// Default allowed shortfall (in percentage points) before a target is off track
pub const DEFAULT_ON_TRACK_TOLERANCE: Decimal = dec!(0);

/// Budget usage (%) at which an informational notice is raised
pub const DEFAULT_BUDGET_INFO_THRESHOLD: Decimal = dec!(75);

/// Budget usage (%) at which a budget enters the warning band
pub const DEFAULT_BUDGET_WARNING_THRESHOLD: Decimal = dec!(80);

/// Budget usage (%) at which a budget is over its allocation
pub const DEFAULT_BUDGET_LIMIT_THRESHOLD: Decimal = dec!(100);
