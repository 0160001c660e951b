pub mod models;
pub mod pricing;
pub mod refund;
pub mod rules;

pub use models::{PaymentPlan, PriceBreakdown, RentalQuote};
pub use pricing::{PricingConfig, QuoteCalculator};
pub use refund::{refund_percent, RefundPolicy, RefundQuote};
pub use rules::{BookingRuleError, BookingRules};
