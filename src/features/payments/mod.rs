//! Course purchase: checkout screen, processor seam and return screen.

pub mod checkout;
pub mod client;
pub mod processor;
pub mod recovery;
pub mod stripe;
pub mod types;

pub use checkout::{CheckoutFlow, CheckoutState, PaymentDeps, SubmitOutcome, SUPPORT_NOTICE};
pub use processor::{
    ConfirmRequest, IntentStatus, PaymentMethod, PaymentProcessor, ProcessorError, ProcessorIntent,
};
pub use recovery::{PaymentReturn, ReturnOutcome, ReturnParams};
pub use stripe::StripeProcessor;
