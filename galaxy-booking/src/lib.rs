pub mod models;
pub mod flow;
pub mod builder;
pub mod retry;
pub mod payments;
pub mod orchestrator;

pub use models::{FlowStep, SearchResults, Selection};
pub use flow::{BookingFlow, FlowError};
pub use builder::{build_booking, BuildContext, BuildError};
pub use retry::RetryPolicy;
pub use payments::SimulatedPaymentAdapter;
pub use orchestrator::{BookingOrchestrator, SessionError};
