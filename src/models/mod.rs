pub mod envelope;
pub mod hit;
pub mod ledger;
pub mod loaders;
pub mod payment;
pub mod qualification;

pub use envelope::Envelope;
pub use hit::{CreatedHit, NotificationSpec, SharedConfig};
pub use ledger::LedgerSnapshot;
pub use payment::PaymentMode;
pub use qualification::{QualificationFile, QualificationRef, ScoringTable};
