pub mod patient;
pub mod payment;
pub mod user;

pub use patient::{Patient, PatientUpdate, STATUS_ACTIVE};
pub use payment::{normalize_mode, Payment, PaymentUpdate, ALL_PATIENTS};
pub use user::User;
