//! Repository abstractions for data access.
//!
//! One repository per aggregate, each with its own error type. Every
//! query is scoped by the owning user; soft-deleted rows are excluded.

pub mod client;
pub mod company;
pub mod loan;
pub mod payment;
pub mod session;
pub mod user;

pub use client::ClientRepository;
pub use company::CompanyRepository;
pub use loan::LoanRepository;
pub use payment::PaymentRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
