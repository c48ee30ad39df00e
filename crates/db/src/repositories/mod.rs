//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. The collection, payment, and allocation repositories own
//! the atomicity contracts of the debt/credit lifecycle; the wallet and
//! party repositories implement the collaborator interfaces consumed by it.

pub mod allocation;
pub mod collection;
pub mod party;
pub mod payment;
pub mod user;
pub mod wallet;

pub use allocation::AllocationRepository;
pub use collection::{
    CollectionFilter, CollectionRepository, CollectionWithPayments, CreateCollectionInput,
};
pub use party::PartyRepository;
pub use payment::{PaymentRepository, RecordPaymentInput};
pub use user::{CreateUserInput, UserError, UserRepository};
pub use wallet::{CreateMovementInput, CreateWalletInput, WalletError, WalletRepository};
