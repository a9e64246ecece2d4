mod store_type;
mod types;

pub use store_type::DocumentAdapter;
pub use types::{
    AccountType, AdapterAccount, AdapterSession, AdapterUser, NewUser, SessionAndUser,
    SessionUpdate, UserUpdate, VerificationToken,
};
