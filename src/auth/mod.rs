// Identity and role checks for workflow actions

pub mod roles;
pub mod session;

pub use roles::RoleSet;
pub use session::{Session, SessionError, SessionStore};
