pub mod profile;
pub mod room;
pub mod session;
pub mod user;

pub use profile::Profile;
pub use room::{NewRoom, Room};
pub use session::SessionRecord;
pub use user::{NewUser, User};
