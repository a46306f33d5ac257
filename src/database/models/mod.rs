pub mod activity;
pub mod game_session;
pub mod invite;
pub mod setting;
pub mod user;

pub use activity::*;
pub use game_session::*;
pub use invite::*;
pub use setting::*;
pub use user::*;
