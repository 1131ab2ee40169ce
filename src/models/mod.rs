pub mod account;
pub mod event;
pub mod post;
pub mod seat;
pub mod ticket;
pub mod user;

pub use account::{Account, AppSettings, Preferences, Profile};
pub use event::EventRecord;
pub use post::{CreatePost, Post, UpdatePost};
pub use seat::{Seat, SeatId};
pub use ticket::{TicketRecord, TicketStatus};
pub use user::User;
