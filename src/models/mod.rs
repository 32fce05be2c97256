mod book;
mod cart;
mod donation;
mod media;
mod notification;
mod payment;
mod session;
mod transaction_type;
mod user;

pub use book::*;
pub use cart::*;
pub use donation::*;
pub use media::*;
pub use notification::*;
pub use payment::*;
pub use session::*;
pub use transaction_type::*;
pub use user::*;
