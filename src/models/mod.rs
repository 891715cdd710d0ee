pub mod category;
pub mod company;
pub mod department;
pub mod notification;
pub mod request;
pub mod role;
pub mod test_type;
pub mod user;

pub use category::*;
pub use company::*;
pub use department::*;
pub use notification::*;
pub use request::*;
pub use role::*;
pub use test_type::*;
pub use user::*;
