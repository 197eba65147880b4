//! User domain entities.

pub mod model;
pub mod view;

pub use model::{CreateUser, User};
pub use view::UserView;
