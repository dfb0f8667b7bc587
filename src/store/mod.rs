pub mod categories;
pub mod todos;
pub mod users;

pub use categories::CategoryStore;
pub use todos::TodoStore;
pub use users::UserStore;
