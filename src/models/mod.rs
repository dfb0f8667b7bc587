pub mod category;
pub mod todo;
pub mod user;

pub use category::{Category, CategoryInput, DEFAULT_COLOR};
pub use todo::{Priority, Todo, TodoInput, TodoListQuery, TodoStats};
pub use user::{Role, User, UserResponse};
