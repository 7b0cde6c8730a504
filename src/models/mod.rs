pub mod task;
pub mod user;

pub use task::{CreateTaskForm, EditAction, EditTaskForm, Task, TaskListQuery};
pub use user::{User, UserProfile};
