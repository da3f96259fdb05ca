pub mod task;
pub mod team;
pub mod user;

pub use task::{NewTask, Priority, Status, Task};
pub use team::{NewTeam, Team, TeamMember};
pub use user::User;
