mod task;
mod theme;

pub use task::Task;
pub use theme::Theme;
