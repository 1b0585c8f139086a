pub mod model_loaders;

pub use model_loaders::{load_board_middleware, load_task_middleware, require_board_middleware};
