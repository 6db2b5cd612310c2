pub mod board_ops;
pub mod drag;
pub mod group;
pub mod move_ops;
pub mod reorder;
pub mod sort;
pub mod tag_ops;
