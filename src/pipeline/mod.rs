pub mod export;
pub mod fs_ops;
pub mod resize;
