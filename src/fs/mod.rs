mod ops;

pub use ops::{FsError, copy_recursive, move_path, remove_path};
