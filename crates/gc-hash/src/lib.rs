//! The Hash Grouper: folds a discovered file stream into named dataset and
//! block groups by content hash, and reports name collisions before they're
//! used to write a partition map.

mod collision;
mod grouper;
mod naming;

pub use collision::{check_names, confirm_or_abort, CollisionReport, NameCollisionError};
pub use grouper::{assign, build_blocks, Assignment, HashKeyConfig};
pub use naming::{block_name, dataset_name, replace_with_dict};
