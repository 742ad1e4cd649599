//! Save/load system
//!
//! Persists bags as ordered placement records.

pub mod bag_save;

pub use bag_save::{
    BagSave, PlacementRecord, SaveError, BAG_SAVE_VERSION,
    save_bag, load_bag, save_directory, bag_path,
};
