//! Feeds on-disk preference edits back into a running
//! [`FilePreferenceStore`](crate::FilePreferenceStore).

mod manager;


pub use manager::ReloadManager;
