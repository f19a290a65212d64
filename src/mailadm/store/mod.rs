//! # Storage Layer
//!
//! The console keeps every collection in one [`Dataset`]. A [`DataStore`] loads
//! the whole dataset and saves it back wholesale: mutations never patch a
//! stored record in place, they replace the collection.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: JSON snapshot at `<data dir>/dataset.json`, seeded from
//!   [`crate::seed`] the first time it is read.
//! - [`memory::InMemoryStore`]: no persistence, used by tests.
//!
//! ## Storage Format
//!
//! ```text
//! <data dir>/
//! ├── dataset.json    # serde JSON of Dataset
//! └── config.json     # MailAdmConfig
//! ```

use crate::error::Result;
use crate::model::Dataset;

pub mod fs;
pub mod memory;

pub trait DataStore {
    /// Current state of every collection.
    fn load(&self) -> Result<Dataset>;

    /// Replaces the stored dataset.
    fn save(&mut self, data: &Dataset) -> Result<()>;
}
