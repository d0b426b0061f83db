//! # backdrop-site
//!
//! Data and logic for the portfolio page around the backdrop:
//!
//! - [`certs`]: the certifications list and its JSON data file
//! - [`sync`]: merging a LinkedIn data export into that file (`sync-certs`)
//! - [`lab`]: the interactive lab demos
//! - [`eggs`]: hidden achievements
//!
//! ```ignore
//! use backdrop_site::certs;
//!
//! let certs = certs::load_or_default("public/data/certifications.json");
//! for (category, members) in certs::group_by_category(&certs) {
//!     println!("{} ({})", category.title(), members.len());
//! }
//! ```

pub mod certs;
pub mod eggs;
mod error;
pub mod lab;
pub mod sync;

pub use certs::{Category, Certification};
pub use error::{CertsError, SyncError, VizError};
pub use sync::{LinkedInCert, SyncReport};
