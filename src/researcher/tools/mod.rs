// SPDX-License-Identifier: MIT

//! External collaborators other than the generative model

pub mod mail;
pub mod search;
pub mod storage;

pub use mail::{Mailer, ResultsEmail, SmtpMailer};
pub use search::{ContactSearch, GoogleCseSearch, SearchHit};
pub use storage::{BlobStore, GcsBlobStore, Published};
