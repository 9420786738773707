use super::test_helpers::*;
use super::*;
use crate::error::ErrorCode;
use crate::types::{DownloadRequest, EntryKind, Existence, UnzipRequest};

mod capabilities;
mod delete;
