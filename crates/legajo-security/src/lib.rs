// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// legajo-security — anti-recovery deletion and document fingerprints.
//
// `shred` overwrites a file before unlinking it so casual undelete tools
// recover zeros; `integrity` fingerprints documents for operation records.

pub mod integrity;
pub mod shred;

pub use integrity::{hash_bytes, hash_file};
pub use shred::secure_delete;
