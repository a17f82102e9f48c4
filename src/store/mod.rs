// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Local persistence for liked-id lists.
//!
//! `KeyValueStore` stands in for the browser's `localStorage`; `PersistentLikeCache` owns the
//! per-user key namespace on top of it.

pub mod file_store;
pub mod kv;
pub mod like_cache;

pub use file_store::{FileStore, WriteDurability};
pub use kv::{KeyValueStore, MemoryStore, StoreError};
pub use like_cache::PersistentLikeCache;
