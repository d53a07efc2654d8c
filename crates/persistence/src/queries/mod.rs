// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every function takes an open connection and returns domain values.
//! Transactions are opened by the caller.

pub mod availability;
pub mod bookings;
pub mod directory;
pub mod queue;
