// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write statements.
//!
//! Inserts return the new row id; callers re-read the row when they need
//! the stored representation.

pub mod availability;
pub mod bookings;
pub mod directory;
pub mod queue;
