/*
 * Created on Tue Mar 12 2024
 *
 * This file is a part of Radixmap
 * Radixmap is a free and open-source concurrent radix tree toolkit written by
 * Sayan Nandan ("the Author") with the vision to provide a race-safe integer
 * index without compromising on performance or predictability.
 *
 * Copyright (c) 2024, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

pub(crate) mod atm;

use std::{cell::Cell, hint::spin_loop, thread};

/// Exponential backoff for busy-wait loops: spin for a while, doubling the burst each
/// call, then start yielding to the scheduler once spinning has clearly stopped paying
pub struct Backoff {
    step: Cell<u8>,
}

impl Backoff {
    const SPIN_LIMIT: u8 = 6;
    const STEP_LIMIT: u8 = 8;
    pub fn new() -> Self {
        Self { step: Cell::new(0) }
    }
    /// Wait a little. Early calls burn `2^step` spin hints; past `SPIN_LIMIT` every call
    /// is an OS yield instead
    pub fn snooze(&self) {
        let step = self.step.get();
        if step <= Self::SPIN_LIMIT {
            for _ in 0..1 << step {
                spin_loop();
            }
        } else {
            thread::yield_now();
        }
        if step <= Self::STEP_LIMIT {
            self.step.set(step + 1)
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}
