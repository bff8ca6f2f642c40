// Copyright 2021 CoD Technologies Corp.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use decimal_rs::Decimal;
use stack_buf::StackVec;
use std::fmt::{self, Write};

/// Holds a sign, up to 39 coefficient digits and an exponent.
pub(crate) type Buf = StackVec<u8, 64>;

/// Formats `value` as `[-]<coefficient>E<exponent>`.
///
/// The coefficient keeps its trailing zeros, so the scale survives the trip through `Decimal128`.
#[inline]
pub(crate) fn format_canonical<'a>(value: &Decimal, buf: &'a mut Buf) -> Result<&'a str, fmt::Error> {
    let (int_val, scale, negative) = value.into_parts();
    if negative && int_val != 0 {
        buf.write_char('-')?;
    }
    write!(buf, "{}E{}", int_val, -(scale as i32))?;
    // only ASCII digits, '-' and 'E' are written
    Ok(unsafe { std::str::from_utf8_unchecked(buf.as_slice()) })
}

/// Formats a finite `f64` with the shortest digits that round-trip, in scientific notation.
#[inline]
pub(crate) fn format_f64(value: f64, buf: &mut Buf) -> Result<&str, fmt::Error> {
    debug_assert!(value.is_finite());
    write!(buf, "{:e}", value)?;
    // only ASCII digits, '-', '.' and 'e' are written
    Ok(unsafe { std::str::from_utf8_unchecked(buf.as_slice()) })
}
