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

//! serde helpers for `Decimal` fields stored as BSON `Decimal128`.
//!
//! ```
//! use decimal_rs::Decimal;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Order {
//!     #[serde(with = "decimal_rs_bson::serde")]
//!     price: Decimal,
//!     #[serde(with = "decimal_rs_bson::serde::option")]
//!     discount: Option<Decimal>,
//! }
//! ```

use crate::codec::{from_bson, to_decimal128};
use ::serde::de::Error as _;
use ::serde::ser::Error as _;
use ::serde::{Deserialize, Deserializer, Serialize, Serializer};
use bson::Bson;
use decimal_rs::Decimal;

/// Serializes a decimal as a BSON `Decimal128`.
#[inline]
pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let d128 = to_decimal128(value).map_err(S::Error::custom)?;
    d128.serialize(serializer)
}

/// Deserializes a decimal from a BSON `Decimal128`, double, int32, int64, string or null.
#[inline]
pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let bson = Bson::deserialize(deserializer)?;
    from_bson(&bson).map_err(D::Error::custom)
}

/// serde helpers for `Option<Decimal>`, where `None` is stored as BSON null.
pub mod option {
    use super::*;

    #[inline]
    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dec) => super::serialize(dec, serializer),
            None => serializer.serialize_none(),
        }
    }

    #[inline]
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Bson::deserialize(deserializer)? {
            Bson::Null => Ok(None),
            bson => from_bson(&bson).map(Some).map_err(D::Error::custom),
        }
    }
}
