//! Plain lookup records for users and boats.
//!
//! The booking core never follows lazy associations; callers resolve a
//! renter or a boat by id through the store and get back these flat records.

use common::{BoatId, UserId};
use serde::{Deserialize, Serialize};

/// A marketplace user, as seen by the booking core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl User {
    pub fn new(id: UserId, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
        }
    }
}

/// A rentable boat, as seen by the booking core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boat {
    pub id: BoatId,
    pub owner: UserId,
    pub name: String,
}

impl Boat {
    pub fn new(id: BoatId, owner: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            owner,
            name: name.into(),
        }
    }
}
