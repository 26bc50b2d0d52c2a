//! Client-side records of launchpad state.

mod curve;
mod token;

pub use curve::*;
pub use token::*;

use crate::{graduation, indexer, num, price};
