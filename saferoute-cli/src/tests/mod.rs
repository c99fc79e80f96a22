//! Shared test harness modules for the SafeRoute CLI.

use super::*;

mod classify_unit;
mod helpers;
