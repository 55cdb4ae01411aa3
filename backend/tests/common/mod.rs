// Not every utils is used in every test, so we allow dead code
#![allow(unused_imports, dead_code)]

pub use test_setup::*;
mod utils;
pub use utils::*;
mod fakes;
pub use fakes::*;
