pub mod basic_suite;
pub mod fixtures;

pub use basic_suite::run_basic_tests;
pub use fixtures::*;
pub use test_setup::TestContext;
