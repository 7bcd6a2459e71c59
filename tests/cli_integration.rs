/// End-to-end CLI integration tests
#[path = "cli/common.rs"]
mod common;
#[path = "cli/help_tests.rs"]
mod help_tests;
#[path = "cli/list_tests.rs"]
mod list_tests;
#[path = "cli/call_tests.rs"]
mod call_tests;
