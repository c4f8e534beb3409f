//! Test lifecycle listener contract.

use stmt_count_core::CountError;

use crate::context::TestContext;

pub use stmt_count_core::LOWEST_PRECEDENCE;

/// Highest ordering precedence; the before hook runs first.
pub const HIGHEST_PRECEDENCE: i32 = i32::MIN;

/// Hooks invoked around every test method.
///
/// Before hooks run in ascending [`order`](TestExecutionListener::order),
/// after hooks in descending order.
pub trait TestExecutionListener: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn order(&self) -> i32 {
        0
    }

    fn before_test_method(&self, _context: &TestContext) -> Result<(), CountError> {
        Ok(())
    }

    fn after_test_method(&self, _context: &TestContext) -> Result<(), CountError> {
        Ok(())
    }
}
