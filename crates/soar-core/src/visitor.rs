//! Double dispatch over task point roles.

use crate::task_point::{OrderedTaskPoint, UnorderedTaskPoint};

/// Visitor over task points. Every method defaults to a no-op so callers
/// only implement the roles they care about.
pub trait TaskPointVisitor {
    fn visit_start(&mut self, _point: &OrderedTaskPoint) {}
    fn visit_ast(&mut self, _point: &OrderedTaskPoint) {}
    fn visit_aat(&mut self, _point: &OrderedTaskPoint) {}
    fn visit_finish(&mut self, _point: &OrderedTaskPoint) {}
    fn visit_unordered(&mut self, _point: &UnorderedTaskPoint) {}
}
