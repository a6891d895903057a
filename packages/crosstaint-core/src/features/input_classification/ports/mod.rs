//! Input classification ports

use crate::features::input_classification::domain::PrimitiveMatch;
use crate::shared::models::ProgramId;

/// Decides whether a callee is a taint-introducing primitive
///
/// Front ends with their own naming scheme supply their own matcher; the
/// taxonomy it reports into stays the closed `PrimitiveKind` set.
pub trait PrimitiveMatcher: Send + Sync {
    fn match_callee(&self, program: ProgramId, callee: &str) -> Option<PrimitiveMatch>;
}

impl<F> PrimitiveMatcher for F
where
    F: Fn(ProgramId, &str) -> Option<PrimitiveMatch> + Send + Sync,
{
    fn match_callee(&self, program: ProgramId, callee: &str) -> Option<PrimitiveMatch> {
        self(program, callee)
    }
}
