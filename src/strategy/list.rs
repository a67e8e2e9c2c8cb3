use crate::descriptors::TypeDesc;
use crate::error::DiResult;
use crate::resolver::Resolver;
use crate::strategy::MatchStrategy;
use crate::value::Value;

/// Answers `List[E]` requests with one aggregate of every candidate for `E`.
///
/// The aggregate may be empty; a list request therefore always has exactly
/// one candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListStrategy;

impl MatchStrategy for ListStrategy {
    fn name(&self) -> &str {
        "list"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn can_match(&self, requested: &TypeDesc) -> bool {
        matches!(requested, TypeDesc::ListOf(_))
    }

    fn candidates(&self, requested: &TypeDesc, resolver: &Resolver<'_>) -> DiResult<Vec<Value>> {
        let TypeDesc::ListOf(element) = requested else {
            return Ok(Vec::new());
        };
        let items = resolver.candidates(element)?;
        tracing::trace!(%requested, items = items.len(), "aggregated list");
        Ok(vec![Value::List(items)])
    }
}
