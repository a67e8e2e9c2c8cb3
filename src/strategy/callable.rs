use std::sync::Arc;

use crate::compat::is_compatible;
use crate::descriptors::TypeDesc;
use crate::error::DiResult;
use crate::registration::Producer;
use crate::resolver::Resolver;
use crate::strategy::MatchStrategy;
use crate::value::Value;

/// Answers `Callable[..]` requests with registered functions whose
/// signature fits.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallableStrategy;

impl MatchStrategy for CallableStrategy {
    fn name(&self) -> &str {
        "callable"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn can_match(&self, requested: &TypeDesc) -> bool {
        matches!(requested, TypeDesc::Callable { .. })
    }

    fn match_producer(
        &self,
        requested: &TypeDesc,
        producer: &Arc<Producer>,
        _resolver: &Resolver<'_>,
    ) -> DiResult<Option<Value>> {
        let Some(function) = producer.subject().as_function() else {
            return Ok(None);
        };
        Ok(is_compatible(&function.desc(), requested).then(|| Value::Function(function.clone())))
    }
}
