use std::sync::Arc;

use crate::compat::is_compatible;
use crate::descriptors::TypeDesc;
use crate::error::DiResult;
use crate::registration::Producer;
use crate::resolver::Resolver;
use crate::strategy::MatchStrategy;
use crate::value::Value;

/// Answers `Type[..]` requests with the class itself.
///
/// Never instantiates, so abstract classes are valid candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeOfStrategy;

impl MatchStrategy for TypeOfStrategy {
    fn name(&self) -> &str {
        "type-of"
    }

    fn priority(&self) -> i32 {
        200
    }

    fn can_match(&self, requested: &TypeDesc) -> bool {
        matches!(requested, TypeDesc::TypeOf(_))
    }

    fn match_producer(
        &self,
        requested: &TypeDesc,
        producer: &Arc<Producer>,
        _resolver: &Resolver<'_>,
    ) -> DiResult<Option<Value>> {
        let Some(class) = producer.subject().as_class() else {
            return Ok(None);
        };
        let declared = TypeDesc::type_of(class.ty());
        Ok(is_compatible(&declared, requested).then(|| Value::Type(class.ty().clone())))
    }
}
