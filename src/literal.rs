//! Type-directed synthesis of argument literals.

use crate::config::GeneratorConfig;
use crate::factory::EntityFactory;
use crate::model::{ArgumentLiteral, Parameter, ParameterSpecification, PrimitiveKind};
use crate::random::RandomSource;

/// Value ranges for generated literals, copied out of a validated [`GeneratorConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralRanges {
    pub int_min: i64,
    pub int_max: i64,
    pub string_min_len: usize,
    pub string_max_len: usize,
    pub double_min: f64,
    pub double_max: f64,
}

impl From<&GeneratorConfig> for LiteralRanges {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            int_min: config.int_param_min,
            int_max: config.int_param_max,
            string_min_len: config.string_param_min_length,
            string_max_len: config.string_param_max_length,
            double_min: config.double_param_min,
            double_max: config.double_param_max,
        }
    }
}

/// One literal of `kind`. Doubles are rounded to two decimal places.
pub fn synthesize(
    kind: PrimitiveKind,
    ranges: &LiteralRanges,
    rng: &mut RandomSource,
) -> ArgumentLiteral {
    match kind {
        PrimitiveKind::Integer => ArgumentLiteral::Integer(rng.between(ranges.int_min, ranges.int_max)),
        PrimitiveKind::String => {
            let len = rng.between(ranges.string_min_len, ranges.string_max_len);
            ArgumentLiteral::String(rng.alphanumeric(len))
        }
        PrimitiveKind::Boolean => ArgumentLiteral::Boolean(rng.coin()),
        PrimitiveKind::Double => {
            let raw = rng.between(ranges.double_min, ranges.double_max);
            ArgumentLiteral::Double(round_cents(raw))
        }
    }
}

/// One specification per parameter, in declaration order.
pub fn synthesize_arguments<F: EntityFactory + ?Sized>(
    factory: &F,
    parameters: &[Parameter],
    ranges: &LiteralRanges,
    rng: &mut RandomSource,
) -> Vec<ParameterSpecification> {
    let mut arguments = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        let value = synthesize(parameter.kind, ranges, rng);
        arguments.push(factory.parameter_specification(parameter.name.clone(), value));
    }
    arguments
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
