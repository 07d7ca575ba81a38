use std::collections::HashMap;
use std::f64::consts;

use lazy_static::lazy_static;

use super::value::Value;

lazy_static! {
    // Named constants resolvable by bare identifier. Case-sensitive.
    static ref CONSTANTS: HashMap<&'static str, Value> = {
        let mut m = HashMap::new();
        m.insert("M_PI", Value::Float(consts::PI));
        m.insert("M_E", Value::Float(consts::E));
        m.insert("M_LOG2E", Value::Float(consts::LOG2_E));
        m.insert("M_LOG10E", Value::Float(consts::LOG10_E));
        m.insert("M_LN2", Value::Float(consts::LN_2));
        m.insert("M_LN10", Value::Float(consts::LN_10));
        m.insert("M_PI_2", Value::Float(consts::FRAC_PI_2));
        m.insert("M_PI_4", Value::Float(consts::FRAC_PI_4));
        m.insert("M_1_PI", Value::Float(consts::FRAC_1_PI));
        m.insert("M_2_PI", Value::Float(consts::FRAC_2_PI));
        m.insert("M_SQRTPI", Value::Float(1.772_453_850_905_516));
        m.insert("M_2_SQRTPI", Value::Float(consts::FRAC_2_SQRT_PI));
        m.insert("M_SQRT2", Value::Float(consts::SQRT_2));
        m.insert("M_SQRT3", Value::Float(1.732_050_807_568_877_2));
        m.insert("M_SQRT1_2", Value::Float(consts::FRAC_1_SQRT_2));
        m.insert("M_LNPI", Value::Float(1.144_729_885_849_400_2));
        m.insert("M_EULER", Value::Float(0.577_215_664_901_532_9));
        m.insert("PHP_INT_MAX", Value::Int(i64::MAX));
        m.insert("PHP_INT_MIN", Value::Int(i64::MIN));
        m.insert("PHP_INT_SIZE", Value::Int(8));
        m.insert("PHP_FLOAT_EPSILON", Value::Float(f64::EPSILON));
        m.insert("PHP_FLOAT_MAX", Value::Float(f64::MAX));
        m.insert("PHP_FLOAT_MIN", Value::Float(f64::MIN_POSITIVE));
        m.insert("PHP_FLOAT_DIG", Value::Int(15));
        m.insert("PHP_EOL", Value::String("\n".to_string()));
        m.insert("NAN", Value::Float(f64::NAN));
        m.insert("INF", Value::Float(f64::INFINITY));
        m
    };
}

/// Looks up a built-in constant.
pub fn lookup(name: &str) -> Option<&'static Value> {
    CONSTANTS.get(name)
}

/// `null`, `true` and `false` in any letter case.
pub fn keyword(name: &str) -> Option<Value> {
    if name.eq_ignore_ascii_case("null") {
        Some(Value::Null)
    } else if name.eq_ignore_ascii_case("true") {
        Some(Value::Bool(true))
    } else if name.eq_ignore_ascii_case("false") {
        Some(Value::Bool(false))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_math_constants() {
        assert_eq!(lookup("M_PI"), Some(&Value::Float(std::f64::consts::PI)));
        assert_eq!(lookup("M_EULER"), Some(&Value::Float(0.5772156649015329)));
        assert_eq!(lookup("PHP_INT_MAX"), Some(&Value::Int(i64::MAX)));
    }

    #[test]
    fn test_constants_are_case_sensitive() {
        assert_eq!(lookup("m_pi"), None);
        assert_eq!(lookup("lastName"), None);
    }

    #[test]
    fn test_keywords_ignore_case() {
        assert_eq!(keyword("NULL"), Some(Value::Null));
        assert_eq!(keyword("True"), Some(Value::Bool(true)));
        assert_eq!(keyword("fAlSe"), Some(Value::Bool(false)));
        assert_eq!(keyword("nil"), None);
    }

    #[test]
    fn test_nan_is_float() {
        assert!(lookup("NAN").and_then(Value::as_float).unwrap().is_nan());
    }
}
