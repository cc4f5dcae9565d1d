//! Conversions between setting values and property values.

use super::{invalid_value, PropertyKind, PropertyValue};
use crate::error::ActionResult;

/// Converts a native setting value to and from its external representation.
pub trait PropertyCodec<T>: Send + Sync + 'static {
    /// Declared property type.
    fn kind(&self) -> PropertyKind;

    /// Native value to external representation.
    fn encode(&self, value: T) -> PropertyValue;

    /// External representation to native value.
    fn decode(&self, raw: &PropertyValue) -> ActionResult<T>;

    /// Fixed set of accepted representations, if any.
    fn allowed_values(&self) -> Vec<String> {
        Vec::new()
    }
}

// =============================================================================
// BoolDisplay
// =============================================================================

/// How a boolean setting is shown to the host.
///
/// Only the external representation changes. Stored and logged values stay
/// canonical booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolDisplay {
    /// `"On"` / `"Off"`
    #[default]
    OnOff,
    /// `"Yes"` / `"No"`
    YesNo,
    /// Integer `1` / `0`, used e.g. for shutter state
    OneZero,
}

impl BoolDisplay {
    /// `(false, true)` labels.
    pub fn labels(self) -> (&'static str, &'static str) {
        match self {
            BoolDisplay::OnOff => ("Off", "On"),
            BoolDisplay::YesNo => ("No", "Yes"),
            BoolDisplay::OneZero => ("0", "1"),
        }
    }
}

impl PropertyCodec<bool> for BoolDisplay {
    fn kind(&self) -> PropertyKind {
        match self {
            BoolDisplay::OneZero => PropertyKind::Integer,
            BoolDisplay::OnOff | BoolDisplay::YesNo => PropertyKind::Text,
        }
    }

    fn encode(&self, value: bool) -> PropertyValue {
        match self {
            BoolDisplay::OneZero => PropertyValue::Integer(i64::from(value)),
            BoolDisplay::OnOff | BoolDisplay::YesNo => {
                let (off, on) = self.labels();
                PropertyValue::Text(if value { on } else { off }.to_string())
            }
        }
    }

    fn decode(&self, raw: &PropertyValue) -> ActionResult<bool> {
        let (off, on) = self.labels();
        match (self, raw) {
            (BoolDisplay::OneZero, PropertyValue::Integer(1)) => Ok(true),
            (BoolDisplay::OneZero, PropertyValue::Integer(0)) => Ok(false),
            (_, PropertyValue::Text(text)) if text == on => Ok(true),
            (_, PropertyValue::Text(text)) if text == off => Ok(false),
            _ => Err(invalid_value(format!("\"{}\" or \"{}\"", off, on), raw)),
        }
    }

    fn allowed_values(&self) -> Vec<String> {
        let (off, on) = self.labels();
        vec![off.to_string(), on.to_string()]
    }
}

// =============================================================================
// NumericCodec
// =============================================================================

/// Codec for integer and float settings.
///
/// Integers accept integer values, integral floats and numeric text. Floats
/// accept finite floats, integers and finite numeric text; NaN and infinities
/// are refused as invalid values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumericCodec;

impl PropertyCodec<i64> for NumericCodec {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Integer
    }

    fn encode(&self, value: i64) -> PropertyValue {
        PropertyValue::Integer(value)
    }

    fn decode(&self, raw: &PropertyValue) -> ActionResult<i64> {
        match raw {
            PropertyValue::Integer(v) => Ok(*v),
            // 2^63 itself is out of range, hence the strict upper comparison
            PropertyValue::Float(v)
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 =>
            {
                Ok(*v as i64)
            }
            PropertyValue::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| invalid_value("an integer", raw)),
            PropertyValue::Float(_) => Err(invalid_value("an integer", raw)),
        }
    }
}

impl PropertyCodec<f64> for NumericCodec {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Float
    }

    fn encode(&self, value: f64) -> PropertyValue {
        PropertyValue::Float(value)
    }

    fn decode(&self, raw: &PropertyValue) -> ActionResult<f64> {
        let value = match raw {
            PropertyValue::Float(v) => *v,
            PropertyValue::Integer(v) => *v as f64,
            PropertyValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid_value("a finite number", raw))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(invalid_value("a finite number", raw))
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::error::{ActionError, DispatchCode};

    const MODES: [BoolDisplay; 3] = [BoolDisplay::OnOff, BoolDisplay::YesNo, BoolDisplay::OneZero];

    #[test]
    fn bool_round_trip_is_lossless_in_every_mode() {
        for mode in MODES {
            for value in [false, true] {
                let external = mode.encode(value);
                assert_eq!(mode.decode(&external).unwrap(), value, "{:?}", mode);
            }
        }
    }

    #[test]
    fn bool_representations() {
        assert_eq!(BoolDisplay::OnOff.encode(true), PropertyValue::from("On"));
        assert_eq!(BoolDisplay::YesNo.encode(false), PropertyValue::from("No"));
        assert_eq!(BoolDisplay::OneZero.encode(true), PropertyValue::Integer(1));
        assert_eq!(
            PropertyCodec::<bool>::kind(&BoolDisplay::OneZero),
            PropertyKind::Integer
        );
        assert_eq!(BoolDisplay::YesNo.allowed_values(), vec!["No", "Yes"]);
    }

    #[test]
    fn one_zero_accepts_text_digits() {
        assert!(BoolDisplay::OneZero.decode(&"1".into()).unwrap());
        assert!(!BoolDisplay::OneZero.decode(&"0".into()).unwrap());
        assert!(BoolDisplay::OneZero.decode(&PropertyValue::Integer(2)).is_err());
    }

    #[test]
    fn bool_rejects_foreign_labels() {
        let err = BoolDisplay::OnOff.decode(&"Yes".into()).unwrap_err();
        assert_eq!(err.code(), DispatchCode::InvalidValue);
        assert!(BoolDisplay::YesNo.decode(&PropertyValue::Integer(1)).is_err());
        assert!(BoolDisplay::OnOff.decode(&"on".into()).is_err());
    }

    #[test]
    fn integer_decoding() {
        let codec = NumericCodec;
        let decode = |raw: PropertyValue| PropertyCodec::<i64>::decode(&codec, &raw);
        assert_eq!(decode(PropertyValue::Integer(-4)).unwrap(), -4);
        assert_eq!(decode(PropertyValue::Float(12.0)).unwrap(), 12);
        assert_eq!(decode(" 42 ".into()).unwrap(), 42);
        assert!(decode(PropertyValue::Float(1.5)).is_err());
        assert!(decode(PropertyValue::Float(f64::NAN)).is_err());
        assert!(decode(PropertyValue::Float(1e300)).is_err());
        assert!(matches!(
            decode("forty".into()),
            Err(ActionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn float_decoding() {
        let codec = NumericCodec;
        let decode = |raw: PropertyValue| PropertyCodec::<f64>::decode(&codec, &raw);
        assert_eq!(decode(PropertyValue::Float(0.25)).unwrap(), 0.25);
        assert_eq!(decode(PropertyValue::Integer(3)).unwrap(), 3.0);
        assert_eq!(decode("-1e9".into()).unwrap(), -1e9);
        assert!(decode("fast".into()).is_err());
    }

    #[test]
    fn float_decoding_refuses_non_finite() {
        let codec = NumericCodec;
        let decode = |raw: PropertyValue| PropertyCodec::<f64>::decode(&codec, &raw);
        for raw in [
            PropertyValue::from("NaN"),
            PropertyValue::from("inf"),
            PropertyValue::from("-infinity"),
            PropertyValue::Float(f64::NAN),
            PropertyValue::Float(f64::INFINITY),
        ] {
            let err = decode(raw.clone()).unwrap_err();
            assert_eq!(err.code(), DispatchCode::InvalidValue, "{:?}", raw);
        }
    }
}
