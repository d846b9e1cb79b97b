//! Message identifier resolution: literal or composite bit-packed IDs.

use crate::error::CompileError;
use crate::schema::{EnumDef, IdValue, MessageDef};

/// Resolve a message's numeric ID against the enums visible to its document.
///
/// A literal `ID` wins when present. Otherwise the ordered `IDs` list folds
/// left-to-right: the accumulator shifts by the bit width of the *preceding*
/// entry (0 for the first), then the current entry's resolved value is added.
/// Deployed generators pack IDs with this shift-by-previous-width rule;
/// changing it would renumber every composite message on the wire.
///
/// Returns `Ok(None)` for messages that declare neither form (header-style
/// definitions). An unresolvable symbolic reference is a hard failure naming
/// the token.
pub fn resolve(msg: &MessageDef, enums: &[EnumDef]) -> Result<Option<u64>, CompileError> {
    if let Some(id) = msg.id {
        return Ok(Some(id));
    }
    if msg.ids.is_empty() {
        return Ok(None);
    }
    let mut acc = 0u64;
    let mut prev_bits = 0u32;
    for sub in &msg.ids {
        let value = match &sub.value {
            IdValue::Literal(v) => *v,
            IdValue::Symbol(token) => {
                resolve_symbol(token, enums).ok_or_else(|| CompileError::UnresolvedIdentifier {
                    message: msg.name.clone(),
                    token: token.clone(),
                })?
            }
        };
        acc = (acc << prev_bits) + value;
        prev_bits = sub.bits;
    }
    Ok(Some(acc))
}

/// Resolve a sub-identifier token: a plain integer, or an `Enum.Option`
/// reference scanned against the visible enum set. An option with a negative
/// value cannot contribute ID bits, so it resolves to nothing.
fn resolve_symbol(token: &str, enums: &[EnumDef]) -> Option<u64> {
    if let Ok(v) = token.parse::<u64>() {
        return Some(v);
    }
    let (enum_name, option_name) = token.split_once('.')?;
    enums
        .iter()
        .find(|e| e.name == enum_name)?
        .value_of(option_name)
        .and_then(|v| u64::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Document;

    fn parse(yaml: &str) -> Document {
        serde_yaml::from_str(yaml).expect("parse")
    }

    #[test]
    fn literal_id_wins() {
        let doc = parse("Messages:\n  - Name: M\n    ID: 42\n");
        assert_eq!(resolve(&doc.messages[0], &[]).unwrap(), Some(42));
    }

    #[test]
    fn composite_fold_shifts_by_previous_width() {
        let doc = parse(
            r#"
Enums:
  - Name: Color
    Options:
      - Name: Red
        Value: 5
Messages:
  - Name: M
    IDs:
      - Value: Color.Red
        Bits: 8
      - Value: 3
        Bits: 4
"#,
        );
        let id = resolve(&doc.messages[0], &doc.enums).unwrap();
        assert_eq!(id, Some((5 << 8) + 3));
        assert_eq!(id, Some(0x503));
    }

    #[test]
    fn composite_fold_is_deterministic() {
        let doc = parse(
            "Messages:\n  - Name: M\n    IDs:\n      - {Value: 1, Bits: 4}\n      - {Value: 2, Bits: 4}\n      - {Value: 3, Bits: 4}\n",
        );
        let first = resolve(&doc.messages[0], &[]).unwrap();
        let second = resolve(&doc.messages[0], &[]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Some((((1 << 4) + 2) << 4) + 3));
    }

    #[test]
    fn numeric_string_tokens_pass_through() {
        let doc = parse("Messages:\n  - Name: M\n    IDs:\n      - {Value: \"7\", Bits: 8}\n");
        assert_eq!(resolve(&doc.messages[0], &[]).unwrap(), Some(7));
    }

    #[test]
    fn unresolvable_token_names_itself() {
        let doc = parse("Messages:\n  - Name: M\n    IDs:\n      - {Value: Ghost.Blue, Bits: 8}\n");
        let err = resolve(&doc.messages[0], &[]).unwrap_err();
        match err {
            CompileError::UnresolvedIdentifier { message, token } => {
                assert_eq!(message, "M");
                assert_eq!(token, "Ghost.Blue");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_enum_value_is_unresolvable() {
        let doc = parse(
            r#"
Enums:
  - Name: Offset
    Options:
      - Name: Below
        Value: -2
Messages:
  - Name: M
    IDs:
      - Value: Offset.Below
        Bits: 8
"#,
        );
        let err = resolve(&doc.messages[0], &doc.enums).unwrap_err();
        match err {
            CompileError::UnresolvedIdentifier { message, token } => {
                assert_eq!(message, "M");
                assert_eq!(token, "Offset.Below");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_id_forms_resolve_to_none() {
        let doc = parse("Messages:\n  - Name: Header\n");
        assert_eq!(resolve(&doc.messages[0], &[]).unwrap(), None);
    }
}
