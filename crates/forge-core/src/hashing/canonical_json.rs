//! JSON canónico: claves de objeto ordenadas, separadores compactos.
//! Dos documentos estructuralmente iguales producen el mismo string.

use serde_json::Value;
use std::collections::BTreeMap;

pub fn to_canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&serde_json::to_string(s).expect("string json")),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // BTreeMap ordena las claves; los valores se serializan recursivo.
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            out.push('{');
            for (i, (key, val)) in sorted.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key).expect("key json"));
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ordena_claves_en_cualquier_nivel() {
        let a = json!({"b": 1, "a": {"z": true, "m": [1, 2]}});
        assert_eq!(to_canonical_json(&a), r#"{"a":{"m":[1,2],"z":true},"b":1}"#);
    }

    #[test]
    fn escapa_strings_como_json() {
        let v = json!({"k": "line\nbreak"});
        assert_eq!(to_canonical_json(&v), r#"{"k":"line\nbreak"}"#);
    }
}
