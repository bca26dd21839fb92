//! Type descriptors
//!
//! The runtime names parameter and return types with field descriptors
//! (`D`, `[I`, `Ljava/lang/String;`). Callers usually hold source-level
//! names, so this module converts between the two.

/// Descriptor character for a primitive type name
fn primitive(name: &str) -> Option<char> {
    let c = match name {
        "boolean" => 'Z',
        "byte" => 'B',
        "char" => 'C',
        "short" => 'S',
        "int" => 'I',
        "long" => 'J',
        "float" => 'F',
        "double" => 'D',
        "void" => 'V',
        _ => return None,
    };
    Some(c)
}

/// Convert a source-level type name to its descriptor.
///
/// `double` → `D`, `int[][]` → `[[I`, `java.lang.String` → `Ljava/lang/String;`.
/// Nested types keep their `$` separator: `a.Outer$Inner` → `La/Outer$Inner;`.
pub fn descriptor_for(source_name: &str) -> String {
    let name = source_name.trim();
    if let Some(element) = name.strip_suffix("[]") {
        return format!("[{}", descriptor_for(element));
    }
    match primitive(name) {
        Some(c) => c.to_string(),
        None => format!("L{};", name.replace('.', "/")),
    }
}

/// Length in bytes of the field descriptor at the start of `bytes`
fn field_len(bytes: &[u8]) -> Option<usize> {
    match bytes.first()? {
        b'Z' | b'B' | b'C' | b'S' | b'I' | b'J' | b'F' | b'D' => Some(1),
        b'[' => field_len(&bytes[1..]).map(|n| n + 1),
        b'L' => {
            let end = bytes.iter().position(|&b| b == b';')?;
            // `L;` names no class
            (end > 1).then_some(end + 1)
        }
        _ => None,
    }
}

/// Check whether `text` is exactly one field descriptor
pub fn is_field_descriptor(text: &str) -> bool {
    field_len(text.as_bytes()) == Some(text.len())
}

/// Check whether `text` is a valid return descriptor (`V` or a field descriptor)
pub fn is_return_descriptor(text: &str) -> bool {
    text == "V" || is_field_descriptor(text)
}
