//! Textual type references: `NeedleFoundation.PluginizedComponent<A, B, C>`.

use std::fmt;

use serde::Serialize;

/// Remove all whitespace. Two type texts are "the same type" when their
/// canonical forms are equal.
pub fn canonical(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// A parsed type reference: dotted path plus generic arguments.
///
/// Anything that is not a plain nominal type (tuples, closures, dictionary
/// sugar) is kept as an opaque single-segment reference holding its canonical
/// text, so it still compares and prints correctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    path: Vec<String>,
    generic_args: Vec<TypeRef>,
    text: String,
}

impl TypeRef {
    /// Parse a type reference. Returns `None` for empty input.
    pub fn parse(text: &str) -> Option<TypeRef> {
        let trimmed = strip_type_prefix(text.trim());
        let canon = canonical(trimmed);
        if canon.is_empty() {
            return None;
        }
        Some(Self::parse_canonical(&canon))
    }

    fn parse_canonical(canon: &str) -> TypeRef {
        let body = canon.trim_end_matches(['?', '!']);
        let (base, args) = match split_generics(body) {
            Some(split) => split,
            None => return Self::opaque(canon),
        };
        let path: Vec<String> = base.split('.').map(str::to_string).collect();
        if path.iter().any(|s| !is_identifier(s)) {
            return Self::opaque(canon);
        }
        let generic_args = args
            .map(|inner| {
                split_top_level(inner, ',')
                    .into_iter()
                    .filter(|a| !a.is_empty())
                    .map(Self::parse_canonical)
                    .collect()
            })
            .unwrap_or_default();
        TypeRef {
            path,
            generic_args,
            text: canon.to_string(),
        }
    }

    fn opaque(canon: &str) -> TypeRef {
        TypeRef {
            path: vec![canon.to_string()],
            generic_args: Vec::new(),
            text: canon.to_string(),
        }
    }

    /// Dotted path segments, e.g. `["NeedleFoundation", "Component"]`.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The path without generic arguments, e.g. `NeedleFoundation.Component`.
    pub fn path_text(&self) -> String {
        self.path.join(".")
    }

    pub fn generic_args(&self) -> &[TypeRef] {
        &self.generic_args
    }

    /// Canonical (whitespace-free) text of the whole reference.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The name used for role matching. A two-segment path whose first
    /// segment is one of `namespaces` resolves to its second segment; any
    /// other path is matched as written.
    pub fn role_name(&self, namespaces: &[String]) -> String {
        match self.path.as_slice() {
            [single] => single.clone(),
            [ns, name] if namespaces.iter().any(|n| n == ns) => name.clone(),
            _ => self.path_text(),
        }
    }

    pub fn first_generic(&self) -> Option<&TypeRef> {
        self.generic_args.first()
    }

    /// The last generic argument, if its text contains `marker`.
    pub fn last_generic_containing(&self, marker: &str) -> Option<&TypeRef> {
        self.generic_args
            .last()
            .filter(|arg| arg.text.contains(marker))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn strip_type_prefix(text: &str) -> &str {
    for prefix in ["any ", "some ", "inout "] {
        if let Some(rest) = text.strip_prefix(prefix) {
            return rest.trim_start();
        }
    }
    text
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Split `Base<Args>` into `("Base", Some("Args"))`. `None` when the angle
/// brackets are unbalanced or followed by more text.
fn split_generics(text: &str) -> Option<(&str, Option<&str>)> {
    let Some(open) = text.find('<') else {
        return Some((text, None));
    };
    let mut depth = 0usize;
    let mut prev = ' ';
    for (i, c) in text.char_indices().skip_while(|(i, _)| *i < open) {
        let is_arrow = prev == '-';
        prev = c;
        match c {
            '<' => depth += 1,
            '>' if is_arrow => {}
            '>' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return if i + 1 == text.len() {
                        Some((&text[..open], Some(&text[open + 1..i])))
                    } else {
                        None
                    };
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` where it is not nested in `<>`, `()` or `[]`.
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut prev = ' ';
    for (i, c) in text.char_indices() {
        let is_arrow = prev == '-';
        prev = c;
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' if is_arrow => {}
            '>' | ')' | ']' => depth -= 1,
            _ if c == sep && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespaces() -> Vec<String> {
        vec!["NeedleFoundation".to_string(), "Presidio".to_string()]
    }

    #[test]
    fn parses_namespaced_generic() {
        let t = TypeRef::parse("NeedleFoundation.PluginizedComponent< FooDependency, FooPluginExtension, FooNonCoreComponent >")
            .unwrap();
        assert_eq!(t.role_name(&namespaces()), "PluginizedComponent");
        assert_eq!(t.first_generic().unwrap().text(), "FooDependency");
        assert_eq!(
            t.last_generic_containing("NonCore").unwrap().text(),
            "FooNonCoreComponent"
        );
        assert_eq!(
            t.text(),
            "NeedleFoundation.PluginizedComponent<FooDependency,FooPluginExtension,FooNonCoreComponent>"
        );
    }

    #[test]
    fn unknown_namespace_is_kept() {
        let t = TypeRef::parse("Vendor.Builder<X>").unwrap();
        assert_eq!(t.role_name(&namespaces()), "Vendor.Builder");
    }

    #[test]
    fn nested_generics_stay_grouped() {
        let t = TypeRef::parse("Builder<Wrapper<A, B>, C>").unwrap();
        assert_eq!(t.generic_args().len(), 2);
        assert_eq!(t.generic_args()[0].text(), "Wrapper<A,B>");
        assert_eq!(t.generic_args()[0].generic_args().len(), 2);
    }

    #[test]
    fn non_nominal_types_are_opaque() {
        let t = TypeRef::parse("(Int) -> String").unwrap();
        assert_eq!(t.path(), &["(Int)->String".to_string()]);
        assert!(t.generic_args().is_empty());

        let dict = TypeRef::parse("[String: Int]").unwrap();
        assert_eq!(dict.text(), "[String:Int]");
    }

    #[test]
    fn optional_and_existential_markers() {
        let t = TypeRef::parse("any FooServicing?").unwrap();
        assert_eq!(t.path(), &["FooServicing".to_string()]);
        assert_eq!(t.text(), "FooServicing?");
        assert!(TypeRef::parse("   ").is_none());
    }

    #[test]
    fn closure_arguments_do_not_close_generics() {
        let t = TypeRef::parse("Listener<(Int) -> Void, Router>").unwrap();
        assert_eq!(t.generic_args().len(), 2);
        assert_eq!(t.generic_args()[1].text(), "Router");
    }

    #[test]
    fn split_top_level_respects_nesting() {
        assert_eq!(
            split_top_level("A<B, C>, D, (E, F)", ','),
            vec!["A<B, C>", "D", "(E, F)"]
        );
    }
}
