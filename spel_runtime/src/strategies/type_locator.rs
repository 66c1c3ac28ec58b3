//! Default type lookup
//!
//! Simple names resolve against the registered import prefixes, which start
//! out as `java.lang` only; `java.util` types need their qualified name
//! unless that package is imported.

use crate::strategies::traits::TypeLocator;
use crate::types::{TypeDescriptor, TypeKind};

const KNOWN_TYPES: &[(&str, &str, TypeKind)] = &[
    ("java.lang", "Object", TypeKind::Object),
    ("java.lang", "Number", TypeKind::Number),
    ("java.lang", "String", TypeKind::String),
    ("java.lang", "Character", TypeKind::Character),
    ("java.lang", "Boolean", TypeKind::Boolean),
    ("java.lang", "Integer", TypeKind::Integer),
    ("java.lang", "Long", TypeKind::Long),
    ("java.lang", "Float", TypeKind::Float),
    ("java.lang", "Double", TypeKind::Double),
    ("java.lang", "Math", TypeKind::Math),
    ("java.util", "List", TypeKind::List),
    ("java.util", "ArrayList", TypeKind::List),
    ("java.util", "LinkedList", TypeKind::List),
    ("java.util", "Map", TypeKind::Map),
    ("java.util", "HashMap", TypeKind::Map),
    ("java.util", "LinkedHashMap", TypeKind::Map),
];

const PRIMITIVES: &[(&str, TypeKind)] = &[
    ("boolean", TypeKind::Boolean),
    ("char", TypeKind::Character),
    ("int", TypeKind::Integer),
    ("long", TypeKind::Long),
    ("float", TypeKind::Float),
    ("double", TypeKind::Double),
];

#[derive(Debug, Clone)]
pub struct StandardTypeLocator {
    import_prefixes: Vec<String>,
}

impl Default for StandardTypeLocator {
    fn default() -> Self {
        Self {
            import_prefixes: vec!["java.lang".to_string()],
        }
    }
}

impl StandardTypeLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let simple names resolve against `prefix` as well
    pub fn register_import(&mut self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        if !self.import_prefixes.contains(&prefix) {
            self.import_prefixes.push(prefix);
        }
    }

    pub fn import_prefixes(&self) -> &[String] {
        &self.import_prefixes
    }

    fn qualified(&self, name: &str) -> Option<TypeKind> {
        KNOWN_TYPES
            .iter()
            .find(|(package, simple, _)| {
                name.strip_prefix(package)
                    .and_then(|rest| rest.strip_prefix('.'))
                    .is_some_and(|rest| rest == *simple)
            })
            .map(|(_, _, kind)| *kind)
    }
}

impl TypeLocator for StandardTypeLocator {
    fn find_type(&self, name: &str) -> Option<TypeDescriptor> {
        if let Some((_, kind)) = PRIMITIVES.iter().find(|(primitive, _)| *primitive == name) {
            return Some(TypeDescriptor::primitive(*kind));
        }

        if let Some(kind) = self.qualified(name) {
            return Some(TypeDescriptor::new(kind));
        }

        if name.contains('.') {
            return None;
        }

        self.import_prefixes
            .iter()
            .find_map(|prefix| self.qualified(&format!("{}.{}", prefix, name)))
            .map(TypeDescriptor::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn java_lang_names_resolve_unqualified() {
        let locator = StandardTypeLocator::new();
        assert_eq!(
            locator.find_type("Integer"),
            Some(TypeDescriptor::new(TypeKind::Integer))
        );
        assert_eq!(
            locator.find_type("java.lang.String"),
            Some(TypeDescriptor::new(TypeKind::String))
        );
        assert_eq!(
            locator.find_type("int"),
            Some(TypeDescriptor::primitive(TypeKind::Integer))
        );
    }

    #[test]
    fn java_util_needs_qualification_or_import() {
        let mut locator = StandardTypeLocator::new();
        assert_eq!(locator.find_type("ArrayList"), None);
        assert_eq!(
            locator.find_type("java.util.ArrayList"),
            Some(TypeDescriptor::new(TypeKind::List))
        );

        locator.register_import("java.util");
        assert_eq!(
            locator.find_type("HashMap"),
            Some(TypeDescriptor::new(TypeKind::Map))
        );
    }

    #[test]
    fn unknown_names_are_not_found() {
        let locator = StandardTypeLocator::new();
        assert_eq!(locator.find_type("Thread"), None);
        assert_eq!(locator.find_type("java.lang.Thread"), None);
        assert_eq!(locator.find_type("com.example.String"), None);
    }
}
