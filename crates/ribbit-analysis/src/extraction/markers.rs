//! Naming markers of the DI framework and the role they imply.

use std::sync::LazyLock;

use regex::Regex;

pub const COMPONENT: &str = "Component";
pub const NON_CORE_COMPONENT: &str = "NonCoreComponent";
pub const PLUGINIZABLE_COMPONENT: &str = "PluginizableComponent";
pub const PLUGINIZED_COMPONENT: &str = "PluginizedComponent";
pub const BUILDER: &str = "Builder";
pub const PLUGINIZED_BUILDER: &str = "PluginizedBuilder";
pub const NEEDLE_BUILDER: &str = "NeedleBuilder";
pub const PLUGIN_POINT: &str = "PluginPoint";
pub const BUILDABLE: &str = "Buildable";
pub const BUILDING: &str = "Building";
pub const DEPENDENCY: &str = "Dependency";
pub const NON_CORE: &str = "NonCore";
pub const PLUGIN_FACTORIES: &str = "pluginFactories";

/// Callees containing these are wrappers, not instantiations; their
/// arguments are still visited.
pub const IGNORED_CALLEES: [&str; 2] = ["shared", "super.init"];

/// Calls to these build structure, not dependencies, so no abstraction is
/// inferred for them.
pub const STRUCTURAL_CALLEES: [&str; 4] = [BUILDER, COMPONENT, "ViewController", "Interactor"];

/// `<FooDependency,` inside a pluginized component header.
static EMBEDDED_DEPENDENCY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<[a-zA-Z]+Dependency,").ok());

/// Role implied by a declaration's primary base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// `Component<D>` / `NonCoreComponent<D>`
    Component { plain: bool },
    /// `PluginizableComponent<D, P, N>` / `PluginizedComponent<D, P, N>`
    PluginizedComponent,
    /// `Builder<D>`
    Builder,
    /// `PluginizedBuilder<...>` / `NeedleBuilder<...>`
    PluginizedBuilder,
    /// A non-generic `...Buildable` / `...Building` base.
    CustomBuilder,
    PluginPoint,
    UnknownComponent,
    UnknownBuilder,
    Unhandled,
}

impl Role {
    /// Classify a base type name (namespace already stripped).
    pub fn of(base_name: &str, has_generics: bool) -> Role {
        if !has_generics {
            return if base_name.contains(BUILDABLE) || base_name.contains(BUILDING) {
                Role::CustomBuilder
            } else if base_name.contains(PLUGIN_POINT) {
                Role::PluginPoint
            } else {
                Role::Unhandled
            };
        }
        if base_name.contains(COMPONENT) {
            match base_name {
                COMPONENT => Role::Component { plain: true },
                NON_CORE_COMPONENT => Role::Component { plain: false },
                PLUGINIZABLE_COMPONENT | PLUGINIZED_COMPONENT => Role::PluginizedComponent,
                _ => Role::UnknownComponent,
            }
        } else if base_name.contains(BUILDER) {
            match base_name {
                BUILDER => Role::Builder,
                PLUGINIZED_BUILDER | NEEDLE_BUILDER => Role::PluginizedBuilder,
                _ => Role::UnknownBuilder,
            }
        } else if base_name.contains(PLUGIN_POINT) {
            Role::PluginPoint
        } else {
            Role::Unhandled
        }
    }
}

/// Ignored wrapper call (`shared { ... }`, `super.init(...)`).
pub fn is_ignored_callee(callee: &str) -> bool {
    IGNORED_CALLEES.iter().any(|m| callee.contains(m))
}

/// A callee that reads like a type instantiation: uppercase first letter,
/// ASCII letters and digits only.
pub fn is_instantiation(callee: &str) -> bool {
    callee.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && callee.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn is_structural(callee: &str) -> bool {
    STRUCTURAL_CALLEES.iter().any(|m| callee.contains(m))
}

/// `FooDependency` from a header containing `<FooDependency,`.
pub fn embedded_dependency_name(header: &str) -> Option<String> {
    let re = EMBEDDED_DEPENDENCY.as_ref()?;
    let compact: String = header.chars().filter(|c| !c.is_whitespace()).collect();
    let found = re.find(&compact)?;
    Some(
        found
            .as_str()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect(),
    )
}
