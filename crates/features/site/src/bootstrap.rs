//! The page bootstrap module.
//!
//! Every page loads exactly one ES module. It pulls in htmx and its companion extension purely
//! for their side effects, imports hyperscript and starts it once. Browsers evaluate a module URL
//! a single time per document, so the initializer cannot run twice as long as the layout
//! references the module once.

use crate::error::SiteError;
use imt_domain::config::AssetsConfig;
use imt_domain::constants::CSRF_META_NAME;
use std::collections::HashSet;
use std::fmt::Write as _;

/// Binding under which hyperscript's default export is imported.
pub const HYPERSCRIPT_BINDING: &str = "_hyperscript";
/// hyperscript's browser initialization entry point.
pub const HYPERSCRIPT_INIT: &str = "browserInit";

/// One `import` statement of the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptImport {
    /// `import 'src';`
    SideEffect { src: String },
    /// `import binding from 'src';`
    Default { binding: String, src: String },
}

impl ScriptImport {
    pub fn src(&self) -> &str {
        match self {
            Self::SideEffect { src } | Self::Default { src, .. } => src,
        }
    }

    fn binding(&self) -> Option<&str> {
        match self {
            Self::SideEffect { .. } => None,
            Self::Default { binding, .. } => Some(binding),
        }
    }
}

/// `binding.entry_point();`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitCall {
    pub binding: String,
    pub entry_point: String,
}

/// A validated list of imports followed by at most one initializer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBundle {
    imports: Vec<ScriptImport>,
    init: Option<InitCall>,
}

#[derive(Debug, Default)]
pub struct ScriptBundleBuilder {
    imports: Vec<ScriptImport>,
    inits: Vec<InitCall>,
}

impl ScriptBundleBuilder {
    /// Imports a module only for the side effects of evaluating it.
    #[must_use]
    pub fn side_effect(mut self, src: impl Into<String>) -> Self {
        self.imports.push(ScriptImport::SideEffect { src: src.into() });
        self
    }

    /// Imports a module's default export under `binding`.
    #[must_use]
    pub fn default_import(mut self, binding: impl Into<String>, src: impl Into<String>) -> Self {
        self.imports.push(ScriptImport::Default { binding: binding.into(), src: src.into() });
        self
    }

    /// Calls `binding.entry_point()` after every import has been evaluated.
    #[must_use]
    pub fn init(mut self, binding: impl Into<String>, entry_point: impl Into<String>) -> Self {
        self.inits.push(InitCall { binding: binding.into(), entry_point: entry_point.into() });
        self
    }

    /// Validates the declaration.
    ///
    /// # Errors
    /// Returns [`SiteError::Bootstrap`] for a second initializer, an initializer on an undeclared
    /// binding, duplicate or malformed bindings and sources.
    pub fn build(self) -> Result<ScriptBundle, SiteError> {
        let mut sources = HashSet::new();
        let mut bindings = HashSet::new();

        for import in &self.imports {
            let src = import.src();
            if src.is_empty() {
                return Err(SiteError::bootstrap("import source cannot be empty"));
            }
            if src.contains(['\'', '"', '\\', '\n', '\r']) {
                return Err(SiteError::bootstrap(format!("invalid characters in import source {src:?}")));
            }
            if !sources.insert(src) {
                return Err(SiteError::bootstrap(format!("{src} is imported more than once")));
            }
            if let Some(binding) = import.binding() {
                if !is_identifier(binding) {
                    return Err(SiteError::bootstrap(format!("{binding:?} is not a valid binding")));
                }
                if !bindings.insert(binding) {
                    return Err(SiteError::bootstrap(format!("binding {binding} is declared twice")));
                }
            }
        }

        let mut inits = self.inits.into_iter();
        let init = inits.next();
        if inits.next().is_some() {
            return Err(SiteError::bootstrap("only one initializer may be registered"));
        }
        if let Some(call) = &init {
            if !bindings.contains(call.binding.as_str()) {
                return Err(SiteError::bootstrap(format!(
                    "initializer refers to undeclared binding {}",
                    call.binding
                )));
            }
            if !is_identifier(&call.entry_point) {
                return Err(SiteError::bootstrap(format!(
                    "{:?} is not a valid entry point",
                    call.entry_point
                )));
            }
        }

        Ok(ScriptBundle { imports: self.imports, init })
    }
}

impl ScriptBundle {
    pub fn builder() -> ScriptBundleBuilder {
        ScriptBundleBuilder::default()
    }

    /// htmx, its companion extension, then hyperscript with a single `browserInit()`.
    ///
    /// # Errors
    /// Returns [`SiteError::Bootstrap`] when the configured sources are unusable.
    pub fn standard(assets: &AssetsConfig) -> Result<Self, SiteError> {
        Self::builder()
            .side_effect(&assets.htmx_src)
            .side_effect(&assets.htmx_extension_src)
            .default_import(HYPERSCRIPT_BINDING, &assets.hyperscript_src)
            .init(HYPERSCRIPT_BINDING, HYPERSCRIPT_INIT)
            .build()
    }

    pub fn imports(&self) -> &[ScriptImport] {
        &self.imports
    }

    pub const fn init_call(&self) -> Option<&InitCall> {
        self.init.as_ref()
    }

    /// Renders the ES module source.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for import in &self.imports {
            // Writing into a String cannot fail.
            let _ = match import {
                ScriptImport::SideEffect { src } => writeln!(out, "import '{src}';"),
                ScriptImport::Default { binding, src } => {
                    writeln!(out, "import {binding} from '{src}';")
                },
            };
        }
        if let Some(InitCall { binding, entry_point }) = &self.init {
            let _ = writeln!(out, "\n{binding}.{entry_point}();");
        }
        out
    }
}

/// The companion htmx extension: copies the page's CSRF token into `csrf_header` on every htmx
/// request so state-changing requests pass the double-submit check.
///
/// # Errors
/// Returns [`SiteError::Render`] if the header name cannot be encoded as a string literal.
pub fn render_extension(csrf_header: &str) -> Result<String, SiteError> {
    let header = serde_json::to_string(csrf_header)?;
    let meta = serde_json::to_string(&format!("meta[name=\"{CSRF_META_NAME}\"]"))?;

    Ok(format!(
        "document.addEventListener('htmx:configRequest', (event) => {{\n\
         \x20 const token = document.querySelector({meta});\n\
         \x20 if (token && token.content) {{\n\
         \x20   event.detail.headers[{header}] = token.content;\n\
         \x20 }}\n\
         }});\n"
    ))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(haystack: &str, needle: &str) -> usize {
        haystack.find(needle).unwrap_or_else(|| panic!("{needle} missing from {haystack}"))
    }

    #[test]
    fn standard_bundle_loads_in_order_then_initializes() {
        let js = ScriptBundle::standard(&AssetsConfig::default()).unwrap().render();

        let htmx = position(&js, "import 'https://cdn.jsdelivr.net/npm/htmx.org@2.0.4/dist/htmx.esm.js';");
        let extension = position(&js, "import '/content/htmx-ext.js';");
        let hyperscript =
            position(&js, "import _hyperscript from 'https://cdn.jsdelivr.net/npm/hyperscript.org@0.9.14/+esm';");
        let init = position(&js, "_hyperscript.browserInit();");

        assert!(htmx < extension && extension < hyperscript && hyperscript < init);
        assert_eq!(js.matches("browserInit").count(), 1);
    }

    #[test]
    fn second_initializer_is_rejected() {
        let err = ScriptBundle::builder()
            .default_import("lib", "/lib.js")
            .init("lib", "start")
            .init("lib", "start")
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("only one initializer"));
    }

    #[test]
    fn initializer_needs_declared_binding() {
        let err = ScriptBundle::builder()
            .side_effect("/lib.js")
            .init("lib", "start")
            .build()
            .unwrap_err();

        assert!(matches!(err, SiteError::Bootstrap { .. }));
    }

    #[test]
    fn bundle_without_initializer_only_imports() {
        let bundle = ScriptBundle::builder().side_effect("/a.js").side_effect("/b.js").build().unwrap();

        assert_eq!(bundle.render(), "import '/a.js';\nimport '/b.js';\n");
        assert!(bundle.init_call().is_none());
    }

    #[test]
    fn malformed_declarations_are_rejected() {
        assert!(ScriptBundle::builder().side_effect("").build().is_err());
        assert!(ScriptBundle::builder().side_effect("/a.js").side_effect("/a.js").build().is_err());
        assert!(ScriptBundle::builder().side_effect("/a.js'; alert(1); '").build().is_err());
        assert!(ScriptBundle::builder().default_import("1lib", "/a.js").build().is_err());
        assert!(
            ScriptBundle::builder()
                .default_import("lib", "/a.js")
                .default_import("lib", "/b.js")
                .build()
                .is_err()
        );
        assert!(
            ScriptBundle::builder()
                .default_import("lib", "/a.js")
                .init("lib", "start()")
                .build()
                .is_err()
        );
    }

    #[test]
    fn extension_copies_meta_token_into_header() {
        let js = render_extension("X-CSRF-Token").unwrap();

        assert!(js.contains("'htmx:configRequest'"));
        assert!(js.contains(r#"document.querySelector("meta[name=\"csrf-token\"]")"#));
        assert!(js.contains(r#"event.detail.headers["X-CSRF-Token"] = token.content;"#));
    }
}
