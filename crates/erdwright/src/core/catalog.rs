//! Model catalog: class definitions supplied by the host environment
//!
//! Field extraction happens ahead of traversal. An exporter running next
//! to the modelling framework writes every module it knows about into a
//! JSON document; the catalog loads that document and answers name
//! lookups so the traversal never needs runtime reflection.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, span, Level};

use super::error::{ErdError, Result};
use super::type_expr::TypeExpr;

/// One annotated attribute as written in a class body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    /// Annotation text, e.g. `Optional[List[Quest]]`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `None` when the attribute has no default; `Some(Value::Null)` when
    /// the default is Python's `None`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<serde_json::Value>,
}

impl AttributeDef {
    pub fn new(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: Some(annotation.into()),
            description: None,
            default: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// A class definition inside a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub decorators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub fields: Vec<AttributeDef>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            decorators: Vec::new(),
            doc: None,
            fields: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.bases.push(base.into());
        self
    }

    pub fn with_decorator(mut self, decorator: impl Into<String>) -> Self {
        self.decorators.push(decorator.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_field(mut self, field: AttributeDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// A module: a dotted name, its import aliases, and the classes it defines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Alias -> fully-qualified name, e.g. `"BaseModel": "pydantic.BaseModel"`
    #[serde(default)]
    pub imports: BTreeMap<String, String>,
    #[serde(default)]
    pub classes: Vec<ClassDef>,
}

impl ModuleDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            imports: BTreeMap::new(),
            classes: Vec::new(),
        }
    }

    pub fn with_import(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.imports.insert(alias.into(), target.into());
        self
    }

    pub fn with_class(mut self, class: ClassDef) -> Self {
        self.classes.push(class);
        self
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct SchemaDocument {
    #[serde(default)]
    modules: Vec<ModuleDef>,
}

fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Every module known to one diagram invocation
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    modules: Vec<ModuleDef>,
    module_index: HashMap<String, usize>,
    class_index: HashMap<String, (usize, usize)>,
}

impl ModelCatalog {
    /// Build a catalog, rejecting duplicate module or class names
    pub fn from_modules(modules: Vec<ModuleDef>) -> Result<Self> {
        let mut module_index = HashMap::new();
        let mut class_index = HashMap::new();

        for (module_idx, module) in modules.iter().enumerate() {
            if module.name.is_empty() {
                return Err(ErdError::schema_error("module with an empty name"));
            }
            if module_index.insert(module.name.clone(), module_idx).is_some() {
                return Err(ErdError::schema_error(format!(
                    "duplicate module '{}'",
                    module.name
                )));
            }
            for (class_idx, class) in module.classes.iter().enumerate() {
                let key = format!("{}.{}", module.name, class.name);
                if class_index.insert(key.clone(), (module_idx, class_idx)).is_some() {
                    return Err(ErdError::schema_error(format!("duplicate class '{}'", key)));
                }
            }
        }

        Ok(Self {
            modules,
            module_index,
            class_index,
        })
    }

    /// Parse a JSON schema document
    pub fn from_json_str(input: &str) -> Result<Self> {
        let document: SchemaDocument = serde_json::from_str(input)
            .map_err(|e| ErdError::schema_error(format!("invalid schema document: {}", e)))?;
        Self::from_modules(document.modules)
    }

    /// Load a JSON schema document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_span = span!(Level::INFO, "load_catalog", path = %path.display());
        let _enter = load_span.enter();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ErdError::schema_error(format!("failed to read '{}': {}", path.display(), e))
        })?;
        let catalog = Self::from_json_str(&content)?;
        info!(
            modules = catalog.module_count(),
            classes = catalog.class_count(),
            "Loaded model catalog"
        );
        Ok(catalog)
    }

    /// Serialize back into the schema document format
    pub fn to_json_string(&self) -> Result<String> {
        let document = SchemaDocument {
            modules: self.modules.clone(),
        };
        serde_json::to_string_pretty(&document)
            .map_err(|e| ErdError::schema_error(format!("failed to serialize schema: {}", e)))
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleDef> {
        self.modules.iter()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDef> {
        self.module_index.get(name).map(|&idx| &self.modules[idx])
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn class_count(&self) -> usize {
        self.class_index.len()
    }

    /// Look up a class by its fully-qualified name
    pub fn class(&self, qualified_name: &str) -> Option<ClassHandle<'_>> {
        self.class_index
            .get(qualified_name)
            .map(|&(module_idx, class_idx)| self.handle(module_idx, class_idx))
    }

    /// Every class in module order, then declaration order
    pub fn classes(&self) -> impl Iterator<Item = ClassHandle<'_>> {
        self.modules
            .iter()
            .enumerate()
            .flat_map(move |(module_idx, module)| {
                (0..module.classes.len()).map(move |class_idx| self.handle(module_idx, class_idx))
            })
    }

    /// Classes defined in one module, in declaration order
    pub fn module_classes(&self, module_name: &str) -> Vec<ClassHandle<'_>> {
        match self.module_index.get(module_name) {
            Some(&module_idx) => (0..self.modules[module_idx].classes.len())
                .map(|class_idx| self.handle(module_idx, class_idx))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Resolve a dotted path to a class or a module
    ///
    /// Classes win over modules when a path names both.
    pub fn lookup(&self, path: &str) -> Result<Lookup<'_>> {
        if let Some(class) = self.class(path) {
            debug!(path, "Resolved path to class");
            return Ok(Lookup::Class(class));
        }
        if let Some(module) = self.module(path) {
            debug!(path, "Resolved path to module");
            return Ok(Lookup::Module(module));
        }
        Err(ErdError::not_found(path))
    }

    fn handle(&self, module_idx: usize, class_idx: usize) -> ClassHandle<'_> {
        let module = &self.modules[module_idx];
        ClassHandle {
            catalog: self,
            module,
            class: &module.classes[class_idx],
        }
    }
}

/// Result of resolving a dotted path
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    Class(ClassHandle<'a>),
    Module(&'a ModuleDef),
}

/// Result of resolving a name in the scope of a module
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedName<'a> {
    /// A class defined somewhere in the catalog
    Class(ClassHandle<'a>),
    /// A name the catalog does not define (`str`, `pydantic.BaseModel`)
    External(String),
}

/// Borrowed view of one class inside a catalog
#[derive(Clone, Copy)]
pub struct ClassHandle<'a> {
    catalog: &'a ModelCatalog,
    module: &'a ModuleDef,
    class: &'a ClassDef,
}

impl<'a> ClassHandle<'a> {
    pub fn name(&self) -> &'a str {
        &self.class.name
    }

    pub fn module_name(&self) -> &'a str {
        &self.module.name
    }

    /// Fully-qualified `module.Class` path
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module.name, self.class.name)
    }

    pub fn def(&self) -> &'a ClassDef {
        self.class
    }

    pub fn module(&self) -> &'a ModuleDef {
        self.module
    }

    pub fn catalog(&self) -> &'a ModelCatalog {
        self.catalog
    }

    pub fn doc(&self) -> Option<&'a str> {
        self.class.doc.as_deref()
    }

    /// Resolve a name as it would be looked up inside this class's module
    ///
    /// Order: fully-qualified name, a class of the same module, then the
    /// module's import table (an alias or the head of a dotted name).
    pub fn resolve_name(&self, name: &str) -> ResolvedName<'a> {
        if let Some(class) = self.catalog.class(name) {
            return ResolvedName::Class(class);
        }

        let local = format!("{}.{}", self.module.name, name);
        if let Some(class) = self.catalog.class(&local) {
            return ResolvedName::Class(class);
        }

        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        if let Some(target) = self.module.imports.get(head) {
            let full = match rest {
                Some(rest) => format!("{}.{}", target, rest),
                None => target.clone(),
            };
            if let Some(class) = self.catalog.class(&full) {
                return ResolvedName::Class(class);
            }
            return ResolvedName::External(full);
        }

        ResolvedName::External(name.to_string())
    }

    /// Linearized bases, nearest first
    ///
    /// Depth-first, left to right, first occurrence wins. Bases inside the
    /// catalog are followed; external bases are reported by their resolved
    /// import name. Inheritance cycles in a malformed catalog are cut.
    pub fn bases(&self) -> Vec<ResolvedName<'a>> {
        let mut seen = HashSet::new();
        seen.insert(self.qualified_name());
        let mut out = Vec::new();
        self.collect_bases(&mut seen, &mut out);
        out
    }

    fn collect_bases(&self, seen: &mut HashSet<String>, out: &mut Vec<ResolvedName<'a>>) {
        for base in &self.class.bases {
            // `Page[Item]` and `Generic[T]` inherit from their head name
            let parsed = TypeExpr::parse(base);
            let head = match parsed.as_ref().ok().and_then(TypeExpr::head) {
                Some(head) => head,
                None => base.trim(),
            };
            match self.resolve_name(head) {
                ResolvedName::Class(class) => {
                    if seen.insert(class.qualified_name()) {
                        out.push(ResolvedName::Class(class));
                        class.collect_bases(seen, out);
                    }
                }
                ResolvedName::External(name) => {
                    if seen.insert(name.clone()) {
                        out.push(ResolvedName::External(name));
                    }
                }
            }
        }
    }

    /// What `name` refers to in this module, qualified where possible
    pub fn canonical_name(&self, name: &str) -> String {
        match self.resolve_name(name) {
            ResolvedName::Class(class) => class.qualified_name(),
            ResolvedName::External(name) => name,
        }
    }

    /// Names of all linearized bases, qualified where possible
    pub fn base_names(&self) -> Vec<String> {
        self.bases()
            .into_iter()
            .map(|base| match base {
                ResolvedName::Class(class) => class.qualified_name(),
                ResolvedName::External(name) => name,
            })
            .collect()
    }
}

impl PartialEq for ClassHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.class, other.class)
    }
}

impl fmt::Debug for ClassHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassHandle")
            .field(&self.qualified_name())
            .finish()
    }
}

impl fmt::Display for ClassHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module.name, self.class.name)
    }
}
