//! Marked declaration discovery.
//!
//! # Responsibility
//! - Define the discovery seam used by the driver.
//! - Scan a Rust source tree for items carrying the `eager_initialize` marker.
//!
//! # Invariants
//! - Files are visited in file-name order per directory; items in source order.
//!   The same tree always yields the same declarations in the same order.
//! - Every marked item is reported, whatever its kind and however deeply it is
//!   nested; kind checks belong to the validator.
//! - Only an immutable module-level static typed as a lazy cell
//!   (`LAZY_CELL_TYPES`) is a singleton. Items inside impl, trait, or extern
//!   blocks and fn bodies are always `Other`.
//!
//! # Module paths
//! - `lib.rs` / `main.rs` at the root map to the crate prefix.
//! - `a.rs` and `a/mod.rs` map to `<prefix>::a`; `a/b.rs` to `<prefix>::a::b`.
//! - Inline `mod x { ... }` blocks extend the path.

use crate::annotation::{find_marker, MarkerError};
use crate::model::declaration::{AnnotatedDeclaration, DeclarationKind};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use syn::visit::{self, Visit};
use syn::{Attribute, ForeignItem, ImplItem, Item, ItemStatic, StaticMutability, TraitItem, Type};
use walkdir::{DirEntry, WalkDir};

/// Default prefix for discovered qualified names.
pub const DEFAULT_CRATE_PREFIX: &str = "crate";

/// Last path segments of the lazy cell types a singleton static may have.
pub const LAZY_CELL_TYPES: [&str; 3] = ["LazyLock", "LazyCell", "Lazy"];

/// Source of marked declarations for one generation run.
pub trait SymbolDiscovery {
    /// Returns every marked declaration, in deterministic discovery order.
    fn discover(&self) -> Result<Vec<AnnotatedDeclaration>, DiscoveryError>;
}

/// Discovery over an already materialized declaration list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiscovery {
    declarations: Vec<AnnotatedDeclaration>,
}

impl SnapshotDiscovery {
    pub fn new(declarations: Vec<AnnotatedDeclaration>) -> Self {
        Self { declarations }
    }
}

impl SymbolDiscovery for SnapshotDiscovery {
    fn discover(&self) -> Result<Vec<AnnotatedDeclaration>, DiscoveryError> {
        Ok(self.declarations.clone())
    }
}

/// Discovery over a directory of Rust sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTreeDiscovery {
    root: PathBuf,
    crate_prefix: String,
}

impl SourceTreeDiscovery {
    /// Scans `root` (typically a crate's `src/`) with the `crate` prefix.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            crate_prefix: DEFAULT_CRATE_PREFIX.to_string(),
        }
    }

    /// Replaces the leading `crate` segment of qualified names.
    pub fn with_crate_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.crate_prefix = prefix.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scan_file(
        &self,
        path: &Path,
        out: &mut Vec<AnnotatedDeclaration>,
    ) -> Result<(), DiscoveryError> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let location = display_relative(relative);

        let source = std::fs::read_to_string(path).map_err(|err| DiscoveryError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
        let file = syn::parse_file(&source).map_err(|err| DiscoveryError::Parse {
            location: location.clone(),
            message: err.to_string(),
        })?;

        let mut module = vec![self.crate_prefix.clone()];
        module.extend(module_segments(relative));
        let before = out.len();
        scan_items(&file.items, &mut module, &location, out)?;
        if out.len() > before {
            debug!(
                "event=discover_file module=discovery status=ok file={} marked={}",
                location,
                out.len() - before
            );
        }
        Ok(())
    }
}

impl SymbolDiscovery for SourceTreeDiscovery {
    fn discover(&self) -> Result<Vec<AnnotatedDeclaration>, DiscoveryError> {
        let started_at = Instant::now();
        info!(
            "event=discover module=discovery status=start root={}",
            self.root.display()
        );

        if !self.root.is_dir() {
            error!(
                "event=discover module=discovery status=error error_code=missing_root root={}",
                self.root.display()
            );
            return Err(DiscoveryError::MissingRoot(self.root.clone()));
        }

        let mut declarations = Vec::new();
        let mut files = 0_usize;
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
        for entry in walker {
            let entry = entry.map_err(|err| DiscoveryError::Walk(err.to_string()))?;
            if !entry.file_type().is_file() || !is_rust_source(entry.path()) {
                continue;
            }
            files += 1;
            if let Err(err) = self.scan_file(entry.path(), &mut declarations) {
                error!(
                    "event=discover module=discovery status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        }

        info!(
            "event=discover module=discovery status=ok files={} declarations={} duration_ms={}",
            files,
            declarations.len(),
            started_at.elapsed().as_millis()
        );
        Ok(declarations)
    }
}

fn scan_items(
    items: &[Item],
    module: &mut Vec<String>,
    location: &str,
    out: &mut Vec<AnnotatedDeclaration>,
) -> Result<(), DiscoveryError> {
    for item in items {
        let Some((attrs, kind, name)) = describe_item(item) else {
            continue;
        };
        record_marked(attrs, kind, qualify(module, &name), location, out)?;

        match item {
            Item::Mod(item_mod) => {
                if let Some((_, nested)) = &item_mod.content {
                    module.push(item_mod.ident.to_string());
                    let scanned = scan_items(nested, module, location, out);
                    module.pop();
                    scanned?;
                }
            }
            _ => {
                let mut scope = module.clone();
                scope.push(scope_segment(item, name));
                let mut nested = NestedScan {
                    scope,
                    location,
                    out: &mut *out,
                    failure: None,
                };
                visit::visit_item(&mut nested, item);
                if let Some(err) = nested.failure {
                    return Err(err);
                }
            }
        }
    }
    Ok(())
}

fn record_marked(
    attrs: &[Attribute],
    kind: DeclarationKind,
    qualified_name: String,
    location: &str,
    out: &mut Vec<AnnotatedDeclaration>,
) -> Result<(), DiscoveryError> {
    let marker = find_marker(attrs).map_err(|err| DiscoveryError::InvalidMarker {
        location: location.to_string(),
        item: qualified_name.clone(),
        source: err,
    })?;
    if let Some(marker) = marker {
        out.push(
            AnnotatedDeclaration::new(qualified_name, kind, location)
                .with_priority(marker.priority),
        );
    }
    Ok(())
}

/// Marked declarations inside impl, trait, and extern blocks or fn bodies.
///
/// None of these has a path the generated unit could force, so every hit
/// is reported as `Other`.
struct NestedScan<'a> {
    scope: Vec<String>,
    location: &'a str,
    out: &'a mut Vec<AnnotatedDeclaration>,
    failure: Option<DiscoveryError>,
}

impl NestedScan<'_> {
    fn record(&mut self, attrs: &[Attribute], name: &str) {
        if self.failure.is_some() {
            return;
        }
        let qualified_name = qualify(&self.scope, name);
        if let Err(err) = record_marked(
            attrs,
            DeclarationKind::Other,
            qualified_name,
            self.location,
            self.out,
        ) {
            self.failure = Some(err);
        }
    }

    fn within(&mut self, segment: String, walk: impl FnOnce(&mut Self)) {
        self.scope.push(segment);
        walk(self);
        self.scope.pop();
    }
}

impl<'ast> Visit<'ast> for NestedScan<'_> {
    fn visit_item(&mut self, item: &'ast Item) {
        let Some((attrs, _, name)) = describe_item(item) else {
            return;
        };
        self.record(attrs, &name);
        let segment = scope_segment(item, name);
        self.within(segment, |scan| visit::visit_item(scan, item));
    }

    fn visit_impl_item(&mut self, item: &'ast ImplItem) {
        let (attrs, name) = match item {
            ImplItem::Const(item) => (&item.attrs[..], item.ident.to_string()),
            ImplItem::Fn(item) => (&item.attrs[..], item.sig.ident.to_string()),
            ImplItem::Type(item) => (&item.attrs[..], item.ident.to_string()),
            ImplItem::Macro(item) => (&item.attrs[..], "<macro>".to_string()),
            _ => return,
        };
        self.record(attrs, &name);
        self.within(name, |scan| visit::visit_impl_item(scan, item));
    }

    fn visit_trait_item(&mut self, item: &'ast TraitItem) {
        let (attrs, name) = match item {
            TraitItem::Const(item) => (&item.attrs[..], item.ident.to_string()),
            TraitItem::Fn(item) => (&item.attrs[..], item.sig.ident.to_string()),
            TraitItem::Type(item) => (&item.attrs[..], item.ident.to_string()),
            TraitItem::Macro(item) => (&item.attrs[..], "<macro>".to_string()),
            _ => return,
        };
        self.record(attrs, &name);
        self.within(name, |scan| visit::visit_trait_item(scan, item));
    }

    fn visit_foreign_item(&mut self, item: &'ast ForeignItem) {
        let (attrs, name) = match item {
            ForeignItem::Fn(item) => (&item.attrs[..], item.sig.ident.to_string()),
            ForeignItem::Static(item) => (&item.attrs[..], item.ident.to_string()),
            ForeignItem::Type(item) => (&item.attrs[..], item.ident.to_string()),
            ForeignItem::Macro(item) => (&item.attrs[..], "<macro>".to_string()),
            _ => return,
        };
        self.record(attrs, &name);
    }
}

/// Attributes, kind, and display name of one item.
///
/// Items without an identifier get a bracketed placeholder so they still
/// surface in diagnostics.
fn describe_item(item: &Item) -> Option<(&[Attribute], DeclarationKind, String)> {
    use DeclarationKind::Other;

    let described = match item {
        Item::Static(item) => (&item.attrs[..], static_kind(item), item.ident.to_string()),
        Item::Const(item) => (&item.attrs[..], Other, item.ident.to_string()),
        Item::Struct(item) => (&item.attrs[..], Other, item.ident.to_string()),
        Item::Enum(item) => (&item.attrs[..], Other, item.ident.to_string()),
        Item::Union(item) => (&item.attrs[..], Other, item.ident.to_string()),
        Item::Trait(item) => (&item.attrs[..], Other, item.ident.to_string()),
        Item::TraitAlias(item) => (&item.attrs[..], Other, item.ident.to_string()),
        Item::Type(item) => (&item.attrs[..], Other, item.ident.to_string()),
        Item::Fn(item) => (&item.attrs[..], Other, item.sig.ident.to_string()),
        Item::Mod(item) => (&item.attrs[..], Other, item.ident.to_string()),
        Item::ExternCrate(item) => (&item.attrs[..], Other, item.ident.to_string()),
        Item::Macro(item) => (
            &item.attrs[..],
            Other,
            item.ident
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "<macro>".to_string()),
        ),
        Item::Impl(item) => (&item.attrs[..], Other, "<impl>".to_string()),
        Item::Use(item) => (&item.attrs[..], Other, "<use>".to_string()),
        Item::ForeignMod(item) => (&item.attrs[..], Other, "<extern>".to_string()),
        _ => return None,
    };
    Some(described)
}

/// Singleton only for an immutable static whose type is a lazy cell;
/// anything else cannot be forced with `&*` from the generated unit.
fn static_kind(item: &ItemStatic) -> DeclarationKind {
    let mutable = matches!(item.mutability, StaticMutability::Mut(_));
    if !mutable && is_lazy_cell(&item.ty) {
        DeclarationKind::Singleton
    } else {
        DeclarationKind::Other
    }
}

fn is_lazy_cell(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => {
            type_path.qself.is_none()
                && type_path
                    .path
                    .segments
                    .last()
                    .is_some_and(|segment| {
                        LAZY_CELL_TYPES.iter().any(|name| segment.ident == *name)
                    })
        }
        Type::Group(group) => is_lazy_cell(&group.elem),
        Type::Paren(paren) => is_lazy_cell(&paren.elem),
        _ => false,
    }
}

/// Path segment that nested declarations of `item` are reported under.
fn scope_segment(item: &Item, name: String) -> String {
    let Item::Impl(item_impl) = item else {
        return name;
    };
    match item_impl.self_ty.as_ref() {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or(name),
        _ => name,
    }
}

fn qualify(module: &[String], name: &str) -> String {
    let mut qualified = module.join("::");
    qualified.push_str("::");
    qualified.push_str(name);
    qualified
}

/// Module path segments implied by a file path relative to the source root.
fn module_segments(relative: &Path) -> Vec<String> {
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let Some(file_name) = segments.pop() else {
        return segments;
    };
    let stem = file_name.strip_suffix(".rs").unwrap_or(&file_name);
    let is_crate_root = segments.is_empty() && (stem == "lib" || stem == "main");
    if stem != "mod" && !is_crate_root {
        segments.push(stem.to_string());
    }
    segments
}

fn display_relative(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_rust_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "rs")
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "target"
}

/// Discovery errors.
#[derive(Debug)]
pub enum DiscoveryError {
    MissingRoot(PathBuf),
    Walk(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        location: String,
        message: String,
    },
    InvalidMarker {
        location: String,
        item: String,
        source: MarkerError,
    },
}

impl Display for DiscoveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRoot(path) => {
                write!(f, "source root is not a directory: {}", path.display())
            }
            Self::Walk(message) => write!(f, "failed to walk source tree: {message}"),
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Parse { location, message } => {
                write!(f, "failed to parse `{location}`: {message}")
            }
            Self::InvalidMarker {
                location,
                item,
                source,
            } => write!(f, "{location} on the {item} declaration: {source}"),
        }
    }
}

impl Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidMarker { source, .. } => Some(source),
            Self::MissingRoot(_) | Self::Walk(_) | Self::Parse { .. } => None,
        }
    }
}
