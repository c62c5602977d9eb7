//! Finds the template that renders a page. Starting at the directory that
//! contains the page, each ancestor directory is checked in turn for a
//! template of the requested kind, so the template closest to the content
//! wins. A template registered at the template root is the global fallback.
//!
//! Given templates at `""` and `notes` for [`TemplateKind::Single`]:
//!
//! | page url           | checked scopes              | winner  |
//! |--------------------|-----------------------------|---------|
//! | `/notes/sub/page`  | `notes/sub`, `notes`        | `notes` |
//! | `/notes/page`      | `notes`                     | `notes` |
//! | `/about`           | `""`                        | `""`    |

use crate::template::{Template, TemplateKind, TemplateRegistry};
use crate::url;

/// Resolves the template of `kind` for the page at `url`.
pub fn resolve<'r>(
    registry: &'r TemplateRegistry,
    page_url: &str,
    kind: &TemplateKind,
) -> Result<&'r Template, TemplateNotFound> {
    let mut scope = url::parent_scope(page_url);
    while let Some(parent) = url::parent_of_scope(scope) {
        if let Some(template) = registry.get(scope, kind) {
            return Ok(template);
        }
        scope = parent;
    }
    registry.get("", kind).ok_or_else(|| TemplateNotFound {
        url: page_url.to_owned(),
        kind: kind.clone(),
    })
}

/// Returned when neither the page's directory, any of its ancestors, nor the
/// template root provides a template of the requested kind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("no `{}` template for page `{url}` in its directory, its ancestors, or the template root", .kind.file_name())]
pub struct TemplateNotFound {
    pub url: String,
    pub kind: TemplateKind,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::template;
    use std::path::PathBuf;

    fn template(scope: &str, kind: TemplateKind) -> template::Result<Template> {
        Template::compile(
            scope.to_owned(),
            kind,
            PathBuf::from(scope).join("_t.html"),
            "t",
            "",
            "layout",
        )
    }

    fn registry(entries: &[(&str, TemplateKind)]) -> template::Result<TemplateRegistry> {
        let mut registry = TemplateRegistry::new();
        for (scope, kind) in entries {
            registry.insert(template(scope, kind.clone())?);
        }
        Ok(registry)
    }

    fn resolved_scope(registry: &TemplateRegistry, url: &str, kind: &TemplateKind) -> Option<String> {
        resolve(registry, url, kind).ok().map(|t| t.scope.clone())
    }

    #[test]
    fn test_deepest_match_wins() -> template::Result<()> {
        let mut registry = registry(&[("", TemplateKind::Single), ("notes", TemplateKind::Single)])?;
        assert_eq!(
            Some(String::from("notes")),
            resolved_scope(&registry, "/notes/sub/page", &TemplateKind::Single)
        );

        registry.remove("notes", &TemplateKind::Single);
        assert_eq!(
            Some(String::new()),
            resolved_scope(&registry, "/notes/sub/page", &TemplateKind::Single)
        );
        Ok(())
    }

    #[test]
    fn test_exact_directory_beats_ancestor() -> template::Result<()> {
        let registry = registry(&[
            ("", TemplateKind::List),
            ("notes", TemplateKind::List),
            ("notes/sub", TemplateKind::List),
        ])?;
        assert_eq!(
            Some(String::from("notes/sub")),
            resolved_scope(&registry, "/notes/sub/index", &TemplateKind::List)
        );
        assert_eq!(
            Some(String::from("notes")),
            resolved_scope(&registry, "/notes/other/index", &TemplateKind::List)
        );
        Ok(())
    }

    #[test]
    fn test_kind_must_match() -> template::Result<()> {
        let registry = registry(&[("notes", TemplateKind::List), ("", TemplateKind::Index)])?;
        assert_eq!(
            Err(TemplateNotFound {
                url: String::from("/notes/a"),
                kind: TemplateKind::Single,
            }),
            resolve(&registry, "/notes/a", &TemplateKind::Single).map(|t| t.scope.clone())
        );
        Ok(())
    }

    #[test]
    fn test_root_page_uses_root_template() -> template::Result<()> {
        let registry = registry(&[("notes", TemplateKind::Single), ("", TemplateKind::Single)])?;
        assert_eq!(
            Some(String::new()),
            resolved_scope(&registry, "/about", &TemplateKind::Single)
        );
        Ok(())
    }

    #[test]
    fn test_named_kind() -> template::Result<()> {
        let gallery = TemplateKind::Named(String::from("gallery"));
        let registry = registry(&[("photos", gallery.clone()), ("", TemplateKind::Single)])?;
        assert_eq!(
            Some(String::from("photos")),
            resolved_scope(&registry, "/photos/2023/trip", &gallery)
        );
        assert!(resolve(&registry, "/notes/a", &gallery).is_err());
        Ok(())
    }
}
