//! Declarative default access configuration.
//!
//! The built-in roles, the module hierarchy and the default permission
//! matrix live in `seeds/default_access.json`. [`DefaultAccess::load`]
//! parses and validates the document; the database seed loader inserts the
//! resolved rows verbatim.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::error::CoreError;
use crate::module_tree::{check_parent_assignment, validate_module_key, validate_module_name};
use crate::permissions::CapabilityFlags;
use crate::types::DbId;

const DEFAULT_ACCESS_JSON: &str = include_str!("../seeds/default_access.json");

/// A built-in role.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedRole {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
}

/// A module row with its parent referenced by key.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedModule {
    pub id: DbId,
    pub name: String,
    pub key: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub route: Option<String>,
    pub display_order: i32,
    pub parent: Option<String>,
}

/// One `{role, module, flags}` entry of the default matrix.
///
/// Every flag is mandatory so that no seeded row relies on a column default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedGrant {
    pub role: String,
    pub module: String,
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub export: bool,
}

impl SeedGrant {
    /// The grant as capability flags. `admin` and `other` are not part of
    /// the default matrix and stay `false`.
    pub fn flags(&self) -> CapabilityFlags {
        CapabilityFlags {
            can_view: self.view,
            can_create: self.create,
            can_edit: self.edit,
            can_delete: self.delete,
            can_export: self.export,
            ..CapabilityFlags::none()
        }
    }
}

/// A grant with role and module resolved to ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedGrant {
    pub role_id: DbId,
    pub module_id: DbId,
    pub flags: CapabilityFlags,
}

/// A module with its parent resolved to an id.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    pub id: DbId,
    pub name: String,
    pub key: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub route: Option<String>,
    pub display_order: i32,
    pub parent_module_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefaultAccess {
    roles: Vec<SeedRole>,
    modules: Vec<SeedModule>,
    grants: Vec<SeedGrant>,
}

/// Validated default access configuration.
#[derive(Debug, Clone)]
pub struct DefaultAccess {
    pub roles: Vec<SeedRole>,
    /// Modules ordered so that every parent precedes its children.
    pub modules: Vec<ResolvedModule>,
    pub grants: Vec<ResolvedGrant>,
}

impl DefaultAccess {
    /// Load the configuration bundled with the crate.
    pub fn load() -> Result<Self, CoreError> {
        Self::from_json(DEFAULT_ACCESS_JSON)
    }

    /// Parse and validate a configuration document.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let raw: RawDefaultAccess = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("Invalid default access document: {e}")))?;
        Self::resolve(raw)
    }

    fn resolve(raw: RawDefaultAccess) -> Result<Self, CoreError> {
        let mut role_ids = HashMap::new();
        let mut seen_role_ids = HashSet::new();
        for role in &raw.roles {
            if !seen_role_ids.insert(role.id) {
                return Err(CoreError::Validation(format!("Duplicate role id {}", role.id)));
            }
            if role_ids.insert(role.name.as_str(), role.id).is_some() {
                return Err(CoreError::Validation(format!(
                    "Duplicate role name '{}'",
                    role.name
                )));
            }
        }

        let mut module_ids = HashMap::new();
        let mut seen_module_ids = HashSet::new();
        for module in &raw.modules {
            validate_module_key(&module.key)?;
            validate_module_name(&module.name)?;
            if !seen_module_ids.insert(module.id) {
                return Err(CoreError::Validation(format!(
                    "Duplicate module id {}",
                    module.id
                )));
            }
            if module_ids.insert(module.key.as_str(), module.id).is_some() {
                return Err(CoreError::Validation(format!(
                    "Duplicate module key '{}'",
                    module.key
                )));
            }
        }

        let mut parents: HashMap<DbId, Option<DbId>> = HashMap::new();
        let mut resolved_modules = Vec::with_capacity(raw.modules.len());
        for module in &raw.modules {
            let parent_module_id = match &module.parent {
                Some(parent_key) => Some(*module_ids.get(parent_key.as_str()).ok_or_else(
                    || {
                        CoreError::Validation(format!(
                            "Module '{}' references unknown parent '{parent_key}'",
                            module.key
                        ))
                    },
                )?),
                None => None,
            };
            parents.insert(module.id, parent_module_id);
            resolved_modules.push(ResolvedModule {
                id: module.id,
                name: module.name.clone(),
                key: module.key.clone(),
                description: module.description.clone(),
                icon: module.icon.clone(),
                route: module.route.clone(),
                display_order: module.display_order,
                parent_module_id,
            });
        }

        for module in &resolved_modules {
            if let Some(parent) = module.parent_module_id {
                check_parent_assignment(Some(module.id), parent, &parents).map_err(|e| match e {
                    CoreError::Internal(msg) => CoreError::Validation(msg),
                    other => other,
                })?;
            }
        }

        let mut pairs = HashSet::new();
        let mut grants = Vec::with_capacity(raw.grants.len());
        for grant in &raw.grants {
            let role_id = *role_ids.get(grant.role.as_str()).ok_or_else(|| {
                CoreError::Validation(format!("Grant references unknown role '{}'", grant.role))
            })?;
            let module_id = *module_ids.get(grant.module.as_str()).ok_or_else(|| {
                CoreError::Validation(format!(
                    "Grant references unknown module '{}'",
                    grant.module
                ))
            })?;
            if !pairs.insert((role_id, module_id)) {
                return Err(CoreError::Validation(format!(
                    "Duplicate grant for role '{}' on module '{}'",
                    grant.role, grant.module
                )));
            }
            grants.push(ResolvedGrant {
                role_id,
                module_id,
                flags: grant.flags(),
            });
        }

        Ok(Self {
            roles: raw.roles,
            modules: parents_first(resolved_modules),
            grants,
        })
    }

    /// Grants of one role, in document order.
    pub fn grants_for_role(&self, role_id: DbId) -> impl Iterator<Item = &ResolvedGrant> {
        self.grants.iter().filter(move |g| g.role_id == role_id)
    }

    pub fn module_by_key(&self, key: &str) -> Option<&ResolvedModule> {
        self.modules.iter().find(|m| m.key == key)
    }
}

/// Order modules so that inserting them in sequence never references a
/// parent that has not been inserted yet. Input must be acyclic.
fn parents_first(modules: Vec<ResolvedModule>) -> Vec<ResolvedModule> {
    let mut placed: HashSet<DbId> = HashSet::new();
    let mut pending = modules;
    let mut ordered = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let (ready, rest): (Vec<_>, Vec<_>) = pending.into_iter().partition(|m| {
            m.parent_module_id
                .map_or(true, |parent| placed.contains(&parent))
        });
        if ready.is_empty() {
            ordered.extend(rest);
            break;
        }
        placed.extend(ready.iter().map(|m| m.id));
        ordered.extend(ready);
        pending = rest;
    }
    ordered
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::permissions::Capability;
    use crate::roles::{BUILT_IN_ROLES, ROLE_ADMIN_ID, ROLE_HR_ID, ROLE_MANAGER_ID, ROLE_USER_ID};

    fn bundled() -> DefaultAccess {
        DefaultAccess::load().expect("bundled default access must be valid")
    }

    #[test]
    fn bundled_roles_match_constants() {
        let access = bundled();
        let roles: Vec<(DbId, &str)> = access
            .roles
            .iter()
            .map(|r| (r.id, r.name.as_str()))
            .collect();
        assert_eq!(roles, BUILT_IN_ROLES.to_vec());
    }

    #[test]
    fn bundled_modules_form_expected_hierarchy() {
        let access = bundled();
        assert_eq!(access.modules.len(), 9);

        let mut ids: Vec<DbId> = access.modules.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=9).collect::<Vec<_>>());

        let roots: Vec<&str> = access
            .modules
            .iter()
            .filter(|m| m.parent_module_id.is_none())
            .map(|m| m.key.as_str())
            .collect();
        assert_eq!(
            roots,
            vec!["dashboard", "employees", "jobs", "curriculums", "licenses", "administration"]
        );

        let admin = access.module_by_key("administration").unwrap();
        for key in ["roles", "permissions", "countries"] {
            assert_eq!(
                access.module_by_key(key).unwrap().parent_module_id,
                Some(admin.id)
            );
        }
        let permissions = access.module_by_key("permissions").unwrap();
        assert_eq!(permissions.id, 8);
        assert_eq!(permissions.name, "Permissions");
    }

    #[test]
    fn bundled_matrix_has_twenty_five_rows() {
        let access = bundled();
        assert_eq!(access.grants.len(), 25);
        assert_eq!(access.grants_for_role(ROLE_ADMIN_ID).count(), 9);
        assert_eq!(access.grants_for_role(ROLE_MANAGER_ID).count(), 9);
        assert_eq!(access.grants_for_role(ROLE_USER_ID).count(), 3);
        assert_eq!(access.grants_for_role(ROLE_HR_ID).count(), 4);
    }

    #[test]
    fn admin_has_every_base_flag_everywhere() {
        let access = bundled();
        for grant in access.grants_for_role(ROLE_ADMIN_ID) {
            for capability in [
                Capability::View,
                Capability::Create,
                Capability::Edit,
                Capability::Delete,
                Capability::Export,
            ] {
                assert!(grant.flags.allows(capability));
            }
            assert!(!grant.flags.admin_actions);
            assert!(!grant.flags.other_actions);
        }
    }

    #[test]
    fn manager_never_deletes_and_user_only_views() {
        let access = bundled();
        assert!(access
            .grants_for_role(ROLE_MANAGER_ID)
            .all(|g| g.flags.can_view && !g.flags.can_delete));
        assert!(access
            .grants_for_role(ROLE_USER_ID)
            .all(|g| g.flags == CapabilityFlags::view_only()));
    }

    #[test]
    fn hr_dashboard_is_view_and_export() {
        let access = bundled();
        let dashboard = access.module_by_key("dashboard").unwrap().id;
        let grant = access
            .grants_for_role(ROLE_HR_ID)
            .find(|g| g.module_id == dashboard)
            .unwrap();
        assert_eq!(
            grant.flags.granted(),
            vec![Capability::View, Capability::Export]
        );
    }

    #[test]
    fn parents_precede_children() {
        let access = bundled();
        let mut seen = HashSet::new();
        for module in &access.modules {
            if let Some(parent) = module.parent_module_id {
                assert!(seen.contains(&parent), "{} inserted before parent", module.key);
            }
            seen.insert(module.id);
        }
    }

    const MINIMAL_MODULE: &str =
        r#"{"id": 1, "name": "Dashboard", "key": "dashboard", "description": null,
            "icon": null, "route": null, "display_order": 1, "parent": null}"#;

    fn doc(modules: &str, grants: &str) -> String {
        format!(
            r#"{{"roles": [{{"id": 1, "name": "Admin", "description": null}}],
                "modules": [{modules}], "grants": [{grants}]}}"#
        )
    }

    #[test]
    fn missing_flag_is_rejected() {
        let json = doc(
            MINIMAL_MODULE,
            r#"{"role": "Admin", "module": "dashboard", "view": true,
                "create": true, "edit": true, "delete": true}"#,
        );
        let err = DefaultAccess::from_json(&json).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("export"));
    }

    #[test]
    fn unknown_module_in_grant_is_rejected() {
        let json = doc(
            MINIMAL_MODULE,
            r#"{"role": "Admin", "module": "nope", "view": true, "create": true,
                "edit": true, "delete": true, "export": true}"#,
        );
        let err = DefaultAccess::from_json(&json).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("unknown module 'nope'"));
    }

    #[test]
    fn duplicate_grant_is_rejected() {
        let grant = r#"{"role": "Admin", "module": "dashboard", "view": true, "create": true,
                        "edit": true, "delete": true, "export": true}"#;
        let json = doc(MINIMAL_MODULE, &format!("{grant}, {grant}"));
        let err = DefaultAccess::from_json(&json).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("Duplicate grant"));
    }

    #[test]
    fn parent_cycle_is_rejected() {
        let modules = r#"
            {"id": 1, "name": "A", "key": "a", "description": null, "icon": null,
             "route": null, "display_order": 1, "parent": "b"},
            {"id": 2, "name": "B", "key": "b", "description": null, "icon": null,
             "route": null, "display_order": 2, "parent": "a"}"#;
        let err = DefaultAccess::from_json(&doc(modules, "")).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn duplicate_module_key_is_rejected() {
        let modules = format!("{MINIMAL_MODULE}, {}", MINIMAL_MODULE.replace("\"id\": 1", "\"id\": 2"));
        let err = DefaultAccess::from_json(&doc(&modules, "")).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("Duplicate module key"));
    }
}
