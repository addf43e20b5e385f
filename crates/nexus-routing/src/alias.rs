use std::collections::HashMap;
use std::sync::RwLock;

use nexus_common::TenantId;

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub provider: String,
    pub model: String,
    pub weight: Option<f64>,
}

impl Target {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Alias {
    pub name: String,
    pub targets: Vec<Target>,
    pub tenant_overrides: HashMap<TenantId, Vec<Target>>,
}

impl Alias {
    pub fn new(name: impl Into<String>, targets: Vec<Target>) -> Self {
        Self {
            name: name.into(),
            targets,
            tenant_overrides: HashMap::new(),
        }
    }

    pub fn with_tenant_override(mut self, tenant: TenantId, targets: Vec<Target>) -> Self {
        self.tenant_overrides.insert(tenant, targets);
        self
    }
}

/// Maps `name -> alias`. Safe for concurrent reads and serialized writes:
/// every read takes a shared lock, every write (registration) takes an
/// exclusive one, matching the long-lived, read-mostly lifecycle in spec §3.
#[derive(Default)]
pub struct AliasRegistry {
    aliases: RwLock<HashMap<String, Alias>>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, alias: Alias) {
        self.aliases
            .write()
            .expect("alias registry lock poisoned")
            .insert(alias.name.clone(), alias);
    }

    /// Resolves `name` to an ordered target list for `tenant`: the tenant
    /// override if present, else the global targets, else `None`, at which
    /// point the caller treats `name` as a concrete `provider/model` id.
    /// Aliases resolve exactly once; an alias whose first target is itself
    /// an alias name is not followed further (spec §3: chaining is a caller
    /// responsibility).
    pub fn resolve(&self, name: &str, tenant: Option<TenantId>) -> Option<Vec<Target>> {
        let aliases = self.aliases.read().expect("alias registry lock poisoned");
        let alias = aliases.get(name)?;

        if let Some(tenant) = tenant
            && let Some(overridden) = alias.tenant_overrides.get(&tenant)
        {
            return Some(overridden.clone());
        }

        Some(alias.targets.clone())
    }
}
