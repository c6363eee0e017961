//! Inventory construction and lookup
//!
//! An [`Inventory`] is built once from an [`InventorySpec`]. Building:
//!
//! 1. Collects group data and, per identifier, its group memberships and
//!    accumulated inline data (group members first, then top-level names).
//! 2. Resolves every top-level identifier into zero or more hosts, expanding
//!    `@connector/argument` placeholders through the [`ConnectorRegistry`].
//! 3. Creates each [`Host`] with a layered data view:
//!    override > host > groups (later group wins) > global > deploy data.
//!
//! Building is all-or-nothing: an unknown connector or a failed expansion
//! returns an error and no inventory.

use crate::connector::{ConnectorRegistry, ExecutionConnector};
use crate::data::{Data, DataSource, LayeredData, OverrideData, merge_into};
use crate::error::{Error, Result};
use crate::host::Host;
use crate::name::NameSpec;
use crate::state::RunState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// A declared group: member names plus shared data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Group name
    pub name: String,
    /// Member declarations
    #[serde(default, alias = "hosts")]
    pub names: Vec<NameSpec>,
    /// Data shared by all members
    #[serde(default)]
    pub data: Data,
}

impl GroupSpec {
    /// Create a group with members and no data.
    pub fn new<I, N>(name: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NameSpec>,
    {
        Self {
            name: name.into(),
            names: names.into_iter().map(Into::into).collect(),
            data: Data::new(),
        }
    }

    /// Set the group data.
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }
}

/// Everything needed to build an [`Inventory`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InventorySpec {
    /// Top-level name declarations; only these become hosts
    pub names: Vec<NameSpec>,
    /// Global data
    pub data: Data,
    /// Groups, in declaration order
    pub groups: Vec<GroupSpec>,
    /// Operator overrides
    pub overrides: OverrideData,
}

impl InventorySpec {
    /// Create a spec from top-level names and global data.
    pub fn new<I, N>(names: I, data: Data) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NameSpec>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            data,
            ..Self::default()
        }
    }

    /// Add a group.
    pub fn with_group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    /// Set operator overrides.
    pub fn with_overrides(mut self, overrides: OverrideData) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Slot holding the (optional, non-owning) run state association
type StateSlot = Arc<RwLock<Weak<RunState>>>;

fn read_deploy_data(slot: &StateSlot) -> Data {
    slot.read()
        .unwrap_or_else(PoisonError::into_inner)
        .upgrade()
        .map(|state| state.deploy_data())
        .unwrap_or_default()
}

/// A host resolved from the declarations, before it is materialized
struct Resolved {
    name: String,
    executor: Arc<dyn ExecutionConnector>,
    data: Data,
}

#[derive(Default)]
struct Resolver {
    entries: Vec<Resolved>,
    index: HashMap<String, usize>,
}

impl Resolver {
    fn register(&mut self, name: String, executor: Arc<dyn ExecutionConnector>, data: Data) {
        if let Some(&position) = self.index.get(&name) {
            log::warn!("Host {} declared more than once, later declaration wins", name);
            let entry = &mut self.entries[position];
            entry.executor = executor;
            entry.data = data;
            return;
        }

        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(Resolved {
            name,
            executor,
            data,
        });
    }
}

/// Collection of target hosts and the data attached to them
#[derive(Debug)]
pub struct Inventory {
    data: Data,
    override_data: Data,
    host_data: HashMap<String, Data>,
    group_data: BTreeMap<String, Data>,
    hosts: Vec<Host>,
    host_index: HashMap<String, usize>,
    groups: BTreeMap<String, Vec<usize>>,
    state: StateSlot,
}

impl Inventory {
    /// Build an inventory, expanding connectors from `registry`.
    ///
    /// The registry's default executor (`ssh`) is only looked up for hosts
    /// whose identifier names no execution connector.
    pub fn build(spec: InventorySpec, registry: &ConnectorRegistry) -> Result<Self> {
        let InventorySpec {
            names,
            data,
            groups,
            overrides,
        } = spec;

        let mut group_data: BTreeMap<String, Data> = BTreeMap::new();
        let mut name_to_data: HashMap<String, Data> = HashMap::new();
        let mut name_to_groups: HashMap<String, Vec<String>> = HashMap::new();

        for group in groups {
            for member in group.names {
                merge_into(name_to_data.entry(member.name.clone()).or_default(), &member.data);
                name_to_groups
                    .entry(member.name)
                    .or_default()
                    .push(group.name.clone());
            }
            group_data.insert(group.name, group.data);
        }

        // Top-level inline data, collected before any connector expansion
        for spec in &names {
            merge_into(name_to_data.entry(spec.name.clone()).or_default(), &spec.data);
        }

        let mut resolver = Resolver::default();

        for spec in &names {
            let accumulated = name_to_data.get(&spec.name).cloned().unwrap_or_default();
            let mut executor = None;

            if let Some(reference) = spec.connector_ref() {
                if !registry.contains(reference.connector) {
                    return Err(Error::ConnectorNotFound {
                        name: reference.connector.to_string(),
                    });
                }

                executor = registry.execution(reference.connector);

                if let Some(connector) = registry.inventory(reference.connector) {
                    log::debug!("Expanding inventory connector: {}", reference.connector);

                    let executor = match executor {
                        Some(executor) => executor,
                        None => registry.default_executor()?,
                    };
                    let expanded =
                        connector
                            .expand(reference.argument)
                            .map_err(|e| Error::Expansion {
                                connector: reference.connector.to_string(),
                                message: e.message,
                            })?;

                    let placeholder_groups =
                        name_to_groups.get(&spec.name).cloned().unwrap_or_default();

                    for host in expanded {
                        let mut host_data = accumulated.clone();
                        merge_into(&mut host_data, &host.data);

                        let memberships = name_to_groups.entry(host.name.clone()).or_default();
                        memberships.extend(placeholder_groups.iter().cloned());
                        memberships.extend(host.groups);

                        resolver.register(host.name, Arc::clone(&executor), host_data);
                    }
                    continue;
                }
            }

            let executor = match executor {
                Some(executor) => executor,
                None => registry.default_executor()?,
            };
            resolver.register(spec.name.clone(), executor, accumulated);
        }

        let mut inventory = Self {
            data,
            override_data: overrides.into_data(),
            host_data: HashMap::new(),
            groups: group_data.keys().map(|name| (name.clone(), Vec::new())).collect(),
            group_data,
            hosts: Vec::with_capacity(resolver.entries.len()),
            host_index: HashMap::new(),
            state: Arc::new(RwLock::new(Weak::new())),
        };

        for entry in resolver.entries {
            let memberships = name_to_groups.remove(&entry.name).unwrap_or_default();
            inventory.add_host(entry, memberships);
        }

        log::debug!(
            "Built inventory with {} hosts in {} groups",
            inventory.hosts.len(),
            inventory.groups.len()
        );

        Ok(inventory)
    }

    fn add_host(&mut self, entry: Resolved, memberships: Vec<String>) {
        let slot = Arc::clone(&self.state);
        let view = LayeredData::new(vec![
            DataSource::Static(self.override_data.clone()),
            DataSource::Static(entry.data.clone()),
            DataSource::Static(self.get_groups_data(memberships.as_slice())),
            DataSource::Static(self.data.clone()),
            // Read through the slot on every lookup: deploy data changes between phases
            DataSource::live(move || read_deploy_data(&slot)),
        ]);

        let host = Host::new(entry.name.clone(), entry.executor, memberships, view);
        let position = self.hosts.len();

        for group in host.groups() {
            let members = self.groups.entry(group.clone()).or_default();
            if !members.contains(&position) {
                members.push(position);
            }
        }

        self.host_index.insert(entry.name.clone(), position);
        self.host_data.insert(entry.name, entry.data);
        self.hosts.push(host);
    }

    // ========================================================================
    // Run state
    // ========================================================================

    /// Associate a run state. The inventory keeps only a weak reference.
    pub fn attach_state(&self, state: &Arc<RunState>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(state);
    }

    /// Drop the run state association.
    pub fn detach_state(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Weak::new();
    }

    /// The attached run state, if it is still alive.
    pub fn state(&self) -> Option<Arc<RunState>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .upgrade()
    }

    // ========================================================================
    // Hosts
    // ========================================================================

    /// Look up a host by name.
    pub fn get_host(&self, name: &str) -> Result<&Host> {
        self.find_host(name).ok_or_else(|| Error::HostNotFound {
            name: name.to_string(),
        })
    }

    /// Look up a host by name, returning `None` if absent.
    pub fn find_host(&self, name: &str) -> Option<&Host> {
        self.host_index.get(name).map(|&i| &self.hosts[i])
    }

    /// Look up a host by name, falling back to `default`.
    pub fn get_host_or<'a>(&'a self, name: &str, default: &'a Host) -> &'a Host {
        self.find_host(name).unwrap_or(default)
    }

    /// Iterate over every host, active or not, in declaration order.
    pub fn iter_all_hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter()
    }

    /// Number of hosts, active or not.
    pub fn len_all_hosts(&self) -> usize {
        self.hosts.len()
    }

    /// Host names in declaration order.
    pub fn host_names(&self) -> Vec<&str> {
        self.hosts.iter().map(Host::name).collect()
    }

    fn active_subset(&self) -> Option<Vec<String>> {
        let names = self.state()?.active_hosts();
        if names.is_empty() { None } else { Some(names) }
    }

    /// Active hosts: the run state's active subset when one is set,
    /// otherwise every host.
    pub fn iter_active_hosts(&self) -> Vec<&Host> {
        match self.active_subset() {
            Some(names) => names.iter().filter_map(|name| self.find_host(name)).collect(),
            None => self.hosts.iter().collect(),
        }
    }

    /// Number of active hosts.
    pub fn len_active_hosts(&self) -> usize {
        self.iter_active_hosts().len()
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Hosts belonging to a group.
    pub fn get_group(&self, name: &str) -> Result<Vec<&Host>> {
        self.find_group(name).ok_or_else(|| Error::GroupNotFound {
            name: name.to_string(),
        })
    }

    /// Hosts belonging to a group, or `None` if the group is unknown.
    pub fn find_group(&self, name: &str) -> Option<Vec<&Host>> {
        self.groups
            .get(name)
            .map(|members| members.iter().map(|&i| &self.hosts[i]).collect())
    }

    /// Hosts belonging to a group, falling back to `default`.
    pub fn get_group_or<'a>(&'a self, name: &str, default: Vec<&'a Host>) -> Vec<&'a Host> {
        self.find_group(name).unwrap_or(default)
    }

    /// Known group names, sorted.
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    // ========================================================================
    // Data
    // ========================================================================

    /// Global data.
    pub fn get_data(&self) -> &Data {
        &self.data
    }

    /// Operator override data (unset entries already removed).
    pub fn get_override_data(&self) -> &Data {
        &self.override_data
    }

    /// Data attached to one host, empty if unknown.
    pub fn get_host_data(&self, name: &str) -> Data {
        self.host_data.get(name).cloned().unwrap_or_default()
    }

    /// Data attached to one group, empty if unknown.
    pub fn get_group_data(&self, name: &str) -> Data {
        self.group_data.get(name).cloned().unwrap_or_default()
    }

    /// Fold several groups' data in order; later groups win on conflicts.
    pub fn get_groups_data<S: AsRef<str>>(&self, names: &[S]) -> Data {
        let mut data = Data::new();
        for name in names {
            if let Some(group) = self.group_data.get(name.as_ref()) {
                merge_into(&mut data, group);
            }
        }
        data
    }

    /// Deploy-scoped data from the attached run state, empty if none.
    pub fn get_deploy_data(&self) -> Data {
        read_deploy_data(&self.state)
    }
}
