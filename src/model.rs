//! In-memory architecture model produced by one generation run.
//!
//! Entities reference each other through typed indices into the vectors that
//! own them, so a finished [`Model`] is a plain tree of values that can be
//! cloned, compared and serialized without any shared ownership.

use crate::fixtures::{ResourceEnvironment, StandardDefinitions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Position of a domain interface in [`Repository::interfaces`].
    InterfaceId,
    "interface"
);
entity_id!(
    /// Position of a component in [`Repository::components`].
    ComponentId,
    "component"
);
entity_id!(
    /// Position of an assembly in [`System::assemblies`].
    AssemblyId,
    "assembly"
);
entity_id!(
    /// Position of a container in [`ResourceEnvironment::containers`].
    ContainerId,
    "container"
);
entity_id!(
    /// Position of an exposed role in [`System::exposed_roles`].
    ExposedRoleId,
    "exposed"
);

// ============================================================================
// Types and interfaces
// ============================================================================

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    EnumIter,
    strum::Display,
)]
pub enum PrimitiveKind {
    Integer,
    String,
    Boolean,
    Double,
}

impl PrimitiveKind {
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PrimitiveType {
    pub name: String,
    pub kind: PrimitiveKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Parameter {
    pub name: String,
    pub kind: PrimitiveKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Signature {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<PrimitiveKind>,
}

/// Named, ordered collection of signatures. Declaration order is never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Interface {
    pub name: String,
    pub signatures: Vec<Signature>,
}

/// The externally supplied resource-like interfaces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, strum::Display,
)]
pub enum ResourceInterfaceKind {
    Cpu,
    Hdd,
}

/// Reference to either a generated domain interface or a fixed resource interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum InterfaceRef {
    Domain(InterfaceId),
    Resource(ResourceInterfaceKind),
}

impl InterfaceRef {
    pub fn domain(self) -> Option<InterfaceId> {
        match self {
            Self::Domain(id) => Some(id),
            Self::Resource(_) => None,
        }
    }

    pub fn is_infrastructure(self) -> bool {
        matches!(self, Self::Resource(_))
    }
}

impl fmt::Display for InterfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(id) => write!(f, "{id}"),
            Self::Resource(kind) => write!(f, "resource#{kind}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SignatureRef {
    pub interface: InterfaceRef,
    pub index: usize,
}

// ============================================================================
// Literals
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value")]
pub enum ArgumentLiteral {
    Integer(i64),
    String(String),
    Boolean(bool),
    Double(f64),
}

impl ArgumentLiteral {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Integer(_) => PrimitiveKind::Integer,
            Self::String(_) => PrimitiveKind::String,
            Self::Boolean(_) => PrimitiveKind::Boolean,
            Self::Double(_) => PrimitiveKind::Double,
        }
    }
}

/// A literal bound to the signature parameter it fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParameterSpecification {
    pub parameter: String,
    pub value: ArgumentLiteral,
}

// ============================================================================
// Repository
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProvidedRole {
    pub name: String,
    pub interface: InterfaceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RequiredRole {
    pub name: String,
    pub interface: InterfaceRef,
}

impl RequiredRole {
    /// Infrastructure roles are bound to the CPU/HDD-like interfaces and are never wired.
    pub fn is_infrastructure(&self) -> bool {
        self.interface.is_infrastructure()
    }
}

/// Delegation from a provided operation to one operation of a required role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InternalCall {
    /// Index into the owning component's `required_roles`.
    pub required_role: usize,
    pub signature: SignatureRef,
    pub arguments: Vec<ParameterSpecification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BehaviorSpec {
    /// Index into the owning component's `provided_roles`.
    pub provided_role: usize,
    /// Index of the implemented signature within the provided role's interface.
    pub signature: usize,
    pub calls: Vec<InternalCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Component {
    pub name: String,
    pub provided_roles: Vec<ProvidedRole>,
    pub required_roles: Vec<RequiredRole>,
    pub behaviors: Vec<BehaviorSpec>,
}

impl Component {
    pub fn domain_required_roles(&self) -> impl Iterator<Item = (usize, &RequiredRole)> {
        self.required_roles
            .iter()
            .enumerate()
            .filter(|(_, role)| !role.is_infrastructure())
    }

    pub fn infrastructure_role_count(&self) -> usize {
        self.required_roles
            .iter()
            .filter(|role| role.is_infrastructure())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Repository {
    pub name: String,
    pub primitive_types: Vec<PrimitiveType>,
    pub interfaces: Vec<Interface>,
    pub components: Vec<Component>,
}

impl Repository {
    pub fn interface(&self, id: InterfaceId) -> Option<&Interface> {
        self.interfaces.get(id.index())
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.index())
    }
}

// ============================================================================
// System
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Assembly {
    pub name: String,
    pub component: ComponentId,
}

/// Wiring from one assembly's required role to another assembly's provided role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Connector {
    pub requiring_assembly: AssemblyId,
    pub required_role: usize,
    pub providing_assembly: AssemblyId,
    pub provided_role: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExposedRole {
    pub name: String,
    pub assembly: AssemblyId,
    pub provided_role: usize,
    pub interface: InterfaceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct System {
    pub name: String,
    pub assemblies: Vec<Assembly>,
    pub connectors: Vec<Connector>,
    pub exposed_roles: Vec<ExposedRole>,
}

impl System {
    pub fn assembly(&self, id: AssemblyId) -> Option<&Assembly> {
        self.assemblies.get(id.index())
    }

    pub fn exposed_role(&self, id: ExposedRoleId) -> Option<&ExposedRole> {
        self.exposed_roles.get(id.index())
    }
}

// ============================================================================
// Allocation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AllocationGroup {
    pub name: String,
    pub container: ContainerId,
    pub assemblies: Vec<AssemblyId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Allocation {
    pub name: String,
    pub groups: Vec<AllocationGroup>,
}

impl Allocation {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ============================================================================
// Usage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Workload {
    Open { inter_arrival_time: f64 },
    Closed { population: u32, think_time: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntryCall {
    pub exposed_role: ExposedRoleId,
    /// Index of the called signature within the exposed role's interface.
    pub signature: usize,
    pub arguments: Vec<ParameterSpecification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UsageScenario {
    pub name: String,
    pub workload: Workload,
    pub calls: Vec<EntryCall>,
}

/// Usage model of a system; `scenario` is `None` when the system exposes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UsageModel {
    pub name: String,
    pub scenario: Option<UsageScenario>,
}

impl UsageModel {
    pub fn is_empty(&self) -> bool {
        self.scenario.is_none()
    }
}

// ============================================================================
// Model
// ============================================================================

/// Complete output of one generation run, ready for a [`crate::persist::ModelWriter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Model {
    pub standard: StandardDefinitions,
    pub environment: ResourceEnvironment,
    pub repository: Repository,
    pub system: System,
    pub allocation: Allocation,
    pub usage: UsageModel,
}

impl Model {
    /// Resolves a domain or resource interface reference.
    pub fn interface(&self, reference: InterfaceRef) -> Option<&Interface> {
        match reference {
            InterfaceRef::Domain(id) => self.repository.interface(id),
            InterfaceRef::Resource(kind) => Some(self.standard.resource_interface(kind)),
        }
    }

    pub fn signature(&self, reference: SignatureRef) -> Option<&Signature> {
        self.interface(reference.interface)
            .and_then(|interface| interface.signatures.get(reference.index))
    }

    /// Component instantiated by an assembly.
    pub fn assembly_component(&self, id: AssemblyId) -> Option<&Component> {
        self.system
            .assembly(id)
            .and_then(|assembly| self.repository.component(assembly.component))
    }

    pub fn stats(&self) -> ModelStats {
        let components = &self.repository.components;
        ModelStats {
            interfaces: self.repository.interfaces.len(),
            signatures: self
                .repository
                .interfaces
                .iter()
                .map(|interface| interface.signatures.len())
                .sum(),
            components: components.len(),
            provided_roles: components.iter().map(|c| c.provided_roles.len()).sum(),
            required_roles: components
                .iter()
                .map(|c| c.domain_required_roles().count())
                .sum(),
            behaviors: components.iter().map(|c| c.behaviors.len()).sum(),
            assemblies: self.system.assemblies.len(),
            connectors: self.system.connectors.len(),
            exposed_roles: self.system.exposed_roles.len(),
            containers: self.environment.containers.len(),
            allocation_groups: self.allocation.groups.len(),
            entry_calls: self
                .usage
                .scenario
                .as_ref()
                .map_or(0, |scenario| scenario.calls.len()),
        }
    }
}

/// Element counts of a model, used for logging and run metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModelStats {
    pub interfaces: usize,
    pub signatures: usize,
    pub components: usize,
    pub provided_roles: usize,
    /// Domain required roles only; infrastructure roles are not counted.
    pub required_roles: usize,
    pub behaviors: usize,
    pub assemblies: usize,
    pub connectors: usize,
    pub exposed_roles: usize,
    pub containers: usize,
    pub allocation_groups: usize,
    pub entry_calls: usize,
}
