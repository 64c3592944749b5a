//! Entity construction capability used by the generation stages.
//!
//! Stages never build model values with struct literals; every entity goes
//! through an [`EntityFactory`] so callers can observe, decorate or redirect
//! construction (for example to back it by an external schema). Every method
//! has a default body that builds the value directly, which is all
//! [`DirectFactory`] needs.

use crate::model::{
    Allocation, AllocationGroup, ArgumentLiteral, Assembly, AssemblyId, BehaviorSpec, Component,
    ComponentId, Connector, ContainerId, EntryCall, ExposedRole, ExposedRoleId, Interface,
    InterfaceId, InterfaceRef, InternalCall, Parameter, ParameterSpecification, PrimitiveKind,
    PrimitiveType, ProvidedRole, Repository, RequiredRole, Signature, SignatureRef, System,
    UsageModel, UsageScenario, Workload,
};

pub trait EntityFactory {
    fn primitive_type(&self, kind: PrimitiveKind) -> PrimitiveType {
        PrimitiveType {
            name: kind.to_string(),
            kind,
        }
    }

    fn parameter(&self, name: String, kind: PrimitiveKind) -> Parameter {
        Parameter { name, kind }
    }

    fn signature(
        &self,
        name: String,
        parameters: Vec<Parameter>,
        return_type: Option<PrimitiveKind>,
    ) -> Signature {
        Signature {
            name,
            parameters,
            return_type,
        }
    }

    fn interface(&self, name: String, signatures: Vec<Signature>) -> Interface {
        Interface { name, signatures }
    }

    fn provided_role(&self, name: String, interface: InterfaceId) -> ProvidedRole {
        ProvidedRole { name, interface }
    }

    fn required_role(&self, name: String, interface: InterfaceRef) -> RequiredRole {
        RequiredRole { name, interface }
    }

    fn parameter_specification(
        &self,
        parameter: String,
        value: ArgumentLiteral,
    ) -> ParameterSpecification {
        ParameterSpecification { parameter, value }
    }

    fn internal_call(
        &self,
        required_role: usize,
        signature: SignatureRef,
        arguments: Vec<ParameterSpecification>,
    ) -> InternalCall {
        InternalCall {
            required_role,
            signature,
            arguments,
        }
    }

    fn behavior_spec(
        &self,
        provided_role: usize,
        signature: usize,
        calls: Vec<InternalCall>,
    ) -> BehaviorSpec {
        BehaviorSpec {
            provided_role,
            signature,
            calls,
        }
    }

    fn component(
        &self,
        name: String,
        provided_roles: Vec<ProvidedRole>,
        required_roles: Vec<RequiredRole>,
        behaviors: Vec<BehaviorSpec>,
    ) -> Component {
        Component {
            name,
            provided_roles,
            required_roles,
            behaviors,
        }
    }

    fn repository(
        &self,
        name: String,
        primitive_types: Vec<PrimitiveType>,
        interfaces: Vec<Interface>,
        components: Vec<Component>,
    ) -> Repository {
        Repository {
            name,
            primitive_types,
            interfaces,
            components,
        }
    }

    fn assembly(&self, name: String, component: ComponentId) -> Assembly {
        Assembly { name, component }
    }

    fn connector(
        &self,
        requiring_assembly: AssemblyId,
        required_role: usize,
        providing_assembly: AssemblyId,
        provided_role: usize,
    ) -> Connector {
        Connector {
            requiring_assembly,
            required_role,
            providing_assembly,
            provided_role,
        }
    }

    fn exposed_role(
        &self,
        name: String,
        assembly: AssemblyId,
        provided_role: usize,
        interface: InterfaceId,
    ) -> ExposedRole {
        ExposedRole {
            name,
            assembly,
            provided_role,
            interface,
        }
    }

    fn system(
        &self,
        name: String,
        assemblies: Vec<Assembly>,
        connectors: Vec<Connector>,
        exposed_roles: Vec<ExposedRole>,
    ) -> System {
        System {
            name,
            assemblies,
            connectors,
            exposed_roles,
        }
    }

    fn allocation_group(
        &self,
        name: String,
        container: ContainerId,
        assemblies: Vec<AssemblyId>,
    ) -> AllocationGroup {
        AllocationGroup {
            name,
            container,
            assemblies,
        }
    }

    fn allocation(&self, name: String, groups: Vec<AllocationGroup>) -> Allocation {
        Allocation { name, groups }
    }

    fn open_workload(&self, inter_arrival_time: f64) -> Workload {
        Workload::Open { inter_arrival_time }
    }

    fn closed_workload(&self, population: u32, think_time: f64) -> Workload {
        Workload::Closed {
            population,
            think_time,
        }
    }

    fn entry_call(
        &self,
        exposed_role: ExposedRoleId,
        signature: usize,
        arguments: Vec<ParameterSpecification>,
    ) -> EntryCall {
        EntryCall {
            exposed_role,
            signature,
            arguments,
        }
    }

    fn usage_scenario(&self, name: String, workload: Workload, calls: Vec<EntryCall>) -> UsageScenario {
        UsageScenario {
            name,
            workload,
            calls,
        }
    }

    fn usage_model(&self, name: String, scenario: Option<UsageScenario>) -> UsageModel {
        UsageModel { name, scenario }
    }
}

/// Builds every entity as a plain struct value.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectFactory;

impl EntityFactory for DirectFactory {}
