use super::ModelGenerator;
use crate::factory::EntityFactory;
use crate::literal::synthesize_arguments;
use crate::model::{
    BehaviorSpec, Component, Interface, InterfaceId, InterfaceRef, PrimitiveKind,
    ProvidedRole, Repository, RequiredRole, ResourceInterfaceKind, Signature, SignatureRef,
};
use crate::sampling::{InterfaceSampler, UniqueRotationSampler};

/// Upper bound for the provided and required role counts of one component:
/// half the interface pool, rounded half to even, and never below one.
pub fn feasible_role_max(num_interfaces: usize) -> usize {
    let half = num_interfaces / 2;
    let rounded = if num_interfaces % 2 == 1 && half % 2 == 1 {
        half + 1
    } else {
        half
    };
    rounded.max(1)
}

impl<F: EntityFactory> ModelGenerator<F> {
    pub fn generate_repository(&mut self, num_interfaces: usize, num_components: usize) -> Repository {
        tracing::debug!(num_interfaces, num_components, "generating repository");

        let primitive_types = PrimitiveKind::all()
            .into_iter()
            .map(|kind| self.factory.primitive_type(kind))
            .collect();

        let mut interfaces = Vec::with_capacity(num_interfaces);
        for _ in 0..num_interfaces {
            interfaces.push(self.random_interface());
        }

        let mut sampler = InterfaceSampler::new(
            (0..num_interfaces).map(InterfaceId::from_index).collect::<Vec<_>>(),
        );
        let mut components = Vec::with_capacity(num_components);
        for _ in 0..num_components {
            let component = self.random_component(&interfaces, &mut sampler);
            components.push(component);
        }

        let name = self.rng.name("repository");
        tracing::debug!(
            interfaces = interfaces.len(),
            components = components.len(),
            "repository generated"
        );
        self.factory
            .repository(name, primitive_types, interfaces, components)
    }

    fn random_interface(&mut self) -> Interface {
        let name = self.rng.name("interface");
        let count = self.rng.between(
            self.config.min_signatures_per_interface,
            self.config.max_signatures_per_interface,
        );
        let mut signatures = Vec::with_capacity(count);
        for _ in 0..count {
            signatures.push(self.random_signature());
        }
        self.factory.interface(name, signatures)
    }

    fn random_signature(&mut self) -> Signature {
        let kinds = PrimitiveKind::all();
        let name = self.rng.name("operation");
        let count = self.rng.between(0, self.config.max_parameters_per_signature);
        let mut parameters = Vec::with_capacity(count);
        for idx in 0..count {
            let kind = self.random_kind(&kinds);
            parameters.push(self.factory.parameter(format!("param{idx}"), kind));
        }
        let return_type = self.random_kind(&kinds);
        self.factory.signature(name, parameters, Some(return_type))
    }

    fn random_kind(&mut self, kinds: &[PrimitiveKind]) -> PrimitiveKind {
        self.rng
            .choose(kinds)
            .copied()
            .unwrap_or(PrimitiveKind::Double)
    }

    fn random_component(
        &mut self,
        interfaces: &[Interface],
        sampler: &mut InterfaceSampler<InterfaceId>,
    ) -> Component {
        let name = self.rng.name("component");
        let upper = feasible_role_max(interfaces.len());
        let provided_count = self.rng.between(
            self.config.min_provided_interfaces_per_component.min(upper),
            upper,
        );
        let required_count = self.rng.between(
            self.config.min_required_interfaces_per_component.min(upper),
            upper,
        );

        let mut provided_roles = Vec::new();
        let mut required_roles = Vec::new();
        if sampler.universe_len() > 0 {
            let sampled = sampler.sample(provided_count, required_count, &mut self.rng);

            let mut rotation = UniqueRotationSampler::new(sampled.provided);
            for _ in 0..rotation.len() {
                if let Some(id) = rotation.sample(&mut self.rng) {
                    let role_name = self.rng.name("provided");
                    provided_roles.push(self.factory.provided_role(role_name, id));
                }
            }

            let mut rotation = UniqueRotationSampler::new(sampled.required);
            for _ in 0..rotation.len() {
                if let Some(id) = rotation.sample(&mut self.rng) {
                    let role_name = self.rng.name("required");
                    required_roles.push(
                        self.factory
                            .required_role(role_name, InterfaceRef::Domain(id)),
                    );
                }
            }
        } else {
            tracing::debug!(component = %name, "no interfaces available; only infrastructure roles");
        }

        required_roles.push(self.factory.required_role(
            "cpu".to_string(),
            InterfaceRef::Resource(ResourceInterfaceKind::Cpu),
        ));
        if self.config.attach_hdd_role {
            required_roles.push(self.factory.required_role(
                "hdd".to_string(),
                InterfaceRef::Resource(ResourceInterfaceKind::Hdd),
            ));
        }

        let behaviors = self.behaviors_for(interfaces, &provided_roles, &required_roles);
        self.factory
            .component(name, provided_roles, required_roles, behaviors)
    }

    /// One behavior per provided signature, each delegating to one random required operation.
    fn behaviors_for(
        &mut self,
        interfaces: &[Interface],
        provided_roles: &[ProvidedRole],
        required_roles: &[RequiredRole],
    ) -> Vec<BehaviorSpec> {
        let mut behaviors = Vec::new();
        for (provided_idx, provided) in provided_roles.iter().enumerate() {
            let Some(interface) = interfaces.get(provided.interface.index()) else {
                continue;
            };
            for signature_idx in 0..interface.signatures.len() {
                let mut calls = Vec::with_capacity(1);
                if let Some(required_idx) = self.rng.index(required_roles.len()) {
                    let target = required_roles[required_idx].interface;
                    let target_interface = match target {
                        InterfaceRef::Domain(id) => interfaces.get(id.index()),
                        InterfaceRef::Resource(kind) => Some(self.standard.resource_interface(kind)),
                    };
                    let target_idx = target_interface
                        .and_then(|found| self.rng.index(found.signatures.len()).map(|idx| (found, idx)));
                    if let Some((target_interface, target_idx)) = target_idx {
                        let arguments = synthesize_arguments(
                            &self.factory,
                            &target_interface.signatures[target_idx].parameters,
                            &self.literals,
                            &mut self.rng,
                        );
                        calls.push(self.factory.internal_call(
                            required_idx,
                            SignatureRef {
                                interface: target,
                                index: target_idx,
                            },
                            arguments,
                        ));
                    }
                }
                behaviors.push(self.factory.behavior_spec(provided_idx, signature_idx, calls));
            }
        }
        behaviors
    }
}
