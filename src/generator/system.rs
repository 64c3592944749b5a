use super::ModelGenerator;
use crate::factory::EntityFactory;
use crate::model::{AssemblyId, ComponentId, InterfaceId, Repository, System};
use indexmap::IndexMap;

impl<F: EntityFactory> ModelGenerator<F> {
    /// Instantiates every component once, wires required roles to providers
    /// of the same interface and promotes a random subset of provided roles to
    /// system entry points.
    pub fn generate_system(&mut self, repository: &Repository) -> System {
        tracing::debug!(components = repository.components.len(), "generating system");
        let name = self.rng.name("system");

        let mut assemblies = Vec::with_capacity(repository.components.len());
        for idx in 0..repository.components.len() {
            let assembly_name = self.rng.name("assembly");
            assemblies.push(
                self.factory
                    .assembly(assembly_name, ComponentId::from_index(idx)),
            );
        }

        // Insertion-ordered so provider lists, and therefore draws, are reproducible.
        let mut providers: IndexMap<InterfaceId, Vec<(AssemblyId, usize)>> = IndexMap::new();
        let mut provided_pairs = Vec::new();
        for (idx, component) in repository.components.iter().enumerate() {
            let assembly = AssemblyId::from_index(idx);
            for (role_idx, role) in component.provided_roles.iter().enumerate() {
                providers
                    .entry(role.interface)
                    .or_default()
                    .push((assembly, role_idx));
                provided_pairs.push((assembly, role_idx, role.interface));
            }
        }

        let mut connectors = Vec::new();
        for (idx, component) in repository.components.iter().enumerate() {
            let requiring = AssemblyId::from_index(idx);
            for (role_idx, role) in component.domain_required_roles() {
                let Some(interface) = role.interface.domain() else {
                    continue;
                };
                let candidates = providers.get(&interface).map(Vec::as_slice).unwrap_or(&[]);
                match self.rng.choose(candidates) {
                    Some(&(providing, provided_role)) => connectors.push(self.factory.connector(
                        requiring,
                        role_idx,
                        providing,
                        provided_role,
                    )),
                    None => tracing::debug!(
                        assembly = %requiring,
                        role = %role.name,
                        %interface,
                        "no provider for required role; leaving it unwired"
                    ),
                }
            }
        }

        let requested = self.rng.between(
            self.config.min_exposed_interfaces,
            self.config.max_exposed_interfaces,
        );
        let exposed_count = requested.min(provided_pairs.len());
        let mut exposed_roles = Vec::with_capacity(exposed_count);
        for pick in self.rng.sample_indices(provided_pairs.len(), exposed_count) {
            let (assembly, provided_role, interface) = provided_pairs[pick];
            let exposed_name = self.rng.name("system_provided");
            exposed_roles.push(self.factory.exposed_role(
                exposed_name,
                assembly,
                provided_role,
                interface,
            ));
        }
        if exposed_roles.is_empty() {
            tracing::debug!("system exposes no provided roles");
        }

        tracing::debug!(
            assemblies = assemblies.len(),
            connectors = connectors.len(),
            exposed_roles = exposed_roles.len(),
            "system generated"
        );
        self.factory
            .system(name, assemblies, connectors, exposed_roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::random::RandomSource;
    use std::collections::HashSet;

    fn generate(config: GeneratorConfig, seed: u64, interfaces: usize, components: usize) -> (Repository, System) {
        let mut generator = ModelGenerator::new(config, RandomSource::seeded(seed)).unwrap();
        let repository = generator.generate_repository(interfaces, components);
        let system = generator.generate_system(&repository);
        (repository, system)
    }

    #[test]
    fn test_one_assembly_per_component() {
        let (repository, system) = generate(GeneratorConfig::default(), 10, 5, 7);
        assert_eq!(system.assemblies.len(), repository.components.len());
        for (idx, assembly) in system.assemblies.iter().enumerate() {
            assert_eq!(assembly.component.index(), idx);
        }
    }

    #[test]
    fn test_connectors_join_matching_interfaces() {
        for seed in 0..20 {
            let (repository, system) = generate(GeneratorConfig::default(), seed, 6, 8);
            for connector in &system.connectors {
                let requiring = &repository.components[connector.requiring_assembly.index()];
                let providing = &repository.components[connector.providing_assembly.index()];
                let required = &requiring.required_roles[connector.required_role];
                let provided = &providing.provided_roles[connector.provided_role];
                assert!(!required.is_infrastructure());
                assert_eq!(required.interface.domain(), Some(provided.interface));
            }
        }
    }

    #[test]
    fn test_every_required_role_with_a_provider_is_wired() {
        let (repository, system) = generate(GeneratorConfig::default(), 11, 4, 6);
        let provided: HashSet<_> = repository
            .components
            .iter()
            .flat_map(|c| c.provided_roles.iter().map(|r| r.interface))
            .collect();
        let wireable = repository
            .components
            .iter()
            .flat_map(|c| c.domain_required_roles())
            .filter(|(_, role)| role.interface.domain().is_some_and(|id| provided.contains(&id)))
            .count();
        assert_eq!(system.connectors.len(), wireable);
    }

    #[test]
    fn test_exposed_roles_bounded_and_distinct() {
        let config = GeneratorConfig {
            min_exposed_interfaces: 2,
            max_exposed_interfaces: 3,
            ..GeneratorConfig::default()
        };
        let (repository, system) = generate(config, 12, 6, 5);
        let total_provided: usize = repository.components.iter().map(|c| c.provided_roles.len()).sum();
        let count = system.exposed_roles.len();
        assert!(count <= 3);
        assert!(count >= 2.min(total_provided));
        let pairs: HashSet<_> = system
            .exposed_roles
            .iter()
            .map(|role| (role.assembly, role.provided_role))
            .collect();
        assert_eq!(pairs.len(), count);
        for role in &system.exposed_roles {
            let component = &repository.components[role.assembly.index()];
            assert_eq!(component.provided_roles[role.provided_role].interface, role.interface);
        }
    }

    #[test]
    fn test_no_interfaces_means_no_connectors_or_exposure() {
        let (_, system) = generate(GeneratorConfig::default(), 13, 0, 3);
        assert_eq!(system.assemblies.len(), 3);
        assert!(system.connectors.is_empty());
        assert!(system.exposed_roles.is_empty());
    }
}
