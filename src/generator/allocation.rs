use super::ModelGenerator;
use crate::factory::EntityFactory;
use crate::fixtures::ResourceEnvironment;
use crate::model::{Allocation, AssemblyId, ContainerId, System};

/// Splits `items` into `groups` contiguous chunks whose sizes differ by at
/// most one; the first `len % groups` chunks take the extra element.
pub fn partition_evenly<T>(items: Vec<T>, groups: usize) -> Vec<Vec<T>> {
    if groups == 0 {
        return Vec::new();
    }
    let base = items.len() / groups;
    let extra = items.len() % groups;

    let mut out = Vec::with_capacity(groups);
    let mut iter = items.into_iter();
    for idx in 0..groups {
        let size = base + usize::from(idx < extra);
        out.push(iter.by_ref().take(size).collect());
    }
    out
}

impl<F: EntityFactory> ModelGenerator<F> {
    pub fn generate_allocation(
        &mut self,
        system: &System,
        environment: &ResourceEnvironment,
    ) -> Allocation {
        let name = self.rng.name("allocation");
        let containers = environment.containers.len();
        let assemblies = system.assemblies.len();
        if containers == 0 || assemblies == 0 {
            tracing::debug!(containers, assemblies, "nothing to allocate");
            return self.factory.allocation(name, Vec::new());
        }

        let upper = containers.min(assemblies);
        let min_groups = self.config.min_allocation_groups;
        let mut group_count = min_groups.max(self.rng.between(min_groups.min(upper), upper));
        if group_count > upper {
            tracing::warn!(
                min_allocation_groups = min_groups,
                containers,
                assemblies,
                "minAllocationGroups not reachable; using {upper} groups"
            );
            group_count = upper;
        }

        let mut order: Vec<AssemblyId> = (0..assemblies).map(AssemblyId::from_index).collect();
        self.rng.shuffle(&mut order);

        let mut groups = Vec::with_capacity(group_count);
        for (container_idx, members) in partition_evenly(order, group_count)
            .into_iter()
            .take(containers)
            .enumerate()
        {
            if members.is_empty() {
                continue;
            }
            let group_name = self.rng.name("alloc");
            groups.push(self.factory.allocation_group(
                group_name,
                ContainerId::from_index(container_idx),
                members,
            ));
        }

        tracing::debug!(groups = groups.len(), assemblies, "allocation generated");
        self.factory.allocation(name, groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::random::RandomSource;

    fn allocate(config: GeneratorConfig, containers: usize, components: usize, seed: u64) -> (System, Allocation) {
        let mut generator = ModelGenerator::new(config, RandomSource::seeded(seed)).unwrap();
        let repository = generator.generate_repository(4, components);
        let system = generator.generate_system(&repository);
        let environment = ResourceEnvironment::with_containers(containers);
        let allocation = generator.generate_allocation(&system, &environment);
        (system, allocation)
    }

    #[test]
    fn test_partition_evenly_front_loads_remainder() {
        let parts = partition_evenly((0..7).collect::<Vec<_>>(), 3);
        assert_eq!(parts, vec![vec![0, 1, 2], vec![3, 4], vec![5, 6]]);
        assert!(partition_evenly(vec![1, 2], 0).is_empty());
    }

    #[test]
    fn test_single_container_takes_every_assembly() {
        let (system, allocation) = allocate(GeneratorConfig::default(), 1, 5, 30);
        assert_eq!(allocation.groups.len(), 1);
        let mut members = allocation.groups[0].assemblies.clone();
        members.sort_unstable();
        let expected: Vec<_> = (0..system.assemblies.len()).map(AssemblyId::from_index).collect();
        assert_eq!(members, expected);
    }

    #[test]
    fn test_groups_cover_assemblies_exactly_once() {
        for seed in 0..20 {
            let (system, allocation) = allocate(GeneratorConfig::default(), 3, 7, seed);
            let mut members: Vec<_> = allocation
                .groups
                .iter()
                .flat_map(|g| g.assemblies.iter().copied())
                .collect();
            members.sort_unstable();
            let expected: Vec<_> = (0..system.assemblies.len()).map(AssemblyId::from_index).collect();
            assert_eq!(members, expected);

            let sizes: Vec<_> = allocation.groups.iter().map(|g| g.assemblies.len()).collect();
            let spread = sizes.iter().max().unwrap() - sizes.iter().min().unwrap();
            assert!(spread <= 1);
            for (idx, group) in allocation.groups.iter().enumerate() {
                assert_eq!(group.container.index(), idx);
            }
        }
    }

    #[test]
    fn test_unreachable_min_groups_is_clamped() {
        let config = GeneratorConfig {
            min_allocation_groups: 5,
            ..GeneratorConfig::default()
        };
        let (system, allocation) = allocate(config, 2, 6, 31);
        assert_eq!(allocation.groups.len(), 2);
        let covered: usize = allocation.groups.iter().map(|g| g.assemblies.len()).sum();
        assert_eq!(covered, system.assemblies.len());
    }

    #[test]
    fn test_empty_environment_or_system_yields_empty_allocation() {
        let (_, allocation) = allocate(GeneratorConfig::default(), 0, 3, 32);
        assert!(allocation.is_empty());
        let (_, allocation) = allocate(GeneratorConfig::default(), 2, 0, 33);
        assert!(allocation.is_empty());
    }
}
