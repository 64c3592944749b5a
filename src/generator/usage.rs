use super::ModelGenerator;
use crate::factory::EntityFactory;
use crate::literal::synthesize_arguments;
use crate::model::{ExposedRoleId, Repository, System, UsageModel, Workload};

impl<F: EntityFactory> ModelGenerator<F> {
    /// Workload plus a sequence of entry calls into the system's exposed roles.
    ///
    /// A system without exposed roles gets a usage model with no scenario.
    pub fn generate_usage_model(&mut self, repository: &Repository, system: &System) -> UsageModel {
        let name = self.rng.name("usage");
        if system.exposed_roles.is_empty() {
            tracing::debug!("no exposed roles; usage model left empty");
            return self.factory.usage_model(name, None);
        }

        let workload = self.random_workload();

        let count = self.rng.between(self.config.min_calls, self.config.max_calls);
        let mut calls = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(exposed_idx) = self.rng.index(system.exposed_roles.len()) else {
                break;
            };
            let exposed = &system.exposed_roles[exposed_idx];
            let Some(interface) = repository.interface(exposed.interface) else {
                continue;
            };
            let Some(signature_idx) = self.rng.index(interface.signatures.len()) else {
                tracing::debug!(role = %exposed.name, "exposed interface has no signatures; skipping call");
                continue;
            };
            let arguments = synthesize_arguments(
                &self.factory,
                &interface.signatures[signature_idx].parameters,
                &self.literals,
                &mut self.rng,
            );
            calls.push(self.factory.entry_call(
                ExposedRoleId::from_index(exposed_idx),
                signature_idx,
                arguments,
            ));
        }

        tracing::debug!(entry_calls = calls.len(), ?workload, "usage model generated");
        let scenario_name = self.rng.name("scenario");
        let scenario = self.factory.usage_scenario(scenario_name, workload, calls);
        self.factory.usage_model(name, Some(scenario))
    }

    fn random_workload(&mut self) -> Workload {
        if self.rng.coin() {
            let rate = self
                .rng
                .between(self.config.arrival_rate_min, self.config.arrival_rate_max);
            self.factory.open_workload(rate)
        } else {
            let population = self.rng.between(1, self.config.max_user_count);
            let think_time = self
                .rng
                .between(self.config.think_time_min, self.config.think_time_max);
            self.factory.closed_workload(population, think_time)
        }
    }
}
